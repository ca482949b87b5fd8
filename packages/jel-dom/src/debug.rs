use crate::Document;

impl Document {
    /// An indented outline of the subtree rooted at `node_id`, one node per line
    pub fn debug_tree(&self, node_id: usize) -> String {
        let mut out = String::new();
        self.write_debug_tree(node_id, 0, &mut out);
        out
    }

    fn write_debug_tree(&self, node_id: usize, depth: usize, out: &mut String) {
        let Some(node) = self.get_node(node_id) else {
            return;
        };
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&format!("{} {}\n", node.id, node.node_debug_str()));
        for &child_id in &node.children {
            self.write_debug_tree(child_id, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn outline_is_indented() {
        let doc = Document::default();
        let outline = doc.debug_tree(doc.root_element_id());
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("<html>"));
        assert!(lines[1].starts_with("  ") && lines[1].ends_with("<head>"));
        assert!(lines[2].ends_with("<body>"));
    }
}
