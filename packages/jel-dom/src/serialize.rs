use crate::{Document, NodeData};

/// Elements whose text children are serialised without escaping
const RAW_TEXT_ELEMENTS: [&str; 6] = ["script", "style", "xmp", "iframe", "noembed", "noframes"];

impl Document {
    /// Markup for the node and its subtree
    pub fn outer_html(&self, node_id: usize) -> String {
        let mut output = String::new();
        self.write_outer_html(node_id, &mut output);
        output
    }

    /// Markup for the children of the node
    pub fn inner_html(&self, node_id: usize) -> String {
        let mut output = String::new();
        for &child_id in self.children(node_id) {
            self.write_outer_html(child_id, &mut output);
        }
        output
    }

    pub fn write_outer_html(&self, node_id: usize, writer: &mut String) {
        let Some(node) = self.get_node(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                for &child_id in &node.children {
                    self.write_outer_html(child_id, writer);
                }
            }
            NodeData::Comment => writer.push_str("<!---->"),
            NodeData::Text(data) => {
                let raw = node
                    .parent
                    .and_then(|id| self.element_name(id))
                    .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name.local.as_ref()));
                if raw {
                    writer.push_str(&data.content);
                } else {
                    html_escape::encode_text_to_string(&data.content, writer);
                }
            }
            NodeData::Element(data) => {
                writer.push('<');
                writer.push_str(&data.name.local);

                for attr in data.attrs() {
                    writer.push(' ');
                    writer.push_str(&attr.name.local);
                    writer.push_str("=\"");
                    html_escape::encode_double_quoted_attribute_to_string(&attr.value, writer);
                    writer.push('"');
                }
                writer.push('>');

                if data.is_void() {
                    return;
                }

                for &child_id in &node.children {
                    self.write_outer_html(child_id, writer);
                }

                writer.push_str("</");
                writer.push_str(&data.name.local);
                writer.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, attr_name};

    #[test]
    fn escapes_text_and_attributes() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        let text = doc.create_text_node("a < b & c");
        let br = doc.create_element("br");
        doc.mutate()
            .set_attribute(div, attr_name("title"), "say \"hi\"")
            .unwrap();
        doc.append_child(div, text).unwrap();
        doc.append_child(div, br).unwrap();

        assert_eq!(
            doc.outer_html(div),
            "<div title=\"say &quot;hi&quot;\">a &lt; b &amp; c<br></div>"
        );
        assert_eq!(doc.inner_html(div), "a &lt; b &amp; c<br>");
    }

    #[test]
    fn script_text_is_raw() {
        let mut doc = Document::default();
        let script = doc.create_element("script");
        let text = doc.create_text_node("if (a < b) {}");
        doc.append_child(script, text).unwrap();
        assert_eq!(doc.inner_html(script), "if (a < b) {}");
    }
}
