use crate::events::RegisteredListener;
use crate::node::{Attribute, ElementData, Node, NodeData, NodeKind, TextNodeData};
use crate::{
    DocumentConfig, DocumentMutator, DomError, DummyHtmlParserProvider, HtmlParserProvider,
};
use kurbo::Size;
use markup5ever::{LocalName, QualName, ns};
use rustc_hash::FxHashMap;
use slab::Slab;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The id of the `#document` node of every [`Document`].
pub const ROOT_NODE_ID: usize = 0;

/// A headless HTML document: a slab-backed tree of nodes plus the document-level state
/// (focus, fullscreen, pointer lock, event listeners) an embedder drives.
///
/// Nodes are addressed by their slab id. A node lives in the slab until it is dropped with
/// [`Document::remove_and_drop_node`]; detaching it from its parent keeps it alive so it can be
/// re-inserted elsewhere.
pub struct Document {
    /// ID of the document
    id: usize,

    /// A slab-backed tree of nodes
    pub(crate) nodes: Slab<Node>,

    /// Viewport dimensions, used to bound fullscreen elements
    pub(crate) viewport: Size,

    /// The node which is currently focussed (if any)
    pub(crate) focus_node_id: Option<usize>,
    /// The node which is currently fullscreen (if any)
    pub(crate) fullscreen_node_id: Option<usize>,
    /// The node which holds the pointer lock (if any)
    pub(crate) pointer_lock_node_id: Option<usize>,

    /// Event listeners by node id
    pub(crate) listeners: FxHashMap<usize, Vec<RegisteredListener>>,

    html_id: usize,
    head_id: usize,
    body_id: usize,

    /// HTML parser provider. Used to parse HTML for `set_inner_html`
    pub html_parser_provider: Arc<dyn HtmlParserProvider>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentConfig::default())
    }
}

impl Document {
    /// Create a new [`Document`] containing an empty `html > (head, body)` skeleton
    pub fn new(config: DocumentConfig) -> Self {
        static ID_GENERATOR: AtomicUsize = AtomicUsize::new(1);

        let id = ID_GENERATOR.fetch_add(1, Ordering::SeqCst);

        let html_parser_provider = config
            .html_parser_provider
            .unwrap_or_else(|| Arc::new(DummyHtmlParserProvider));

        let mut doc = Self {
            id,
            nodes: Slab::new(),
            viewport: config.viewport.unwrap_or(Size::new(800.0, 600.0)),
            focus_node_id: None,
            fullscreen_node_id: None,
            pointer_lock_node_id: None,
            listeners: FxHashMap::default(),
            html_id: 0,
            head_id: 0,
            body_id: 0,
            html_parser_provider,
        };

        // Initialise document with root Document node
        let root = doc.create_node(NodeData::Document);
        debug_assert_eq!(root, ROOT_NODE_ID);

        doc.html_id = doc.create_element("html");
        doc.head_id = doc.create_element("head");
        doc.body_id = doc.create_element("body");
        doc.link(ROOT_NODE_ID, doc.html_id, None);
        doc.link(doc.html_id, doc.head_id, None);
        doc.link(doc.html_id, doc.body_id, None);

        doc
    }

    pub fn mutate<'doc>(&'doc mut self) -> DocumentMutator<'doc> {
        DocumentMutator::new(self)
    }

    /// Set the Document's html parser provider
    pub fn set_html_parser_provider(&mut self, html_parser_provider: Arc<dyn HtmlParserProvider>) {
        self.html_parser_provider = html_parser_provider;
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn tree(&self) -> &Slab<Node> {
        &self.nodes
    }

    pub fn get_node(&self, node_id: usize) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn get_node_mut(&mut self, node_id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    pub(crate) fn node(&self, node_id: usize) -> Result<&Node, DomError> {
        self.nodes.get(node_id).ok_or(DomError::NodeNotFound(node_id))
    }

    pub(crate) fn node_mut(&mut self, node_id: usize) -> Result<&mut Node, DomError> {
        self.nodes
            .get_mut(node_id)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    pub fn root_element_id(&self) -> usize {
        self.html_id
    }

    pub fn head_id(&self) -> usize {
        self.head_id
    }

    pub fn body_id(&self) -> usize {
        self.body_id
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn node_kind(&self, node_id: usize) -> Option<NodeKind> {
        self.nodes.get(node_id).map(|node| node.data.kind())
    }

    pub fn is_element(&self, node_id: usize) -> bool {
        self.node_kind(node_id) == Some(NodeKind::Element)
    }

    pub fn is_text_node(&self, node_id: usize) -> bool {
        self.node_kind(node_id) == Some(NodeKind::Text)
    }

    pub fn element_data(&self, node_id: usize) -> Result<&ElementData, DomError> {
        self.node(node_id)?
            .element_data()
            .ok_or(DomError::NotAnElement(node_id))
    }

    pub fn element_data_mut(&mut self, node_id: usize) -> Result<&mut ElementData, DomError> {
        self.node_mut(node_id)?
            .element_data_mut()
            .ok_or(DomError::NotAnElement(node_id))
    }

    pub fn element_name(&self, node_id: usize) -> Option<&QualName> {
        self.nodes
            .get(node_id)?
            .element_data()
            .map(|data| &data.name)
    }

    pub fn create_node(&mut self, node_data: NodeData) -> usize {
        let entry = self.nodes.vacant_entry();
        let id = entry.key();
        entry.insert(Node::new(id, node_data));
        id
    }

    /// Create a (detached) HTML element. The tag name is lowercased.
    pub fn create_element(&mut self, tag: &str) -> usize {
        let name = QualName::new(None, ns!(html), LocalName::from(tag.to_ascii_lowercase()));
        self.create_element_with(name, Vec::new())
    }

    pub fn create_element_with(&mut self, name: QualName, attrs: Vec<Attribute>) -> usize {
        self.create_node(NodeData::Element(ElementData::new(name, attrs)))
    }

    pub fn create_text_node(&mut self, text: &str) -> usize {
        let content = TextNodeData::new(text.to_string());
        self.create_node(NodeData::Text(content))
    }

    pub fn create_comment_node(&mut self) -> usize {
        self.create_node(NodeData::Comment)
    }

    pub fn parent(&self, node_id: usize) -> Option<usize> {
        self.nodes.get(node_id)?.parent
    }

    /// The parent, if it is an element (the `#document` node is not)
    pub fn parent_element(&self, node_id: usize) -> Option<usize> {
        self.parent(node_id).filter(|id| self.is_element(*id))
    }

    pub fn children(&self, node_id: usize) -> &[usize] {
        self.nodes
            .get(node_id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, node_id: usize) -> Option<usize> {
        self.children(node_id).first().copied()
    }

    pub fn last_child(&self, node_id: usize) -> Option<usize> {
        self.children(node_id).last().copied()
    }

    pub fn previous_sibling(&self, node_id: usize) -> Option<usize> {
        let parent = self.parent(node_id)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|id| *id == node_id)?;
        idx.checked_sub(1).map(|idx| siblings[idx])
    }

    pub fn next_sibling(&self, node_id: usize) -> Option<usize> {
        let parent = self.parent(node_id)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|id| *id == node_id)?;
        siblings.get(idx + 1).copied()
    }

    /// The node followed by its ancestors, up to the root of its tree
    pub fn node_chain(&self, node_id: usize) -> Vec<usize> {
        let mut chain = Vec::with_capacity(16);
        let mut next_node_id = self.nodes.get(node_id).map(|_| node_id);
        while let Some(id) = next_node_id {
            chain.push(id);
            next_node_id = self.nodes.get(id).and_then(|node| node.parent);
        }
        chain
    }

    /// Whether `ancestor` is `node_id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: usize, node_id: usize) -> bool {
        self.node_chain(node_id).contains(&ancestor)
    }

    /// Whether the node is connected to the `#document` root
    pub fn is_connected(&self, node_id: usize) -> bool {
        self.node_chain(node_id).last() == Some(&ROOT_NODE_ID)
    }

    /// All descendants of `node_id` in tree order (not including `node_id` itself)
    pub fn descendants(&self, node_id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children(node_id).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn check_insertion(&self, parent_id: usize, child_id: usize) -> Result<(), DomError> {
        let parent = self.node(parent_id)?;
        let child = self.node(child_id)?;
        let parent_can_have_children =
            matches!(parent.data, NodeData::Element(_) | NodeData::Document);
        if !parent_can_have_children
            || matches!(child.data, NodeData::Document)
            || self.is_inclusive_ancestor(child_id, parent_id)
        {
            return Err(DomError::HierarchyRequest {
                parent: parent_id,
                child: child_id,
            });
        }
        Ok(())
    }

    /// Detach the node from its current parent (if any) and insert it into `parent_id` before
    /// `before` (or at the end).
    fn link(&mut self, parent_id: usize, child_id: usize, before: Option<usize>) {
        self.remove_from_parent(child_id);
        let parent = &mut self.nodes[parent_id];
        let idx = before
            .and_then(|id| parent.index_of_child(id))
            .unwrap_or(parent.children.len());
        parent.children.insert(idx, child_id);
        self.nodes[child_id].parent = Some(parent_id);
    }

    pub fn append_child(&mut self, parent_id: usize, child_id: usize) -> Result<(), DomError> {
        self.check_insertion(parent_id, child_id)?;
        self.link(parent_id, child_id, None);
        Ok(())
    }

    /// Insert `child_id` into `parent_id` before `reference_id`, or at the end when there is no
    /// reference node.
    pub fn insert_before(
        &mut self,
        parent_id: usize,
        child_id: usize,
        reference_id: Option<usize>,
    ) -> Result<(), DomError> {
        self.check_insertion(parent_id, child_id)?;
        if let Some(reference_id) = reference_id {
            if self.parent(reference_id) != Some(parent_id) {
                return Err(DomError::NotFound {
                    parent: parent_id,
                    child: reference_id,
                });
            }
            // Inserting a node before itself is a no-op
            if reference_id == child_id {
                return Ok(());
            }
        }
        self.link(parent_id, child_id, reference_id);
        Ok(())
    }

    pub fn remove_child(&mut self, parent_id: usize, child_id: usize) -> Result<(), DomError> {
        if self.node(child_id)?.parent != Some(parent_id) {
            return Err(DomError::NotFound {
                parent: parent_id,
                child: child_id,
            });
        }
        self.remove_from_parent(child_id);
        Ok(())
    }

    /// Detach the node from its parent. The node (and its subtree) stays alive.
    pub fn remove_from_parent(&mut self, node_id: usize) {
        let Some(parent_id) = self.nodes.get_mut(node_id).and_then(|node| node.parent.take())
        else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children.retain(|id| *id != node_id);
        }
    }

    /// Remove all of the children from old_parent_id and append them to new_parent_id
    pub fn reparent_children(
        &mut self,
        old_parent_id: usize,
        new_parent_id: usize,
    ) -> Result<(), DomError> {
        let child_ids = self.children(old_parent_id).to_vec();
        for child_id in child_ids {
            self.append_child(new_parent_id, child_id)?;
        }
        Ok(())
    }

    /// Detach every child of the node, returning their ids
    pub fn remove_all_children(&mut self, node_id: usize) -> Vec<usize> {
        let Some(node) = self.nodes.get_mut(node_id) else {
            return Vec::new();
        };
        let child_ids = std::mem::take(&mut node.children);
        for child_id in &child_ids {
            self.nodes[*child_id].parent = None;
        }
        child_ids
    }

    /// Detach the node and drop it together with its whole subtree.
    ///
    /// Returns the ids of every dropped node. Those ids may be handed out again by later
    /// `create_*` calls, so anything keyed by node id must be evicted by the caller.
    pub fn remove_and_drop_node(&mut self, node_id: usize) -> Vec<usize> {
        if node_id == ROOT_NODE_ID || !self.nodes.contains(node_id) {
            return Vec::new();
        }
        self.remove_from_parent(node_id);

        let mut dropped = vec![node_id];
        dropped.extend(self.descendants(node_id));
        for id in &dropped {
            self.nodes.remove(*id);
            self.listeners.remove(id);
        }

        for slot in [
            &mut self.focus_node_id,
            &mut self.fullscreen_node_id,
            &mut self.pointer_lock_node_id,
        ] {
            if slot.is_some_and(|id| dropped.contains(&id)) {
                *slot = None;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!("Dropped {} node(s) rooted at {node_id}", dropped.len());

        dropped
    }

    /// The concatenated text of all descendant text nodes
    pub fn text_content(&self, node_id: usize) -> String {
        let Some(node) = self.nodes.get(node_id) else {
            return String::new();
        };
        if let NodeData::Text(data) = &node.data {
            return data.content.clone();
        }
        self.descendants(node_id)
            .into_iter()
            .filter_map(|id| self.nodes[id].text_data())
            .map(|data| data.content.as_str())
            .collect()
    }

    /// Replace all children with a single text node (or nothing, for empty text).
    /// On a text node this replaces its data.
    pub fn set_text_content(&mut self, node_id: usize, text: &str) -> Result<(), DomError> {
        if let Some(data) = self.node_mut(node_id)?.text_data_mut() {
            data.content.clear();
            data.content.push_str(text);
            return Ok(());
        }
        self.remove_all_children(node_id);
        if !text.is_empty() {
            let text_id = self.create_text_node(text);
            self.link(node_id, text_id, None);
        }
        Ok(())
    }

    /// Replace the children of an element with the result of parsing `html`
    pub fn set_inner_html(&mut self, node_id: usize, html: &str) -> Result<(), DomError> {
        self.element_data(node_id)?;
        self.remove_all_children(node_id);
        let provider = self.html_parser_provider.clone();
        provider.parse_inner_html(self, node_id, html);
        Ok(())
    }

    /// Find the first element in the document with the specified id attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<usize> {
        self.descendants(ROOT_NODE_ID)
            .into_iter()
            .find(|node_id| self.nodes[*node_id].attr("id") == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_skeleton() {
        let doc = Document::default();
        let body = doc.body_id();
        assert!(doc.is_connected(body));
        assert_eq!(doc.parent_element(body), Some(doc.root_element_id()));
        assert_eq!(doc.parent_element(doc.root_element_id()), None);
    }

    #[test]
    fn append_moves_between_parents() {
        let mut doc = Document::default();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let child = doc.create_text_node("x");
        doc.append_child(a, child).unwrap();
        doc.append_child(b, child).unwrap();
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[child]);
        assert_eq!(doc.parent(child), Some(b));
    }

    #[test]
    fn insert_before_and_siblings() {
        let mut doc = Document::default();
        let parent = doc.create_element("ul");
        let first = doc.create_element("li");
        let second = doc.create_element("li");
        doc.append_child(parent, second).unwrap();
        doc.insert_before(parent, first, Some(second)).unwrap();
        assert_eq!(doc.children(parent), &[first, second]);
        assert_eq!(doc.next_sibling(first), Some(second));
        assert_eq!(doc.previous_sibling(second), Some(first));
    }

    #[test]
    fn rejects_cycles() {
        let mut doc = Document::default();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest {
                parent: inner,
                child: outer
            })
        );
        let text = doc.create_text_node("t");
        assert!(doc.append_child(text, inner).is_err());
    }

    #[test]
    fn remove_child_requires_parentage() {
        let mut doc = Document::default();
        let parent = doc.create_element("div");
        let stranger = doc.create_element("span");
        assert_eq!(
            doc.remove_child(parent, stranger),
            Err(DomError::NotFound {
                parent,
                child: stranger
            })
        );
    }

    #[test]
    fn drop_reports_whole_subtree() {
        let mut doc = Document::default();
        let outer = doc.create_element("div");
        let inner = doc.create_element("p");
        let text = doc.create_text_node("hi");
        doc.append_child(doc.body_id(), outer).unwrap();
        doc.append_child(outer, inner).unwrap();
        doc.append_child(inner, text).unwrap();

        let mut dropped = doc.remove_and_drop_node(outer);
        dropped.sort();
        assert_eq!(dropped, vec![outer, inner, text]);
        assert!(doc.get_node(inner).is_none());
        assert!(doc.children(doc.body_id()).is_empty());
    }

    #[test]
    fn text_content_round_trip() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        let span = doc.create_element("span");
        let a = doc.create_text_node("a");
        let b = doc.create_text_node("b");
        doc.append_child(div, a).unwrap();
        doc.append_child(div, span).unwrap();
        doc.append_child(span, b).unwrap();
        assert_eq!(doc.text_content(div), "ab");

        doc.set_text_content(div, "replaced").unwrap();
        assert_eq!(doc.children(div).len(), 1);
        assert_eq!(doc.text_content(div), "replaced");
    }
}
