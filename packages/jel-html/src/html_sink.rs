//! An implementation for Html5ever's sink trait, allowing us to parse HTML into a Jel document.

use html5ever::ParseOpts;
use html5ever::tokenizer::TokenizerOpts;
use html5ever::tree_builder::TreeBuilderOpts;
use std::borrow::Cow;
use std::cell::{Cell, Ref, RefCell, RefMut};

use html5ever::{
    QualName,
    tendril::{StrTendril, TendrilSink},
    tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink},
};
use jel_dom::node::Attribute;
use jel_dom::{Document, DocumentMutator, DomError, NodeData};

/// Convert an html5ever Attribute which uses tendril for its value to a jel Attribute
/// which uses String.
fn html5ever_to_jel_attr(attr: html5ever::Attribute) -> Attribute {
    Attribute {
        name: attr.name,
        value: attr.value.to_string(),
    }
}

/// Builds parsed markup into a [`Document`].
///
/// Parsing always runs in document mode, into a detached scratch node that stands in for the
/// `#document`. Callers then move what they need out of the scratch tree and drop it.
pub struct DocumentHtmlParser<'doc> {
    document_mutator: RefCell<DocumentMutator<'doc>>,

    /// The node standing in for the `#document` while parsing
    scratch_id: usize,

    /// Errors that occurred during parsing.
    pub errors: RefCell<Vec<Cow<'static, str>>>,

    /// The document's quirks mode.
    pub quirks_mode: Cell<QuirksMode>,
}

impl<'doc> DocumentHtmlParser<'doc> {
    #[track_caller]
    /// Get a mutable borrow of the DocumentMutator
    fn mutr(&self) -> RefMut<'_, DocumentMutator<'doc>> {
        self.document_mutator.borrow_mut()
    }

    /// Record a tree operation the document refused. html5ever never asks for impossible
    /// insertions, so this only fires if the sink and the document disagree.
    fn check(&self, result: Result<(), DomError>) {
        if let Err(err) = result {
            #[cfg(feature = "tracing")]
            tracing::warn!("HTML tree builder operation failed: {err}");
            self.errors.borrow_mut().push(Cow::Owned(err.to_string()));
        }
    }
}

impl DocumentHtmlParser<'_> {
    pub fn new(doc: &mut Document, scratch_id: usize) -> DocumentHtmlParser<'_> {
        DocumentHtmlParser {
            document_mutator: RefCell::new(doc.mutate()),
            scratch_id,
            errors: RefCell::new(Vec::new()),
            quirks_mode: Cell::new(QuirksMode::NoQuirks),
        }
    }

    /// Parse `html` into a new detached scratch tree and return the id of its root.
    ///
    /// The scratch tree has the usual `html > (head, body)` shape; the caller owns it and must
    /// drop it with [`Document::remove_and_drop_node`] when done.
    pub fn parse_into_scratch(doc: &mut Document, html: &str) -> usize {
        let scratch_id = doc.create_node(NodeData::Document);
        let sink = DocumentHtmlParser::new(doc, scratch_id);

        let opts = ParseOpts {
            tokenizer: TokenizerOpts::default(),
            tree_builder: TreeBuilderOpts {
                exact_errors: false,
                scripting_enabled: false, // Enables parsing of <noscript> tags
                iframe_srcdoc: false,
                drop_doctype: true,
                quirks_mode: QuirksMode::NoQuirks,
            },
        };
        html5ever::parse_document(sink, opts).one(html);

        scratch_id
    }

    /// The `head` and `body` elements of a scratch tree, in that order
    pub fn scratch_sections(doc: &Document, scratch_id: usize) -> Vec<usize> {
        let html_id = doc
            .children(scratch_id)
            .iter()
            .copied()
            .find(|id| doc.is_element(*id));
        html_id
            .map(|html_id| {
                doc.children(html_id)
                    .iter()
                    .copied()
                    .filter(|id| doc.is_element(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse `html` as a fragment and append the resulting nodes to `element_id`
    pub fn parse_fragment_into(
        doc: &mut Document,
        element_id: usize,
        html: &str,
    ) -> Result<(), DomError> {
        let scratch_id = Self::parse_into_scratch(doc, html);
        let mut result = Ok(());
        for section_id in Self::scratch_sections(doc, scratch_id) {
            result = doc.reparent_children(section_id, element_id);
            if result.is_err() {
                break;
            }
        }
        doc.remove_and_drop_node(scratch_id);
        result
    }
}

impl<'b> TreeSink for DocumentHtmlParser<'b> {
    type Output = ();

    // we use the ID of the nodes in the tree as the handle
    type Handle = usize;

    type ElemName<'a>
        = Ref<'a, QualName>
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        drop(self.document_mutator.into_inner());
        #[cfg(feature = "tracing")]
        for error in self.errors.borrow().iter() {
            tracing::debug!("HTML parse error: {error}");
        }
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.borrow_mut().push(msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.scratch_id
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.document_mutator.borrow(), |docm| {
            docm.element_name(*target)
                .expect("TreeSink::elem_name called on a node which is not an element!")
        })
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs.into_iter().map(html5ever_to_jel_attr).collect();
        self.mutr().create_element(name, attrs)
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        self.mutr().create_comment_node()
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        self.mutr().create_comment_node()
    }

    fn append(&self, parent_id: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(id) => {
                let result = self.mutr().append_children(*parent_id, &[id]);
                self.check(result);
            }
            // If content to append is text, first attempt to append it to the last child of parent.
            // Else create a new text node and append it to the parent
            NodeOrText::AppendText(text) => {
                let last_child_id = self.mutr().last_child_id(*parent_id);
                let has_appended = if let Some(id) = last_child_id {
                    self.mutr().append_text_to_node(id, &text).is_ok()
                } else {
                    false
                };
                if !has_appended {
                    let new_child_id = self.mutr().create_text_node(&text);
                    let result = self.mutr().append_children(*parent_id, &[new_child_id]);
                    self.check(result);
                }
            }
        }
    }

    // Note: The tree builder promises we won't have a text node after the insertion point.
    fn append_before_sibling(&self, sibling_id: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        match new_node {
            NodeOrText::AppendNode(id) => {
                let result = self.mutr().insert_nodes_before(*sibling_id, &[id]);
                self.check(result);
            }
            // If content to append is text, first attempt to append it to the node before sibling_node
            // Else create a new text node and insert it before sibling_node
            NodeOrText::AppendText(text) => {
                let previous_sibling_id = self.mutr().previous_sibling_id(*sibling_id);
                let has_appended = if let Some(id) = previous_sibling_id {
                    self.mutr().append_text_to_node(id, &text).is_ok()
                } else {
                    false
                };
                if !has_appended {
                    let new_child_id = self.mutr().create_text_node(&text);
                    let result = self
                        .mutr()
                        .insert_nodes_before(*sibling_id, &[new_child_id]);
                    self.check(result);
                }
            }
        };
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if self.mutr().node_has_parent(*element) {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Ignore. Documents are always in no-quirks mode.
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Template contents live directly under the <template> element
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.quirks_mode.set(mode);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        let attrs = attrs.into_iter().map(html5ever_to_jel_attr).collect();
        let result = self.mutr().add_attrs_if_missing(*target, attrs);
        self.check(result);
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.mutr().remove_node(*target);
    }

    fn reparent_children(&self, old_parent_id: &Self::Handle, new_parent_id: &Self::Handle) {
        let result = self
            .mutr()
            .reparent_children(*old_parent_id, *new_parent_id);
        self.check(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fragment_into_element() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        DocumentHtmlParser::parse_fragment_into(
            &mut doc,
            div,
            "<p class=a>hi <b>there</b></p>tail &amp; end",
        )
        .unwrap();

        assert_eq!(doc.inner_html(div), "<p class=\"a\">hi <b>there</b></p>tail &amp; end");
        assert_eq!(doc.children(div).len(), 2);
        assert_eq!(doc.text_content(div), "hi theretail & end");
    }

    #[test]
    fn scratch_tree_is_dropped() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        let before = doc.tree().len();
        DocumentHtmlParser::parse_fragment_into(&mut doc, div, "<span>x</span>").unwrap();
        // Only the span and its text survive
        assert_eq!(doc.tree().len(), before + 2);
    }

    #[test]
    fn keeps_sibling_order() {
        let mut doc = Document::default();
        let ul = doc.create_element("ul");
        DocumentHtmlParser::parse_fragment_into(&mut doc, ul, "<li>one</li><li>two</li>")
            .unwrap();
        let items: Vec<String> = doc
            .children(ul)
            .iter()
            .map(|id| doc.text_content(*id))
            .collect();
        assert_eq!(items, ["one", "two"]);
    }
}
