//! HTML parsing for the Jel host document, backed by html5ever.
//!
//! Install [`HtmlParser`] as a document's [`HtmlParserProvider`] to make `set_inner_html` (and
//! with it every markup-based Jel operation) parse real HTML:
//!
//! ```
//! use std::sync::Arc;
//! use jel_dom::{Document, DocumentConfig};
//! use jel_html::HtmlParser;
//!
//! let mut doc = Document::new(DocumentConfig {
//!     html_parser_provider: Some(Arc::new(HtmlParser)),
//!     ..Default::default()
//! });
//! let body = doc.body_id();
//! doc.set_inner_html(body, "<p>Hello <b>world</b></p>").unwrap();
//! assert_eq!(doc.inner_html(body), "<p>Hello <b>world</b></p>");
//! ```

mod html_sink;

use std::sync::Arc;

use jel_dom::{Document, DocumentConfig, HtmlParserProvider};

pub use html_sink::DocumentHtmlParser;

/// An [`HtmlParserProvider`] that parses markup with html5ever
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParserProvider for HtmlParser {
    fn parse_inner_html(&self, doc: &mut Document, element_id: usize, html: &str) {
        if let Err(_err) = DocumentHtmlParser::parse_fragment_into(doc, element_id, html) {
            #[cfg(feature = "tracing")]
            tracing::error!("Failed to insert parsed markup into node {element_id}: {_err}");
        }
    }
}

/// Parse a whole HTML document.
///
/// The parsed `head` and `body` contents end up in the new document's `head` and `body`. The
/// document is configured to use [`HtmlParser`] for later `set_inner_html` calls unless the
/// config names another provider.
pub fn document_from_html(html: &str, mut config: DocumentConfig) -> Document {
    if config.html_parser_provider.is_none() {
        config.html_parser_provider = Some(Arc::new(HtmlParser));
    }
    let mut doc = Document::new(config);

    let scratch_id = DocumentHtmlParser::parse_into_scratch(&mut doc, html);
    let sections = DocumentHtmlParser::scratch_sections(&doc, scratch_id);
    let targets = [doc.head_id(), doc.body_id()];
    for (section_id, target_id) in sections.into_iter().zip(targets) {
        let parsed_attrs = doc
            .get_node(section_id)
            .and_then(|node| node.element_data())
            .map(|data| data.attrs().to_vec())
            .unwrap_or_default();
        let mut mutator = doc.mutate();
        if let Err(_err) = mutator.add_attrs_if_missing(target_id, parsed_attrs) {
            #[cfg(feature = "tracing")]
            tracing::warn!("Could not copy attributes of parsed section: {_err}");
        }
        if let Err(_err) = mutator.reparent_children(section_id, target_id) {
            #[cfg(feature = "tracing")]
            tracing::warn!("Could not move parsed section: {_err}");
        }
    }
    doc.remove_and_drop_node(scratch_id);

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let doc = document_from_html(
            "<!DOCTYPE html><html><head><title>T</title></head>\
             <body class=page><h1>hello world</h1></body></html>",
            DocumentConfig::default(),
        );
        let head = doc.head_id();
        let body = doc.body_id();
        assert_eq!(doc.inner_html(head), "<title>T</title>");
        assert_eq!(doc.inner_html(body), "<h1>hello world</h1>");
        assert_eq!(doc.get_node(body).unwrap().attr("class"), Some("page"));
    }

    #[test]
    fn set_inner_html_uses_provider() {
        let mut doc = document_from_html("", DocumentConfig::default());
        let body = doc.body_id();
        doc.set_inner_html(body, "<ul><li>a</li></ul>").unwrap();
        let item = doc.query_selector(body, "ul > li").unwrap();
        assert_eq!(item.map(|id| doc.text_content(id)).as_deref(), Some("a"));
    }
}
