use crate::Document;

/// Parses markup on behalf of the document (`set_inner_html`).
///
/// The document itself knows nothing about HTML syntax: an implementation (such as
/// `jel_html::HtmlParser`) creates the parsed nodes through the [`Document`] API and appends
/// them, in order, to `element_id`.
pub trait HtmlParserProvider {
    fn parse_inner_html(&self, doc: &mut Document, element_id: usize, html: &str);
}

/// Fallback used when no parser was configured: the markup is inserted as a single text node.
pub struct DummyHtmlParserProvider;
impl HtmlParserProvider for DummyHtmlParserProvider {
    fn parse_inner_html(&self, doc: &mut Document, element_id: usize, html: &str) {
        #[cfg(feature = "tracing")]
        tracing::warn!("No HTML parser configured, inserting markup as text");

        if html.is_empty() {
            return;
        }
        let text_id = doc.create_text_node(html);
        let _ = doc.append_child(element_id, text_id);
    }
}
