use crate::HtmlParserProvider;
use kurbo::Size;
use std::sync::Arc;

/// Options used when constructing a [`Document`](crate::Document)
#[derive(Default)]
pub struct DocumentConfig {
    /// The initial viewport size. Defaults to 800x600.
    pub viewport: Option<Size>,
    /// HTML parser provider. Used to parse HTML for `set_inner_html`
    pub html_parser_provider: Option<Arc<dyn HtmlParserProvider>>,
}
