//! The host document used by Jel
//!
//! This crate implements a small headless DOM ([`Document`]) which is designed to be embedded in
//! and "driven" by external code. It is what Jel entities are bound to: a slab-backed tree of
//! elements and text with attributes, inline styles, form state, event listeners with bubbling
//! dispatch, `querySelector` support and HTML serialisation.
//!
//! The document has no layout engine. Geometry (used for client rects and scroll extents) is
//! assigned by the embedder through [`Document::set_layout`].
//!
//! Parsing markup (`set_inner_html`) is delegated to an [`HtmlParserProvider`]. The
//! [jel-html](../jel_html/index.html) crate provides one backed by html5ever.

// ## Feature flags
//  - `default`: Enables the features listed below.
//  - `tracing`: Enables tracing support.

/// The DOM implementation.
///
/// This is the primary entry point for this crate.
mod document;

/// The nodes themselves, and their data.
pub mod node;

mod config;
mod debug;
mod error;
mod geometry;
mod html;
mod mutator;
mod query_selector;
mod serialize;
mod state;
pub mod events;
pub mod style;

pub use config::DocumentConfig;
pub use document::{Document, ROOT_NODE_ID};
pub use error::DomError;
pub use events::{DomEvent, EventListener, PointerData, blur, click, dispatch_event, focus};
pub use html::{DummyHtmlParserProvider, HtmlParserProvider};
pub use markup5ever::{LocalName, Namespace, Prefix, QualName, local_name, ns};
pub use mutator::{AppendTextErr, DocumentMutator};
pub use node::{
    Attribute, ElementData, ElementState, Node, NodeData, NodeKind, TextNodeData, attr_name,
};
pub use query_selector::{HtmlSelectors, PseudoClass, SelectorList};
pub use style::InlineStyle;

pub use kurbo::{Point, Rect, Size, Vec2};
