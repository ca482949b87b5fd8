//! Entity/element binding for Jel
//!
//! This crate binds stateful wrappers ("entities") to the elements of a [`jel_dom::Document`].
//! An entity is built by a [`Constructor`] from an [`EntitySpec`]: the built-in element
//! constructor creates (or adopts) an element and applies classes, attributes, data attributes,
//! inline style and content to it; custom constructors compose other entities and describe
//! their own properties and events through [`Define`].
//!
//! Entry points:
//!  - [`Dom`] owns the document and the wrap cache. [`Dom::wrap`] binds existing elements,
//!    [`Dom::create`]/[`Dom::construct`] build new entities and [`Dom::tags`] offers tag-named
//!    shortcuts.
//!  - [`Entity`] exposes the element operations: class lists, attribute/data/style views,
//!    content reconciliation, queries, events and pass-through element properties.
//!  - [`Factory`] keeps named constructors bound to a document.

// ## Feature flags
//  - `default`: Enables the features listed below.
//  - `tracing`: Enables tracing support.

mod accessors;
mod builder;
mod cache;
mod classes;
mod content;
mod define;
mod dom;
mod element;
mod entity;
mod error;
mod events;
mod spec;
mod style;
mod value;

pub use accessors::{AttributeView, DataView};
pub use builder::{DomBuilder, Factory, FactoryFn, TagArgs};
pub use classes::{ClassList, flatten_classes};
pub use content::ContentNode;
pub use define::{
    Constructor, ConstructorFn, Define, DomFacing, ElementMode, Getter, Property, Setter,
};
pub use dom::{Dom, WeakDom, WrapTarget};
pub use entity::{AsNodeId, Entity};
pub use error::Error;
pub use events::{EventBinding, EventData, EventTable, Handler, Trigger};
pub use spec::{EntitySpec, StyleSpec};
pub use style::StyleView;
pub use value::{Function, Value};

pub use jel_dom;
