#![allow(clippy::module_inception)]

mod attributes;
mod element;
mod node;

pub use attributes::{Attribute, Attributes, attr_name};
pub use element::{ElementData, ElementState};
pub use node::*;
