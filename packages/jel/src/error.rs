use jel_dom::DomError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// `construct` was called without a constructor
    #[error("entity type is undefined")]
    MissingType,
    /// A constructor returned something other than an element node or an entity
    #[error("invalid return type from entity constructor: expected an element or an entity")]
    InvalidConstructorResult,
    #[error("an entity spec can include 'content' or 'html', not both")]
    AmbiguousContent,
    /// `Dom::select` was given markup that does not describe exactly one element
    #[error("markup should describe exactly one element but produced {0} nodes; use parse_html for general markup")]
    AmbiguousMarkup(usize),
    #[error("invalid content type: {0}")]
    InvalidContent(&'static str),
    #[error("invalid type for 'classes': {0}")]
    InvalidClassSpec(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("property {0:?} is read-only")]
    ReadOnlyProperty(String),
    #[error("unknown property {0:?}")]
    UnknownProperty(String),
    /// An element operation was used on an entity that is not backed by the element constructor
    #[error("{entity_type} entities do not support {operation}")]
    Unsupported {
        entity_type: String,
        operation: &'static str,
    },
    /// The `Dom` an entity belongs to no longer exists
    #[error("the document this entity belongs to has been dropped")]
    DocumentDropped,
    #[error(transparent)]
    Dom(#[from] DomError),
}
