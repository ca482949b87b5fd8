use thiserror::Error;

/// Failures raised by tree operations on a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The node id does not (or no longer) refer to a node in the document
    #[error("node {0} does not exist")]
    NodeNotFound(usize),
    /// The node to remove or insert before is not a child of the given parent
    #[error("node {child} is not a child of node {parent}")]
    NotFound { parent: usize, child: usize },
    /// The operation needs an element but was given another kind of node
    #[error("node {0} is not an element")]
    NotAnElement(usize),
    /// Inserting the node would create a cycle or put a node somewhere it can't live
    #[error("cannot insert node {child} into node {parent}")]
    HierarchyRequest { parent: usize, child: usize },
    /// The element does not support the operation (e.g. `play` on a `<div>`)
    #[error("node {node} does not support {operation}")]
    NotSupported {
        node: usize,
        operation: &'static str,
    },
    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),
}
