//! Content reconciliation: turning content values into child nodes of an element entity.

use jel_dom::{DomError, NodeKind};

use crate::element::ElementState;
use crate::entity::construct;
use crate::{Dom, Entity, Error, Value};

/// A child of an element entity: a text node, or an entity bound to a child element
#[derive(Clone, Debug, PartialEq)]
pub enum ContentNode {
    Text(usize),
    Entity(Entity),
}

impl ContentNode {
    pub fn node_id(&self) -> usize {
        match self {
            ContentNode::Text(node_id) => *node_id,
            ContentNode::Entity(entity) => entity.dom_element(),
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            ContentNode::Entity(entity) => Some(entity),
            ContentNode::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ContentNode::Text(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Insert {
    Append,
    /// Before the first child node
    Prepend,
}

/// Insert `content` into the element.
///
/// Falsy values other than numbers are skipped. Lists are inserted item by item; when
/// prepending they are walked backwards so they keep their order. Element nodes are wrapped,
/// text nodes and entities are inserted as they are, strings and numbers become new text nodes
/// and specs with a constructor become new entities.
pub(crate) fn add_content(
    dom: &Dom,
    state: &ElementState,
    content: Value,
    at: Insert,
) -> Result<(), Error> {
    if !content.is_truthy() && !matches!(content, Value::Number(_)) {
        return Ok(());
    }

    let item = match content {
        Value::List(items) => {
            if at == Insert::Prepend {
                for item in items.into_iter().rev() {
                    add_content(dom, state, item, at)?;
                }
            } else {
                for item in items {
                    add_content(dom, state, item, at)?;
                }
            }
            return Ok(());
        }
        Value::Node(node_id) => {
            let kind = dom.document().node_kind(node_id);
            match kind {
                Some(NodeKind::Element) => ContentNode::Entity(dom.wrap(node_id)?),
                Some(NodeKind::Text) => ContentNode::Text(node_id),
                Some(NodeKind::Comment) => return Err(Error::InvalidContent("comment")),
                Some(NodeKind::Document) => return Err(Error::InvalidContent("document")),
                None => return Err(DomError::NodeNotFound(node_id).into()),
            }
        }
        Value::Entity(entity) => ContentNode::Entity(entity),
        Value::String(text) => ContentNode::Text(dom.document_mut().create_text_node(&text)),
        number @ Value::Number(_) => {
            ContentNode::Text(dom.document_mut().create_text_node(&number.to_js_string()))
        }
        Value::Spec(spec) if spec.ty.is_some() => {
            let ty = spec.ty.clone();
            ContentNode::Entity(construct(dom, ty, *spec)?)
        }
        other => return Err(Error::InvalidContent(other.type_name())),
    };

    insert(dom, state, item.node_id(), at)?;

    if let ContentNode::Entity(entity) = item {
        if let Some(id) = entity.id() {
            let id = id.to_string();
            state.named_children.borrow_mut().insert(id, entity);
        }
    }
    Ok(())
}

fn insert(dom: &Dom, state: &ElementState, node_id: usize, at: Insert) -> Result<(), Error> {
    let mut doc = dom.document_mut();
    let reference = match at {
        Insert::Append => None,
        Insert::Prepend => doc.first_child(state.node_id),
    };
    doc.insert_before(state.node_id, node_id, reference)?;
    Ok(())
}

/// Register the children an adopted element already has: child elements are wrapped (which
/// adopts their own subtrees in turn) and the ones with an id go into the named-child table.
/// Nothing is moved.
pub(crate) fn adopt_children(dom: &Dom, state: &ElementState) -> Result<(), Error> {
    let element_ids: Vec<usize> = {
        let doc = dom.document();
        doc.children(state.node_id)
            .iter()
            .copied()
            .filter(|id| doc.is_element(*id))
            .collect()
    };
    for node_id in element_ids {
        let entity = dom.wrap(node_id)?;
        if let Some(id) = entity.id() {
            let id = id.to_string();
            state.named_children.borrow_mut().insert(id, entity);
        }
    }
    Ok(())
}

/// The element's children as content nodes. Comments are skipped.
pub(crate) fn content_nodes(dom: &Dom, node_id: usize) -> Result<Vec<ContentNode>, Error> {
    let children: Vec<(usize, Option<NodeKind>)> = {
        let doc = dom.document();
        doc.element_data(node_id)?;
        doc.children(node_id)
            .iter()
            .map(|id| (*id, doc.node_kind(*id)))
            .collect()
    };

    let mut content = Vec::with_capacity(children.len());
    for (child_id, kind) in children {
        match kind {
            Some(NodeKind::Element) => content.push(ContentNode::Entity(dom.wrap(child_id)?)),
            Some(NodeKind::Text) => content.push(ContentNode::Text(child_id)),
            _ => {}
        }
    }
    Ok(content)
}
