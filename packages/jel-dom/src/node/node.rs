use std::fmt::Write;

use kurbo::{Rect, Vec2};

use super::ElementData;

pub struct Node {
    /// Our Id
    pub id: usize,
    /// Our parent's ID
    pub parent: Option<usize>,
    // What are our children?
    pub children: Vec<usize>,

    /// Node type (Element, TextNode, etc) specific data
    pub data: NodeData,

    /// Border box relative to the parent's border box. Assigned by whoever lays the tree out.
    pub layout: Rect,
    /// How far the node's content is scrolled
    pub scroll_offset: Vec2,
}

impl Node {
    pub(crate) fn new(id: usize, data: NodeData) -> Self {
        Self {
            id,
            parent: None,
            children: vec![],
            data,
            layout: Rect::ZERO,
            scroll_offset: Vec2::ZERO,
        }
    }

    // Get the index of the current node in the parents child list
    pub fn index_of_child(&self, child_id: usize) -> Option<usize> {
        self.children.iter().position(|id| *id == child_id)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    pub fn is_text_node(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    pub fn element_data(&self) -> Option<&ElementData> {
        match self.data {
            NodeData::Element(ref data) => Some(data),
            _ => None,
        }
    }

    pub fn element_data_mut(&mut self) -> Option<&mut ElementData> {
        match self.data {
            NodeData::Element(ref mut data) => Some(data),
            _ => None,
        }
    }

    pub fn text_data(&self) -> Option<&TextNodeData> {
        match self.data {
            NodeData::Text(ref data) => Some(data),
            _ => None,
        }
    }

    pub fn text_data_mut(&mut self) -> Option<&mut TextNodeData> {
        match self.data {
            NodeData::Text(ref mut data) => Some(data),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element_data()?.attr(name)
    }

    pub fn node_debug_str(&self) -> String {
        let mut s = String::new();

        let _ = match &self.data {
            NodeData::Document => write!(s, "DOCUMENT"),
            NodeData::Text(data) => {
                let preview: String = data.content.chars().take(10).collect();
                write!(s, "TEXT {preview:?}")
            }
            NodeData::Comment => write!(s, "COMMENT"),
            NodeData::Element(data) => {
                let name = &data.name;
                let class = data.attr("class").unwrap_or("");
                if !class.is_empty() {
                    write!(s, "<{} class=\"{}\">", name.local, class)
                } else {
                    write!(s, "<{}>", name.local)
                }
            }
        };
        s
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
}

/// The different kinds of nodes in the DOM.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The `Document` itself - the root node of a HTML document.
    Document,

    /// An element with attributes.
    Element(ElementData),

    /// A text node.
    Text(TextNodeData),

    /// A comment.
    Comment,
}

impl NodeData {
    pub fn downcast_element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_element_with_tag_name(&self, name: &str) -> bool {
        let Some(elem) = self.downcast_element() else {
            return false;
        };
        (&*elem.name.local).eq_ignore_ascii_case(name)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document => NodeKind::Document,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment => NodeKind::Comment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextNodeData {
    /// The textual content of the text node
    pub content: String,
}

impl TextNodeData {
    pub fn new(content: String) -> Self {
        Self { content }
    }
}
