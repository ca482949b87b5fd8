//! Box geometry.
//!
//! The document does not lay anything out itself. Whoever embeds it assigns each node a border
//! box relative to its parent with [`Document::set_layout`]; everything else (client rects,
//! scroll extents) is derived from those boxes.

use kurbo::{Point, Rect, Vec2};

use crate::{Document, DomError};

impl Document {
    /// Assign the border box of a node, relative to its parent's border box
    pub fn set_layout(&mut self, node_id: usize, layout: Rect) -> Result<(), DomError> {
        self.node_mut(node_id)?.layout = layout;
        Ok(())
    }

    pub fn layout(&self, node_id: usize) -> Option<Rect> {
        self.get_node(node_id).map(|node| node.layout)
    }

    /// Position of the node relative to the viewport, taking the scroll offsets of its ancestors
    /// into account.
    pub fn bounding_client_rect(&self, node_id: usize) -> Result<Rect, DomError> {
        let layout = self.node(node_id)?.layout;
        let mut origin = layout.origin();
        let mut parent_id = self.parent(node_id);
        while let Some(id) = parent_id {
            let parent = &self.nodes[id];
            origin += parent.layout.origin().to_vec2() - parent.scroll_offset;
            parent_id = parent.parent;
        }
        Ok(Rect::from_origin_size(origin, layout.size()))
    }

    pub fn client_width(&self, node_id: usize) -> f64 {
        self.get_node(node_id)
            .map(|node| node.layout.width().round())
            .unwrap_or(0.0)
    }

    pub fn client_height(&self, node_id: usize) -> f64 {
        self.get_node(node_id)
            .map(|node| node.layout.height().round())
            .unwrap_or(0.0)
    }

    /// Width of the node's content: its own width or the right edge of its widest child
    pub fn scroll_width(&self, node_id: usize) -> f64 {
        self.content_extent(node_id).x.round()
    }

    /// Height of the node's content: its own height or the bottom edge of its tallest child
    pub fn scroll_height(&self, node_id: usize) -> f64 {
        self.content_extent(node_id).y.round()
    }

    fn content_extent(&self, node_id: usize) -> Point {
        let Some(node) = self.get_node(node_id) else {
            return Point::ZERO;
        };
        let own = Point::new(node.layout.width(), node.layout.height());
        node.children
            .iter()
            .map(|id| self.nodes[*id].layout)
            .fold(own, |extent, child| {
                Point::new(extent.x.max(child.x1), extent.y.max(child.y1))
            })
    }

    fn max_scroll(&self, node_id: usize) -> Vec2 {
        Vec2::new(
            (self.scroll_width(node_id) - self.client_width(node_id)).max(0.0),
            (self.scroll_height(node_id) - self.client_height(node_id)).max(0.0),
        )
    }

    pub fn scroll_left(&self, node_id: usize) -> f64 {
        self.get_node(node_id)
            .map(|node| node.scroll_offset.x)
            .unwrap_or(0.0)
    }

    pub fn scroll_top(&self, node_id: usize) -> f64 {
        self.get_node(node_id)
            .map(|node| node.scroll_offset.y)
            .unwrap_or(0.0)
    }

    /// Scroll horizontally. The offset is clamped to the scrollable range.
    pub fn set_scroll_left(&mut self, node_id: usize, left: f64) -> Result<(), DomError> {
        let max = self.max_scroll(node_id);
        self.node_mut(node_id)?.scroll_offset.x = left.clamp(0.0, max.x);
        Ok(())
    }

    /// Scroll vertically. The offset is clamped to the scrollable range.
    pub fn set_scroll_top(&mut self, node_id: usize, top: f64) -> Result<(), DomError> {
        let max = self.max_scroll(node_id);
        self.node_mut(node_id)?.scroll_offset.y = top.clamp(0.0, max.y);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rect_accounts_for_ancestors_and_scroll() {
        let mut doc = Document::default();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        doc.set_layout(outer, Rect::new(10.0, 20.0, 110.0, 70.0)).unwrap();
        doc.set_layout(inner, Rect::new(5.0, 100.0, 55.0, 130.0)).unwrap();

        assert_eq!(doc.scroll_height(outer), 130.0);
        doc.set_scroll_top(outer, 500.0).unwrap();
        assert_eq!(doc.scroll_top(outer), 80.0);

        let rect = doc.bounding_client_rect(inner).unwrap();
        assert_eq!(rect, Rect::new(15.0, 40.0, 65.0, 70.0));
        assert_eq!(doc.client_width(inner), 50.0);
    }

    #[test]
    fn unscrollable_nodes_stay_at_zero() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        doc.set_layout(div, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        doc.set_scroll_left(div, 30.0).unwrap();
        assert_eq!(doc.scroll_left(div), 0.0);
    }
}
