use std::collections::HashSet;

use crate::node::ElementState;
use crate::style::normalize_property_name;
use crate::{Attribute, Document, DomError, ElementData, NodeData, QualName, local_name};

pub enum AppendTextErr {
    /// The node is not a text node
    NotTextNode,
}

/// Batches mutations of a [`Document`].
///
/// Work that has to wait until a group of mutations is complete (such as honouring `autofocus`
/// once the element is connected) is done when the mutator is flushed or dropped.
pub struct DocumentMutator<'doc> {
    /// Document is public as an escape hatch, but users of this API should ideally avoid using it
    /// and prefer exposing additional functionality in DocumentMutator.
    pub doc: &'doc mut Document,

    /// The (latest) element which was created with autofocus=true, if any
    node_to_autofocus: Option<usize>,
}

impl Drop for DocumentMutator<'_> {
    fn drop(&mut self) {
        self.flush(); // Defined at bottom of file
    }
}

impl DocumentMutator<'_> {
    pub fn new<'doc>(doc: &'doc mut Document) -> DocumentMutator<'doc> {
        DocumentMutator {
            doc,
            node_to_autofocus: None,
        }
    }

    pub fn node_has_parent(&self, node_id: usize) -> bool {
        self.doc.parent(node_id).is_some()
    }

    pub fn previous_sibling_id(&self, node_id: usize) -> Option<usize> {
        self.doc.previous_sibling(node_id)
    }

    pub fn last_child_id(&self, node_id: usize) -> Option<usize> {
        self.doc.last_child(node_id)
    }

    pub fn element_name(&self, node_id: usize) -> Option<&QualName> {
        self.doc.element_name(node_id)
    }

    pub fn create_comment_node(&mut self) -> usize {
        self.doc.create_comment_node()
    }

    pub fn create_text_node(&mut self, text: &str) -> usize {
        self.doc.create_text_node(text)
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> usize {
        let data = ElementData::new(name, attrs);
        let autofocus = data.has_attr("autofocus");
        let id = self.doc.create_node(NodeData::Element(data));
        if autofocus {
            self.node_to_autofocus = Some(id);
        }
        id
    }

    /// Remove all of the children from old_parent_id and append them to new_parent_id
    pub fn reparent_children(
        &mut self,
        old_parent_id: usize,
        new_parent_id: usize,
    ) -> Result<(), DomError> {
        self.doc.reparent_children(old_parent_id, new_parent_id)
    }

    pub fn append_children(&mut self, parent_id: usize, child_ids: &[usize]) -> Result<(), DomError> {
        for child_id in child_ids.iter().copied() {
            self.doc.append_child(parent_id, child_id)?;
        }
        Ok(())
    }

    pub fn insert_nodes_before(
        &mut self,
        anchor_node_id: usize,
        new_node_ids: &[usize],
    ) -> Result<(), DomError> {
        let parent_id = self
            .doc
            .parent(anchor_node_id)
            .ok_or(DomError::NodeNotFound(anchor_node_id))?;
        for new_node_id in new_node_ids.iter().copied() {
            self.doc
                .insert_before(parent_id, new_node_id, Some(anchor_node_id))?;
        }
        Ok(())
    }

    /// Detach the node from its parent
    pub fn remove_node(&mut self, node_id: usize) {
        self.doc.remove_from_parent(node_id);
    }

    pub fn remove_node_if_unparented(&mut self, node_id: usize) {
        if let Some(node) = self.doc.get_node(node_id) {
            if node.parent.is_none() {
                self.doc.remove_and_drop_node(node_id);
            }
        }
    }

    pub fn append_text_to_node(&mut self, node_id: usize, text: &str) -> Result<(), AppendTextErr> {
        match self.doc.get_node_mut(node_id).and_then(|node| node.text_data_mut()) {
            Some(data) => {
                data.content += text;
                Ok(())
            }
            None => Err(AppendTextErr::NotTextNode),
        }
    }

    pub fn set_node_text(&mut self, node_id: usize, value: &str) {
        let Some(text) = self.doc.get_node_mut(node_id).and_then(|node| node.text_data_mut())
        else {
            return;
        };
        if text.content != value {
            text.content.clear();
            text.content.push_str(value);
        }
    }

    pub fn add_attrs_if_missing(
        &mut self,
        node_id: usize,
        attrs: Vec<Attribute>,
    ) -> Result<(), DomError> {
        let element_data = self.doc.element_data(node_id)?;

        let existing_names = element_data
            .attrs
            .iter()
            .map(|e| e.name.clone())
            .collect::<HashSet<_>>();

        for attr in attrs
            .into_iter()
            .filter(|attr| !existing_names.contains(&attr.name))
        {
            self.set_attribute(node_id, attr.name, &attr.value)?;
        }
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        node_id: usize,
        name: QualName,
        value: &str,
    ) -> Result<(), DomError> {
        let element = self.doc.element_data_mut(node_id)?;

        let is_style = name.local == local_name!("style");
        let is_checked = name.local == local_name!("checked");
        element.attrs.set(name, value);

        if is_style {
            element.flush_style_attribute();
        } else if is_checked {
            set_default_checkedness(element, true);
        }
        Ok(())
    }

    pub fn clear_attribute(&mut self, node_id: usize, name: QualName) -> Result<(), DomError> {
        let element = self.doc.element_data_mut(node_id)?;

        // FIXME: check namespace
        element.attrs.retain(|attr| attr.name.local != name.local);

        if name.local == local_name!("style") {
            element.flush_style_attribute();
        } else if name.local == local_name!("checked") {
            set_default_checkedness(element, false);
        }
        Ok(())
    }

    /// Set a single inline style property. `name` may be camelCase (`backgroundColor`), kebab-case
    /// or a custom property. An empty value removes the property.
    pub fn set_style_property(
        &mut self,
        node_id: usize,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let element = self.doc.element_data_mut(node_id)?;
        element
            .inline_style
            .set(&normalize_property_name(name), value);
        element.flush_inline_style();
        Ok(())
    }

    pub fn remove_style_property(&mut self, node_id: usize, name: &str) -> Result<(), DomError> {
        self.set_style_property(node_id, name, "")
    }
}

impl<'doc> DocumentMutator<'doc> {
    pub fn flush(&mut self) {
        if let Some(node_id) = self.node_to_autofocus.take() {
            if self.doc.is_connected(node_id) {
                self.doc.set_focus_to(node_id);
            }
        }
    }
}

/// The `checked` attribute only drives checkedness until the user (or script) changes it.
fn set_default_checkedness(element: &mut ElementData, checked: bool) {
    if element.state.contains(ElementState::DIRTY_CHECKEDNESS) {
        return;
    }
    element.state.set(ElementState::CHECKED, checked);
}

#[cfg(test)]
mod tests {
    use crate::{Document, attr_name};

    #[test]
    fn style_attribute_and_properties_stay_in_sync() {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        {
            let mut mutator = doc.mutate();
            mutator
                .set_attribute(div, attr_name("style"), "color: red")
                .unwrap();
            mutator
                .set_style_property(div, "backgroundColor", "blue")
                .unwrap();
        }
        let data = doc.element_data(div).unwrap();
        assert_eq!(data.inline_style().get("color"), Some("red"));
        assert_eq!(data.attr("style"), Some("color: red; background-color: blue;"));

        doc.mutate().remove_style_property(div, "color").unwrap();
        let data = doc.element_data(div).unwrap();
        assert_eq!(data.attr("style"), Some("background-color: blue;"));

        doc.mutate()
            .remove_style_property(div, "background-color")
            .unwrap();
        assert_eq!(doc.element_data(div).unwrap().attr("style"), None);
    }

    #[test]
    fn checked_attribute_drives_clean_checkbox() {
        let mut doc = Document::default();
        let input = doc.create_element("input");
        doc.mutate()
            .set_attribute(input, attr_name("type"), "checkbox")
            .unwrap();
        doc.mutate()
            .set_attribute(input, attr_name("checked"), "")
            .unwrap();
        assert!(doc.checked(input));

        doc.set_checked(input, false).unwrap();
        doc.mutate()
            .set_attribute(input, attr_name("checked"), "")
            .unwrap();
        assert!(!doc.checked(input));
    }

    #[test]
    fn attributes_on_text_nodes_fail() {
        let mut doc = Document::default();
        let text = doc.create_text_node("hi");
        assert!(doc.mutate().set_attribute(text, attr_name("id"), "x").is_err());
    }

    #[test]
    fn autofocus_applies_once_connected() {
        let mut doc = Document::default();
        let body = doc.body_id();
        let input = {
            let mut mutator = doc.mutate();
            let input = mutator.create_element(
                crate::QualName::new(None, crate::ns!(html), crate::local_name!("input")),
                vec![crate::Attribute::new("autofocus", "")],
            );
            mutator.append_children(body, &[input]).unwrap();
            input
        };
        assert_eq!(doc.focus_node_id(), Some(input));
    }
}
