//! Element state that scripts read and write through properties rather than attributes:
//! form values, checkedness, media playback, canvas contexts, focus, fullscreen and pointer lock.

use crate::node::ElementState;
use crate::{Document, DomError, local_name};

/// Context types a `<canvas>` can hand out
const CANVAS_CONTEXT_TYPES: [&str; 5] = ["2d", "webgl", "webgl2", "bitmaprenderer", "webgpu"];

impl Document {
    /// The current value of a form control (or any element whose value was set by script).
    /// Returns `None` for elements that have no notion of a value.
    pub fn value(&self, node_id: usize) -> Option<String> {
        let data = self.get_node(node_id)?.element_data()?;
        if let Some(value) = &data.value {
            return Some(value.clone());
        }

        match data.name.local {
            local_name!("input") => Some(match data.attr("value") {
                Some(value) => value.to_string(),
                None if data.is_checkable() => "on".to_string(),
                None => String::new(),
            }),
            local_name!("textarea") => Some(self.text_content(node_id)),
            local_name!("select") => {
                let options: Vec<usize> = self
                    .descendants(node_id)
                    .into_iter()
                    .filter(|id| self.nodes[*id].data.is_element_with_tag_name("option"))
                    .collect();
                let selected = options
                    .iter()
                    .find(|id| self.nodes[**id].attr("selected").is_some())
                    .or(options.first());
                Some(match selected {
                    Some(option_id) => self.value(*option_id).unwrap_or_default(),
                    None => String::new(),
                })
            }
            local_name!("option") => Some(match data.attr("value") {
                Some(value) => value.to_string(),
                None => self.text_content(node_id).trim().to_string(),
            }),
            local_name!("button") | local_name!("output") | local_name!("data") => {
                Some(data.attr("value").unwrap_or("").to_string())
            }
            _ => None,
        }
    }

    /// Set the "dirty" value of an element. The `value` attribute is left untouched.
    pub fn set_value(&mut self, node_id: usize, value: &str) -> Result<(), DomError> {
        self.element_data_mut(node_id)?.value = Some(value.to_string());
        Ok(())
    }

    pub fn checked(&self, node_id: usize) -> bool {
        self.get_node(node_id)
            .and_then(|node| node.element_data())
            .is_some_and(|data| data.state.contains(ElementState::CHECKED))
    }

    pub fn set_checked(&mut self, node_id: usize, checked: bool) -> Result<(), DomError> {
        let state = &mut self.element_data_mut(node_id)?.state;
        state.set(ElementState::CHECKED, checked);
        state.insert(ElementState::DIRTY_CHECKEDNESS);
        Ok(())
    }

    pub fn paused(&self, node_id: usize) -> bool {
        self.get_node(node_id)
            .and_then(|node| node.element_data())
            .is_some_and(|data| data.state.contains(ElementState::PAUSED))
    }

    pub fn play(&mut self, node_id: usize) -> Result<(), DomError> {
        self.set_paused(node_id, false, "play")
    }

    pub fn pause(&mut self, node_id: usize) -> Result<(), DomError> {
        self.set_paused(node_id, true, "pause")
    }

    fn set_paused(
        &mut self,
        node_id: usize,
        paused: bool,
        operation: &'static str,
    ) -> Result<(), DomError> {
        let data = self.element_data_mut(node_id)?;
        if !data.is_media() {
            return Err(DomError::NotSupported {
                node: node_id,
                operation,
            });
        }
        data.state.set(ElementState::PAUSED, paused);
        Ok(())
    }

    /// Obtain a drawing context from a `<canvas>`.
    ///
    /// The first successful call fixes the canvas' context type: asking again for the same type
    /// returns it, asking for a different (or unknown) type returns `None`.
    pub fn get_context(&mut self, node_id: usize, kind: &str) -> Result<Option<String>, DomError> {
        let data = self.element_data_mut(node_id)?;
        if data.name.local != local_name!("canvas") {
            return Err(DomError::NotSupported {
                node: node_id,
                operation: "getContext",
            });
        }
        if !CANVAS_CONTEXT_TYPES.contains(&kind) {
            return Ok(None);
        }
        match &data.canvas_context {
            Some(existing) if existing == kind => Ok(Some(existing.clone())),
            Some(_) => Ok(None),
            None => {
                data.canvas_context = Some(kind.to_string());
                Ok(Some(kind.to_string()))
            }
        }
    }

    pub fn focus_node_id(&self) -> Option<usize> {
        self.focus_node_id
    }

    /// Whether the element can receive focus
    pub fn is_focusable(&self, node_id: usize) -> bool {
        let Some(data) = self.get_node(node_id).and_then(|node| node.element_data()) else {
            return false;
        };
        if data.is_disabled() {
            return false;
        }
        data.is_focusable_by_default()
            || data.has_attr("tabindex")
            || self.is_content_editable(node_id)
    }

    /// Move focus to the node. Returns false if it already had focus or can't be focussed.
    pub fn set_focus_to(&mut self, focus_node_id: usize) -> bool {
        if Some(focus_node_id) == self.focus_node_id || !self.is_focusable(focus_node_id) {
            return false;
        }

        #[cfg(feature = "tracing")]
        tracing::info!("Focussed node {focus_node_id}");

        self.focus_node_id = Some(focus_node_id);
        true
    }

    /// Clear the focussed node
    pub fn clear_focus(&mut self) {
        self.focus_node_id = None;
    }

    /// The `tabIndex` of an element: its `tabindex` attribute, or 0 for elements that are
    /// focusable by default and -1 for everything else.
    pub fn tab_index(&self, node_id: usize) -> i32 {
        let Some(data) = self.get_node(node_id).and_then(|node| node.element_data()) else {
            return -1;
        };
        match data.attr("tabindex").and_then(|t| t.trim().parse().ok()) {
            Some(index) => index,
            None if data.is_focusable_by_default() => 0,
            None => -1,
        }
    }

    /// The `contentEditable` state of an element: `"true"`, `"false"`, `"plaintext-only"` or
    /// `"inherit"`.
    pub fn content_editable(&self, node_id: usize) -> &'static str {
        let attr = self.get_node(node_id).and_then(|node| node.attr("contenteditable"));
        match attr.map(|v| v.to_ascii_lowercase()) {
            Some(v) if v.is_empty() || v == "true" => "true",
            Some(v) if v == "false" => "false",
            Some(v) if v == "plaintext-only" => "plaintext-only",
            _ => "inherit",
        }
    }

    /// Whether the element is editable, taking inherited `contenteditable` into account
    pub fn is_content_editable(&self, node_id: usize) -> bool {
        for id in self.node_chain(node_id) {
            match self.content_editable(id) {
                "inherit" => continue,
                "false" => return false,
                _ => return true,
            }
        }
        false
    }

    pub fn fullscreen_element(&self) -> Option<usize> {
        self.fullscreen_node_id
    }

    /// Make a connected element the fullscreen element
    pub fn request_fullscreen(&mut self, node_id: usize) -> Result<(), DomError> {
        self.element_data(node_id)?;
        if !self.is_connected(node_id) {
            return Err(DomError::NotSupported {
                node: node_id,
                operation: "requestFullscreen",
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Node {node_id} entered fullscreen");

        self.fullscreen_node_id = Some(node_id);
        Ok(())
    }

    pub fn exit_fullscreen(&mut self) {
        self.fullscreen_node_id = None;
    }

    pub fn pointer_lock_element(&self) -> Option<usize> {
        self.pointer_lock_node_id
    }

    /// Lock the pointer to a connected element
    pub fn request_pointer_lock(&mut self, node_id: usize) -> Result<(), DomError> {
        self.element_data(node_id)?;
        if !self.is_connected(node_id) {
            return Err(DomError::NotSupported {
                node: node_id,
                operation: "requestPointerLock",
            });
        }
        self.pointer_lock_node_id = Some(node_id);
        Ok(())
    }

    pub fn exit_pointer_lock(&mut self) {
        self.pointer_lock_node_id = None;
    }
}
