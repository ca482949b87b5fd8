//! Event listeners and dispatch.
//!
//! Listeners are registered per node and event type. Dispatch walks from the target up through
//! its ancestors (bubbling), calling every listener registered for the event type on each node.
//!
//! Dispatch takes the document as a `&RefCell<Document>` and never holds a borrow while a
//! listener runs, so listeners are free to read and mutate the document (including adding and
//! removing listeners).

use std::cell::RefCell;
use std::rc::Rc;

use crate::node::ElementData;
use crate::{Document, DomError};

/// A callback attached to a node. Listeners are compared by pointer identity, so registering
/// the same `Rc` twice for the same node and event type has no effect.
pub type EventListener = Rc<dyn Fn(&mut DomEvent)>;

#[derive(Clone)]
pub(crate) struct RegisteredListener {
    pub(crate) event_type: String,
    pub(crate) listener: EventListener,
}

/// Pointer coordinates carried by mouse-like events
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerData {
    /// Position relative to the viewport
    pub client_x: f64,
    pub client_y: f64,
    /// Position relative to the element whose listener is running, when known
    pub inner_x: Option<f64>,
    pub inner_y: Option<f64>,
}

impl PointerData {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            inner_x: None,
            inner_y: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DomEvent {
    /// The event type ("click", "change", "focus", etc)
    pub name: String,
    pub target: usize,
    /// The node whose listeners are currently running
    pub current_target: Option<usize>,
    /// Which is true if the event bubbles up through the DOM tree.
    pub bubbles: bool,
    /// which is true if the event can be canceled.
    pub cancelable: bool,
    /// Where true indicates that the default user agent action was prevented,
    /// and false indicates that it was not.
    pub default_prevented: bool,
    pub stop_propagation: bool,
    pub pointer: Option<PointerData>,
    composed_path: Vec<usize>,
}

impl DomEvent {
    pub fn new(name: impl Into<String>, target: usize) -> Self {
        let name = name.into();
        let mut cancelable = true;
        let mut bubbles = true;

        match name.as_str() {
            "input" | "change" => {
                cancelable = false;
            }
            "focus" | "blur" | "load" | "scroll" => {
                cancelable = false;
                bubbles = false;
            }
            _ => {}
        }

        Self {
            name,
            target,
            current_target: None,
            bubbles,
            cancelable,
            default_prevented: false,
            stop_propagation: false,
            pointer: None,
            composed_path: Vec::new(),
        }
    }

    pub fn with_pointer(mut self, pointer: PointerData) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// The target followed by its ancestors, as computed when dispatch started
    pub fn composed_path(&self) -> &[usize] {
        &self.composed_path
    }

    pub fn prevent_default(&mut self) {
        if !self.cancelable {
            return;
        }
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.stop_propagation = true;
    }
}

impl Document {
    /// Register a listener. Returns false if the same listener was already registered for this
    /// node and event type.
    pub fn add_event_listener(
        &mut self,
        node_id: usize,
        event_type: &str,
        listener: EventListener,
    ) -> Result<bool, DomError> {
        self.node(node_id)?;
        let listeners = self.listeners.entry(node_id).or_default();
        let exists = listeners
            .iter()
            .any(|l| l.event_type == event_type && Rc::ptr_eq(&l.listener, &listener));
        if exists {
            return Ok(false);
        }
        listeners.push(RegisteredListener {
            event_type: event_type.to_string(),
            listener,
        });
        Ok(true)
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_event_listener(
        &mut self,
        node_id: usize,
        event_type: &str,
        listener: &EventListener,
    ) -> bool {
        let Some(listeners) = self.listeners.get_mut(&node_id) else {
            return false;
        };
        let idx = listeners
            .iter()
            .position(|l| l.event_type == event_type && Rc::ptr_eq(&l.listener, listener));
        match idx {
            Some(idx) => {
                listeners.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether `listener` is registered on the node for any event type
    pub fn is_listening(&self, node_id: usize, listener: &EventListener) -> bool {
        self.listeners.get(&node_id).is_some_and(|listeners| {
            listeners
                .iter()
                .any(|l| Rc::ptr_eq(&l.listener, listener))
        })
    }

    pub fn listener_count(&self, node_id: usize, event_type: &str) -> usize {
        self.listeners.get(&node_id).map_or(0, |listeners| {
            listeners
                .iter()
                .filter(|l| l.event_type == event_type)
                .count()
        })
    }

    fn listeners_for(&self, node_id: usize, event_type: &str) -> Vec<EventListener> {
        self.listeners
            .get(&node_id)
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|l| l.event_type == event_type)
                    .map(|l| l.listener.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// What a click did to a checkbox or radio button before listeners ran, so it can be undone if
/// a listener cancels the click.
struct CheckedActivation {
    node_id: usize,
    was_checked: bool,
}

/// Dispatch an event to its target and (if it bubbles) the target's ancestors.
///
/// Clicks on disabled form controls are not delivered. A click on a checkbox or radio button
/// toggles it before listeners run; if a listener prevents the default action the toggle is
/// undone, otherwise `input` and `change` events are fired at the control afterwards.
pub fn dispatch_event(doc: &RefCell<Document>, mut event: DomEvent) -> DomEvent {
    let mut activation = None;
    {
        let mut doc = doc.borrow_mut();
        let Some(node) = doc.get_node(event.target) else {
            return event;
        };
        let element = node.element_data();
        if event.name == "click" {
            if element.is_some_and(ElementData::is_disabled) {
                return event;
            }
            if element.is_some_and(ElementData::is_checkable) {
                let is_radio = element
                    .and_then(|el| el.attr("type"))
                    .is_some_and(|t| t.eq_ignore_ascii_case("radio"));
                let was_checked = doc.checked(event.target);
                let _ = doc.set_checked(event.target, is_radio || !was_checked);
                activation = Some(CheckedActivation {
                    node_id: event.target,
                    was_checked,
                });
            }
        }
        event.composed_path = doc.node_chain(event.target);
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Dispatching {} to node {}", event.name, event.target);

    let path = event.composed_path.clone();
    for node_id in path {
        event.current_target = Some(node_id);
        let listeners = doc.borrow().listeners_for(node_id, &event.name);
        for listener in listeners {
            listener(&mut event);
        }
        if event.stop_propagation || !event.bubbles {
            break;
        }
    }
    event.current_target = None;

    if let Some(activation) = activation {
        if event.default_prevented {
            let _ = doc
                .borrow_mut()
                .set_checked(activation.node_id, activation.was_checked);
        } else if doc.borrow().checked(activation.node_id) != activation.was_checked {
            dispatch_event(doc, DomEvent::new("input", activation.node_id));
            dispatch_event(doc, DomEvent::new("change", activation.node_id));
        }
    }

    event
}

/// Simulate a click on a node
pub fn click(doc: &RefCell<Document>, node_id: usize, pointer: Option<PointerData>) -> DomEvent {
    let mut event = DomEvent::new("click", node_id);
    event.pointer = pointer;
    dispatch_event(doc, event)
}

/// Move focus to a node, firing `blur` at the previously focussed node and `focus` at the new
/// one. Returns false if focus did not move.
pub fn focus(doc: &RefCell<Document>, node_id: usize) -> bool {
    let previous = doc.borrow().focus_node_id();
    if !doc.borrow_mut().set_focus_to(node_id) {
        return false;
    }
    if let Some(previous) = previous {
        dispatch_event(doc, DomEvent::new("blur", previous));
    }
    dispatch_event(doc, DomEvent::new("focus", node_id));
    true
}

/// Remove focus from the node if it has it, firing `blur`
pub fn blur(doc: &RefCell<Document>, node_id: usize) -> bool {
    if doc.borrow().focus_node_id() != Some(node_id) {
        return false;
    }
    doc.borrow_mut().clear_focus();
    dispatch_event(doc, DomEvent::new("blur", node_id));
    true
}
