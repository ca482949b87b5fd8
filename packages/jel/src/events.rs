//! Entity-level events: handlers, the per-entity handler table and the trigger handle given to
//! constructors.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use jel_dom::DomEvent;

use crate::{Error, Value};

/// What a handler receives: the data passed to [`Trigger::trigger`], or the native event when
/// the handler is attached to an element.
#[derive(Clone, Debug)]
pub enum EventData {
    Custom(Value),
    Dom(DomEvent),
}

impl EventData {
    /// The custom payload, if this is a triggered event
    pub fn value(&self) -> Option<&Value> {
        match self {
            EventData::Custom(value) => Some(value),
            EventData::Dom(_) => None,
        }
    }

    pub fn dom_event(&self) -> Option<&DomEvent> {
        match self {
            EventData::Dom(event) => Some(event),
            EventData::Custom(_) => None,
        }
    }

    pub fn dom_event_mut(&mut self) -> Option<&mut DomEvent> {
        match self {
            EventData::Dom(event) => Some(event),
            EventData::Custom(_) => None,
        }
    }
}

/// An event handler. Handlers are compared by identity: clones of a `Handler` are the same
/// handler, two `Handler::new` calls never are.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&mut EventData) -> Result<(), Error>>);

impl Handler {
    pub fn new(f: impl Fn(&mut EventData) -> Result<(), Error> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, data: &mut EventData) -> Result<(), Error> {
        (self.0)(data)
    }

    pub(crate) fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Handlers by event name, in registration order. Registering a handler twice keeps both
/// registrations.
#[derive(Default)]
pub struct EventTable {
    handlers: IndexMap<String, Vec<Handler>>,
}

impl EventTable {
    pub fn on(&mut self, name: &str, handler: Handler) {
        self.handlers
            .entry(name.to_string())
            .or_default()
            .push(handler);
    }

    /// Remove the first registration of `handler`. Returns false if it was not registered.
    pub fn off(&mut self, name: &str, handler: &Handler) -> bool {
        let Some(handlers) = self.handlers.get_mut(name) else {
            return false;
        };
        match handlers.iter().position(|h| h.ptr_eq(handler)) {
            Some(idx) => {
                handlers.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn handlers(&self, name: &str) -> Vec<Handler> {
        self.handlers.get(name).cloned().unwrap_or_default()
    }

    pub fn len(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

/// Fires an entity's events. Constructors receive one so the entity they build can emit events
/// to whoever subscribed through `on`.
#[derive(Clone)]
pub struct Trigger(pub(crate) Rc<RefCell<EventTable>>);

impl Trigger {
    /// Call every handler registered for `name`, in registration order. The first error stops
    /// the remaining handlers and is returned.
    ///
    /// The table is not borrowed while handlers run, so a handler may register or remove
    /// handlers; that takes effect on the next trigger.
    pub fn trigger(&self, name: &str, data: impl Into<Value>) -> Result<(), Error> {
        let handlers = self.0.borrow().handlers(name);
        if handlers.is_empty() {
            return Ok(());
        }

        #[cfg(feature = "tracing")]
        tracing::trace!("Triggering {name} for {} handler(s)", handlers.len());

        let mut data = EventData::Custom(data.into());
        for handler in handlers {
            handler.call(&mut data)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger").finish_non_exhaustive()
    }
}

/// Replaces an entity's event table as the target of `on`/`off`.
///
/// Element entities bind events to native listeners; a custom constructor can install its own
/// binding through [`Define::events`](crate::Define::events), typically to forward
/// subscriptions to one of its parts.
pub trait EventBinding {
    fn on(&self, name: &str, handler: Handler) -> Result<(), Error>;
    fn off(&self, name: &str, handler: &Handler) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> Handler {
        let log = log.clone();
        Handler::new(move |data| {
            let value = data.value().map(Value::to_js_string).unwrap_or_default();
            log.borrow_mut().push(format!("{label}:{value}"));
            Ok(())
        })
    }

    #[test]
    fn handlers_fire_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let table = Rc::new(RefCell::new(EventTable::default()));
        table.borrow_mut().on("change", counter(&log, "a"));
        table.borrow_mut().on("change", counter(&log, "b"));
        table.borrow_mut().on("other", counter(&log, "c"));

        Trigger(table).trigger("change", 1).unwrap();
        assert_eq!(*log.borrow(), ["a:1", "b:1"]);
    }

    #[test]
    fn off_removes_one_registration() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let handler = counter(&log, "h");
        let mut table = EventTable::default();
        table.on("x", handler.clone());
        table.on("x", handler.clone());

        assert!(table.off("x", &handler));
        assert_eq!(table.len("x"), 1);
        assert!(table.off("x", &handler));
        assert!(!table.off("x", &handler));
    }

    #[test]
    fn first_error_stops_dispatch() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let table = Rc::new(RefCell::new(EventTable::default()));
        table.borrow_mut().on(
            "x",
            Handler::new(|_| Err(Error::InvalidArgument("nope".into()))),
        );
        table.borrow_mut().on("x", counter(&log, "after"));

        let result = Trigger(table).trigger("x", Value::Null);
        assert_eq!(result, Err(Error::InvalidArgument("nope".into())));
        assert!(log.borrow().is_empty());
    }
}
