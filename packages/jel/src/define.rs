//! The construction protocol: constructors, and the `Define` descriptor they fill in.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::element::ElementState;
use crate::{AttributeView, DataView, Dom, Entity, EntitySpec, Error, EventBinding, StyleView};
use crate::{Function, Trigger, Value};

pub type Getter = Rc<dyn Fn() -> Result<Value, Error>>;
pub type Setter = Rc<dyn Fn(Value) -> Result<(), Error>>;

/// The signature of a custom constructor.
///
/// A constructor builds the entity's sub-tree and returns its root: either an element node
/// (`Value::Node`) or another entity. It describes the new entity's properties through
/// `define` and may keep `trigger` to fire the entity's events later.
pub type ConstructorFn = dyn Fn(&Dom, &EntitySpec, &mut Define, &Trigger) -> Result<Value, Error>;

/// A named property defined by a constructor
#[derive(Clone)]
pub enum Property {
    /// A fixed value. Reads return it, writes fail.
    Value(Value),
    /// Computed on read and/or handled on write. A missing getter reads as absent; a missing
    /// setter makes the property read-only.
    Accessor {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Property::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

/// How the built-in element constructor obtains its element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementMode {
    /// Create a new element named by the spec's `tag`
    Create,
    /// Bind an existing element, taking its children as initial content
    Adopt(usize),
}

#[derive(Clone)]
pub(crate) enum ConstructorKind {
    Element(ElementMode),
    Custom(Rc<ConstructorFn>),
}

/// An entity type: a name plus the function that builds entities of that type.
#[derive(Clone)]
pub struct Constructor {
    name: Cow<'static, str>,
    pub(crate) kind: ConstructorKind,
}

impl Constructor {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        f: impl Fn(&Dom, &EntitySpec, &mut Define, &Trigger) -> Result<Value, Error> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ConstructorKind::Custom(Rc::new(f)),
        }
    }

    /// The built-in constructor that creates a plain element
    pub fn element() -> Self {
        Self {
            name: Cow::Borrowed("element"),
            kind: ConstructorKind::Element(ElementMode::Create),
        }
    }

    pub(crate) fn adopt(node_id: usize) -> Self {
        Self {
            name: Cow::Borrowed("element"),
            kind: ConstructorKind::Element(ElementMode::Adopt(node_id)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, ConstructorKind::Element(_))
    }
}

impl PartialEq for Constructor {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (ConstructorKind::Element(a), ConstructorKind::Element(b)) => a == b,
            (ConstructorKind::Custom(a), ConstructorKind::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constructor").field(&self.name).finish()
    }
}

/// The DOM-facing surface of an entity: what another entity can delegate to with
/// [`Define::import_dom`].
pub trait DomFacing {
    fn absolute_left(&self) -> Result<f64, Error>;
    fn absolute_top(&self) -> Result<f64, Error>;
    fn style(&self) -> Result<StyleView, Error>;
    fn attribs(&self) -> Result<AttributeView, Error>;
    fn data(&self) -> Result<DataView, Error>;
    fn qsa(&self, selector: &str) -> Result<Vec<Entity>, Error>;

    /// The entity behind this delegate, if it is one
    fn as_entity(&self) -> Option<&Entity> {
        None
    }
}

/// Describes the entity under construction.
///
/// ```
/// use jel::{Constructor, Dom, EntitySpec, Value};
///
/// let counter = Constructor::new("counter", |dom, spec, define, _trigger| {
///     let start = spec.get_prop("start").to_number();
///     define
///         .value("start", start)
///         .read_only("doubled", move || Ok(Value::from(start * 2.0)));
///     dom.build("span", start.to_string()).map(Value::from)
/// });
///
/// let dom = Dom::default();
/// let entity = dom.construct(Some(counter), EntitySpec::new().prop("start", 4)).unwrap();
/// assert_eq!(entity.get("doubled").unwrap(), Some(Value::from(8)));
/// assert_eq!(entity.entity_type(), "counter");
/// ```
#[derive(Default)]
pub struct Define {
    pub(crate) properties: IndexMap<String, Property>,
    pub(crate) dom_facing: Option<Rc<dyn DomFacing>>,
    pub(crate) event_binding: Option<Rc<dyn EventBinding>>,
    pub(crate) element: Option<Rc<ElementState>>,
}

impl Define {
    /// Define (or redefine) a property
    pub fn property(&mut self, name: impl Into<String>, property: Property) -> &mut Self {
        self.properties.insert(name.into(), property);
        self
    }

    pub fn value(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.property(name, Property::Value(value.into()))
    }

    pub fn values<K, V>(&mut self, values: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in values {
            self.value(name, value);
        }
        self
    }

    pub fn read_only(
        &mut self,
        name: impl Into<String>,
        get: impl Fn() -> Result<Value, Error> + 'static,
    ) -> &mut Self {
        self.property(
            name,
            Property::Accessor {
                get: Some(Rc::new(get)),
                set: None,
            },
        )
    }

    pub fn write_only(
        &mut self,
        name: impl Into<String>,
        set: impl Fn(Value) -> Result<(), Error> + 'static,
    ) -> &mut Self {
        self.property(
            name,
            Property::Accessor {
                get: None,
                set: Some(Rc::new(set)),
            },
        )
    }

    pub fn accessor(
        &mut self,
        name: impl Into<String>,
        get: impl Fn() -> Result<Value, Error> + 'static,
        set: impl Fn(Value) -> Result<(), Error> + 'static,
    ) -> &mut Self {
        self.property(
            name,
            Property::Accessor {
                get: Some(Rc::new(get)),
                set: Some(Rc::new(set)),
            },
        )
    }

    /// A function-valued property, invoked with [`Entity::call`]
    pub fn method(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> Result<Value, Error> + 'static,
    ) -> &mut Self {
        self.value(name, Function::new(f))
    }

    /// Delegate absolute position, style, attributes, data attributes and `qsa` to `entity`.
    pub fn import_dom(&mut self, entity: &Entity) -> &mut Self {
        self.dom_facing = Some(Rc::new(entity.clone()));
        self
    }

    /// Route the entity's `on`/`off` through `binding` instead of its own event table
    pub fn events(&mut self, binding: Rc<dyn EventBinding>) -> &mut Self {
        self.event_binding = Some(binding);
        self
    }

    pub(crate) fn element(&mut self, state: Rc<ElementState>) -> &mut Self {
        self.element = Some(state);
        self
    }
}

impl fmt::Debug for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Define")
            .field("properties", &self.properties)
            .field("dom_facing", &self.dom_facing.is_some())
            .field("event_binding", &self.event_binding.is_some())
            .finish_non_exhaustive()
    }
}
