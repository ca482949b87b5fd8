//! Sugar for building element entities by tag, and factories of named constructors.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{Constructor, Dom, Entity, EntitySpec, Error, Value, WeakDom};

/// Arguments accepted by [`Dom::build`] and the [`DomBuilder`] methods: a spec, bare content,
/// or content plus a spec.
#[derive(Clone, Debug)]
pub enum TagArgs {
    Spec(EntitySpec),
    /// Content placed before any content the spec already carries
    Content(Value, EntitySpec),
}

impl From<()> for TagArgs {
    fn from(_: ()) -> Self {
        TagArgs::Spec(EntitySpec::default())
    }
}

impl From<EntitySpec> for TagArgs {
    fn from(spec: EntitySpec) -> Self {
        TagArgs::Spec(spec)
    }
}

impl From<Value> for TagArgs {
    fn from(content: Value) -> Self {
        TagArgs::Content(content, EntitySpec::default())
    }
}

impl From<&str> for TagArgs {
    fn from(text: &str) -> Self {
        Value::from(text).into()
    }
}

impl From<String> for TagArgs {
    fn from(text: String) -> Self {
        Value::from(text).into()
    }
}

impl From<Entity> for TagArgs {
    fn from(entity: Entity) -> Self {
        Value::from(entity).into()
    }
}

impl<T: Into<Value>> From<Vec<T>> for TagArgs {
    fn from(items: Vec<T>) -> Self {
        Value::list(items).into()
    }
}

impl<C: Into<Value>> From<(C, EntitySpec)> for TagArgs {
    fn from((content, spec): (C, EntitySpec)) -> Self {
        TagArgs::Content(content.into(), spec)
    }
}

/// Tag-named shortcuts for [`Dom::build`]
///
/// ```
/// use jel::{Dom, EntitySpec, Value};
///
/// let dom = Dom::default();
/// let tags = dom.tags();
/// let list = tags
///     .ul(vec![
///         Value::from(tags.li("one").unwrap()),
///         Value::from(tags.li("two").unwrap()),
///     ])
///     .unwrap();
/// assert_eq!(list.html().unwrap(), "<li>one</li><li>two</li>");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DomBuilder<'a> {
    dom: &'a Dom,
}

macro_rules! tag_methods {
    ($($tag:ident),+ $(,)?) => {
        $(
            #[doc = concat!("Build a `<", stringify!($tag), ">` element entity")]
            pub fn $tag(&self, args: impl Into<TagArgs>) -> Result<Entity, Error> {
                self.dom.build(stringify!($tag), args)
            }
        )+
    };
}

impl<'a> DomBuilder<'a> {
    pub(crate) fn new(dom: &'a Dom) -> Self {
        Self { dom }
    }

    pub fn tag(&self, name: &str, args: impl Into<TagArgs>) -> Result<Entity, Error> {
        self.dom.build(name, args)
    }

    tag_methods!(
        a, article, audio, button, canvas, code, div, em, footer, form, h1, h2, h3, header, img,
        input, label, li, nav, ol, option, p, pre, section, select, span, strong, table, td,
        textarea, tr, ul, video,
    );
}

/// Calls a registered constructor with a spec
pub type FactoryFn = Rc<dyn Fn(EntitySpec) -> Result<Entity, Error>>;

/// Named constructors bound to a document.
///
/// ```
/// use jel::{Constructor, Dom, EntitySpec, Factory, Value};
///
/// let dom = Dom::default();
/// let mut factory = Factory::new(&dom);
/// factory.register(Constructor::new("badge", |dom, spec, _, _| {
///     dom.build("span", spec.get_prop("label")).map(Value::from)
/// }));
///
/// let badge = factory.create("badge", EntitySpec::new().prop("label", "new")).unwrap();
/// assert_eq!(badge.entity_type(), "badge");
/// assert!(factory.create("missing", EntitySpec::new()).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Factory {
    dom: WeakDom,
    types: IndexMap<String, Constructor>,
}

impl Factory {
    pub fn new(dom: &Dom) -> Self {
        Self {
            dom: dom.downgrade(),
            types: IndexMap::new(),
        }
    }

    /// Register a constructor under its own name
    pub fn register(&mut self, ty: Constructor) -> &mut Self {
        self.types.insert(ty.name().to_string(), ty);
        self
    }

    pub fn register_as(&mut self, name: impl Into<String>, ty: Constructor) -> &mut Self {
        self.types.insert(name.into(), ty);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Construct an entity with the constructor registered as `name`. The spec's own `ty` is
    /// ignored.
    pub fn create(&self, name: &str, spec: EntitySpec) -> Result<Entity, Error> {
        let ty = self.types.get(name).cloned().ok_or(Error::MissingType)?;
        self.dom.upgrade()?.construct(Some(ty), spec)
    }

    pub fn get(&self, name: &str) -> Option<FactoryFn> {
        let ty = self.types.get(name)?.clone();
        let dom = self.dom.clone();
        let create: FactoryFn = Rc::new(move |spec: EntitySpec| -> Result<Entity, Error> {
            dom.upgrade()?.construct(Some(ty.clone()), spec)
        });
        Some(create)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_goes_before_spec_content() {
        let dom = Dom::default();
        let p = dom
            .tags()
            .p(("lead ", EntitySpec::new().content("tail").classes("intro")))
            .unwrap();
        assert_eq!(p.text().unwrap(), "lead tail");
        assert!(p.classes().unwrap().contains("intro").unwrap());
        assert_eq!(p.entity_type(), "element");
    }

    #[test]
    fn unit_builds_an_empty_element() {
        let dom = Dom::default();
        let canvas = dom.tags().canvas(()).unwrap();
        assert_eq!(canvas.outer_html().unwrap(), "<canvas></canvas>");
    }

    #[test]
    fn factory_functions_outlive_the_factory() {
        let dom = Dom::default();
        let mut factory = Factory::new(&dom);
        factory.register_as(
            "box",
            Constructor::new("boxed", |dom, _, _, _| {
                dom.build("div", EntitySpec::new()).map(Value::from)
            }),
        );
        let make = factory.get("box").unwrap();
        drop(factory);

        let entity = make(EntitySpec::new().id("b")).unwrap();
        assert_eq!(entity.entity_type(), "boxed");
        assert_eq!(entity.id(), Some("b"));
    }
}
