use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use jel_dom::{DomEvent, PointerData, Rect};
use rustc_hash::FxHashMap;

use crate::content::{ContentNode, Insert, add_content, content_nodes};
use crate::define::ConstructorKind;
use crate::element::{BOUND_METHODS, ElementState, construct_element};
use crate::events::EventTable;
use crate::{
    AttributeView, ClassList, Constructor, DataView, Define, Dom, DomFacing, EntitySpec, Error,
    EventBinding, Handler, Property, StyleView, Trigger, Value, WeakDom,
};

/// Anything that identifies a node: a node id or an entity (standing for its element)
pub trait AsNodeId {
    fn node_id(&self) -> usize;
}

impl AsNodeId for usize {
    fn node_id(&self) -> usize {
        *self
    }
}

impl AsNodeId for Entity {
    fn node_id(&self) -> usize {
        self.dom_element()
    }
}

impl<T: AsNodeId + ?Sized> AsNodeId for &T {
    fn node_id(&self) -> usize {
        (**self).node_id()
    }
}

struct EntityInner {
    id: Option<String>,
    dom_element: usize,
    entity_type: Cow<'static, str>,
    dom: WeakDom,
    properties: IndexMap<String, Property>,
    events: Rc<RefCell<EventTable>>,
    event_binding: Option<Rc<dyn EventBinding>>,
    dom_facing: Option<Rc<dyn DomFacing>>,
    element: Option<Rc<ElementState>>,
    /// The entity this one is the root of, if a constructor built another entity around it
    owner: RefCell<Option<Entity>>,
}

/// A stateful wrapper bound to one element of a [`Dom`].
///
/// `Entity` is a shared handle: clones refer to the same entity, and equality is identity.
/// Element entities (made by the built-in element constructor, or by [`Dom::wrap`]) support
/// the element operations; other entities answer the ones they imported with
/// [`Define::import_dom`] and fail with [`Error::Unsupported`] otherwise.
#[derive(Clone)]
pub struct Entity(Rc<EntityInner>);

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Entity {}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("entity_type", &self.0.entity_type)
            .field("id", &self.0.id)
            .field("dom_element", &self.0.dom_element)
            .finish_non_exhaustive()
    }
}

/// Run `ty` against `spec` and assemble the resulting entity
pub(crate) fn construct(
    dom: &Dom,
    ty: Option<Constructor>,
    spec: EntitySpec,
) -> Result<Entity, Error> {
    let ty = ty.ok_or(Error::MissingType)?;
    let events = Rc::new(RefCell::new(EventTable::default()));
    let trigger = Trigger(events.clone());
    let mut define = Define::default();

    let root = match &ty.kind {
        ConstructorKind::Element(mode) => construct_element(dom, *mode, &spec, &mut define)?,
        ConstructorKind::Custom(constructor) => constructor(dom, &spec, &mut define, &trigger)?,
    };

    let (dom_element, root_entity) = match root {
        Value::Entity(entity) => (entity.dom_element(), Some(entity)),
        Value::Node(node_id) if dom.document().is_element(node_id) => (node_id, None),
        _ => return Err(Error::InvalidConstructorResult),
    };

    let Define {
        properties,
        dom_facing,
        event_binding,
        element,
    } = define;
    let entity = Entity(Rc::new(EntityInner {
        id: spec.id.clone().filter(|id| !id.is_empty()),
        dom_element,
        entity_type: Cow::Owned(ty.name().to_string()),
        dom: dom.downgrade(),
        properties,
        events,
        event_binding,
        dom_facing,
        element,
        owner: RefCell::new(None),
    }));

    // A node returned directly is wrapped by the new entity itself
    if root_entity.is_none() {
        dom.cache_insert(dom_element, entity.clone());
    }
    if !ty.is_element() {
        if let Some(root) = root_entity {
            root.set_owner(entity.clone());
        }
    }

    for (name, handler) in &spec.events {
        if let Some(handler) = handler {
            entity.on(name, handler.clone())?;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(
        "Constructed {} entity on node {dom_element}",
        entity.entity_type()
    );

    Ok(entity)
}

impl Entity {
    /// The name a parent element entity knows this entity by
    pub fn id(&self) -> Option<&str> {
        self.0.id.as_deref()
    }

    /// The element this entity is bound to
    pub fn dom_element(&self) -> usize {
        self.0.dom_element
    }

    /// The name of the constructor that built this entity
    pub fn entity_type(&self) -> &str {
        &self.0.entity_type
    }

    pub fn dom(&self) -> Result<Dom, Error> {
        self.0.dom.upgrade()
    }

    /// Whether this entity was built by the element constructor
    pub fn is_element(&self) -> bool {
        self.0.element.is_some()
    }

    /// The outermost entity built around this one (itself if none was)
    pub fn owner(&self) -> Entity {
        let mut current = self.clone();
        loop {
            let next = current.0.owner.borrow().clone();
            match next {
                Some(owner) if owner != current => current = owner,
                _ => return current,
            }
        }
    }

    pub(crate) fn set_owner(&self, owner: Entity) {
        let previous = self.0.owner.borrow_mut().replace(owner);
        drop(previous);
    }

    /// Drop the references this entity holds to other entities and handlers
    pub(crate) fn release(&self) {
        let owner = self.0.owner.borrow_mut().take();
        drop(owner);
        if let Some(state) = &self.0.element {
            state.release();
        }
        self.0.events.borrow_mut().clear();
    }

    /// Whether `ancestor` is a (strict) ancestor of this entity's element
    pub fn has_ancestor(&self, ancestor: impl AsNodeId) -> Result<bool, Error> {
        let target = ancestor.node_id();
        let dom = self.dom()?;
        let doc = dom.document();
        let mut current = doc.parent_element(self.dom_element());
        while let Some(node_id) = current {
            if node_id == target {
                return Ok(true);
            }
            current = doc.parent_element(node_id);
        }
        Ok(false)
    }

    pub fn on(&self, name: &str, handler: Handler) -> Result<(), Error> {
        match &self.0.event_binding {
            Some(binding) => binding.on(name, handler),
            None => {
                self.0.events.borrow_mut().on(name, handler);
                Ok(())
            }
        }
    }

    pub fn off(&self, name: &str, handler: &Handler) -> Result<(), Error> {
        match &self.0.event_binding {
            Some(binding) => binding.off(name, handler),
            None => {
                self.0.events.borrow_mut().off(name, handler);
                Ok(())
            }
        }
    }

    /// Number of handlers registered for `name` in this entity's own event table
    pub fn handler_count(&self, name: &str) -> usize {
        self.0.events.borrow().len(name)
    }

    /// Read a property.
    ///
    /// Constructor-defined properties come first, then (for element entities) `$<id>` named
    /// children, pass-through element properties and bound element methods, and finally `id`,
    /// `entityType` and `domElement`. Unknown names read as `None`.
    pub fn get(&self, name: &str) -> Result<Option<Value>, Error> {
        if let Some(property) = self.0.properties.get(name) {
            return match property {
                Property::Value(value) => Ok(Some(value.clone())),
                Property::Accessor { get: Some(get), .. } => get().map(Some),
                Property::Accessor { get: None, .. } => Ok(None),
            };
        }

        if let Some(state) = &self.0.element {
            if let Some(id) = name.strip_prefix('$') {
                return Ok(self.child(id)?.map(Value::Entity));
            }
            if let Some(value) = state.read_property(name)? {
                return Ok(Some(value));
            }
            if let Some(method) = state.bound_method(name) {
                return Ok(Some(Value::Function(method)));
            }
        }

        Ok(match name {
            "id" => self.id().map(Value::from),
            "entityType" => Some(Value::from(self.entity_type())),
            "domElement" => Some(Value::Node(self.dom_element())),
            _ => None,
        })
    }

    /// Write a property
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let value = value.into();
        if let Some(property) = self.0.properties.get(name) {
            return match property {
                Property::Accessor { set: Some(set), .. } => set(value),
                _ => Err(Error::ReadOnlyProperty(name.to_string())),
            };
        }

        if let Some(state) = &self.0.element {
            if name.starts_with('$') || BOUND_METHODS.contains(&name) {
                return Err(Error::ReadOnlyProperty(name.to_string()));
            }
            if state.write_property(name, value)? {
                return Ok(());
            }
        }

        match name {
            "id" | "entityType" | "domElement" => Err(Error::ReadOnlyProperty(name.to_string())),
            _ => Err(Error::UnknownProperty(name.to_string())),
        }
    }

    /// Call a function-valued property or a bound element method
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, Error> {
        match self.get(name)? {
            Some(Value::Function(f)) => f.call(args),
            Some(other) => Err(Error::InvalidArgument(format!(
                "property {name:?} is a {}, not a function",
                other.type_name()
            ))),
            None => Err(Error::UnknownProperty(name.to_string())),
        }
    }

    fn unsupported(&self, operation: &'static str) -> Error {
        Error::Unsupported {
            entity_type: self.entity_type().to_string(),
            operation,
        }
    }

    fn element_state(&self, operation: &'static str) -> Result<&Rc<ElementState>, Error> {
        self.0
            .element
            .as_ref()
            .ok_or_else(|| self.unsupported(operation))
    }

    fn delegate(&self, operation: &'static str) -> Result<&Rc<dyn DomFacing>, Error> {
        self.0
            .dom_facing
            .as_ref()
            .ok_or_else(|| self.unsupported(operation))
    }

    pub fn classes(&self) -> Result<ClassList, Error> {
        let state = self.element_state("classes")?;
        Ok(ClassList::new(state.dom.clone(), state.node_id))
    }

    pub fn attribs(&self) -> Result<AttributeView, Error> {
        match &self.0.element {
            Some(state) => Ok(AttributeView::new(state.dom.clone(), state.node_id)),
            None => self.delegate("attribs")?.attribs(),
        }
    }

    pub fn data(&self) -> Result<DataView, Error> {
        match &self.0.element {
            Some(state) => Ok(DataView::new(state.dom.clone(), state.node_id)),
            None => self.delegate("data")?.data(),
        }
    }

    pub fn style(&self) -> Result<StyleView, Error> {
        match &self.0.element {
            Some(state) => Ok(StyleView::new(state.clone())),
            None => self.delegate("style")?.style(),
        }
    }

    /// Left edge of the element's border box, relative to the viewport
    pub fn absolute_left(&self) -> Result<f64, Error> {
        match &self.0.element {
            Some(_) => Ok(self.rect()?.x0),
            None => self.delegate("absolute_left")?.absolute_left(),
        }
    }

    pub fn absolute_top(&self) -> Result<f64, Error> {
        match &self.0.element {
            Some(_) => Ok(self.rect()?.y0),
            None => self.delegate("absolute_top")?.absolute_top(),
        }
    }

    /// Entities for every descendant element matching `selector`
    pub fn qsa(&self, selector: &str) -> Result<Vec<Entity>, Error> {
        let Some(state) = &self.0.element else {
            return self.delegate("qsa")?.qsa(selector);
        };
        let dom = self.dom()?;
        let node_ids = dom.document().query_selector_all(state.node_id, selector)?;
        node_ids.into_iter().map(|node_id| dom.wrap(node_id)).collect()
    }

    /// The first descendant element matching `selector`
    pub fn qs(&self, selector: &str) -> Result<Option<Entity>, Error> {
        let state = self.element_state("qs")?;
        let dom = self.dom()?;
        let node_id = dom.document().query_selector(state.node_id, selector)?;
        node_id.map(|node_id| dom.wrap(node_id)).transpose()
    }

    /// The parent element's entity, if the parent is an element
    pub fn parent(&self) -> Result<Option<Entity>, Error> {
        let state = self.element_state("parent")?;
        let dom = self.dom()?;
        let parent_id = dom.document().parent_element(state.node_id);
        parent_id.map(|node_id| dom.wrap(node_id)).transpose()
    }

    /// The bounding client rect of the element
    pub fn rect(&self) -> Result<Rect, Error> {
        let state = self.element_state("rect")?;
        let dom = self.dom()?;
        let rect = dom.document().bounding_client_rect(state.node_id)?;
        Ok(rect)
    }

    pub fn client_width(&self) -> Result<f64, Error> {
        let state = self.element_state("client_width")?;
        let dom = self.dom()?;
        let width = dom.document().client_width(state.node_id);
        Ok(width)
    }

    pub fn client_height(&self) -> Result<f64, Error> {
        let state = self.element_state("client_height")?;
        let dom = self.dom()?;
        let height = dom.document().client_height(state.node_id);
        Ok(height)
    }

    /// The element's children: entities for elements, ids for text nodes
    pub fn content(&self) -> Result<Vec<ContentNode>, Error> {
        let state = self.element_state("content")?;
        content_nodes(&self.dom()?, state.node_id)
    }

    /// Replace the element's children with `content`
    pub fn set_content(&self, content: impl Into<Value>) -> Result<(), Error> {
        let state = self.element_state("set_content")?;
        let dom = self.dom()?;
        let detached = clear_children(&dom, state);
        let result = add_content(&dom, state, content.into(), Insert::Append);
        reclaim_detached(&dom, detached);
        result
    }

    pub fn append(&self, content: impl Into<Value>) -> Result<(), Error> {
        let state = self.element_state("append")?;
        add_content(&self.dom()?, state, content.into(), Insert::Append)
    }

    pub fn prepend(&self, content: impl Into<Value>) -> Result<(), Error> {
        let state = self.element_state("prepend")?;
        add_content(&self.dom()?, state, content.into(), Insert::Prepend)
    }

    /// Detach a child entity or text node. The node stays alive and can be inserted again.
    pub fn remove(&self, child: impl Into<Value>) -> Result<(), Error> {
        let state = self.element_state("remove")?;
        let dom = self.dom()?;
        let (node_id, entity) = match child.into() {
            Value::Entity(entity) => (entity.dom_element(), Some(entity)),
            Value::Node(node_id) if dom.document().is_text_node(node_id) => (node_id, None),
            other => {
                return Err(Error::InvalidArgument(format!(
                    "can only remove entities and text nodes, got a {}",
                    other.type_name()
                )));
            }
        };

        dom.document_mut().remove_child(state.node_id, node_id)?;

        if let Some(entity) = entity {
            if let Some(id) = entity.id() {
                let mut named_children = state.named_children.borrow_mut();
                if named_children.get(id) == Some(&entity) {
                    named_children.shift_remove(id);
                }
            }
        }
        Ok(())
    }

    /// The attached child entity named `id`
    pub fn child(&self, id: &str) -> Result<Option<Entity>, Error> {
        let state = self.element_state("child")?;
        let Some(child) = state.named_children.borrow().get(id).cloned() else {
            return Ok(None);
        };
        let dom = self.dom()?;
        let parent_id = dom.document().parent(child.dom_element());
        if parent_id == Some(state.node_id) {
            Ok(Some(child))
        } else {
            state.named_children.borrow_mut().shift_remove(id);
            Ok(None)
        }
    }

    /// Serialised children of the element
    pub fn html(&self) -> Result<String, Error> {
        let state = self.element_state("html")?;
        let html = self.dom()?.document().inner_html(state.node_id);
        Ok(html)
    }

    /// Replace the element's children with parsed markup. The new children are not wrapped
    /// until something asks for them.
    pub fn set_html(&self, markup: &str) -> Result<(), Error> {
        let state = self.element_state("set_html")?;
        let dom = self.dom()?;
        let detached = clear_children(&dom, state);
        let result = dom.document_mut().set_inner_html(state.node_id, markup);
        reclaim_detached(&dom, detached);
        result?;
        Ok(())
    }

    pub fn text(&self) -> Result<String, Error> {
        let state = self.element_state("text")?;
        let text = self.dom()?.document().text_content(state.node_id);
        Ok(text)
    }

    /// Replace the element's children with the string form of `text`
    pub fn set_text(&self, text: impl Into<Value>) -> Result<(), Error> {
        let state = self.element_state("set_text")?;
        let dom = self.dom()?;
        let text = text.into().to_js_string();
        let detached = clear_children(&dom, state);
        let result = add_content(&dom, state, Value::String(text), Insert::Append);
        reclaim_detached(&dom, detached);
        result
    }

    /// Serialised markup of the entity's element
    pub fn outer_html(&self) -> Result<String, Error> {
        let html = self.dom()?.document().outer_html(self.dom_element());
        Ok(html)
    }

    /// Dispatch a click at the element
    pub fn click(&self, pointer: Option<PointerData>) -> Result<DomEvent, Error> {
        let state = self.element_state("click")?;
        Ok(self.dom()?.click(state.node_id, pointer))
    }

    /// Focus the element. Returns false if focus did not move.
    pub fn focus(&self) -> Result<bool, Error> {
        let state = self.element_state("focus")?;
        Ok(self.dom()?.focus(state.node_id))
    }

    pub fn blur(&self) -> Result<bool, Error> {
        let state = self.element_state("blur")?;
        Ok(self.dom()?.blur(state.node_id))
    }

    /// The form value of the element
    pub fn value(&self) -> Result<Option<String>, Error> {
        let state = self.element_state("value")?;
        let value = self.dom()?.document().value(state.node_id);
        Ok(value)
    }

    pub fn set_value(&self, value: &str) -> Result<(), Error> {
        let state = self.element_state("set_value")?;
        self.dom()?.document_mut().set_value(state.node_id, value)?;
        Ok(())
    }

    pub fn checked(&self) -> Result<bool, Error> {
        let state = self.element_state("checked")?;
        let checked = self.dom()?.document().checked(state.node_id);
        Ok(checked)
    }

    pub fn set_checked(&self, checked: bool) -> Result<(), Error> {
        let state = self.element_state("set_checked")?;
        self.dom()?
            .document_mut()
            .set_checked(state.node_id, checked)?;
        Ok(())
    }
}

/// Detach every child of the element and forget its named children. Returns the detached ids.
fn clear_children(dom: &Dom, state: &ElementState) -> Vec<usize> {
    let named_children = std::mem::take(&mut *state.named_children.borrow_mut());
    drop(named_children);
    dom.document_mut().remove_all_children(state.node_id)
}

/// Drop the nodes that are still detached, unless an entity bound inside them is still held
/// by someone
fn reclaim_detached(dom: &Dom, detached: Vec<usize>) {
    for node_id in detached {
        let still_detached = dom
            .document()
            .get_node(node_id)
            .is_some_and(|node| node.parent.is_none());
        if still_detached && !dom.subtree_is_held(node_id) {
            dom.reclaim(node_id);
        }
    }
}

type EntityRefs = FxHashMap<*const EntityInner, (Entity, usize)>;

fn count_reference(entity: &Entity, refs: &mut EntityRefs, pending: &mut Vec<Entity>) {
    let (_, count) = refs.entry(Rc::as_ptr(&entity.0)).or_insert_with(|| {
        pending.push(entity.clone());
        (entity.clone(), 0)
    });
    *count += 1;
}

/// Whether any of `cached`, or an entity they reach through owners, named children or an
/// imported delegate, has a reference besides the cache's and those links.
pub(crate) fn held_outside(cached: Vec<Entity>) -> bool {
    let mut refs = EntityRefs::default();
    let mut pending = Vec::new();
    for entity in &cached {
        count_reference(entity, &mut refs, &mut pending);
    }
    drop(cached);

    while let Some(entity) = pending.pop() {
        if let Some(owner) = entity.0.owner.borrow().as_ref() {
            count_reference(owner, &mut refs, &mut pending);
        }
        if let Some(state) = &entity.0.element {
            for child in state.named_children.borrow().values() {
                count_reference(child, &mut refs, &mut pending);
            }
        }
        if let Some(delegate) = entity.0.dom_facing.as_ref().and_then(|d| d.as_entity()) {
            count_reference(delegate, &mut refs, &mut pending);
        }
    }

    // `refs` holds one more reference to each entity
    refs.values()
        .any(|(entity, count)| Rc::strong_count(&entity.0) > count + 1)
}

impl DomFacing for Entity {
    fn absolute_left(&self) -> Result<f64, Error> {
        Entity::absolute_left(self)
    }

    fn absolute_top(&self) -> Result<f64, Error> {
        Entity::absolute_top(self)
    }

    fn style(&self) -> Result<StyleView, Error> {
        Entity::style(self)
    }

    fn attribs(&self) -> Result<AttributeView, Error> {
        Entity::attribs(self)
    }

    fn data(&self) -> Result<DataView, Error> {
        Entity::data(self)
    }

    fn qsa(&self, selector: &str) -> Result<Vec<Entity>, Error> {
        Entity::qsa(self, selector)
    }

    fn as_entity(&self) -> Option<&Entity> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_results_are_checked() {
        let dom = Dom::default();
        let returns_map = Constructor::new("map", |_, _, _, _| Ok(Value::map([("a", 1)])));
        assert_eq!(
            dom.construct(Some(returns_map), EntitySpec::new()),
            Err(Error::InvalidConstructorResult)
        );

        let returns_text = Constructor::new("text", |dom, _, _, _| {
            Ok(Value::Node(dom.document_mut().create_text_node("x")))
        });
        assert_eq!(
            dom.construct(Some(returns_text), EntitySpec::new()),
            Err(Error::InvalidConstructorResult)
        );

        assert_eq!(
            dom.construct(None, EntitySpec::new()),
            Err(Error::MissingType)
        );
    }

    #[test]
    fn returned_node_is_wrapped_by_the_new_entity() {
        let dom = Dom::default();
        let raw = Constructor::new("raw", |dom, _, _, _| {
            Ok(Value::Node(dom.document_mut().create_element("section")))
        });
        let entity = dom.construct(Some(raw), EntitySpec::new()).unwrap();
        assert_eq!(dom.wrap(entity.dom_element()).unwrap(), entity);
        assert_eq!(entity.owner(), entity);
        assert!(!entity.is_element());
        assert!(matches!(
            entity.classes(),
            Err(Error::Unsupported { operation: "classes", .. })
        ));
    }

    #[test]
    fn returned_entity_gets_an_owner() {
        let dom = Dom::default();
        let panel = Constructor::new("panel", |dom, _, _, _| {
            dom.build("div", EntitySpec::new()).map(Value::from)
        });
        let entity = dom.construct(Some(panel), EntitySpec::new()).unwrap();
        let layout = dom.wrap(entity.dom_element()).unwrap();
        assert_ne!(layout, entity);
        assert_eq!(layout.owner(), entity);
        assert_eq!(dom.entity_of(entity.dom_element()), Some(entity));
    }

    #[test]
    fn property_kinds() {
        let dom = Dom::default();
        let stored = Rc::new(RefCell::new(Value::Null));
        let kinds = Constructor::new("kinds", {
            let stored = stored.clone();
            move |dom, _, define, _| {
                let read = stored.clone();
                let write = stored.clone();
                let sink = stored.clone();
                define
                    .value("fixed", 1)
                    .read_only("computed", || Ok(Value::from("c")))
                    .accessor(
                        "both",
                        move || Ok(read.borrow().clone()),
                        move |v| {
                            *write.borrow_mut() = v;
                            Ok(())
                        },
                    )
                    .write_only("sink", move |v| {
                        *sink.borrow_mut() = v;
                        Ok(())
                    })
                    .method("twice", |args| {
                        Ok(Value::from(args.first().map_or(0.0, Value::to_number) * 2.0))
                    });
                dom.build("div", EntitySpec::new()).map(Value::from)
            }
        });
        let entity = dom.construct(Some(kinds), EntitySpec::new()).unwrap();

        assert_eq!(entity.get("fixed").unwrap(), Some(Value::from(1)));
        assert_eq!(entity.get("computed").unwrap(), Some(Value::from("c")));
        assert_eq!(entity.get("sink").unwrap(), None);
        assert_eq!(entity.get("nothing").unwrap(), None);
        assert_eq!(entity.get("entityType").unwrap(), Some(Value::from("kinds")));

        entity.set("both", "x").unwrap();
        assert_eq!(entity.get("both").unwrap(), Some(Value::from("x")));
        entity.set("sink", 5).unwrap();
        assert_eq!(*stored.borrow(), Value::from(5));

        assert_eq!(
            entity.set("fixed", 2),
            Err(Error::ReadOnlyProperty("fixed".into()))
        );
        assert_eq!(
            entity.set("computed", 2),
            Err(Error::ReadOnlyProperty("computed".into()))
        );
        assert_eq!(
            entity.set("nothing", 2),
            Err(Error::UnknownProperty("nothing".into()))
        );
        assert_eq!(entity.call("twice", &[Value::from(4)]).unwrap(), Value::from(8));
    }

    #[test]
    fn has_ancestor_walks_parent_elements() {
        let dom = Dom::default();
        let inner = dom.build("span", EntitySpec::new()).unwrap();
        let outer = dom.build("div", inner.clone()).unwrap();
        let body = dom.body().unwrap();
        body.append(outer.clone()).unwrap();

        assert!(inner.has_ancestor(&outer).unwrap());
        assert!(inner.has_ancestor(body.dom_element()).unwrap());
        assert!(!outer.has_ancestor(&inner).unwrap());
        assert!(!inner.has_ancestor(&inner).unwrap());
    }
}
