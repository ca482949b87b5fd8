//! The built-in element constructor and the per-element state behind element entities.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use jel_dom::{DomEvent, EventListener, attr_name};

use crate::content::{Insert, add_content, adopt_children};
use crate::style::CompositeStyle;
use crate::{
    AttributeView, DataView, Define, Dom, ElementMode, Entity, EntitySpec, Error, EventBinding,
    EventData, Function, Handler, StyleSpec, StyleView, Value, WeakDom, flatten_classes,
};

/// Properties read from (and written to) the element itself
pub(crate) const PASS_THROUGH_PROPERTIES: [&str; 17] = [
    "value",
    "name",
    "checked",
    "enabled",
    "autoplay",
    "spellcheck",
    "translate",
    "autofocus",
    "contentEditable",
    "lang",
    "scrollWidth",
    "scrollHeight",
    "scrollTop",
    "scrollLeft",
    "tabIndex",
    "width",
    "height",
];

/// Element methods exposed as functions bound to the element
pub(crate) const BOUND_METHODS: [&str; 8] = [
    "click",
    "focus",
    "blur",
    "play",
    "pause",
    "getContext",
    "requestFullscreen",
    "requestPointerLock",
];

/// Elements with `width`/`height` properties
const SIZED_ELEMENTS: [&str; 7] = ["canvas", "img", "video", "iframe", "embed", "object", "input"];

/// What an element entity knows beyond the element itself
pub(crate) struct ElementState {
    pub(crate) node_id: usize,
    pub(crate) dom: WeakDom,
    /// Child entities by id, backing `$<id>` lookups
    pub(crate) named_children: RefCell<IndexMap<String, Entity>>,
    pub(crate) composite_style: RefCell<CompositeStyle>,
    /// Native listeners wrapping each registered handler, so `off` finds the same listener
    listeners: RefCell<Vec<(Handler, EventListener)>>,
}

impl ElementState {
    fn new(dom: WeakDom, node_id: usize) -> Self {
        Self {
            node_id,
            dom,
            named_children: RefCell::new(IndexMap::new()),
            composite_style: RefCell::new(CompositeStyle::default()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn release(&self) {
        let children = std::mem::take(&mut *self.named_children.borrow_mut());
        drop(children);
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        drop(listeners);
    }

    /// The native listener for `handler`, created on first use
    fn listener_for(&self, handler: &Handler) -> EventListener {
        if let Some(listener) = self.cached_listener(handler) {
            return listener;
        }

        let dom = self.dom.clone();
        let node_id = self.node_id;
        let wrapped = handler.clone();
        let listener: EventListener = Rc::new(move |event: &mut DomEvent| {
            if let Some(pointer) = event.pointer.as_mut() {
                if pointer.inner_x.is_none() || pointer.inner_y.is_none() {
                    let rect = dom
                        .upgrade()
                        .ok()
                        .and_then(|dom| dom.document().bounding_client_rect(node_id).ok());
                    if let Some(rect) = rect {
                        if pointer.inner_x.is_none() {
                            pointer.inner_x = Some(pointer.client_x - rect.x0);
                        }
                        if pointer.inner_y.is_none() {
                            pointer.inner_y = Some(pointer.client_y - rect.y0);
                        }
                    }
                }
            }

            let mut data = EventData::Dom(event.clone());
            if let Err(_err) = wrapped.call(&mut data) {
                #[cfg(feature = "tracing")]
                tracing::error!("{} handler on node {node_id} failed: {_err}", event.name);
            }
            if let EventData::Dom(handled) = data {
                *event = handled;
            }
        });

        self.listeners
            .borrow_mut()
            .push((handler.clone(), listener.clone()));
        listener
    }

    fn cached_listener(&self, handler: &Handler) -> Option<EventListener> {
        self.listeners
            .borrow()
            .iter()
            .find(|(h, _)| h.ptr_eq(handler))
            .map(|(_, listener)| listener.clone())
    }

    /// Read a pass-through property. Returns `None` if `name` is not one.
    pub(crate) fn read_property(&self, name: &str) -> Result<Option<Value>, Error> {
        if !PASS_THROUGH_PROPERTIES.contains(&name) {
            return Ok(None);
        }
        let dom = self.dom.upgrade()?;
        let doc = dom.document();
        let node_id = self.node_id;
        let data = doc.element_data(node_id)?;

        let value = match name {
            "value" => doc.value(node_id).into(),
            "name" | "lang" => data.attr(name).unwrap_or("").into(),
            "checked" => doc.checked(node_id).into(),
            "enabled" => (!data.is_disabled()).into(),
            "autoplay" | "autofocus" => data.has_attr(name).into(),
            "spellcheck" => (data.attr("spellcheck") != Some("false")).into(),
            "translate" => (data.attr("translate") != Some("no")).into(),
            "contentEditable" => doc.content_editable(node_id).into(),
            "scrollWidth" => doc.scroll_width(node_id).into(),
            "scrollHeight" => doc.scroll_height(node_id).into(),
            "scrollTop" => doc.scroll_top(node_id).into(),
            "scrollLeft" => doc.scroll_left(node_id).into(),
            "tabIndex" => doc.tab_index(node_id).into(),
            "width" | "height" => {
                let tag: &str = data.local_name();
                if !SIZED_ELEMENTS.contains(&tag) {
                    Value::Null
                } else {
                    let parsed = data
                        .attr(name)
                        .and_then(|v| v.trim().parse::<u32>().ok());
                    let default = match (tag, name) {
                        ("canvas", "width") => 300,
                        ("canvas", _) => 150,
                        _ => 0,
                    };
                    parsed.unwrap_or(default).into()
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Write a pass-through property. Returns false if `name` is not one.
    pub(crate) fn write_property(&self, name: &str, value: Value) -> Result<bool, Error> {
        if !PASS_THROUGH_PROPERTIES.contains(&name) {
            return Ok(false);
        }
        let dom = self.dom.upgrade()?;
        let mut doc = dom.document_mut();
        let node_id = self.node_id;
        doc.element_data(node_id)?;

        match name {
            "scrollWidth" | "scrollHeight" => {
                return Err(Error::ReadOnlyProperty(name.to_string()));
            }
            "value" => {
                let value = match value {
                    Value::Null => String::new(),
                    value => value.to_js_string(),
                };
                doc.set_value(node_id, &value)?;
            }
            "checked" => doc.set_checked(node_id, value.is_truthy())?,
            "name" | "lang" => {
                doc.mutate()
                    .set_attribute(node_id, attr_name(name), &value.to_js_string())?;
            }
            "enabled" => toggle_attribute(&mut doc, node_id, "disabled", !value.is_truthy())?,
            "autoplay" | "autofocus" => {
                toggle_attribute(&mut doc, node_id, name, value.is_truthy())?;
            }
            "spellcheck" => {
                let spellcheck = if value.is_truthy() { "true" } else { "false" };
                doc.mutate()
                    .set_attribute(node_id, attr_name("spellcheck"), spellcheck)?;
            }
            "translate" => {
                let translate = if value.is_truthy() { "yes" } else { "no" };
                doc.mutate()
                    .set_attribute(node_id, attr_name("translate"), translate)?;
            }
            "contentEditable" => {
                let mode = value.to_js_string().to_ascii_lowercase();
                match mode.as_str() {
                    "true" | "false" | "plaintext-only" => {
                        doc.mutate()
                            .set_attribute(node_id, attr_name("contenteditable"), &mode)?;
                    }
                    "inherit" => {
                        doc.mutate()
                            .clear_attribute(node_id, attr_name("contenteditable"))?;
                    }
                    _ => {
                        return Err(Error::InvalidArgument(format!(
                            "{mode:?} is not a contentEditable mode"
                        )));
                    }
                }
            }
            "scrollTop" => doc.set_scroll_top(node_id, finite_or_zero(value.to_number()))?,
            "scrollLeft" => doc.set_scroll_left(node_id, finite_or_zero(value.to_number()))?,
            "tabIndex" => {
                let index = finite_or_zero(value.to_number()).trunc() as i64;
                doc.mutate()
                    .set_attribute(node_id, attr_name("tabindex"), &index.to_string())?;
            }
            "width" | "height" => {
                let sized = doc
                    .element_name(node_id)
                    .is_some_and(|name| SIZED_ELEMENTS.contains(&&*name.local));
                if sized {
                    let size = finite_or_zero(value.to_number()).max(0.0).trunc() as u32;
                    doc.mutate()
                        .set_attribute(node_id, attr_name(name), &size.to_string())?;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// A bound element method. Returns `None` if `name` is not one.
    pub(crate) fn bound_method(&self, name: &str) -> Option<Function> {
        let method = *BOUND_METHODS.iter().find(|method| **method == name)?;
        let dom = self.dom.clone();
        let node_id = self.node_id;
        Some(Function::new(move |args| {
            call_bound_method(&dom.upgrade()?, node_id, method, args)
        }))
    }
}

fn call_bound_method(
    dom: &Dom,
    node_id: usize,
    method: &'static str,
    args: &[Value],
) -> Result<Value, Error> {
    match method {
        "click" => {
            dom.click(node_id, None);
        }
        "focus" => {
            dom.focus(node_id);
        }
        "blur" => {
            dom.blur(node_id);
        }
        "play" => dom.document_mut().play(node_id)?,
        "pause" => dom.document_mut().pause(node_id)?,
        "getContext" => {
            let kind = args.first().map(Value::to_js_string).unwrap_or_default();
            let context = dom.document_mut().get_context(node_id, &kind)?;
            return Ok(context.into());
        }
        "requestFullscreen" => dom.document_mut().request_fullscreen(node_id)?,
        "requestPointerLock" => dom.document_mut().request_pointer_lock(node_id)?,
        _ => return Err(Error::UnknownProperty(method.to_string())),
    }
    Ok(Value::Null)
}

fn toggle_attribute(
    doc: &mut jel_dom::Document,
    node_id: usize,
    name: &str,
    present: bool,
) -> Result<(), Error> {
    let mut mutator = doc.mutate();
    if present {
        mutator.set_attribute(node_id, attr_name(name), "")?;
    } else {
        mutator.clear_attribute(node_id, attr_name(name))?;
    }
    Ok(())
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() { n } else { 0.0 }
}

impl EventBinding for ElementState {
    fn on(&self, name: &str, handler: Handler) -> Result<(), Error> {
        let listener = self.listener_for(&handler);
        let dom = self.dom.upgrade()?;
        dom.document_mut()
            .add_event_listener(self.node_id, name, listener)?;
        Ok(())
    }

    fn off(&self, name: &str, handler: &Handler) -> Result<(), Error> {
        let Some(listener) = self.cached_listener(handler) else {
            return Ok(());
        };
        let dom = self.dom.upgrade()?;
        let still_listening = {
            let mut doc = dom.document_mut();
            doc.remove_event_listener(self.node_id, name, &listener);
            doc.is_listening(self.node_id, &listener)
        };
        if !still_listening {
            self.listeners
                .borrow_mut()
                .retain(|(registered, _)| !registered.ptr_eq(handler));
        }
        Ok(())
    }
}

/// Create or adopt the element, then apply the spec to it
pub(crate) fn construct_element(
    dom: &Dom,
    mode: ElementMode,
    spec: &EntitySpec,
    define: &mut Define,
) -> Result<Value, Error> {
    let html = spec.html.as_deref().filter(|html| !html.is_empty());

    let node_id = match mode {
        ElementMode::Adopt(node_id) => {
            dom.document().element_data(node_id)?;
            node_id
        }
        ElementMode::Create => {
            if html.is_some() && spec.content.is_truthy() {
                return Err(Error::AmbiguousContent);
            }
            let classes = flatten_classes(&spec.classes)?;
            let tag = spec
                .tag
                .as_deref()
                .filter(|tag| !tag.is_empty())
                .unwrap_or("div");
            let mut doc = dom.document_mut();
            let node_id = doc.create_element(tag);
            if !classes.is_empty() {
                doc.mutate()
                    .set_attribute(node_id, attr_name("class"), &classes.join(" "))?;
            }
            node_id
        }
    };

    let attribs = AttributeView::new(dom.downgrade(), node_id);
    for (name, value) in &spec.attribs {
        attribs.set(name, value.clone())?;
    }
    let data = DataView::new(dom.downgrade(), node_id);
    for (key, value) in &spec.data {
        data.set(key, value.clone())?;
    }

    let state = Rc::new(ElementState::new(dom.downgrade(), node_id));
    define.element(state.clone()).events(state.clone());

    match mode {
        ElementMode::Adopt(_) => adopt_children(dom, &state)?,
        ElementMode::Create => {
            let content = match html {
                Some(html) => Value::list(dom.parse_html(html)?),
                None => spec.content.clone(),
            };
            add_content(dom, &state, content, Insert::Append)?;
        }
    }

    let style = StyleView::new(state);
    match &spec.style {
        StyleSpec::None => {}
        StyleSpec::Text(css) => style.set_css_text(css)?,
        StyleSpec::Map(properties) => {
            for (name, value) in properties {
                style.set(name, value.clone())?;
            }
        }
    }

    Ok(Value::Node(node_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Constructor;

    fn element(dom: &Dom, tag: &str) -> Entity {
        dom.create(EntitySpec::new().tag(tag)).unwrap()
    }

    #[test]
    fn off_forgets_listeners_that_are_no_longer_registered() {
        let dom = Dom::default();
        let node_id = dom.document_mut().create_element("div");
        let state = ElementState::new(dom.downgrade(), node_id);
        let handler = Handler::new(|_| Ok(()));

        state.on("click", handler.clone()).unwrap();
        state.on("input", handler.clone()).unwrap();
        assert_eq!(state.listeners.borrow().len(), 1);

        state.off("click", &handler).unwrap();
        assert_eq!(state.listeners.borrow().len(), 1);
        assert_eq!(dom.document().listener_count(node_id, "input"), 1);

        state.off("input", &handler).unwrap();
        assert!(state.listeners.borrow().is_empty());
        assert_eq!(dom.document().listener_count(node_id, "input"), 0);
    }

    #[test]
    fn pass_through_defaults() {
        let dom = Dom::default();
        let canvas = element(&dom, "canvas");
        assert_eq!(canvas.get("width").unwrap(), Some(Value::from(300)));
        assert_eq!(canvas.get("height").unwrap(), Some(Value::from(150)));
        assert_eq!(canvas.get("enabled").unwrap(), Some(Value::from(true)));
        assert_eq!(canvas.get("spellcheck").unwrap(), Some(Value::from(true)));
        assert_eq!(canvas.get("lang").unwrap(), Some(Value::from("")));

        let div = element(&dom, "div");
        assert_eq!(div.get("width").unwrap(), Some(Value::Null));
        assert_eq!(div.get("value").unwrap(), Some(Value::Null));
        assert_eq!(div.get("contentEditable").unwrap(), Some(Value::from("inherit")));
    }

    #[test]
    fn pass_through_writes() {
        let dom = Dom::default();
        let input = element(&dom, "input");
        input.set("enabled", false).unwrap();
        input.set("value", "abc").unwrap();
        input.set("tabIndex", 2.7).unwrap();
        input.set("width", 40).unwrap();

        let attribs = input.attribs().unwrap();
        assert_eq!(attribs.get("disabled").unwrap().as_deref(), Some(""));
        assert_eq!(attribs.get("tabindex").unwrap().as_deref(), Some("2"));
        assert_eq!(input.get("value").unwrap(), Some(Value::from("abc")));
        assert_eq!(input.get("width").unwrap(), Some(Value::from(40)));
        assert_eq!(input.get("enabled").unwrap(), Some(Value::from(false)));

        assert_eq!(
            input.set("scrollWidth", 10),
            Err(Error::ReadOnlyProperty("scrollWidth".into()))
        );
        assert!(matches!(
            input.set("contentEditable", "sometimes"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn bound_methods_act_on_the_element() {
        let dom = Dom::default();
        let canvas = element(&dom, "canvas");
        assert_eq!(
            canvas.call("getContext", &[Value::from("2d")]).unwrap(),
            Value::from("2d")
        );
        assert_eq!(
            canvas.call("getContext", &[Value::from("webgl")]).unwrap(),
            Value::Null
        );

        let video = element(&dom, "video");
        video.call("play", &[]).unwrap();
        assert!(!dom.document().paused(video.dom_element()));
        assert!(canvas.call("play", &[]).is_err());
        assert!(matches!(canvas.get("click").unwrap(), Some(Value::Function(_))));
    }

    #[test]
    fn html_and_content_conflict() {
        let dom = Dom::default();
        let spec = EntitySpec::of(Constructor::element())
            .content("x")
            .html("<b>y</b>");
        assert_eq!(dom.create(spec), Err(Error::AmbiguousContent));
    }

    #[test]
    fn id_is_not_written_to_the_element() {
        let dom = Dom::default();
        let div = dom.create(EntitySpec::new().id("main")).unwrap();
        assert_eq!(div.id(), Some("main"));
        assert_eq!(div.attribs().unwrap().get("id").unwrap(), None);
    }
}
