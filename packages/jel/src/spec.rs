use indexmap::IndexMap;

use crate::{Constructor, Handler, Value};

/// Inline style given in an [`EntitySpec`]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StyleSpec {
    #[default]
    None,
    /// CSS declaration text, replacing the element's inline style
    Text(String),
    /// Individual properties, each set through the element's style view
    Map(IndexMap<String, Value>),
}

/// The configuration record an entity is constructed from.
///
/// Every field is optional. Which ones mean anything depends on the constructor: the built-in
/// element constructor reads `tag`, `classes`, `content`, `html`, `attribs`, `data` and
/// `style`; custom constructors usually read their own settings from `props`. `id` and
/// `events` are handled by entity construction itself, whatever the constructor.
///
/// ```
/// use jel::{EntitySpec, Value};
///
/// let spec = EntitySpec::new()
///     .tag("button")
///     .id("ok")
///     .classes(["primary", "wide"].to_vec())
///     .content("OK")
///     .attrib("type", "submit");
/// assert_eq!(spec.tag.as_deref(), Some("button"));
/// assert_eq!(spec.content, Value::from("OK"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntitySpec {
    /// The constructor that builds entities from this spec. Required when the spec is used as
    /// content.
    pub ty: Option<Constructor>,
    /// Name under which a parent element entity exposes the entity (`$<id>`)
    pub id: Option<String>,
    pub tag: Option<String>,
    /// A string, list or map of class names (see [`flatten_classes`](crate::flatten_classes))
    pub classes: Value,
    pub content: Value,
    /// Markup parsed into the initial content. Cannot be combined with `content`.
    pub html: Option<String>,
    pub attribs: IndexMap<String, Value>,
    /// `data-` attributes, keyed without the prefix
    pub data: IndexMap<String, Value>,
    pub style: StyleSpec,
    /// Handlers registered once the entity exists. `None` entries are skipped.
    pub events: IndexMap<String, Option<Handler>>,
    /// Constructor-specific settings
    pub props: IndexMap<String, Value>,
}

impl EntitySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spec for the given constructor
    pub fn of(ty: Constructor) -> Self {
        Self {
            ty: Some(ty),
            ..Default::default()
        }
    }

    pub fn ty(mut self, ty: Constructor) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn classes(mut self, classes: impl Into<Value>) -> Self {
        self.classes = classes.into();
        self
    }

    pub fn content(mut self, content: impl Into<Value>) -> Self {
        self.content = content.into();
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn attrib(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attribs.insert(name.into(), value.into());
        self
    }

    pub fn data(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn style_text(mut self, css: impl Into<String>) -> Self {
        self.style = StyleSpec::Text(css.into());
        self
    }

    /// Add one style property. Replaces CSS text given earlier with [`style_text`](Self::style_text).
    pub fn style(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        match &mut self.style {
            StyleSpec::Map(map) => {
                map.insert(name.into(), value.into());
            }
            style => {
                *style = StyleSpec::Map(IndexMap::from([(name.into(), value.into())]));
            }
        }
        self
    }

    pub fn on(self, name: impl Into<String>, handler: Handler) -> Self {
        self.event(name, Some(handler))
    }

    pub fn event(mut self, name: impl Into<String>, handler: Option<Handler>) -> Self {
        self.events.insert(name.into(), handler);
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// A constructor-specific setting, or `Null` when absent
    pub fn get_prop(&self, name: &str) -> Value {
        self.props.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_map_replaces_text() {
        let spec = EntitySpec::new()
            .style_text("color: red")
            .style("width", "10px")
            .style("height", "5px");
        let StyleSpec::Map(map) = &spec.style else {
            panic!("expected a style map, got {:?}", spec.style);
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), ["width", "height"]);
    }

    #[test]
    fn missing_props_read_as_null() {
        let spec = EntitySpec::new().prop("checked", true);
        assert_eq!(spec.get_prop("checked"), Value::Bool(true));
        assert!(spec.get_prop("caption").is_null());
    }
}
