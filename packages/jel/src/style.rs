//! The style view of an element entity.
//!
//! Besides plain inline properties the view understands two families of composite keys:
//! `filter_<name>` and `transform_<name>`. Each sets one function of the element's `filter` or
//! `transform` property, so independent parts of a program can adjust e.g. `blur` and
//! `brightness` without overwriting each other:
//!
//! ```
//! use jel::{Dom, EntitySpec};
//!
//! let dom = Dom::default();
//! let el = dom.create(EntitySpec::new()).unwrap();
//! let style = el.style().unwrap();
//! style.set("filter_blur", "2px").unwrap();
//! style.set("filter_brightness", 1.2).unwrap();
//! style.set("filter_blur", "4px").unwrap();
//! assert_eq!(style.get("filter").unwrap().as_deref(), Some("blur(4px) brightness(1.2)"));
//! ```

use std::rc::Rc;

use indexmap::IndexMap;
use jel_dom::attr_name;

use crate::element::ElementState;
use crate::{Error, Value};

/// The functions currently assigned through `filter_<name>` and `transform_<name>` keys, in
/// first-assignment order
#[derive(Clone, Debug, Default)]
pub(crate) struct CompositeStyle {
    filters: IndexMap<String, String>,
    transforms: IndexMap<String, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Composite {
    Filter,
    Transform,
}

impl Composite {
    fn property(self) -> &'static str {
        match self {
            Composite::Filter => "filter",
            Composite::Transform => "transform",
        }
    }
}

impl CompositeStyle {
    fn entries(&self, kind: Composite) -> &IndexMap<String, String> {
        match kind {
            Composite::Filter => &self.filters,
            Composite::Transform => &self.transforms,
        }
    }

    fn entries_mut(&mut self, kind: Composite) -> &mut IndexMap<String, String> {
        match kind {
            Composite::Filter => &mut self.filters,
            Composite::Transform => &mut self.transforms,
        }
    }

    fn joined(&self, kind: Composite) -> String {
        self.entries(kind)
            .iter()
            .map(|(name, value)| format!("{name}({value})"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split `filter_blur` into `(Filter, "blur")`. The name must be non-empty and made of ASCII
/// word characters.
fn composite_key(key: &str) -> Option<(Composite, &str)> {
    let (kind, name) = if let Some(name) = key.strip_prefix("filter_") {
        (Composite::Filter, name)
    } else if let Some(name) = key.strip_prefix("transform_") {
        (Composite::Transform, name)
    } else {
        return None;
    };
    let is_word = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    is_word.then_some((kind, name))
}

/// A live view of an element's inline style.
///
/// Keys may be camelCase (`backgroundColor`), kebab-case (`background-color`) or custom
/// properties (`--accent`). Setting a null or empty value removes the property.
#[derive(Clone)]
pub struct StyleView(Rc<ElementState>);

impl std::fmt::Debug for StyleView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StyleView").field(&self.0.node_id).finish()
    }
}

impl StyleView {
    pub(crate) fn new(state: Rc<ElementState>) -> Self {
        Self(state)
    }

    /// The inline value of a property, or the value last assigned to a composite key
    pub fn get(&self, key: &str) -> Result<Option<String>, Error> {
        if let Some((kind, name)) = composite_key(key) {
            let composite = self.0.composite_style.borrow();
            return Ok(composite.entries(kind).get(name).cloned());
        }
        let dom = self.0.dom.upgrade()?;
        let doc = dom.document();
        let data = doc.element_data(self.0.node_id)?;
        Ok(data.inline_style().get(key).map(str::to_string))
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), Error> {
        let value = match value.into() {
            Value::Null => String::new(),
            value => value.to_js_string(),
        };

        if key == "backgroundImageUrl" {
            let value = if value.is_empty() {
                value
            } else {
                format!("url('{value}')")
            };
            return self.set_property("backgroundImage", &value);
        }

        if let Some((kind, name)) = composite_key(key) {
            let joined = {
                let mut composite = self.0.composite_style.borrow_mut();
                let entries = composite.entries_mut(kind);
                if value.is_empty() {
                    entries.shift_remove(name);
                } else {
                    entries.insert(name.to_string(), value);
                }
                composite.joined(kind)
            };
            return self.set_property(kind.property(), &joined);
        }

        self.set_property(key, &value)
    }

    pub fn has(&self, key: &str) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    pub fn delete(&self, key: &str) -> Result<(), Error> {
        self.set(key, Value::Null)
    }

    /// Names of the inline properties, in CSS (kebab-case) form
    pub fn keys(&self) -> Result<Vec<String>, Error> {
        let dom = self.0.dom.upgrade()?;
        let doc = dom.document();
        let data = doc.element_data(self.0.node_id)?;
        Ok(data.inline_style().names().map(str::to_string).collect())
    }

    pub fn css_text(&self) -> Result<String, Error> {
        let dom = self.0.dom.upgrade()?;
        let doc = dom.document();
        let data = doc.element_data(self.0.node_id)?;
        Ok(data.inline_style().to_css_text())
    }

    /// Replace the whole inline style
    pub fn set_css_text(&self, css: &str) -> Result<(), Error> {
        let dom = self.0.dom.upgrade()?;
        let mut doc = dom.document_mut();
        let mut mutator = doc.mutate();
        if css.trim().is_empty() {
            mutator.clear_attribute(self.0.node_id, attr_name("style"))?;
        } else {
            mutator.set_attribute(self.0.node_id, attr_name("style"), css)?;
        }
        Ok(())
    }

    fn set_property(&self, name: &str, value: &str) -> Result<(), Error> {
        let dom = self.0.dom.upgrade()?;
        let mut doc = dom.document_mut();
        doc.mutate()
            .set_style_property(self.0.node_id, name, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_keys() {
        assert_eq!(
            composite_key("filter_blur"),
            Some((Composite::Filter, "blur"))
        );
        assert_eq!(
            composite_key("transform_translate_x"),
            Some((Composite::Transform, "translate_x"))
        );
        assert_eq!(composite_key("filter_"), None);
        assert_eq!(composite_key("filter_drop-shadow"), None);
        assert_eq!(composite_key("filter"), None);
    }

    #[test]
    fn joins_in_first_assignment_order() {
        let mut composite = CompositeStyle::default();
        composite
            .entries_mut(Composite::Transform)
            .insert("rotate".into(), "5deg".into());
        composite
            .entries_mut(Composite::Transform)
            .insert("scale".into(), "2".into());
        composite
            .entries_mut(Composite::Transform)
            .insert("rotate".into(), "10deg".into());
        assert_eq!(
            composite.joined(Composite::Transform),
            "rotate(10deg) scale(2)"
        );
        assert_eq!(composite.joined(Composite::Filter), "");
    }
}
