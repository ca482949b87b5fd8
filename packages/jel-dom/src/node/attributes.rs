use std::ops::{Deref, DerefMut};

use markup5ever::{LocalName, QualName, ns};

/// A tag attribute, e.g. `class="test"` in `<div class="test" ...>`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug)]
pub struct Attribute {
    /// The name of the attribute (e.g. the `class` in `<div class="test">`)
    pub name: QualName,
    /// The value of the attribute (e.g. the `"test"` in `<div class="test">`)
    pub value: String,
}

impl Attribute {
    /// An attribute in the null namespace, which is where every HTML attribute lives.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: attr_name(name),
            value: value.into(),
        }
    }
}

/// Build the qualified name for an HTML attribute. HTML attribute names are ASCII case-insensitive.
pub fn attr_name(name: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(name.to_ascii_lowercase()))
}

/// Attributes in source order. Lookups compare the local name only.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    inner: Vec<Attribute>,
}

impl Attributes {
    pub fn new(inner: Vec<Attribute>) -> Self {
        Self { inner }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|attr| (&*attr.name.local).eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    pub fn set(&mut self, name: QualName, value: &str) {
        let existing_attr = self.inner.iter_mut().find(|a| a.name.local == name.local);
        if let Some(existing_attr) = existing_attr {
            existing_attr.value.clear();
            existing_attr.value.push_str(value);
        } else {
            self.push(Attribute {
                name,
                value: value.to_string(),
            });
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        let idx = self
            .inner
            .iter()
            .position(|attr| (&*attr.name.local).eq_ignore_ascii_case(name));
        idx.map(|idx| self.inner.remove(idx))
    }
}

impl Deref for Attributes {
    type Target = Vec<Attribute>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl DerefMut for Attributes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_ascii_case() {
        let mut attrs = Attributes::new(vec![
            Attribute::new("data-Kind", "3"),
            Attribute::new("ROLE", "note"),
        ]);
        assert_eq!(attrs.get("DATA-KIND"), Some("3"));
        assert_eq!(attrs.get("role"), Some("note"));

        attrs.set(attr_name("Role"), "banner");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("role"), Some("banner"));

        let removed = attrs.remove("Data-kind").map(|attr| attr.value);
        assert_eq!(removed.as_deref(), Some("3"));
        assert_eq!(attrs.get("data-kind"), None);
    }
}
