//! Live views over an element's attributes and `data-` attributes.
//!
//! Views keep no state of their own: every call reads or writes the element in the document.

use jel_dom::attr_name;

use crate::{Error, Value, WeakDom};

const DATA_PREFIX: &str = "data-";

#[derive(Clone, Debug)]
pub struct AttributeView {
    dom: WeakDom,
    node_id: usize,
}

impl AttributeView {
    pub(crate) fn new(dom: WeakDom, node_id: usize) -> Self {
        Self { dom, node_id }
    }

    pub fn get(&self, name: &str) -> Result<Option<String>, Error> {
        read_attr(&self.dom, self.node_id, name)
    }

    /// Set an attribute to the string form of `value`
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        write_attr(&self.dom, self.node_id, name, &value.into().to_js_string())
    }

    pub fn has(&self, name: &str) -> Result<bool, Error> {
        Ok(self.get(name)?.is_some())
    }

    pub fn delete(&self, name: &str) -> Result<(), Error> {
        delete_attr(&self.dom, self.node_id, name)
    }

    /// Attribute names in document order
    pub fn keys(&self) -> Result<Vec<String>, Error> {
        let dom = self.dom.upgrade()?;
        let doc = dom.document();
        let data = doc.element_data(self.node_id)?;
        Ok(data
            .attrs()
            .iter()
            .map(|attr| attr.name.local.to_string())
            .collect())
    }
}

/// The `data-` attributes of an element, keyed without the prefix
#[derive(Clone, Debug)]
pub struct DataView {
    dom: WeakDom,
    node_id: usize,
}

impl DataView {
    pub(crate) fn new(dom: WeakDom, node_id: usize) -> Self {
        Self { dom, node_id }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, Error> {
        read_attr(&self.dom, self.node_id, &format!("{DATA_PREFIX}{key}"))
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), Error> {
        write_attr(
            &self.dom,
            self.node_id,
            &format!("{DATA_PREFIX}{key}"),
            &value.into().to_js_string(),
        )
    }

    pub fn has(&self, key: &str) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    pub fn delete(&self, key: &str) -> Result<(), Error> {
        delete_attr(&self.dom, self.node_id, &format!("{DATA_PREFIX}{key}"))
    }

    pub fn keys(&self) -> Result<Vec<String>, Error> {
        let dom = self.dom.upgrade()?;
        let doc = dom.document();
        let data = doc.element_data(self.node_id)?;
        Ok(data
            .attrs()
            .iter()
            .filter_map(|attr| attr.name.local.strip_prefix(DATA_PREFIX))
            .map(str::to_string)
            .collect())
    }
}

fn read_attr(dom: &WeakDom, node_id: usize, name: &str) -> Result<Option<String>, Error> {
    let dom = dom.upgrade()?;
    let doc = dom.document();
    Ok(doc.element_data(node_id)?.attr(name).map(str::to_string))
}

pub(crate) fn write_attr(
    dom: &WeakDom,
    node_id: usize,
    name: &str,
    value: &str,
) -> Result<(), Error> {
    if name.is_empty() || name.contains(|c: char| c.is_whitespace() || "\"'>/=".contains(c)) {
        return Err(Error::InvalidArgument(format!(
            "{name:?} is not a valid attribute name"
        )));
    }
    let dom = dom.upgrade()?;
    let mut doc = dom.document_mut();
    doc.mutate().set_attribute(node_id, attr_name(name), value)?;
    Ok(())
}

pub(crate) fn delete_attr(dom: &WeakDom, node_id: usize, name: &str) -> Result<(), Error> {
    let dom = dom.upgrade()?;
    let mut doc = dom.document_mut();
    doc.mutate().clear_attribute(node_id, attr_name(name))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dom;

    fn element(dom: &Dom) -> usize {
        dom.document_mut().create_element("div")
    }

    #[test]
    fn attributes_pass_through() {
        let dom = Dom::default();
        let node = element(&dom);
        let attribs = AttributeView::new(dom.downgrade(), node);

        attribs.set("title", "hello").unwrap();
        attribs.set("tabindex", 3).unwrap();
        attribs.set("hidden", true).unwrap();
        assert_eq!(attribs.get("title").unwrap().as_deref(), Some("hello"));
        assert_eq!(attribs.get("tabindex").unwrap().as_deref(), Some("3"));
        assert_eq!(attribs.keys().unwrap(), ["title", "tabindex", "hidden"]);

        attribs.delete("title").unwrap();
        assert!(!attribs.has("title").unwrap());
        assert_eq!(attribs.get("missing").unwrap(), None);
        assert!(attribs.set("bad name", "x").is_err());
    }

    #[test]
    fn data_keys_are_unprefixed() {
        let dom = Dom::default();
        let node = element(&dom);
        let attribs = AttributeView::new(dom.downgrade(), node);
        let data = DataView::new(dom.downgrade(), node);

        attribs.set("class", "x").unwrap();
        data.set("user", "ada").unwrap();
        data.set("count", 2.5).unwrap();
        assert_eq!(attribs.get("data-user").unwrap().as_deref(), Some("ada"));
        assert_eq!(data.keys().unwrap(), ["user", "count"]);

        data.delete("user").unwrap();
        assert!(!data.has("user").unwrap());
        assert_eq!(data.get("count").unwrap().as_deref(), Some("2.5"));
    }

    #[test]
    fn views_outliving_the_dom_fail() {
        let dom = Dom::default();
        let node = element(&dom);
        let attribs = AttributeView::new(dom.downgrade(), node);
        drop(dom);
        assert_eq!(attribs.get("id"), Err(Error::DocumentDropped));
    }
}
