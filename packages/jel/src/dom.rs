use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use jel_dom::{Document, DocumentConfig, DomEvent, NodeKind, PointerData, ROOT_NODE_ID};

use crate::builder::{DomBuilder, TagArgs};
use crate::cache::WrapCache;
use crate::entity::{construct, held_outside};
use crate::{Constructor, ContentNode, Entity, EntitySpec, Error, Value};

pub(crate) struct DomInner {
    document: RefCell<Document>,
    cache: RefCell<WrapCache>,
}

impl Drop for DomInner {
    fn drop(&mut self) {
        // Break owner back-references so entities held elsewhere don't keep each other alive
        for entity in self.cache.get_mut().drain() {
            entity.release();
        }
    }
}

/// A host document together with the entities bound to its elements.
///
/// `Dom` is a cheap, shared handle. Entities only hold a [`WeakDom`], so dropping the last
/// `Dom` drops the document; entities that outlive it fail with
/// [`Error::DocumentDropped`].
#[derive(Clone)]
pub struct Dom(Rc<DomInner>);

/// A non-owning handle to a [`Dom`]
#[derive(Clone, Default)]
pub struct WeakDom(Weak<DomInner>);

impl WeakDom {
    pub fn upgrade(&self) -> Result<Dom, Error> {
        self.0.upgrade().map(Dom).ok_or(Error::DocumentDropped)
    }
}

impl fmt::Debug for WeakDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakDom")
            .field(&(self.0.strong_count() > 0))
            .finish()
    }
}

/// What [`Dom::wrap`] binds: a node, or the first element matching a selector
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WrapTarget {
    Node(usize),
    Selector(String),
}

impl From<usize> for WrapTarget {
    fn from(node_id: usize) -> Self {
        WrapTarget::Node(node_id)
    }
}

impl From<&str> for WrapTarget {
    fn from(selector: &str) -> Self {
        WrapTarget::Selector(selector.to_string())
    }
}

impl From<String> for WrapTarget {
    fn from(selector: String) -> Self {
        WrapTarget::Selector(selector)
    }
}

impl TryFrom<&Value> for WrapTarget {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Node(node_id) => Ok(WrapTarget::Node(*node_id)),
            Value::String(selector) => Ok(WrapTarget::Selector(selector.clone())),
            other => Err(Error::InvalidArgument(format!(
                "expected a node or a selector, got a {}",
                other.type_name()
            ))),
        }
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new(DocumentConfig::default())
    }
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dom")
            .field("cached_entities", &self.cache_len())
            .finish_non_exhaustive()
    }
}

impl Dom {
    pub fn new(config: DocumentConfig) -> Self {
        Self::from_document(Document::new(config))
    }

    /// Bind an existing document, e.g. one produced by `jel_html::document_from_html`
    pub fn from_document(document: Document) -> Self {
        Self(Rc::new(DomInner {
            document: RefCell::new(document),
            cache: RefCell::new(WrapCache::default()),
        }))
    }

    /// Borrow the document.
    ///
    /// Don't hold the borrow across calls that construct entities or dispatch events.
    pub fn document(&self) -> Ref<'_, Document> {
        self.0.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.0.document.borrow_mut()
    }

    pub fn downgrade(&self) -> WeakDom {
        WeakDom(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Dom) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The entity bound to `<body>`
    pub fn body(&self) -> Result<Entity, Error> {
        let body_id = self.document().body_id();
        self.wrap(body_id)
    }

    /// The entity bound to an element, creating it on first use.
    ///
    /// Wrapping is idempotent: as long as the node lives, every call returns the same entity.
    /// Selectors are matched against the whole document.
    pub fn wrap(&self, target: impl Into<WrapTarget>) -> Result<Entity, Error> {
        let node_id = match target.into() {
            WrapTarget::Node(node_id) => node_id,
            WrapTarget::Selector(selector) => {
                let found = self.document().query_selector(ROOT_NODE_ID, &selector)?;
                found.ok_or_else(|| {
                    Error::InvalidArgument(format!("no element matches {selector:?}"))
                })?
            }
        };

        if let Some(entity) = self.cached(node_id) {
            return Ok(entity);
        }

        let id = {
            let doc = self.document();
            let Some(data) = doc.get_node(node_id).and_then(|node| node.element_data()) else {
                return Err(Error::InvalidArgument(format!(
                    "node {node_id} is not an element"
                )));
            };
            data.attr("id")
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        };

        let spec = EntitySpec {
            id,
            ..Default::default()
        };
        construct(self, Some(Constructor::adopt(node_id)), spec)
    }

    /// The entity cached for a node, if it was wrapped or constructed
    pub fn cached(&self, node_id: usize) -> Option<Entity> {
        self.0.cache.borrow().get(node_id)
    }

    /// The outermost entity built around a node: its wrapper's owner chain, followed to the end.
    pub fn entity_of(&self, node_id: usize) -> Option<Entity> {
        self.cached(node_id).map(|entity| entity.owner())
    }

    pub fn cache_len(&self) -> usize {
        self.0.cache.borrow().len()
    }

    /// Whether an entity bound to the node or one of its descendants is still held outside the
    /// cache and the links between those entities
    pub(crate) fn subtree_is_held(&self, node_id: usize) -> bool {
        let cached: Vec<Entity> = {
            let doc = self.document();
            let cache = self.0.cache.borrow();
            std::iter::once(node_id)
                .chain(doc.descendants(node_id))
                .filter_map(|id| cache.get(id))
                .collect()
        };
        !cached.is_empty() && held_outside(cached)
    }

    pub(crate) fn cache_insert(&self, node_id: usize, entity: Entity) {
        let previous = self.0.cache.borrow_mut().insert(node_id, entity);
        drop(previous);
    }

    /// Build an entity with the given constructor
    pub fn construct(&self, ty: Option<Constructor>, spec: EntitySpec) -> Result<Entity, Error> {
        construct(self, ty, spec)
    }

    /// Build an entity with `spec.ty`, or a plain element when the spec names no constructor
    pub fn create(&self, spec: EntitySpec) -> Result<Entity, Error> {
        let ty = spec.ty.clone().unwrap_or_else(Constructor::element);
        construct(self, Some(ty), spec)
    }

    /// Parse markup into detached content nodes: elements come back wrapped, text as text
    /// nodes. Comments are dropped.
    pub fn parse_html(&self, markup: &str) -> Result<Vec<ContentNode>, Error> {
        let node_ids = {
            let mut doc = self.document_mut();
            let temp_id = doc.create_element("div");
            let parsed = doc.set_inner_html(temp_id, markup);
            let node_ids = doc.remove_all_children(temp_id);
            doc.remove_and_drop_node(temp_id);
            parsed?;
            node_ids
        };

        let mut content = Vec::with_capacity(node_ids.len());
        for node_id in node_ids {
            let kind = self.document().node_kind(node_id);
            match kind {
                Some(NodeKind::Element) => content.push(ContentNode::Entity(self.wrap(node_id)?)),
                Some(NodeKind::Text) => content.push(ContentNode::Text(node_id)),
                _ => {
                    self.document_mut().remove_and_drop_node(node_id);
                }
            }
        }
        Ok(content)
    }

    /// Resolve markup or a selector to a single entity.
    ///
    /// A string starting with `<` is markup and must describe exactly one element (use
    /// [`parse_html`](Self::parse_html) for anything else). Any other string is a selector.
    pub fn select(&self, source: &str) -> Result<Entity, Error> {
        if !source.starts_with('<') {
            return self.wrap(source);
        }

        let nodes = self.parse_html(source)?;
        if let [ContentNode::Entity(entity)] = nodes.as_slice() {
            return Ok(entity.clone());
        }
        for node in &nodes {
            self.reclaim(node.node_id());
        }
        Err(Error::AmbiguousMarkup(nodes.len()))
    }

    /// Create an element entity named `tag`.
    ///
    /// ```
    /// use jel::{Dom, EntitySpec};
    ///
    /// let dom = Dom::default();
    /// let link = dom
    ///     .build("a", ("Home", EntitySpec::new().attrib("href", "/")))
    ///     .unwrap();
    /// assert_eq!(link.outer_html().unwrap(), r#"<a href="/">Home</a>"#);
    /// ```
    pub fn build(&self, tag: &str, args: impl Into<TagArgs>) -> Result<Entity, Error> {
        let mut spec = match args.into() {
            TagArgs::Spec(spec) => spec,
            TagArgs::Content(content, mut spec) => {
                spec.content = if spec.content.is_null() {
                    content
                } else {
                    Value::List(vec![content, std::mem::take(&mut spec.content)])
                };
                spec
            }
        };
        spec.tag = Some(tag.to_string());
        construct(self, Some(Constructor::element()), spec)
    }

    /// Builder methods for common tags (`dom.tags().div(...)`)
    pub fn tags(&self) -> DomBuilder<'_> {
        DomBuilder::new(self)
    }

    pub fn dispatch_event(&self, event: DomEvent) -> DomEvent {
        jel_dom::dispatch_event(&self.0.document, event)
    }

    pub fn click(&self, node_id: usize, pointer: Option<PointerData>) -> DomEvent {
        jel_dom::click(&self.0.document, node_id, pointer)
    }

    pub fn focus(&self, node_id: usize) -> bool {
        jel_dom::focus(&self.0.document, node_id)
    }

    pub fn blur(&self, node_id: usize) -> bool {
        jel_dom::blur(&self.0.document, node_id)
    }

    /// Drop a node and its subtree from the document, evicting the entities bound to them.
    ///
    /// Detaching content (`remove`, `set_content`, ...) leaves nodes alive so they can be
    /// inserted again; this is how they are finally released. Returns the dropped node ids.
    pub fn reclaim(&self, node_id: usize) -> Vec<usize> {
        let dropped = self.document_mut().remove_and_drop_node(node_id);
        let evicted: Vec<Entity> = {
            let mut cache = self.0.cache.borrow_mut();
            dropped.iter().filter_map(|id| cache.remove(*id)).collect()
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Reclaimed {} node(s), evicted {} entities",
            dropped.len(),
            evicted.len()
        );

        for entity in evicted {
            entity.release();
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_is_idempotent() {
        let dom = Dom::default();
        let body_id = dom.document().body_id();
        let a = dom.wrap(body_id).unwrap();
        let b = dom.wrap("body").unwrap();
        assert_eq!(a, b);
        assert_eq!(dom.cache_len(), 1);
        assert_eq!(a.entity_type(), "element");
    }

    #[test]
    fn wrap_rejects_non_elements() {
        let dom = Dom::default();
        let text = dom.document_mut().create_text_node("x");
        assert!(matches!(dom.wrap(text), Err(Error::InvalidArgument(_))));
        assert!(matches!(dom.wrap(".missing"), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            WrapTarget::try_from(&Value::from(true)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn reclaim_evicts_entries() {
        let dom = Dom::default();
        let div = dom.build("div", EntitySpec::new()).unwrap();
        let node_id = div.dom_element();
        assert_eq!(dom.cached(node_id), Some(div.clone()));

        let dropped = dom.reclaim(node_id);
        assert_eq!(dropped, [node_id]);
        assert_eq!(dom.cached(node_id), None);
        assert!(dom.document().get_node(node_id).is_none());
    }

    #[test]
    fn entities_outliving_the_dom_report_it() {
        let dom = Dom::default();
        let div = dom.build("div", "x").unwrap();
        drop(dom);
        assert_eq!(div.text(), Err(Error::DocumentDropped));
    }
}
