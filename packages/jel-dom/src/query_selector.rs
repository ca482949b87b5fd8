//! `querySelector`-style lookups, matched with the `selectors` crate.
//!
//! [`HtmlSelectors`] plugs the document into the `selectors` parser and matcher: type and
//! universal selectors, `#id`, `.class`, attribute selectors, the structural pseudo-classes
//! (`:first-child`, `:empty`, `:not(..)`, ...), combinators and comma-separated lists come from
//! the crate, and [`PseudoClass`] adds the form-state pseudo-classes.

use std::fmt;

use cssparser::{CowRcStr, ParseError, Parser, ParserInput, SourceLocation, ToCss};
use markup5ever::{LocalName, Namespace};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
    ElementSelectorFlags, MatchingContext, MatchingForInvalidation, MatchingMode,
    NeedsSelectorFlags, QuirksMode, SelectorCaches, matches_selector_list,
};
use selectors::parser::{ParseRelative, SelectorParseErrorKind};
use selectors::{Element, OpaqueElement};
use smallvec::SmallVec;

use crate::{Document, DomError, ElementData, ROOT_NODE_ID};

/// A parsed, comma-separated selector list
pub type SelectorList = selectors::SelectorList<HtmlSelectors>;

/// The [`selectors::SelectorImpl`] for HTML documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlSelectors;

impl selectors::SelectorImpl for HtmlSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssLocalName;
    type LocalName = CssLocalName;
    type NamespacePrefix = CssLocalName;
    type NamespaceUrl = Namespace;
    type BorrowedNamespaceUrl = Namespace;
    type BorrowedLocalName = CssLocalName;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

/// An attribute value as written in a selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssString(pub String);

impl<'a> From<&'a str> for CssString {
    fn from(value: &'a str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_string(&self.0, dest)
    }
}

/// An interned name: a tag, attribute, id or class name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl<'a> From<&'a str> for CssLocalName {
    fn from(value: &'a str) -> Self {
        Self(LocalName::from(value))
    }
}

impl ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

impl PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

/// The non tree-structural pseudo-classes that are supported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    Checked,
    Disabled,
    Enabled,
}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = HtmlSelectors;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }
}

impl ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(match self {
            PseudoClass::Checked => ":checked",
            PseudoClass::Disabled => ":disabled",
            PseudoClass::Enabled => ":enabled",
        })
    }
}

/// Pseudo-elements never match a node, so none are parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoElement {}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = HtmlSelectors;
}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

struct SelectorParser;

impl<'i> selectors::parser::Parser<'i> for SelectorParser {
    type Impl = HtmlSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<PseudoClass, ParseError<'i, Self::Error>> {
        match name.to_ascii_lowercase().as_str() {
            "checked" => Ok(PseudoClass::Checked),
            "disabled" => Ok(PseudoClass::Disabled),
            "enabled" => Ok(PseudoClass::Enabled),
            _ => Err(location
                .new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name))),
        }
    }
}

/// An element node as seen by the selector matcher
#[derive(Clone, Copy)]
struct ElementRef<'a> {
    doc: &'a Document,
    id: usize,
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementRef({})", self.id)
    }
}

impl<'a> ElementRef<'a> {
    fn new(doc: &'a Document, id: usize) -> Self {
        Self { doc, id }
    }

    fn data(&self) -> Option<&'a ElementData> {
        self.doc.get_node(self.id).and_then(|node| node.element_data())
    }

    fn with(&self, id: Option<usize>) -> Option<Self> {
        id.map(|id| Self::new(self.doc, id))
    }
}

impl Element for ElementRef<'_> {
    type Impl = HtmlSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(&self.doc.nodes[self.id])
    }

    fn parent_element(&self) -> Option<Self> {
        self.with(self.doc.parent_element(self.id))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.with(self.doc.previous_element_sibling(self.id))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.with(self.doc.next_element_sibling(self.id))
    }

    fn first_element_child(&self) -> Option<Self> {
        let first = self
            .doc
            .children(self.id)
            .iter()
            .copied()
            .find(|id| self.doc.is_element(*id));
        self.with(first)
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &CssLocalName) -> bool {
        self.data().is_some_and(|data| data.name.local == local_name.0)
    }

    fn has_namespace(&self, ns: &Namespace) -> bool {
        self.data().is_some_and(|data| data.name.ns == *ns)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        match (self.data(), other.data()) {
            (Some(a), Some(b)) => a.name.local == b.name.local && a.name.ns == b.name.ns,
            _ => false,
        }
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Namespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        let Some(data) = self.data() else {
            return false;
        };
        data.attrs.iter().any(|attr| {
            let ns_matches = match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == **ns,
            };
            ns_matches && attr.name.local == local_name.0 && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        let Some(data) = self.data() else {
            return false;
        };
        match pc {
            PseudoClass::Checked => {
                if &*data.name.local == "option" {
                    data.has_attr("selected")
                } else {
                    data.is_checkable() && self.doc.checked(self.id)
                }
            }
            PseudoClass::Disabled => data.is_disabled(),
            PseudoClass::Enabled => data.can_be_disabled() && !data.is_disabled(),
        }
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.data()
            .and_then(|data| data.attr("id"))
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.data().is_some_and(|data| {
            data.class_list()
                .any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
        })
    }

    fn has_custom_state(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.doc.children(self.id).iter().all(|id| {
            let node = &self.doc.nodes[*id];
            !node.is_element() && node.text_data().is_none_or(|t| t.content.is_empty())
        })
    }

    fn is_root(&self) -> bool {
        self.doc.parent(self.id) == Some(ROOT_NODE_ID)
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}

impl Document {
    pub fn try_parse_selector_list(&self, input: &str) -> Result<SelectorList, DomError> {
        let mut input_buffer = ParserInput::new(input);
        let mut parser = Parser::new(&mut input_buffer);
        parser
            .parse_entirely(|parser| {
                SelectorList::parse(&SelectorParser, parser, ParseRelative::No)
            })
            .map_err(|_| DomError::InvalidSelector(input.to_string()))
    }

    /// Find the first descendant of `scope_id` (in tree order) that matches the selector
    /// Returns:
    ///   - Err(_) if parsing the selector fails
    ///   - Ok(None) if nothing matches
    ///   - Ok(Some(node_id)) with the first node ID that matches if one is found
    pub fn query_selector(&self, scope_id: usize, selector: &str) -> Result<Option<usize>, DomError> {
        let selector_list = self.try_parse_selector_list(selector)?;
        Ok(self.query_selector_raw(scope_id, &selector_list))
    }

    pub fn query_selector_raw(&self, scope_id: usize, selector_list: &SelectorList) -> Option<usize> {
        self.descendants(scope_id)
            .into_iter()
            .find(|id| self.matches_raw(*id, selector_list))
    }

    /// Find all descendants of `scope_id` that match the selector, in tree order
    pub fn query_selector_all(
        &self,
        scope_id: usize,
        selector: &str,
    ) -> Result<SmallVec<[usize; 32]>, DomError> {
        let selector_list = self.try_parse_selector_list(selector)?;
        Ok(self.query_selector_all_raw(scope_id, &selector_list))
    }

    pub fn query_selector_all_raw(
        &self,
        scope_id: usize,
        selector_list: &SelectorList,
    ) -> SmallVec<[usize; 32]> {
        self.descendants(scope_id)
            .into_iter()
            .filter(|id| self.matches_raw(*id, selector_list))
            .collect()
    }

    /// Whether the element matches the selector
    pub fn matches(&self, node_id: usize, selector: &str) -> Result<bool, DomError> {
        let selector_list = self.try_parse_selector_list(selector)?;
        Ok(self.matches_raw(node_id, &selector_list))
    }

    /// The element itself or its nearest ancestor that matches the selector
    pub fn closest(&self, node_id: usize, selector: &str) -> Result<Option<usize>, DomError> {
        let selector_list = self.try_parse_selector_list(selector)?;
        Ok(self
            .node_chain(node_id)
            .into_iter()
            .find(|id| self.matches_raw(*id, &selector_list)))
    }

    pub fn matches_raw(&self, node_id: usize, selector_list: &SelectorList) -> bool {
        if !self.is_element(node_id) {
            return false;
        }
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        matches_selector_list(selector_list, &ElementRef::new(self, node_id), &mut context)
    }

    pub fn previous_element_sibling(&self, node_id: usize) -> Option<usize> {
        let mut sibling = self.previous_sibling(node_id);
        while let Some(id) = sibling {
            if self.is_element(id) {
                return Some(id);
            }
            sibling = self.previous_sibling(id);
        }
        None
    }

    pub fn next_element_sibling(&self, node_id: usize) -> Option<usize> {
        let mut sibling = self.next_sibling(node_id);
        while let Some(id) = sibling {
            if self.is_element(id) {
                return Some(id);
            }
            sibling = self.next_sibling(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_name;

    /// body > div#list.menu > (li.item.first, li.item[data-kind=fruit-red] > span, li)
    fn fixture() -> (Document, [usize; 5]) {
        let mut doc = Document::default();
        let list = doc.create_element("div");
        let first = doc.create_element("li");
        let second = doc.create_element("li");
        let third = doc.create_element("li");
        let span = doc.create_element("span");
        {
            let mut mutator = doc.mutate();
            mutator.set_attribute(list, attr_name("id"), "list").unwrap();
            mutator.set_attribute(list, attr_name("class"), "menu").unwrap();
            mutator
                .set_attribute(first, attr_name("class"), "item first")
                .unwrap();
            mutator.set_attribute(second, attr_name("class"), "item").unwrap();
            mutator
                .set_attribute(second, attr_name("data-kind"), "fruit-red")
                .unwrap();
        }
        let body = doc.body_id();
        doc.append_child(body, list).unwrap();
        for child in [first, second, third] {
            doc.append_child(list, child).unwrap();
        }
        doc.append_child(second, span).unwrap();
        (doc, [list, first, second, third, span])
    }

    #[test]
    fn simple_selectors() {
        let (doc, [list, first, second, third, span]) = fixture();
        let root = ROOT_NODE_ID;
        assert_eq!(doc.query_selector(root, "#list").unwrap(), Some(list));
        assert_eq!(
            doc.query_selector_all(root, "li").unwrap().as_slice(),
            &[first, second, third]
        );
        assert_eq!(
            doc.query_selector_all(root, ".item").unwrap().as_slice(),
            &[first, second]
        );
        assert_eq!(doc.query_selector(root, "li.item.first").unwrap(), Some(first));
        assert_eq!(doc.query_selector(root, "SPAN").unwrap(), Some(span));
        assert_eq!(doc.query_selector(root, "p").unwrap(), None);
    }

    #[test]
    fn attribute_selectors() {
        let (doc, [_, first, second, ..]) = fixture();
        let root = ROOT_NODE_ID;
        assert_eq!(doc.query_selector(root, "[data-kind]").unwrap(), Some(second));
        assert_eq!(
            doc.query_selector(root, "[data-kind|=fruit]").unwrap(),
            Some(second)
        );
        assert_eq!(doc.query_selector(root, "[data-kind$='red']").unwrap(), Some(second));
        assert_eq!(doc.query_selector(root, "[class~=first]").unwrap(), Some(first));
        assert_eq!(doc.query_selector(root, "[class^=fir]").unwrap(), None);
    }

    #[test]
    fn combinators() {
        let (doc, [list, _, second, third, span]) = fixture();
        let root = ROOT_NODE_ID;
        assert_eq!(doc.query_selector(root, "body span").unwrap(), Some(span));
        assert_eq!(doc.query_selector(root, "div > span").unwrap(), None);
        assert_eq!(doc.query_selector(root, "li>span").unwrap(), Some(span));
        assert_eq!(doc.query_selector(root, ".first + li").unwrap(), Some(second));
        assert_eq!(
            doc.query_selector_all(root, ".first ~ li").unwrap().as_slice(),
            &[second, third]
        );
        assert_eq!(
            doc.query_selector_all(root, "#list, span").unwrap().as_slice(),
            &[list, span]
        );
    }

    #[test]
    fn pseudo_classes() {
        let (doc, [_, first, _, third, span]) = fixture();
        let root = ROOT_NODE_ID;
        assert_eq!(doc.query_selector(root, "li:first-child").unwrap(), Some(first));
        assert_eq!(doc.query_selector(root, "li:last-child").unwrap(), Some(third));
        assert_eq!(doc.query_selector(root, "li:empty").unwrap(), Some(first));
        assert_eq!(
            doc.query_selector_all(root, "li:not(.item)").unwrap().as_slice(),
            &[third]
        );
        assert_eq!(doc.query_selector(root, "span:only-child").unwrap(), Some(span));
    }

    #[test]
    fn form_state_pseudo_classes() {
        let mut doc = Document::default();
        let form = doc.create_element("form");
        let on = doc.create_element("input");
        let off = doc.create_element("input");
        let button = doc.create_element("button");
        {
            let mut mutator = doc.mutate();
            for input in [on, off] {
                mutator.set_attribute(input, attr_name("type"), "checkbox").unwrap();
            }
            mutator.set_attribute(button, attr_name("disabled"), "").unwrap();
        }
        let body = doc.body_id();
        doc.append_child(body, form).unwrap();
        for child in [on, off, button] {
            doc.append_child(form, child).unwrap();
        }
        doc.set_checked(on, true).unwrap();

        let root = ROOT_NODE_ID;
        assert_eq!(doc.query_selector(root, ":checked").unwrap(), Some(on));
        assert_eq!(doc.query_selector(root, "input:not(:checked)").unwrap(), Some(off));
        assert_eq!(doc.query_selector(root, ":disabled").unwrap(), Some(button));
        assert_eq!(
            doc.query_selector_all(root, "form > :enabled").unwrap().as_slice(),
            &[on, off]
        );
        assert_eq!(doc.query_selector(root, "html:root").unwrap(), doc.parent(body));
    }

    #[test]
    fn scoped_to_descendants() {
        let (doc, [list, _, second, _, span]) = fixture();
        assert_eq!(doc.query_selector(second, "div span").unwrap(), Some(span));
        assert_eq!(doc.query_selector(second, "div").unwrap(), None);
        assert_eq!(doc.closest(span, ".menu").unwrap(), Some(list));
        assert!(doc.matches(span, "li span").unwrap());
    }

    #[test]
    fn malformed_selectors_are_errors() {
        let doc = Document::default();
        for selector in ["", "div >", ".", "#", "a:hover-ish", "a:hover", "a,,b", "[a=b c]", "p::before"] {
            assert_eq!(
                doc.query_selector(ROOT_NODE_ID, selector),
                Err(DomError::InvalidSelector(selector.to_string())),
                "{selector:?}"
            );
        }
    }
}
