use bitflags::bitflags;
use markup5ever::{LocalName, QualName, local_name};

use super::{Attribute, Attributes};
use crate::style::InlineStyle;

macro_rules! local_names {
    ($($name:tt),+) => {
        [$(local_name!($name),)+]
    };
}

bitflags! {
    /// Per-element state that is not reflected in an attribute.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ElementState: u8 {
        /// Checkedness of checkbox/radio inputs
        const CHECKED = 0b0000_0001;
        /// Whether the checkedness was changed since creation (stops the `checked` attribute
        /// from driving it)
        const DIRTY_CHECKEDNESS = 0b0000_0010;
        /// Media elements start out paused
        const PAUSED = 0b0000_0100;
    }
}

#[derive(Debug, Clone)]
pub struct ElementData {
    /// The elements tag name, namespace and prefix
    pub name: QualName,

    /// The element's attributes
    pub attrs: Attributes,

    /// The element's parsed `style` attribute
    pub(crate) inline_style: InlineStyle,

    pub state: ElementState,

    /// The "dirty" value of form controls. `None` means the value attribute is used.
    pub(crate) value: Option<String>,

    /// The context type handed out by `getContext` (\<canvas\> elements only)
    pub(crate) canvas_context: Option<String>,
}

impl ElementData {
    pub fn new(name: QualName, attrs: Vec<Attribute>) -> Self {
        let mut data = ElementData {
            name,
            attrs: Attributes::new(attrs),
            inline_style: InlineStyle::default(),
            state: ElementState::empty(),
            value: None,
            canvas_context: None,
        };
        data.flush_style_attribute();
        if data.has_attr("checked") {
            data.state.insert(ElementState::CHECKED);
        }
        if data.is_media() {
            data.state.insert(ElementState::PAUSED);
        }
        data
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    /// Detects the presence of the attribute, treating *any* value as truthy.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.get(name).is_some()
    }

    pub fn local_name(&self) -> &LocalName {
        &self.name.local
    }

    pub fn can_be_disabled(&self) -> bool {
        local_names!("button", "fieldset", "input", "select", "textarea").contains(&self.name.local)
    }

    pub fn is_disabled(&self) -> bool {
        self.can_be_disabled() && self.has_attr("disabled")
    }

    pub fn is_media(&self) -> bool {
        local_names!("audio", "video").contains(&self.name.local)
    }

    pub fn is_checkable(&self) -> bool {
        self.name.local == local_name!("input")
            && matches!(self.attr("type"), Some(t) if t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio"))
    }

    /// Elements that are focusable (and take part in sequential navigation) without a tabindex
    pub fn is_focusable_by_default(&self) -> bool {
        match self.name.local.as_ref() {
            "a" => self.has_attr("href"),
            "button" | "input" | "select" | "textarea" => true,
            _ => false,
        }
    }

    pub fn is_void(&self) -> bool {
        local_names!(
            "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
            "track", "wbr"
        )
        .contains(&self.name.local)
    }

    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.class_list().any(|class| class == token)
    }

    pub fn inline_style(&self) -> &InlineStyle {
        &self.inline_style
    }

    /// Re-parse the `style` attribute into the inline style declarations
    pub(crate) fn flush_style_attribute(&mut self) {
        self.inline_style = match self.attrs.get("style") {
            Some(css) => InlineStyle::parse(css),
            None => InlineStyle::default(),
        };
    }

    /// Serialise the inline style declarations back into the `style` attribute
    pub(crate) fn flush_inline_style(&mut self) {
        if self.inline_style.is_empty() {
            self.attrs.remove("style");
        } else {
            let css = self.inline_style.to_css_text();
            self.attrs.set(super::attr_name("style"), &css);
        }
    }
}
