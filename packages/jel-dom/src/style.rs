//! Inline style declarations (the contents of an element's `style` attribute).
//!
//! There is no cascade here: the document only remembers what was declared inline, in
//! declaration order, so it can be read back and serialised.

use cssparser::{Delimiter, ParseError, Parser, ParserInput};

/// An ordered list of `property: value` declarations. Property names are stored in their
/// CSS (kebab-case) form; custom properties keep their exact spelling.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse CSS declaration text. Malformed declarations are skipped, like a browser does.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut style = InlineStyle::default();

        while !parser.is_exhausted() {
            let declaration = parser.parse_until_after(Delimiter::Semicolon, |p| {
                let name = p.expect_ident_cloned()?.to_string();
                p.expect_colon()?;
                let start = p.position();
                while p.next().is_ok() {}
                let value = p.slice_from(start).trim().to_string();
                Ok::<_, ParseError<'_, ()>>((name, value))
            });
            match declaration {
                Ok((name, value)) if !value.is_empty() => style.set(&name, &value),
                Ok(_) => {}
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Skipping malformed style declaration in {css:?}");
                }
            }
        }

        style
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = normalize_property_name(name);
        self.declarations
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a declaration. An empty value removes it, which matches `style.foo = ""`.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = normalize_property_name(name);
        let value = value.trim();
        if value.is_empty() {
            self.remove(&name);
            return;
        }
        match self.declarations.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => self.declarations.push((name, value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = normalize_property_name(name);
        let idx = self.declarations.iter().position(|(n, _)| *n == name)?;
        Some(self.declarations.remove(idx).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(|(n, _)| n.as_str())
    }

    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Convert a script-style property name (`backgroundColor`) to its CSS form
/// (`background-color`). Custom properties (`--foo`) and names that are already in CSS form
/// are returned unchanged.
pub fn normalize_property_name(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    // `cssFloat` is the scripting name for `float`
    if out == "css-float" {
        return "float".to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declarations_in_order() {
        let style = InlineStyle::parse("color: red; background-image: url('a;b.png'); width:10px");
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("backgroundImage"), Some("url('a;b.png')"));
        assert_eq!(style.names().collect::<Vec<_>>(), ["color", "background-image", "width"]);
    }

    #[test]
    fn skips_malformed_declarations() {
        let style = InlineStyle::parse("color red; : nothing; margin: 0");
        assert_eq!(style.names().collect::<Vec<_>>(), ["margin"]);
    }

    #[test]
    fn custom_properties_keep_their_spelling() {
        let mut style = InlineStyle::default();
        style.set("--accentColor", "blue");
        assert_eq!(style.get("--accentColor"), Some("blue"));
        assert_eq!(style.to_css_text(), "--accentColor: blue;");
    }

    #[test]
    fn empty_value_removes() {
        let mut style = InlineStyle::parse("color: red");
        style.set("color", "");
        assert!(style.is_empty());
    }
}
