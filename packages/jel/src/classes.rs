//! Class names: flattening class specs, and the live class list of an element.

use jel_dom::attr_name;

use crate::{Error, Value, WeakDom};

/// Flatten a class spec into class names.
///
/// A string contributes its whitespace-separated tokens, a list contributes each item
/// recursively, and a map contributes its keys whose values are truthy. Falsy values contribute
/// nothing. Order is kept, duplicates are not removed.
///
/// ```
/// use jel::{Value, flatten_classes};
///
/// let spec = Value::list([
///     Value::from("a"),
///     Value::map([("b", true), ("c", false)]),
///     Value::from("d e"),
/// ]);
/// assert_eq!(flatten_classes(&spec).unwrap(), ["a", "b", "d", "e"]);
/// ```
pub fn flatten_classes(source: &Value) -> Result<Vec<String>, Error> {
    let mut classes = Vec::new();
    add_classes(source, &mut classes)?;
    Ok(classes)
}

fn add_classes(source: &Value, classes: &mut Vec<String>) -> Result<(), Error> {
    if !source.is_truthy() {
        return Ok(());
    }
    match source {
        Value::String(s) => classes.extend(s.split_whitespace().map(str::to_string)),
        Value::List(items) => {
            for item in items {
                add_classes(item, classes)?;
            }
        }
        Value::Map(map) => {
            for (key, _) in map.iter().filter(|(_, enabled)| enabled.is_truthy()) {
                classes.extend(key.split_whitespace().map(str::to_string));
            }
        }
        other => return Err(Error::InvalidClassSpec(other.type_name())),
    }
    Ok(())
}

/// A live view of an element's `class` attribute
#[derive(Clone, Debug)]
pub struct ClassList {
    dom: WeakDom,
    node_id: usize,
}

impl ClassList {
    pub(crate) fn new(dom: WeakDom, node_id: usize) -> Self {
        Self { dom, node_id }
    }

    /// The class names, without duplicates, in order of first appearance
    pub fn tokens(&self) -> Result<Vec<String>, Error> {
        let dom = self.dom.upgrade()?;
        let doc = dom.document();
        let mut tokens: Vec<String> = Vec::new();
        for token in doc.element_data(self.node_id)?.class_list() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }
        Ok(tokens)
    }

    pub fn contains(&self, token: &str) -> Result<bool, Error> {
        let dom = self.dom.upgrade()?;
        let doc = dom.document();
        Ok(doc.element_data(self.node_id)?.has_class(token))
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.tokens()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.tokens()?.is_empty())
    }

    pub fn add(&self, token: &str) -> Result<(), Error> {
        check_token(token)?;
        let mut tokens = self.tokens()?;
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
        self.write(&tokens)
    }

    pub fn remove(&self, token: &str) -> Result<(), Error> {
        check_token(token)?;
        let mut tokens = self.tokens()?;
        tokens.retain(|t| t != token);
        self.write(&tokens)
    }

    /// Add the token if it is absent, remove it if present. `force` makes this a one-way add
    /// (`Some(true)`) or remove (`Some(false)`). Returns whether the token is now present.
    pub fn toggle(&self, token: &str, force: Option<bool>) -> Result<bool, Error> {
        let present = self.contains(token)?;
        let wanted = force.unwrap_or(!present);
        if wanted {
            self.add(token)?;
        } else {
            self.remove(token)?;
        }
        Ok(wanted)
    }

    /// Replace `old` with `new` in place. Returns false (and changes nothing) if `old` is absent.
    pub fn replace(&self, old: &str, new: &str) -> Result<bool, Error> {
        check_token(old)?;
        check_token(new)?;
        let tokens = self.tokens()?;
        let Some(idx) = tokens.iter().position(|t| t == old) else {
            return Ok(false);
        };
        let mut replaced: Vec<String> = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.into_iter().enumerate() {
            let token = if i == idx { new.to_string() } else { token };
            if !replaced.contains(&token) {
                replaced.push(token);
            }
        }
        self.write(&replaced)?;
        Ok(true)
    }

    fn write(&self, tokens: &[String]) -> Result<(), Error> {
        let dom = self.dom.upgrade()?;
        let mut doc = dom.document_mut();
        doc.mutate()
            .set_attribute(self.node_id, attr_name("class"), &tokens.join(" "))?;
        Ok(())
    }
}

fn check_token(token: &str) -> Result<(), Error> {
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(Error::InvalidArgument(format!(
            "class token {token:?} is empty or contains whitespace"
        )));
    }
    Ok(())
}
