//! The dynamic value type that flows through entity properties, content and specs.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::{ContentNode, Entity, EntitySpec, Error};

/// A callable value: a constructor-defined method or a bound element method.
#[derive(Clone)]
pub struct Function(Rc<dyn Fn(&[Value]) -> Result<Value, Error>>);

impl Function {
    pub fn new(f: impl Fn(&[Value]) -> Result<Value, Error> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        (self.0)(args)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Loosely typed values, with the truthiness and string conversion rules of a scripting
/// language: `null`, `false`, `0`, `NaN` and `""` are falsy, everything else is truthy.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    /// A plain record
    Map(IndexMap<String, Value>),
    /// A record carrying a constructor, usable as content
    Spec(Box<EntitySpec>),
    /// A native node of the host document
    Node(usize),
    Entity(Entity),
    Function(Function),
}

impl Value {
    pub fn map<K: Into<String>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Spec(_) => "spec",
            Value::Node(_) => "node",
            Value::Entity(_) => "entity",
            Value::Function(_) => "function",
        }
    }

    /// String conversion as used for attribute values and text content
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    item => item.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Map(_) | Value::Spec(_) | Value::Entity(_) => "[object Object]".to_string(),
            Value::Node(_) => "[object Node]".to_string(),
            Value::Function(_) => "function".to_string(),
        }
    }

    /// Numeric conversion: `null` is 0, booleans are 0 or 1, strings are parsed (blank is 0),
    /// everything else is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse().unwrap_or(f64::NAN)
                }
            }
            _ => f64::NAN,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<usize> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // Covers -0
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::list(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<EntitySpec> for Value {
    fn from(spec: EntitySpec) -> Self {
        Value::Spec(Box::new(spec))
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Entity(entity)
    }
}

impl From<&Entity> for Value {
    fn from(entity: &Entity) -> Self {
        Value::Entity(entity.clone())
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<ContentNode> for Value {
    fn from(node: ContentNode) -> Self {
        match node {
            ContentNode::Text(id) => Value::Node(id),
            ContentNode::Entity(entity) => Value::Entity(entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        for falsy in [
            Value::Null,
            Value::Bool(false),
            Value::Number(0.0),
            Value::Number(f64::NAN),
            Value::from(""),
        ] {
            assert!(!falsy.is_truthy(), "{falsy:?}");
        }
        for truthy in [
            Value::Bool(true),
            Value::Number(-1.0),
            Value::from("0"),
            Value::List(vec![]),
            Value::Map(IndexMap::new()),
            Value::Node(0),
        ] {
            assert!(truthy.is_truthy(), "{truthy:?}");
        }
    }

    #[test]
    fn string_conversion() {
        assert_eq!(Value::from(3).to_js_string(), "3");
        assert_eq!(Value::from(1.5).to_js_string(), "1.5");
        assert_eq!(Value::from(-0.0).to_js_string(), "0");
        assert_eq!(Value::Null.to_js_string(), "null");
        assert_eq!(Value::from(true).to_js_string(), "true");
        assert_eq!(
            Value::list([Value::from(1), Value::Null, Value::from("x")]).to_js_string(),
            "1,,x"
        );
        assert_eq!(Value::map([("a", 1)]).to_js_string(), "[object Object]");
    }

    #[test]
    fn number_conversion() {
        assert_eq!(Value::from(" 42 ").to_number(), 42.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert!(Value::from("4px").to_number().is_nan());
        assert_eq!(Value::from(true).to_number(), 1.0);
    }

    #[test]
    fn functions_compare_by_identity() {
        let f = Function::new(|_| Ok(Value::Null));
        let g = Function::new(|_| Ok(Value::Null));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }
}
