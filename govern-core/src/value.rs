//! Dynamic Values
//!
//! Props, component state, and node outputs are all [`Value`]s. The model is
//! deliberately close to JSON, with one addition: [`Action`], a callable that
//! stores expose in their output so outside code can drive them.
//!
//! # Identity
//!
//! Compound variants (`Str`, `List`, `Map`) and actions are reference
//! counted. Cloning a value is cheap, and two clones of the same map are
//! *identical* (see [`Value::same`]) while two separately built maps with the
//! same entries are only *equal*.

use std::fmt;
use std::ops::Index;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::Result;

/// Insertion-ordered string-keyed map used by [`Value::Map`].
pub type Map = IndexMap<String, Value>;

const NULL: &Value = &Value::Null;

/// A dynamically typed value flowing through the store graph.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Map(Rc<Map>),
    Action(Action),
}

impl Value {
    /// Build a map value from `(key, value)` pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(Rc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Build a list value.
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::List(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Value::Action(a) => Some(a),
            _ => None,
        }
    }

    /// Look up a map entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Invoke this value as an action.
    ///
    /// Fails with a lifecycle error if the value is not an action.
    pub fn call(&self) -> Result<()> {
        match self {
            Value::Action(action) => action.call(),
            other => Err(crate::Error::lifecycle(format!(
                "value is not callable: {other:?}"
            ))),
        }
    }

    /// Shallow merge of `patch` into `self`.
    ///
    /// Two maps merge key by key with `patch` winning. A null patch leaves
    /// `self` untouched. Anything else replaces `self`.
    pub fn merge(&self, patch: &Value) -> Value {
        match (self, patch) {
            (_, Value::Null) => self.clone(),
            (Value::Map(base), Value::Map(patch)) => {
                let mut merged = (**base).clone();
                for (k, v) in patch.iter() {
                    merged.insert(k.clone(), v.clone());
                }
                Value::Map(Rc::new(merged))
            }
            _ => patch.clone(),
        }
    }

    /// Identity comparison.
    ///
    /// Scalars and strings compare by value; lists, maps and actions compare
    /// by reference.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Action(a), Value::Action(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Action(a), Value::Action(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(l) => f.debug_list().entries(l.iter()).finish(),
            Value::Map(m) => f.debug_map().entries(m.iter()).finish(),
            Value::Action(_) => f.write_str("<action>"),
        }
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(NULL)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.as_list().and_then(|l| l.get(index)).unwrap_or(NULL)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Action(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.into()),
            serde_json::Value::Array(items) => Value::list(items),
            serde_json::Value::Object(entries) => Value::map(entries),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<Action> for Value {
    fn from(action: Action) -> Self {
        Value::Action(action)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(Rc::new(map))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// A callable embedded in a value.
///
/// Actions compare by reference: two actions are equal only if they are
/// clones of one another.
#[derive(Clone)]
pub struct Action(Rc<dyn Fn() -> Result<()>>);

impl Action {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Result<()> + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self) -> Result<()> {
        (self.0)()
    }

    pub fn ptr_eq(&self, other: &Action) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action")
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn converts_from_json() {
        let value = Value::from(json!({ "a": 1, "b": [true, "x"], "c": 1.5 }));
        assert_eq!(value["a"], Value::Int(1));
        assert_eq!(value["b"][0], Value::Bool(true));
        assert_eq!(value["b"][1].as_str(), Some("x"));
        assert_eq!(value["c"].as_f64(), Some(1.5));
        assert!(value["missing"].is_null());
    }

    #[test]
    fn merge_is_shallow() {
        let state = Value::from(json!({ "a": 1, "nested": { "x": 1 } }));
        let merged = state.merge(&Value::from(json!({ "b": 2, "nested": { "y": 2 } })));
        assert_eq!(merged, Value::from(json!({ "a": 1, "nested": { "y": 2 }, "b": 2 })));
        assert_eq!(state.merge(&Value::Null), state);
        assert_eq!(state.merge(&Value::Int(3)), Value::Int(3));
    }

    #[test]
    fn identity_differs_from_equality() {
        let a = Value::from(json!({ "a": 1 }));
        let b = Value::from(json!({ "a": 1 }));
        assert_eq!(a, b);
        assert!(!a.same(&b));
        assert!(a.same(&a.clone()));
        assert!(Value::from("x").same(&Value::from("x")));
    }

    #[test]
    fn actions_are_callable_and_compare_by_reference() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let action = Action::new(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });
        let value = Value::map([("go", Value::from(action.clone()))]);

        value["go"].call().unwrap();
        value["go"].call().unwrap();
        assert_eq!(hits.get(), 2);

        assert_eq!(Value::from(action.clone()), Value::from(action));
        assert!(Value::Int(1).call().is_err());
    }

    #[test]
    fn serializes_actions_as_null() {
        let value = Value::map([
            ("n", Value::Int(2)),
            ("f", Value::from(Action::new(|| Ok(())))),
        ]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"n":2,"f":null}"#);
    }
}
