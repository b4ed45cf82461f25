//! Elements
//!
//! An [`Element`] is an immutable description of a node the engine should
//! keep mounted: *what kind* of node, *which props* to give it, and an
//! optional *key* distinguishing it from siblings of the same kind.
//!
//! # Kinds and props
//!
//! The kind set is closed. Built-in kinds each take a dedicated [`Props`]
//! payload; user components take a [`Value`] (a map, or null). Pairing a kind
//! with the wrong payload is a configuration error caught when the element is
//! built, so the engine never has to sniff at runtime what a payload is.
//!
//! # Renderables
//!
//! Render functions and combinator child slots accept a [`Renderable`]: a
//! plain value, an element, or a store. The variant decides the
//! classification; nothing is inferred from the shape of a value. Plain
//! values that must occupy a slot become `constant` elements, stores become
//! `subscribe` elements.

mod reconcile;

pub use reconcile::{can_reuse, reconcile, Decision};

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::component::Component;
use crate::error::{Error, Result};
use crate::reactive::Store;
use crate::value::Value;

/// Projection used by `map`.
pub type Projection = Rc<dyn Fn(&Value) -> Value>;

/// Projection used by `flat_map`; yields the next inner source.
pub type FlatProjection = Rc<dyn Fn(&Value) -> Renderable>;

/// Equality used by `distinct`.
pub type Equality = Rc<dyn Fn(&Value, &Value) -> bool>;

/// Identity key disambiguating siblings of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(Rc<str>);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.into())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s.into())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key(i.to_string().into())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of node an element describes.
#[derive(Clone)]
pub enum Kind {
    Constant,
    Map,
    FlatMap,
    Combine,
    Distinct,
    Subscribe,
    Component(Rc<Component>),
}

impl Kind {
    /// Display name, used in logs and error messages.
    pub fn name(&self) -> &str {
        match self {
            Kind::Constant => "constant",
            Kind::Map => "map",
            Kind::FlatMap => "flatMap",
            Kind::Combine => "combine",
            Kind::Distinct => "distinct",
            Kind::Subscribe => "subscribe",
            Kind::Component(def) => def.name(),
        }
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Kind::Component(a), Kind::Component(b)) => Rc::ptr_eq(a, b),
            (Kind::Component(_), _) | (_, Kind::Component(_)) => false,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind({})", self.name())
    }
}

/// Props payload of an element.
#[derive(Clone)]
pub enum Props {
    /// `constant` (the fixed value) and user components (their props map).
    Value(Value),
    Map {
        from: Box<Renderable>,
        to: Projection,
    },
    FlatMap {
        from: Box<Renderable>,
        to: FlatProjection,
    },
    Combine(IndexMap<String, Renderable>),
    Distinct {
        from: Box<Renderable>,
        by: Option<Equality>,
    },
    Subscribe(Store),
}

impl Props {
    /// Whether this payload is the one `kind` consumes.
    pub fn fits(&self, kind: &Kind) -> bool {
        matches!(
            (kind, self),
            (Kind::Constant | Kind::Component(_), Props::Value(_))
                | (Kind::Map, Props::Map { .. })
                | (Kind::FlatMap, Props::FlatMap { .. })
                | (Kind::Combine, Props::Combine(_))
                | (Kind::Distinct, Props::Distinct { .. })
                | (Kind::Subscribe, Props::Subscribe(_))
        )
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Props::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Props {
    fn from(value: Value) -> Self {
        Props::Value(value)
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Props::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Props::Map { from, .. } => f.debug_struct("Map").field("from", from).finish_non_exhaustive(),
            Props::FlatMap { from, .. } => f.debug_struct("FlatMap").field("from", from).finish_non_exhaustive(),
            Props::Combine(children) => f.debug_map().entries(children.iter()).finish(),
            Props::Distinct { from, by } => f
                .debug_struct("Distinct")
                .field("from", from)
                .field("custom_equality", &by.is_some())
                .finish(),
            Props::Subscribe(store) => f.debug_tuple("Subscribe").field(store).finish(),
        }
    }
}

/// Anything that can occupy a child slot or be returned from a render.
#[derive(Clone)]
pub enum Renderable {
    Value(Value),
    Element(Element),
    Store(Store),
}

impl Renderable {
    /// The element this renderable mounts as.
    pub fn into_element(self) -> Element {
        match self {
            Renderable::Value(v) => Element::constant(v),
            Renderable::Element(e) => e,
            Renderable::Store(s) => Element::subscribe(s),
        }
    }
}

impl From<Value> for Renderable {
    fn from(value: Value) -> Self {
        Renderable::Value(value)
    }
}

impl From<Element> for Renderable {
    fn from(element: Element) -> Self {
        Renderable::Element(element)
    }
}

impl From<Store> for Renderable {
    fn from(store: Store) -> Self {
        Renderable::Store(store)
    }
}

impl From<crate::reactive::Signal> for Renderable {
    fn from(signal: crate::reactive::Signal) -> Self {
        Renderable::Store(signal.store())
    }
}

impl fmt::Debug for Renderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderable::Value(v) => v.fmt(f),
            Renderable::Element(e) => e.fmt(f),
            Renderable::Store(s) => s.fmt(f),
        }
    }
}

/// Immutable description of a desired node.
#[derive(Clone)]
pub struct Element {
    kind: Kind,
    props: Props,
    key: Option<Key>,
}

impl Element {
    /// Pair a kind with a props payload.
    ///
    /// Fails with a configuration error if the payload does not fit the
    /// kind, or if a component is given props that are neither a map nor
    /// null.
    pub fn new(kind: Kind, props: Props) -> Result<Self> {
        if !props.fits(&kind) {
            return Err(Error::configuration(format!(
                "`{}` element cannot take props {props:?}",
                kind.name()
            )));
        }
        let props = match (&kind, props) {
            (Kind::Component(def), Props::Value(value)) => {
                Props::Value(def.resolve_props(value)?)
            }
            (_, props) => props,
        };
        Ok(Self {
            kind,
            props,
            key: None,
        })
    }

    /// A user component element.
    pub fn component(def: &Rc<Component>, props: impl Into<Value>) -> Result<Self> {
        Self::new(Kind::Component(def.clone()), Props::Value(props.into()))
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Self::builtin(Kind::Constant, Props::Value(value.into()))
    }

    pub fn map<F>(from: impl Into<Renderable>, to: F) -> Self
    where
        F: Fn(&Value) -> Value + 'static,
    {
        Self::builtin(
            Kind::Map,
            Props::Map {
                from: Box::new(from.into()),
                to: Rc::new(to),
            },
        )
    }

    pub fn flat_map<F>(from: impl Into<Renderable>, to: F) -> Self
    where
        F: Fn(&Value) -> Renderable + 'static,
    {
        Self::builtin(
            Kind::FlatMap,
            Props::FlatMap {
                from: Box::new(from.into()),
                to: Rc::new(to),
            },
        )
    }

    pub fn combine<K, R>(children: impl IntoIterator<Item = (K, R)>) -> Self
    where
        K: Into<String>,
        R: Into<Renderable>,
    {
        Self::builtin(
            Kind::Combine,
            Props::Combine(
                children
                    .into_iter()
                    .map(|(k, r)| (k.into(), r.into()))
                    .collect(),
            ),
        )
    }

    /// Suppress repeated values using identity equality ([`Value::same`]).
    pub fn distinct(from: impl Into<Renderable>) -> Self {
        Self::builtin(
            Kind::Distinct,
            Props::Distinct {
                from: Box::new(from.into()),
                by: None,
            },
        )
    }

    /// Suppress repeated values using a custom equality.
    pub fn distinct_by<F>(from: impl Into<Renderable>, by: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + 'static,
    {
        Self::builtin(
            Kind::Distinct,
            Props::Distinct {
                from: Box::new(from.into()),
                by: Some(Rc::new(by)),
            },
        )
    }

    pub fn subscribe(store: impl Into<Store>) -> Self {
        Self::builtin(Kind::Subscribe, Props::Subscribe(store.into()))
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn builtin(kind: Kind, props: Props) -> Self {
        debug_assert!(props.fits(&kind));
        Self {
            kind,
            props,
            key: None,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind.name())
            .field("key", &self.key)
            .field("props", &self.props)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mismatched_props_are_rejected() {
        let err = Element::new(Kind::Combine, Props::Value(Value::Int(1))).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn component_props_must_be_a_map() {
        let def = Rc::new(Component::new("Plain", |_| Ok(Value::Null.into())));
        assert!(Element::component(&def, Value::Int(3)).is_err());
        assert!(Element::component(&def, Value::Null).is_ok());
        assert!(Element::component(&def, Value::from(json!({ "a": 1 }))).is_ok());
    }

    #[test]
    fn default_props_sit_under_given_props() {
        let def = Rc::new(
            Component::new("Defaults", |_| Ok(Value::Null.into()))
                .default_props(Value::from(json!({ "size": 1, "color": "red" }))),
        );
        let element = Element::component(&def, Value::from(json!({ "size": 2 }))).unwrap();
        assert_eq!(
            element.props().as_value().cloned(),
            Some(Value::from(json!({ "size": 2, "color": "red" })))
        );
    }

    #[test]
    fn renderables_classify_by_variant() {
        let plain = Renderable::from(Value::from(json!({ "looks": "like a combine" })));
        assert_eq!(plain.into_element().kind(), &Kind::Constant);

        let signal = crate::reactive::Signal::new(1);
        assert_eq!(Renderable::from(signal).into_element().kind(), &Kind::Subscribe);
    }

    #[test]
    fn component_kinds_compare_by_definition() {
        let a = Rc::new(Component::new("Same", |_| Ok(Value::Null.into())));
        let b = Rc::new(Component::new("Same", |_| Ok(Value::Null.into())));
        assert_eq!(Kind::Component(a.clone()), Kind::Component(a));
        assert_ne!(Kind::Component(b), Kind::Map);
        assert_eq!(Kind::Map, Kind::Map);
        assert_ne!(Kind::Map, Kind::FlatMap);
    }
}
