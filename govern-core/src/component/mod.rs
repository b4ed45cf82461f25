//! User Components
//!
//! A [`Component`] is an immutable record of capabilities: a render
//! function plus optional lifecycle hooks. Definitions are shared behind an
//! `Rc` and compared by pointer, so two elements are "the same component"
//! only if they were built from the same `Rc<Component>`.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use govern_core::{Component, Element, Governor, Renderable, Value};
//!
//! let greeting = Rc::new(Component::new("Greeting", |cx| {
//!     let name = cx.props()["name"].as_str().unwrap_or("world").to_string();
//!     Ok(Renderable::from(Value::from(format!("hello {name}"))))
//! }));
//!
//! let props = Value::map([("name", Value::from("there"))]);
//! let governor = Governor::new(Element::component(&greeting, props).unwrap()).unwrap();
//! assert_eq!(governor.get_value().unwrap(), Value::from("hello there"));
//! ```
//!
//! # Hooks
//!
//! | Hook | When |
//! |------|------|
//! | `initial_state` | Once, before the first render |
//! | `will_receive_props` | New props arrived (not on mount) |
//! | `derive_state` | Every update, after state patches merge |
//! | `should_update` | Every update after mount; `false` skips the render |
//! | `did_mount` | After the first commit |
//! | `did_update` | After every later commit |
//! | `will_dispose` | Once, on disposal |
//! | `did_catch` | A child failed with a non-defect error |

mod lifecycle;

pub(crate) use lifecycle::ComponentBehavior;

use std::borrow::Cow;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::element::Renderable;
use crate::error::{Error, Result};
use crate::graph::Node;
use crate::value::{Action, Value};

type RenderFn = Box<dyn Fn(&Instance) -> Result<Renderable>>;
type HookFn = Box<dyn Fn(&Instance) -> Result<()>>;

/// A user component definition.
pub struct Component {
    name: Cow<'static, str>,
    default_props: Option<Value>,
    render: RenderFn,
    initial_state: Option<Box<dyn Fn(&Value) -> Value>>,
    will_receive_props: Option<Box<dyn Fn(&Instance, &Value) -> Result<()>>>,
    derive_state: Option<Box<dyn Fn(&Value, &Value) -> Option<Value>>>,
    should_update: Option<Box<dyn Fn(&Instance, &Value, &Value) -> bool>>,
    did_mount: Option<HookFn>,
    did_update: Option<Box<dyn Fn(&Instance, &Previous) -> Result<()>>>,
    will_dispose: Option<Box<dyn Fn(&Instance)>>,
    did_catch: Option<Box<dyn Fn(&Instance, &Error) -> Result<()>>>,
}

impl Component {
    /// A component with the given display name and render function.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, render: F) -> Self
    where
        F: Fn(&Instance) -> Result<Renderable> + 'static,
    {
        Self {
            name: name.into(),
            default_props: None,
            render: Box::new(render),
            initial_state: None,
            will_receive_props: None,
            derive_state: None,
            should_update: None,
            did_mount: None,
            did_update: None,
            will_dispose: None,
            did_catch: None,
        }
    }

    /// Props merged underneath whatever props an element supplies.
    pub fn default_props(mut self, defaults: impl Into<Value>) -> Self {
        self.default_props = Some(defaults.into());
        self
    }

    /// Initial state, computed from the first props.
    pub fn initial_state<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Value + 'static,
    {
        self.initial_state = Some(Box::new(f));
        self
    }

    /// Called with the incoming props before they are committed. State set
    /// from here joins the update already in progress.
    pub fn will_receive_props<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance, &Value) -> Result<()> + 'static,
    {
        self.will_receive_props = Some(Box::new(f));
        self
    }

    /// Pure function of `(props, state)` yielding a state patch.
    pub fn derive_state<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Option<Value> + 'static,
    {
        self.derive_state = Some(Box::new(f));
        self
    }

    /// Called with `(next_props, next_state)`; the instance still reads the
    /// current ones.
    pub fn should_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance, &Value, &Value) -> bool + 'static,
    {
        self.should_update = Some(Box::new(f));
        self
    }

    pub fn did_mount<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance) -> Result<()> + 'static,
    {
        self.did_mount = Some(Box::new(f));
        self
    }

    pub fn did_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance, &Previous) -> Result<()> + 'static,
    {
        self.did_update = Some(Box::new(f));
        self
    }

    pub fn will_dispose<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance) + 'static,
    {
        self.will_dispose = Some(Box::new(f));
        self
    }

    /// Handle a failed child. Returning `Ok` keeps the component alive with
    /// the child slot emptied; returning `Err` fails the component.
    pub fn did_catch<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance, &Error) -> Result<()> + 'static,
    {
        self.did_catch = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate a props value and merge the defaults underneath it.
    pub fn resolve_props(&self, props: Value) -> Result<Value> {
        match props {
            Value::Null | Value::Map(_) => Ok(match &self.default_props {
                Some(defaults) => defaults.merge(&props),
                None => props,
            }),
            other => Err(Error::configuration(format!(
                "props of `{}` must be a map or null, got {other:?}",
                self.name
            ))),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("default_props", &self.default_props)
            .finish_non_exhaustive()
    }
}

/// Handle to a mounted component, passed to its render function and hooks.
///
/// Cheap to clone; holds the node weakly, so a handle captured by an action
/// outliving the component reports [`Error::Reentrancy`] instead of keeping
/// the node alive.
#[derive(Clone)]
pub struct Instance {
    node: Weak<Node>,
    name: Rc<str>,
}

impl Instance {
    pub(crate) fn new(node: &Rc<Node>) -> Self {
        Self {
            node: Rc::downgrade(node),
            name: node.name().into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current props. Inside `will_receive_props` and `should_update` these
    /// are still the previous props.
    pub fn props(&self) -> Value {
        self.node
            .upgrade()
            .and_then(|n| n.props().as_value().cloned())
            .unwrap_or_default()
    }

    pub fn state(&self) -> Value {
        self.node.upgrade().map(|n| n.state()).unwrap_or_default()
    }

    /// The component's last committed value.
    pub fn value(&self) -> Value {
        self.node.upgrade().map(|n| n.value()).unwrap_or_default()
    }

    pub fn is_disposed(&self) -> bool {
        self.node.upgrade().map_or(true, |n| n.is_disposed())
    }

    /// Shallow-merge `patch` into the state and schedule an update.
    ///
    /// From inside one of the component's own hooks the update is queued
    /// and runs once the current pass completes. From outside it runs
    /// before this returns, inside its own transaction.
    pub fn set_state(&self, patch: impl Into<Value>) -> Result<()> {
        let node = self
            .node
            .upgrade()
            .ok_or_else(|| Error::disposed(self.name.as_ref(), "set state on"))?;
        node.set_state(patch.into())
    }

    /// Wrap `f` as an action value that can be exposed through the
    /// component's output.
    pub fn action<F>(&self, f: F) -> Value
    where
        F: Fn(&Instance) -> Result<()> + 'static,
    {
        let instance = self.clone();
        Value::Action(Action::new(move || f(&instance)))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Props, state and value as they were before an update, passed to
/// `did_update`.
#[derive(Debug, Clone, PartialEq)]
pub struct Previous {
    pub props: Value,
    pub state: Value,
    pub value: Value,
}
