//! Built-in node kinds.
//!
//! | Kind | Children | Value |
//! |------|----------|-------|
//! | `constant` | none | the `of` prop |
//! | `map` | `from` | `to(from)` |
//! | `flat_map` | `from`, the element `to(from)` | the inner element's value |
//! | `combine` | one per key | map of the children's values, in props order |
//! | `distinct` | `from` | `from`, with repeats suppressed |
//! | `subscribe` | an external store | the store's latest value |

mod combine;
mod constant;
mod distinct;
mod flat_map;
mod map;
mod subscribe;

use crate::component::ComponentBehavior;
use crate::element::Kind;
use crate::graph::behavior::Behavior;

/// Behavior for a freshly mounted node of `kind`.
pub(crate) fn create(kind: &Kind) -> Box<dyn Behavior> {
    match kind {
        Kind::Constant => Box::new(constant::Constant),
        Kind::Map => Box::new(map::MapNode::new()),
        Kind::FlatMap => Box::new(flat_map::FlatMapNode::new()),
        Kind::Combine => Box::new(combine::CombineNode::default()),
        Kind::Distinct => Box::new(distinct::DistinctNode::new()),
        Kind::Subscribe => Box::new(subscribe::SubscribeNode::default()),
        Kind::Component(def) => Box::new(ComponentBehavior::new(def.clone())),
    }
}
