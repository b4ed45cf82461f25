//! Reconciliation
//!
//! Decides whether the node mounted for one element can be carried over to
//! the next element occupying the same slot.
//!
//! - `subscribe` elements reuse iff both refer to the same store. A store has
//!   no identity beyond itself, so keys are ignored.
//! - Every other element reuses iff kind and key are both identical (two
//!   absent keys are identical).
//!
//! Reuse updates the node's props in place. Anything else disposes the old
//! node first and only then mounts the new one, so two live nodes never hold
//! the same external source at once.

use super::{Element, Kind, Props};

/// Outcome of comparing the element in a slot with its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The slot was empty: mount.
    Mount,
    /// Keep the node and update its props.
    Reuse,
    /// Dispose the node, then mount a new one.
    Replace,
}

/// Whether a node mounted for `old` can be reused for `new`.
pub fn can_reuse(old: &Element, new: &Element) -> bool {
    match (&old.kind, &old.props) {
        (Kind::Subscribe, Props::Subscribe(source)) => matches!(
            (&new.kind, &new.props),
            (Kind::Subscribe, Props::Subscribe(next)) if source.same(next)
        ),
        _ => old.kind == new.kind && old.key == new.key,
    }
}

/// Classify the transition of a slot from `old` to `new`.
pub fn reconcile(old: Option<&Element>, new: &Element) -> Decision {
    match old {
        None => Decision::Mount,
        Some(old) if can_reuse(old, new) => Decision::Reuse,
        Some(_) => Decision::Replace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::reactive::Signal;
    use crate::value::Value;
    use std::rc::Rc;

    #[test]
    fn same_kind_and_key_reuses() {
        let a = Element::constant(1).with_key("k");
        let b = Element::constant(2).with_key("k");
        assert!(can_reuse(&a, &b));
        assert!(can_reuse(&Element::constant(1), &Element::constant(2)));
    }

    #[test]
    fn differing_key_or_kind_replaces() {
        let a = Element::constant(1).with_key("a");
        let b = Element::constant(1).with_key("b");
        assert_eq!(reconcile(Some(&a), &b), Decision::Replace);
        assert_eq!(reconcile(Some(&a), &Element::constant(1)), Decision::Replace);
        assert_eq!(
            reconcile(Some(&Element::constant(1)), &Element::distinct(Value::Int(1))),
            Decision::Replace
        );
    }

    #[test]
    fn empty_slot_mounts() {
        assert_eq!(reconcile(None, &Element::constant(1)), Decision::Mount);
    }

    #[test]
    fn subscribe_reuses_by_store_identity_only() {
        let signal = Signal::new(0);
        let a = Element::subscribe(signal.store()).with_key("x");
        let b = Element::subscribe(signal.store()).with_key("y");
        let other = Element::subscribe(Signal::new(0).store());

        assert!(can_reuse(&a, &b));
        assert!(!can_reuse(&a, &other));
        assert!(!can_reuse(&a, &Element::constant(0)));
    }

    #[test]
    fn components_reuse_by_definition_identity() {
        fn render(_: &crate::component::Instance) -> crate::Result<crate::Renderable> {
            Ok(Value::Null.into())
        }
        let a = Rc::new(Component::new("C", render));
        let b = Rc::new(Component::new("C", render));

        let first = Element::component(&a, Value::Null).unwrap();
        let second = Element::component(&a, Value::Null).unwrap();
        let foreign = Element::component(&b, Value::Null).unwrap();

        assert!(can_reuse(&first, &second));
        assert!(!can_reuse(&first, &foreign));
    }
}
