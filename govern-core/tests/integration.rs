//! Integration Tests for Built-in Nodes
//!
//! These tests verify that the built-in combinators, external stores and
//! governors work together correctly.

mod common;

use common::Recorder;
use govern_core::{Element, Error, Governor, Options, Props, Renderable, Signal, Value};

fn int(v: &Value) -> i64 {
    v.as_i64().unwrap_or(0)
}

/// Test that a constant root reports its value and follows new props.
#[test]
fn constant_root_follows_props() {
    let governor = Governor::new(Element::constant("hello")).unwrap();
    assert_eq!(governor.get_value().unwrap(), Value::from("hello"));

    governor.set_props(Value::from("bye")).unwrap();
    assert_eq!(governor.get_value().unwrap(), Value::from("bye"));
}

/// Test that setting an identical constant publishes nothing.
#[test]
fn identical_constant_is_not_republished() {
    let governor = Governor::new(Element::constant(3)).unwrap();
    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();

    governor.set_props(Value::Int(3)).unwrap();
    assert_eq!(recorder.value_count(), 0);

    governor.set_props(Value::Int(4)).unwrap();
    assert_eq!(recorder.values(), vec![Value::Int(4)]);
}

/// Test that a props payload of the wrong shape is rejected and leaves the
/// tree intact.
#[test]
fn mismatched_root_props_are_rejected() {
    let governor = Governor::new(Element::constant(1)).unwrap();

    let err = governor
        .set_props(Props::Combine(Default::default()))
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert!(!governor.is_disposed());
    assert_eq!(governor.get_value().unwrap(), Value::Int(1));
}

/// Test that `map` re-projects on every upstream value, inside the
/// upstream's transaction bracket.
#[test]
fn map_projects_each_signal_value() {
    let signal = Signal::new(1);
    let governor = Governor::new(Element::map(signal.clone(), |v| Value::Int(int(v) * 2))).unwrap();
    assert_eq!(governor.get_value().unwrap(), Value::Int(2));

    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();

    signal.set(5);
    signal.set(6);

    assert_eq!(recorder.values(), vec![Value::Int(10), Value::Int(12)]);
    assert_eq!(
        recorder.events(),
        ["start", "value", "end", "start", "value", "end"]
    );
}

/// Test that `flat_map` switches inner sources and releases the old one.
#[test]
fn flat_map_switches_sources() {
    let (left, right) = (Signal::new("left"), Signal::new("right"));
    let use_left = Signal::new(true);

    let element = {
        let (left, right) = (left.clone(), right.clone());
        Element::flat_map(use_left.clone(), move |v| {
            if v.as_bool() == Some(true) {
                Renderable::from(left.clone())
            } else {
                Renderable::from(right.clone())
            }
        })
    };
    let governor = Governor::new(element).unwrap();
    assert_eq!(governor.get_value().unwrap(), Value::from("left"));
    assert_eq!((left.subscriber_count(), right.subscriber_count()), (1, 0));

    use_left.set(false);
    assert_eq!(governor.get_value().unwrap(), Value::from("right"));
    assert_eq!((left.subscriber_count(), right.subscriber_count()), (0, 1));

    right.set("right again");
    assert_eq!(governor.get_value().unwrap(), Value::from("right again"));

    left.set("ignored");
    assert_eq!(governor.get_value().unwrap(), Value::from("right again"));
}

/// Test that `flat_map` keeps its inner node when the projection yields the
/// same store again.
#[test]
fn flat_map_reuses_identical_inner_store() {
    let inner = Signal::new(0);
    let outer = Signal::new(1);

    let element = {
        let inner = inner.clone();
        Element::flat_map(outer.clone(), move |_| Renderable::from(inner.clone()))
    };
    let governor = Governor::new(element).unwrap();

    outer.set(2);
    outer.set(3);
    assert_eq!(inner.subscriber_count(), 1);

    inner.set(9);
    assert_eq!(governor.get_value().unwrap(), Value::Int(9));
}

/// Test that `combine` mixes plain values, stores and elements, in the
/// configured key order.
#[test]
fn combine_mixes_children() {
    let signal = Signal::new(1);
    let governor = Governor::new(Element::combine([
        ("plain", Renderable::from(Value::from("x"))),
        ("store", Renderable::from(signal.clone())),
        (
            "mapped",
            Element::map(signal.clone(), |v| Value::Int(int(v) + 1)).into(),
        ),
    ]))
    .unwrap();

    let value = governor.get_value().unwrap();
    assert_eq!(value["plain"], Value::from("x"));
    assert_eq!(value["store"], Value::Int(1));
    assert_eq!(value["mapped"], Value::Int(2));
    let keys: Vec<&String> = value.as_map().unwrap().keys().collect();
    assert_eq!(keys, ["plain", "store", "mapped"]);

    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();
    signal.set(10);

    // Both children react to the one upstream change; one publication.
    assert_eq!(
        recorder.values(),
        vec![Value::map([
            ("plain", Value::from("x")),
            ("store", Value::Int(10)),
            ("mapped", Value::Int(11)),
        ])]
    );
}

/// Test that a map value classifies as a constant, not as a nested combine.
#[test]
fn plain_maps_stay_plain() {
    let governor = Governor::new(Element::combine([(
        "config",
        Value::map([("nested", 1)]),
    )]))
    .unwrap();

    assert_eq!(
        governor.get_value().unwrap(),
        Value::map([("config", Value::map([("nested", 1)]))])
    );
}

/// Test that `distinct` suppresses identical values.
#[test]
fn distinct_suppresses_repeats() {
    let signal = Signal::new(1);
    let governor = Governor::new(Element::distinct(signal.clone())).unwrap();
    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();

    signal.set(1);
    signal.set(2);
    signal.set(2);
    signal.set(1);

    assert_eq!(recorder.values(), vec![Value::Int(2), Value::Int(1)]);
}

/// Test that `distinct_by` uses the supplied equality.
#[test]
fn distinct_by_uses_custom_equality() {
    let signal = Signal::new(2);
    let same_parity = |a: &Value, b: &Value| int(a) % 2 == int(b) % 2;
    let governor = Governor::new(Element::distinct_by(signal.clone(), same_parity)).unwrap();
    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();

    signal.set(4);
    signal.set(7);
    signal.set(9);
    signal.set(10);

    assert_eq!(recorder.values(), vec![Value::Int(7), Value::Int(10)]);
    assert_eq!(governor.get_value().unwrap(), Value::Int(10));
}

/// Test that `distinct` compares collections by identity.
#[test]
fn distinct_compares_collections_by_identity() {
    let shared = Value::list([1, 2]);
    let signal = Signal::new(shared.clone());
    let governor = Governor::new(Element::distinct(signal.clone())).unwrap();
    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();

    signal.set(shared.clone());
    assert_eq!(recorder.value_count(), 0);

    signal.set(Value::list([1, 2]));
    assert_eq!(recorder.value_count(), 1);
}

/// Test that one governor can subscribe to another.
#[test]
fn governors_compose() {
    let upstream = Governor::new(Element::constant(1)).unwrap();
    let downstream =
        Governor::new(Element::map(upstream.clone(), |v| Value::Int(int(v) * 10))).unwrap();
    assert_eq!(downstream.get_value().unwrap(), Value::Int(10));

    let recorder = Recorder::default();
    let _subscription = downstream.subscribe(recorder.subscriber()).unwrap();

    upstream.set_props(Value::Int(2)).unwrap();

    assert_eq!(recorder.values(), vec![Value::Int(20)]);
    assert_eq!(recorder.events(), ["start", "value", "end"]);
    assert_eq!(upstream.subscriber_count(), 1);

    downstream.dispose().unwrap();
    assert_eq!(upstream.subscriber_count(), 0);
    assert!(!upstream.is_disposed());
}

/// Test that a completed upstream governor leaves its last value in place.
#[test]
fn completed_upstream_keeps_last_value() {
    let upstream = Governor::new(Element::constant(5)).unwrap();
    let downstream = Governor::new(Element::subscribe(upstream.clone())).unwrap();

    upstream.dispose().unwrap();

    assert!(!downstream.is_disposed());
    assert_eq!(downstream.get_value().unwrap(), Value::Int(5));
}

/// Test that handing a `subscribe` root a different store moves the
/// subscription over to it.
#[test]
fn subscribe_root_switches_to_a_new_store() {
    let (a, b) = (Signal::new(1), Signal::new(100));
    let governor = Governor::new(Element::subscribe(a.clone())).unwrap();
    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();

    governor.set_props(Props::Subscribe(b.store())).unwrap();
    assert_eq!(governor.get_value().unwrap(), Value::Int(100));
    assert_eq!((a.subscriber_count(), b.subscriber_count()), (0, 1));

    a.set(2);
    b.set(200);

    assert_eq!(governor.get_value().unwrap(), Value::Int(200));
    assert_eq!(recorder.values(), vec![Value::Int(100), Value::Int(200)]);
}

/// Test that several store changes inside one dispatch publish once.
#[test]
fn dispatch_batches_store_changes() {
    let (a, b) = (Signal::new(1), Signal::new(2));
    let governor = Governor::new(Element::combine([("a", a.clone()), ("b", b.clone())])).unwrap();
    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();

    governor
        .dispatch(|| {
            a.set(10);
            b.set(20);
        })
        .unwrap();

    assert_eq!(
        recorder.values(),
        vec![Value::map([("a", 10), ("b", 20)])]
    );
    assert_eq!(recorder.events(), ["start", "value", "end"]);
}

/// Test that unsubscribing stops notifications without disposing.
#[test]
fn unsubscribe_stops_notifications() {
    let signal = Signal::new(0);
    let governor = Governor::new(Element::subscribe(signal.clone())).unwrap();
    let recorder = Recorder::default();
    let subscription = governor.subscribe(recorder.subscriber()).unwrap();

    signal.set(1);
    subscription.unsubscribe();
    signal.set(2);

    assert_eq!(recorder.values(), vec![Value::Int(1)]);
    assert_eq!(governor.get_value().unwrap(), Value::Int(2));
    assert_eq!(governor.subscriber_count(), 0);
}

/// Test that `emit_initial_value` delivers the current value on subscribe.
#[test]
fn initial_value_option() {
    let options = Options {
        emit_initial_value: true,
        ..Options::default()
    };
    let governor = Governor::with_options(Element::constant(7), options).unwrap();
    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();

    assert_eq!(recorder.values(), vec![Value::Int(7)]);
}

/// Test that invalid options are rejected before anything mounts.
#[test]
fn invalid_options_are_rejected() {
    let signal = Signal::new(0);
    let options = Options {
        max_update_passes: 0,
        ..Options::default()
    };

    let err = Governor::with_options(Element::subscribe(signal.clone()), options).unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(signal.subscriber_count(), 0);
}

/// Test that flushing a settled tree is a no-op.
#[test]
fn flush_on_settled_tree() {
    let governor = Governor::new(Element::constant(1)).unwrap();
    let recorder = Recorder::default();
    let _subscription = governor.subscribe(recorder.subscriber()).unwrap();

    governor.flush().unwrap();

    assert!(recorder.events().is_empty());
    assert_eq!(governor.get_value().unwrap(), Value::Int(1));
}

/// Test that disposing a tree releases every external subscription.
#[test]
fn dispose_releases_external_stores() {
    let (a, b) = (Signal::new(1), Signal::new(2));
    let governor = Governor::new(Element::combine([
        ("a", Renderable::from(a.clone())),
        ("b", Element::distinct(b.clone()).into()),
    ]))
    .unwrap();
    assert_eq!((a.subscriber_count(), b.subscriber_count()), (1, 1));

    governor.dispose().unwrap();

    assert_eq!((a.subscriber_count(), b.subscriber_count()), (0, 0));
}
