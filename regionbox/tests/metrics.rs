//! Tests for verifying that bridge metrics are recorded with the right labels.

#![cfg(feature = "metrics")]

use std::num::NonZeroUsize;
use std::rc::Rc;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use metrics_util::{CompositeKey, MetricKind};
use pretty_assertions::assert_eq;
use regionbox::{
    CallbackRegistry, DefaultConverter, DeliveryPolicy, EventKind, EventPayload, HostValue,
    NativeValue, Notifier, Overflow, RegionName,
};

/// Type alias for snapshot entries
type SnapshotEntry = (
    CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
);

fn find_counter(entries: &[SnapshotEntry], name: &str, label: (&str, &str)) -> Option<u64> {
    for (key, _, _, value) in entries {
        if key.kind() == MetricKind::Counter && key.key().name() == name {
            for l in key.key().labels() {
                if l.key() == label.0
                    && l.value() == label.1
                    && let DebugValue::Counter(v) = *value
                {
                    return Some(v);
                }
            }
        }
    }
    None
}

fn payload(key: &str, value: NativeValue) -> EventPayload {
    EventPayload::new(RegionName::new("exampleRegion"), EventKind::Put, key, &value).unwrap()
}

#[test]
fn test_post_outcomes_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let notifier = Notifier::new(
            RegionName::new("exampleRegion"),
            DeliveryPolicy::Bounded {
                capacity: NonZeroUsize::new(1).unwrap(),
                overflow: Overflow::DropNewest,
            },
        );
        notifier.post(payload("a", NativeValue::Null));
        notifier.post(payload("b", NativeValue::Null));
        notifier.close();
        notifier.post(payload("c", NativeValue::Null));
    });

    let entries = snapshotter.snapshot().into_vec();
    for (outcome, count) in [("enqueued", 1), ("dropped", 1), ("closed", 1)] {
        assert_eq!(
            find_counter(&entries, "regionbox_events_posted_total", ("outcome", outcome)),
            Some(count),
            "outcome {outcome}"
        );
    }
    assert_eq!(
        find_counter(&entries, "regionbox_events_posted_total", ("outcome", "replaced")),
        None
    );
}

#[test]
fn test_dispatch_and_errors_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let registry = CallbackRegistry::new();
        for _ in 0..2 {
            registry.register(EventKind::Put, Rc::new(|_: &str, _: &HostValue| {}));
        }
        registry.dispatch(&payload("a", NativeValue::from("x")), &DefaultConverter);
        registry.dispatch(&payload("b", NativeValue::Double(f64::NAN)), &DefaultConverter);
    });

    let entries = snapshotter.snapshot().into_vec();
    let region = ("region", "exampleRegion");
    assert_eq!(
        find_counter(&entries, "regionbox_events_dispatched_total", region),
        Some(1)
    );
    assert_eq!(
        find_counter(&entries, "regionbox_callbacks_invoked_total", region),
        Some(2)
    );
    assert_eq!(
        find_counter(&entries, "regionbox_listener_errors_total", region),
        Some(1)
    );
}

#[test]
fn test_panicking_callback_is_counted_as_listener_error() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let registry = CallbackRegistry::new();
        registry.register(
            EventKind::Put,
            Rc::new(|key: &str, _: &HostValue| {
                if key == "a" {
                    panic!("callback failure");
                }
            }),
        );
        registry.register(EventKind::Put, Rc::new(|_: &str, _: &HostValue| {}));
        registry.dispatch(&payload("a", NativeValue::from("x")), &DefaultConverter);
    });

    let entries = snapshotter.snapshot().into_vec();
    let region = ("region", "exampleRegion");
    assert_eq!(
        find_counter(&entries, "regionbox_listener_errors_total", region),
        Some(1)
    );
    assert_eq!(
        find_counter(&entries, "regionbox_callbacks_invoked_total", region),
        Some(1)
    );
}
