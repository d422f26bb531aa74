//! Host callbacks registered per event kind.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use regionbox_client::ValueConverter;
use regionbox_core::{EventKind, EventPayload, HostValue};
use tracing::{error, warn};

use crate::metrics;

/// Host callback receiving the key and new value of a put.
pub type PutCallback = Rc<dyn Fn(&str, &HostValue)>;

/// Callbacks of one region, keyed by event kind.
///
/// Lives on the host thread only. Callbacks are invoked in registration
/// order and stay registered for the lifetime of the registry.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: RefCell<HashMap<EventKind, Vec<PutCallback>>>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let callbacks = self.callbacks.borrow();
        let mut map = f.debug_map();
        for (kind, list) in callbacks.iter() {
            map.entry(&kind.as_str(), &list.len());
        }
        map.finish()
    }
}

impl CallbackRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback for `kind`.
    ///
    /// May be called from inside a callback; the new callback is invoked from
    /// the next dispatched event on.
    pub fn register(&self, kind: EventKind, callback: PutCallback) {
        self.callbacks
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push(callback);
    }

    /// Number of callbacks registered for `kind`.
    pub fn len(&self, kind: EventKind) -> usize {
        self.callbacks.borrow().get(&kind).map_or(0, Vec::len)
    }

    /// Whether no callback is registered at all.
    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().values().all(Vec::is_empty)
    }

    /// Invokes every callback registered for the payload's kind, in
    /// registration order, with the key and the decoded new value.
    ///
    /// Returns the number of callbacks that returned normally. A payload
    /// whose value cannot be decoded reaches no callback. A panicking
    /// callback is logged and counted as a listener error; the remaining
    /// callbacks still run.
    pub fn dispatch(&self, payload: &EventPayload, converter: &dyn ValueConverter) -> usize {
        let snapshot = match self.callbacks.borrow().get(&payload.kind()) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => return 0,
        };

        let value = match payload.decode_new_value() {
            Ok(value) => converter.to_host(&value),
            Err(error) => {
                warn!(
                    region = %payload.region(),
                    key = payload.key(),
                    %error,
                    "dropping event with undecodable value"
                );
                metrics::record_listener_error(payload.region());
                return 0;
            }
        };

        let mut completed = 0;
        for callback in &snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(payload.key(), &value))) {
                Ok(()) => completed += 1,
                Err(_) => {
                    error!(
                        region = %payload.region(),
                        key = payload.key(),
                        "put callback panicked"
                    );
                    metrics::record_listener_error(payload.region());
                }
            }
        }
        metrics::record_dispatch(payload.region(), completed);
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regionbox_client::DefaultConverter;
    use regionbox_core::{NativeValue, RegionName};
    use std::cell::RefCell;

    fn payload(key: &str, value: NativeValue) -> EventPayload {
        EventPayload::new(RegionName::new("exampleRegion"), EventKind::Put, key, &value).unwrap()
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let registry = CallbackRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            registry.register(
                EventKind::Put,
                Rc::new(move |key: &str, value: &HostValue| {
                    seen.borrow_mut().push(format!("{tag}:{key}={value}"));
                }),
            );
        }

        let invoked = registry.dispatch(&payload("foo", "bar".into()), &DefaultConverter);
        assert_eq!(invoked, 2);
        assert_eq!(*seen.borrow(), vec!["first:foo=bar", "second:foo=bar"]);
    }

    #[test]
    fn test_dispatch_without_callbacks() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.dispatch(&payload("foo", NativeValue::Null), &DefaultConverter),
            0
        );
    }

    #[test]
    fn test_callback_registered_during_dispatch_runs_from_next_event() {
        let registry = Rc::new(CallbackRegistry::new());
        let late_calls = Rc::new(RefCell::new(0));
        {
            let registry_handle = Rc::downgrade(&registry);
            let late_calls = Rc::clone(&late_calls);
            registry.register(
                EventKind::Put,
                Rc::new(move |_: &str, _: &HostValue| {
                    let Some(registry) = registry_handle.upgrade() else {
                        return;
                    };
                    let late_calls = Rc::clone(&late_calls);
                    registry.register(
                        EventKind::Put,
                        Rc::new(move |_: &str, _: &HostValue| *late_calls.borrow_mut() += 1),
                    );
                }),
            );
        }

        assert_eq!(registry.dispatch(&payload("a", NativeValue::Null), &DefaultConverter), 1);
        assert_eq!(*late_calls.borrow(), 0);
        assert_eq!(registry.len(EventKind::Put), 2);

        assert_eq!(registry.dispatch(&payload("b", NativeValue::Null), &DefaultConverter), 2);
        assert_eq!(*late_calls.borrow(), 1);
        assert_eq!(registry.len(EventKind::Put), 3);
    }

    #[test]
    fn test_undecodable_value_reaches_no_callback() {
        let registry = CallbackRegistry::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        registry.register(
            EventKind::Put,
            Rc::new(move |_: &str, _: &HostValue| *counter.borrow_mut() += 1),
        );

        let invoked = registry.dispatch(
            &payload("nan", NativeValue::Double(f64::NAN)),
            &DefaultConverter,
        );
        assert_eq!(invoked, 0);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_panicking_callback_does_not_stop_the_others() {
        let registry = CallbackRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        registry.register(
            EventKind::Put,
            Rc::new(|key: &str, _: &HostValue| {
                if key == "boom" {
                    panic!("callback failed on {key}");
                }
            }),
        );
        let recorder = Rc::clone(&seen);
        registry.register(
            EventKind::Put,
            Rc::new(move |key: &str, _: &HostValue| recorder.borrow_mut().push(key.to_string())),
        );

        assert_eq!(registry.dispatch(&payload("boom", NativeValue::Null), &DefaultConverter), 1);
        assert_eq!(registry.dispatch(&payload("after", NativeValue::Null), &DefaultConverter), 2);
        assert_eq!(*seen.borrow(), vec!["boom", "after"]);
    }
}
