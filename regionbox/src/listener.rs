//! Cache listener forwarding entry events to a [`Notifier`].

use std::sync::Arc;

use regionbox_client::{CacheListener, EntryEvent};
use regionbox_core::{EventKind, EventPayload};
use tracing::{debug, warn};

use crate::metrics;
use crate::notifier::{Notifier, PostOutcome};

/// Listener installed on a cache client region.
///
/// Runs on the client's listener threads. Each create or update becomes one
/// [`EventPayload`] posted to the region's notifier; no host state is
/// touched here.
#[derive(Debug, Clone)]
pub struct BridgeListener {
    notifier: Arc<Notifier>,
}

impl BridgeListener {
    /// Creates a listener posting to `notifier`.
    pub fn new(notifier: Arc<Notifier>) -> Self {
        Self { notifier }
    }

    fn forward(&self, event: &EntryEvent) {
        let Some(new_value) = event.new_value.as_ref() else {
            debug!(region = %event.region, key = %event.key, "entry event without new value");
            return;
        };
        let payload = match EventPayload::new(
            event.region.clone(),
            EventKind::Put,
            event.key.as_str(),
            new_value,
        ) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    region = %event.region,
                    key = %event.key,
                    value_type = new_value.type_name(),
                    %error,
                    "unable to serialize entry event"
                );
                metrics::record_listener_error(&event.region);
                return;
            }
        };

        match self.notifier.post(payload) {
            PostOutcome::Dropped => {
                warn!(region = %event.region, key = %event.key, "event queue full, dropping event")
            }
            PostOutcome::Closed => {
                debug!(region = %event.region, key = %event.key, "bridge closed, event ignored")
            }
            PostOutcome::Enqueued | PostOutcome::Replaced => {}
        }
    }
}

impl CacheListener for BridgeListener {
    fn after_create(&self, event: &EntryEvent) {
        self.forward(event);
    }

    fn after_update(&self, event: &EntryEvent) {
        self.forward(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeliveryPolicy;
    use pretty_assertions::assert_eq;
    use regionbox_core::{NativeValue, RegionName};

    fn event(key: &str, new_value: Option<NativeValue>) -> EntryEvent {
        EntryEvent {
            region: RegionName::new("exampleRegion"),
            key: key.to_string(),
            old_value: None,
            new_value,
            remote_origin: true,
        }
    }

    #[test]
    fn test_create_and_update_both_post() {
        let notifier = Arc::new(Notifier::new(
            RegionName::new("exampleRegion"),
            DeliveryPolicy::default(),
        ));
        let listener = BridgeListener::new(Arc::clone(&notifier));
        listener.after_create(&event("a", Some(NativeValue::from("x"))));
        listener.after_update(&event("a", Some(NativeValue::from("y"))));

        let drained = notifier.take();
        let values: Vec<_> = drained
            .payloads
            .iter()
            .map(|p| (p.key().to_string(), p.kind(), p.decode_new_value().unwrap()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("a".to_string(), EventKind::Put, NativeValue::from("x")),
                ("a".to_string(), EventKind::Put, NativeValue::from("y")),
            ]
        );
    }

    #[test]
    fn test_event_without_value_is_skipped() {
        let notifier = Arc::new(Notifier::new(
            RegionName::new("exampleRegion"),
            DeliveryPolicy::default(),
        ));
        BridgeListener::new(Arc::clone(&notifier)).after_update(&event("a", None));
        assert_eq!(notifier.pending(), 0);
    }
}
