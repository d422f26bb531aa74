//! Metrics declaration and recording.
//!
//! Every recorder is a no-op unless the `metrics` feature is enabled.

use regionbox_core::RegionName;

use crate::notifier::PostOutcome;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track events posted to region notifiers, labelled by outcome.
    pub static ref EVENTS_POSTED: &'static str = {
        metrics::describe_counter!(
            "regionbox_events_posted_total",
            "Total number of events posted by cache listeners."
        );
        "regionbox_events_posted_total"
    };
    /// Track events dispatched on the host thread.
    pub static ref EVENTS_DISPATCHED: &'static str = {
        metrics::describe_counter!(
            "regionbox_events_dispatched_total",
            "Total number of events dispatched to host callbacks."
        );
        "regionbox_events_dispatched_total"
    };
    /// Track host callback invocations.
    pub static ref CALLBACKS_INVOKED: &'static str = {
        metrics::describe_counter!(
            "regionbox_callbacks_invoked_total",
            "Total number of host callback invocations."
        );
        "regionbox_callbacks_invoked_total"
    };
    /// Track events lost to conversion failures.
    pub static ref LISTENER_ERRORS: &'static str = {
        metrics::describe_counter!(
            "regionbox_listener_errors_total",
            "Total number of events that could not be converted."
        );
        "regionbox_listener_errors_total"
    };
}

/// Records the outcome of posting one event.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_post(region: &RegionName, outcome: PostOutcome) {
    metrics::counter!(
        *EVENTS_POSTED,
        "region" => region.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline(always)]
pub fn record_post(_region: &RegionName, _outcome: PostOutcome) {}

/// Records one dispatched event and the callbacks it reached.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_dispatch(region: &RegionName, callbacks: usize) {
    metrics::counter!(*EVENTS_DISPATCHED, "region" => region.to_string()).increment(1);
    metrics::counter!(*CALLBACKS_INVOKED, "region" => region.to_string())
        .increment(callbacks as u64);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline(always)]
pub fn record_dispatch(_region: &RegionName, _callbacks: usize) {}

/// Records an event lost before reaching callbacks, or a callback that panicked.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_listener_error(region: &RegionName) {
    metrics::counter!(*LISTENER_ERRORS, "region" => region.to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline(always)]
pub fn record_listener_error(_region: &RegionName) {}
