//! Cross-thread hand-off of region events to the host thread.
//!
//! A [`Notifier`] is posted to from any thread and drained on the host
//! thread. Posting never blocks on the host: it takes a short lock to queue
//! the payload and wakes the drain task, which swaps the whole queue out and
//! dispatches it after releasing the lock.

use std::collections::VecDeque;
use std::mem;

use parking_lot::Mutex;
use regionbox_core::{EventPayload, RegionName};
use tokio::sync::Notify;
use tracing::trace;

use crate::config::{DeliveryPolicy, Overflow};
use crate::metrics;

/// Result of [`Notifier::post`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// The payload was queued.
    Enqueued,
    /// The payload was queued in place of an older pending one.
    Replaced,
    /// The queue was full and the payload was discarded.
    Dropped,
    /// The notifier is closed; the payload was discarded.
    Closed,
}

impl PostOutcome {
    /// Short name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enqueued => "enqueued",
            Self::Replaced => "replaced",
            Self::Dropped => "dropped",
            Self::Closed => "closed",
        }
    }

    /// Whether the posted payload will be delivered.
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Enqueued | Self::Replaced)
    }
}

/// Payloads taken by one [`Notifier::take`] call.
#[derive(Debug, Default)]
pub struct Drained {
    /// Pending payloads in posting order.
    pub payloads: VecDeque<EventPayload>,
    /// Whether the notifier was closed when the payloads were taken.
    ///
    /// Nothing is posted after a take that observed `closed`.
    pub closed: bool,
}

#[derive(Debug, Default)]
struct State {
    pending: VecDeque<EventPayload>,
    closed: bool,
}

/// Wakeup channel between cache listener threads and the host thread.
#[derive(Debug)]
pub struct Notifier {
    region: RegionName,
    policy: DeliveryPolicy,
    state: Mutex<State>,
    wake: Notify,
}

impl Notifier {
    /// Creates an open notifier for `region`.
    pub fn new(region: RegionName, policy: DeliveryPolicy) -> Self {
        Self {
            region,
            policy,
            state: Mutex::new(State::default()),
            wake: Notify::new(),
        }
    }

    /// Region this notifier carries events for.
    pub fn region(&self) -> &RegionName {
        &self.region
    }

    /// Queues `payload` and wakes the host thread.
    ///
    /// Safe to call from any thread. Wakeups coalesce: several posts before
    /// the host thread runs lead to a single drain.
    pub fn post(&self, payload: EventPayload) -> PostOutcome {
        let mut state = self.state.lock();
        let (outcome, displaced) = if state.closed {
            (PostOutcome::Closed, Some(payload))
        } else {
            match self.policy {
                DeliveryPolicy::Latest => {
                    let displaced = state.pending.pop_front();
                    state.pending.push_back(payload);
                    match displaced {
                        Some(old) => (PostOutcome::Replaced, Some(old)),
                        None => (PostOutcome::Enqueued, None),
                    }
                }
                DeliveryPolicy::Bounded { capacity, overflow } => {
                    if state.pending.len() < capacity.get() {
                        state.pending.push_back(payload);
                        (PostOutcome::Enqueued, None)
                    } else {
                        match overflow {
                            Overflow::DropOldest => {
                                let displaced = state.pending.pop_front();
                                state.pending.push_back(payload);
                                (PostOutcome::Replaced, displaced)
                            }
                            Overflow::DropNewest => (PostOutcome::Dropped, Some(payload)),
                        }
                    }
                }
            }
        };
        drop(state);
        drop(displaced);

        if outcome.is_queued() {
            self.wake.notify_one();
        }
        trace!(region = %self.region, outcome = outcome.as_str(), "event posted");
        metrics::record_post(&self.region, outcome);
        outcome
    }

    /// Takes every pending payload. Called by the host thread.
    pub fn take(&self) -> Drained {
        let mut state = self.state.lock();
        Drained {
            payloads: mem::take(&mut state.pending),
            closed: state.closed,
        }
    }

    /// Waits until a post or [`close`](Self::close) happens after the last
    /// wakeup was consumed.
    ///
    /// A wakeup issued while nobody waits is kept, so calling [`take`] and
    /// then awaiting this cannot miss a post made in between.
    ///
    /// [`take`]: Self::take
    pub async fn notified(&self) {
        self.wake.notified().await;
    }

    /// Closes the notifier. Later posts are discarded; pending payloads are
    /// still returned by the next [`take`](Self::take).
    pub fn close(&self) {
        let already_closed = mem::replace(&mut self.state.lock().closed, true);
        if !already_closed {
            self.wake.notify_one();
        }
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of payloads waiting for the host thread.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }
}
