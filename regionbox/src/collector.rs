//! Streaming collection of function execution results.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use regionbox_client::{ResultCollector, ValueConverter};
use regionbox_core::{HostValue, NativeValue};
use smol_str::SmolStr;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

/// Lifecycle of a [`StreamingResultCollector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// Results are still accepted.
    Streaming,
    /// End of results was signalled; further calls are ignored.
    Closed,
}

/// [`ResultCollector`] turning function results into a [`ResultStream`].
///
/// Results are converted to host values on the thread that produced them
/// and queued without bound, so the producer never waits for the host.
pub struct StreamingResultCollector {
    function_id: SmolStr,
    converter: Arc<dyn ValueConverter>,
    sender: Mutex<Option<UnboundedSender<HostValue>>>,
}

impl std::fmt::Debug for StreamingResultCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResultCollector")
            .field("function_id", &self.function_id)
            .field("state", &self.state())
            .finish()
    }
}

impl StreamingResultCollector {
    /// Creates a collector and the stream its results arrive on.
    pub fn new(
        function_id: impl Into<SmolStr>,
        converter: Arc<dyn ValueConverter>,
    ) -> (Arc<Self>, ResultStream) {
        let (sender, receiver) = unbounded_channel();
        let collector = Arc::new(Self {
            function_id: function_id.into(),
            converter,
            sender: Mutex::new(Some(sender)),
        });
        (collector, ResultStream { receiver })
    }

    /// Current state.
    pub fn state(&self) -> CollectorState {
        if self.sender.lock().is_some() {
            CollectorState::Streaming
        } else {
            CollectorState::Closed
        }
    }
}

impl ResultCollector for StreamingResultCollector {
    fn add_result(&self, value: NativeValue) {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            warn!(function = %self.function_id, "result after end of results ignored");
            return;
        };
        if sender.send(self.converter.to_host(&value)).is_err() {
            debug!(function = %self.function_id, "result stream dropped, result discarded");
        }
    }

    fn end_results(&self) {
        if self.sender.lock().take().is_none() {
            warn!(function = %self.function_id, "end of results signalled twice");
        }
    }
}

/// Host-side stream of function results.
///
/// Yields results in the order they were added and ends after the collector
/// saw end of results.
#[derive(Debug)]
pub struct ResultStream {
    receiver: UnboundedReceiver<HostValue>,
}

impl ResultStream {
    /// Waits for every remaining result.
    pub async fn collect_all(mut self) -> Vec<HostValue> {
        let mut results = Vec::new();
        while let Some(value) = self.receiver.recv().await {
            results.push(value);
        }
        results
    }
}

impl Stream for ResultStream {
    type Item = HostValue;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
