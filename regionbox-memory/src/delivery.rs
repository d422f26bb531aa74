//! Listener delivery thread of a client cache.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use regionbox_client::{ClientError, ClientResult, EntryEvent};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use crate::region::MemoryRegion;

/// Which listener callback a delivery invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListenerCall {
    Create,
    Update,
}

pub(crate) struct Delivery {
    pub(crate) region: Arc<MemoryRegion>,
    pub(crate) call: ListenerCall,
    pub(crate) event: EntryEvent,
}

/// Count of queued deliveries, with a condition to wait for zero.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn add(&self) {
        *self.count.lock() += 1;
    }

    fn done(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// Owns the delivery thread and the queue feeding it.
pub(crate) struct DeliveryWorker {
    sender: Mutex<Option<UnboundedSender<Delivery>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    pending: Arc<Pending>,
}

impl DeliveryWorker {
    pub(crate) fn spawn(client_id: u64) -> ClientResult<Self> {
        let (sender, receiver) = unbounded_channel();
        let pending = Arc::new(Pending::default());
        let thread = thread::Builder::new()
            .name(format!("regionbox-delivery-{client_id}"))
            .spawn({
                let pending = Arc::clone(&pending);
                move || run(receiver, pending)
            })
            .map_err(|e| ClientError::Internal(Box::new(e)))?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            thread: Mutex::new(Some(thread)),
            pending,
        })
    }

    /// Queues a delivery. Returns `false` once the worker was shut down.
    pub(crate) fn send(&self, delivery: Delivery) -> bool {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return false;
        };
        self.pending.add();
        if sender.send(delivery).is_err() {
            self.pending.done();
            return false;
        }
        true
    }

    /// Blocks until every queued delivery has run.
    ///
    /// Must not be called from a listener: the delivery thread would wait for
    /// itself.
    pub(crate) fn wait_idle(&self) {
        let mut count = self.pending.count.lock();
        while *count > 0 {
            self.pending.idle.wait(&mut count);
        }
    }

    /// Stops accepting deliveries; already queued ones still run.
    ///
    /// Joins the thread unless called from the delivery thread itself.
    pub(crate) fn shutdown(&self) {
        self.sender.lock().take();
        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                debug!("delivery thread ended with a panic");
            }
        }
    }
}

fn run(mut receiver: UnboundedReceiver<Delivery>, pending: Arc<Pending>) {
    while let Some(delivery) = receiver.blocking_recv() {
        delivery
            .region
            .invoke_listener(delivery.call, &delivery.event);
        drop(delivery);
        pending.done();
    }
    debug!("delivery queue closed, thread exiting");
}
