//! Single-threaded host event loop.

use std::future::Future;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::task::{JoinHandle, LocalSet};

/// Event loop of the host thread.
///
/// A current-thread runtime driving a [`LocalSet`]. Region callbacks and the
/// drain tasks delivering events to them run only while the loop is driven
/// by [`block_on`](Self::block_on) or [`run_for`](Self::run_for), and only
/// on the thread driving it.
///
/// ```
/// use regionbox::Host;
///
/// let host = Host::new().unwrap();
/// let value = host.block_on(async { 40 + 2 });
/// assert_eq!(value, 42);
/// ```
#[derive(Debug)]
pub struct Host {
    local: Rc<LocalSet>,
    runtime: Runtime,
}

impl Host {
    /// Creates the host loop.
    pub fn new() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            local: Rc::new(LocalSet::new()),
            runtime,
        })
    }

    /// Drives the loop until `future` completes.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }

    /// Queues a task on the host thread. It runs while the loop is driven.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        self.local.spawn_local(future)
    }

    /// Task set shared with the caches created on this host.
    pub(crate) fn local(&self) -> Rc<LocalSet> {
        Rc::clone(&self.local)
    }

    /// Runs the host tasks that are ready, without waiting for new events.
    pub fn run_pending(&self) {
        self.block_on(tokio::task::yield_now());
    }

    /// Drives the loop for `duration`, dispatching events as they arrive.
    pub fn run_for(&self, duration: Duration) {
        self.block_on(tokio::time::sleep(duration));
    }
}
