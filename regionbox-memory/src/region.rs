//! Client-side region handle.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use parking_lot::RwLock;
use regionbox_client::{
    AttributesMutator, CacheListener, ClientError, ClientResult, EntryEvent, NativeRegion,
    ResultCollector,
};
use regionbox_core::{NativeValue, RegionName};
use tracing::{debug, error, trace};

use crate::cache::ClientShared;
use crate::delivery::{Delivery, ListenerCall};
use crate::function::FunctionContext;
use crate::server::ServerRegion;

/// A region as seen by one [`MemoryCache`](crate::MemoryCache) client.
///
/// Implements [`NativeRegion`] and is its own [`AttributesMutator`].
pub struct MemoryRegion {
    data: Arc<ServerRegion>,
    client: Arc<ClientShared>,
    listener: RwLock<Option<Arc<dyn CacheListener>>>,
    interest: AtomicBool,
    listener_installs: AtomicUsize,
}

impl std::fmt::Debug for MemoryRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRegion")
            .field("name", self.data.name())
            .field("client", &self.client.id())
            .field("interest", &self.has_interest())
            .field("listener_installs", &self.listener_installs())
            .finish()
    }
}

impl MemoryRegion {
    pub(crate) fn new(data: Arc<ServerRegion>, client: Arc<ClientShared>) -> Arc<Self> {
        let region = Arc::new(Self {
            data,
            client,
            listener: RwLock::new(None),
            interest: AtomicBool::new(false),
            listener_installs: AtomicUsize::new(0),
        });
        region.data.join(Arc::downgrade(&region));
        region
    }

    /// How many times a listener was installed on this region.
    pub fn listener_installs(&self) -> usize {
        self.listener_installs.load(Ordering::Acquire)
    }

    /// Whether a listener is currently installed.
    pub fn has_listener(&self) -> bool {
        self.listener.read().is_some()
    }

    /// Whether this client registered interest in all keys.
    pub fn has_interest(&self) -> bool {
        self.interest.load(Ordering::Acquire)
    }

    pub(crate) fn client_id(&self) -> u64 {
        self.client.id()
    }

    pub(crate) fn enqueue(self: Arc<Self>, call: ListenerCall, event: EntryEvent) {
        if !self.has_listener() {
            return;
        }
        let client = Arc::clone(&self.client);
        let delivered = client.delivery().send(Delivery {
            region: self,
            call,
            event,
        });
        if !delivered {
            trace!(client = client.id(), "client closed, event not delivered");
        }
    }

    /// Runs the installed listener. Called on the delivery thread only.
    pub(crate) fn invoke_listener(&self, call: ListenerCall, event: &EntryEvent) {
        let listener = self.listener.read().clone();
        let Some(listener) = listener else {
            trace!(region = %event.region, key = %event.key, "listener detached before delivery");
            return;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match call {
            ListenerCall::Create => listener.after_create(event),
            ListenerCall::Update => listener.after_update(event),
        }));
        if outcome.is_err() {
            error!(region = %event.region, key = %event.key, "cache listener panicked");
        }
    }

    fn ensure_usable(&self) -> ClientResult<()> {
        if self.client.is_closed() {
            return Err(ClientError::CacheClosed);
        }
        if !self.client.server().is_available() {
            return Err(ClientError::CacheUnavailable(format!(
                "no servers available for region {}",
                self.data.name().full_path()
            )));
        }
        Ok(())
    }
}

impl NativeRegion for MemoryRegion {
    fn name(&self) -> &RegionName {
        self.data.name()
    }

    fn get(&self, key: &str) -> ClientResult<Option<NativeValue>> {
        self.ensure_usable()?;
        Ok(self.data.get(key))
    }

    fn put(&self, key: &str, value: NativeValue) -> ClientResult<()> {
        self.ensure_usable()?;
        self.data.put(Some(self.client.id()), key, value);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        self.ensure_usable()?;
        self.data.clear();
        Ok(())
    }

    fn register_all_keys(&self) -> ClientResult<()> {
        self.ensure_usable()?;
        self.interest.store(true, Ordering::Release);
        Ok(())
    }

    fn unregister_all_keys(&self) -> ClientResult<()> {
        self.ensure_usable()?;
        self.interest.store(false, Ordering::Release);
        Ok(())
    }

    fn attributes_mutator(&self) -> &dyn AttributesMutator {
        self
    }

    fn execute_function(
        &self,
        function_id: &str,
        args: Option<NativeValue>,
        collector: Arc<dyn ResultCollector>,
    ) -> ClientResult<()> {
        self.ensure_usable()?;
        let function = self
            .client
            .server()
            .function(function_id)
            .ok_or_else(|| ClientError::FunctionNotFound(function_id.into()))?;
        let context = FunctionContext::new(Arc::clone(&self.data), args, collector);
        let function_id = function_id.to_owned();

        thread::Builder::new()
            .name(format!("regionbox-function-{function_id}"))
            .spawn(move || {
                if panic::catch_unwind(AssertUnwindSafe(|| function(&context))).is_err() {
                    error!(function = %function_id, "function panicked");
                }
                context.finish();
            })
            .map_err(|e| ClientError::Internal(Box::new(e)))?;
        Ok(())
    }
}

impl AttributesMutator for MemoryRegion {
    fn set_cache_listener(&self, listener: Option<Arc<dyn CacheListener>>) {
        if listener.is_some() {
            self.listener_installs.fetch_add(1, Ordering::AcqRel);
        }
        debug!(
            region = %self.data.name(),
            installed = listener.is_some(),
            "cache listener changed"
        );
        *self.listener.write() = listener;
    }

    fn cache_listener(&self) -> Option<Arc<dyn CacheListener>> {
        self.listener.read().clone()
    }
}
