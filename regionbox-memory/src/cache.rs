//! Client cache connected to a [`MemoryServer`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use regionbox_client::{ClientResult, NativeCache, NativeRegion};
use regionbox_core::RegionName;
use tracing::debug;

use crate::delivery::DeliveryWorker;
use crate::region::MemoryRegion;
use crate::server::MemoryServer;

/// State shared by a client cache and its region handles.
pub(crate) struct ClientShared {
    id: u64,
    server: MemoryServer,
    delivery: DeliveryWorker,
    closed: AtomicBool,
}

impl ClientShared {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn server(&self) -> &MemoryServer {
        &self.server
    }

    pub(crate) fn delivery(&self) -> &DeliveryWorker {
        &self.delivery
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for ClientShared {
    fn drop(&mut self) {
        self.delivery.shutdown();
    }
}

/// A client cache connected to a [`MemoryServer`].
///
/// Every client owns one delivery thread on which the listeners of its
/// regions run. Cloning is cheap; clones share the same client.
#[derive(Clone)]
pub struct MemoryCache {
    client: Arc<ClientShared>,
    regions: Arc<DashMap<RegionName, Arc<MemoryRegion>>>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("id", &self.client.id)
            .field("regions", &self.regions.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl MemoryCache {
    pub(crate) fn connect(server: MemoryServer, id: u64) -> ClientResult<Self> {
        let delivery = DeliveryWorker::spawn(id)?;
        debug!(client = id, "client cache connected");
        Ok(Self {
            client: Arc::new(ClientShared {
                id,
                server,
                delivery,
                closed: AtomicBool::new(false),
            }),
            regions: Arc::new(DashMap::new()),
        })
    }

    /// Returns the typed handle of a region defined on the server.
    ///
    /// Repeated lookups of the same name return the same handle.
    pub fn region(&self, name: &str) -> Option<Arc<MemoryRegion>> {
        if self.is_closed() {
            debug!(client = self.client.id, region = name, "lookup on closed cache");
            return None;
        }
        if let Some(region) = self.regions.get(name) {
            return Some(Arc::clone(region.value()));
        }
        let data = self.client.server.region(name)?;
        let region = self
            .regions
            .entry(data.name().clone())
            .or_insert_with(|| MemoryRegion::new(data, Arc::clone(&self.client)));
        Some(Arc::clone(region.value()))
    }

    /// Blocks until every listener delivery queued so far has run.
    ///
    /// Must not be called from inside a listener.
    pub fn wait_idle(&self) {
        self.client.delivery.wait_idle();
    }

    /// Whether [`close`](NativeCache::close) was called.
    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }
}

impl NativeCache for MemoryCache {
    fn get_region(&self, name: &str) -> Option<Arc<dyn NativeRegion>> {
        self.region(name).map(|region| region as Arc<dyn NativeRegion>)
    }

    fn close(&self) {
        if self.client.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.client.delivery.shutdown();
        debug!(client = self.client.id, "client cache closed");
    }
}
