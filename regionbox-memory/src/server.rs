//! Shared region storage standing in for the cache servers.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::RwLock;
use regionbox_client::{ClientResult, EntryEvent};
use regionbox_core::{NativeValue, RegionName};
use smol_str::SmolStr;
use tracing::trace;

use crate::cache::MemoryCache;
use crate::delivery::ListenerCall;
use crate::function::FunctionContext;
use crate::region::MemoryRegion;

/// Server-side function body.
pub(crate) type ServerFunction = Arc<dyn Fn(&FunctionContext) + Send + Sync>;

/// In-process stand-in for a cluster of cache servers.
///
/// Cloning is cheap; clones share the same data.
#[derive(Clone)]
pub struct MemoryServer {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    regions: DashMap<RegionName, Arc<ServerRegion>>,
    functions: DashMap<SmolStr, ServerFunction>,
    available: AtomicBool,
    next_client_id: AtomicU64,
}

impl std::fmt::Debug for MemoryServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryServer")
            .field("regions", &self.inner.regions.len())
            .field("functions", &self.inner.functions.len())
            .field("available", &self.is_available())
            .finish()
    }
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServer {
    /// Creates a server with no regions.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ServerInner {
                regions: DashMap::new(),
                functions: DashMap::new(),
                available: AtomicBool::new(true),
                next_client_id: AtomicU64::new(1),
            }),
        }
    }

    /// Defines a region. Defining an existing region keeps its data.
    pub fn define_region(&self, name: impl Into<RegionName>) {
        let name = name.into();
        self.inner
            .regions
            .entry(name.clone())
            .or_insert_with(|| Arc::new(ServerRegion::new(name)));
    }

    /// Registers a function that clients can execute on a region.
    ///
    /// The function sends results through
    /// [`FunctionContext::send_result`]; the end of the result stream is
    /// signalled after it returns.
    pub fn register_function<F>(&self, id: impl Into<SmolStr>, function: F)
    where
        F: Fn(&FunctionContext) + Send + Sync + 'static,
    {
        self.inner.functions.insert(id.into(), Arc::new(function));
    }

    /// Simulates losing (`false`) or regaining (`true`) every server.
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::Release);
    }

    /// Whether clients can currently reach the server.
    pub fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::Acquire)
    }

    /// Connects a new client cache, starting its delivery thread.
    pub fn connect(&self) -> ClientResult<MemoryCache> {
        let id = self.inner.next_client_id.fetch_add(1, Ordering::Relaxed);
        MemoryCache::connect(self.clone(), id)
    }

    pub(crate) fn region(&self, name: &str) -> Option<Arc<ServerRegion>> {
        self.inner
            .regions
            .get(name)
            .map(|region| Arc::clone(region.value()))
    }

    pub(crate) fn function(&self, id: &str) -> Option<ServerFunction> {
        self.inner
            .functions
            .get(id)
            .map(|function| Arc::clone(function.value()))
    }
}

/// Data and membership of one region.
pub(crate) struct ServerRegion {
    name: RegionName,
    entries: DashMap<String, NativeValue>,
    members: RwLock<Vec<Weak<MemoryRegion>>>,
}

impl ServerRegion {
    fn new(name: RegionName) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            members: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn name(&self) -> &RegionName {
        &self.name
    }

    pub(crate) fn join(&self, member: Weak<MemoryRegion>) {
        self.members.write().push(member);
    }

    pub(crate) fn get(&self, key: &str) -> Option<NativeValue> {
        self.entries.get(key).map(|value| value.value().clone())
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    /// Stores an entry and notifies members.
    ///
    /// `origin` is the id of the client that made the change; `None` for
    /// changes made on the server itself (functions). The originating client
    /// always hears about its own change, other clients only while they have
    /// registered interest.
    pub(crate) fn put(&self, origin: Option<u64>, key: &str, value: NativeValue) {
        let old_value = self.entries.insert(key.to_owned(), value.clone());
        let call = if old_value.is_some() {
            ListenerCall::Update
        } else {
            ListenerCall::Create
        };

        let members: Vec<Arc<MemoryRegion>> = {
            let mut members = self.members.write();
            members.retain(|member| member.strong_count() > 0);
            members.iter().filter_map(Weak::upgrade).collect()
        };

        for member in members {
            let remote_origin = origin != Some(member.client_id());
            if remote_origin && !member.has_interest() {
                trace!(region = %self.name, key, client = member.client_id(), "member has no interest");
                continue;
            }
            member.enqueue(
                call,
                EntryEvent {
                    region: self.name.clone(),
                    key: key.to_owned(),
                    old_value: old_value.clone(),
                    new_value: Some(value.clone()),
                    remote_origin,
                },
            );
        }
    }
}
