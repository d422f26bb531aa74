//! Host-side cache proxy.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use regionbox_client::{DefaultConverter, NativeCache, NativeRegion, ValueConverter};
use regionbox_core::RegionName;
use tokio::task::LocalSet;
use tracing::{debug, info};

use crate::bridge::RegionBridge;
use crate::config::BridgeConfig;
use crate::error::RegionError;
use crate::host::Host;
use crate::region::Region;

/// Host-side handle to a client cache.
///
/// Cloning is cheap; clones share state. A `Cache` belongs to the host
/// thread and is neither `Send` nor `Sync`.
///
/// Event bridges are created per region the first time a callback is
/// registered, with their drain tasks on the [`Host`] the cache was created
/// for. Closing the cache, or dropping its last handle, detaches their
/// listeners and stops their drain tasks.
///
/// [`Region`]s do not keep their cache alive. A callback capturing a `Cache`
/// handle does, until [`close`](Self::close) is called.
#[derive(Clone)]
pub struct Cache {
    inner: Rc<CacheInner>,
}

/// Non-owning handle held by regions.
#[derive(Clone)]
pub(crate) struct WeakCache {
    inner: Weak<CacheInner>,
}

struct CacheInner {
    local: Rc<LocalSet>,
    native: Arc<dyn NativeCache>,
    converter: Arc<dyn ValueConverter>,
    config: BridgeConfig,
    bridges: RefCell<HashMap<RegionName, Rc<RegionBridge>>>,
    closed: Cell<bool>,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bridges: Vec<RegionName> = self.inner.bridges.borrow().keys().cloned().collect();
        f.debug_struct("Cache")
            .field("config", &self.inner.config)
            .field("bridges", &bridges)
            .field("closed", &self.inner.closed.get())
            .finish()
    }
}

impl Cache {
    /// Wraps `native` with the default converter and configuration.
    /// Callbacks run on `host`.
    pub fn new<N>(host: &Host, native: N) -> Self
    where
        N: NativeCache + 'static,
    {
        Self::builder(host, native).build()
    }

    /// Starts building a cache proxy around `native` whose callbacks run
    /// on `host`.
    pub fn builder<N>(host: &Host, native: N) -> CacheBuilder
    where
        N: NativeCache + 'static,
    {
        CacheBuilder {
            local: host.local(),
            native: Arc::new(native),
            converter: Arc::new(DefaultConverter),
            config: BridgeConfig::default(),
        }
    }

    /// Version of this crate.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Looks a region up by name.
    ///
    /// Returns `None` for unknown regions and once the cache is closed.
    pub fn get_region(&self, name: &str) -> Option<Region> {
        if self.is_closed() {
            return None;
        }
        let native = self.inner.native.get_region(name)?;
        Some(Region::new(self.downgrade(), native))
    }

    /// Closes the proxy and the underlying client cache. Idempotent.
    pub fn close(&self) {
        if self.inner.closed.replace(true) {
            return;
        }
        self.inner.close_bridges();
        self.inner.native.close();
        info!("cache closed");
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    /// Bridge configuration applied to new regions.
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    pub(crate) fn downgrade(&self) -> WeakCache {
        WeakCache {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn converter(&self) -> &Arc<dyn ValueConverter> {
        &self.inner.converter
    }

    pub(crate) fn ensure_open(&self) -> Result<(), RegionError> {
        if self.is_closed() {
            Err(RegionError::CacheClosed)
        } else {
            Ok(())
        }
    }

    /// Returns the bridge of `native`'s region, installing it on first use.
    pub(crate) fn bridge(
        &self,
        native: &Arc<dyn NativeRegion>,
    ) -> Result<Rc<RegionBridge>, RegionError> {
        self.ensure_open()?;
        let mut bridges = self.inner.bridges.borrow_mut();
        let bridge = bridges.entry(native.name().clone()).or_insert_with(|| {
            Rc::new(RegionBridge::install(
                &self.inner.local,
                Arc::clone(native),
                &self.inner.config,
                Arc::clone(&self.inner.converter),
            ))
        });
        Ok(Rc::clone(bridge))
    }

    /// Bridge of `region` if one was installed.
    pub(crate) fn existing_bridge(&self, region: &RegionName) -> Option<Rc<RegionBridge>> {
        self.inner.bridges.borrow().get(region).cloned()
    }
}

impl WeakCache {
    /// The cache, unless every handle to it was dropped.
    pub(crate) fn upgrade(&self) -> Option<Cache> {
        self.inner.upgrade().map(|inner| Cache { inner })
    }
}

impl CacheInner {
    fn close_bridges(&self) {
        let bridges: Vec<_> = self.bridges.borrow_mut().drain().collect();
        for (region, bridge) in bridges {
            bridge.close();
            debug!(region = %region, "region bridge released");
        }
    }
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        self.close_bridges();
    }
}

/// Builder for [`Cache`].
pub struct CacheBuilder {
    local: Rc<LocalSet>,
    native: Arc<dyn NativeCache>,
    converter: Arc<dyn ValueConverter>,
    config: BridgeConfig,
}

impl fmt::Debug for CacheBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CacheBuilder {
    /// Set the value converter.
    pub fn converter<C>(self, converter: C) -> Self
    where
        C: ValueConverter + 'static,
    {
        Self {
            converter: Arc::new(converter),
            ..self
        }
    }

    /// Set the bridge configuration.
    pub fn config(self, config: BridgeConfig) -> Self {
        Self { config, ..self }
    }

    /// Build the Cache.
    pub fn build(self) -> Cache {
        Cache {
            inner: Rc::new(CacheInner {
                local: self.local,
                native: self.native,
                converter: self.converter,
                config: self.config,
                bridges: RefCell::new(HashMap::new()),
                closed: Cell::new(false),
            }),
        }
    }
}
