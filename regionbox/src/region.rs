//! Host-side region proxy.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use regionbox_client::NativeRegion;
use regionbox_core::{EventKind, HostValue, RegionName};
use tracing::debug;

use crate::cache::{Cache, WeakCache};
use crate::collector::{ResultStream, StreamingResultCollector};
use crate::error::RegionError;

/// Proxy to one region of a [`Cache`].
///
/// Data operations block for a client round trip and convert values with the
/// cache's converter. Put callbacks registered with [`on_put`](Self::on_put)
/// run on the host thread.
///
/// A region does not keep its cache alive, so callbacks may capture region
/// handles freely. Once every [`Cache`] handle is dropped, operations fail
/// with [`RegionError::CacheClosed`].
#[derive(Clone)]
pub struct Region {
    cache: WeakCache,
    native: Arc<dyn NativeRegion>,
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("name", self.name())
            .field("callbacks", &self.callback_count())
            .finish()
    }
}

impl Region {
    pub(crate) fn new(cache: WeakCache, native: Arc<dyn NativeRegion>) -> Self {
        Self { cache, native }
    }

    fn open_cache(&self) -> Result<Cache, RegionError> {
        let cache = self.cache.upgrade().ok_or(RegionError::CacheClosed)?;
        cache.ensure_open()?;
        Ok(cache)
    }

    /// Region name.
    pub fn name(&self) -> &RegionName {
        self.native.name()
    }

    /// Cache this region belongs to, while a handle to it is alive.
    pub fn cache(&self) -> Option<Cache> {
        self.cache.upgrade()
    }

    /// Reads `key`. Absent keys read as [`HostValue::Undefined`].
    #[tracing::instrument(skip(self), level = "trace", fields(region = %self.name()))]
    pub fn get(&self, key: &str) -> Result<HostValue, RegionError> {
        let cache = self.open_cache()?;
        Ok(match self.native.get(key)? {
            Some(value) => cache.converter().to_host(&value),
            None => HostValue::Undefined,
        })
    }

    /// Stores `value` under `key` and returns the value.
    ///
    /// Fails with [`RegionError::UnsupportedValueType`] when the converter
    /// has no stored form for the value; nothing is written then.
    #[tracing::instrument(skip(self, value), level = "trace", fields(region = %self.name()))]
    pub fn put(&self, key: &str, value: HostValue) -> Result<HostValue, RegionError> {
        let native = self
            .open_cache()?
            .converter()
            .to_native(&value)
            .ok_or_else(|| RegionError::UnsupportedValueType(value.to_string()))?;
        self.native.put(key, native)?;
        Ok(value)
    }

    /// Removes every entry of the region.
    #[tracing::instrument(skip(self), level = "trace", fields(region = %self.name()))]
    pub fn clear(&self) -> Result<(), RegionError> {
        self.open_cache()?;
        self.native.clear()?;
        Ok(())
    }

    /// Subscribes this client to changes of every key, including changes
    /// made by other clients.
    #[tracing::instrument(skip(self), level = "trace", fields(region = %self.name()))]
    pub fn register_all_keys(&self) -> Result<(), RegionError> {
        self.open_cache()?;
        self.native.register_all_keys()?;
        Ok(())
    }

    /// Drops the subscription made by
    /// [`register_all_keys`](Self::register_all_keys).
    #[tracing::instrument(skip(self), level = "trace", fields(region = %self.name()))]
    pub fn unregister_all_keys(&self) -> Result<(), RegionError> {
        self.open_cache()?;
        self.native.unregister_all_keys()?;
        Ok(())
    }

    /// Registers `callback` for puts on this region.
    ///
    /// The callback receives the key and the new value and always runs on
    /// the host thread, after the put was observed by the client. Callbacks
    /// run in registration order and are never removed. The first
    /// registration installs the region's cache listener. Callbacks are
    /// delivered whenever the cache's [`Host`](crate::Host) is driven.
    pub fn on_put<F>(&self, callback: F) -> Result<(), RegionError>
    where
        F: Fn(&str, &HostValue) + 'static,
    {
        let bridge = self.open_cache()?.bridge(&self.native)?;
        bridge.registry().register(EventKind::Put, Rc::new(callback));
        debug!(
            region = %self.name(),
            callbacks = bridge.registry().len(EventKind::Put),
            "put callback registered"
        );
        Ok(())
    }

    /// Number of put callbacks registered on this region.
    pub fn callback_count(&self) -> usize {
        self.cache
            .upgrade()
            .and_then(|cache| cache.existing_bridge(self.name()))
            .map_or(0, |bridge| bridge.registry().len(EventKind::Put))
    }

    /// Number of events waiting for the host thread.
    pub fn pending_events(&self) -> usize {
        self.cache
            .upgrade()
            .and_then(|cache| cache.existing_bridge(self.name()))
            .map_or(0, |bridge| bridge.notifier().pending())
    }

    /// Executes server-side function `function_id` on this region.
    ///
    /// Results are streamed as they arrive; the stream ends once the
    /// function signalled end of results. Arguments go through the cache's
    /// converter like put values.
    #[tracing::instrument(skip(self, args), level = "trace", fields(region = %self.name()))]
    pub fn execute_function(
        &self,
        function_id: &str,
        args: Option<HostValue>,
    ) -> Result<ResultStream, RegionError> {
        let cache = self.open_cache()?;
        let converter = cache.converter();
        let args = args
            .map(|args| {
                converter
                    .to_native(&args)
                    .ok_or_else(|| RegionError::UnsupportedValueType(args.to_string()))
            })
            .transpose()?;
        let (collector, stream) =
            StreamingResultCollector::new(function_id, Arc::clone(converter));
        self.native.execute_function(function_id, args, collector)?;
        Ok(stream)
    }
}
