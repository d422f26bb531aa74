use std::sync::Arc;

use regionbox_core::{NativeValue, RegionName};

use crate::{CacheListener, ClientResult, ResultCollector};

/// Handle to a client-side cache.
pub trait NativeCache: Send + Sync {
    /// Looks up a region by name. `None` when the cache has no such region.
    fn get_region(&self, name: &str) -> Option<Arc<dyn NativeRegion>>;

    /// Closes the cache. Further operations fail with
    /// [`ClientError::CacheClosed`](crate::ClientError::CacheClosed).
    fn close(&self);
}

/// Handle to one region of a client cache.
///
/// All data operations are synchronous and block for a client round trip.
pub trait NativeRegion: Send + Sync {
    /// Region name.
    fn name(&self) -> &RegionName;

    /// Reads an entry. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> ClientResult<Option<NativeValue>>;

    /// Creates or replaces an entry.
    fn put(&self, key: &str, value: NativeValue) -> ClientResult<()>;

    /// Removes every entry of the region.
    fn clear(&self) -> ClientResult<()>;

    /// Registers interest in all keys, so that changes made by other clients
    /// are delivered to this client's listener.
    fn register_all_keys(&self) -> ClientResult<()>;

    /// Drops interest in all keys.
    fn unregister_all_keys(&self) -> ClientResult<()>;

    /// Mutator for the region's runtime attributes.
    fn attributes_mutator(&self) -> &dyn AttributesMutator;

    /// Executes a server-side function on this region, streaming its results
    /// into `collector`.
    ///
    /// Returns once the execution was dispatched; results arrive on client
    /// threads.
    fn execute_function(
        &self,
        function_id: &str,
        args: Option<NativeValue>,
        collector: Arc<dyn ResultCollector>,
    ) -> ClientResult<()>;
}

/// Mutator for runtime region attributes.
pub trait AttributesMutator: Send + Sync {
    /// Installs `listener` as the region's cache listener, replacing any
    /// previous one. `None` detaches the current listener.
    fn set_cache_listener(&self, listener: Option<Arc<dyn CacheListener>>);

    /// Listener currently installed, if any.
    fn cache_listener(&self) -> Option<Arc<dyn CacheListener>>;
}
