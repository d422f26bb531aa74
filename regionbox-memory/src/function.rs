//! Server-side function execution context.

use std::sync::Arc;

use regionbox_client::ResultCollector;
use regionbox_core::{NativeValue, RegionName};

use crate::server::ServerRegion;

/// What a server-side function sees while it runs.
///
/// Gives access to the region data set the function was executed on, the
/// execution arguments, and the result sender.
pub struct FunctionContext {
    region: Arc<ServerRegion>,
    args: Option<NativeValue>,
    collector: Arc<dyn ResultCollector>,
}

impl FunctionContext {
    pub(crate) fn new(
        region: Arc<ServerRegion>,
        args: Option<NativeValue>,
        collector: Arc<dyn ResultCollector>,
    ) -> Self {
        Self {
            region,
            args,
            collector,
        }
    }

    /// Name of the region the function runs on.
    pub fn region_name(&self) -> &RegionName {
        self.region.name()
    }

    /// Execution arguments.
    pub fn arguments(&self) -> Option<&NativeValue> {
        self.args.as_ref()
    }

    /// Reads an entry of the region.
    pub fn get(&self, key: &str) -> Option<NativeValue> {
        self.region.get(key)
    }

    /// Writes an entry of the region.
    ///
    /// The change counts as remote for every client: only clients with
    /// registered interest are notified.
    pub fn put(&self, key: &str, value: NativeValue) {
        self.region.put(None, key, value);
    }

    /// Keys currently stored in the region.
    pub fn keys(&self) -> Vec<String> {
        self.region.keys()
    }

    /// Streams one result back to the caller.
    pub fn send_result(&self, value: NativeValue) {
        self.collector.add_result(value);
    }

    pub(crate) fn finish(&self) {
        self.collector.end_results();
    }
}
