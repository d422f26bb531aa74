use regionbox_core::{NativeValue, RegionName};

/// A change to one region entry, as the client reports it to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryEvent {
    /// Region the entry belongs to.
    pub region: RegionName,
    /// Entry key.
    pub key: String,
    /// Value before the change, if the client knows it.
    pub old_value: Option<NativeValue>,
    /// Value after the change.
    pub new_value: Option<NativeValue>,
    /// `true` when the change was made by another client.
    pub remote_origin: bool,
}

/// Listener invoked by the client after region entries change.
///
/// Callbacks run synchronously on the client's own delivery threads, inside
/// its critical delivery path. Implementations must return promptly and must
/// not panic.
pub trait CacheListener: Send + Sync {
    /// Called after a new entry was created.
    fn after_create(&self, event: &EntryEvent);

    /// Called after an existing entry was updated.
    fn after_update(&self, event: &EntryEvent);
}
