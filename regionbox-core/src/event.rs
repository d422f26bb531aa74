//! Region change notifications.
//!
//! An [`EventPayload`] is built on a cache client's listener thread and handed
//! over to the host thread. It carries the new value in serialized (JSON) form
//! so that the payload is plain owned data with no ties to the client's
//! internal value handles.

use std::fmt;

use crate::{NativeValue, RegionName};

/// Kind of region change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EventKind {
    /// An entry was created or updated.
    Put,
}

impl EventKind {
    /// Returns the kind as the host-facing event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "put",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification travelling from a listener thread to the host thread.
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPayload {
    region: RegionName,
    kind: EventKind,
    key: String,
    new_value: String,
}

impl EventPayload {
    /// Builds a payload, serializing `new_value`.
    pub fn new(
        region: RegionName,
        kind: EventKind,
        key: impl Into<String>,
        new_value: &NativeValue,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            region,
            kind,
            key: key.into(),
            new_value: serde_json::to_string(new_value)?,
        })
    }

    /// Region the change happened in.
    #[inline]
    pub fn region(&self) -> &RegionName {
        &self.region
    }

    /// Kind of change.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Key of the changed entry.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialized form of the new value.
    #[inline]
    pub fn new_value(&self) -> &str {
        &self.new_value
    }

    /// Decodes the serialized new value.
    pub fn decode_new_value(&self) -> Result<NativeValue, serde_json::Error> {
        serde_json::from_str(&self.new_value)
    }
}
