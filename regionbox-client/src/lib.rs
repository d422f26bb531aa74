// #![warn(missing_docs)]
//! Capability surface of the cache client a region proxy delegates to.
//!
//! The real client library (connections, replication, wire serialization) is
//! a black box. This crate names the parts of it the proxy relies on:
//!
//! - [`NativeCache`] and [`NativeRegion`] for the data operations;
//! - [`AttributesMutator`] and [`CacheListener`] for change notification;
//! - [`ResultCollector`] for function execution results;
//! - [`ValueConverter`] for moving values between the host and the client.
//!
//! If you want to plug in your own client, implement these traits.
mod collector;
mod converter;
mod error;
mod listener;
mod region;

pub use collector::ResultCollector;
pub use converter::{DefaultConverter, ValueConverter};
pub use error::{ClientError, ClientResult};
pub use listener::{CacheListener, EntryEvent};
pub use region::{AttributesMutator, NativeCache, NativeRegion};
