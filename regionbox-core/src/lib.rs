#![warn(missing_docs)]
//! # regionbox-core
//!
//! Types shared between the regionbox region proxy and the cache clients it
//! talks to.
//!
//! Two value worlds meet here:
//!
//! - [`HostValue`] is what the host application works with. It is dynamic,
//!   may hold things the cache cannot store (functions, `undefined`), and
//!   uses [`HostValue::Undefined`] as the "no value" sentinel.
//! - [`NativeValue`] is the cache client's representation of a stored value.
//!
//! An [`EventPayload`] is the record that travels from a cache client's
//! listener thread to the host thread when a region entry changes.

pub mod event;
pub mod host;
pub mod name;
pub mod native;

pub use event::{EventKind, EventPayload};
pub use host::HostValue;
pub use name::RegionName;
pub use native::NativeValue;
