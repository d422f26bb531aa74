#![warn(missing_docs)]
//! In-process cache client for regionbox.
//!
//! A [`MemoryServer`] plays the role of the cache servers: it owns the region
//! data and the server-side functions. Any number of [`MemoryCache`] clients
//! connect to it. Like a real client library, every `MemoryCache` owns a
//! delivery thread and invokes region listeners on that thread, never on the
//! caller's.
//!
//! ```
//! use regionbox_client::{NativeCache, NativeRegion};
//! use regionbox_core::NativeValue;
//! use regionbox_memory::MemoryServer;
//!
//! let server = MemoryServer::new();
//! server.define_region("exampleRegion");
//!
//! let cache = server.connect().unwrap();
//! let region = cache.get_region("exampleRegion").unwrap();
//! region.put("foo", NativeValue::from("bar")).unwrap();
//! assert_eq!(region.get("foo").unwrap(), Some(NativeValue::from("bar")));
//! ```
//!
//! # Caveats
//!
//! - Data is **not persisted** and lives as long as the server handle
//! - Interest registration is all-or-nothing (`register_all_keys`)

mod cache;
mod delivery;
mod function;
mod region;
mod server;

pub use cache::MemoryCache;
pub use function::FunctionContext;
pub use region::MemoryRegion;
pub use server::MemoryServer;
