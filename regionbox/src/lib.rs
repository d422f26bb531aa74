#![warn(missing_docs)]
//! Host-side proxy to the regions of a replicated key-value cache.
//!
//! A [`Cache`] wraps a client cache ([`NativeCache`]) and hands out
//! [`Region`] proxies. Regions offer blocking data operations and put
//! callbacks that always run on the host thread, although the client
//! observes changes on its own threads.
//!
//! # Event flow
//!
//! 1. The first [`Region::on_put`] installs a [`BridgeListener`] on the
//!    client region and spawns a drain task on the host [`LocalSet`].
//! 2. The client calls the listener on one of its threads. The listener
//!    serializes the change into an [`EventPayload`] and posts it to the
//!    region's [`Notifier`].
//! 3. The drain task wakes on the host thread, takes the pending payloads
//!    and invokes the region's callbacks through the [`CallbackRegistry`].
//!
//! What happens when events arrive faster than the host drains them is set
//! by the [`DeliveryPolicy`] in [`BridgeConfig`].
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use regionbox::{Cache, Host, HostValue};
//! use regionbox_memory::MemoryServer;
//!
//! let server = MemoryServer::new();
//! server.define_region("exampleRegion");
//! let client = server.connect().unwrap();
//!
//! let host = Host::new().unwrap();
//! let cache = Cache::new(&host, client.clone());
//! let region = cache.get_region("exampleRegion").unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! region
//!     .on_put(move |key, value| sink.borrow_mut().push((key.to_string(), value.clone())))
//!     .unwrap();
//!
//! region.put("foo", HostValue::from("bar")).unwrap();
//! client.wait_idle();
//! host.run_pending();
//!
//! assert_eq!(*seen.borrow(), vec![("foo".to_string(), HostValue::from("bar"))]);
//! ```
//!
//! Client behavior (interest registration, listener threads, server-side
//! functions) is whatever the wrapped [`NativeCache`] implements.
//!
//! [`NativeCache`]: regionbox_client::NativeCache
//! [`LocalSet`]: tokio::task::LocalSet

mod bridge;
mod cache;
mod collector;
pub mod config;
mod error;
mod host;
mod invoke;
mod listener;
pub mod metrics;
mod notifier;
mod region;
mod registry;

pub use cache::{Cache, CacheBuilder};
pub use collector::{CollectorState, ResultStream, StreamingResultCollector};
pub use config::{BridgeConfig, BridgeConfigBuilder, DeliveryPolicy, Overflow};
pub use error::{ConfigError, RegionError};
pub use host::Host;
pub use listener::BridgeListener;
pub use notifier::{Drained, Notifier, PostOutcome};
pub use region::Region;
pub use registry::{CallbackRegistry, PutCallback};

pub use regionbox_client::{ClientError, DefaultConverter, ValueConverter};
pub use regionbox_core::{EventKind, EventPayload, HostValue, NativeValue, RegionName};
