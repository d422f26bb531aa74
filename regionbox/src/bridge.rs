//! Per-region wiring of listener, notifier, drain task and callbacks.

use std::ptr;
use std::rc::Rc;
use std::sync::Arc;

use regionbox_client::{CacheListener, NativeRegion, ValueConverter};
use tokio::task::LocalSet;
use tracing::{Instrument, debug, info_span, warn};

use crate::config::BridgeConfig;
use crate::listener::BridgeListener;
use crate::notifier::Notifier;
use crate::registry::CallbackRegistry;

/// Event bridge of one region.
///
/// Created the first time a callback is registered on the region. Installs a
/// [`BridgeListener`] on the native region and spawns a task on the host's
/// [`LocalSet`] draining the notifier into the callback registry.
///
/// A native region holds one listener. Installing replaces whatever was
/// there; closing detaches the listener only while it is still this
/// bridge's.
pub(crate) struct RegionBridge {
    native: Arc<dyn NativeRegion>,
    listener: Arc<BridgeListener>,
    notifier: Arc<Notifier>,
    registry: Rc<CallbackRegistry>,
}

impl RegionBridge {
    /// Sets up the bridge for `native`. The drain task runs once `local` is
    /// driven.
    pub(crate) fn install(
        local: &LocalSet,
        native: Arc<dyn NativeRegion>,
        config: &BridgeConfig,
        converter: Arc<dyn ValueConverter>,
    ) -> Self {
        let region = native.name().clone();
        let notifier = Arc::new(Notifier::new(region.clone(), config.delivery));
        let registry = Rc::new(CallbackRegistry::new());

        let span = info_span!(
            "region_events",
            region = %region,
            policy = config.delivery.as_str(),
        );
        local.spawn_local(
            drain(Arc::clone(&notifier), Rc::clone(&registry), converter).instrument(span),
        );

        let listener = Arc::new(BridgeListener::new(Arc::clone(&notifier)));
        let mutator = native.attributes_mutator();
        if mutator.cache_listener().is_some() {
            warn!(region = %region, "replacing a cache listener installed elsewhere");
        }
        mutator.set_cache_listener(Some(listener.clone() as Arc<dyn CacheListener>));
        debug!(region = %region, "event bridge installed");

        Self {
            native,
            listener,
            notifier,
            registry,
        }
    }

    pub(crate) fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Detaches the listener and closes the notifier. Idempotent.
    ///
    /// A listener installed over ours in the meantime stays in place. Events
    /// already posted are still dispatched; later ones are discarded.
    pub(crate) fn close(&self) {
        if self.notifier.is_closed() {
            return;
        }
        let mutator = self.native.attributes_mutator();
        match mutator.cache_listener() {
            Some(installed) if self.owns(&installed) => mutator.set_cache_listener(None),
            Some(_) => debug!(
                region = %self.notifier.region(),
                "listener was replaced, leaving it installed"
            ),
            None => {}
        }
        self.notifier.close();
        debug!(region = %self.notifier.region(), "event bridge closed");
    }

    fn owns(&self, installed: &Arc<dyn CacheListener>) -> bool {
        ptr::addr_eq(Arc::as_ptr(installed), Arc::as_ptr(&self.listener))
    }
}

impl Drop for RegionBridge {
    fn drop(&mut self) {
        self.close();
    }
}

/// Drain loop run on the host thread.
///
/// Taking the queue before awaiting the wakeup means a post racing with the
/// take leaves a stored wakeup behind, so the loop runs again instead of
/// sleeping with events pending.
async fn drain(
    notifier: Arc<Notifier>,
    registry: Rc<CallbackRegistry>,
    converter: Arc<dyn ValueConverter>,
) {
    loop {
        let drained = notifier.take();
        for payload in &drained.payloads {
            registry.dispatch(payload, converter.as_ref());
        }
        if drained.closed {
            break;
        }
        notifier.notified().await;
    }
    debug!("drain task finished");
}
