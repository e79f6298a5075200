use std::sync::{Arc, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

use toasty_core::toast::TOAST_CLASS;
use toasty_core::{PresentationSurface, RegistryHandle, RegistrySlot, SurfaceEvent, ToastRegistry};

use crate::config::AppConfig;
use crate::toasts::{OverlaySurface, worker};

/// Application shared state accessible from every axum handler.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for WebSocket messages
    ws_tx: broadcast::Sender<String>,
    config: AppConfig,
    /// The one toast registry of this process
    toasts: RegistryHandle<OverlaySurface>,
    started_at: DateTime<Utc>,
}

impl SharedState {
    /// Build the state around the registry held by `slot`.
    ///
    /// When this call creates the registry it also spawns the event worker
    /// that drives it. A registry already present in `slot` keeps its own
    /// configuration, broadcast channel, and worker.
    pub fn new(config: AppConfig, slot: &RegistrySlot<OverlaySurface>) -> Self {
        let (ws_tx, _) = broadcast::channel(2048);
        let (events_tx, events_rx) = mpsc::unbounded_channel::<SurfaceEvent>();

        let mut created = false;
        let toasts = slot.get_or_create(&config.toasts, || {
            created = true;
            OverlaySurface::new(ws_tx.clone(), events_tx, config.fade())
        });

        let ws_tx = if created {
            worker::spawn(Arc::clone(&toasts), events_rx);
            ws_tx
        } else {
            tracing::warn!("Reusing existing toast registry; new configuration ignored");
            lock(&toasts).surface().ws_sender().clone()
        };

        Self {
            inner: Arc::new(SharedStateInner {
                ws_tx,
                config,
                toasts,
                started_at: Utc::now(),
            }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    pub fn ws_sender(&self) -> &broadcast::Sender<String> {
        &self.inner.ws_tx
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<String> {
        self.inner.ws_tx.subscribe()
    }

    /// Run `f` with the registry locked. Never hold the lock across `.await`.
    pub fn with_toasts<R>(&self, f: impl FnOnce(&mut ToastRegistry<OverlaySurface>) -> R) -> R {
        f(&mut lock(&self.inner.toasts))
    }

    /// Initial document state for a newly connected overlay.
    pub fn toast_snapshot(&self) -> Value {
        self.with_toasts(|registry| registry.surface().snapshot())
    }

    /// Handle a close request coming from an overlay. Returns `false` if no
    /// toast has `id`.
    pub fn dismiss_toast(&self, id: &str) -> bool {
        self.with_toasts(|registry| {
            let Some(node) = registry.surface().find_with_id(TOAST_CLASS, id) else {
                return false;
            };
            registry.handle_event(SurfaceEvent::DismissRequested(node));
            true
        })
    }
}

fn lock(
    handle: &RegistryHandle<OverlaySurface>,
) -> MutexGuard<'_, ToastRegistry<OverlaySurface>> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}
