//! Background task feeding surface events into the registry.

use std::sync::PoisonError;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use toasty_core::{RegistryHandle, SurfaceEvent};

use super::OverlaySurface;

/// Spawn the event loop. It ends when every event sender is gone.
pub fn spawn(
    registry: RegistryHandle<OverlaySurface>,
    mut events: mpsc::UnboundedReceiver<SurfaceEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Toast event worker started");
        while let Some(event) = events.recv().await {
            // Non-animated hides emit follow-up events synchronously; they are
            // picked up by the next iteration.
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .handle_event(event);
        }
        tracing::info!("Toast event worker stopped");
    })
}
