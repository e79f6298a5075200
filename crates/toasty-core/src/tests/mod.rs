use tokio::sync::mpsc;

use crate::config::RegistryConfig;
use crate::registry::ToastRegistry;
use crate::surface::{MemorySurface, SurfaceEvent};

mod scenarios;

fn test_registry(config: RegistryConfig) -> (ToastRegistry<MemorySurface>, mpsc::UnboundedReceiver<SurfaceEvent>) {
    let (surface, rx) = MemorySurface::channel();
    (ToastRegistry::new(&config, surface), rx)
}
