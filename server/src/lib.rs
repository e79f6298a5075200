//! HTTP and WebSocket host for the toast manager.
//!
//! The process owns one toast registry backed by an [`toasts::OverlaySurface`].
//! Browser overlays connect over `/ws`, replay the snapshot, and apply the
//! `toast_op` stream; anything else drives toasts through `/api/toasts`.

pub mod app;
pub mod config;
pub mod server;
pub mod toasts;

use config::AppConfig;

/// Load `.env` and the runtime configuration.
pub fn init_foundation() -> AppConfig {
    config::load_dotenv();
    let config = AppConfig::load();
    tracing::info!(
        port = config.server_port,
        fade_ms = config.fade_ms,
        "Configuration loaded"
    );
    config
}
