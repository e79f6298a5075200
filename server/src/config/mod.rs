//! Configuration management: defaults and loading from the environment.

pub mod app_config;
pub mod defaults;

pub use app_config::AppConfig;

/// Load the first `.env` found next to or above the working directory.
pub fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
