//! Runtime application configuration loaded from the environment.

use std::time::Duration;

use toasty_core::{ContainerStyle, RegistryConfig};

use super::defaults::{
    self, ANIMATION, AUTOHIDE, DEFAULT_FADE_MS, DEFAULT_SERVER_PORT, DELAY_MS, FADE_MS,
    SERVER_PORT, STYLE,
};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub fade_ms: u64,
    /// Layer handed to the toast registry on construction.
    pub toasts: RegistryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            fade_ms: DEFAULT_FADE_MS,
            toasts: RegistryConfig::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Self {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; unset keys use their defaults.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> String {
            lookup(key).unwrap_or_else(|| defaults::get_default(key).to_string())
        };

        let mut toasts = RegistryConfig::new();
        if let Some(enabled) = parse_bool(ANIMATION, &g(ANIMATION)) {
            toasts = toasts.animation(enabled);
        }
        if let Some(enabled) = parse_bool(AUTOHIDE, &g(AUTOHIDE)) {
            toasts = toasts.autohide(enabled);
        }
        let delay = g(DELAY_MS);
        if !delay.is_empty() {
            match delay.trim().parse::<u64>() {
                Ok(ms) => toasts = toasts.delay_ms(ms),
                Err(_) => tracing::warn!(key = DELAY_MS, value = %delay, "Invalid delay, using default"),
            }
        }
        toasts.style = ContainerStyle::parse_css(&g(STYLE));

        Self {
            server_port: parse_u16(&g(SERVER_PORT), DEFAULT_SERVER_PORT),
            fade_ms: parse_u64(&g(FADE_MS), DEFAULT_FADE_MS),
            toasts,
        }
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

fn parse_bool(key: &str, s: &str) -> Option<bool> {
    match s.trim() {
        "" => None,
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        other => {
            tracing::warn!(key, value = other, "Invalid boolean, using default");
            None
        }
    }
}

fn parse_u16(s: &str, default: u16) -> u16 {
    if s.is_empty() {
        return default;
    }
    s.trim().parse().unwrap_or(default)
}

fn parse_u64(s: &str, default: u64) -> u64 {
    if s.is_empty() {
        return default;
    }
    s.trim().parse().unwrap_or(default)
}
