//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

pub const SERVER_PORT: &str = "TOASTY_PORT";
pub const ANIMATION: &str = "TOASTY_ANIMATION";
pub const AUTOHIDE: &str = "TOASTY_AUTOHIDE";
pub const DELAY_MS: &str = "TOASTY_DELAY_MS";
pub const FADE_MS: &str = "TOASTY_FADE_MS";
pub const STYLE: &str = "TOASTY_STYLE";

pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_FADE_MS: u64 = 150;

/// A single setting definition.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

const DEFS: &[(&str, &str, &str)] = &[
    (SERVER_PORT, "8080", "HTTP and WebSocket port"),
    (ANIMATION, "true", "Fade toasts in and out"),
    (AUTOHIDE, "true", "Hide toasts automatically after the delay"),
    (DELAY_MS, "2000", "Autohide delay in milliseconds"),
    (FADE_MS, "150", "Length of the fade-out transition in milliseconds"),
    (STYLE, "", "Container style overrides as prop:value;prop:value"),
];

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Default value of `key`, or empty for unknown keys.
pub fn get_default(key: &str) -> &'static str {
    DEFAULT_SETTINGS.get(key).map(|d| d.default).unwrap_or("")
}

/// Every definition in declaration order.
pub fn all_settings() -> Vec<&'static SettingDef> {
    DEFS.iter()
        .filter_map(|(key, _, _)| DEFAULT_SETTINGS.get(key))
        .collect()
}
