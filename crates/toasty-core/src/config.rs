//! Layered option resolution.
//!
//! Options arrive as loose JSON objects (from an HTTP body, a settings file,
//! a script) or as the typed structs below. Either way they are filtered
//! against a fixed key schema: keys outside the schema are dropped silently,
//! and a recognized key holding a value of the wrong type counts as absent.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::surface::WidgetOptions;
use crate::toast::{InsertionMode, ResolvedToast};

/// Keys honored in the constructor-level layer.
pub const REGISTRY_KEYS: &[&str] = &["animation", "autohide", "delay", "style"];

/// Keys honored by `send`.
pub const SEND_KEYS: &[&str] = &[
    "time",
    "title",
    "body",
    "class",
    "id",
    "closeBtn",
    "append",
    "animation",
    "autohide",
    "delay",
];

/// Keys honored by `update`.
pub const UPDATE_KEYS: &[&str] = &["time", "title", "body", "addClass", "removeClass"];

pub const DEFAULT_ANIMATION: bool = true;
pub const DEFAULT_AUTOHIDE: bool = true;
pub const DEFAULT_DELAY_MS: u64 = 2000;

const DEFAULT_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("top", "100px"),
    ("right", "0"),
    ("height", "0"),
    ("z-index", "2000"),
    ("width", "250px"),
];

/// Build a schema map whose keys are `keys` and whose values are all null.
pub fn schema(keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .map(|key| ((*key).to_string(), Value::Null))
        .collect()
}

/// Merge `layers` over `base`, lowest priority first.
///
/// Only keys already present in `base` are copied; anything else is dropped.
pub fn resolve(base: &Map<String, Value>, layers: &[&Map<String, Value>]) -> Map<String, Value> {
    let mut resolved = base.clone();
    for layer in layers {
        for (key, value) in layer.iter() {
            if !base.contains_key(key) {
                tracing::debug!(key = %key, "Ignoring unrecognized option");
                continue;
            }
            resolved.insert(key.clone(), value.clone());
        }
    }
    resolved
}

fn filtered(value: &Value, keys: &[&str]) -> Map<String, Value> {
    match value {
        Value::Object(layer) => resolve(&schema(keys), &[layer]),
        Value::Null => schema(keys),
        other => {
            tracing::debug!(kind = json_kind(other), "Ignoring non-object option layer");
            schema(keys)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn get_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

fn get_millis(map: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = map.get(key)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .map(|ms| ms as u64)
    })
}

/// Read a text field. Numbers and booleans are rendered as text.
fn get_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a class list given either as a whitespace separated string or as an
/// array of strings.
fn get_classes(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            Some(joined)
        }
        _ => None,
    }
}

/// Ordered CSS property map applied to the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStyle(Vec<(String, String)>);

impl Default for ContainerStyle {
    fn default() -> Self {
        Self(
            DEFAULT_STYLE
                .iter()
                .map(|(prop, value)| ((*prop).to_string(), (*value).to_string()))
                .collect(),
        )
    }
}

impl ContainerStyle {
    /// An empty style map.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Set a property, keeping its original position when it already exists.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.0.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.0.push((property, value)),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge every entry of `other` over this map.
    pub fn merge(&mut self, other: &ContainerStyle) {
        for (property, value) in other.iter() {
            self.set(property, value);
        }
    }

    /// Inline CSS declaration list, e.g. `position: fixed; top: 100px`.
    pub fn to_css(&self) -> String {
        self.iter()
            .map(|(p, v)| format!("{p}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Parse `prop:value;prop:value`. Malformed declarations are skipped.
    pub fn parse_css(css: &str) -> Self {
        let mut style = Self::empty();
        for declaration in css.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let (property, value) = (property.trim(), value.trim());
            if property.is_empty() || value.is_empty() {
                continue;
            }
            style.set(property, value);
        }
        style
    }

    fn from_json(map: &Map<String, Value>) -> Self {
        let mut style = Self::empty();
        for (property, value) in map {
            match value {
                Value::String(s) => style.set(property.clone(), s.clone()),
                Value::Number(n) => style.set(property.clone(), n.to_string()),
                _ => tracing::debug!(property = %property, "Ignoring non-scalar style value"),
            }
        }
        style
    }
}

impl Serialize for ContainerStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Registry-wide widget defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToastDefaults {
    pub animation: bool,
    pub autohide: bool,
    pub delay_ms: u64,
}

impl Default for ToastDefaults {
    fn default() -> Self {
        Self {
            animation: DEFAULT_ANIMATION,
            autohide: DEFAULT_AUTOHIDE,
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

/// Constructor-level configuration layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    pub animation: Option<bool>,
    pub autohide: Option<bool>,
    pub delay_ms: Option<u64>,
    /// Merged key by key into the default container style.
    pub style: ContainerStyle,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            animation: None,
            autohide: None,
            delay_ms: None,
            style: ContainerStyle::empty(),
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a loose `{animation, autohide, delay, style}` object.
    pub fn from_value(value: &Value) -> Self {
        let map = filtered(value, REGISTRY_KEYS);
        let style = match map.get("style") {
            Some(Value::Object(style)) => ContainerStyle::from_json(style),
            _ => ContainerStyle::empty(),
        };
        Self {
            animation: get_bool(&map, "animation"),
            autohide: get_bool(&map, "autohide"),
            delay_ms: get_millis(&map, "delay"),
            style,
        }
    }

    #[must_use]
    pub fn animation(mut self, enabled: bool) -> Self {
        self.animation = Some(enabled);
        self
    }

    #[must_use]
    pub fn autohide(mut self, enabled: bool) -> Self {
        self.autohide = Some(enabled);
        self
    }

    #[must_use]
    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    #[must_use]
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.set(property, value);
        self
    }

    /// Apply this layer over the hard defaults.
    pub fn resolve(&self) -> (ToastDefaults, ContainerStyle) {
        let base = ToastDefaults::default();
        let defaults = ToastDefaults {
            animation: self.animation.unwrap_or(base.animation),
            autohide: self.autohide.unwrap_or(base.autohide),
            delay_ms: self.delay_ms.unwrap_or(base.delay_ms),
        };
        let mut style = ContainerStyle::default();
        style.merge(&self.style);
        (defaults, style)
    }
}

/// Per-toast options for `send`.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOptions {
    pub title: Option<String>,
    pub body: Option<String>,
    pub time: Option<String>,
    /// Extra classes, whitespace separated.
    pub class: Option<String>,
    pub id: Option<String>,
    pub close_button: bool,
    pub insertion: InsertionMode,
    pub animation: Option<bool>,
    pub autohide: Option<bool>,
    pub delay_ms: Option<u64>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            title: None,
            body: None,
            time: None,
            class: None,
            id: None,
            close_button: true,
            insertion: InsertionMode::Append,
            animation: None,
            autohide: None,
            delay_ms: None,
        }
    }
}

impl SendOptions {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// Parse a loose option object using the `send` schema.
    pub fn from_value(value: &Value) -> Self {
        let map = filtered(value, SEND_KEYS);
        let insertion = match get_bool(&map, "append") {
            Some(false) => InsertionMode::Prepend,
            _ => InsertionMode::Append,
        };
        Self {
            title: get_text(&map, "title"),
            body: get_text(&map, "body"),
            time: get_text(&map, "time"),
            class: get_classes(&map, "class"),
            id: get_text(&map, "id").filter(|id| !id.is_empty()),
            close_button: get_bool(&map, "closeBtn").unwrap_or(true),
            insertion,
            animation: get_bool(&map, "animation"),
            autohide: get_bool(&map, "autohide"),
            delay_ms: get_millis(&map, "delay"),
        }
    }

    #[must_use]
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn without_close_button(mut self) -> Self {
        self.close_button = false;
        self
    }

    #[must_use]
    pub fn prepend(mut self) -> Self {
        self.insertion = InsertionMode::Prepend;
        self
    }

    #[must_use]
    pub fn animation(mut self, enabled: bool) -> Self {
        self.animation = Some(enabled);
        self
    }

    #[must_use]
    pub fn autohide(mut self, enabled: bool) -> Self {
        self.autohide = Some(enabled);
        self
    }

    #[must_use]
    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    /// Merge over the registry defaults and settle the identifier.
    pub(crate) fn resolve(self, defaults: &ToastDefaults, id: String) -> ResolvedToast {
        ResolvedToast {
            id,
            title: self.title.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            time: self.time,
            classes: self.class,
            close_button: self.close_button,
            insertion: self.insertion,
            widget: WidgetOptions {
                animation: self.animation.unwrap_or(defaults.animation),
                autohide: self.autohide.unwrap_or(defaults.autohide),
                delay_ms: self.delay_ms.unwrap_or(defaults.delay_ms),
            },
        }
    }
}

/// Partial changes applied by `update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub time: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub add_class: Option<String>,
    pub remove_class: Option<String>,
}

impl UpdateOptions {
    /// Parse a loose option object using the `update` schema.
    pub fn from_value(value: &Value) -> Self {
        let map = filtered(value, UPDATE_KEYS);
        Self {
            time: get_text(&map, "time"),
            title: get_text(&map, "title"),
            body: get_text(&map, "body"),
            add_class: get_classes(&map, "addClass"),
            remove_class: get_classes(&map, "removeClass"),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    #[must_use]
    pub fn add_class(mut self, classes: impl Into<String>) -> Self {
        self.add_class = Some(classes.into());
        self
    }

    #[must_use]
    pub fn remove_class(mut self, classes: impl Into<String>) -> Self {
        self.remove_class = Some(classes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn resolve_drops_unrecognized_keys() {
        let base = schema(&["a", "b"]);
        let layer = object(json!({ "a": 1, "zzz": true }));
        let resolved = resolve(&base, &[&layer]);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["a"], json!(1));
        assert_eq!(resolved["b"], Value::Null);
        assert!(!resolved.contains_key("zzz"));
    }

    #[test]
    fn resolve_applies_layers_lowest_priority_first() {
        let base = object(json!({ "delay": 2000, "animation": true }));
        let constructor = object(json!({ "delay": 500 }));
        let per_call = object(json!({ "delay": 100, "bogus": 1 }));
        let resolved = resolve(&base, &[&constructor, &per_call]);

        assert_eq!(resolved["delay"], json!(100));
        assert_eq!(resolved["animation"], json!(true));
        assert!(!resolved.contains_key("bogus"));
    }

    #[test]
    fn resolve_leaves_inputs_untouched() {
        let base = object(json!({ "a": 1 }));
        let layer = object(json!({ "a": 2 }));
        let _ = resolve(&base, &[&layer]);
        assert_eq!(base["a"], json!(1));
        assert_eq!(layer["a"], json!(2));
    }

    #[test]
    fn registry_config_defaults_match_hard_defaults() {
        let (defaults, style) = RegistryConfig::new().resolve();
        assert_eq!(defaults, ToastDefaults::default());
        assert!(defaults.animation);
        assert!(defaults.autohide);
        assert_eq!(defaults.delay_ms, 2000);
        assert_eq!(style.get("position"), Some("fixed"));
        assert_eq!(style.get("top"), Some("100px"));
        assert_eq!(style.get("right"), Some("0"));
        assert_eq!(style.get("width"), Some("250px"));
        assert_eq!(style.get("z-index"), Some("2000"));
    }

    #[test]
    fn registry_config_merges_style_into_container_style() {
        let config = RegistryConfig::from_value(&json!({
            "delay": 5000,
            "style": { "top": "20px", "left": "0" },
            "color": "red"
        }));
        let (defaults, style) = config.resolve();

        assert_eq!(defaults.delay_ms, 5000);
        assert_eq!(style.get("top"), Some("20px"));
        assert_eq!(style.get("left"), Some("0"));
        assert_eq!(style.get("position"), Some("fixed"));
        assert_eq!(style.get("color"), None);
    }

    #[test]
    fn wrong_typed_values_count_as_absent() {
        let config = RegistryConfig::from_value(&json!({ "animation": "yes", "delay": -5 }));
        assert_eq!(config.animation, None);
        assert_eq!(config.delay_ms, None);
    }

    #[test]
    fn non_object_layer_yields_empty_config() {
        let config = RegistryConfig::from_value(&json!([1, 2, 3]));
        assert_eq!(config, RegistryConfig::new());
    }

    #[test]
    fn send_options_parse_schema_keys() {
        let options = SendOptions::from_value(&json!({
            "title": "Hi",
            "body": 42,
            "time": "just now",
            "class": ["bg-info", "big"],
            "id": "custom1",
            "closeBtn": false,
            "append": false,
            "delay": 1500,
            "onClick": "alert(1)"
        }));

        assert_eq!(options.title.as_deref(), Some("Hi"));
        assert_eq!(options.body.as_deref(), Some("42"));
        assert_eq!(options.time.as_deref(), Some("just now"));
        assert_eq!(options.class.as_deref(), Some("bg-info big"));
        assert_eq!(options.id.as_deref(), Some("custom1"));
        assert!(!options.close_button);
        assert_eq!(options.insertion, InsertionMode::Prepend);
        assert_eq!(options.delay_ms, Some(1500));
        assert_eq!(options.animation, None);
    }

    #[test]
    fn send_options_fall_back_to_registry_defaults() {
        let defaults = ToastDefaults {
            animation: false,
            autohide: true,
            delay_ms: 750,
        };
        let resolved = SendOptions::new("t", "b")
            .autohide(false)
            .resolve(&defaults, "x".into());

        assert!(!resolved.widget.animation);
        assert!(!resolved.widget.autohide);
        assert_eq!(resolved.widget.delay_ms, 750);
    }

    #[test]
    fn empty_id_is_treated_as_absent() {
        let options = SendOptions::from_value(&json!({ "title": "t", "body": "b", "id": "" }));
        assert_eq!(options.id, None);
    }

    #[test]
    fn update_options_honor_only_update_keys() {
        let options = UpdateOptions::from_value(&json!({
            "title": "C",
            "addClass": "bg-danger",
            "class": "ignored",
            "delay": 10
        }));
        assert_eq!(options.title.as_deref(), Some("C"));
        assert_eq!(options.add_class.as_deref(), Some("bg-danger"));
        assert_eq!(options.body, None);
        assert!(!options.is_empty());
        assert!(UpdateOptions::from_value(&json!({ "foo": 1 })).is_empty());
    }

    #[test]
    fn style_parse_css_skips_malformed_declarations() {
        let style = ContainerStyle::parse_css("top: 10px; nonsense; :x; left:0;");
        assert_eq!(style.len(), 2);
        assert_eq!(style.to_css(), "top: 10px; left: 0");
    }

    #[test]
    fn style_set_keeps_position_of_existing_property() {
        let mut style = ContainerStyle::default();
        style.set("top", "5px");
        assert_eq!(style.iter().nth(1), Some(("top", "5px")));
        assert_eq!(style.len(), 6);
    }
}
