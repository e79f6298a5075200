use super::test_registry;
use crate::config::{RegistryConfig, SendOptions, UpdateOptions};
use crate::container::CONTAINER_CLASS;
use crate::id::ID_PREFIX;
use crate::registry::RegistrySlot;
use crate::surface::{MemorySurface, PresentationSurface, WidgetOptions};
use crate::toast::{BODY_CLASS, TIME_CLASS, TITLE_CLASS, TOAST_CLASS, ToastState};

fn region_html(surface: &MemorySurface, id: &str, class: &str) -> Option<String> {
    let node = surface.find_with_id(TOAST_CLASS, id)?;
    let region = surface.find_descendant(node, class)?;
    surface.html(region).map(str::to_string)
}

#[test]
fn send_builds_one_toast_with_default_options() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());

    let id = registry.send(SendOptions::new("Hi", "World"));

    assert!(id.starts_with(ID_PREFIX));
    let surface = registry.surface();
    let container = registry.container().expect("container ensured");
    let toasts = surface.children(container);
    assert_eq!(toasts.len(), 1);
    assert_eq!(surface.attribute(toasts[0], "id"), Some(id.as_str()));
    assert_eq!(region_html(surface, &id, TITLE_CLASS).as_deref(), Some("Hi"));
    assert_eq!(region_html(surface, &id, BODY_CLASS).as_deref(), Some("World"));
    assert_eq!(
        surface.widget_options(toasts[0]),
        Some(WidgetOptions {
            animation: true,
            autohide: true,
            delay_ms: 2000,
        })
    );
    assert_eq!(registry.state_of(&id), Some(ToastState::Visible));
}

#[test]
fn send_returns_explicit_id() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());

    let id = registry.send(SendOptions::new("A", "B").with_id("custom1"));

    assert_eq!(id, "custom1");
    let node = registry.surface().find_with_id(TOAST_CLASS, "custom1").unwrap();
    assert!(registry.surface().has_class(node, "custom1"));
    assert!(registry.surface().has_class(node, "toast"));
    assert_eq!(registry.surface().attribute(node, "role"), Some("alert"));
}

#[test]
fn distinct_explicit_ids_round_trip() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());
    for wanted in ["a1", "b2", "c3", "with-dash", "x_y"] {
        assert_eq!(registry.send(SendOptions::new("t", "b").with_id(wanted)), wanted);
    }
    assert_eq!(registry.live_count(), 5);
}

#[test]
fn generated_ids_differ_between_sends() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());
    let first = registry.send(SendOptions::new("t", "b"));
    let second = registry.send(SendOptions::new("t", "b"));
    assert_ne!(first, second);
}

#[test]
fn update_changes_title_only() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());
    registry.send(SendOptions::new("A", "B").with_id("custom1"));

    assert!(registry.update("custom1", &UpdateOptions::default().title("C")));

    let surface = registry.surface();
    assert_eq!(region_html(surface, "custom1", TITLE_CLASS).as_deref(), Some("C"));
    assert_eq!(region_html(surface, "custom1", BODY_CLASS).as_deref(), Some("B"));
    assert_eq!(registry.live_toasts()[0].title, "C");
}

#[test]
fn update_unknown_id_returns_false_and_mutates_nothing() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());
    let id = registry.send(SendOptions::new("A", "B"));
    let before = registry.surface().outer_html(registry.surface().body());

    assert!(!registry.update("nope", &UpdateOptions::default().title("C")));

    assert_eq!(registry.surface().outer_html(registry.surface().body()), before);
    assert_eq!(region_html(registry.surface(), &id, TITLE_CLASS).as_deref(), Some("A"));
}

#[test]
fn update_applies_classes_and_time() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());
    registry.send(
        SendOptions::new("A", "B")
            .with_id("t1")
            .with_time("just now")
            .with_class("bg-info"),
    );

    let changed = registry.update(
        "t1",
        &UpdateOptions::default()
            .time("2 mins ago")
            .add_class("bg-danger shake")
            .remove_class("bg-info")
            .body("new body"),
    );

    assert!(changed);
    let surface = registry.surface();
    let node = surface.find_with_id(TOAST_CLASS, "t1").unwrap();
    assert!(surface.has_class(node, "bg-danger"));
    assert!(surface.has_class(node, "shake"));
    assert!(!surface.has_class(node, "bg-info"));
    assert_eq!(
        region_html(surface, "t1", TIME_CLASS).as_deref(),
        Some("<small>2 mins ago</small>")
    );
    assert_eq!(region_html(surface, "t1", BODY_CLASS).as_deref(), Some("new body"));
}

#[test]
fn update_cannot_add_a_missing_time_label() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());
    registry.send(SendOptions::new("A", "B").with_id("t1"));

    assert!(registry.update("t1", &UpdateOptions::default().time("later")));

    let node = registry.surface().find_with_id(TOAST_CLASS, "t1").unwrap();
    assert!(registry.surface().find_descendant(node, TIME_CLASS).is_none());
    assert_eq!(registry.live_toasts()[0].time, None);
}

#[test]
fn remove_hides_then_deletes_on_completion() {
    let (mut registry, mut rx) = test_registry(RegistryConfig::new());
    registry.send(SendOptions::new("A", "B").with_id("custom1"));
    let node = registry.surface().find_with_id(TOAST_CLASS, "custom1").unwrap();

    assert!(registry.remove("custom1"));
    assert_eq!(registry.state_of("custom1"), Some(ToastState::Hiding));
    assert!(registry.surface().contains(node));

    registry.surface_mut().finish_transitions();
    assert_eq!(registry.drain_events(&mut rx), 1);

    assert!(!registry.surface().contains(node));
    assert_eq!(registry.live_count(), 0);
    let container = registry.container().unwrap();
    assert!(registry.surface().children(container).is_empty());
}

#[test]
fn remove_unknown_id_returns_false() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());
    assert!(!registry.remove("ghost"));
    registry.send(SendOptions::new("A", "B").with_id("real"));
    assert!(!registry.remove("ghost"));
}

#[test]
fn second_construction_keeps_first_defaults() {
    let slot = RegistrySlot::new();
    let first = slot.get_or_create(
        &RegistryConfig::new().delay_ms(3000).style("top", "10px"),
        || MemorySurface::channel().0,
    );
    let second = slot.get_or_create(
        &RegistryConfig::new()
            .delay_ms(1)
            .autohide(false)
            .style("top", "999px"),
        || MemorySurface::channel().0,
    );

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    let mut registry = second.lock().unwrap();
    assert_eq!(registry.defaults().delay_ms, 3000);
    assert!(registry.defaults().autohide);

    registry.send(SendOptions::new("A", "B"));
    let container = registry.container().unwrap();
    assert_eq!(registry.surface().style(container).unwrap().get("top"), Some("10px"));
}

#[test]
fn container_is_created_once_across_sends() {
    let (mut registry, _rx) = test_registry(RegistryConfig::new());
    registry.send(SendOptions::new("1", "1"));
    registry.send(SendOptions::new("2", "2"));
    registry.ensure_container().unwrap();

    assert_eq!(registry.surface().all_with_class(CONTAINER_CLASS).len(), 1);
    assert_eq!(registry.surface().all_with_class(TOAST_CLASS).len(), 2);
}
