//! Toast lifecycle: build, show, update, hide, delete.
//!
//! Every toast moves through `Created → Visible → Hiding → Removed`. The
//! controller holds one `hidden` subscription per toast and releases it
//! exactly once, when the surface reports the hide finished; the element is
//! deleted at that moment and never before.

use crate::config::UpdateOptions;
use crate::error::ToastError;
use crate::surface::{
    EventKind, NodeId, PresentationSurface, SurfaceError, SurfaceEvent, WidgetOptions,
};
use crate::toast::{
    self, BODY_CLASS, InsertionMode, ResolvedToast, TIME_CLASS, TITLE_CLASS, TOAST_CLASS,
    ToastState, ToastSummary,
};

/// Which operation armed the `hidden` subscription of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subscription {
    Created,
    Removal,
}

#[derive(Debug, Clone)]
struct ToastEntry {
    id: String,
    node: NodeId,
    state: ToastState,
    subscription: Option<Subscription>,
    title: String,
    body: String,
    time: Option<String>,
    widget: WidgetOptions,
}

impl ToastEntry {
    fn summary(&self) -> ToastSummary {
        ToastSummary {
            id: self.id.clone(),
            node: self.node,
            title: self.title.clone(),
            body: self.body.clone(),
            time: self.time.clone(),
            state: self.state,
            widget: self.widget,
        }
    }
}

fn report(op: &'static str, id: &str, result: Result<(), SurfaceError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(op, id = %id, "{}", ToastError::from(e));
            false
        }
    }
}

/// Tracks live toasts and drives them through the surface.
#[derive(Debug, Default)]
pub struct ToastController {
    entries: Vec<ToastEntry>,
}

impl ToastController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build `toast` inside `container`, subscribe to its completion, and
    /// show it. Surface failures are logged; the id is returned regardless.
    pub(crate) fn send<S>(&mut self, surface: &mut S, container: NodeId, toast: ResolvedToast) -> String
    where
        S: PresentationSurface + ?Sized,
    {
        let id = toast.id.clone();
        if surface.find_with_id(TOAST_CLASS, &id).is_some() {
            tracing::warn!(id = %id, "Duplicate toast id; lookups resolve to the first match");
        }

        let node = match toast::build(surface, &toast) {
            Ok(node) => node,
            Err(e) => {
                report("build", &id, Err(e));
                return id;
            }
        };

        let attached = match toast.insertion {
            InsertionMode::Append => surface.append_child(container, node),
            InsertionMode::Prepend => surface.prepend_child(container, node),
        };
        if !report("attach", &id, attached) {
            let _ = surface.remove_node(node);
            return id;
        }

        let mut entry = ToastEntry {
            id: id.clone(),
            node,
            state: ToastState::Created,
            subscription: None,
            title: toast.title,
            body: toast.body,
            time: toast.time,
            widget: toast.widget,
        };

        if report("subscribe", &id, surface.on(node, EventKind::Hidden)) {
            entry.subscription = Some(Subscription::Created);
        }

        let shown = surface
            .init_widget(node, toast.widget)
            .and_then(|()| surface.show_widget(node));
        if report("show", &id, shown) {
            entry.state = ToastState::Visible;
        }

        tracing::info!(
            id = %id,
            node = %node,
            animation = toast.widget.animation,
            autohide = toast.widget.autohide,
            delay_ms = toast.widget.delay_ms,
            "Toast sent"
        );
        self.entries.push(entry);
        id
    }

    /// Apply `options` to the first live toast with `id`.
    pub(crate) fn update<S>(&mut self, surface: &mut S, id: &str, options: &UpdateOptions) -> bool
    where
        S: PresentationSurface + ?Sized,
    {
        let Some(node) = surface.find_with_id(TOAST_CLASS, id) else {
            tracing::debug!("{}", ToastError::NotFound(id.to_string()));
            return false;
        };
        let mut entry = self.entries.iter_mut().find(|e| e.node == node);

        if let Some(classes) = &options.add_class {
            report("add_class", id, surface.add_class(node, classes));
        }
        if let Some(classes) = &options.remove_class {
            report("remove_class", id, surface.remove_class(node, classes));
        }
        // A toast created without a time label keeps having none.
        if let Some(time) = &options.time {
            if let Some(region) = surface.find_descendant(node, TIME_CLASS) {
                let markup = toast::time_markup(time);
                if report("time", id, surface.set_html(region, &markup)) {
                    if let Some(entry) = entry.as_mut() {
                        entry.time = Some(time.clone());
                    }
                }
            }
        }
        if let Some(title) = &options.title {
            if let Some(region) = surface.find_descendant(node, TITLE_CLASS) {
                if report("title", id, surface.set_html(region, title)) {
                    if let Some(entry) = entry.as_mut() {
                        entry.title = title.clone();
                    }
                }
            }
        }
        if let Some(body) = &options.body {
            if let Some(region) = surface.find_descendant(node, BODY_CLASS) {
                if report("body", id, surface.set_html(region, body)) {
                    if let Some(entry) = entry.as_mut() {
                        entry.body = body.clone();
                    }
                }
            }
        }

        tracing::debug!(id = %id, node = %node, "Toast updated");
        true
    }

    /// Request the first live toast with `id` to hide.
    ///
    /// Returns `true` once the hide was requested, even if the surface
    /// rejected it. The element is deleted when the hide completes.
    pub(crate) fn remove<S>(&mut self, surface: &mut S, id: &str) -> bool
    where
        S: PresentationSurface + ?Sized,
    {
        let Some(node) = surface.find_with_id(TOAST_CLASS, id) else {
            tracing::debug!("{}", ToastError::NotFound(id.to_string()));
            return false;
        };

        report("unsubscribe", id, surface.off(node, EventKind::Hidden));
        if let Some(entry) = self.entries.iter_mut().find(|e| e.node == node) {
            entry.subscription = None;
            // Re-arm under the removal so the element is still deleted when
            // this hide completes.
            if report("subscribe", id, surface.on(node, EventKind::Hidden)) {
                entry.subscription = Some(Subscription::Removal);
            }
            if entry.state == ToastState::Visible {
                entry.state = ToastState::Hiding;
            }
        }

        report("hide", id, surface.hide_widget(node));
        tracing::info!(id = %id, node = %node, "Toast removal requested");
        true
    }

    /// React to a notification from the surface.
    pub(crate) fn handle_event<S>(&mut self, surface: &mut S, event: SurfaceEvent)
    where
        S: PresentationSurface + ?Sized,
    {
        match event {
            SurfaceEvent::Hidden(node) => self.complete_removal(surface, node),
            SurfaceEvent::DismissRequested(node) => self.dismiss(surface, node),
        }
    }

    fn complete_removal<S>(&mut self, surface: &mut S, node: NodeId)
    where
        S: PresentationSurface + ?Sized,
    {
        let Some(index) = self.entries.iter().position(|e| e.node == node) else {
            tracing::debug!(node = %node, "Hidden event for unknown node");
            return;
        };
        let Some(subscription) = self.entries[index].subscription else {
            tracing::debug!(node = %node, "Hidden event without subscription ignored");
            return;
        };

        let entry = self.entries.remove(index);
        report("unsubscribe", &entry.id, surface.off(node, EventKind::Hidden));
        report("delete", &entry.id, surface.remove_node(node));
        tracing::info!(
            id = %entry.id,
            node = %node,
            via_remove = subscription == Subscription::Removal,
            "Toast removed"
        );
    }

    fn dismiss<S>(&mut self, surface: &mut S, node: NodeId)
    where
        S: PresentationSurface + ?Sized,
    {
        let Some(entry) = self.entries.iter_mut().find(|e| e.node == node) else {
            return;
        };
        if entry.state != ToastState::Visible {
            tracing::debug!(id = %entry.id, state = ?entry.state, "Dismiss ignored");
            return;
        }
        if report("hide", &entry.id, surface.hide_widget(node)) {
            entry.state = ToastState::Hiding;
        }
    }

    /// Snapshot of every live toast in send order.
    pub fn summaries(&self) -> Vec<ToastSummary> {
        self.entries.iter().map(ToastEntry::summary).collect()
    }

    /// State of the first live toast with `id`.
    pub fn state_of(&self, id: &str) -> Option<ToastState> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.state)
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}
