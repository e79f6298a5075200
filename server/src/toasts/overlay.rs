//! Server-side document mirrored to browser overlays.
//!
//! [`OverlaySurface`] keeps the authoritative element tree in a
//! [`MemorySurface`] and broadcasts every mutation as a `toast_op` message on
//! the WebSocket channel. Widget timing (autohide delay, fade-out) runs on
//! tokio timers that report back through the surface event channel.

use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc};

use toasty_core::container::CONTAINER_CLASS;
use toasty_core::surface::WidgetState;
use toasty_core::{
    ContainerStyle, EventKind, MemorySurface, NodeId, PresentationSurface, SurfaceError,
    SurfaceEvent, WidgetOptions,
};

/// One mutation of the mirrored document.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DomOp<'a> {
    Create { node: NodeId, tag: &'a str },
    Append { parent: NodeId, child: NodeId },
    Prepend { parent: NodeId, child: NodeId },
    Remove { node: NodeId },
    SetAttribute { node: NodeId, name: &'a str, value: &'a str },
    AddClass { node: NodeId, classes: &'a str },
    RemoveClass { node: NodeId, classes: &'a str },
    SetStyle { node: NodeId, css: String },
    SetHtml { node: NodeId, html: &'a str },
    InitWidget { node: NodeId, options: WidgetOptions },
    ShowWidget { node: NodeId },
    HideWidget { node: NodeId },
}

/// Surface that mirrors its document to WebSocket clients.
pub struct OverlaySurface {
    document: MemorySurface,
    ws_tx: broadcast::Sender<String>,
    events: mpsc::UnboundedSender<SurfaceEvent>,
    runtime: tokio::runtime::Handle,
    fade: Duration,
}

impl std::fmt::Debug for OverlaySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlaySurface")
            .field("fade", &self.fade)
            .field("clients", &self.ws_tx.receiver_count())
            .finish()
    }
}

impl OverlaySurface {
    /// Must be called inside a tokio runtime; timers are spawned on it.
    pub fn new(
        ws_tx: broadcast::Sender<String>,
        events: mpsc::UnboundedSender<SurfaceEvent>,
        fade: Duration,
    ) -> Self {
        Self {
            document: MemorySurface::new(events.clone()),
            ws_tx,
            events,
            runtime: tokio::runtime::Handle::current(),
            fade,
        }
    }

    pub fn document(&self) -> &MemorySurface {
        &self.document
    }

    /// Channel mutations are broadcast on.
    pub fn ws_sender(&self) -> &broadcast::Sender<String> {
        &self.ws_tx
    }

    /// Full-state message for a newly connected overlay.
    pub fn snapshot(&self) -> Value {
        let container = self.document.find_by_class(CONTAINER_CLASS);
        let html = container
            .and_then(|node| self.document.outer_html(node))
            .unwrap_or_default();
        json!({
            "type": "toast_snapshot",
            "data": { "container": container, "html": html },
        })
    }

    fn publish(&self, op: DomOp<'_>) {
        let msg = json!({
            "type": "toast_op",
            "data": op,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        // No connected overlay is not an error.
        let _ = self.ws_tx.send(msg.to_string());
    }

    fn schedule(&self, after: Duration, event: SurfaceEvent) {
        let events = self.events.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(after).await;
            if events.send(event).is_err() {
                tracing::debug!(?event, "Toast event channel closed");
            }
        });
    }
}

impl PresentationSurface for OverlaySurface {
    fn body(&self) -> NodeId {
        self.document.body()
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let node = self.document.create_element(tag);
        self.publish(DomOp::Create { node, tag });
        node
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SurfaceError> {
        self.document.append_child(parent, child)?;
        self.publish(DomOp::Append { parent, child });
        Ok(())
    }

    fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SurfaceError> {
        self.document.prepend_child(parent, child)?;
        self.publish(DomOp::Prepend { parent, child });
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        self.document.remove_node(node)?;
        self.publish(DomOp::Remove { node });
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.document.set_attribute(node, name, value)?;
        self.publish(DomOp::SetAttribute { node, name, value });
        Ok(())
    }

    fn add_class(&mut self, node: NodeId, classes: &str) -> Result<(), SurfaceError> {
        self.document.add_class(node, classes)?;
        self.publish(DomOp::AddClass { node, classes });
        Ok(())
    }

    fn remove_class(&mut self, node: NodeId, classes: &str) -> Result<(), SurfaceError> {
        self.document.remove_class(node, classes)?;
        self.publish(DomOp::RemoveClass { node, classes });
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, style: &ContainerStyle) -> Result<(), SurfaceError> {
        self.document.set_style(node, style)?;
        self.publish(DomOp::SetStyle {
            node,
            css: style.to_css(),
        });
        Ok(())
    }

    fn set_html(&mut self, node: NodeId, html: &str) -> Result<(), SurfaceError> {
        self.document.set_html(node, html)?;
        self.publish(DomOp::SetHtml { node, html });
        Ok(())
    }

    fn find_by_class(&self, class: &str) -> Option<NodeId> {
        self.document.find_by_class(class)
    }

    fn find_with_id(&self, class: &str, id: &str) -> Option<NodeId> {
        self.document.find_with_id(class, id)
    }

    fn find_descendant(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.document.find_descendant(node, class)
    }

    fn on(&mut self, node: NodeId, event: EventKind) -> Result<(), SurfaceError> {
        self.document.on(node, event)
    }

    fn off(&mut self, node: NodeId, event: EventKind) -> Result<(), SurfaceError> {
        self.document.off(node, event)
    }

    fn init_widget(&mut self, node: NodeId, options: WidgetOptions) -> Result<(), SurfaceError> {
        self.document.init_widget(node, options)?;
        self.publish(DomOp::InitWidget { node, options });
        Ok(())
    }

    fn show_widget(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        self.document.show_widget(node)?;
        self.publish(DomOp::ShowWidget { node });
        if let Some(options) = self.document.widget_options(node) {
            if options.autohide {
                self.schedule(
                    Duration::from_millis(options.delay_ms),
                    SurfaceEvent::DismissRequested(node),
                );
            }
        }
        Ok(())
    }

    fn hide_widget(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        let was_shown = self.document.widget_state(node) == Some(WidgetState::Shown);
        // Without animation the document completes the hide itself.
        self.document.hide_widget(node)?;
        if !was_shown {
            return Ok(());
        }
        self.publish(DomOp::HideWidget { node });
        if self.document.widget_state(node) == Some(WidgetState::Hiding)
            && self.document.has_listener(node, EventKind::Hidden)
        {
            self.schedule(self.fade, SurfaceEvent::Hidden(node));
        }
        Ok(())
    }
}
