//! Presentation-surface capability.
//!
//! The controller never touches a real UI toolkit. It drives an element tree
//! and a show/hide widget through [`PresentationSurface`], and learns about
//! asynchronous outcomes (hide finished, close clicked, autohide elapsed)
//! from [`SurfaceEvent`]s the surface pushes onto a channel.

pub mod memory;

pub use memory::{MemorySurface, WidgetState};

use serde::{Deserialize, Serialize};

use crate::config::ContainerStyle;

/// Handle to an element owned by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Events a listener can be attached for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The hide transition finished.
    Hidden,
}

/// Notifications from the surface to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The hide transition of a widget finished. Only delivered for nodes
    /// with a [`EventKind::Hidden`] listener.
    Hidden(NodeId),
    /// The widget asked to be hidden: its close control was used or its
    /// autohide delay elapsed.
    DismissRequested(NodeId),
}

impl SurfaceEvent {
    pub fn node(&self) -> NodeId {
        match self {
            Self::Hidden(node) | Self::DismissRequested(node) => *node,
        }
    }
}

/// Options a toast widget is initialized with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetOptions {
    pub animation: bool,
    pub autohide: bool,
    pub delay_ms: u64,
}

/// Errors reported by a surface.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Widget not initialized on node {0}")]
    WidgetNotInitialized(NodeId),

    #[error("Cannot attach node {child} to {parent}")]
    InvalidAttach { parent: NodeId, child: NodeId },

    #[error("Surface unavailable: {0}")]
    Unavailable(String),
}

/// Element tree and widget operations the toast controller relies on.
///
/// Lookups only see nodes attached under [`body`](Self::body), in document
/// order. Class arguments are whitespace separated lists.
pub trait PresentationSurface {
    /// Root every visible element hangs from.
    fn body(&self) -> NodeId;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SurfaceError>;

    fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SurfaceError>;

    /// Detach and drop `node` with its subtree and listeners.
    fn remove_node(&mut self, node: NodeId) -> Result<(), SurfaceError>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), SurfaceError>;

    fn add_class(&mut self, node: NodeId, classes: &str) -> Result<(), SurfaceError>;

    fn remove_class(&mut self, node: NodeId, classes: &str) -> Result<(), SurfaceError>;

    fn set_style(&mut self, node: NodeId, style: &ContainerStyle) -> Result<(), SurfaceError>;

    /// Replace the content of `node` with `html`.
    fn set_html(&mut self, node: NodeId, html: &str) -> Result<(), SurfaceError>;

    /// First attached element carrying `class`.
    fn find_by_class(&self, class: &str) -> Option<NodeId>;

    /// First attached element carrying `class` whose `id` attribute is `id`.
    fn find_with_id(&self, class: &str, id: &str) -> Option<NodeId>;

    /// First descendant of `node` carrying `class`.
    fn find_descendant(&self, node: NodeId, class: &str) -> Option<NodeId>;

    fn on(&mut self, node: NodeId, event: EventKind) -> Result<(), SurfaceError>;

    fn off(&mut self, node: NodeId, event: EventKind) -> Result<(), SurfaceError>;

    fn init_widget(&mut self, node: NodeId, options: WidgetOptions) -> Result<(), SurfaceError>;

    fn show_widget(&mut self, node: NodeId) -> Result<(), SurfaceError>;

    /// Start hiding. Completion is reported later as [`SurfaceEvent::Hidden`].
    fn hide_widget(&mut self, node: NodeId) -> Result<(), SurfaceError>;
}
