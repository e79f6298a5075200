//! In-memory element tree implementing [`PresentationSurface`].
//!
//! Widget timing is driven by the owner: [`MemorySurface::advance`] moves the
//! autohide clocks forward, [`MemorySurface::finish_transitions`] completes
//! running hide animations, and [`MemorySurface::click_close`] simulates the
//! close control. Hides without animation complete immediately.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;

use super::{EventKind, NodeId, PresentationSurface, SurfaceError, SurfaceEvent, WidgetOptions};
use crate::config::ContainerStyle;

/// Show/hide state of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetState {
    Initialized,
    Shown,
    Hiding,
    Hidden,
}

#[derive(Debug, Clone)]
struct Widget {
    options: WidgetOptions,
    state: WidgetState,
    shown_for: Duration,
    dismiss_requested: bool,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    style: ContainerStyle,
    html: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    listeners: HashSet<EventKind>,
    widget: Option<Widget>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            style: ContainerStyle::empty(),
            html: None,
            children: Vec::new(),
            parent: None,
            listeners: HashSet::new(),
            widget: None,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Element tree kept entirely in memory.
#[derive(Debug)]
pub struct MemorySurface {
    nodes: HashMap<NodeId, Element>,
    body: NodeId,
    next_id: u64,
    events: mpsc::UnboundedSender<SurfaceEvent>,
    fail_widgets: bool,
}

impl MemorySurface {
    /// Create a surface that reports events on `events`.
    pub fn new(events: mpsc::UnboundedSender<SurfaceEvent>) -> Self {
        let body = NodeId::new(0);
        let mut nodes = HashMap::new();
        nodes.insert(body, Element::new("body"));
        Self {
            nodes,
            body,
            next_id: 1,
            events,
            fail_widgets: false,
        }
    }

    /// Create a surface together with the receiving end of its event channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SurfaceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Sender the surface reports events on.
    pub fn events(&self) -> &mpsc::UnboundedSender<SurfaceEvent> {
        &self.events
    }

    /// Make every widget call fail with [`SurfaceError::Unavailable`].
    pub fn fail_widget_calls(&mut self, fail: bool) {
        self.fail_widgets = fail;
    }

    fn element(&self, node: NodeId) -> Result<&Element, SurfaceError> {
        self.nodes.get(&node).ok_or(SurfaceError::UnknownNode(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, SurfaceError> {
        self.nodes
            .get_mut(&node)
            .ok_or(SurfaceError::UnknownNode(node))
    }

    fn widget_mut(&mut self, node: NodeId) -> Result<&mut Widget, SurfaceError> {
        if self.fail_widgets {
            return Err(SurfaceError::Unavailable("widget calls disabled".into()));
        }
        self.element_mut(node)?
            .widget
            .as_mut()
            .ok_or(SurfaceError::WidgetNotInitialized(node))
    }

    /// Descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(&root) {
            Some(element) => element.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(element) = self.nodes.get(&node) {
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes.get(&n).and_then(|e| e.parent);
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get_mut(&node).and_then(|e| e.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, front: bool) -> Result<(), SurfaceError> {
        self.element(parent)?;
        self.element(child)?;
        if child == self.body || self.is_ancestor(child, parent) {
            return Err(SurfaceError::InvalidAttach { parent, child });
        }
        self.detach(child);
        let parent_element = self.element_mut(parent)?;
        if front {
            parent_element.children.insert(0, child);
        } else {
            parent_element.children.push(child);
        }
        self.element_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn drop_subtree(&mut self, node: NodeId) {
        for descendant in self.descendants(node) {
            self.nodes.remove(&descendant);
        }
        self.nodes.remove(&node);
    }

    fn emit(&self, event: SurfaceEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!(node = %event.node(), "Surface event dropped; receiver closed");
        }
    }

    fn emit_hidden(&self, node: NodeId) {
        let listening = self
            .nodes
            .get(&node)
            .is_some_and(|e| e.listeners.contains(&EventKind::Hidden));
        if listening {
            self.emit(SurfaceEvent::Hidden(node));
        }
    }

    /// Advance every autohide clock by `elapsed`, requesting dismissal of
    /// widgets whose delay ran out.
    pub fn advance(&mut self, elapsed: Duration) {
        let mut due = Vec::new();
        for (node, element) in &mut self.nodes {
            let Some(widget) = element.widget.as_mut() else {
                continue;
            };
            if widget.state != WidgetState::Shown
                || !widget.options.autohide
                || widget.dismiss_requested
            {
                continue;
            }
            widget.shown_for += elapsed;
            if widget.shown_for >= Duration::from_millis(widget.options.delay_ms) {
                widget.dismiss_requested = true;
                due.push(*node);
            }
        }
        due.sort();
        for node in due {
            self.emit(SurfaceEvent::DismissRequested(node));
        }
    }

    /// Complete every running hide transition. Returns how many finished.
    pub fn finish_transitions(&mut self) -> usize {
        let mut finished = Vec::new();
        for (node, element) in &mut self.nodes {
            let Some(widget) = element.widget.as_mut() else {
                continue;
            };
            if widget.state == WidgetState::Hiding {
                widget.state = WidgetState::Hidden;
                finished.push(*node);
            }
        }
        finished.sort();
        for node in &finished {
            self.emit_hidden(*node);
        }
        finished.len()
    }

    /// Use the close control of the toast at `node`. Returns `false` when the
    /// toast has no close control or is not shown.
    pub fn click_close(&mut self, node: NodeId) -> bool {
        let shown = self
            .widget_state(node)
            .is_some_and(|state| state == WidgetState::Shown);
        let has_control = self
            .descendants(node)
            .iter()
            .any(|d| self.attribute(*d, "data-dismiss") == Some("toast"));
        if !shown || !has_control {
            return false;
        }
        self.emit(SurfaceEvent::DismissRequested(node));
        true
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Whether `node` hangs from the body.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node) && self.is_ancestor(self.body, node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|e| e.parent)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|e| e.tag.as_str())
    }

    pub fn html(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).and_then(|e| e.html.as_deref())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes.get(&node).is_some_and(|e| e.has_class(class))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn style(&self, node: NodeId) -> Option<&ContainerStyle> {
        self.nodes.get(&node).map(|e| &e.style)
    }

    pub fn has_listener(&self, node: NodeId, event: EventKind) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|e| e.listeners.contains(&event))
    }

    pub fn widget_state(&self, node: NodeId) -> Option<WidgetState> {
        self.nodes
            .get(&node)
            .and_then(|e| e.widget.as_ref())
            .map(|w| w.state)
    }

    pub fn widget_options(&self, node: NodeId) -> Option<WidgetOptions> {
        self.nodes
            .get(&node)
            .and_then(|e| e.widget.as_ref())
            .map(|w| w.options)
    }

    /// Attached elements carrying `class`, in document order.
    pub fn all_with_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    /// Serialize `node` and its subtree.
    pub fn outer_html(&self, node: NodeId) -> Option<String> {
        let mut out = String::new();
        self.render(node, &mut out)?;
        Some(out)
    }

    fn render(&self, node: NodeId, out: &mut String) -> Option<()> {
        let element = self.nodes.get(&node)?;
        out.push('<');
        out.push_str(&element.tag);
        for (name, value) in &element.attributes {
            push_attribute(out, name, value);
        }
        if !element.classes.is_empty() {
            push_attribute(out, "class", &element.classes.join(" "));
        }
        if !element.style.is_empty() {
            push_attribute(out, "style", &element.style.to_css());
        }
        out.push('>');
        match &element.html {
            Some(html) => out.push_str(html),
            None => {
                for child in &element.children {
                    self.render(*child, out)?;
                }
            }
        }
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
        Some(())
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&value.replace('&', "&amp;").replace('"', "&quot;"));
    out.push('"');
}

impl PresentationSurface for MemorySurface {
    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let node = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(node, Element::new(tag));
        node
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SurfaceError> {
        self.attach(parent, child, false)
    }

    fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SurfaceError> {
        self.attach(parent, child, true)
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        self.element(node)?;
        if node == self.body {
            return Err(SurfaceError::InvalidAttach {
                parent: node,
                child: node,
            });
        }
        self.detach(node);
        self.drop_subtree(node);
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn add_class(&mut self, node: NodeId, classes: &str) -> Result<(), SurfaceError> {
        let element = self.element_mut(node)?;
        for class in classes.split_whitespace() {
            if !element.has_class(class) {
                element.classes.push(class.to_string());
            }
        }
        Ok(())
    }

    fn remove_class(&mut self, node: NodeId, classes: &str) -> Result<(), SurfaceError> {
        let element = self.element_mut(node)?;
        let doomed: Vec<&str> = classes.split_whitespace().collect();
        element.classes.retain(|c| !doomed.contains(&c.as_str()));
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, style: &ContainerStyle) -> Result<(), SurfaceError> {
        self.element_mut(node)?.style.merge(style);
        Ok(())
    }

    fn set_html(&mut self, node: NodeId, html: &str) -> Result<(), SurfaceError> {
        let children = std::mem::take(&mut self.element_mut(node)?.children);
        for child in children {
            self.drop_subtree(child);
        }
        self.element_mut(node)?.html = Some(html.to_string());
        Ok(())
    }

    fn find_by_class(&self, class: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|n| self.has_class(*n, class))
    }

    fn find_with_id(&self, class: &str, id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|n| self.has_class(*n, class) && self.attribute(*n, "id") == Some(id))
    }

    fn find_descendant(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|n| self.has_class(*n, class))
    }

    fn on(&mut self, node: NodeId, event: EventKind) -> Result<(), SurfaceError> {
        self.element_mut(node)?.listeners.insert(event);
        Ok(())
    }

    fn off(&mut self, node: NodeId, event: EventKind) -> Result<(), SurfaceError> {
        self.element_mut(node)?.listeners.remove(&event);
        Ok(())
    }

    fn init_widget(&mut self, node: NodeId, options: WidgetOptions) -> Result<(), SurfaceError> {
        if self.fail_widgets {
            return Err(SurfaceError::Unavailable("widget calls disabled".into()));
        }
        self.element_mut(node)?.widget = Some(Widget {
            options,
            state: WidgetState::Initialized,
            shown_for: Duration::ZERO,
            dismiss_requested: false,
        });
        Ok(())
    }

    fn show_widget(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        let widget = self.widget_mut(node)?;
        widget.state = WidgetState::Shown;
        widget.shown_for = Duration::ZERO;
        widget.dismiss_requested = false;
        Ok(())
    }

    fn hide_widget(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        let widget = self.widget_mut(node)?;
        if widget.state != WidgetState::Shown {
            return Ok(());
        }
        if widget.options.animation {
            widget.state = WidgetState::Hiding;
        } else {
            widget.state = WidgetState::Hidden;
            self.emit_hidden(node);
        }
        Ok(())
    }
}
