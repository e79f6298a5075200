//! The toast registry and its first-write-wins slot.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::mpsc;

use crate::config::{ContainerStyle, RegistryConfig, SendOptions, ToastDefaults, UpdateOptions};
use crate::container;
use crate::error::ToastError;
use crate::id;
use crate::lifecycle::ToastController;
use crate::surface::{NodeId, PresentationSurface, SurfaceError, SurfaceEvent};
use crate::toast::{ToastState, ToastSummary};

/// Shared handle to the registry held by a [`RegistrySlot`].
pub type RegistryHandle<S> = Arc<Mutex<ToastRegistry<S>>>;

/// Owns the surface, the container, the defaults, and every live toast.
#[derive(Debug)]
pub struct ToastRegistry<S> {
    defaults: ToastDefaults,
    style: ContainerStyle,
    surface: S,
    container: Option<NodeId>,
    controller: ToastController,
}

impl<S: PresentationSurface> ToastRegistry<S> {
    /// Resolve `config` over the hard defaults. Nothing is rendered until the
    /// first toast is sent.
    pub fn new(config: &RegistryConfig, surface: S) -> Self {
        let (defaults, style) = config.resolve();
        tracing::info!(
            animation = defaults.animation,
            autohide = defaults.autohide,
            delay_ms = defaults.delay_ms,
            "Toast registry created"
        );
        Self {
            defaults,
            style,
            surface,
            container: None,
            controller: ToastController::new(),
        }
    }

    pub fn defaults(&self) -> &ToastDefaults {
        &self.defaults
    }

    pub fn container_style(&self) -> &ContainerStyle {
        &self.style
    }

    /// Container node, if one has been ensured.
    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Make sure the container exists in the surface.
    pub fn ensure_container(&mut self) -> Result<NodeId, SurfaceError> {
        let node = container::ensure_container(&mut self.surface, &self.style)?;
        self.container = Some(node);
        Ok(node)
    }

    /// Show a new toast and return its identifier.
    ///
    /// Never fails: a missing title or body is logged and rendered empty, and
    /// surface failures are logged.
    pub fn send(&mut self, options: SendOptions) -> String {
        let container = self.ensure_container();

        if options.title.is_none() {
            tracing::error!("{}", ToastError::MissingRequiredField("title"));
        }
        if options.body.is_none() {
            tracing::error!("{}", ToastError::MissingRequiredField("body"));
        }

        let id = options.id.clone().unwrap_or_else(id::generate);
        let toast = options.resolve(&self.defaults, id);

        match container {
            Ok(container) => self.controller.send(&mut self.surface, container, toast),
            Err(e) => {
                tracing::error!(id = %toast.id, "Toast not shown: {}", ToastError::from(e));
                toast.id
            }
        }
    }

    /// Change parts of a live toast. Returns `false` if no toast has `id`.
    pub fn update(&mut self, id: &str, options: &UpdateOptions) -> bool {
        self.controller.update(&mut self.surface, id, options)
    }

    /// Hide a live toast; it is deleted once the hide completes. Returns
    /// `false` if no toast has `id`.
    pub fn remove(&mut self, id: &str) -> bool {
        self.controller.remove(&mut self.surface, id)
    }

    /// Feed a surface event to the lifecycle controller.
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        tracing::debug!(?event, "Surface event");
        self.controller.handle_event(&mut self.surface, event);
    }

    /// Handle every event already waiting on `events`. Returns how many were
    /// handled.
    pub fn drain_events(&mut self, events: &mut mpsc::UnboundedReceiver<SurfaceEvent>) -> usize {
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn live_toasts(&self) -> Vec<ToastSummary> {
        self.controller.summaries()
    }

    pub fn state_of(&self, id: &str) -> Option<ToastState> {
        self.controller.state_of(id)
    }

    pub fn live_count(&self) -> usize {
        self.controller.live_count()
    }
}

/// Holder of at most one registry.
///
/// The first [`get_or_create`](Self::get_or_create) call decides the
/// configuration; later calls get the same handle and their configuration is
/// ignored. Hosts keep one slot per session and hand it to whoever needs
/// toasts.
#[derive(Debug)]
pub struct RegistrySlot<S> {
    inner: RwLock<Option<RegistryHandle<S>>>,
}

impl<S> Default for RegistrySlot<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> RegistrySlot<S> {
    pub const fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Current registry, if any.
    pub fn get(&self) -> Option<RegistryHandle<S>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the held registry so the next construction starts fresh.
    pub fn reset(&self) -> Option<RegistryHandle<S>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<S: PresentationSurface> RegistrySlot<S> {
    /// Return the registry, creating it from `config` and `make_surface` if
    /// the slot is empty. `make_surface` only runs on creation.
    pub fn get_or_create<F>(&self, config: &RegistryConfig, make_surface: F) -> RegistryHandle<S>
    where
        F: FnOnce() -> S,
    {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slot.as_ref() {
            tracing::debug!("Toast registry already initialized; ignoring configuration");
            return Arc::clone(existing);
        }
        let handle = Arc::new(Mutex::new(ToastRegistry::new(config, make_surface())));
        *slot = Some(Arc::clone(&handle));
        handle
    }
}
