//! Toast notification manager.
//!
//! A single [`ToastRegistry`] owns the stacking container and the default
//! widget options. Toasts are built on an injected [`PresentationSurface`],
//! shown with the resolved options, and deleted once the surface reports
//! that the hide transition finished.

pub mod config;
pub mod container;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod registry;
pub mod surface;
pub mod toast;

#[cfg(test)]
mod tests;

pub use config::{ContainerStyle, RegistryConfig, SendOptions, ToastDefaults, UpdateOptions};
pub use error::ToastError;
pub use registry::{RegistryHandle, RegistrySlot, ToastRegistry};
pub use surface::{
    EventKind, MemorySurface, NodeId, PresentationSurface, SurfaceError, SurfaceEvent,
    WidgetOptions,
};
pub use toast::{InsertionMode, ToastState, ToastSummary};
