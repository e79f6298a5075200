//! Toast hosting: the mirrored overlay surface and its event worker.

pub mod overlay;
pub mod worker;

pub use overlay::OverlaySurface;
