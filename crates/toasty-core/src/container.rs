//! The single stacking container every toast is placed in.

use crate::config::ContainerStyle;
use crate::surface::{NodeId, PresentationSurface, SurfaceError};

/// Reserved marker class identifying the container.
pub const CONTAINER_CLASS: &str = "toastyMostlyCase";

/// Return the container, creating and attaching it on first use.
///
/// Idempotent: an existing element carrying [`CONTAINER_CLASS`] is reused and
/// the surface is left untouched.
pub fn ensure_container<S>(surface: &mut S, style: &ContainerStyle) -> Result<NodeId, SurfaceError>
where
    S: PresentationSurface + ?Sized,
{
    if let Some(existing) = surface.find_by_class(CONTAINER_CLASS) {
        return Ok(existing);
    }

    let container = surface.create_element("div");
    surface.add_class(container, CONTAINER_CLASS)?;
    surface.set_style(container, style)?;
    let body = surface.body();
    surface.append_child(body, container)?;

    tracing::info!(node = %container, style = %style.to_css(), "Toast container attached");
    Ok(container)
}
