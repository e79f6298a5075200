//! Toast entity types and element construction.

use serde::Serialize;

use crate::surface::{NodeId, PresentationSurface, SurfaceError, WidgetOptions};

/// Marker class carried by every toast element.
pub const TOAST_CLASS: &str = "toastyMostlyElement";
/// Class of the title region inside the header.
pub const TITLE_CLASS: &str = "toastyTitle";
/// Class of the optional time label inside the header.
pub const TIME_CLASS: &str = "toastyTime";
/// Class of the body region.
pub const BODY_CLASS: &str = "toastyBody";

/// Where a new toast goes relative to the existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertionMode {
    #[default]
    Append,
    Prepend,
}

/// Lifecycle state of a toast entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastState {
    Created,
    Visible,
    Hiding,
    Removed,
}

/// A toast after option resolution, ready to be built.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedToast {
    pub id: String,
    pub title: String,
    pub body: String,
    pub time: Option<String>,
    pub classes: Option<String>,
    pub close_button: bool,
    pub insertion: InsertionMode,
    pub widget: WidgetOptions,
}

/// Snapshot of a live toast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToastSummary {
    pub id: String,
    pub node: NodeId,
    pub title: String,
    pub body: String,
    pub time: Option<String>,
    pub state: ToastState,
    pub widget: WidgetOptions,
}

/// Markup placed inside the time region.
pub(crate) fn time_markup(time: &str) -> String {
    format!("<small>{time}</small>")
}

/// Build the element tree for `toast`. The returned root is not attached.
pub(crate) fn build<S>(surface: &mut S, toast: &ResolvedToast) -> Result<NodeId, SurfaceError>
where
    S: PresentationSurface + ?Sized,
{
    let header = surface.create_element("div");
    surface.add_class(header, "toast-header")?;

    let title = surface.create_element("strong");
    surface.add_class(title, "mr-auto")?;
    surface.add_class(title, TITLE_CLASS)?;
    surface.set_html(title, &toast.title)?;
    surface.append_child(header, title)?;

    if let Some(time) = &toast.time {
        let region = surface.create_element("span");
        surface.add_class(region, TIME_CLASS)?;
        let small = surface.create_element("small");
        surface.set_html(small, time)?;
        surface.append_child(region, small)?;
        surface.append_child(header, region)?;
    }

    if toast.close_button {
        let button = surface.create_element("button");
        surface.set_attribute(button, "type", "button")?;
        surface.add_class(button, "ml-2 mb-1 close")?;
        surface.set_attribute(button, "data-dismiss", "toast")?;
        let glyph = surface.create_element("span");
        surface.set_html(glyph, "&times;")?;
        surface.append_child(button, glyph)?;
        surface.append_child(header, button)?;
    }

    let root = surface.create_element("div");
    surface.set_attribute(root, "id", &toast.id)?;
    surface.set_attribute(root, "role", "alert")?;
    surface.add_class(root, TOAST_CLASS)?;
    surface.add_class(root, "toast")?;
    surface.add_class(root, &toast.id)?;
    if let Some(classes) = &toast.classes {
        surface.add_class(root, classes)?;
    }
    surface.append_child(root, header)?;

    let body = surface.create_element("div");
    surface.add_class(body, "toast-body")?;
    surface.add_class(body, BODY_CLASS)?;
    surface.set_html(body, &toast.body)?;
    surface.append_child(root, body)?;

    Ok(root)
}
