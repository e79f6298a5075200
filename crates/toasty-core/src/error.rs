use crate::surface::SurfaceError;

/// Failures observed while handling toasts.
///
/// None of these reach callers of the toast operations: missing fields are
/// logged, unknown ids become `false`, and surface failures are logged and
/// swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ToastError {
    #[error("Toast requires a {0}")]
    MissingRequiredField(&'static str),

    #[error("No live toast with id {0}")]
    NotFound(String),

    #[error("Presentation surface failed: {0}")]
    Presentation(#[from] SurfaceError),
}
