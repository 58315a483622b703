use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

/// An annotation was applied to a declaration it can't be applied to.
pub fn invalid_annotation(
    message: impl Into<String>,
    annotation: &str,
    location: InputSpan,
) -> CompilationError {
    CompilationError::new(CompilationErrorKind::InvalidAnnotation, message)
        .with_location(location)
        .with_subtitle(format!("annotation `{}`", annotation))
}
