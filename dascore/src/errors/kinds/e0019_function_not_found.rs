use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

/// More than one module registers a specialized call for `name`.
pub fn call_ambiguous(name: &str, location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::FunctionNotFound,
        format!("too many options for `{}`", name),
    )
    .with_location(location)
    .with_subtitle("several modules define this call")
}
