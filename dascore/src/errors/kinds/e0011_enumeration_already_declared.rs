use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn enumeration_already_declared(
    name: &str,
    location: InputSpan,
    previous: Option<InputSpan>,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::EnumerationAlreadyDeclared,
        format!("enumeration `{}` is already declared", name),
    )
    .with_location(location)
    .with_subtitle("redeclared here")
    .maybe_with_bound_note(previous, || "previously declared here")
}
