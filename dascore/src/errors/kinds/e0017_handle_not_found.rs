use crate::errors::{candidates_note, CompilationError, CompilationErrorKind, DeclarationKind};
use crate::source::InputSpan;

pub fn handle_ambiguous(name: &str, candidates: &[String], location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::HandleNotFound,
        format!("too many options for `{}`", name),
    )
    .with_location(location)
    .with_subtitle("ambiguous handled type name")
    .with_extra(candidates_note(DeclarationKind::Handle, candidates))
}

/// A name resolved to an annotation which does not describe a type.
pub fn not_a_handled_type(name: &str, location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::HandleNotFound,
        format!("annotation `{}` is not a handled type annotation", name),
    )
    .with_location(location)
    .with_subtitle("used as a type here")
}
