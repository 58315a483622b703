use crate::errors::{candidates_note, CompilationError, CompilationErrorKind, DeclarationKind};
use crate::source::InputSpan;

pub fn alias_ambiguous(name: &str, candidates: &[String], location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::TypeAliasNotFound,
        format!("too many options for `{}`", name),
    )
    .with_location(location)
    .with_subtitle("ambiguous type alias")
    .with_extra(candidates_note(DeclarationKind::Alias, candidates))
}
