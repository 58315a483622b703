use crate::errors::{candidates_note, CompilationError, CompilationErrorKind, DeclarationKind};
use crate::source::InputSpan;

pub fn enumeration_not_found(name: &str, location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::EnumerationNotFound,
        format!("enumeration `{}` not found", name),
    )
    .with_location(location)
    .with_subtitle("unknown enumeration")
}

pub fn enumeration_value_not_found(
    enumeration: &str,
    value: &str,
    location: InputSpan,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::EnumerationNotFound,
        format!(
            "enumeration value `{}::{}` not found",
            enumeration, value
        ),
    )
    .with_location(location)
    .with_subtitle(format!("`{}` has no such value", enumeration))
}

pub fn enumeration_ambiguous(
    name: &str,
    candidates: &[String],
    location: InputSpan,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::EnumerationNotFound,
        format!("too many options for `{}`", name),
    )
    .with_location(location)
    .with_subtitle("ambiguous enumeration name")
    .with_extra(candidates_note(DeclarationKind::Enumeration, candidates))
}
