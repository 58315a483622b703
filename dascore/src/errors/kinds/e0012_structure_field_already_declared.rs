use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn structure_field_already_declared(
    structure: &str,
    field: &str,
    location: InputSpan,
    previous: Option<InputSpan>,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::StructureFieldAlreadyDeclared,
        format!(
            "structure field `{}` is already declared in `{}`",
            field, structure
        ),
    )
    .with_location(location)
    .with_subtitle("redeclared here")
    .maybe_with_bound_note(previous, || "previously declared here")
}
