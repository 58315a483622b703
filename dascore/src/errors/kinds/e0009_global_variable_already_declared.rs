use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn global_variable_already_declared(
    name: &str,
    location: InputSpan,
    previous: Option<InputSpan>,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::GlobalVariableAlreadyDeclared,
        format!("global variable `{}` is already declared", name),
    )
    .with_location(location)
    .with_subtitle("redeclared here")
    .maybe_with_bound_note(previous, || "previously declared here")
}
