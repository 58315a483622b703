use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn function_already_declared(
    name: &str,
    location: InputSpan,
    previous: Option<InputSpan>,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::FunctionAlreadyDeclared,
        format!("function `{}` is already declared", name),
    )
    .with_location(location)
    .with_subtitle("a function with the same signature already exists")
    .maybe_with_bound_note(previous, || "previously declared here")
}
