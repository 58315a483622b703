use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn local_variable_already_declared(
    name: &str,
    location: InputSpan,
    previous: Option<InputSpan>,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::LocalVariableAlreadyDeclared,
        format!("local variable `{}` is already declared", name),
    )
    .with_location(location)
    .with_subtitle("redeclared here")
    .maybe_with_bound_note(previous, || "previously declared here")
}
