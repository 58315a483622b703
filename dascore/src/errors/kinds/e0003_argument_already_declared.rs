use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn argument_already_declared(
    name: &str,
    function: &str,
    location: InputSpan,
    previous: Option<InputSpan>,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::ArgumentAlreadyDeclared,
        format!(
            "argument `{}` is already declared in function `{}`",
            name, function
        ),
    )
    .with_location(location)
    .with_subtitle("redeclared here")
    .maybe_with_bound_note(previous, || "previously declared here")
}
