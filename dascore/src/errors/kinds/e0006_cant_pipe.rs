use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn cant_pipe(location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::CantPipe,
        "can only pipe into a function call",
    )
    .with_location(location)
    .with_subtitle("not a call")
}
