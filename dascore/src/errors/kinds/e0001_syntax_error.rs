use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn syntax_error(message: impl Into<String>, location: InputSpan) -> CompilationError {
    CompilationError::new(CompilationErrorKind::SyntaxError, message).with_location(location)
}
