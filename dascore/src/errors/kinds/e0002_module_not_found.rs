use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn module_not_found(name: &str, location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::ModuleNotFound,
        format!("required module `{}` not found", name),
    )
    .with_location(location)
    .with_subtitle("unknown module")
}
