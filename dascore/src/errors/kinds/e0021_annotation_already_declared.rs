use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn annotation_already_declared(name: &str, location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::AnnotationAlreadyDeclared,
        format!("annotation `{}` is already declared", name),
    )
    .with_location(location)
    .with_subtitle("handle type name clashes with an existing annotation")
}
