use crate::errors::{candidates_note, CompilationError, CompilationErrorKind, DeclarationKind};
use crate::source::InputSpan;

pub fn annotation_not_found(name: &str, location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::AnnotationNotFound,
        format!("annotation `{}` not found", name),
    )
    .with_location(location)
    .with_subtitle("unknown annotation")
}

pub fn annotation_ambiguous(
    name: &str,
    candidates: &[String],
    location: InputSpan,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::AnnotationNotFound,
        format!("too many options for annotation `{}`", name),
    )
    .with_location(location)
    .with_subtitle("ambiguous annotation name")
    .with_extra(candidates_note(DeclarationKind::Annotation, candidates))
}
