use crate::errors::{candidates_note, CompilationError, CompilationErrorKind, DeclarationKind};
use crate::source::InputSpan;

pub fn structure_ambiguous(
    name: &str,
    candidates: &[String],
    location: InputSpan,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::StructureNotFound,
        format!("too many options for `{}`", name),
    )
    .with_location(location)
    .with_subtitle("ambiguous structure name")
    .with_extra(candidates_note(DeclarationKind::Structure, candidates))
    .with_fixme("use a module-qualified name, e.g. `module::name`")
}
