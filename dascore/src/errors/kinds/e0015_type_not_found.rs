use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

/// A type name matched declarations of several different categories at once.
pub fn ambiguous_type_name(
    name: &str,
    candidates: &[String],
    location: InputSpan,
) -> CompilationError {
    let mut extra = String::from("candidates are:");
    for candidate in candidates {
        extra.push_str("\n    ");
        extra.push_str(candidate);
    }

    CompilationError::new(
        CompilationErrorKind::TypeNotFound,
        format!("undefined type `{}`", name),
    )
    .with_location(location)
    .with_subtitle("name refers to more than one kind of type")
    .with_extra(extra)
    .with_fixme("use a module-qualified name, e.g. `module::name`")
}
