use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn enumeration_value_already_declared(
    enumeration: &str,
    value: &str,
    location: InputSpan,
) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::EnumerationValueAlreadyDeclared,
        format!(
            "enumeration value `{}` is already declared in `{}`",
            value, enumeration
        ),
    )
    .with_location(location)
    .with_subtitle("duplicate value name")
}
