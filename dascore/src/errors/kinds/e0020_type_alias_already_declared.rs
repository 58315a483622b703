use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

pub fn type_alias_already_declared(name: &str, location: InputSpan) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::TypeAliasAlreadyDeclared,
        format!("type alias `{}` is already declared", name),
    )
    .with_location(location)
    .with_subtitle("redeclared here")
}
