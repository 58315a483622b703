use crate::errors::{CompilationError, CompilationErrorKind};
use crate::source::InputSpan;

/// Structures contain each other by value, so none of them has a finite size.
///
/// `cycle` lists `(structure, field)` pairs in dependency order, starting with the anchor.
pub fn structure_field_cycle(cycle: &[(String, String)], location: InputSpan) -> CompilationError {
    let anchor = cycle
        .first()
        .map(|(structure, _)| structure.as_str())
        .unwrap_or("?");

    let steps: Vec<_> = cycle
        .iter()
        .map(|(structure, field)| format!("`{}` (through field `{}`)", structure, field))
        .collect();

    CompilationError::new(
        CompilationErrorKind::StructureFieldCycle,
        format!(
            "structure `{}` is a part of a structure cycle through fields",
            anchor
        ),
    )
    .with_location(location)
    .with_subtitle("field type starts a structure cycle")
    .with_free_note(format!(
        "Structure dependency cycle:\n    {}\n -> `{}`",
        steps.join("\n -> "),
        anchor
    ))
}
