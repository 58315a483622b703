use crate::errors::{CompilationError, CompilationErrorKind};

pub fn optimization_did_not_converge(passes: usize) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::OptimizationDidNotConverge,
        format!("optimization did not converge after {} passes", passes),
    )
    .with_free_note("an optimization macro likely keeps rewriting the same code")
    .with_fixme("raise `max_optimization_passes` or fix the macro")
}
