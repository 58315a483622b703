use crate::errors::{CompilationError, CompilationErrorKind};

pub fn optimization_macro_failed(module: &str, macro_name: &str) -> CompilationError {
    CompilationError::new(
        CompilationErrorKind::OptimizationMacroFailed,
        format!("optimization macro {}::{} failed", module, macro_name),
    )
}
