//! Compiler core of the scripting language: the expression tree, declarations grouped into
//! modules, and the `Program` that resolves names and optimizes the tree.
//!
//! The grammar drives `builder::ParseContext` to build a program. Inference and code generation
//! work on the result.

pub mod builder;
pub mod errors;
pub mod program;
pub mod source;
pub mod utils;

pub use crate::builder::ParseContext;
pub use crate::errors::{CompilationError, CompilationErrorKind};
pub use crate::program::Program;
