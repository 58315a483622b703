//! Helpers that are not specific to the program representation.

pub mod graphs;
pub mod sexp;
