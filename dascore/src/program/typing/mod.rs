//! Structural type descriptors.

mod base_type;
mod type_decl;

pub use base_type::BaseType;
pub use type_decl::{TypeDecl, DIM_AUTO};

pub(crate) use type_decl::visit_type_slot;
