mod e0001_syntax_error;
mod e0002_module_not_found;
mod e0003_argument_already_declared;
mod e0004_invalid_annotation;
mod e0005_function_already_declared;
mod e0006_cant_pipe;
mod e0007_local_variable_already_declared;
mod e0008_enumeration_not_found;
mod e0009_global_variable_already_declared;
mod e0010_enumeration_value_already_declared;
mod e0011_enumeration_already_declared;
mod e0012_structure_field_already_declared;
mod e0013_structure_already_declared;
mod e0014_annotation_not_found;
mod e0015_type_not_found;
mod e0016_structure_not_found;
mod e0017_handle_not_found;
mod e0018_type_alias_not_found;
mod e0019_function_not_found;
mod e0020_type_alias_already_declared;
mod e0021_annotation_already_declared;
mod e0022_structure_field_cycle;
mod e0023_optimization_macro_failed;
mod e0024_optimization_did_not_converge;

pub mod constructors {
    pub use super::e0001_syntax_error::*;
    pub use super::e0002_module_not_found::*;
    pub use super::e0003_argument_already_declared::*;
    pub use super::e0004_invalid_annotation::*;
    pub use super::e0005_function_already_declared::*;
    pub use super::e0006_cant_pipe::*;
    pub use super::e0007_local_variable_already_declared::*;
    pub use super::e0008_enumeration_not_found::*;
    pub use super::e0009_global_variable_already_declared::*;
    pub use super::e0010_enumeration_value_already_declared::*;
    pub use super::e0011_enumeration_already_declared::*;
    pub use super::e0012_structure_field_already_declared::*;
    pub use super::e0013_structure_already_declared::*;
    pub use super::e0014_annotation_not_found::*;
    pub use super::e0015_type_not_found::*;
    pub use super::e0016_structure_not_found::*;
    pub use super::e0017_handle_not_found::*;
    pub use super::e0018_type_alias_not_found::*;
    pub use super::e0019_function_not_found::*;
    pub use super::e0020_type_alias_already_declared::*;
    pub use super::e0021_annotation_already_declared::*;
    pub use super::e0022_structure_field_cycle::*;
    pub use super::e0023_optimization_macro_failed::*;
    pub use super::e0024_optimization_did_not_converge::*;
}
