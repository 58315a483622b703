mod clone;
mod visitor;

pub use clone::CloneContext;
pub use visitor::{Rewrite, Visitor};

pub(crate) use visitor::{
    dispatch_post, dispatch_pre, visit_each, visit_list, visit_optional, visit_required,
    visit_variable, visit_variables,
};
