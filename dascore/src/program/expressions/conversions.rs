use crate::program::expressions::{
    clone_boxed, clone_list, clone_optional, Expression, ExpressionKind, ExpressionNode,
};
use crate::program::typing::visit_type_slot;
use crate::program::visitors::{visit_list, visit_optional, visit_required, CloneContext, Visitor};
use crate::program::TypeDecl;
use std::mem;

/// `cast<type> subexpr`, `upcast<type> subexpr` or `reinterpret<type> subexpr`.
#[derive(Debug)]
pub struct ExprCast {
    pub subexpr: Box<Expression>,
    pub cast_type: TypeDecl,
    pub upcast: bool,
    pub reinterpret: bool,
}

impl ExprCast {
    pub fn new(subexpr: Expression, cast_type: TypeDecl) -> ExprCast {
        ExprCast {
            subexpr: Box::new(subexpr),
            cast_type,
            upcast: false,
            reinterpret: false,
        }
    }
}

impl ExpressionNode for ExprCast {
    fn node_name(&self) -> &'static str {
        "ExprCast"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprCast {
            subexpr: clone_boxed(&self.subexpr, context),
            cast_type: self.cast_type.clone(),
            upcast: self.upcast,
            reinterpret: self.reinterpret,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_type_slot(&mut self.cast_type, vis);
        visit_required(&mut self.subexpr, vis);
    }
}

/// Moves a value to the heap, `new [[...]]`.
#[derive(Debug)]
pub struct ExprAscend {
    pub subexpr: Box<Expression>,
    pub use_stack_allocation: bool,
    pub need_type_info: bool,
}

impl ExprAscend {
    pub fn new(subexpr: Expression) -> ExprAscend {
        ExprAscend {
            subexpr: Box::new(subexpr),
            use_stack_allocation: false,
            need_type_info: false,
        }
    }
}

impl ExpressionNode for ExprAscend {
    fn node_name(&self) -> &'static str {
        "ExprAscend"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprAscend {
            subexpr: clone_boxed(&self.subexpr, context),
            use_stack_allocation: self.use_stack_allocation,
            need_type_info: self.need_type_info,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.subexpr, vis);
    }
}

/// Heap allocation `new type(arguments)`.
#[derive(Debug)]
pub struct ExprNew {
    pub type_: TypeDecl,
    pub arguments: Vec<Expression>,

    /// Arguments are passed to an initializer function rather than stored field by field.
    pub initializer: bool,
}

impl ExprNew {
    pub fn new(type_: TypeDecl, arguments: Vec<Expression>) -> ExprNew {
        ExprNew {
            type_,
            arguments,
            initializer: false,
        }
    }
}

impl ExpressionNode for ExprNew {
    fn node_name(&self) -> &'static str {
        "ExprNew"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprNew {
            type_: self.type_.clone(),
            arguments: clone_list(&self.arguments, context),
            initializer: self.initializer,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_type_slot(&mut self.type_, vis);
        let mut arguments = mem::take(&mut self.arguments);
        visit_list(
            &mut arguments,
            vis,
            &*self,
            |vis, new, arg, _, last| vis.pre_visit_new_arg(new, arg, last),
            |vis, new, arg, _, last| vis.visit_new_arg(new, arg, last),
        );
        self.arguments = arguments;
    }
}

/// `delete subexpr`.
#[derive(Debug)]
pub struct ExprDelete {
    pub subexpr: Box<Expression>,

    /// Deletes native memory, skipping finalizers.
    pub native: bool,
}

impl ExprDelete {
    pub fn new(subexpr: Expression) -> ExprDelete {
        ExprDelete {
            subexpr: Box::new(subexpr),
            native: false,
        }
    }
}

impl ExpressionNode for ExprDelete {
    fn node_name(&self) -> &'static str {
        "ExprDelete"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprDelete {
            subexpr: clone_boxed(&self.subexpr, context),
            native: self.native,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.subexpr, vis);
    }
}

/// `subexpr is type`, a compile-time type test.
#[derive(Debug)]
pub struct ExprIs {
    pub subexpr: Box<Expression>,
    pub type_: TypeDecl,
}

impl ExprIs {
    pub fn new(subexpr: Expression, type_: TypeDecl) -> ExprIs {
        ExprIs {
            subexpr: Box::new(subexpr),
            type_,
        }
    }
}

impl ExpressionNode for ExprIs {
    fn node_name(&self) -> &'static str {
        "ExprIs"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprIs {
            subexpr: clone_boxed(&self.subexpr, context),
            type_: self.type_.clone(),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.subexpr, vis);
        vis.pre_visit_is_type(self, &self.type_);
        visit_type_slot(&mut self.type_, vis);
    }
}

/// `typeinfo(trait<subtrait;extratrait> subexpr)` or the same over an explicit type.
#[derive(Debug)]
pub struct ExprTypeInfo {
    pub trait_: String,
    pub subtrait: String,
    pub extratrait: String,
    pub subexpr: Option<Box<Expression>>,
    pub type_: Option<TypeDecl>,
}

impl ExprTypeInfo {
    pub fn new(trait_: impl Into<String>, subexpr: Expression) -> ExprTypeInfo {
        ExprTypeInfo {
            trait_: trait_.into(),
            subtrait: String::new(),
            extratrait: String::new(),
            subexpr: Some(Box::new(subexpr)),
            type_: None,
        }
    }

    pub fn of_type(trait_: impl Into<String>, type_: TypeDecl) -> ExprTypeInfo {
        ExprTypeInfo {
            trait_: trait_.into(),
            subtrait: String::new(),
            extratrait: String::new(),
            subexpr: None,
            type_: Some(type_),
        }
    }
}

impl ExpressionNode for ExprTypeInfo {
    fn node_name(&self) -> &'static str {
        "ExprTypeInfo"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprTypeInfo {
            trait_: self.trait_.clone(),
            subtrait: self.subtrait.clone(),
            extratrait: self.extratrait.clone(),
            subexpr: clone_optional(&self.subexpr, context),
            type_: self.type_.clone(),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        if let Some(ref mut type_) = self.type_ {
            visit_type_slot(type_, vis);
        }
        visit_optional(&mut self.subexpr, vis);
    }
}
