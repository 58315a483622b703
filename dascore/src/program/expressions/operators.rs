use crate::program::expressions::{clone_boxed, Expression, ExpressionKind, ExpressionNode};
use crate::program::visitors::{visit_required, CloneContext, Visitor};
use crate::program::Function;
use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Weak;

/// Unary operator, e.g. `-x` or `!x`.
#[derive(Debug)]
pub struct ExprOp1 {
    pub op: String,
    pub subexpr: Box<Expression>,

    /// Resolved operator function.
    pub func: Option<Weak<RefCell<Function>>>,
}

impl ExprOp1 {
    pub fn new(op: impl Into<String>, subexpr: Expression) -> ExprOp1 {
        ExprOp1 {
            op: op.into(),
            subexpr: Box::new(subexpr),
            func: None,
        }
    }
}

impl ExpressionNode for ExprOp1 {
    fn node_name(&self) -> &'static str {
        "ExprOp1"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprOp1 {
            op: self.op.clone(),
            subexpr: clone_boxed(&self.subexpr, context),
            func: self.func.clone(),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.subexpr, vis);
    }
}

/// Binary operator, e.g. `a + b`.
#[derive(Debug)]
pub struct ExprOp2 {
    pub op: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub func: Option<Weak<RefCell<Function>>>,
}

impl ExprOp2 {
    pub fn new(op: impl Into<String>, left: Expression, right: Expression) -> ExprOp2 {
        ExprOp2 {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
            func: None,
        }
    }

    fn clone_op(&self, context: &mut CloneContext) -> ExprOp2 {
        ExprOp2 {
            op: self.op.clone(),
            left: clone_boxed(&self.left, context),
            right: clone_boxed(&self.right, context),
            func: self.func.clone(),
        }
    }
}

impl ExpressionNode for ExprOp2 {
    fn node_name(&self) -> &'static str {
        "ExprOp2"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        self.clone_op(context).into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.left, vis);
        vis.pre_visit_op2_right(self, &self.right);
        visit_required(&mut self.right, vis);
    }
}

/// Ternary operator `subexpr ? left : right`.
#[derive(Debug)]
pub struct ExprOp3 {
    pub op: String,
    pub subexpr: Box<Expression>,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub func: Option<Weak<RefCell<Function>>>,
}

impl ExprOp3 {
    pub fn new(
        op: impl Into<String>,
        subexpr: Expression,
        left: Expression,
        right: Expression,
    ) -> ExprOp3 {
        ExprOp3 {
            op: op.into(),
            subexpr: Box::new(subexpr),
            left: Box::new(left),
            right: Box::new(right),
            func: None,
        }
    }
}

impl ExpressionNode for ExprOp3 {
    fn node_name(&self) -> &'static str {
        "ExprOp3"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprOp3 {
            op: self.op.clone(),
            subexpr: clone_boxed(&self.subexpr, context),
            left: clone_boxed(&self.left, context),
            right: clone_boxed(&self.right, context),
            func: self.func.clone(),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.subexpr, vis);
        vis.pre_visit_op3_left(self, &self.left);
        visit_required(&mut self.left, vis);
        vis.pre_visit_op3_right(self, &self.right);
        visit_required(&mut self.right, vis);
    }
}

macro_rules! assignment_node {
    ($(#[$meta:meta])* $name:ident, $pre_right:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name(pub ExprOp2);

        impl $name {
            pub fn new(left: Expression, right: Expression) -> $name {
                $name(ExprOp2::new($name::OP, left, right))
            }
        }

        impl Deref for $name {
            type Target = ExprOp2;

            fn deref(&self) -> &ExprOp2 {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut ExprOp2 {
                &mut self.0
            }
        }

        impl ExpressionNode for $name {
            fn node_name(&self) -> &'static str {
                stringify!($name)
            }

            fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
                $name(self.0.clone_op(context)).into()
            }

            fn walk(&mut self, vis: &mut dyn Visitor) {
                visit_required(&mut self.0.left, vis);
                vis.$pre_right(self, &self.0.right);
                visit_required(&mut self.0.right, vis);
            }
        }
    };
}

assignment_node! {
    /// Move assignment `left <- right`.
    ExprMove, pre_visit_move_right
}

assignment_node! {
    /// Clone assignment `left := right`.
    ExprClone, pre_visit_clone_right
}

assignment_node! {
    /// Copy assignment `left = right`.
    ExprCopy, pre_visit_copy_right
}

impl ExprMove {
    pub const OP: &'static str = "<-";
}

impl ExprClone {
    pub const OP: &'static str = ":=";
}

impl ExprCopy {
    pub const OP: &'static str = "=";
}

/// Evaluates `left`, then `right`. Produced by the grammar for comma-separated lists.
#[derive(Debug)]
pub struct ExprSequence {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl ExprSequence {
    pub fn new(left: Expression, right: Expression) -> ExprSequence {
        ExprSequence {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl ExpressionNode for ExprSequence {
    fn node_name(&self) -> &'static str {
        "ExprSequence"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprSequence {
            left: clone_boxed(&self.left, context),
            right: clone_boxed(&self.right, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.left, vis);
        vis.pre_visit_sequence_right(self, &self.right);
        visit_required(&mut self.right, vis);
    }
}
