//! The expression tree.
//!
//! Every node kind is a variant of the closed `ExpressionKind` type. `Expression` wraps a kind
//! with the state shared by all nodes: source location, inferred type and generation flags.
//!
//! Children are owned exclusively by their parent. Links to declarations (variables, functions,
//! structure fields) are lookups, never ownership.

mod access;
mod block;
mod calls;
mod constants;
mod control;
mod conversions;
mod let_;
mod make;
mod operators;

pub use access::*;
pub use block::*;
pub use calls::*;
pub use constants::*;
pub use control::*;
pub use conversions::*;
pub use let_::*;
pub use make::*;
pub use operators::*;

use crate::program::visitors::{dispatch_post, dispatch_pre, CloneContext, Rewrite, Visitor};
use crate::program::{BaseType, TypeDecl};
use crate::source::InputSpan;
use bitflags::bitflags;
use enum_dispatch::enum_dispatch;

bitflags! {
    /// How evaluating an expression may leave the enclosing flow.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EvalFlags: u32 {
        const STOP_FOR_RETURN = 1 << 0;
        const STOP_FOR_BREAK = 1 << 1;
        const STOP_FOR_CONTINUE = 1 << 2;
        const STOP_FOR_THROW = 1 << 3;
        const JUMP_TO_LABEL = 1 << 4;
    }
}

impl EvalFlags {
    /// Flags after which the rest of a statement list is unreachable.
    pub fn stops_flow(self) -> bool {
        self.intersects(
            EvalFlags::STOP_FOR_RETURN
                | EvalFlags::STOP_FOR_BREAK
                | EvalFlags::STOP_FOR_CONTINUE
                | EvalFlags::STOP_FOR_THROW,
        )
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GenFlags: u32 {
        const ALWAYS_SAFE = 1 << 0;
        const GENERATED = 1 << 1;
        const USER_SAID_ITS_SAFE = 1 << 2;
    }
}

/// A node of the expression tree.
#[derive(Debug)]
pub struct Expression {
    pub at: InputSpan,

    /// Type of the value. `None` until inference runs.
    pub type_: Option<TypeDecl>,

    pub gen_flags: GenFlags,
    pub kind: ExpressionKind,
}

impl Expression {
    pub fn new(at: InputSpan, kind: impl Into<ExpressionKind>) -> Expression {
        Expression {
            at,
            type_: None,
            gen_flags: GenFlags::empty(),
            kind: kind.into(),
        }
    }

    pub fn with_type(self, type_: TypeDecl) -> Expression {
        Expression {
            type_: Some(type_),
            ..self
        }
    }

    /// A literal, typed after its value.
    pub fn const_value(at: InputSpan, value: ConstValue) -> Expression {
        Expression::new(at, ExprConstValue { value }).with_type(TypeDecl::new(value.base_type()))
    }

    pub fn const_string(at: InputSpan, value: impl Into<String>) -> Expression {
        Expression::new(
            at,
            ExprConstString {
                value: value.into(),
            },
        )
        .with_type(TypeDecl::new(BaseType::String))
    }

    pub fn as_const_value(&self) -> Option<ConstValue> {
        match self.kind {
            ExpressionKind::ConstValue(ref constant) => Some(constant.value),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&ExprBlock> {
        match self.kind {
            ExpressionKind::Block(ref block) => Some(block),
            _ => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut ExprBlock> {
        match self.kind {
            ExpressionKind::Block(ref mut block) => Some(block),
            _ => None,
        }
    }

    pub fn node_name(&self) -> &'static str {
        self.kind.node_name()
    }

    /// Traverses the subtree, giving the visitor a chance to rewrite every node.
    ///
    /// The returned value tells the parent what to do with this node. Parents handle it,
    /// so callers holding a root should apply it themselves, see `Rewrite::apply`.
    pub fn visit(&mut self, vis: &mut dyn Visitor) -> Rewrite {
        dispatch_pre(vis, self);
        self.kind.walk(vis);
        dispatch_post(vis, self)
    }

    /// Copies the subtree. Variables declared inside it are copied too, and references to them
    /// are redirected to the copies.
    pub fn clone_in(&self, context: &mut CloneContext) -> Expression {
        Expression {
            at: self.at,
            type_: self.type_.clone(),
            gen_flags: self.gen_flags,
            kind: self.kind.clone_node(context),
        }
    }

    pub fn deep_clone(&self) -> Expression {
        self.clone_in(&mut CloneContext::new())
    }

    /// Moves the node out, leaving a null pointer constant in its place.
    pub fn take(&mut self) -> Expression {
        let at = self.at;
        std::mem::replace(self, Expression::new(at, ExprConstPtr))
    }

    pub fn eval_flags(&self) -> EvalFlags {
        self.kind.eval_flags()
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::ConstValue(_)
                | ExpressionKind::ConstString(_)
                | ExpressionKind::ConstEnumeration(_)
                | ExpressionKind::ConstPtr(_)
        )
    }

    /// Short human-readable description, used in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            ExpressionKind::Op1(ref op) => describe_call(&op.op, &[&op.subexpr]),
            ExpressionKind::Op2(ref op) => describe_call(&op.op, &[&op.left, &op.right]),
            ExpressionKind::Op3(ref op) => {
                describe_call(&op.op, &[&op.subexpr, &op.left, &op.right])
            }
            ExpressionKind::LooksLikeCall(ref call) => describe_call(&call.name, &call.arguments),
            ExpressionKind::Call(ref call) => describe_call(&call.name, &call.arguments),
            ExpressionKind::Var(ref var) => var.name.clone(),
            ExpressionKind::ConstValue(ref constant) => constant.value.to_string(),
            ExpressionKind::ConstString(ref constant) => format!("\"{}\"", constant.value),
            _ => self.node_name().to_string(),
        }
    }
}

impl Clone for Expression {
    fn clone(&self) -> Expression {
        self.deep_clone()
    }
}

impl AsMut<Expression> for Expression {
    fn as_mut(&mut self) -> &mut Expression {
        self
    }
}

fn describe_call<E: AsRef<Expression>>(name: &str, arguments: &[E]) -> String {
    let types: Vec<_> = arguments
        .iter()
        .map(|arg| match arg.as_ref().type_ {
            Some(ref type_) => type_.to_string(),
            None => "???".to_string(),
        })
        .collect();
    format!("{} ( {} )", name, types.join(", "))
}

impl AsRef<Expression> for Expression {
    fn as_ref(&self) -> &Expression {
        self
    }
}

/// Common behavior of all node kinds.
#[enum_dispatch(ExpressionKind)]
pub trait ExpressionNode {
    /// Name of the node kind, e.g. `ExprOp2`.
    fn node_name(&self) -> &'static str;

    /// Copies the node and its subtree.
    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind;

    /// Visits the children of the node in their fixed order, calling the slot hooks on the way.
    ///
    /// The node's own hooks are called by `Expression::visit`.
    fn walk(&mut self, vis: &mut dyn Visitor);

    fn eval_flags(&self) -> EvalFlags {
        EvalFlags::empty()
    }
}

#[enum_dispatch]
#[derive(Debug)]
pub enum ExpressionKind {
    Label(ExprLabel),
    Goto(ExprGoto),
    Ref2Value(ExprRef2Value),
    Ref2Ptr(ExprRef2Ptr),
    Ptr2Ref(ExprPtr2Ref),
    Addr(ExprAddr),
    NullCoalescing(ExprNullCoalescing),
    LooksLikeCall(ExprLooksLikeCall),
    Call(ExprCall),
    NamedCall(ExprNamedCall),
    MakeGenerator(ExprMakeGenerator),
    New(ExprNew),
    Yield(ExprYield),
    MakeBlock(ExprMakeBlock),
    Is(ExprIs),
    TypeInfo(ExprTypeInfo),
    Delete(ExprDelete),
    Cast(ExprCast),
    Ascend(ExprAscend),
    At(ExprAt),
    SafeAt(ExprSafeAt),
    Block(ExprBlock),
    Swizzle(ExprSwizzle),
    Field(ExprField),
    SafeField(ExprSafeField),
    IsVariant(ExprIsVariant),
    AsVariant(ExprAsVariant),
    SafeAsVariant(ExprSafeAsVariant),
    StringBuilder(ExprStringBuilder),
    Var(ExprVar),
    Op1(ExprOp1),
    Op2(ExprOp2),
    Op3(ExprOp3),
    Move(ExprMove),
    Clone(ExprClone),
    Copy(ExprCopy),
    Sequence(ExprSequence),
    TryCatch(ExprTryCatch),
    Return(ExprReturn),
    Break(ExprBreak),
    Continue(ExprContinue),
    IfThenElse(ExprIfThenElse),
    With(ExprWith),
    While(ExprWhile),
    For(ExprFor),
    Let(ExprLet),
    MakeStructure(ExprMakeStructure),
    MakeVariant(ExprMakeVariant),
    MakeArray(ExprMakeArray),
    MakeTuple(ExprMakeTuple),
    ArrayComprehension(ExprArrayComprehension),
    ConstValue(ExprConstValue),
    ConstString(ExprConstString),
    ConstEnumeration(ExprConstEnumeration),
    ConstPtr(ExprConstPtr),
}

pub(crate) fn clone_boxed(expression: &Expression, context: &mut CloneContext) -> Box<Expression> {
    Box::new(expression.clone_in(context))
}

pub(crate) fn clone_optional(
    expression: &Option<Box<Expression>>,
    context: &mut CloneContext,
) -> Option<Box<Expression>> {
    expression
        .as_ref()
        .map(|expression| clone_boxed(expression, context))
}

pub(crate) fn clone_list(list: &[Expression], context: &mut CloneContext) -> Vec<Expression> {
    list.iter()
        .map(|expression| expression.clone_in(context))
        .collect()
}
