use crate::program::expressions::{
    clone_boxed, clone_list, EvalFlags, Expression, ExpressionKind, ExpressionNode,
};
use crate::program::typing::visit_type_slot;
use crate::program::visitors::{visit_each, visit_list, visit_required, CloneContext, Visitor};
use crate::program::{Function, TypeDecl};
use crate::source::InputSpan;
use std::cell::RefCell;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::rc::{Rc, Weak};

/// Builtins that are parsed like calls but compiled specially.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LooksLikeCallKind {
    StaticAssert,
    Assert { verify: bool },
    Debug,
    MemZero,
    Invoke,
    Erase,
    Find,
    KeyExists,

    /// A call-shaped node without special handling.
    Generic,
}

#[derive(Debug)]
pub struct ExprLooksLikeCall {
    pub name: String,
    pub kind: LooksLikeCallKind,
    pub arguments: Vec<Expression>,
}

impl ExprLooksLikeCall {
    pub fn new(name: impl Into<String>, kind: LooksLikeCallKind) -> ExprLooksLikeCall {
        ExprLooksLikeCall {
            name: name.into(),
            kind,
            arguments: Vec::new(),
        }
    }

    fn clone_call(&self, context: &mut CloneContext) -> ExprLooksLikeCall {
        ExprLooksLikeCall {
            name: self.name.clone(),
            kind: self.kind,
            arguments: clone_list(&self.arguments, context),
        }
    }

    fn walk_arguments(&mut self, vis: &mut dyn Visitor) {
        let mut arguments = mem::take(&mut self.arguments);
        visit_list(
            &mut arguments,
            vis,
            &*self,
            |vis, call, arg, _, last| vis.pre_visit_looks_like_call_arg(call, arg, last),
            |vis, call, arg, _, last| vis.visit_looks_like_call_arg(call, arg, last),
        );
        self.arguments = arguments;
    }
}

impl ExpressionNode for ExprLooksLikeCall {
    fn node_name(&self) -> &'static str {
        "ExprLooksLikeCall"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        self.clone_call(context).into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        self.walk_arguments(vis);
    }
}

/// Call of a named function.
#[derive(Debug)]
pub struct ExprCall {
    pub name: String,
    pub arguments: Vec<Expression>,

    /// Resolved function. `None` until overloads are resolved.
    pub func: Option<Weak<RefCell<Function>>>,
}

impl ExprCall {
    pub fn new(name: impl Into<String>, arguments: Vec<Expression>) -> ExprCall {
        ExprCall {
            name: name.into(),
            arguments,
            func: None,
        }
    }

    pub fn resolved(function: &Rc<RefCell<Function>>, arguments: Vec<Expression>) -> ExprCall {
        ExprCall {
            name: function.borrow().name.clone(),
            arguments,
            func: Some(Rc::downgrade(function)),
        }
    }

    pub fn function(&self) -> Option<Rc<RefCell<Function>>> {
        self.func.as_ref().and_then(Weak::upgrade)
    }
}

impl ExpressionNode for ExprCall {
    fn node_name(&self) -> &'static str {
        "ExprCall"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprCall {
            name: self.name.clone(),
            arguments: clone_list(&self.arguments, context),
            func: self.func.clone(),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        let mut arguments = mem::take(&mut self.arguments);
        visit_list(
            &mut arguments,
            vis,
            &*self,
            |vis, call, arg, _, last| vis.pre_visit_call_arg(call, arg, last),
            |vis, call, arg, _, last| vis.visit_call_arg(call, arg, last),
        );
        self.arguments = arguments;
    }

    /// Only the builtin `panic` throws. Unresolved calls and user functions of the same name
    /// may return normally.
    fn eval_flags(&self) -> EvalFlags {
        let throws = self.function().map_or(false, |function| {
            let function = function.borrow();
            function.builtin && function.name == "panic"
        });
        if throws {
            EvalFlags::STOP_FOR_THROW
        } else {
            EvalFlags::empty()
        }
    }
}

/// A named value in a call, structure or variant initializer: `name = value`.
#[derive(Debug)]
pub struct MakeFieldDecl {
    pub name: String,
    pub value: Expression,

    /// `name <- value`.
    pub move_semantic: bool,

    pub at: InputSpan,
}

impl MakeFieldDecl {
    pub fn new(name: impl Into<String>, value: Expression) -> MakeFieldDecl {
        MakeFieldDecl {
            name: name.into(),
            at: value.at,
            value,
            move_semantic: false,
        }
    }

    pub fn clone_in(&self, context: &mut CloneContext) -> MakeFieldDecl {
        MakeFieldDecl {
            name: self.name.clone(),
            value: self.value.clone_in(context),
            move_semantic: self.move_semantic,
            at: self.at,
        }
    }
}

pub(crate) fn clone_fields(fields: &[MakeFieldDecl], context: &mut CloneContext) -> Vec<MakeFieldDecl> {
    fields.iter().map(|field| field.clone_in(context)).collect()
}

/// Call with named arguments, `name([a = 1, b = 2])`.
#[derive(Debug)]
pub struct ExprNamedCall {
    pub name: String,
    pub arguments: Vec<MakeFieldDecl>,
}

impl ExprNamedCall {
    pub fn new(name: impl Into<String>, arguments: Vec<MakeFieldDecl>) -> ExprNamedCall {
        ExprNamedCall {
            name: name.into(),
            arguments,
        }
    }
}

impl ExpressionNode for ExprNamedCall {
    fn node_name(&self) -> &'static str {
        "ExprNamedCall"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprNamedCall {
            name: self.name.clone(),
            arguments: clone_fields(&self.arguments, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        let mut arguments = mem::take(&mut self.arguments);
        visit_each(&mut arguments, vis, &*self, |vis, call, arg, _, last| {
            vis.pre_visit_named_call_arg(call, arg, last);
            visit_required(&mut arg.value, vis);
            vis.visit_named_call_arg(call, arg, last)
        });
        self.arguments = arguments;
    }
}

/// `generator<type>(...)`.
#[derive(Debug)]
pub struct ExprMakeGenerator {
    pub iter_type: Option<TypeDecl>,
    pub call: ExprLooksLikeCall,
}

impl ExprMakeGenerator {
    pub fn new(iter_type: Option<TypeDecl>, block: Option<Expression>) -> ExprMakeGenerator {
        let mut call = ExprLooksLikeCall::new("generator", LooksLikeCallKind::Generic);
        call.arguments.extend(block);
        ExprMakeGenerator { iter_type, call }
    }
}

impl Deref for ExprMakeGenerator {
    type Target = ExprLooksLikeCall;

    fn deref(&self) -> &ExprLooksLikeCall {
        &self.call
    }
}

impl DerefMut for ExprMakeGenerator {
    fn deref_mut(&mut self) -> &mut ExprLooksLikeCall {
        &mut self.call
    }
}

impl ExpressionNode for ExprMakeGenerator {
    fn node_name(&self) -> &'static str {
        "ExprMakeGenerator"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprMakeGenerator {
            iter_type: self.iter_type.clone(),
            call: self.call.clone_call(context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        if let Some(ref mut iter_type) = self.iter_type {
            visit_type_slot(iter_type, vis);
        }
        self.call.walk_arguments(vis);
    }
}

/// `yield subexpr` inside a generator.
#[derive(Debug)]
pub struct ExprYield {
    pub subexpr: Box<Expression>,
    pub move_semantics: bool,
}

impl ExprYield {
    pub fn new(subexpr: Expression) -> ExprYield {
        ExprYield {
            subexpr: Box::new(subexpr),
            move_semantics: false,
        }
    }
}

impl ExpressionNode for ExprYield {
    fn node_name(&self) -> &'static str {
        "ExprYield"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprYield {
            subexpr: clone_boxed(&self.subexpr, context),
            move_semantics: self.move_semantics,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.subexpr, vis);
    }
}

/// String interpolation, `"a={a} b={b}"`.
#[derive(Debug)]
pub struct ExprStringBuilder {
    pub elements: Vec<Expression>,
}

impl ExprStringBuilder {
    pub fn new(elements: Vec<Expression>) -> ExprStringBuilder {
        ExprStringBuilder { elements }
    }
}

impl ExpressionNode for ExprStringBuilder {
    fn node_name(&self) -> &'static str {
        "ExprStringBuilder"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprStringBuilder {
            elements: clone_list(&self.elements, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        let mut elements = mem::take(&mut self.elements);
        visit_list(
            &mut elements,
            vis,
            &*self,
            |vis, builder, element, _, last| vis.pre_visit_string_builder_element(builder, element, last),
            |vis, builder, element, _, last| vis.visit_string_builder_element(builder, element, last),
        );
        self.elements = elements;
    }
}
