use crate::program::expressions::{
    clone_boxed, clone_optional, EvalFlags, Expression, ExpressionKind, ExpressionNode,
};
use crate::program::visitors::{visit_optional, visit_required, visit_variables, CloneContext, Visitor};
use crate::program::Variable;
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

/// Jump target inside a function body, `label 3:`.
#[derive(Debug)]
pub struct ExprLabel {
    pub label: i32,
    pub comment: String,
}

impl ExprLabel {
    pub fn new(label: i32) -> ExprLabel {
        ExprLabel {
            label,
            comment: String::new(),
        }
    }
}

impl ExpressionNode for ExprLabel {
    fn node_name(&self) -> &'static str {
        "ExprLabel"
    }

    fn clone_node(&self, _context: &mut CloneContext) -> ExpressionKind {
        ExprLabel {
            label: self.label,
            comment: self.comment.clone(),
        }
        .into()
    }

    fn walk(&mut self, _vis: &mut dyn Visitor) {}
}

/// `goto label 3` or a computed `goto subexpr`.
#[derive(Debug)]
pub struct ExprGoto {
    pub label: i32,
    pub subexpr: Option<Box<Expression>>,
}

impl ExprGoto {
    pub fn new(label: i32) -> ExprGoto {
        ExprGoto {
            label,
            subexpr: None,
        }
    }

    pub fn computed(subexpr: Expression) -> ExprGoto {
        ExprGoto {
            label: -1,
            subexpr: Some(Box::new(subexpr)),
        }
    }
}

impl ExpressionNode for ExprGoto {
    fn node_name(&self) -> &'static str {
        "ExprGoto"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprGoto {
            label: self.label,
            subexpr: clone_optional(&self.subexpr, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_optional(&mut self.subexpr, vis);
    }

    fn eval_flags(&self) -> EvalFlags {
        EvalFlags::JUMP_TO_LABEL
    }
}

#[derive(Debug)]
pub struct ExprReturn {
    pub subexpr: Option<Box<Expression>>,
    pub move_semantics: bool,

    /// Generated by `yield` lowering.
    pub from_yield: bool,
}

impl ExprReturn {
    pub fn new(subexpr: Option<Expression>) -> ExprReturn {
        ExprReturn {
            subexpr: subexpr.map(Box::new),
            move_semantics: false,
            from_yield: false,
        }
    }
}

impl ExpressionNode for ExprReturn {
    fn node_name(&self) -> &'static str {
        "ExprReturn"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprReturn {
            subexpr: clone_optional(&self.subexpr, context),
            move_semantics: self.move_semantics,
            from_yield: self.from_yield,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_optional(&mut self.subexpr, vis);
    }

    fn eval_flags(&self) -> EvalFlags {
        EvalFlags::STOP_FOR_RETURN
    }
}

#[derive(Debug)]
pub struct ExprBreak;

impl ExpressionNode for ExprBreak {
    fn node_name(&self) -> &'static str {
        "ExprBreak"
    }

    fn clone_node(&self, _context: &mut CloneContext) -> ExpressionKind {
        ExprBreak.into()
    }

    fn walk(&mut self, _vis: &mut dyn Visitor) {}

    fn eval_flags(&self) -> EvalFlags {
        EvalFlags::STOP_FOR_BREAK
    }
}

#[derive(Debug)]
pub struct ExprContinue;

impl ExpressionNode for ExprContinue {
    fn node_name(&self) -> &'static str {
        "ExprContinue"
    }

    fn clone_node(&self, _context: &mut CloneContext) -> ExpressionKind {
        ExprContinue.into()
    }

    fn walk(&mut self, _vis: &mut dyn Visitor) {}

    fn eval_flags(&self) -> EvalFlags {
        EvalFlags::STOP_FOR_CONTINUE
    }
}

/// `try { ... } recover { ... }`.
#[derive(Debug)]
pub struct ExprTryCatch {
    pub try_block: Box<Expression>,
    pub catch_block: Box<Expression>,
}

impl ExprTryCatch {
    pub fn new(try_block: Expression, catch_block: Expression) -> ExprTryCatch {
        ExprTryCatch {
            try_block: Box::new(try_block),
            catch_block: Box::new(catch_block),
        }
    }
}

impl ExpressionNode for ExprTryCatch {
    fn node_name(&self) -> &'static str {
        "ExprTryCatch"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprTryCatch {
            try_block: clone_boxed(&self.try_block, context),
            catch_block: clone_boxed(&self.catch_block, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.try_block, vis);
        vis.pre_visit_catch(self, &self.catch_block);
        visit_required(&mut self.catch_block, vis);
    }

    /// A throw inside the try block is caught, so it does not leave the node.
    fn eval_flags(&self) -> EvalFlags {
        (self.try_block.eval_flags() - EvalFlags::STOP_FOR_THROW) | self.catch_block.eval_flags()
    }
}

#[derive(Debug)]
pub struct ExprIfThenElse {
    pub cond: Box<Expression>,
    pub if_true: Box<Expression>,
    pub if_false: Option<Box<Expression>>,

    /// `static_if`, resolved at compile time.
    pub is_static: bool,
}

impl ExprIfThenElse {
    pub fn new(cond: Expression, if_true: Expression, if_false: Option<Expression>) -> ExprIfThenElse {
        ExprIfThenElse {
            cond: Box::new(cond),
            if_true: Box::new(if_true),
            if_false: if_false.map(Box::new),
            is_static: false,
        }
    }
}

impl ExpressionNode for ExprIfThenElse {
    fn node_name(&self) -> &'static str {
        "ExprIfThenElse"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprIfThenElse {
            cond: clone_boxed(&self.cond, context),
            if_true: clone_boxed(&self.if_true, context),
            if_false: clone_optional(&self.if_false, context),
            is_static: self.is_static,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.cond, vis);
        if vis.can_visit_if_subexpr(self) {
            vis.pre_visit_if_block(self, &self.if_true);
            visit_required(&mut self.if_true, vis);
            if let Some(ref if_false) = self.if_false {
                vis.pre_visit_else_block(self, if_false);
            }
            visit_optional(&mut self.if_false, vis);
        }
    }

    fn eval_flags(&self) -> EvalFlags {
        let flags = self.cond.eval_flags() | self.if_true.eval_flags();
        match self.if_false {
            Some(ref if_false) => flags | if_false.eval_flags(),
            None => flags,
        }
    }
}

/// `with subexpr { body }`: fields of `subexpr` are in scope inside `body`.
#[derive(Debug)]
pub struct ExprWith {
    pub with: Box<Expression>,
    pub body: Box<Expression>,
}

impl ExprWith {
    pub fn new(with: Expression, body: Expression) -> ExprWith {
        ExprWith {
            with: Box::new(with),
            body: Box::new(body),
        }
    }
}

impl ExpressionNode for ExprWith {
    fn node_name(&self) -> &'static str {
        "ExprWith"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprWith {
            with: clone_boxed(&self.with, context),
            body: clone_boxed(&self.body, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.with, vis);
        vis.pre_visit_with_body(self, &self.body);
        visit_required(&mut self.body, vis);
    }
}

fn loop_body_flags(body: &Expression) -> EvalFlags {
    body.eval_flags() - (EvalFlags::STOP_FOR_BREAK | EvalFlags::STOP_FOR_CONTINUE)
}

#[derive(Debug)]
pub struct ExprWhile {
    pub cond: Box<Expression>,
    pub body: Box<Expression>,
}

impl ExprWhile {
    pub fn new(cond: Expression, body: Expression) -> ExprWhile {
        ExprWhile {
            cond: Box::new(cond),
            body: Box::new(body),
        }
    }
}

impl ExpressionNode for ExprWhile {
    fn node_name(&self) -> &'static str {
        "ExprWhile"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprWhile {
            cond: clone_boxed(&self.cond, context),
            body: clone_boxed(&self.body, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.cond, vis);
        vis.pre_visit_while_body(self, &self.body);
        visit_required(&mut self.body, vis);
    }

    fn eval_flags(&self) -> EvalFlags {
        loop_body_flags(&self.body)
    }
}

/// `for a, b in xs, ys { body }`.
#[derive(Debug)]
pub struct ExprFor {
    /// Iterator names as written.
    pub iterators: Vec<String>,

    /// Iterator variables, one per name, created once sources are typed.
    pub iterator_variables: Vec<Rc<RefCell<Variable>>>,

    pub sources: Vec<Expression>,
    pub body: Option<Box<Expression>>,
}

impl ExprFor {
    pub fn new(iterators: Vec<String>, sources: Vec<Expression>, body: Option<Expression>) -> ExprFor {
        ExprFor {
            iterators,
            iterator_variables: Vec::new(),
            sources,
            body: body.map(Box::new),
        }
    }

    pub fn find_iterator(&self, name: &str) -> Option<Rc<RefCell<Variable>>> {
        self.iterator_variables
            .iter()
            .find(|var| var.borrow().name == name)
            .cloned()
    }
}

impl ExpressionNode for ExprFor {
    fn node_name(&self) -> &'static str {
        "ExprFor"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        let iterator_variables = context.clone_variables(&self.iterator_variables);
        ExprFor {
            iterators: self.iterators.clone(),
            iterator_variables,
            sources: self
                .sources
                .iter()
                .map(|source| source.clone_in(context))
                .collect(),
            body: clone_optional(&self.body, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        let iterator_variables = {
            let this = &*self;
            visit_variables(&this.iterator_variables, vis, false, |vis, var, last| {
                vis.pre_visit_for_variable(this, var, last);
                vis.visit_for_variable(this, var, last)
            })
        };
        self.iterator_variables = iterator_variables;

        let mut sources = mem::take(&mut self.sources);
        let total = sources.len();
        for (index, source) in sources.iter_mut().enumerate() {
            let last = index + 1 == total;
            vis.pre_visit_for_source(self, source, last);
            visit_required(source, vis);
            if !vis.visit_for_source(self, source, last).apply(source) {
                panic!("visitor removed a source of a for loop");
            }
        }
        self.sources = sources;

        vis.pre_visit_for_stack(self);
        if let Some(ref body) = self.body {
            vis.pre_visit_for_body(self, body);
        }
        if let Some(ref mut body) = self.body {
            visit_required(body, vis);
        }
    }

    fn eval_flags(&self) -> EvalFlags {
        match self.body {
            Some(ref body) => loop_body_flags(body),
            None => EvalFlags::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{ConstValue, ExprBlock, ExprCall};
    use crate::program::{BaseType, Function, TypeDecl};
    use crate::source::InputSpan;

    fn at() -> InputSpan {
        InputSpan::builtin()
    }

    fn node(kind: impl Into<ExpressionKind>) -> Expression {
        Expression::new(at(), kind)
    }

    fn block(list: Vec<Expression>) -> Expression {
        node(ExprBlock::with_list(list))
    }

    fn builtin_panic() -> Rc<RefCell<Function>> {
        Rc::new(RefCell::new(Function::builtin("panic", Vec::new(), TypeDecl::new(BaseType::Void))))
    }

    #[test]
    fn loops_absorb_break_and_continue() {
        let body = block(vec![node(ExprBreak), node(ExprContinue), node(ExprReturn::new(None))]);
        let cond = Expression::const_value(at(), ConstValue::Bool(true));
        let while_ = ExprWhile::new(cond, body);
        assert_eq!(while_.eval_flags(), EvalFlags::STOP_FOR_RETURN);

        let for_ = ExprFor::new(vec!["x".into()], Vec::new(), Some(block(vec![node(ExprBreak)])));
        assert!(for_.eval_flags().is_empty());
        assert!(!for_.eval_flags().stops_flow());
    }

    #[test]
    fn if_joins_both_branches() {
        let panic = builtin_panic();
        let cond = Expression::const_value(at(), ConstValue::Bool(true));
        let if_ = ExprIfThenElse::new(
            cond,
            block(vec![node(ExprReturn::new(None))]),
            Some(block(vec![node(ExprCall::resolved(&panic, Vec::new()))])),
        );
        assert_eq!(
            if_.eval_flags(),
            EvalFlags::STOP_FOR_RETURN | EvalFlags::STOP_FOR_THROW
        );
    }

    #[test]
    fn try_catches_throw() {
        let panic = builtin_panic();
        let try_catch = ExprTryCatch::new(
            block(vec![node(ExprCall::resolved(&panic, Vec::new()))]),
            block(Vec::new()),
        );
        assert!(try_catch.eval_flags().is_empty());
    }

    #[test]
    fn only_the_builtin_panic_throws() {
        let panic = builtin_panic();
        assert_eq!(ExprCall::resolved(&panic, Vec::new()).eval_flags(), EvalFlags::STOP_FOR_THROW);
        assert!(ExprCall::new("panic", Vec::new()).eval_flags().is_empty());

        let user = Rc::new(RefCell::new(Function::new("panic", at())));
        assert!(ExprCall::resolved(&user, Vec::new()).eval_flags().is_empty());
    }

    #[test]
    fn goto_jumps() {
        assert_eq!(ExprGoto::new(1).eval_flags(), EvalFlags::JUMP_TO_LABEL);
        assert!(!ExprGoto::new(1).eval_flags().stops_flow());
    }
}
