use crate::program::expressions::{clone_boxed, clone_list, EvalFlags, Expression, ExpressionKind, ExpressionNode};
use crate::program::visitors::{
    visit_list, visit_required, visit_variable, visit_variables, CloneContext, Visitor,
};
use crate::program::{AnnotationDeclaration, BaseType, TypeDecl, Variable};
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

/// A list of statements with optional arguments and a `finally` section.
///
/// Blocks are both plain scopes and the bodies of closures (`$(a) { ... }`).
#[derive(Debug, Default)]
pub struct ExprBlock {
    pub list: Vec<Expression>,
    pub final_list: Vec<Expression>,
    pub arguments: Vec<Rc<RefCell<Variable>>>,
    pub return_type: Option<TypeDecl>,
    pub annotations: Vec<AnnotationDeclaration>,

    pub is_closure: bool,

    /// May be inlined into a parent block.
    pub is_collapseable: bool,

    pub finally_before_body: bool,
    pub finally_disabled: bool,
    pub has_return: bool,
}

impl ExprBlock {
    pub fn new() -> ExprBlock {
        ExprBlock::default()
    }

    pub fn with_list(list: Vec<Expression>) -> ExprBlock {
        ExprBlock {
            list,
            ..ExprBlock::default()
        }
    }

    pub fn find_argument(&self, name: &str) -> Option<Rc<RefCell<Variable>>> {
        self.arguments
            .iter()
            .find(|arg| arg.borrow().name == name)
            .cloned()
    }

    /// Inlines nested collapseable blocks into this one, in both statement lists.
    ///
    /// Only blocks without a `finally` section are inlined. Returns whether anything changed.
    pub fn collapse(&mut self) -> bool {
        let mut any = false;
        if !self.list.is_empty() {
            let list = mem::take(&mut self.list);
            any |= collapse_into(&mut self.list, list);
        }
        if !self.final_list.is_empty() {
            let final_list = mem::take(&mut self.final_list);
            any |= collapse_into(&mut self.final_list, final_list);
        }
        any
    }

    /// Type of the block as a value, `block<(args):result>`.
    pub fn make_block_type(&self, result: Option<&TypeDecl>) -> TypeDecl {
        let result = result
            .or_else(|| self.return_type.as_ref())
            .cloned()
            .unwrap_or_else(|| TypeDecl::new(BaseType::Void));
        let arguments = self
            .arguments
            .iter()
            .map(|arg| arg.borrow().type_.clone())
            .collect();
        TypeDecl {
            constant: true,
            ..TypeDecl::block(result, arguments)
        }
    }

    fn finally_eval_flags(&self) -> EvalFlags {
        self.final_list
            .iter()
            .fold(EvalFlags::empty(), |flags, expr| flags | expr.eval_flags())
    }

    fn walk_finally(&mut self, vis: &mut dyn Visitor) {
        if self.final_list.is_empty() || self.finally_disabled {
            return;
        }
        vis.pre_visit_block_final(self);
        let mut final_list = mem::take(&mut self.final_list);
        visit_list(
            &mut final_list,
            vis,
            &*self,
            |vis, block, expr, _, _| vis.pre_visit_block_final_expression(block, expr),
            |vis, block, expr, _, _| vis.visit_block_final_expression(block, expr),
        );
        self.final_list = final_list;
        vis.visit_block_final(self);
    }
}

fn collapse_into(result: &mut Vec<Expression>, list: Vec<Expression>) -> bool {
    let mut any = false;
    for expr in list {
        let inline = matches!(
            expr.kind,
            ExpressionKind::Block(ref block) if block.is_collapseable && block.final_list.is_empty()
        );
        match expr.kind {
            ExpressionKind::Block(block) if inline => {
                collapse_into(result, block.list);
                any = true;
            }
            kind => result.push(Expression { kind, ..expr }),
        }
    }
    any
}

impl ExpressionNode for ExprBlock {
    fn node_name(&self) -> &'static str {
        "ExprBlock"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        let arguments = context.clone_variables(&self.arguments);
        ExprBlock {
            list: clone_list(&self.list, context),
            final_list: clone_list(&self.final_list, context),
            arguments,
            return_type: self.return_type.clone(),
            annotations: self.annotations.clone(),
            is_closure: self.is_closure,
            is_collapseable: self.is_collapseable,
            finally_before_body: self.finally_before_body,
            finally_disabled: self.finally_disabled,
            has_return: self.has_return,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        let arguments = {
            let block = &*self;
            visit_variables(&block.arguments, vis, true, |vis, arg, last| {
                vis.pre_visit_block_argument(block, arg, last);
                visit_variable(
                    arg,
                    vis,
                    |vis, init| vis.pre_visit_block_argument_init(block, arg, init),
                    |vis, init| vis.visit_block_argument_init(block, arg, init),
                );
                vis.visit_block_argument(block, arg, last)
            })
        };
        self.arguments = arguments;

        if self.finally_before_body {
            self.walk_finally(vis);
        }
        let mut list = mem::take(&mut self.list);
        visit_list(
            &mut list,
            vis,
            &*self,
            |vis, block, expr, _, _| vis.pre_visit_block_expression(block, expr),
            |vis, block, expr, _, _| vis.visit_block_expression(block, expr),
        );
        self.list = list;
        if !self.finally_before_body {
            self.walk_finally(vis);
        }
    }

    fn eval_flags(&self) -> EvalFlags {
        self.list
            .iter()
            .fold(self.finally_eval_flags(), |flags, expr| flags | expr.eval_flags())
    }
}

/// A block used as a value: `$ { ... }`, `@ { ... }` or a lambda body.
#[derive(Debug)]
pub struct ExprMakeBlock {
    pub block: Box<Expression>,
    pub is_lambda: bool,
    pub is_local_function: bool,
}

impl ExprMakeBlock {
    pub fn new(block: Expression) -> ExprMakeBlock {
        ExprMakeBlock {
            block: Box::new(block),
            is_lambda: false,
            is_local_function: false,
        }
    }
}

impl ExpressionNode for ExprMakeBlock {
    fn node_name(&self) -> &'static str {
        "ExprMakeBlock"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprMakeBlock {
            block: clone_boxed(&self.block, context),
            is_lambda: self.is_lambda,
            is_local_function: self.is_local_function,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.block, vis);
    }
}
