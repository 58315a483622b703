use crate::program::expressions::{ExpressionKind, ExpressionNode};
use crate::program::visitors::{visit_variable, visit_variables, CloneContext, Visitor};
use crate::program::Variable;
use std::cell::RefCell;
use std::rc::Rc;

/// Declaration of local variables, `let a = 1, b : int`.
#[derive(Debug, Default)]
pub struct ExprLet {
    pub variables: Vec<Rc<RefCell<Variable>>>,

    /// `let inscope`: the variables are finalized when the scope ends.
    pub in_scope: bool,
}

impl ExprLet {
    pub fn new(variables: Vec<Rc<RefCell<Variable>>>) -> ExprLet {
        ExprLet {
            variables,
            in_scope: false,
        }
    }

    pub fn find(&self, name: &str) -> Option<Rc<RefCell<Variable>>> {
        self.variables
            .iter()
            .find(|var| var.borrow().name == name)
            .cloned()
    }
}

impl ExpressionNode for ExprLet {
    fn node_name(&self) -> &'static str {
        "ExprLet"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprLet {
            variables: context.clone_variables(&self.variables),
            in_scope: self.in_scope,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        let variables = {
            let this = &*self;
            visit_variables(&this.variables, vis, true, |vis, var, last| {
                vis.pre_visit_let_variable(this, var, last);
                visit_variable(
                    var,
                    vis,
                    |vis, init| vis.pre_visit_let_init(this, var, init),
                    |vis, init| vis.visit_let_init(this, var, init),
                );
                vis.visit_let_variable(this, var, last)
            })
        };
        self.variables = variables;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{ConstValue, ExprVar, Expression};
    use crate::program::visitors::Rewrite;
    use crate::program::{BaseType, TypeDecl};
    use crate::source::InputSpan;

    fn local(name: &str, init: Option<Expression>) -> Rc<RefCell<Variable>> {
        let mut var = Variable::new(name, TypeDecl::new(BaseType::Int), InputSpan::builtin());
        var.init = init;
        Rc::new(RefCell::new(var))
    }

    struct DropUnused;

    impl Visitor for DropUnused {
        fn visit_let_variable(
            &mut self,
            _expr: &ExprLet,
            var: &Rc<RefCell<Variable>>,
            _last: bool,
        ) -> Rewrite<Rc<RefCell<Variable>>> {
            if var.borrow().name.starts_with('_') {
                Rewrite::Remove
            } else {
                Rewrite::Keep
            }
        }

        fn visit_let_init(
            &mut self,
            _expr: &ExprLet,
            _var: &Rc<RefCell<Variable>>,
            _init: &mut Expression,
        ) -> Rewrite {
            Rewrite::Replace(Expression::const_value(InputSpan::builtin(), ConstValue::Int(0)))
        }
    }

    #[test]
    fn variables_can_be_removed_and_inits_replaced() {
        let one = Expression::const_value(InputSpan::builtin(), ConstValue::Int(1));
        let mut let_ = Expression::new(
            InputSpan::builtin(),
            ExprLet::new(vec![local("a", Some(one)), local("_b", None), local("c", None)]),
        );
        assert!(let_.visit(&mut DropUnused).is_keep());

        match let_.kind {
            ExpressionKind::Let(ref let_) => {
                let names: Vec<_> = let_
                    .variables
                    .iter()
                    .map(|var| var.borrow().name.clone())
                    .collect();
                assert_eq!(names, vec!["a", "c"]);
                let a = let_.find("a").unwrap();
                let init = a.borrow().init.as_ref().and_then(Expression::as_const_value);
                assert_eq!(init, Some(ConstValue::Int(0)));
                assert!(let_.find("_b").is_none());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn clone_declares_fresh_variables() {
        let a = local("a", None);
        let let_ = Expression::new(InputSpan::builtin(), ExprLet::new(vec![Rc::clone(&a)]));
        let use_ = Expression::new(InputSpan::builtin(), ExprVar::resolved(&a));

        let mut context = CloneContext::new();
        let let_copy = let_.clone_in(&mut context);
        let use_copy = use_.clone_in(&mut context);

        let copied = match let_copy.kind {
            ExpressionKind::Let(ref let_) => Rc::clone(&let_.variables[0]),
            _ => unreachable!(),
        };
        assert!(!Rc::ptr_eq(&copied, &a));
        match use_copy.kind {
            ExpressionKind::Var(ref var) => assert!(var.refers_to(&copied)),
            _ => unreachable!(),
        }

        copied.borrow_mut().name = "renamed".to_string();
        assert_eq!(a.borrow().name, "a");
    }
}
