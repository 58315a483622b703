use crate::program::expressions::{Expression, ExpressionKind};
use crate::program::transforms::{empty_statement, is_builtin_operator};
use crate::program::visitors::{Rewrite, Visitor};
use crate::program::Program;

/// Replaces branches on constant conditions with the branch that is taken.
///
/// An `if` whose branch is not taken and a `while (false)` become empty collapseable blocks,
/// which block folding then erases.
pub fn fold_conditions(program: &mut Program) -> bool {
    let mut folding = CondFolding { changed: false };
    program.visit(&mut folding, false);
    folding.changed
}

struct CondFolding {
    changed: bool,
}

impl CondFolding {
    fn fold(&mut self, folded: Expression) -> Rewrite {
        self.changed = true;
        Rewrite::Replace(folded)
    }
}

impl Visitor for CondFolding {
    fn visit_if_then_else(&mut self, expr: &mut Expression) -> Rewrite {
        let empty = empty_statement(expr);
        let node = match expr.kind {
            ExpressionKind::IfThenElse(ref mut node) => node,
            _ => return Rewrite::Keep,
        };
        match node.cond.as_const_value().and_then(|cond| cond.as_bool()) {
            Some(true) => {
                let taken = node.if_true.take();
                self.fold(taken)
            }
            Some(false) => {
                let taken = match node.if_false {
                    Some(ref mut if_false) => if_false.take(),
                    None => empty,
                };
                self.fold(taken)
            }
            None => Rewrite::Keep,
        }
    }

    fn visit_while(&mut self, expr: &mut Expression) -> Rewrite {
        let never = match expr.kind {
            ExpressionKind::While(ref node) => node.cond.as_const_value().and_then(|cond| cond.as_bool()) == Some(false),
            _ => false,
        };
        if never {
            let empty = empty_statement(expr);
            self.fold(empty)
        } else {
            Rewrite::Keep
        }
    }

    fn visit_op3(&mut self, expr: &mut Expression) -> Rewrite {
        let node = match expr.kind {
            ExpressionKind::Op3(ref mut node) if is_builtin_operator(&node.func) => node,
            _ => return Rewrite::Keep,
        };
        match node.subexpr.as_const_value().and_then(|cond| cond.as_bool()) {
            Some(true) => {
                let taken = node.left.take();
                self.fold(taken)
            }
            Some(false) => {
                let taken = node.right.take();
                self.fold(taken)
            }
            None => Rewrite::Keep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{ConstValue, ExprBlock, ExprIfThenElse, ExprOp3, ExprVar, ExprWhile};
    use crate::program::transforms::tests::{body_of, int, program_with_body, statements};
    use crate::program::Function;
    use crate::source::InputSpan;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn boolean(value: bool) -> Expression {
        Expression::const_value(InputSpan::builtin(), ConstValue::Bool(value))
    }

    fn if_then_else(cond: Expression, if_false: Option<Expression>) -> Expression {
        Expression::new(InputSpan::builtin(), ExprIfThenElse::new(cond, int(1), if_false))
    }

    fn block(list: Vec<Expression>) -> Expression {
        Expression::new(InputSpan::builtin(), ExprBlock::with_list(list))
    }

    #[test]
    fn constant_if_picks_its_branch() {
        let (mut program, function) = program_with_body(if_then_else(boolean(true), Some(int(2))));
        assert!(fold_conditions(&mut program));
        assert_eq!(body_of(&function).as_const_value(), Some(ConstValue::Int(1)));

        let (mut program, function) = program_with_body(if_then_else(boolean(false), Some(int(2))));
        assert!(fold_conditions(&mut program));
        assert_eq!(body_of(&function).as_const_value(), Some(ConstValue::Int(2)));
    }

    #[test]
    fn if_without_taken_branch_becomes_empty() {
        let body = block(vec![if_then_else(boolean(false), None), int(3)]);
        let (mut program, function) = program_with_body(body);
        assert!(fold_conditions(&mut program));
        assert_eq!(statements(&function), vec!["ExprBlock", "ExprConstValue"]);
        let body = body_of(&function);
        let removed = body.as_block().unwrap().list[0].as_block().unwrap();
        assert!(removed.is_collapseable && removed.list.is_empty());
    }

    #[test]
    fn while_false_is_removed_and_variable_conditions_stay() {
        let at = InputSpan::builtin();
        let body = block(vec![
            Expression::new(at, ExprWhile::new(boolean(false), block(vec![int(1)]))),
            Expression::new(at, ExprWhile::new(Expression::new(at, ExprVar::new("x")), block(vec![]))),
        ]);
        let (mut program, function) = program_with_body(body);
        assert!(fold_conditions(&mut program));
        assert_eq!(statements(&function), vec!["ExprBlock", "ExprWhile"]);
        assert!(!fold_conditions(&mut program));
    }

    #[test]
    fn constant_ternary_selects_an_arm() {
        let at = InputSpan::builtin();
        let body = Expression::new(at, ExprOp3::new("?", boolean(false), int(1), int(2)));
        let (mut program, function) = program_with_body(body);
        assert!(fold_conditions(&mut program));
        assert_eq!(body_of(&function).as_const_value(), Some(ConstValue::Int(2)));
    }

    #[test]
    fn overloaded_select_is_kept() {
        let at = InputSpan::builtin();
        let overload = Rc::new(RefCell::new(Function::new("?", at)));
        let mut select = ExprOp3::new("?", boolean(true), int(1), int(2));
        select.func = Some(Rc::downgrade(&overload));
        let (mut program, function) = program_with_body(Expression::new(at, select));
        assert!(!fold_conditions(&mut program));
        assert_eq!(body_of(&function).node_name(), "ExprOp3");
    }
}
