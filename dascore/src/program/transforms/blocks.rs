use crate::program::expressions::{Expression, ExpressionKind};
use crate::program::visitors::{Rewrite, Visitor};
use crate::program::Program;

/// Inlines collapseable blocks and erases statements that can never run.
pub fn fold_blocks(program: &mut Program) -> bool {
    let mut folding = BlockFolding { changed: false };
    program.visit(&mut folding, false);
    folding.changed
}

struct BlockFolding {
    changed: bool,
}

impl Visitor for BlockFolding {
    fn visit_block(&mut self, expr: &mut Expression) -> Rewrite {
        if let Some(block) = expr.as_block_mut() {
            self.changed |= block.collapse();
            self.changed |= remove_unreachable(&mut block.list);
            self.changed |= remove_unreachable(&mut block.final_list);
        }
        Rewrite::Keep
    }
}

/// Whether control never falls through to the statement after this one.
///
/// Eval flags tell what a statement may do, so only nodes that leave unconditionally count.
fn always_leaves(statement: &Expression) -> bool {
    match statement.kind {
        ExpressionKind::Return(_)
        | ExpressionKind::Break(_)
        | ExpressionKind::Continue(_)
        | ExpressionKind::Call(_) => statement.eval_flags().stops_flow(),
        ExpressionKind::Block(ref block) => !block.is_closure && block.list.iter().any(always_leaves),
        ExpressionKind::IfThenElse(ref node) => match node.if_false {
            Some(ref if_false) => always_leaves(&node.if_true) && always_leaves(if_false),
            None => false,
        },
        _ => false,
    }
}

/// Erases the statements between one that always leaves and the next label.
fn remove_unreachable(list: &mut Vec<Expression>) -> bool {
    let mut any = false;
    let mut from = 0;
    while let Some(offset) = list[from..].iter().position(always_leaves) {
        let stop = from + offset + 1;
        let resume = list[stop..]
            .iter()
            .position(|expr| matches!(expr.kind, ExpressionKind::Label(_)))
            .map_or(list.len(), |offset| stop + offset);
        if resume > stop {
            list.drain(stop..resume);
            any = true;
        }
        from = stop;
    }
    any
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{
        ExprBlock, ExprBreak, ExprCall, ExprIfThenElse, ExprLabel, ExprReturn, ExprVar, ExprWhile,
    };
    use crate::program::transforms::tests::{int, program_with_body, statements};
    use crate::program::{BaseType, Function, TypeDecl};
    use crate::source::InputSpan;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn block(list: Vec<Expression>, collapseable: bool) -> Expression {
        Expression::new(
            InputSpan::builtin(),
            ExprBlock {
                is_collapseable: collapseable,
                ..ExprBlock::with_list(list)
            },
        )
    }

    fn ret() -> Expression {
        Expression::new(InputSpan::builtin(), ExprReturn::new(None))
    }

    #[test]
    fn collapseable_blocks_are_inlined() {
        let body = block(vec![int(1), block(vec![int(2), block(vec![], true)], true), int(3)], false);
        let (mut program, function) = program_with_body(body);
        assert!(fold_blocks(&mut program));
        assert_eq!(statements(&function), vec!["ExprConstValue"; 3]);
        assert!(!fold_blocks(&mut program));
    }

    #[test]
    fn statements_after_return_are_erased_up_to_a_label() {
        let at = InputSpan::builtin();
        let panic = Rc::new(RefCell::new(Function::builtin("panic", vec![], TypeDecl::new(BaseType::Void))));
        let body = block(
            vec![
                int(1),
                ret(),
                int(2),
                Expression::new(at, ExprCall::new("f", vec![])),
                Expression::new(at, ExprLabel::new(1)),
                int(3),
                Expression::new(at, ExprCall::resolved(&panic, vec![])),
                int(4),
            ],
            false,
        );
        let (mut program, function) = program_with_body(body);
        assert!(fold_blocks(&mut program));
        assert_eq!(
            statements(&function),
            vec!["ExprConstValue", "ExprReturn", "ExprLabel", "ExprConstValue", "ExprCall"]
        );
    }

    #[test]
    fn conditional_exits_keep_the_rest() {
        let at = InputSpan::builtin();
        let cond = || Expression::new(at, ExprVar::new("x"));
        let loop_body = block(
            vec![
                Expression::new(at, ExprIfThenElse::new(cond(), Expression::new(at, ExprBreak), None)),
                int(1),
            ],
            false,
        );
        let body = block(
            vec![
                Expression::new(at, ExprWhile::new(cond(), loop_body)),
                int(2),
                Expression::new(at, ExprIfThenElse::new(cond(), ret(), Some(ret()))),
                int(3),
            ],
            false,
        );
        let (mut program, function) = program_with_body(body);
        assert!(fold_blocks(&mut program));
        assert_eq!(
            statements(&function),
            vec!["ExprWhile", "ExprConstValue", "ExprIfThenElse"]
        );
    }
}
