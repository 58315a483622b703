//! Optimization passes run by `Program::optimize`.
//!
//! Every pass is a visitor run over the whole program. It returns whether it changed anything,
//! so the optimizer can stop once the program reaches a fixed point.

mod blocks;
mod conditions;
mod constants;
mod references;
mod unused;

pub use blocks::fold_blocks;
pub use conditions::fold_conditions;
pub use constants::{fold_constants, fold_op1, fold_op2};
pub use references::fold_references;
pub use unused::remove_unused;

use crate::program::expressions::{ExprBlock, Expression};
use crate::program::Function;
use std::cell::RefCell;
use std::rc::Weak;

/// Operators resolved to a user overload are calls and must not be evaluated by the optimizer.
/// A link to a function that no longer exists is treated the same way.
fn is_builtin_operator(func: &Option<Weak<RefCell<Function>>>) -> bool {
    match func {
        None => true,
        Some(func) => func
            .upgrade()
            .map_or(false, |function| function.borrow().builtin),
    }
}

/// A block that replaces a removed statement. Block folding inlines it into its parent.
fn empty_statement(statement: &Expression) -> Expression {
    Expression::new(
        statement.at,
        ExprBlock {
            is_collapseable: true,
            ..ExprBlock::new()
        },
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::program::expressions::{ConstValue, Expression};
    use crate::program::{Function, Program};
    use crate::source::InputSpan;
    use std::cell::{Ref, RefCell};
    use std::rc::Rc;

    pub fn int(value: i32) -> Expression {
        Expression::const_value(InputSpan::builtin(), ConstValue::Int(value))
    }

    /// A program with a single exported function `f` with the given body.
    pub fn program_with_body(body: Expression) -> (Program, Rc<RefCell<Function>>) {
        let mut program = Program::new();
        let function = Rc::new(RefCell::new(Function {
            body: Some(body),
            exports: true,
            ..Function::new("f", InputSpan::builtin())
        }));
        assert!(program.add_function(Rc::clone(&function)));
        (program, function)
    }

    pub fn body_of(function: &Rc<RefCell<Function>>) -> Ref<'_, Expression> {
        Ref::map(function.borrow(), |function| {
            function.body.as_ref().expect("function has a body")
        })
    }

    /// Node names of the statements of a function whose body is a block.
    pub fn statements(function: &Rc<RefCell<Function>>) -> Vec<&'static str> {
        body_of(function)
            .as_block()
            .map(|block| block.list.iter().map(Expression::node_name).collect())
            .unwrap_or_default()
    }
}
