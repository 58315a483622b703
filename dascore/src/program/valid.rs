//! Last-resort validity checking.

use crate::program::expressions::{Expression, ExpressionKind};
use crate::program::visitors::{Rewrite, Visitor};
use crate::program::*;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Program processor that checks structural assumptions about the tree.
///
/// It does not report user errors, which are the responsibility of the builder and later
/// stages. A non-empty result means one of those stages produced a broken tree.
pub struct ValidityChecker<'a> {
    program: &'a mut Program,
    require_types: bool,
}

impl<'a> ValidityChecker<'a> {
    pub fn new(program: &mut Program) -> ValidityChecker {
        ValidityChecker {
            program,
            require_types: false,
        }
    }

    /// Also reports nodes without a type. Only meaningful after inference.
    pub fn require_types(self) -> ValidityChecker<'a> {
        ValidityChecker {
            require_types: true,
            ..self
        }
    }

    pub fn check(self) -> Vec<String> {
        let mut checks = Checks {
            require_types: self.require_types,
            errors: Vec::new(),
        };
        self.program.visit(&mut checks, true);
        checks.errors
    }
}

struct Checks {
    require_types: bool,
    errors: Vec<String>,
}

impl Checks {
    fn check_link(&mut self, link: &Option<Weak<RefCell<Function>>>, expr: &Expression, name: &str) {
        if let Some(ref function) = link {
            if function.upgrade().is_none() {
                self.errors.push(format!(
                    "{} `{}` at {} refers to a function that no longer exists",
                    expr.node_name(),
                    name,
                    expr.at
                ));
            }
        }
    }
}

/// Structure accessed through a value of this type, directly or through a pointer.
fn accessed_structure(type_: &TypeDecl) -> Option<Rc<RefCell<Structure>>> {
    match type_.base_type {
        BaseType::Pointer => type_.first_type.as_ref().and_then(|target| target.structure_ref()),
        _ => type_.structure_ref(),
    }
}

impl Visitor for Checks {
    fn visit_expression(&mut self, expr: &mut Expression) -> Rewrite {
        if self.require_types && expr.type_.is_none() {
            self.errors
                .push(format!("{} at {} has no type", expr.node_name(), expr.at));
        }

        match expr.kind {
            ExpressionKind::Call(ref call) => self.check_link(&call.func, expr, &call.name),
            ExpressionKind::Addr(ref addr) => self.check_link(&addr.func, expr, &addr.target),
            ExpressionKind::Op1(ref op) => self.check_link(&op.func, expr, &op.op),
            ExpressionKind::Op2(ref op) => self.check_link(&op.func, expr, &op.op),
            ExpressionKind::Op3(ref op) => self.check_link(&op.func, expr, &op.op),
            ExpressionKind::Field(ref field) => {
                let structure = field.value.type_.as_ref().and_then(accessed_structure);
                if let (Some(index), Some(structure)) = (field.field, structure) {
                    let structure = structure.borrow();
                    if index >= structure.fields.len() {
                        self.errors.push(format!(
                            "field `{}` at {} has index {}, but `{}` has {} fields",
                            field.name,
                            expr.at,
                            index,
                            structure.name,
                            structure.fields.len()
                        ));
                    }
                }
            }
            _ => {}
        }
        Rewrite::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{ConstValue, ExprBlock, ExprCall, ExprField, ExprVar};
    use crate::source::InputSpan;

    fn program_with_body(body: Expression) -> Program {
        let mut program = Program::new();
        let function = Function {
            body: Some(body),
            ..Function::new("f", InputSpan::builtin())
        };
        assert!(program.add_function(Rc::new(RefCell::new(function))));
        program
    }

    #[test]
    fn well_formed_program_has_no_errors() {
        let at = InputSpan::builtin();
        let body = Expression::new(at, ExprBlock::new()).with_type(TypeDecl::new(BaseType::Void));
        let mut program = program_with_body(body);
        assert!(ValidityChecker::new(&mut program).require_types().check().is_empty());
    }

    #[test]
    fn untyped_nodes_only_reported_on_request() {
        let at = InputSpan::builtin();
        let body = Expression::new(at, ExprBlock::with_list(vec![Expression::new(at, ExprVar::new("x"))]));
        let mut program = program_with_body(body);
        assert!(ValidityChecker::new(&mut program).check().is_empty());
        let errors = ValidityChecker::new(&mut program).require_types().check();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("ExprVar"));
    }

    #[test]
    fn dangling_links_and_bad_field_indices() {
        let at = InputSpan::builtin();
        let dropped = Rc::new(RefCell::new(Function::new("gone", at)));
        let call = Expression::new(at, ExprCall::resolved(&dropped, vec![]));
        drop(dropped);

        let point = Rc::new(RefCell::new(Structure::new("Point", at)));
        point
            .borrow_mut()
            .fields
            .push(FieldDeclaration::new("x", TypeDecl::new(BaseType::Float), at));
        let value = Expression::const_value(at, ConstValue::Int(0)).with_type(TypeDecl::structure(&point));
        let mut field = ExprField::new(value, "y");
        field.field = Some(1);

        let body = Expression::new(at, ExprBlock::with_list(vec![call, Expression::new(at, field)]));
        let mut program = program_with_body(body);
        let errors = ValidityChecker::new(&mut program).check();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("`gone`"));
        assert!(errors[1].contains("`Point` has 1 fields"));
    }
}
