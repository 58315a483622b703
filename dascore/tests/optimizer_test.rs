use dascore::program::expressions::{
    ConstValue, ExprBlock, ExprCall, ExprOp2, ExprReturn, Expression, ExpressionKind,
};
use dascore::program::{
    AnnotationValue, BaseType, CodeOfPolicies, Function, OptimizationMacro, Program, TypeDecl,
};
use dascore::source::InputSpan;
use dascore::CompilationErrorKind;
use std::cell::RefCell;
use std::rc::Rc;

fn int(value: i32) -> Expression {
    Expression::const_value(InputSpan::builtin(), ConstValue::Int(value))
}

fn add(left: Expression, right: Expression) -> Expression {
    Expression::new(InputSpan::builtin(), ExprOp2::new("+", left, right))
}

fn returning(value: Expression) -> Expression {
    let statement = Expression::new(InputSpan::builtin(), ExprReturn::new(Some(value)));
    Expression::new(InputSpan::builtin(), ExprBlock::with_list(vec![statement]))
}

fn export(program: &mut Program, name: &str, body: Expression) -> Rc<RefCell<Function>> {
    let function = Rc::new(RefCell::new(Function {
        body: Some(body),
        exports: true,
        ..Function::new(name, InputSpan::builtin())
    }));
    assert!(program.add_function(Rc::clone(&function)));
    function
}

/// Value returned by the first statement of the function body.
fn returned_value(function: &Rc<RefCell<Function>>) -> Option<ConstValue> {
    let function = function.borrow();
    let block = function.body.as_ref()?.as_block()?;
    match block.list.first()?.kind {
        ExpressionKind::Return(ref ret) => {
            ret.subexpr.as_ref()?.as_const_value()
        }
        _ => None,
    }
}

fn kinds(program: &Program) -> Vec<CompilationErrorKind> {
    program.errors().iter().map(|error| error.kind).collect()
}

struct Counting {
    applied: usize,
    changes: bool,
    fail_after: Option<usize>,
}

impl Counting {
    fn new(changes: bool) -> Rc<RefCell<Counting>> {
        Rc::new(RefCell::new(Counting {
            applied: 0,
            changes,
            fail_after: None,
        }))
    }
}

impl OptimizationMacro for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn apply(&mut self, program: &mut Program) -> bool {
        self.applied += 1;
        if self.fail_after == Some(self.applied) {
            program.error(
                "macro gave up",
                "",
                "",
                InputSpan::builtin(),
                CompilationErrorKind::Unspecified,
            );
        }
        self.changes
    }
}

#[test]
fn folds_until_nothing_changes() {
    let mut program = Program::new();
    let function = export(&mut program, "three", returning(add(int(1), add(int(1), int(1)))));
    program.optimize();
    assert!(!program.failed());
    assert_eq!(returned_value(&function), Some(ConstValue::Int(3)));
}

#[test]
fn folded_program_converges_in_one_round() {
    let policies = CodeOfPolicies {
        max_optimization_passes: Some(1),
        ..CodeOfPolicies::default()
    };
    let mut program = Program::with_policies(policies.clone());
    export(&mut program, "three", returning(int(3)));
    program.optimize();
    assert!(!program.failed());

    let mut program = Program::with_policies(policies);
    export(&mut program, "three", returning(add(int(1), int(2))));
    program.optimize();
    assert_eq!(kinds(&program), vec![CompilationErrorKind::OptimizationDidNotConverge]);
}

#[test]
fn macro_that_always_changes_hits_the_bound() {
    let mut program = Program::with_policies(CodeOfPolicies {
        max_optimization_passes: Some(5),
        ..CodeOfPolicies::default()
    });
    export(&mut program, "main", returning(int(0)));
    let counting = Counting::new(true);
    program
        .this_module
        .borrow_mut()
        .add_optimization_macro(counting.clone());

    program.optimize();
    assert_eq!(kinds(&program), vec![CompilationErrorKind::OptimizationDidNotConverge]);
    assert_eq!(counting.borrow().applied, 5);
}

#[test]
fn quiet_macro_runs_once() {
    let mut program = Program::new();
    export(&mut program, "main", returning(int(0)));
    let counting = Counting::new(false);
    program
        .this_module
        .borrow_mut()
        .add_optimization_macro(counting.clone());

    program.optimize();
    assert!(!program.failed());
    assert_eq!(counting.borrow().applied, 1);
}

#[test]
fn failing_macro_stops_the_optimizer() {
    let mut program = Program::new();
    export(&mut program, "main", returning(int(0)));
    let counting = Counting::new(true);
    counting.borrow_mut().fail_after = Some(2);
    program
        .this_module
        .borrow_mut()
        .add_optimization_macro(counting.clone());

    program.optimize();
    assert_eq!(
        kinds(&program),
        vec![
            CompilationErrorKind::Unspecified,
            CompilationErrorKind::OptimizationMacroFailed
        ]
    );
    assert_eq!(counting.borrow().applied, 2);
    assert!(program.errors()[1].message.contains("counting"));
}

#[test]
fn optimization_can_be_turned_off() {
    let mut program = Program::new();
    program.options.push("optimize", AnnotationValue::Bool(false));
    let function = export(&mut program, "three", returning(add(int(1), int(2))));
    program.optimize();
    assert_eq!(returned_value(&function), None);

    let mut program = Program::with_policies(CodeOfPolicies {
        optimize: false,
        ..CodeOfPolicies::default()
    });
    program.options.push("optimize", AnnotationValue::Bool(true));
    let function = export(&mut program, "three", returning(add(int(1), int(2))));
    program.optimize();
    assert_eq!(returned_value(&function), Some(ConstValue::Int(3)));
}

#[test]
fn unexported_functions_are_dropped() {
    let mut program = Program::new();
    export(&mut program, "main", returning(int(0)));
    let helper = Rc::new(RefCell::new(Function {
        body: Some(returning(int(1))),
        ..Function::new("helper", InputSpan::builtin())
    }));
    assert!(program.add_function(helper));

    program.optimize();
    let module = program.this_module.borrow();
    let names: Vec<_> = module
        .functions()
        .map(|function| function.borrow().name.clone())
        .collect();
    assert_eq!(names, vec!["main"]);
}

fn panic_then_return(panic: Option<&Rc<RefCell<Function>>>) -> Expression {
    let call = match panic {
        Some(function) => ExprCall::resolved(function, Vec::new()),
        None => ExprCall::new("panic", Vec::new()),
    };
    let list = vec![
        Expression::new(InputSpan::builtin(), call),
        Expression::new(InputSpan::builtin(), ExprReturn::new(Some(int(1)))),
    ];
    Expression::new(InputSpan::builtin(), ExprBlock::with_list(list))
}

fn statement_names(function: &Rc<RefCell<Function>>) -> Vec<&'static str> {
    let function = function.borrow();
    let block = function.body.as_ref().and_then(Expression::as_block).unwrap();
    block.list.iter().map(Expression::node_name).collect()
}

#[test]
fn user_panic_does_not_end_the_block() {
    let mut program = Program::new();
    let user_panic = Rc::new(RefCell::new(Function {
        body: Some(returning(int(0))),
        exports: true,
        ..Function::new("panic", InputSpan::builtin())
    }));
    assert!(program.add_function(Rc::clone(&user_panic)));
    let resolved = export(&mut program, "resolved", panic_then_return(Some(&user_panic)));
    let unresolved = export(&mut program, "unresolved", panic_then_return(None));

    program.optimize();
    assert!(!program.failed());
    assert_eq!(statement_names(&resolved), vec!["ExprCall", "ExprReturn"]);
    assert_eq!(statement_names(&unresolved), vec!["ExprCall", "ExprReturn"]);
}

#[test]
fn builtin_panic_ends_the_block() {
    let mut program = Program::new();
    let panic = Rc::new(RefCell::new(Function::builtin(
        "panic",
        Vec::new(),
        TypeDecl::new(BaseType::Void),
    )));
    let function = export(&mut program, "main", panic_then_return(Some(&panic)));

    program.optimize();
    assert_eq!(statement_names(&function), vec!["ExprCall"]);
}
