use crate::program::expressions::{ExprBlock, Expression, ExpressionKind};
use crate::program::visitors::{Rewrite, Visitor};
use crate::program::{Function, Program, Variable};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Removes functions and globals that can't be reached from exported or init functions, and
/// statements that only compute a constant.
///
/// Symbols are only removed when the module has at least one exported or init function.
/// Globals with a non-constant initializer are always kept.
pub fn remove_unused(program: &mut Program) -> bool {
    let removed = remove_unused_symbols(program);
    let mut statements = UnusedStatements { changed: false };
    program.visit(&mut statements, false);
    removed || statements.changed
}

fn remove_unused_symbols(program: &mut Program) -> bool {
    let module = Rc::clone(&program.this_module);
    let roots: Vec<_> = module
        .borrow()
        .functions()
        .filter(|function| {
            let function = function.borrow();
            function.exports || function.init
        })
        .cloned()
        .collect();
    if roots.is_empty() {
        trace!("no exported or init functions, keeping every symbol");
        return false;
    }
    let kept_globals: Vec<_> = module
        .borrow()
        .globals()
        .filter(|global| global.borrow().init.as_ref().map_or(false, |init| !init.is_constant()))
        .cloned()
        .collect();

    let mut reachability = Reachability {
        pending_functions: roots,
        pending_globals: kept_globals,
        ..Reachability::default()
    };
    reachability.run();

    for function in &reachability.functions {
        function.borrow_mut().used = true;
    }
    for global in &reachability.globals {
        global.borrow_mut().used = true;
    }

    let unused_functions: Vec<String> = module
        .borrow()
        .functions
        .iter()
        .filter(|(_, function)| !function.borrow().builtin && !reachability.reaches_function(function))
        .map(|(mangled_name, _)| mangled_name.clone())
        .collect();
    let unused_globals: Vec<_> = module
        .borrow()
        .globals()
        .filter(|global| !reachability.reaches_global(global))
        .cloned()
        .collect();

    let mut module = module.borrow_mut();
    for mangled_name in &unused_functions {
        debug!(function = %mangled_name, "removing unused function");
        module.remove_function(mangled_name);
    }
    for global in &unused_globals {
        debug!(global = %global.borrow().name, "removing unused global");
        module.remove_global(global);
    }
    !unused_functions.is_empty() || !unused_globals.is_empty()
}

/// Transitive closure of the functions and globals used by the roots.
#[derive(Default)]
struct Reachability {
    pending_functions: Vec<Rc<RefCell<Function>>>,
    pending_globals: Vec<Rc<RefCell<Variable>>>,
    functions: Vec<Rc<RefCell<Function>>>,
    globals: Vec<Rc<RefCell<Variable>>>,
    seen_functions: HashSet<*const RefCell<Function>>,
    seen_globals: HashSet<*const RefCell<Variable>>,
}

impl Reachability {
    fn run(&mut self) {
        loop {
            let mut usage = Usage::default();
            if let Some(function) = self.pending_functions.pop() {
                if !self.seen_functions.insert(Rc::as_ptr(&function)) {
                    continue;
                }
                let rewrite = Function::visit(&function, &mut usage);
                debug_assert!(rewrite.is_keep());
                self.functions.push(function);
            } else if let Some(global) = self.pending_globals.pop() {
                if !self.seen_globals.insert(Rc::as_ptr(&global)) {
                    continue;
                }
                let init = global.borrow_mut().init.take();
                if let Some(mut init) = init {
                    let rewrite = init.visit(&mut usage);
                    debug_assert!(rewrite.is_keep());
                    global.borrow_mut().init = Some(init);
                }
                self.globals.push(global);
            } else {
                return;
            }
            self.pending_functions.extend(usage.functions);
            self.pending_globals.extend(usage.globals);
        }
    }

    fn reaches_function(&self, function: &Rc<RefCell<Function>>) -> bool {
        self.seen_functions.contains(&Rc::as_ptr(function))
    }

    fn reaches_global(&self, global: &Rc<RefCell<Variable>>) -> bool {
        self.seen_globals.contains(&Rc::as_ptr(global))
    }
}

/// Collects the functions and globals a subtree refers to.
#[derive(Default)]
struct Usage {
    functions: Vec<Rc<RefCell<Function>>>,
    globals: Vec<Rc<RefCell<Variable>>>,
}

impl Usage {
    fn add_function(&mut self, function: &Option<Weak<RefCell<Function>>>) {
        if let Some(function) = function.as_ref().and_then(Weak::upgrade) {
            self.functions.push(function);
        }
    }
}

impl Visitor for Usage {
    fn pre_visit_call(&mut self, expr: &mut Expression) {
        if let ExpressionKind::Call(ref call) = expr.kind {
            self.add_function(&call.func);
        }
    }

    fn pre_visit_addr(&mut self, expr: &mut Expression) {
        if let ExpressionKind::Addr(ref addr) = expr.kind {
            self.add_function(&addr.func);
        }
    }

    fn pre_visit_op1(&mut self, expr: &mut Expression) {
        if let ExpressionKind::Op1(ref op) = expr.kind {
            self.add_function(&op.func);
        }
    }

    fn pre_visit_op2(&mut self, expr: &mut Expression) {
        if let ExpressionKind::Op2(ref op) = expr.kind {
            self.add_function(&op.func);
        }
    }

    fn pre_visit_op3(&mut self, expr: &mut Expression) {
        if let ExpressionKind::Op3(ref op) = expr.kind {
            self.add_function(&op.func);
        }
    }

    fn pre_visit_var(&mut self, expr: &mut Expression) {
        if let ExpressionKind::Var(ref var) = expr.kind {
            if var.local || var.argument || var.block {
                return;
            }
            if let Some(ref variable) = var.variable {
                self.globals.push(Rc::clone(variable));
            }
        }
    }
}

struct UnusedStatements {
    changed: bool,
}

impl UnusedStatements {
    fn clean(&mut self, list: &mut Vec<Expression>, keep_last: bool) {
        let total = list.len();
        let mut index = 0;
        list.retain(|statement| {
            let last = index + 1 == total;
            index += 1;
            !statement.is_constant() || (last && keep_last)
        });
        self.changed |= list.len() != total;
    }
}

/// Whether the last statement of the block is its value.
fn yields_value(block: &ExprBlock) -> bool {
    block
        .return_type
        .as_ref()
        .map_or(false, |type_| !type_.is_void())
}

impl Visitor for UnusedStatements {
    fn visit_block(&mut self, expr: &mut Expression) -> Rewrite {
        if let Some(block) = expr.as_block_mut() {
            let keep_last = yields_value(block);
            self.clean(&mut block.list, keep_last);
            self.clean(&mut block.final_list, false);
        }
        Rewrite::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{ConstValue, ExprCall, ExprVar};
    use crate::program::transforms::tests::{int, program_with_body, statements};
    use crate::program::{BaseType, TypeDecl};
    use crate::source::InputSpan;

    fn call(function: &Rc<RefCell<Function>>) -> Expression {
        Expression::new(InputSpan::builtin(), ExprCall::resolved(function, vec![]))
    }

    fn function(name: &str, body: Expression) -> Rc<RefCell<Function>> {
        Rc::new(RefCell::new(Function {
            body: Some(body),
            ..Function::new(name, InputSpan::builtin())
        }))
    }

    fn global(name: &str, init: Option<Expression>) -> Rc<RefCell<Variable>> {
        let mut variable = Variable::new(name, TypeDecl::new(BaseType::Int), InputSpan::builtin());
        variable.init = init;
        Rc::new(RefCell::new(variable))
    }

    fn block(list: Vec<Expression>) -> Expression {
        Expression::new(InputSpan::builtin(), ExprBlock::with_list(list))
    }

    fn function_names(program: &Program) -> Vec<String> {
        program
            .this_module
            .borrow()
            .functions()
            .map(|function| function.borrow().name.clone())
            .collect()
    }

    fn global_names(program: &Program) -> Vec<String> {
        program
            .this_module
            .borrow()
            .globals()
            .map(|global| global.borrow().name.clone())
            .collect()
    }

    #[test]
    fn unreachable_functions_and_globals_are_removed() {
        let counter = global("counter", Some(int(0)));
        let unused = global("unused", None);
        let side_effect = function("side_effect", block(vec![]));
        let kept = global("kept", Some(call(&side_effect)));
        let leaf = function(
            "leaf",
            block(vec![Expression::new(InputSpan::builtin(), ExprVar::resolved(&counter))]),
        );
        let middle = function("middle", block(vec![call(&leaf)]));
        let dead = function("dead", block(vec![call(&leaf)]));

        let (mut program, root) = program_with_body(block(vec![call(&middle)]));
        for function in &[&side_effect, &leaf, &middle, &dead] {
            assert!(program.add_function(Rc::clone(*function)));
        }
        for global in &[&counter, &unused, &kept] {
            assert!(program.add_variable(Rc::clone(*global)));
        }

        assert!(remove_unused(&mut program));
        let mut names = function_names(&program);
        names.sort();
        assert_eq!(names, vec!["f", "leaf", "middle", "side_effect"]);
        assert_eq!(global_names(&program), vec!["counter", "kept"]);
        assert!(root.borrow().used && leaf.borrow().used && counter.borrow().used);
        assert!(!dead.borrow().used);

        assert!(!remove_unused(&mut program));
    }

    #[test]
    fn nothing_is_removed_without_roots() {
        let (mut program, root) = program_with_body(block(vec![]));
        root.borrow_mut().exports = false;
        assert!(program.add_function(function("helper", block(vec![]))));
        assert!(program.add_variable(global("g", None)));
        assert!(!remove_unused(&mut program));
        assert_eq!(function_names(&program).len(), 2);
        assert_eq!(global_names(&program), vec!["g"]);
    }

    #[test]
    fn constant_statements_are_removed() {
        let at = InputSpan::builtin();
        let body = block(vec![int(1), Expression::new(at, ExprCall::new("print", vec![])), int(2)]);
        let (mut program, function) = program_with_body(body);
        assert!(remove_unused(&mut program));
        assert_eq!(statements(&function), vec!["ExprCall"]);
    }

    #[test]
    fn value_of_a_block_is_kept() {
        let value = Expression::new(
            InputSpan::builtin(),
            ExprBlock {
                return_type: Some(TypeDecl::new(BaseType::Int)),
                ..ExprBlock::with_list(vec![int(1), int(2)])
            },
        );
        let (mut program, function) = program_with_body(value);
        assert!(remove_unused(&mut program));
        let function = function.borrow();
        let list = &function.body.as_ref().unwrap().as_block().unwrap().list;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].as_const_value(), Some(ConstValue::Int(2)));
    }
}
