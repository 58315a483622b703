use crate::program::expressions::Expression;
use crate::program::visitors::{
    visit_required, visit_variable, visit_variables, CloneContext, Rewrite, Visitor,
};
use crate::program::{AnnotationDeclaration, TypeDecl, Variable};
use crate::source::InputSpan;
use bitflags::bitflags;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

bitflags! {
    /// What calling a function may touch besides its result.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SideEffects: u32 {
        const UNSAFE = 1 << 0;
        const USER_SCENARIO = 1 << 1;
        const MODIFY_EXTERNAL = 1 << 2;
        const MODIFY_ARGUMENT = 1 << 3;
        const ACCESS_GLOBAL = 1 << 4;
        const INVOKE = 1 << 5;

        const MODIFY_ARGUMENT_AND_EXTERNAL = Self::MODIFY_ARGUMENT.bits() | Self::MODIFY_EXTERNAL.bits();
        const WORST_DEFAULT = Self::MODIFY_ARGUMENT_AND_EXTERNAL.bits() | Self::ACCESS_GLOBAL.bits();
    }
}

/// One step of the instantiation chain of a generic function.
#[derive(Debug, Clone)]
pub struct InferHistory {
    pub at: InputSpan,
    pub func: Option<Weak<RefCell<Function>>>,
}

#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub arguments: Vec<Rc<RefCell<Variable>>>,
    pub result: TypeDecl,

    /// `None` for builtin functions.
    pub body: Option<Expression>,

    pub annotations: Vec<AnnotationDeclaration>,
    pub at: InputSpan,

    /// Name of the module the function is registered in.
    pub module: Option<String>,

    pub builtin: bool,
    pub exports: bool,
    pub init: bool,
    pub late_init: bool,
    pub used: bool,
    pub private_function: bool,
    pub generated: bool,
    pub unsafe_operation: bool,

    pub side_effect_flags: SideEffects,
    pub infer_stack: Vec<InferHistory>,
}

impl Function {
    pub fn new(name: impl Into<String>, at: InputSpan) -> Function {
        Function {
            name: name.into(),
            arguments: Vec::new(),
            result: TypeDecl::auto(),
            body: None,
            annotations: Vec::new(),
            at,
            module: None,
            builtin: false,
            exports: false,
            init: false,
            late_init: false,
            used: false,
            private_function: false,
            generated: false,
            unsafe_operation: false,
            side_effect_flags: SideEffects::empty(),
            infer_stack: Vec::new(),
        }
    }

    /// A function implemented natively. It has no body.
    pub fn builtin(name: impl Into<String>, arguments: Vec<Variable>, result: TypeDecl) -> Function {
        Function {
            arguments: arguments
                .into_iter()
                .map(|arg| Rc::new(RefCell::new(arg)))
                .collect(),
            result,
            builtin: true,
            side_effect_flags: SideEffects::WORST_DEFAULT,
            ..Function::new(name, InputSpan::builtin())
        }
    }

    /// Name qualified by the module, followed by the mangled argument types:
    /// `@math::lerp float float float`.
    pub fn mangled_name(&self) -> String {
        let mut result = match self.module {
            Some(ref module) if !module.is_empty() => format!("@{}::{}", module, self.name),
            _ => self.name.clone(),
        };
        for arg in &self.arguments {
            result.push(' ');
            result.push_str(&arg.borrow().type_.mangled_name());
        }
        result
    }

    /// E.g. `operator + ( a : int; b : int ) : int`.
    pub fn describe(&self) -> String {
        let mut result = String::new();
        let is_operator = self
            .name
            .chars()
            .next()
            .map_or(false, |first| !first.is_alphabetic() && first != '_' && first != '`');
        if is_operator {
            result.push_str("operator ");
        }
        result.push_str(&self.name);
        if !self.arguments.is_empty() {
            let arguments: Vec<_> = self
                .arguments
                .iter()
                .map(|arg| {
                    let arg = arg.borrow();
                    format!("{} : {}", arg.name, arg.type_)
                })
                .collect();
            result.push_str(&format!(" ( {} )", arguments.join("; ")));
        }
        result.push_str(&format!(" : {}", self.result));
        result
    }

    /// The instantiation chain, for diagnostics. Empty for non-instantiated functions.
    pub fn location_extra(&self) -> String {
        if self.infer_stack.is_empty() {
            return String::new();
        }
        let mut result = format!("\nwhile compiling {}\n", self.describe());
        for history in &self.infer_stack {
            let described = history
                .func
                .as_ref()
                .and_then(Weak::upgrade)
                .map(|func| func.borrow().describe())
                .unwrap_or_else(|| "???".to_string());
            result.push_str(&format!("instanced from {} at {}\n", described, history.at));
        }
        result
    }

    pub fn find_argument(&self, name: &str) -> Option<Rc<RefCell<Variable>>> {
        self.arguments
            .iter()
            .find(|arg| arg.borrow().name == name)
            .cloned()
    }

    /// A function is generic if a generic annotation says so, or if any argument without a
    /// default has an inferred type.
    pub fn is_generic(&self) -> bool {
        if self
            .annotations
            .iter()
            .any(|declaration| declaration.annotation.is_generic())
        {
            return true;
        }
        self.arguments.iter().any(|arg| {
            let arg = arg.borrow();
            arg.type_.is_auto() && arg.init.is_none()
        })
    }

    /// `UNSAFE` is not a side effect on its own: it marks the function as an unsafe operation.
    pub fn set_side_effects(&mut self, flags: SideEffects) {
        self.side_effect_flags = flags - SideEffects::UNSAFE;
        if flags.contains(SideEffects::UNSAFE) {
            self.unsafe_operation = true;
        }
    }

    pub fn clone_in(&self, context: &mut CloneContext) -> Function {
        let arguments = context.clone_variables(&self.arguments);
        Function {
            name: self.name.clone(),
            arguments,
            result: self.result.clone(),
            body: self.body.as_ref().map(|body| body.clone_in(context)),
            annotations: self.annotations.clone(),
            at: self.at,
            module: None,
            builtin: self.builtin,
            exports: self.exports,
            init: self.init,
            late_init: self.late_init,
            used: self.used,
            private_function: self.private_function,
            generated: self.generated,
            unsafe_operation: self.unsafe_operation,
            side_effect_flags: self.side_effect_flags,
            infer_stack: self.infer_stack.clone(),
        }
    }

    /// Visits arguments, the result type and the body, then the function itself.
    ///
    /// The function is only borrowed while its own hooks run. The body is detached while it is
    /// visited.
    ///
    /// # Panics
    ///
    /// If the visitor removes an argument or the body.
    pub fn visit(
        function: &Rc<RefCell<Function>>,
        vis: &mut dyn Visitor,
    ) -> Rewrite<Rc<RefCell<Function>>> {
        vis.pre_visit_function(&function.borrow());

        let arguments = function.borrow().arguments.clone();
        let arguments = visit_variables(&arguments, vis, false, |vis, arg, last| {
            vis.pre_visit_argument(&function.borrow(), arg, last);
            visit_variable(
                arg,
                vis,
                |vis, init| vis.pre_visit_argument_init(&function.borrow(), arg, init),
                |vis, init| vis.visit_argument_init(&function.borrow(), arg, init),
            );
            vis.visit_argument(&function.borrow(), arg, last)
        });
        function.borrow_mut().arguments = arguments;

        let mut result = std::mem::take(&mut function.borrow_mut().result);
        crate::program::typing::visit_type_slot(&mut result, vis);
        function.borrow_mut().result = result;

        let body = function.borrow_mut().body.take();
        if let Some(mut body) = body {
            vis.pre_visit_function_body(&function.borrow(), &body);
            visit_required(&mut body, vis);
            let rewrite = vis.visit_function_body(&function.borrow(), &mut body);
            if !rewrite.apply(&mut body) {
                panic!("visitor removed the body of function `{}`", function.borrow().name);
            }
            function.borrow_mut().body = Some(body);
        }

        vis.visit_function(&mut function.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{ConstValue, ExprBlock, ExprVar};
    use crate::program::{Annotation, BaseType};
    use crate::source::InputSpan;

    fn arg(name: &str, type_: TypeDecl) -> Rc<RefCell<Variable>> {
        Rc::new(RefCell::new(Variable::new(name, type_, InputSpan::builtin())))
    }

    fn add() -> Function {
        let mut function = Function::new("add", InputSpan::builtin());
        function.arguments.push(arg("a", TypeDecl::new(BaseType::Int)));
        function.arguments.push(arg("b", TypeDecl::new(BaseType::Float)));
        function.result = TypeDecl::new(BaseType::Int);
        function
    }

    #[test]
    fn mangled_name_includes_module_and_arguments() {
        let mut function = add();
        assert_eq!(function.mangled_name(), "add int float");
        function.module = Some("math".to_string());
        assert_eq!(function.mangled_name(), "@math::add int float");
        function.module = Some(String::new());
        assert_eq!(function.mangled_name(), "add int float");
    }

    #[test]
    fn describe_marks_operators() {
        assert_eq!(add().describe(), "add ( a : int; b : float ) : int");
        let mut plus = add();
        plus.name = "+".to_string();
        assert!(plus.describe().starts_with("operator + ( "));
    }

    #[test]
    fn generic_by_annotation_or_auto_argument() {
        let mut function = add();
        assert!(!function.is_generic());

        function.arguments.push(arg("c", TypeDecl::auto()));
        assert!(function.is_generic());

        function.arguments[2].borrow_mut().init = Some(Expression::const_value(
            InputSpan::builtin(),
            ConstValue::Int(1),
        ));
        assert!(!function.is_generic());

        function
            .annotations
            .push(AnnotationDeclaration::new(Rc::new(Annotation::generic_function("generic"))));
        assert!(function.is_generic());
    }

    #[test]
    fn unsafe_side_effect_marks_operation() {
        let mut function = add();
        function.set_side_effects(SideEffects::UNSAFE | SideEffects::MODIFY_ARGUMENT);
        assert_eq!(function.side_effect_flags, SideEffects::MODIFY_ARGUMENT);
        assert!(function.unsafe_operation);
    }

    #[test]
    fn clone_redirects_body_to_cloned_arguments() {
        let mut function = add();
        let a = Rc::clone(&function.arguments[0]);
        function.body = Some(Expression::new(
            InputSpan::builtin(),
            ExprBlock::with_list(vec![Expression::new(InputSpan::builtin(), ExprVar::resolved(&a))]),
        ));
        function.module = Some("math".to_string());

        let copy = function.clone_in(&mut CloneContext::new());
        assert_eq!(copy.module, None);
        assert!(!Rc::ptr_eq(&copy.arguments[0], &a));
        let body = copy.body.as_ref().and_then(Expression::as_block).unwrap();
        match body.list[0].kind {
            crate::program::expressions::ExpressionKind::Var(ref var) => {
                assert!(var.refers_to(&copy.arguments[0]))
            }
            _ => unreachable!(),
        }
    }

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl Visitor for Trace {
        fn pre_visit_function(&mut self, function: &Function) {
            self.0.push(format!("function {}", function.name));
        }

        fn pre_visit_argument(&mut self, _function: &Function, arg: &Rc<RefCell<Variable>>, last: bool) {
            self.0.push(format!("argument {} {}", arg.borrow().name, last));
        }

        fn visit_type(&mut self, type_: &mut TypeDecl) {
            self.0.push(format!("type {}", type_));
        }

        fn pre_visit_function_body(&mut self, function: &Function, _body: &Expression) {
            assert!(function.body.is_none());
            self.0.push("body".to_string());
        }

        fn visit_function(&mut self, _function: &mut Function) -> Rewrite<Rc<RefCell<Function>>> {
            self.0.push("done".to_string());
            Rewrite::Keep
        }
    }

    #[test]
    fn visit_order() {
        let mut function = add();
        function.body = Some(Expression::new(InputSpan::builtin(), ExprBlock::new()));
        let function = Rc::new(RefCell::new(function));

        let mut trace = Trace::default();
        assert!(Function::visit(&function, &mut trace).is_keep());
        assert_eq!(
            trace.0,
            vec![
                "function add",
                "argument a false",
                "type int",
                "argument b true",
                "type float",
                "type int",
                "body",
                "done",
            ]
        );
        assert!(function.borrow().body.is_some());
    }
}
