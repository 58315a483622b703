//! Program representation: declarations, expression trees and the modules they live in.
//!
//! A `Program` is the compilation unit. It owns the `Library` of every module visible to it, one
//! of which (`this_module`) receives the declarations made by the builder. Resolution and
//! optimization work on the program as a whole.

pub mod expressions;
pub mod transforms;
pub mod valid;
pub mod visitors;

mod annotation;
mod display;
mod enumeration;
mod function;
mod library;
mod module;
mod policies;
mod structure;
mod typing;
mod variable;

pub use annotation::{
    Annotation, AnnotationArgument, AnnotationArgumentList, AnnotationDeclaration, AnnotationKind,
    AnnotationValue,
};
pub use enumeration::Enumeration;
pub use expressions::Expression;
pub use function::{Function, InferHistory, SideEffects};
pub use library::{describe_candidates, split_type_name, Candidate, Library, BUILTIN_MODULE};
pub use module::{CallFactory, Module, OptimizationMacro};
pub use policies::CodeOfPolicies;
pub use structure::{FieldDeclaration, FieldOwner, Structure};
pub use typing::{BaseType, TypeDecl, DIM_AUTO};
pub use variable::Variable;

use crate::errors::{self, CompilationError, CompilationErrorKind};
use crate::program::expressions::{ConstValue, ExprCall, ExprConstEnumeration, ExpressionKind};
use crate::program::typing::visit_type_slot;
use crate::program::visitors::{visit_optional, visit_variable, Rewrite, Visitor};
use crate::source::InputSpan;
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;
use tracing::{debug, trace};

/// Value of an integer constant, of any signedness and width.
pub fn get_const_expr_int_or_uint(expression: &Expression) -> Option<i64> {
    match expression.kind {
        ExpressionKind::ConstValue(ref constant) => constant.value.as_i64(),
        _ => None,
    }
}

/// A single compilation unit.
pub struct Program {
    pub library: Library,

    /// The module declarations are added to. Also registered in `library`.
    pub this_module: Rc<RefCell<Module>>,

    pub policies: CodeOfPolicies,

    /// Per-program settings, e.g. `options stack = 4096`.
    pub options: AnnotationArgumentList,

    errors: Vec<CompilationError>,
    fail_to_compile: bool,
}

type Pass = fn(&mut Program) -> bool;

const OPTIMIZATION_PASSES: [(&str, Pass); 6] = [
    ("reference folding", transforms::fold_references),
    ("unused removal", transforms::remove_unused),
    ("constant folding", transforms::fold_constants),
    ("condition folding", transforms::fold_conditions),
    ("block folding", transforms::fold_blocks),
    ("unused removal", transforms::remove_unused),
];

impl Program {
    /// Creates an empty program that sees the builtin module.
    pub fn new() -> Program {
        Program::with_policies(CodeOfPolicies::default())
    }

    pub fn with_policies(policies: CodeOfPolicies) -> Program {
        let this_module = Rc::new(RefCell::new(Module::new("")));
        let mut library = Library::new();
        let added = library.add_module(Rc::clone(&this_module));
        debug_assert!(added);
        Program {
            library,
            this_module,
            policies,
            options: AnnotationArgumentList::new(),
            errors: Vec::new(),
            fail_to_compile: false,
        }
    }

    // Diagnostics.

    /// Reports an error built from parts. Empty `extra` and `fixme` are omitted.
    pub fn error(
        &mut self,
        message: impl Into<String>,
        extra: impl Into<String>,
        fixme: impl Into<String>,
        at: InputSpan,
        kind: CompilationErrorKind,
    ) {
        self.report(
            CompilationError::new(kind, message)
                .with_extra(extra)
                .with_fixme(fixme)
                .with_location(at),
        );
    }

    pub fn report(&mut self, error: CompilationError) {
        debug!(code = error.code(), message = %error.message, "compilation error");
        self.errors.push(error);
        self.fail_to_compile = true;
    }

    pub fn failed(&self) -> bool {
        self.fail_to_compile
    }

    pub fn errors(&self) -> &[CompilationError] {
        &self.errors
    }

    // Modules.

    pub fn set_module_name(&mut self, name: impl Into<String>) {
        self.this_module.borrow_mut().rename(name);
    }

    /// Makes a module visible to the program. Returns false if the name is taken.
    #[must_use]
    pub fn add_module(&mut self, module: Module) -> bool {
        self.library.add_module(Rc::new(RefCell::new(module)))
    }

    /// Looks up a module named by a `require`, reporting an error if it is unknown.
    pub fn require_module(&mut self, at: InputSpan, name: &str) -> Option<Rc<RefCell<Module>>> {
        let module = self.library.find_module(name);
        if module.is_none() {
            self.report(errors::module_not_found(name, at));
        }
        module
    }

    /// Stack size for contexts running this program, `options stack` overriding the policy.
    pub fn context_stack_size(&self) -> u32 {
        let stack = self
            .options
            .get_int_option("stack", self.policies.stack as i32);
        stack.max(0) as u32
    }

    // Declarations.

    #[must_use]
    pub fn add_function(&mut self, function: Rc<RefCell<Function>>) -> bool {
        self.this_module.borrow_mut().add_function(function)
    }

    #[must_use]
    pub fn add_generic(&mut self, function: Rc<RefCell<Function>>) -> bool {
        self.this_module.borrow_mut().add_generic(function)
    }

    #[must_use]
    pub fn add_variable(&mut self, variable: Rc<RefCell<Variable>>) -> bool {
        self.this_module.borrow_mut().add_variable(variable)
    }

    #[must_use]
    pub fn add_structure(&mut self, structure: Rc<RefCell<Structure>>) -> bool {
        self.this_module.borrow_mut().add_structure(structure)
    }

    #[must_use]
    pub fn add_enumeration(&mut self, enumeration: Rc<RefCell<Enumeration>>) -> bool {
        self.this_module.borrow_mut().add_enumeration(enumeration)
    }

    #[must_use]
    pub fn add_alias(&mut self, alias: TypeDecl) -> bool {
        self.this_module.borrow_mut().add_alias(alias)
    }

    /// Turns a structure into a handled type by binding a structure type annotation to it.
    ///
    /// The bound annotation is registered under the structure's name. Returns false if that
    /// fails; errors other than a name clash are reported here.
    pub fn add_structure_handle(
        &mut self,
        structure: &Rc<RefCell<Structure>>,
        annotation: &Annotation,
        arguments: &AnnotationArgumentList,
    ) -> bool {
        let at = structure.borrow().at;
        if !annotation.is_structure_type_annotation() {
            self.report(errors::invalid_annotation(
                format!("not a structure annotation {}", annotation.name),
                &annotation.name,
                at,
            ));
            return false;
        }
        match annotation.create(structure, arguments) {
            Ok(bound) => self.this_module.borrow_mut().add_annotation(bound),
            Err(reason) => {
                self.report(
                    errors::invalid_annotation(
                        format!("can't create structure handle {}", annotation.name),
                        &annotation.name,
                        at,
                    )
                    .with_extra(reason),
                );
                false
            }
        }
    }

    // Lookup.

    pub fn find_structure(&self, name: &str) -> Vec<Rc<RefCell<Structure>>> {
        self.library
            .find_structure(name, Some(&self.this_module.borrow()))
    }

    pub fn find_enum(&self, name: &str) -> Vec<Rc<RefCell<Enumeration>>> {
        self.library.find_enum(name, Some(&self.this_module.borrow()))
    }

    pub fn find_annotation(&self, name: &str) -> Vec<Rc<Annotation>> {
        self.library
            .find_annotation(name, Some(&self.this_module.borrow()))
    }

    pub fn find_alias(&self, name: &str) -> Vec<TypeDecl> {
        self.library.find_alias(name, Some(&self.this_module.borrow()))
    }

    /// Resolves a type name to a structure, a handled type, an enumeration or an alias, in that
    /// order of precedence.
    ///
    /// Unknown names become forward references (`TypeDecl::alias`) to be resolved by inference.
    /// Ambiguous names are reported, and `None` is returned.
    pub fn make_type_declaration(&mut self, at: InputSpan, name: &str) -> Option<TypeDecl> {
        let structures = self.find_structure(name);
        let handles = self.find_annotation(name);
        let enumerations = self.find_enum(name);
        let aliases = self.find_alias(name);

        let categories = [
            !structures.is_empty(),
            !handles.is_empty(),
            !enumerations.is_empty(),
            !aliases.is_empty(),
        ];
        if categories.iter().filter(|&&found| found).count() > 1 {
            let mut candidates = describe_candidates(&structures);
            candidates.extend(describe_candidates(&handles));
            candidates.extend(describe_candidates(&enumerations));
            candidates.extend(describe_candidates(&aliases));
            self.report(errors::ambiguous_type_name(name, &candidates, at));
            return None;
        }

        if !structures.is_empty() {
            if structures.len() > 1 {
                let candidates = describe_candidates(&structures);
                self.report(errors::structure_ambiguous(name, &candidates, at));
                return None;
            }
            Some(TypeDecl::structure(&structures[0]).with_location(at))
        } else if !handles.is_empty() {
            if handles.len() > 1 {
                let candidates = describe_candidates(&handles);
                self.report(errors::handle_ambiguous(name, &candidates, at));
                return None;
            }
            if !handles[0].is_type_annotation() {
                self.report(errors::not_a_handled_type(name, at));
                return None;
            }
            Some(TypeDecl::handle(&handles[0]).with_location(at))
        } else if !enumerations.is_empty() {
            if enumerations.len() > 1 {
                let candidates = describe_candidates(&enumerations);
                self.report(errors::enumeration_ambiguous(name, &candidates, at));
                return None;
            }
            Some(TypeDecl::enumeration(&enumerations[0]).with_location(at))
        } else if !aliases.is_empty() {
            if aliases.len() > 1 {
                let candidates = describe_candidates(&aliases);
                self.report(errors::alias_ambiguous(name, &candidates, at));
                return None;
            }
            let mut aliases = aliases;
            aliases.pop().map(|alias| alias.with_location(at))
        } else {
            trace!(name, "forward type reference");
            Some(TypeDecl::alias(name).with_location(at))
        }
    }

    /// Makes the node for calling `name`: a builtin node if a module registered a factory for the
    /// name, or an unresolved `ExprCall` otherwise.
    pub fn make_call(&mut self, at: InputSpan, name: &str) -> Expression {
        let (module_name, call_name) = split_type_name(name);
        let mut factories = Vec::new();
        self.library.foreach(module_name.unwrap_or("*"), |module| {
            factories.extend(module.find_call(call_name));
            true
        });
        match factories.len() {
            0 => Expression::new(at, ExprCall::new(name, Vec::new())),
            1 => factories[0](at),
            _ => {
                self.report(errors::call_ambiguous(name, at));
                Expression::new(at, ExprCall::new(name, Vec::new()))
            }
        }
    }

    /// Makes a constant of the given type.
    ///
    /// Enumeration types produce the named value equal to `value`. Returns `None` if `value` does
    /// not convert to the type.
    pub fn make_const(at: InputSpan, type_: &TypeDecl, value: ConstValue) -> Option<Expression> {
        if let Some(enumeration) = type_.enumeration_ref() {
            let value = value.as_i64()?;
            let name = enumeration.borrow().find_name(value, "");
            if name.is_empty() {
                return None;
            }
            let constant = ExprConstEnumeration::new(&enumeration, name);
            return Some(Expression::new(at, constant).with_type(type_.clone()));
        }
        let value = value.convert(type_.base_type)?;
        Some(Expression::const_value(at, value).with_type(type_.clone()))
    }

    // Traversal.

    /// Visits every declaration of this module: enumerations, structures, aliases, globals,
    /// generics (if `visit_generics` is set) and non-builtin functions, in that order.
    ///
    /// Handles are snapshotted before each category, so hooks are free to inspect the module.
    /// Replacing or removing declarations is applied to the module as the visit goes.
    ///
    /// # Panics
    ///
    /// If the visitor removes a structure.
    pub fn visit(&mut self, vis: &mut dyn Visitor, visit_generics: bool) {
        let module = Rc::clone(&self.this_module);
        vis.pre_visit_program(self);

        let enumerations: Vec<_> = module.borrow().enumerations().cloned().collect();
        for enumeration in &enumerations {
            match visit_enumeration(enumeration, vis) {
                Rewrite::Keep => {}
                Rewrite::Replace(replacement) => {
                    let name = enumeration.borrow().name.clone();
                    let mut module = module.borrow_mut();
                    module.enumerations.remove(&name);
                    let replacement_name = replacement.borrow().name.clone();
                    module.enumerations.insert(replacement_name, replacement);
                }
                Rewrite::Remove => {
                    let name = enumeration.borrow().name.clone();
                    module.borrow_mut().enumerations.remove(&name);
                }
            }
        }

        let structures: Vec<_> = module.borrow().structures().cloned().collect();
        for structure in &structures {
            match visit_structure(structure, vis) {
                Rewrite::Keep => {}
                Rewrite::Replace(replacement) => module
                    .borrow_mut()
                    .replace_structure(structure, replacement),
                Rewrite::Remove => panic!(
                    "visitor removed structure `{}`",
                    structure.borrow().name
                ),
            }
        }

        let mut aliases = mem::take(&mut module.borrow_mut().aliases);
        for alias in aliases.values_mut() {
            visit_type_slot(alias, vis);
        }
        module.borrow_mut().aliases = aliases;

        vis.pre_visit_program_body(self);
        vis.pre_visit_global_let_body(self);
        let globals: Vec<_> = module.borrow().globals().cloned().collect();
        for global in &globals {
            vis.pre_visit_global_let(global);
            visit_variable(
                global,
                vis,
                |vis, init| vis.pre_visit_global_let_init(global, init),
                |vis, init| vis.visit_global_let_init(global, init),
            );
            match vis.visit_global_let(global) {
                Rewrite::Keep => {}
                Rewrite::Replace(replacement) => {
                    let mut module = module.borrow_mut();
                    module.remove_global(global);
                    let added = module.add_variable(replacement);
                    debug_assert!(added, "replacement global clashes with another global");
                }
                Rewrite::Remove => module.borrow_mut().remove_global(global),
            }
        }
        vis.visit_global_let_body(self);

        if visit_generics {
            let generics: Vec<_> = module.borrow().generics.clone().into_iter().collect();
            for (mangled_name, generic) in generics {
                if generic.borrow().builtin {
                    continue;
                }
                let rewrite = Function::visit(&generic, vis);
                let mut module = module.borrow_mut();
                match rewrite {
                    Rewrite::Keep => {}
                    Rewrite::Replace(replacement) => {
                        module.generics.remove(&mangled_name);
                        let added = module.add_generic(replacement);
                        debug_assert!(added, "replacement generic clashes with another generic");
                    }
                    Rewrite::Remove => {
                        module.generics.remove(&mangled_name);
                    }
                }
            }
        }

        let functions: Vec<_> = module.borrow().functions.clone().into_iter().collect();
        for (mangled_name, function) in functions {
            if function.borrow().builtin || !vis.can_visit_function(&function.borrow()) {
                continue;
            }
            let rewrite = Function::visit(&function, vis);
            let mut module = module.borrow_mut();
            match rewrite {
                Rewrite::Keep => {}
                Rewrite::Replace(replacement) => {
                    module.remove_function(&mangled_name);
                    let added = module.add_function(replacement);
                    debug_assert!(added, "replacement function clashes with another overload");
                }
                Rewrite::Remove => {
                    module.remove_function(&mangled_name);
                }
            }
        }

        vis.visit_program(self);
    }

    /// Runs the optimization passes, then every module's optimization macros, until none of them
    /// changes anything.
    ///
    /// Stops early once the program has failed. With `max_optimization_passes` set, a program
    /// that keeps changing is reported as not converging. Does nothing if optimization is turned
    /// off by the policies or the `optimize` option.
    pub fn optimize(&mut self) {
        if !self.options.get_bool_option("optimize", self.policies.optimize) {
            debug!("optimization is disabled");
            return;
        }
        let log_passes = self.options.get_bool_option("log_optimization_passes", false);
        let mut rounds = 0;
        loop {
            if let Some(max_passes) = self.policies.max_optimization_passes {
                if rounds >= max_passes {
                    self.report(errors::optimization_did_not_converge(rounds));
                    return;
                }
            }
            rounds += 1;

            let mut any = false;
            for &(name, pass) in OPTIMIZATION_PASSES.iter() {
                let changed = pass(self);
                debug!(round = rounds, pass = name, changed, "optimization pass");
                if log_passes {
                    trace!(pass = name, "program after pass:\n{}", self);
                }
                any |= changed;
                if self.failed() {
                    return;
                }
            }

            let mut macros = Vec::new();
            self.library.foreach("*", |module| {
                macros.extend(
                    module
                        .optimization_macros()
                        .map(|optimization| (module.name.clone(), Rc::clone(optimization))),
                );
                true
            });
            for (module_name, optimization) in macros {
                let changed = optimization.borrow_mut().apply(self);
                let macro_name = optimization.borrow().name().to_string();
                debug!(round = rounds, optimization = %macro_name, changed, "optimization macro");
                any |= changed;
                if self.failed() {
                    self.report(errors::optimization_macro_failed(&module_name, &macro_name));
                    return;
                }
            }

            if !any {
                debug!(rounds, "optimization converged");
                return;
            }
        }
    }
}

impl Default for Program {
    fn default() -> Program {
        Program::new()
    }
}

fn visit_enumeration(
    enumeration: &Rc<RefCell<Enumeration>>,
    vis: &mut dyn Visitor,
) -> Rewrite<Rc<RefCell<Enumeration>>> {
    vis.pre_visit_enumeration(&enumeration.borrow());
    let mut list = mem::take(&mut enumeration.borrow_mut().list);
    {
        let this = enumeration.borrow();
        let total = list.len();
        for (index, (name, value)) in list.iter_mut().enumerate() {
            let last = index + 1 == total;
            vis.pre_visit_enumeration_value(&this, name, value.as_ref(), last);
            let keep = match value.as_mut() {
                Some(value) => {
                    value.visit(vis).apply(value)
                        && vis
                            .visit_enumeration_value(&this, name, value, last)
                            .apply(value)
                }
                None => true,
            };
            if !keep {
                *value = None;
            }
        }
    }
    enumeration.borrow_mut().list = list;
    vis.visit_enumeration(&mut enumeration.borrow_mut())
}

fn visit_structure(
    structure: &Rc<RefCell<Structure>>,
    vis: &mut dyn Visitor,
) -> Rewrite<Rc<RefCell<Structure>>> {
    vis.pre_visit_structure(&structure.borrow());
    let mut fields = mem::take(&mut structure.borrow_mut().fields);
    {
        let this = structure.borrow();
        let visit_init = vis.can_visit_structure_field_init(&this);
        let total = fields.len();
        for (index, field) in fields.iter_mut().enumerate() {
            let last = index + 1 == total;
            vis.pre_visit_structure_field(&this, field, last);
            visit_type_slot(&mut field.type_, vis);
            if visit_init {
                visit_optional(&mut field.init, vis);
            }
            vis.visit_structure_field(&this, field, last);
        }
    }
    structure.borrow_mut().fields = fields;
    vis.visit_structure(&mut structure.borrow_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{ExprBlock, LooksLikeCallKind};

    fn structure(name: &str) -> Rc<RefCell<Structure>> {
        Rc::new(RefCell::new(Structure::new(name, InputSpan::builtin())))
    }

    fn module_with_structure(module_name: &str, name: &str) -> Module {
        let mut module = Module::new(module_name);
        assert!(module.add_structure(structure(name)));
        module
    }

    #[test]
    fn type_names_resolve_by_category() {
        let mut program = Program::new();
        assert!(program.add_structure(structure("Foo")));
        let mut enumeration = Enumeration::new("Color", BaseType::Int, InputSpan::builtin());
        assert!(enumeration.add("red"));
        assert!(program.add_enumeration(Rc::new(RefCell::new(enumeration))));
        assert!(program.add_alias(TypeDecl::new(BaseType::Float).named_alias("Meters")));

        let foo = program.make_type_declaration(InputSpan::builtin(), "Foo").unwrap();
        assert!(foo.is_structure());
        let color = program.make_type_declaration(InputSpan::builtin(), "Color").unwrap();
        assert!(color.enumeration_ref().is_some());
        let meters = program.make_type_declaration(InputSpan::builtin(), "Meters").unwrap();
        assert!(meters.is_simple_type(BaseType::Float));
        let later = program.make_type_declaration(InputSpan::builtin(), "Later").unwrap();
        assert!(later.is_alias());
        assert_eq!(later.alias, "Later");
        assert!(!program.failed());
    }

    #[test]
    fn ambiguous_structures_are_reported() {
        let mut program = Program::new();
        assert!(program.add_module(module_with_structure("a", "Foo")));
        assert!(program.add_module(module_with_structure("b", "Foo")));

        assert!(program.make_type_declaration(InputSpan::builtin(), "Foo").is_none());
        assert_eq!(program.errors().len(), 1);
        assert_eq!(program.errors()[0].kind, CompilationErrorKind::StructureNotFound);
        let extra = program.errors()[0].extra.clone().unwrap();
        assert!(extra.contains("a::Foo") && extra.contains("b::Foo"));

        let qualified = program.make_type_declaration(InputSpan::builtin(), "b::Foo");
        assert_eq!(
            qualified.unwrap().structure_ref().unwrap().borrow().module.as_deref(),
            Some("b")
        );
    }

    #[test]
    fn name_in_two_categories_is_ambiguous() {
        let mut program = Program::new();
        assert!(program.add_structure(structure("Thing")));
        let enumeration = Enumeration::new("Thing", BaseType::Int, InputSpan::builtin());
        let mut other = Module::new("other");
        assert!(other.add_enumeration(Rc::new(RefCell::new(enumeration))));
        assert!(program.add_module(other));

        assert!(program.make_type_declaration(InputSpan::builtin(), "Thing").is_none());
        assert_eq!(program.errors()[0].kind, CompilationErrorKind::TypeNotFound);
    }

    #[test]
    fn function_annotation_is_not_a_type() {
        let mut program = Program::new();
        assert!(program.make_type_declaration(InputSpan::builtin(), "export").is_none());
        assert_eq!(program.errors()[0].kind, CompilationErrorKind::HandleNotFound);
    }

    #[test]
    fn structure_handles() {
        let mut program = Program::new();
        let point = structure("Point");
        let handle = Annotation::structure_type("handle", false);
        assert!(program.add_structure_handle(&point, &handle, &AnnotationArgumentList::new()));
        let type_ = program.make_type_declaration(InputSpan::builtin(), "Point").unwrap();
        assert!(type_.is_handle());
        assert!(Rc::ptr_eq(
            &type_.annotation_ref().unwrap().bound_structure().unwrap(),
            &point
        ));

        assert!(!program.add_structure_handle(&point, &handle, &AnnotationArgumentList::new()));
        assert!(!program.failed());

        let plain = Annotation::structure("plain");
        assert!(!program.add_structure_handle(&structure("Other"), &plain, &AnnotationArgumentList::new()));
        assert_eq!(program.errors()[0].kind, CompilationErrorKind::InvalidAnnotation);
    }

    #[test]
    fn calls_use_registered_factories() {
        let mut program = Program::new();
        let assert_ = program.make_call(InputSpan::builtin(), "assert");
        match assert_.kind {
            ExpressionKind::LooksLikeCall(ref call) => {
                assert_eq!(call.kind, LooksLikeCallKind::Assert { verify: false })
            }
            _ => unreachable!(),
        }
        let user = program.make_call(InputSpan::builtin(), "frobnicate");
        assert_eq!(user.node_name(), "ExprCall");

        let mut shadow = Module::new("shadow");
        assert!(shadow.add_call("assert", |at| {
            Expression::new(at, ExprBlock::new())
        }));
        assert!(program.add_module(shadow));
        let ambiguous = program.make_call(InputSpan::builtin(), "assert");
        assert_eq!(ambiguous.node_name(), "ExprCall");
        assert_eq!(program.errors()[0].kind, CompilationErrorKind::FunctionNotFound);

        let qualified = program.make_call(InputSpan::builtin(), "shadow::assert");
        assert_eq!(qualified.node_name(), "ExprBlock");
    }

    #[test]
    fn stack_size_option_overrides_policy() {
        let mut program = Program::new();
        assert_eq!(program.context_stack_size(), 16384);
        program.options.push("stack", AnnotationValue::Int(4096));
        assert_eq!(program.context_stack_size(), 4096);
    }

    #[test]
    fn make_const_converts_and_names_enumeration_values() {
        let at = InputSpan::builtin();
        let byte = Program::make_const(at, &TypeDecl::new(BaseType::UInt8), ConstValue::Int(300));
        assert_eq!(byte.unwrap().as_const_value(), Some(ConstValue::UInt8(44)));

        let mut enumeration = Enumeration::new("Color", BaseType::Int, at);
        assert!(enumeration.add("red") && enumeration.add("green"));
        enumeration.resolve_values();
        let enumeration = Rc::new(RefCell::new(enumeration));
        let color = TypeDecl::enumeration(&enumeration);
        let green = Program::make_const(at, &color, ConstValue::Int(1)).unwrap();
        match green.kind {
            ExpressionKind::ConstEnumeration(ref constant) => assert_eq!(constant.text, "green"),
            _ => unreachable!(),
        }
        assert!(Program::make_const(at, &color, ConstValue::Int(7)).is_none());
    }

    #[test]
    fn require_unknown_module() {
        let mut program = Program::new();
        assert!(program.require_module(InputSpan::builtin(), "$").is_some());
        assert!(program.require_module(InputSpan::builtin(), "nope").is_none());
        assert_eq!(program.errors()[0].kind, CompilationErrorKind::ModuleNotFound);
    }
}
