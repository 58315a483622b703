use crate::program::expressions::{ExprLooksLikeCall, Expression, LooksLikeCallKind};
use crate::program::{Annotation, CallFactory, Enumeration, Function, Module, Structure, TypeDecl};
use crate::source::InputSpan;
use std::cell::RefCell;
use std::rc::Rc;

/// Name of the module holding the builtin calls and annotations.
pub const BUILTIN_MODULE: &str = "$";

/// All modules visible to a program, in registration order.
#[derive(Debug)]
pub struct Library {
    modules: Vec<Rc<RefCell<Module>>>,
}

impl Library {
    /// Creates a library containing only the builtin module.
    pub fn new() -> Library {
        Library {
            modules: vec![Rc::new(RefCell::new(builtin_module()))],
        }
    }

    /// Registers a module. Returns false if a module with that name is already present.
    #[must_use]
    pub fn add_module(&mut self, module: Rc<RefCell<Module>>) -> bool {
        let name = module.borrow().name.clone();
        if self.find_module(&name).is_some() {
            return false;
        }
        self.modules.push(module);
        true
    }

    pub fn find_module(&self, name: &str) -> Option<Rc<RefCell<Module>>> {
        self.modules
            .iter()
            .find(|module| module.borrow().name == name)
            .cloned()
    }

    pub fn modules(&self) -> impl Iterator<Item = &Rc<RefCell<Module>>> {
        self.modules.iter()
    }

    /// Calls `func` for every module named `module_name`, or for every module if the name is
    /// `*` or empty, until it returns false.
    ///
    /// Returns false if `func` stopped the iteration.
    pub fn foreach(&self, module_name: &str, mut func: impl FnMut(&Module) -> bool) -> bool {
        let every = module_name == "*" || module_name.is_empty();
        for module in &self.modules {
            let module = module.borrow();
            if (every || module.name == module_name) && !func(&module) {
                return false;
            }
        }
        true
    }

    /// Looks a declaration up by a possibly qualified name.
    ///
    /// `module::name` searches `module` only, `::name` searches the `context` module, and a plain
    /// `name` searches every module.
    fn find_in<T>(
        &self,
        name: &str,
        context: Option<&Module>,
        lookup: impl Fn(&Module, &str) -> Option<T>,
    ) -> Vec<T> {
        let (module_name, name) = split_type_name(name);
        match module_name {
            None => self
                .modules
                .iter()
                .filter_map(|module| lookup(&module.borrow(), name))
                .collect(),
            Some("") if context.is_some() => context
                .and_then(|module| lookup(module, name))
                .into_iter()
                .collect(),
            Some(module_name) => self
                .find_module(module_name)
                .and_then(|module| lookup(&module.borrow(), name))
                .into_iter()
                .collect(),
        }
    }

    pub fn find_structure(&self, name: &str, context: Option<&Module>) -> Vec<Rc<RefCell<Structure>>> {
        self.find_in(name, context, Module::find_structure)
    }

    pub fn find_enum(&self, name: &str, context: Option<&Module>) -> Vec<Rc<RefCell<Enumeration>>> {
        self.find_in(name, context, Module::find_enumeration)
    }

    pub fn find_annotation(&self, name: &str, context: Option<&Module>) -> Vec<Rc<Annotation>> {
        self.find_in(name, context, Module::find_annotation)
    }

    pub fn find_alias(&self, name: &str, context: Option<&Module>) -> Vec<TypeDecl> {
        self.find_in(name, context, Module::find_alias)
    }

    pub fn find_call(&self, name: &str, context: Option<&Module>) -> Vec<CallFactory> {
        self.find_in(name, context, Module::find_call)
    }

    pub fn find_functions(&self, name: &str, context: Option<&Module>) -> Vec<Rc<RefCell<Function>>> {
        self.find_in(name, context, |module, name| Some(module.find_functions(name)))
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn find_generics(&self, name: &str, context: Option<&Module>) -> Vec<Rc<RefCell<Function>>> {
        self.find_in(name, context, |module, name| Some(module.find_generics(name)))
            .into_iter()
            .flatten()
            .collect()
    }
}

impl Default for Library {
    fn default() -> Library {
        Library::new()
    }
}

/// Splits `module::name` at the last `::`. Returns no module for unqualified names.
pub fn split_type_name(name: &str) -> (Option<&str>, &str) {
    match name.rfind("::") {
        Some(index) => (Some(&name[..index]), &name[index + 2..]),
        None => (None, name),
    }
}

/// Something that can be listed as a candidate of an ambiguous lookup.
pub trait Candidate {
    fn describe_candidate(&self) -> String;
}

impl Candidate for Rc<RefCell<Structure>> {
    fn describe_candidate(&self) -> String {
        self.borrow().mangled_name()
    }
}

impl Candidate for Rc<RefCell<Enumeration>> {
    fn describe_candidate(&self) -> String {
        self.borrow().mangled_name()
    }
}

impl Candidate for Rc<RefCell<Function>> {
    fn describe_candidate(&self) -> String {
        let function = self.borrow();
        match function.module {
            Some(ref module) if !module.is_empty() => {
                format!("{}::{}", module, function.describe())
            }
            _ => function.describe(),
        }
    }
}

impl Candidate for Rc<Annotation> {
    fn describe_candidate(&self) -> String {
        self.mangled_name()
    }
}

impl Candidate for TypeDecl {
    fn describe_candidate(&self) -> String {
        format!("{} = {}", self.alias, self)
    }
}

/// Describes each candidate of an ambiguous lookup, one line each.
pub fn describe_candidates<T: Candidate>(candidates: &[T]) -> Vec<String> {
    candidates.iter().map(Candidate::describe_candidate).collect()
}

fn looks_like_call(at: InputSpan, name: &str, kind: LooksLikeCallKind) -> Expression {
    Expression::new(at, ExprLooksLikeCall::new(name, kind))
}

fn builtin_module() -> Module {
    let mut module = Module::new(BUILTIN_MODULE);
    module.builtin = true;

    let calls: [(&str, CallFactory); 10] = [
        ("assert", |at| {
            looks_like_call(at, "assert", LooksLikeCallKind::Assert { verify: false })
        }),
        ("verify", |at| {
            looks_like_call(at, "verify", LooksLikeCallKind::Assert { verify: true })
        }),
        ("static_assert", |at| {
            looks_like_call(at, "static_assert", LooksLikeCallKind::StaticAssert)
        }),
        ("concept_assert", |at| {
            looks_like_call(at, "concept_assert", LooksLikeCallKind::StaticAssert)
        }),
        ("debug", |at| looks_like_call(at, "debug", LooksLikeCallKind::Debug)),
        ("invoke", |at| looks_like_call(at, "invoke", LooksLikeCallKind::Invoke)),
        ("erase", |at| looks_like_call(at, "erase", LooksLikeCallKind::Erase)),
        ("find", |at| looks_like_call(at, "find", LooksLikeCallKind::Find)),
        ("key_exists", |at| {
            looks_like_call(at, "key_exists", LooksLikeCallKind::KeyExists)
        }),
        ("memzero", |at| looks_like_call(at, "memzero", LooksLikeCallKind::MemZero)),
    ];
    for (name, factory) in calls.iter() {
        let added = module.add_call(*name, *factory);
        debug_assert!(added, "builtin call `{}` registered twice", name);
    }

    let annotations = [
        Annotation::function("export"),
        Annotation::function("init"),
        Annotation::function("private"),
        Annotation::generic_function("generic"),
    ];
    for annotation in annotations.iter() {
        let added = module.add_annotation(annotation.clone());
        debug_assert!(added, "builtin annotation `{}` registered twice", annotation.name);
    }

    module
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::ExpressionKind;

    fn library_with(names: &[(&str, &[&str])]) -> Library {
        let mut library = Library::new();
        for (module_name, structures) in names {
            let mut module = Module::new(*module_name);
            for name in structures.iter() {
                let structure = Structure::new(*name, InputSpan::builtin());
                assert!(module.add_structure(Rc::new(RefCell::new(structure))));
            }
            assert!(library.add_module(Rc::new(RefCell::new(module))));
        }
        library
    }

    #[test]
    fn split_names() {
        assert_eq!(split_type_name("Foo"), (None, "Foo"));
        assert_eq!(split_type_name("math::Foo"), (Some("math"), "Foo"));
        assert_eq!(split_type_name("::Foo"), (Some(""), "Foo"));
        assert_eq!(split_type_name("a::b::Foo"), (Some("a::b"), "Foo"));
    }

    #[test]
    fn unqualified_lookup_returns_every_candidate() {
        let library = library_with(&[("a", &["Foo", "Bar"]), ("b", &["Foo"])]);
        let found = library.find_structure("Foo", None);
        assert_eq!(found.len(), 2);
        assert_eq!(
            describe_candidates(&found),
            vec!["a::Foo".to_string(), "b::Foo".to_string()]
        );
        assert_eq!(library.find_structure("Bar", None).len(), 1);
        assert!(library.find_structure("Baz", None).is_empty());
    }

    #[test]
    fn qualified_lookup_is_restricted_to_the_module() {
        let library = library_with(&[("a", &["Foo"]), ("b", &["Foo"])]);
        let found = library.find_structure("b::Foo", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].borrow().module.as_deref(), Some("b"));
        assert!(library.find_structure("c::Foo", None).is_empty());
        assert!(library.find_structure("a::Bar", None).is_empty());
    }

    #[test]
    fn empty_qualifier_means_the_context_module() {
        let library = library_with(&[("a", &["Foo"]), ("b", &["Foo"])]);
        let context = library.find_module("b").unwrap();
        let found = library.find_structure("::Foo", Some(&context.borrow()));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].borrow().module.as_deref(), Some("b"));
    }

    #[test]
    fn modules_are_unique() {
        let mut library = Library::new();
        assert!(library.add_module(Rc::new(RefCell::new(Module::new("a")))));
        assert!(!library.add_module(Rc::new(RefCell::new(Module::new("a")))));
        assert!(!library.add_module(Rc::new(RefCell::new(Module::new(BUILTIN_MODULE)))));
    }

    #[test]
    fn foreach_filters_and_stops() {
        let library = library_with(&[("a", &[]), ("b", &[])]);
        let mut seen = Vec::new();
        assert!(library.foreach("*", |module| {
            seen.push(module.name.clone());
            true
        }));
        assert_eq!(seen, vec!["$", "a", "b"]);

        seen.clear();
        assert!(library.foreach("b", |module| {
            seen.push(module.name.clone());
            true
        }));
        assert_eq!(seen, vec!["b"]);

        let mut visited = 0;
        assert!(!library.foreach("", |_| {
            visited += 1;
            visited < 2
        }));
        assert_eq!(visited, 2);
    }

    #[test]
    fn builtin_calls_make_looks_like_calls() {
        let library = Library::new();
        let factories = library.find_call("verify", None);
        assert_eq!(factories.len(), 1);
        let call = factories[0](InputSpan::builtin());
        match call.kind {
            ExpressionKind::LooksLikeCall(ref call) => {
                assert_eq!(call.name, "verify");
                assert_eq!(call.kind, LooksLikeCallKind::Assert { verify: true });
            }
            _ => unreachable!(),
        }
        assert_eq!(library.find_call("$::memzero", None).len(), 1);
        assert!(library.find_call("print", None).is_empty());
        assert!(library.find_annotation("generic", None)[0].is_generic());
    }
}
