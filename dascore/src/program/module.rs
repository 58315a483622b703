use crate::program::expressions::Expression;
use crate::program::{Annotation, Enumeration, Function, Program, Structure, TypeDecl, Variable};
use crate::source::InputSpan;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::rc::Rc;
use tracing::{debug, trace};

/// Makes the node for a builtin that is called like a function but compiled specially.
pub type CallFactory = fn(InputSpan) -> Expression;

/// A program-wide rewrite contributed by a module, run by `Program::optimize` after the builtin
/// passes.
pub trait OptimizationMacro {
    fn name(&self) -> &str;

    /// Rewrites the program. Returns whether anything changed.
    ///
    /// Failure is signalled by reporting an error to the program.
    fn apply(&mut self, program: &mut Program) -> bool;
}

/// A named collection of declarations.
///
/// All maps are ordered by name, so iteration (and everything derived from it, like dumps) is
/// deterministic. Structures and globals additionally keep their declaration order.
pub struct Module {
    pub name: String,

    /// Native modules. Their functions are never visited or removed.
    pub builtin: bool,

    pub(crate) functions: BTreeMap<String, Rc<RefCell<Function>>>,
    pub(crate) generics: BTreeMap<String, Rc<RefCell<Function>>>,
    pub(crate) structures: BTreeMap<String, Rc<RefCell<Structure>>>,
    pub(crate) structures_in_order: Vec<Rc<RefCell<Structure>>>,
    pub(crate) enumerations: BTreeMap<String, Rc<RefCell<Enumeration>>>,
    pub(crate) globals: BTreeMap<String, Rc<RefCell<Variable>>>,
    pub(crate) globals_in_order: Vec<Rc<RefCell<Variable>>>,
    pub(crate) annotations: BTreeMap<String, Rc<Annotation>>,
    pub(crate) aliases: BTreeMap<String, TypeDecl>,
    pub(crate) calls: BTreeMap<String, CallFactory>,
    pub(crate) optimization_macros: Vec<Rc<RefCell<dyn OptimizationMacro>>>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Module {
        Module {
            name: name.into(),
            builtin: false,
            functions: BTreeMap::new(),
            generics: BTreeMap::new(),
            structures: BTreeMap::new(),
            structures_in_order: Vec::new(),
            enumerations: BTreeMap::new(),
            globals: BTreeMap::new(),
            globals_in_order: Vec::new(),
            annotations: BTreeMap::new(),
            aliases: BTreeMap::new(),
            calls: BTreeMap::new(),
            optimization_macros: Vec::new(),
        }
    }

    /// Registers a function under its mangled name. Returns false if the exact overload exists.
    #[must_use]
    pub fn add_function(&mut self, function: Rc<RefCell<Function>>) -> bool {
        let mangled_name = self.stamp_function(&function);
        if self.functions.contains_key(&mangled_name) {
            return false;
        }
        debug!(module = %self.name, function = %mangled_name, "registered function");
        self.functions.insert(mangled_name, function);
        true
    }

    #[must_use]
    pub fn add_generic(&mut self, function: Rc<RefCell<Function>>) -> bool {
        let mangled_name = self.stamp_function(&function);
        if self.generics.contains_key(&mangled_name) {
            return false;
        }
        debug!(module = %self.name, generic = %mangled_name, "registered generic");
        self.generics.insert(mangled_name, function);
        true
    }

    /// Sets the owning module of the function and returns the resulting mangled name.
    fn stamp_function(&self, function: &Rc<RefCell<Function>>) -> String {
        let mut function = function.borrow_mut();
        function.module = Some(self.name.clone());
        function.mangled_name()
    }

    #[must_use]
    pub fn add_variable(&mut self, variable: Rc<RefCell<Variable>>) -> bool {
        let name = variable.borrow().name.clone();
        if self.globals.contains_key(&name) {
            return false;
        }
        variable.borrow_mut().module = Some(self.name.clone());
        debug!(module = %self.name, global = %name, "registered global");
        self.globals.insert(name, Rc::clone(&variable));
        self.globals_in_order.push(variable);
        true
    }

    #[must_use]
    pub fn add_structure(&mut self, structure: Rc<RefCell<Structure>>) -> bool {
        let name = structure.borrow().name.clone();
        if self.structures.contains_key(&name) {
            return false;
        }
        structure.borrow_mut().module = Some(self.name.clone());
        debug!(module = %self.name, structure = %name, "registered structure");
        self.structures.insert(name, Rc::clone(&structure));
        self.structures_in_order.push(structure);
        true
    }

    #[must_use]
    pub fn add_enumeration(&mut self, enumeration: Rc<RefCell<Enumeration>>) -> bool {
        let name = enumeration.borrow().name.clone();
        if self.enumerations.contains_key(&name) {
            return false;
        }
        enumeration.borrow_mut().module = Some(self.name.clone());
        debug!(module = %self.name, enumeration = %name, "registered enumeration");
        self.enumerations.insert(name, enumeration);
        true
    }

    /// Registers a type alias under `alias.alias`.
    #[must_use]
    pub fn add_alias(&mut self, alias: TypeDecl) -> bool {
        if self.aliases.contains_key(&alias.alias) {
            return false;
        }
        debug!(module = %self.name, alias = %alias.alias, "registered alias");
        self.aliases.insert(alias.alias.clone(), alias);
        true
    }

    #[must_use]
    pub fn add_annotation(&mut self, mut annotation: Annotation) -> bool {
        if self.annotations.contains_key(&annotation.name) {
            return false;
        }
        annotation.module = Some(self.name.clone());
        debug!(module = %self.name, annotation = %annotation.name, "registered annotation");
        self.annotations
            .insert(annotation.name.clone(), Rc::new(annotation));
        true
    }

    #[must_use]
    pub fn add_call(&mut self, name: impl Into<String>, factory: CallFactory) -> bool {
        let name = name.into();
        if self.calls.contains_key(&name) {
            return false;
        }
        trace!(module = %self.name, call = %name, "registered call factory");
        self.calls.insert(name, factory);
        true
    }

    pub fn add_optimization_macro(&mut self, optimization: Rc<RefCell<dyn OptimizationMacro>>) {
        debug!(
            module = %self.name,
            optimization = %optimization.borrow().name(),
            "registered optimization macro"
        );
        self.optimization_macros.push(optimization);
    }

    /// Renames the module, updating the declarations it owns.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        let name = Some(self.name.clone());
        for functions in &mut [&mut self.functions, &mut self.generics] {
            let rekeyed: BTreeMap<_, _> = functions
                .values()
                .map(|function| {
                    function.borrow_mut().module = name.clone();
                    let mangled_name = function.borrow().mangled_name();
                    (mangled_name, Rc::clone(function))
                })
                .collect();
            **functions = rekeyed;
        }
        for structure in &self.structures_in_order {
            structure.borrow_mut().module = name.clone();
        }
        for enumeration in self.enumerations.values() {
            enumeration.borrow_mut().module = name.clone();
        }
        for global in &self.globals_in_order {
            global.borrow_mut().module = name.clone();
        }
        self.annotations = self
            .annotations
            .iter()
            .map(|(key, annotation)| {
                let mut annotation = Annotation::clone(annotation);
                annotation.module = name.clone();
                (key.clone(), Rc::new(annotation))
            })
            .collect();
    }

    pub fn find_function(&self, mangled_name: &str) -> Option<Rc<RefCell<Function>>> {
        self.functions.get(mangled_name).cloned()
    }

    /// All overloads with the given (unmangled) name.
    pub fn find_functions(&self, name: &str) -> Vec<Rc<RefCell<Function>>> {
        self.functions
            .values()
            .filter(|function| function.borrow().name == name)
            .cloned()
            .collect()
    }

    pub fn find_generics(&self, name: &str) -> Vec<Rc<RefCell<Function>>> {
        self.generics
            .values()
            .filter(|function| function.borrow().name == name)
            .cloned()
            .collect()
    }

    pub fn find_variable(&self, name: &str) -> Option<Rc<RefCell<Variable>>> {
        self.globals.get(name).cloned()
    }

    pub fn find_structure(&self, name: &str) -> Option<Rc<RefCell<Structure>>> {
        self.structures.get(name).cloned()
    }

    pub fn find_enumeration(&self, name: &str) -> Option<Rc<RefCell<Enumeration>>> {
        self.enumerations.get(name).cloned()
    }

    pub fn find_annotation(&self, name: &str) -> Option<Rc<Annotation>> {
        self.annotations.get(name).cloned()
    }

    pub fn find_alias(&self, name: &str) -> Option<TypeDecl> {
        self.aliases.get(name).cloned()
    }

    pub fn find_call(&self, name: &str) -> Option<CallFactory> {
        self.calls.get(name).copied()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Rc<RefCell<Function>>> {
        self.functions.values()
    }

    pub fn generics(&self) -> impl Iterator<Item = &Rc<RefCell<Function>>> {
        self.generics.values()
    }

    /// Structures in declaration order.
    pub fn structures(&self) -> impl Iterator<Item = &Rc<RefCell<Structure>>> {
        self.structures_in_order.iter()
    }

    pub fn enumerations(&self) -> impl Iterator<Item = &Rc<RefCell<Enumeration>>> {
        self.enumerations.values()
    }

    /// Globals in declaration order.
    pub fn globals(&self) -> impl Iterator<Item = &Rc<RefCell<Variable>>> {
        self.globals_in_order.iter()
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Rc<Annotation>> {
        self.annotations.values()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &TypeDecl> {
        self.aliases.values()
    }

    pub fn optimization_macros(&self) -> impl Iterator<Item = &Rc<RefCell<dyn OptimizationMacro>>> {
        self.optimization_macros.iter()
    }

    pub(crate) fn remove_function(&mut self, mangled_name: &str) -> Option<Rc<RefCell<Function>>> {
        self.functions.remove(mangled_name)
    }

    pub(crate) fn remove_global(&mut self, variable: &Rc<RefCell<Variable>>) {
        let name = variable.borrow().name.clone();
        self.globals.remove(&name);
        self.globals_in_order
            .retain(|global| !Rc::ptr_eq(global, variable));
    }

    /// Swaps a structure for another one in both the map and the declaration order.
    pub(crate) fn replace_structure(
        &mut self,
        old: &Rc<RefCell<Structure>>,
        new: Rc<RefCell<Structure>>,
    ) {
        let old_name = old.borrow().name.clone();
        let new_name = new.borrow().name.clone();
        self.structures.remove(&old_name);
        self.structures.insert(new_name, Rc::clone(&new));
        for slot in &mut self.structures_in_order {
            if Rc::ptr_eq(slot, old) {
                *slot = Rc::clone(&new);
            }
        }
    }
}

impl Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("builtin", &self.builtin)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("generics", &self.generics.keys().collect::<Vec<_>>())
            .field("structures", &self.structures.keys().collect::<Vec<_>>())
            .field("enumerations", &self.enumerations.keys().collect::<Vec<_>>())
            .field("globals", &self.globals.keys().collect::<Vec<_>>())
            .field("annotations", &self.annotations.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases.keys().collect::<Vec<_>>())
            .field("calls", &self.calls.keys().collect::<Vec<_>>())
            .finish()
    }
}
