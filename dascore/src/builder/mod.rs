//! Actions the grammar runs while reducing declarations.
//!
//! Every action takes the program being built through `ParseContext`. Errors are reported to
//! the program and the action recovers with a best-effort result, so a single parse reports as
//! many problems as possible.

use crate::errors::{self, CompilationErrorKind};
use crate::program::expressions::{ExprConstEnumeration, ExprLet, Expression, ExpressionKind};
use crate::program::{
    describe_candidates, Annotation, AnnotationArgumentList, AnnotationDeclaration, BaseType,
    Enumeration, FieldDeclaration, Function, Program, Structure, TypeDecl, Variable,
};
use crate::source::InputSpan;
use crate::utils::graphs::find_any_cycle;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// One declaration line: `a, b : int = 1`.
///
/// Every name gets its own copy of the type and the initializer. An omitted type is inferred.
#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub names: Vec<(String, InputSpan)>,
    pub type_decl: Option<TypeDecl>,
    pub init: Option<Expression>,

    /// Declared with `<-`.
    pub move_to_init: bool,

    pub at: InputSpan,
    pub annotation: AnnotationArgumentList,
}

impl VariableDeclaration {
    pub fn new(
        names: Vec<(String, InputSpan)>,
        type_decl: Option<TypeDecl>,
        at: InputSpan,
    ) -> VariableDeclaration {
        VariableDeclaration {
            names,
            type_decl,
            init: None,
            move_to_init: false,
            at,
            annotation: AnnotationArgumentList::new(),
        }
    }

    /// Shorthand for a declaration of a single name.
    pub fn single(name: impl Into<String>, type_decl: Option<TypeDecl>, at: InputSpan) -> VariableDeclaration {
        VariableDeclaration::new(vec![(name.into(), at)], type_decl, at)
    }

    pub fn with_init(self, init: Expression, move_to_init: bool) -> VariableDeclaration {
        VariableDeclaration {
            init: Some(init),
            move_to_init,
            ..self
        }
    }

    fn into_variables(self) -> Vec<Variable> {
        let VariableDeclaration {
            names,
            type_decl,
            init,
            move_to_init,
            annotation,
            ..
        } = self;
        let type_ = type_decl.unwrap_or_else(TypeDecl::auto);
        names
            .into_iter()
            .map(|(name, at)| {
                let mut variable = Variable::new(name, type_.clone(), at);
                variable.init = init.clone();
                variable.move_to_init = move_to_init;
                variable.annotation = annotation.clone();
                variable
            })
            .collect()
    }
}

/// `name = value` inside an enumeration declaration. The value is optional.
#[derive(Debug, Clone)]
pub struct EnumerationEntry {
    pub name: String,
    pub value: Option<Expression>,
    pub at: InputSpan,
}

impl EnumerationEntry {
    pub fn new(name: impl Into<String>, value: Option<Expression>, at: InputSpan) -> EnumerationEntry {
        EnumerationEntry {
            name: name.into(),
            value,
            at,
        }
    }
}

pub struct ParseContext<'p> {
    pub program: &'p mut Program,
}

impl<'p> ParseContext<'p> {
    pub fn new(program: &'p mut Program) -> ParseContext<'p> {
        ParseContext { program }
    }

    /// Reports an error raised by the grammar itself.
    pub fn error(&mut self, message: impl Into<String>, at: InputSpan, kind: CompilationErrorKind) {
        self.program.error(message, "", "", at, kind);
    }

    /// Flattens `a, b, c`, parsed as `Sequence(a, Sequence(b, c))`, into a list.
    pub fn sequence_to_list(&self, expression: Expression) -> Vec<Expression> {
        let mut list = Vec::new();
        let mut rest = expression;
        loop {
            rest = match rest.kind {
                ExpressionKind::Sequence(sequence) => {
                    list.push(*sequence.left);
                    *sequence.right
                }
                _ => {
                    list.push(rest);
                    return list;
                }
            };
        }
    }

    pub fn find_annotation(&mut self, name: &str, at: InputSpan) -> Option<Rc<Annotation>> {
        let mut found = self.program.find_annotation(name);
        match found.len() {
            0 => {
                self.program.report(errors::annotation_not_found(name, at));
                None
            }
            1 => found.pop(),
            _ => {
                let candidates = describe_candidates(&found);
                self.program
                    .report(errors::annotation_ambiguous(name, &candidates, at));
                None
            }
        }
    }

    /// Declares a function in the current module.
    ///
    /// Returns the function unless it duplicates an existing overload.
    pub fn make_function(
        &mut self,
        at: InputSpan,
        name: &str,
        arguments: Vec<VariableDeclaration>,
        result: Option<TypeDecl>,
        body: Expression,
        annotations: Vec<AnnotationDeclaration>,
    ) -> Option<Rc<RefCell<Function>>> {
        let mut function = Function::new(name, at);
        if let Some(result) = result {
            function.result = result;
        }
        function.body = Some(body);

        for variable in arguments.into_iter().flat_map(VariableDeclaration::into_variables) {
            let previous = function
                .arguments
                .iter()
                .find(|argument| argument.borrow().name == variable.name)
                .map(|argument| argument.borrow().at);
            if previous.is_some() {
                self.program.report(errors::argument_already_declared(
                    &variable.name,
                    name,
                    variable.at,
                    previous,
                ));
                continue;
            }
            function.arguments.push(Rc::new(RefCell::new(variable)));
        }

        for declaration in annotations {
            let annotation = &declaration.annotation;
            if !annotation.is_function_annotation() {
                self.program.report(errors::invalid_annotation(
                    format!("`{}` is not a function annotation", annotation.name),
                    &annotation.name,
                    declaration.at,
                ));
                continue;
            }
            if let Err(reason) = annotation.apply_to_function(&mut function, &declaration.arguments) {
                self.program.report(
                    errors::invalid_annotation(
                        format!("can't apply annotation `{}`", annotation.name),
                        &annotation.name,
                        declaration.at,
                    )
                    .with_extra(reason),
                );
                continue;
            }
            function.annotations.push(declaration);
        }

        let generic = function.is_generic();
        let function = Rc::new(RefCell::new(function));
        let added = if generic {
            self.program.add_generic(Rc::clone(&function))
        } else {
            self.program.add_function(Rc::clone(&function))
        };
        if added {
            return Some(function);
        }

        let mangled_name = function.borrow().mangled_name();
        let previous = {
            let module = self.program.this_module.borrow();
            if generic {
                module
                    .generics()
                    .find(|existing| existing.borrow().mangled_name() == mangled_name)
                    .cloned()
            } else {
                module.find_function(&mangled_name)
            }
        };
        let previous = previous.map(|existing| existing.borrow().at);
        self.program
            .report(errors::function_already_declared(&mangled_name, at, previous));
        None
    }

    /// Makes `let` (or `let inscope`) out of declaration lines.
    pub fn make_let(
        &mut self,
        at: InputSpan,
        in_scope: bool,
        declarations: Vec<VariableDeclaration>,
    ) -> Expression {
        let mut let_ = ExprLet::new(Vec::new());
        let_.in_scope = in_scope;
        for variable in declarations
            .into_iter()
            .flat_map(VariableDeclaration::into_variables)
        {
            if let Some(previous) = let_.find(&variable.name) {
                let previous = previous.borrow().at;
                self.program.report(errors::local_variable_already_declared(
                    &variable.name,
                    variable.at,
                    Some(previous),
                ));
                continue;
            }
            let_.variables.push(Rc::new(RefCell::new(variable)));
        }
        Expression::new(at, let_)
    }

    pub fn add_globals(&mut self, declarations: Vec<VariableDeclaration>) {
        for variable in declarations
            .into_iter()
            .flat_map(VariableDeclaration::into_variables)
        {
            let name = variable.name.clone();
            let at = variable.at;
            if self.program.add_variable(Rc::new(RefCell::new(variable))) {
                continue;
            }
            let previous = self
                .program
                .this_module
                .borrow()
                .find_variable(&name)
                .map(|existing| existing.borrow().at);
            self.program
                .report(errors::global_variable_already_declared(&name, at, previous));
        }
    }

    pub fn make_enumeration(
        &mut self,
        at: InputSpan,
        name: &str,
        base_type: BaseType,
        entries: Vec<EnumerationEntry>,
    ) -> Option<Rc<RefCell<Enumeration>>> {
        let mut enumeration = Enumeration::new(name, base_type, at);
        for entry in entries {
            if !enumeration.add_value(entry.name.as_str(), entry.value) {
                self.program.report(errors::enumeration_value_already_declared(
                    name,
                    &entry.name,
                    entry.at,
                ));
            }
        }
        enumeration.resolve_values();

        let enumeration = Rc::new(RefCell::new(enumeration));
        if self.program.add_enumeration(Rc::clone(&enumeration)) {
            return Some(enumeration);
        }
        let previous = self
            .program
            .this_module
            .borrow()
            .find_enumeration(name)
            .map(|existing| existing.borrow().at);
        self.program
            .report(errors::enumeration_already_declared(name, at, previous));
        None
    }

    /// Declares a structure, or a handled type if it carries a structure type annotation.
    ///
    /// The structure is returned even if its fields form a cycle, so that later passes can keep
    /// going. It is not returned if it could not be registered.
    pub fn make_structure(
        &mut self,
        at: InputSpan,
        name: &str,
        parent: Option<&Rc<RefCell<Structure>>>,
        fields: Vec<VariableDeclaration>,
        annotations: Vec<AnnotationDeclaration>,
    ) -> Option<Rc<RefCell<Structure>>> {
        let mut structure = match parent {
            Some(parent) => Structure::derived(name, parent, at),
            None => Structure::new(name, at),
        };

        for field in fields {
            let move_semantic = field.move_to_init;
            for variable in field.into_variables() {
                if let Some(previous) = structure.find_field(&variable.name) {
                    self.program.report(errors::structure_field_already_declared(
                        name,
                        &variable.name,
                        variable.at,
                        Some(previous.at),
                    ));
                    continue;
                }
                let mut declaration = FieldDeclaration::new(variable.name, variable.type_, variable.at);
                declaration.init = variable.init;
                declaration.annotation = variable.annotation;
                declaration.move_semantic = move_semantic;
                structure.fields.push(declaration);
            }
        }

        if annotations.len() > 1 {
            self.program.report(errors::invalid_annotation(
                format!("structure `{}` can only have one annotation", name),
                &annotations[1].annotation.name,
                annotations[1].at,
            ));
            return None;
        }
        if let Some(declaration) = annotations.first() {
            if !declaration.annotation.is_structure_annotation() {
                self.program.report(errors::invalid_annotation(
                    format!("`{}` is not a structure annotation", declaration.annotation.name),
                    &declaration.annotation.name,
                    declaration.at,
                ));
                return None;
            }
        }
        structure.annotations = annotations;

        let handle = structure
            .annotations
            .first()
            .filter(|declaration| declaration.annotation.is_structure_type_annotation())
            .cloned();
        let structure = Rc::new(RefCell::new(structure));
        let added = match handle {
            Some(declaration) => self.add_handle(&structure, &declaration),
            None => self.add_structure(&structure),
        };
        if !added {
            return None;
        }

        self.check_field_cycles(&structure);
        Some(structure)
    }

    fn add_structure(&mut self, structure: &Rc<RefCell<Structure>>) -> bool {
        if self.program.add_structure(Rc::clone(structure)) {
            return true;
        }
        let (name, at) = {
            let structure = structure.borrow();
            (structure.name.clone(), structure.at)
        };
        let previous = self
            .program
            .this_module
            .borrow()
            .find_structure(&name)
            .map(|existing| existing.borrow().at);
        self.program
            .report(errors::structure_already_declared(&name, at, previous));
        false
    }

    fn add_handle(
        &mut self,
        structure: &Rc<RefCell<Structure>>,
        declaration: &AnnotationDeclaration,
    ) -> bool {
        let (name, at) = {
            let structure = structure.borrow();
            (structure.name.clone(), structure.at)
        };
        let existing = self.program.this_module.borrow().find_annotation(&name);
        if let Some(existing) = existing {
            let previous = existing.bound_structure().map(|bound| bound.borrow().at);
            self.program
                .report(errors::structure_already_declared(&name, at, previous));
            return false;
        }
        let added = self.program.add_structure_handle(
            structure,
            &declaration.annotation,
            &declaration.arguments,
        );
        if added {
            debug!(structure = %name, annotation = %declaration.annotation.name, "declared handled type");
        }
        added
    }

    /// Reports a cycle of structures containing each other by value, starting at `structure`.
    ///
    /// Returns false if there is one.
    pub fn check_field_cycles(&mut self, structure: &Rc<RefCell<Structure>>) -> bool {
        let mut graph: DiGraph<Rc<RefCell<Structure>>, (String, InputSpan)> = DiGraph::new();
        let mut nodes: HashMap<*const RefCell<Structure>, NodeIndex> = HashMap::new();

        let start = graph.add_node(Rc::clone(structure));
        nodes.insert(Rc::as_ptr(structure), start);
        let mut pending = vec![start];
        while let Some(node) = pending.pop() {
            let current = Rc::clone(&graph[node]);
            for field in &current.borrow().fields {
                if !field.type_.is_structure() {
                    continue;
                }
                let target = match field.type_.structure_ref() {
                    Some(target) => target,
                    None => continue,
                };
                let target_node = match nodes.get(&Rc::as_ptr(&target)) {
                    Some(&index) => index,
                    None => {
                        let index = graph.add_node(Rc::clone(&target));
                        nodes.insert(Rc::as_ptr(&target), index);
                        pending.push(index);
                        index
                    }
                };
                graph.add_edge(node, target_node, (field.name.clone(), field.at));
            }
        }
        trace!(
            structure = %structure.borrow().name,
            structures = graph.node_count(),
            "checked structure field graph"
        );

        let cycle = match find_any_cycle(&graph, start) {
            Some(cycle) => cycle,
            None => return true,
        };

        let mut location = structure.borrow().at;
        let mut steps = Vec::new();
        for (index, &from) in cycle.iter().enumerate() {
            let to = cycle[(index + 1) % cycle.len()];
            if let Some(edge) = graph.find_edge(from, to) {
                let (ref field, at) = graph[edge];
                if index == 0 {
                    location = at;
                }
                steps.push((graph[from].borrow().name.clone(), field.clone()));
            }
        }
        self.program
            .report(errors::structure_field_cycle(&steps, location));
        false
    }

    pub fn make_alias(&mut self, at: InputSpan, alias: TypeDecl) -> bool {
        let name = alias.alias.clone();
        if self.program.add_alias(alias.with_location(at)) {
            return true;
        }
        self.program
            .report(errors::type_alias_already_declared(&name, at));
        false
    }

    /// Makes `Enum.value`.
    pub fn make_enum_constant(
        &mut self,
        at: InputSpan,
        enum_name: &str,
        value_name: &str,
    ) -> Option<Expression> {
        let mut found = self.program.find_enum(enum_name);
        let enumeration = match found.len() {
            0 => {
                self.program
                    .report(errors::enumeration_not_found(enum_name, at));
                return None;
            }
            1 => found.pop()?,
            _ => {
                let candidates = describe_candidates(&found);
                self.program
                    .report(errors::enumeration_ambiguous(enum_name, &candidates, at));
                return None;
            }
        };

        if enumeration.borrow().find(value_name).is_none() {
            let name = enumeration.borrow().name.clone();
            self.program
                .report(errors::enumeration_value_not_found(&name, value_name, at));
            return None;
        }
        let constant = Expression::new(at, ExprConstEnumeration::new(&enumeration, value_name))
            .with_type(Enumeration::make_enum_type(&enumeration));
        Some(constant)
    }

    /// `call <| argument`: appends the argument to the call.
    pub fn pipe_call(&mut self, at: InputSpan, mut call: Expression, argument: Expression) -> Expression {
        match call_arguments(&mut call) {
            Some(arguments) => arguments.push(argument),
            None => self.program.report(errors::cant_pipe(at)),
        }
        call
    }

    /// `argument |> call`: passes the argument first.
    pub fn pipe_call_left(&mut self, at: InputSpan, argument: Expression, mut call: Expression) -> Expression {
        match call_arguments(&mut call) {
            Some(arguments) => arguments.insert(0, argument),
            None => self.program.report(errors::cant_pipe(at)),
        }
        call
    }
}

fn call_arguments(call: &mut Expression) -> Option<&mut Vec<Expression>> {
    match call.kind {
        ExpressionKind::LooksLikeCall(ref mut call) => Some(&mut call.arguments),
        ExpressionKind::Call(ref mut call) => Some(&mut call.arguments),
        _ => None,
    }
}
