use crate::program::typing::BaseType;
use crate::program::{Function, Structure};
use crate::source::InputSpan;
use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;

/// A named annotation, registered in a module and attached to declarations.
///
/// Annotations are immutable once registered. Binding a structure type annotation to a structure
/// produces a new annotation, see `Annotation::create`.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub name: String,
    pub module: Option<String>,
    pub kind: AnnotationKind,
}

#[derive(Debug, Clone)]
pub enum AnnotationKind {
    /// Applies to functions. Generic function annotations make the function a generic.
    Function { generic: bool },

    /// Applies to structures without changing how they are laid out.
    Structure,

    /// A native type exposed to scripts as an opaque handle.
    HandledType {
        size: usize,
        align: usize,
        pod: bool,
        ref_type: bool,
    },

    /// Turns a structure into a handled type. Unbound until `create` is called.
    ///
    /// A bound annotation owns its structure, which is not registered in the module otherwise.
    StructureType {
        requires_pod: bool,
        bound: Option<Rc<RefCell<Structure>>>,
    },
}

impl Annotation {
    pub fn new(name: impl Into<String>, kind: AnnotationKind) -> Annotation {
        Annotation {
            name: name.into(),
            module: None,
            kind,
        }
    }

    pub fn function(name: impl Into<String>) -> Annotation {
        Annotation::new(name, AnnotationKind::Function { generic: false })
    }

    pub fn generic_function(name: impl Into<String>) -> Annotation {
        Annotation::new(name, AnnotationKind::Function { generic: true })
    }

    pub fn structure(name: impl Into<String>) -> Annotation {
        Annotation::new(name, AnnotationKind::Structure)
    }

    pub fn handled_type(name: impl Into<String>, size: usize, align: usize, pod: bool) -> Annotation {
        Annotation::new(
            name,
            AnnotationKind::HandledType {
                size,
                align,
                pod,
                ref_type: false,
            },
        )
    }

    pub fn structure_type(name: impl Into<String>, requires_pod: bool) -> Annotation {
        Annotation::new(
            name,
            AnnotationKind::StructureType {
                requires_pod,
                bound: None,
            },
        )
    }

    /// Name including the owning module, e.g. `math::packed`.
    pub fn mangled_name(&self) -> String {
        match self.module {
            Some(ref module) if !module.is_empty() => format!("{}::{}", module, self.name),
            _ => self.name.clone(),
        }
    }

    pub fn is_function_annotation(&self) -> bool {
        matches!(self.kind, AnnotationKind::Function { .. })
    }

    pub fn is_generic(&self) -> bool {
        matches!(self.kind, AnnotationKind::Function { generic: true })
    }

    /// Whether the annotation can be attached to a structure declaration.
    pub fn is_structure_annotation(&self) -> bool {
        matches!(
            self.kind,
            AnnotationKind::Structure | AnnotationKind::StructureType { .. }
        )
    }

    pub fn is_structure_type_annotation(&self) -> bool {
        matches!(self.kind, AnnotationKind::StructureType { .. })
    }

    /// Whether the annotation can be used as a type name.
    pub fn is_handled_type(&self) -> bool {
        matches!(self.kind, AnnotationKind::HandledType { .. })
    }

    pub fn is_type_annotation(&self) -> bool {
        matches!(
            self.kind,
            AnnotationKind::HandledType { .. } | AnnotationKind::StructureType { .. }
        )
    }

    /// Binds a structure type annotation to a structure.
    ///
    /// Returns an unregistered copy of this annotation named after the structure.
    pub fn create(
        &self,
        structure: &Rc<RefCell<Structure>>,
        arguments: &AnnotationArgumentList,
    ) -> Result<Annotation, String> {
        let requires_pod = match self.kind {
            AnnotationKind::StructureType { requires_pod, .. } => {
                requires_pod || arguments.get_bool_option("pod", false)
            }
            _ => return Err(format!("{} is not a structure type annotation", self.name)),
        };

        let st = structure.borrow();
        if requires_pod && !st.is_pod() {
            return Err(format!("structure {} is not plain data", st.name));
        }

        Ok(Annotation {
            name: st.name.clone(),
            module: None,
            kind: AnnotationKind::StructureType {
                requires_pod,
                bound: Some(Rc::clone(structure)),
            },
        })
    }

    /// Applies a function annotation to a function being declared.
    pub fn apply_to_function(
        &self,
        function: &mut Function,
        arguments: &AnnotationArgumentList,
    ) -> Result<(), String> {
        if !self.is_function_annotation() {
            return Err(format!("{} is not a function annotation", self.name));
        }
        match self.name.as_str() {
            "export" => function.exports = true,
            "init" => {
                if !function.arguments.is_empty() {
                    return Err("init function can't have arguments".to_string());
                }
                function.init = true;
                function.late_init = arguments.get_bool_option("late", false);
            }
            "private" => function.private_function = true,
            _ => {}
        }
        Ok(())
    }

    pub fn bound_structure(&self) -> Option<Rc<RefCell<Structure>>> {
        match self.kind {
            AnnotationKind::StructureType {
                bound: Some(ref bound),
                ..
            } => Some(Rc::clone(bound)),
            _ => None,
        }
    }

    pub fn size_of(&self) -> usize {
        match self.kind {
            AnnotationKind::HandledType { size, .. } => size,
            _ => self
                .bound_structure()
                .map(|structure| structure.borrow().size_of())
                .unwrap_or(0),
        }
    }

    pub fn align_of(&self) -> usize {
        match self.kind {
            AnnotationKind::HandledType { align, .. } => align,
            _ => self
                .bound_structure()
                .map(|structure| structure.borrow().align_of())
                .unwrap_or(1),
        }
    }

    pub fn is_pod(&self) -> bool {
        match self.kind {
            AnnotationKind::HandledType { pod, .. } => pod,
            _ => self
                .bound_structure()
                .map(|structure| structure.borrow().is_pod())
                .unwrap_or(false),
        }
    }

    pub fn is_ref_type(&self) -> bool {
        match self.kind {
            AnnotationKind::HandledType { ref_type, .. } => ref_type,
            AnnotationKind::StructureType { .. } => true,
            _ => false,
        }
    }
}

/// Value of an annotation argument.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
}

impl AnnotationValue {
    pub fn base_type(&self) -> BaseType {
        match self {
            AnnotationValue::Bool(_) => BaseType::Bool,
            AnnotationValue::Int(_) => BaseType::Int,
            AnnotationValue::Float(_) => BaseType::Float,
            AnnotationValue::String(_) => BaseType::String,
        }
    }
}

impl Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Bool(value) => write!(f, "{}", value),
            AnnotationValue::Int(value) => write!(f, "{}", value),
            AnnotationValue::Float(value) => write!(f, "{}", value),
            AnnotationValue::String(value) => write!(f, "\"{}\"", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationArgument {
    pub name: String,
    pub value: AnnotationValue,
    pub at: InputSpan,
}

impl AnnotationArgument {
    pub fn new(name: impl Into<String>, value: AnnotationValue) -> AnnotationArgument {
        AnnotationArgument {
            name: name.into(),
            value,
            at: InputSpan::builtin(),
        }
    }
}

/// An ordered list of named arguments.
///
/// Used both for annotation arguments and as the bag of program options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationArgumentList {
    pub arguments: Vec<AnnotationArgument>,
}

impl AnnotationArgumentList {
    pub fn new() -> AnnotationArgumentList {
        AnnotationArgumentList::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: AnnotationValue) {
        self.arguments.push(AnnotationArgument::new(name, value));
    }

    /// Sets an option, replacing the previous value with the same name.
    pub fn set(&mut self, name: &str, value: AnnotationValue) {
        match self.arguments.iter_mut().find(|arg| arg.name == name) {
            Some(arg) => arg.value = value,
            None => self.push(name, value),
        }
    }

    pub fn find(&self, name: &str) -> Option<&AnnotationArgument> {
        self.arguments.iter().find(|arg| arg.name == name)
    }

    pub fn get_bool_option(&self, name: &str, default: bool) -> bool {
        match self.find(name).map(|arg| &arg.value) {
            Some(AnnotationValue::Bool(value)) => *value,
            _ => default,
        }
    }

    pub fn get_int_option(&self, name: &str, default: i32) -> i32 {
        match self.find(name).map(|arg| &arg.value) {
            Some(AnnotationValue::Int(value)) => *value,
            _ => default,
        }
    }

    pub fn get_string_option(&self, name: &str, default: &str) -> String {
        match self.find(name).map(|arg| &arg.value) {
            Some(AnnotationValue::String(value)) => value.clone(),
            _ => default.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }
}

/// An annotation applied to a declaration, together with its arguments.
#[derive(Debug, Clone)]
pub struct AnnotationDeclaration {
    pub annotation: Rc<Annotation>,
    pub arguments: AnnotationArgumentList,
    pub at: InputSpan,
}

impl AnnotationDeclaration {
    pub fn new(annotation: Rc<Annotation>) -> AnnotationDeclaration {
        AnnotationDeclaration {
            annotation,
            arguments: AnnotationArgumentList::new(),
            at: InputSpan::builtin(),
        }
    }

    /// E.g. `[math::packed(align:int=16,debug:bool=true)]`.
    pub fn mangled_name(&self) -> String {
        let mut result = format!("[{}", self.annotation.mangled_name());
        if !self.arguments.is_empty() {
            let args: Vec<_> = self
                .arguments
                .arguments
                .iter()
                .map(|arg| format!("{}:{}={}", arg.name, arg.value.base_type(), arg.value))
                .collect();
            result.push_str(&format!("({})", args.join(",")));
        }
        result.push(']');
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_fall_back_to_defaults() {
        let mut options = AnnotationArgumentList::new();
        options.push("stack", AnnotationValue::Int(4096));
        options.push("log", AnnotationValue::Bool(true));

        assert_eq!(options.get_int_option("stack", 16384), 4096);
        assert_eq!(options.get_int_option("missing", 7), 7);
        assert!(options.get_bool_option("log", false));
        assert!(!options.get_bool_option("stack", false));
        assert_eq!(options.get_string_option("name", "main"), "main");

        options.set("stack", AnnotationValue::Int(128));
        assert_eq!(options.get_int_option("stack", 16384), 128);
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn declaration_mangled_name() {
        let mut annotation = Annotation::structure("packed");
        annotation.module = Some("math".to_string());

        let mut declaration = AnnotationDeclaration::new(Rc::new(annotation));
        assert_eq!(declaration.mangled_name(), "[math::packed]");

        declaration
            .arguments
            .push("align", AnnotationValue::Int(16));
        declaration
            .arguments
            .push("tag", AnnotationValue::String("x".to_string()));
        assert_eq!(
            declaration.mangled_name(),
            "[math::packed(align:int=16,tag:string=\"x\")]"
        );
    }

    #[test]
    fn categories() {
        assert!(Annotation::generic_function("g").is_generic());
        assert!(!Annotation::function("f").is_generic());
        assert!(Annotation::structure_type("st", false).is_structure_annotation());
        assert!(Annotation::structure_type("st", false).is_structure_type_annotation());
        assert!(!Annotation::structure("s").is_structure_type_annotation());
        assert!(Annotation::handled_type("h", 8, 8, true).is_handled_type());
    }
}
