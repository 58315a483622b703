use crate::program::visitors::CloneContext;
use crate::program::{AnnotationArgumentList, Expression, TypeDecl};
use crate::source::InputSpan;

/// A named, typed value: a global, a local, a function or block argument, or a loop iterator.
#[derive(Debug)]
pub struct Variable {
    pub name: String,
    pub type_: TypeDecl,
    pub init: Option<Expression>,
    pub at: InputSpan,

    /// Name of the module the variable is declared in. Only set for globals.
    pub module: Option<String>,

    pub access_get: bool,
    pub access_init: bool,
    pub access_pass: bool,
    pub access_ref: bool,

    /// The initializer is moved into the variable rather than copied.
    pub move_to_init: bool,

    pub used: bool,
    pub private_variable: bool,
    pub init_stack_size: u32,
    pub annotation: AnnotationArgumentList,
}

impl Variable {
    pub fn new(name: impl Into<String>, type_: TypeDecl, at: InputSpan) -> Variable {
        Variable {
            name: name.into(),
            type_,
            init: None,
            at,
            module: None,
            access_get: false,
            access_init: false,
            access_pass: false,
            access_ref: false,
            move_to_init: false,
            used: false,
            private_variable: false,
            init_stack_size: 0,
            annotation: AnnotationArgumentList::new(),
        }
    }

    pub fn with_init(self, init: Expression) -> Variable {
        Variable {
            init: Some(init),
            ..self
        }
    }

    /// Name qualified by the module, followed by the mangled type.
    pub fn mangled_name(&self) -> String {
        let name = match self.module {
            Some(ref module) if !module.is_empty() => format!("{}::{}", module, self.name),
            _ => self.name.clone(),
        };
        format!("{} {}", name, self.type_.mangled_name())
    }

    pub fn is_access_unused(&self) -> bool {
        !(self.access_get || self.access_init || self.access_pass || self.access_ref)
    }

    /// Deep-copies the variable. The copy does not belong to any module.
    pub fn clone_in(&self, context: &mut CloneContext) -> Variable {
        Variable {
            name: self.name.clone(),
            type_: self.type_.clone(),
            init: self.init.as_ref().map(|init| init.clone_in(context)),
            at: self.at,
            module: None,
            access_get: self.access_get,
            access_init: self.access_init,
            access_pass: self.access_pass,
            access_ref: self.access_ref,
            move_to_init: self.move_to_init,
            used: self.used,
            private_variable: self.private_variable,
            init_stack_size: self.init_stack_size,
            annotation: self.annotation.clone(),
        }
    }
}
