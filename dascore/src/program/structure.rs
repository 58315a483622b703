use crate::program::{AnnotationArgumentList, AnnotationDeclaration, Expression, TypeDecl};
use crate::source::InputSpan;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A user-defined structure type.
///
/// Inherited fields are copied into `fields` ahead of the structure's own fields, so the field
/// list is always complete. `parent` is only consulted for native layout compatibility.
#[derive(Debug, Clone)]
pub struct Structure {
    pub name: String,
    pub fields: Vec<FieldDeclaration>,
    pub at: InputSpan,
    pub module: Option<String>,
    pub parent: Option<Weak<RefCell<Structure>>>,
    pub annotations: Vec<AnnotationDeclaration>,

    /// Fields follow the native layout rules for derived types.
    pub cpp_layout: bool,

    /// Native layout of a plain data parent: derived fields start after the padded parent.
    pub cpp_layout_pod: bool,

    pub gen_ctor: bool,
    pub generated: bool,
}

#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    pub name: String,
    pub type_: TypeDecl,
    pub init: Option<Expression>,
    pub annotation: AnnotationArgumentList,
    pub move_semantic: bool,
    pub at: InputSpan,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, type_: TypeDecl, at: InputSpan) -> FieldDeclaration {
        FieldDeclaration {
            name: name.into(),
            type_,
            init: None,
            annotation: AnnotationArgumentList::new(),
            move_semantic: false,
            at,
        }
    }
}

/// The structure which declares a field.
#[derive(Debug, Clone)]
pub enum FieldOwner {
    Parent(Rc<RefCell<Structure>>),
    This,
}

impl PartialEq for FieldOwner {
    fn eq(&self, other: &FieldOwner) -> bool {
        match (self, other) {
            (FieldOwner::Parent(left), FieldOwner::Parent(right)) => Rc::ptr_eq(left, right),
            (FieldOwner::This, FieldOwner::This) => true,
            _ => false,
        }
    }
}

impl Structure {
    pub fn new(name: impl Into<String>, at: InputSpan) -> Structure {
        Structure {
            name: name.into(),
            fields: Vec::new(),
            at,
            module: None,
            parent: None,
            annotations: Vec::new(),
            cpp_layout: false,
            cpp_layout_pod: false,
            gen_ctor: false,
            generated: false,
        }
    }

    /// Creates a structure that inherits all fields of `parent`.
    pub fn derived(
        name: impl Into<String>,
        parent: &Rc<RefCell<Structure>>,
        at: InputSpan,
    ) -> Structure {
        Structure {
            fields: parent.borrow().fields.clone(),
            parent: Some(Rc::downgrade(parent)),
            ..Structure::new(name, at)
        }
    }

    pub fn parent_ref(&self) -> Option<Rc<RefCell<Structure>>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn mangled_name(&self) -> String {
        match self.module {
            Some(ref module) if !module.is_empty() => format!("{}::{}", module, self.name),
            _ => self.name.clone(),
        }
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn find_field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Returns the structure a field comes from, preferring the parent.
    pub fn find_field_parent(&self, name: &str) -> Option<FieldOwner> {
        if let Some(parent) = self.parent_ref() {
            if parent.borrow().find_field(name).is_some() {
                return Some(FieldOwner::Parent(parent));
            }
        }
        self.find_field(name).map(|_| FieldOwner::This)
    }

    /// Whether a value of this structure can be reinterpreted as `cast`.
    ///
    /// Every field of this structure must match the field at the same position in `cast` both by
    /// name and by type.
    pub fn is_compatible_cast(&self, cast: &Structure) -> bool {
        if cast.fields.len() < self.fields.len() {
            return false;
        }
        self.fields
            .iter()
            .zip(cast.fields.iter())
            .all(|(field, cast_field)| {
                field.name == cast_field.name
                    && field.type_.is_same_type(&cast_field.type_, true, true, true)
            })
    }

    pub fn has_any_initializers(&self) -> bool {
        self.fields.iter().any(|field| field.init.is_some())
    }

    pub fn can_copy(&self) -> bool {
        self.fields.iter().all(|field| field.type_.can_copy())
    }

    pub fn can_move(&self) -> bool {
        self.fields.iter().all(|field| field.type_.can_move())
    }

    pub fn can_clone(&self) -> bool {
        self.fields.iter().all(|field| field.type_.can_clone())
    }

    pub fn is_pod(&self) -> bool {
        self.fields.iter().all(|field| field.type_.is_pod())
    }

    pub fn size_of(&self) -> usize {
        let mut size = 0;
        let mut layout_owner: Option<FieldOwner> = None;
        for field in &self.fields {
            if self.cpp_layout {
                let owner = self.find_field_parent(&field.name);
                if owner != layout_owner {
                    if self.cpp_layout_pod {
                        size = match layout_owner {
                            Some(FieldOwner::Parent(ref parent)) => parent.borrow().size_of(),
                            _ => size,
                        };
                    }
                    layout_owner = owner;
                }
            }
            size = align_up(size, field.type_.align_of());
            size += field.type_.size_of();
        }
        align_up(size, self.align_of())
    }

    pub fn align_of(&self) -> usize {
        self.fields
            .iter()
            .map(|field| field.type_.align_of())
            .max()
            .unwrap_or(1)
            .max(1)
    }
}

fn align_up(size: usize, align: usize) -> usize {
    let align = align.max(1);
    (size + align - 1) / align * align
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::BaseType;

    fn field(name: &str, base_type: BaseType) -> FieldDeclaration {
        FieldDeclaration::new(name, TypeDecl::new(base_type), InputSpan::builtin())
    }

    fn structure(name: &str, fields: Vec<FieldDeclaration>) -> Structure {
        Structure {
            fields,
            ..Structure::new(name, InputSpan::builtin())
        }
    }

    #[test]
    fn compatible_cast_requires_matching_prefix() {
        let base = structure("Base", vec![field("a", BaseType::Int), field("b", BaseType::Float)]);
        let extended = structure(
            "Extended",
            vec![
                field("a", BaseType::Int),
                field("b", BaseType::Float),
                field("c", BaseType::Bool),
            ],
        );
        let renamed = structure("Renamed", vec![field("a", BaseType::Int), field("x", BaseType::Float)]);
        let retyped = structure("Retyped", vec![field("a", BaseType::Int), field("b", BaseType::Int)]);

        assert!(base.is_compatible_cast(&base));
        assert!(base.is_compatible_cast(&extended));
        assert!(!extended.is_compatible_cast(&base));
        assert!(!base.is_compatible_cast(&renamed));
        assert!(!base.is_compatible_cast(&retyped));
    }

    #[test]
    fn size_and_alignment_with_padding() {
        let st = structure(
            "Padded",
            vec![
                field("a", BaseType::Int8),
                field("b", BaseType::Double),
                field("c", BaseType::Int16),
            ],
        );
        assert_eq!(st.align_of(), 8);
        assert_eq!(st.size_of(), 24);
        assert_eq!(structure("Empty", Vec::new()).size_of(), 0);
    }

    #[test]
    fn native_layout_starts_after_padded_parent() {
        let parent = Rc::new(RefCell::new(structure(
            "Parent",
            vec![field("a", BaseType::Double), field("b", BaseType::Int8)],
        )));
        assert_eq!(parent.borrow().size_of(), 16);

        let mut child = Structure::derived("Child", &parent, InputSpan::builtin());
        child.fields.push(field("c", BaseType::Int8));
        assert_eq!(child.size_of(), 16);

        child.cpp_layout = true;
        assert_eq!(child.size_of(), 16);

        child.cpp_layout_pod = true;
        assert_eq!(child.size_of(), 24);
    }

    #[test]
    fn field_parent_prefers_parent() {
        let parent = Rc::new(RefCell::new(structure("Parent", vec![field("a", BaseType::Int)])));
        let mut child = Structure::derived("Child", &parent, InputSpan::builtin());
        child.fields.push(field("b", BaseType::Int));

        assert_eq!(
            child.find_field_parent("a"),
            Some(FieldOwner::Parent(Rc::clone(&parent)))
        );
        assert_eq!(child.find_field_parent("b"), Some(FieldOwner::This));
        assert_eq!(child.find_field_parent("c"), None);
        assert_eq!(child.find_field_index("b"), Some(1));
    }
}
