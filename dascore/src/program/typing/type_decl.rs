use crate::program::typing::BaseType;
use crate::program::visitors::Visitor;
use crate::program::{Annotation, Enumeration, Structure};
use crate::source::InputSpan;
use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::{Rc, Weak};

/// Dimension value of a fixed array whose size is still to be inferred.
pub const DIM_AUTO: i32 = -1;

/// Structural type descriptor.
///
/// A `TypeDecl` is a value: installing it into a variable, a field or a function copies it. Links
/// to user-defined types (`struct_type`, `enum_type`, `annotation`) are non-owning and compare by
/// identity.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub base_type: BaseType,

    /// Pointer target, array element, table key, iterator element, or block/function result.
    pub first_type: Option<Box<TypeDecl>>,

    /// Table value.
    pub second_type: Option<Box<TypeDecl>>,

    /// Block/function arguments, tuple elements or variant alternatives.
    pub arg_types: Vec<TypeDecl>,

    /// Tuple element or variant alternative names.
    pub arg_names: Vec<String>,

    /// Fixed array dimensions, outermost first.
    pub dim: Vec<i32>,

    /// Alias name, for `BaseType::Alias`.
    pub alias: String,

    pub constant: bool,
    pub ref_: bool,
    pub remove_constant: bool,
    pub remove_ref: bool,
    pub remove_dim: bool,
    pub temporary: bool,
    pub implicit: bool,

    pub struct_type: Option<Weak<RefCell<Structure>>>,
    pub enum_type: Option<Weak<RefCell<Enumeration>>>,
    pub annotation: Option<Weak<Annotation>>,

    pub at: InputSpan,
}

impl TypeDecl {
    pub fn new(base_type: BaseType) -> TypeDecl {
        TypeDecl {
            base_type,
            first_type: None,
            second_type: None,
            arg_types: Vec::new(),
            arg_names: Vec::new(),
            dim: Vec::new(),
            alias: String::new(),
            constant: false,
            ref_: false,
            remove_constant: false,
            remove_ref: false,
            remove_dim: false,
            temporary: false,
            implicit: false,
            struct_type: None,
            enum_type: None,
            annotation: None,
            at: InputSpan::builtin(),
        }
    }

    pub fn auto() -> TypeDecl {
        TypeDecl::new(BaseType::AutoInfer)
    }

    /// A reference to a type by name, to be resolved later.
    pub fn alias(name: impl Into<String>) -> TypeDecl {
        TypeDecl {
            alias: name.into(),
            ..TypeDecl::new(BaseType::Alias)
        }
    }

    pub fn pointer_to(target: TypeDecl) -> TypeDecl {
        TypeDecl {
            first_type: Some(Box::new(target)),
            ..TypeDecl::new(BaseType::Pointer)
        }
    }

    pub fn array_of(element: TypeDecl) -> TypeDecl {
        TypeDecl {
            first_type: Some(Box::new(element)),
            ..TypeDecl::new(BaseType::Array)
        }
    }

    pub fn table_of(key: TypeDecl, value: TypeDecl) -> TypeDecl {
        TypeDecl {
            first_type: Some(Box::new(key)),
            second_type: Some(Box::new(value)),
            ..TypeDecl::new(BaseType::Table)
        }
    }

    pub fn block(result: TypeDecl, arguments: Vec<TypeDecl>) -> TypeDecl {
        TypeDecl {
            first_type: Some(Box::new(result)),
            arg_types: arguments,
            ..TypeDecl::new(BaseType::Block)
        }
    }

    pub fn tuple(elements: Vec<TypeDecl>, names: Vec<String>) -> TypeDecl {
        TypeDecl {
            arg_types: elements,
            arg_names: names,
            ..TypeDecl::new(BaseType::Tuple)
        }
    }

    pub fn variant(alternatives: Vec<TypeDecl>, names: Vec<String>) -> TypeDecl {
        TypeDecl {
            arg_types: alternatives,
            arg_names: names,
            ..TypeDecl::new(BaseType::Variant)
        }
    }

    pub fn structure(structure: &Rc<RefCell<Structure>>) -> TypeDecl {
        TypeDecl {
            struct_type: Some(Rc::downgrade(structure)),
            ..TypeDecl::new(BaseType::Structure)
        }
    }

    /// A reference to an enumeration. The base type follows the enumeration's storage type.
    pub fn enumeration(enumeration: &Rc<RefCell<Enumeration>>) -> TypeDecl {
        let base_type = enumeration.borrow().enum_type();
        TypeDecl {
            enum_type: Some(Rc::downgrade(enumeration)),
            ..TypeDecl::new(base_type)
        }
    }

    pub fn handle(annotation: &Rc<Annotation>) -> TypeDecl {
        TypeDecl {
            annotation: Some(Rc::downgrade(annotation)),
            ..TypeDecl::new(BaseType::Handle)
        }
    }

    pub fn with_location(self, at: InputSpan) -> TypeDecl {
        TypeDecl { at, ..self }
    }

    /// The same type declared under another name, as in `typedef Meters = float`.
    pub fn named_alias(self, name: impl Into<String>) -> TypeDecl {
        TypeDecl {
            alias: name.into(),
            ..self
        }
    }

    pub fn structure_ref(&self) -> Option<Rc<RefCell<Structure>>> {
        self.struct_type.as_ref().and_then(Weak::upgrade)
    }

    pub fn enumeration_ref(&self) -> Option<Rc<RefCell<Enumeration>>> {
        self.enum_type.as_ref().and_then(Weak::upgrade)
    }

    pub fn annotation_ref(&self) -> Option<Rc<Annotation>> {
        self.annotation.as_ref().and_then(Weak::upgrade)
    }

    /// Whether the type, or any type nested in it, still has to be inferred.
    pub fn is_auto(&self) -> bool {
        self.base_type == BaseType::AutoInfer
            || self.dim.iter().any(|&dim| dim == DIM_AUTO)
            || self.nested_types().any(TypeDecl::is_auto)
    }

    /// Whether the type, or any type nested in it, is an unresolved alias.
    pub fn is_alias(&self) -> bool {
        self.base_type == BaseType::Alias || self.nested_types().any(TypeDecl::is_alias)
    }

    pub fn is_void(&self) -> bool {
        self.base_type == BaseType::Void && self.dim.is_empty()
    }

    pub fn is_pointer(&self) -> bool {
        self.base_type == BaseType::Pointer && self.dim.is_empty()
    }

    pub fn is_handle(&self) -> bool {
        self.base_type == BaseType::Handle && self.dim.is_empty()
    }

    pub fn is_structure(&self) -> bool {
        self.base_type == BaseType::Structure && self.dim.is_empty()
    }

    /// Whether the type is a plain scalar or vector of the given kind, without dimensions.
    pub fn is_simple_type(&self, base_type: BaseType) -> bool {
        self.base_type == base_type && self.dim.is_empty()
    }

    /// Types which are always passed by reference.
    pub fn is_ref_type(&self) -> bool {
        if !self.dim.is_empty() {
            return true;
        }
        match self.base_type {
            BaseType::Structure
            | BaseType::Array
            | BaseType::Table
            | BaseType::Tuple
            | BaseType::Variant => true,
            BaseType::Handle => self
                .annotation_ref()
                .map(|annotation| annotation.is_ref_type())
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Whether the value is a reference that is not passed by reference anyway.
    pub fn is_ref(&self) -> bool {
        self.ref_ && !self.is_ref_type()
    }

    /// Returns the index of a tuple element or a variant alternative.
    pub fn find_argument_index(&self, name: &str) -> Option<usize> {
        self.arg_names.iter().position(|arg_name| arg_name == name)
    }

    /// Compares types structurally.
    ///
    /// Nested types always compare with all qualifiers taken into account. The `remove_*`
    /// qualifiers of generic signatures and `implicit` always matter, so types that compare
    /// equal with every flag set have the same `mangled_name`.
    pub fn is_same_type(
        &self,
        other: &TypeDecl,
        ref_matters: bool,
        const_matters: bool,
        temporary_matters: bool,
    ) -> bool {
        if self.base_type != other.base_type {
            return false;
        }
        if ref_matters && self.ref_ != other.ref_ {
            return false;
        }
        if const_matters && self.constant != other.constant {
            return false;
        }
        if temporary_matters && self.temporary != other.temporary {
            return false;
        }
        if self.implicit != other.implicit
            || self.remove_constant != other.remove_constant
            || self.remove_ref != other.remove_ref
            || self.remove_dim != other.remove_dim
        {
            return false;
        }
        if self.dim != other.dim {
            return false;
        }

        let same_link = match self.base_type {
            BaseType::Structure => same_weak(&self.struct_type, &other.struct_type),
            BaseType::Enumeration | BaseType::Enumeration8 | BaseType::Enumeration16 => {
                same_weak(&self.enum_type, &other.enum_type)
            }
            BaseType::Handle => same_weak(&self.annotation, &other.annotation),
            BaseType::Alias => self.alias == other.alias,
            _ => true,
        };
        if !same_link {
            return false;
        }

        if self.base_type == BaseType::Variant && self.arg_names != other.arg_names {
            return false;
        }

        same_nested(&self.first_type, &other.first_type)
            && same_nested(&self.second_type, &other.second_type)
            && self.arg_types.len() == other.arg_types.len()
            && self
                .arg_types
                .iter()
                .zip(other.arg_types.iter())
                .all(|(left, right)| left.is_same_type(right, true, true, true))
    }

    /// Returns a compact string uniquely identifying the type. Used for overload identity.
    pub fn mangled_name(&self) -> String {
        let mut result = String::new();
        if self.constant {
            result.push('C');
        }
        if self.ref_ {
            result.push('&');
        }
        if self.temporary {
            result.push('#');
        }
        if self.implicit {
            result.push('I');
        }
        if self.remove_constant {
            result.push_str("-C");
        }
        if self.remove_ref {
            result.push_str("-&");
        }
        if self.remove_dim {
            result.push_str("-[]");
        }
        for dim in &self.dim {
            result.push_str(&format!("[{}]", dim));
        }

        if let Some(ref first) = self.first_type {
            result.push_str(&format!("1<{}>", first.mangled_name()));
        }
        if let Some(ref second) = self.second_type {
            result.push_str(&format!("2<{}>", second.mangled_name()));
        }
        if !self.arg_types.is_empty() {
            let args: Vec<_> = self.arg_types.iter().map(TypeDecl::mangled_name).collect();
            result.push_str(&format!("0<{}>", args.join(";")));
        }
        if !self.arg_names.is_empty() {
            result.push_str(&format!("N<{}>", self.arg_names.join(";")));
        }

        match self.base_type {
            BaseType::Structure => match self.structure_ref() {
                Some(structure) => {
                    result.push_str(&format!("S<{}>", structure.borrow().mangled_name()))
                }
                None => result.push_str("S<?>"),
            },
            BaseType::Enumeration | BaseType::Enumeration8 | BaseType::Enumeration16 => {
                let prefix = match self.base_type {
                    BaseType::Enumeration8 => "E8",
                    BaseType::Enumeration16 => "E16",
                    _ => "E",
                };
                match self.enumeration_ref() {
                    Some(enumeration) => result.push_str(&format!(
                        "{}<{}>",
                        prefix,
                        enumeration.borrow().mangled_name()
                    )),
                    None => result.push_str(prefix),
                }
            }
            BaseType::Handle => match self.annotation_ref() {
                Some(annotation) => {
                    result.push_str(&format!("H<{}>", annotation.mangled_name()))
                }
                None => result.push_str("H<?>"),
            },
            BaseType::Alias => result.push_str(&format!("Y<{}>", self.alias)),
            BaseType::AutoInfer => result.push('.'),
            BaseType::AnyArgument => result.push('*'),
            BaseType::Pointer => result.push('?'),
            BaseType::Array => result.push('A'),
            BaseType::Table => result.push('T'),
            BaseType::Iterator => result.push('G'),
            BaseType::Block => result.push('$'),
            BaseType::Function => result.push_str("@@"),
            BaseType::Lambda => result.push('@'),
            BaseType::Tuple => result.push('U'),
            BaseType::Variant => result.push('V'),
            other => result.push_str(other.name()),
        }

        result
    }

    /// Size of a value of this type in bytes.
    pub fn size_of(&self) -> usize {
        let element = self.base_size_of();
        self.dim
            .iter()
            .fold(element, |size, &dim| size * dim.max(0) as usize)
    }

    fn base_size_of(&self) -> usize {
        if let Some(size) = self.base_type.size_of() {
            return size;
        }
        match self.base_type {
            BaseType::Structure => self
                .structure_ref()
                .map(|structure| structure.borrow().size_of())
                .unwrap_or(0),
            BaseType::Handle => self
                .annotation_ref()
                .map(|annotation| annotation.size_of())
                .unwrap_or(0),
            BaseType::Tuple => {
                let mut size = 0;
                for arg in &self.arg_types {
                    let align = arg.align_of();
                    size = align_up(size, align) + arg.size_of();
                }
                align_up(size, self.align_of())
            }
            BaseType::Variant => {
                let payload = self.arg_types.iter().map(TypeDecl::size_of).max().unwrap_or(0);
                let align = self.align_of();
                align_up(align_up(4, align) + payload, align)
            }
            _ => 0,
        }
    }

    /// Alignment of a value of this type in bytes.
    pub fn align_of(&self) -> usize {
        if let Some(align) = self.base_type.align_of() {
            return align;
        }
        match self.base_type {
            BaseType::Structure => self
                .structure_ref()
                .map(|structure| structure.borrow().align_of())
                .unwrap_or(1),
            BaseType::Handle => self
                .annotation_ref()
                .map(|annotation| annotation.align_of())
                .unwrap_or(1),
            BaseType::Tuple => self.arg_types.iter().map(TypeDecl::align_of).max().unwrap_or(1),
            BaseType::Variant => self
                .arg_types
                .iter()
                .map(TypeDecl::align_of)
                .max()
                .unwrap_or(1)
                .max(4),
            _ => 1,
        }
    }

    /// Plain data, which can be copied bit by bit.
    pub fn is_pod(&self) -> bool {
        match self.base_type {
            BaseType::String
            | BaseType::Array
            | BaseType::Table
            | BaseType::Block
            | BaseType::Lambda
            | BaseType::Iterator => false,
            BaseType::Structure => self
                .structure_ref()
                .map(|structure| structure.borrow().is_pod())
                .unwrap_or(false),
            BaseType::Handle => self
                .annotation_ref()
                .map(|annotation| annotation.is_pod())
                .unwrap_or(false),
            BaseType::Tuple | BaseType::Variant => self.arg_types.iter().all(TypeDecl::is_pod),
            _ => true,
        }
    }

    pub fn can_copy(&self) -> bool {
        match self.base_type {
            BaseType::Array
            | BaseType::Table
            | BaseType::Block
            | BaseType::Lambda
            | BaseType::Iterator => false,
            BaseType::Structure => self
                .structure_ref()
                .map(|structure| structure.borrow().can_copy())
                .unwrap_or(false),
            BaseType::Handle => self
                .annotation_ref()
                .map(|annotation| annotation.is_pod())
                .unwrap_or(false),
            BaseType::Tuple | BaseType::Variant => self.arg_types.iter().all(TypeDecl::can_copy),
            _ => true,
        }
    }

    pub fn can_move(&self) -> bool {
        match self.base_type {
            BaseType::Block | BaseType::FakeContext | BaseType::FakeLineInfo => false,
            BaseType::Structure => self
                .structure_ref()
                .map(|structure| structure.borrow().can_move())
                .unwrap_or(false),
            BaseType::Tuple | BaseType::Variant => self.arg_types.iter().all(TypeDecl::can_move),
            _ => true,
        }
    }

    pub fn can_clone(&self) -> bool {
        match self.base_type {
            BaseType::Block | BaseType::Iterator => false,
            BaseType::Structure => self
                .structure_ref()
                .map(|structure| structure.borrow().can_clone())
                .unwrap_or(false),
            BaseType::Tuple | BaseType::Variant => self.arg_types.iter().all(TypeDecl::can_clone),
            BaseType::Array | BaseType::Table => self.nested_types().all(TypeDecl::can_clone),
            _ => true,
        }
    }

    /// Visits nested types first, then the type itself.
    pub fn visit(&mut self, vis: &mut dyn Visitor) {
        if let Some(ref mut first) = self.first_type {
            visit_type_slot(first, vis);
        }
        if let Some(ref mut second) = self.second_type {
            visit_type_slot(second, vis);
        }
        for arg in &mut self.arg_types {
            visit_type_slot(arg, vis);
        }
    }

    fn nested_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.first_type
            .iter()
            .map(|first| first.as_ref())
            .chain(self.second_type.iter().map(|second| second.as_ref()))
            .chain(self.arg_types.iter())
    }
}

/// Runs the full visiting protocol on a type slot: pre-hook, nested types, post-hook.
pub(crate) fn visit_type_slot(type_: &mut TypeDecl, vis: &mut dyn Visitor) {
    vis.pre_visit_type(type_);
    type_.visit(vis);
    vis.visit_type(type_);
}

impl Default for TypeDecl {
    fn default() -> TypeDecl {
        TypeDecl::new(BaseType::None)
    }
}

impl PartialEq for TypeDecl {
    fn eq(&self, other: &TypeDecl) -> bool {
        self.is_same_type(other, true, true, true)
    }
}

impl Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base_type {
            BaseType::Alias => write!(f, "{}", self.alias)?,
            BaseType::Structure => match self.structure_ref() {
                Some(structure) => write!(f, "{}", structure.borrow().name)?,
                None => write!(f, "structure")?,
            },
            BaseType::Enumeration | BaseType::Enumeration8 | BaseType::Enumeration16 => {
                match self.enumeration_ref() {
                    Some(enumeration) => write!(f, "{}", enumeration.borrow().name)?,
                    None => write!(f, "{}", self.base_type)?,
                }
            }
            BaseType::Handle => match self.annotation_ref() {
                Some(annotation) => write!(f, "{}", annotation.name)?,
                None => write!(f, "handle")?,
            },
            BaseType::Pointer => match self.first_type {
                Some(ref target) => write!(f, "{}?", target)?,
                None => write!(f, "void?")?,
            },
            BaseType::Array | BaseType::Iterator => match self.first_type {
                Some(ref element) => write!(f, "{}<{}>", self.base_type, element)?,
                None => write!(f, "{}", self.base_type)?,
            },
            BaseType::Table => match (&self.first_type, &self.second_type) {
                (Some(key), Some(value)) => write!(f, "table<{};{}>", key, value)?,
                _ => write!(f, "table")?,
            },
            BaseType::Block | BaseType::Function | BaseType::Lambda => {
                write!(f, "{}<", self.base_type)?;
                if !self.arg_types.is_empty() {
                    let args: Vec<_> = self.arg_types.iter().map(|arg| arg.to_string()).collect();
                    write!(f, "({})", args.join(";"))?;
                }
                match self.first_type {
                    Some(ref result) => write!(f, ":{}>", result)?,
                    None => write!(f, ">")?,
                }
            }
            BaseType::Tuple | BaseType::Variant => {
                let args: Vec<_> = self
                    .arg_types
                    .iter()
                    .enumerate()
                    .map(|(index, arg)| match self.arg_names.get(index) {
                        Some(name) => format!("{}:{}", name, arg),
                        None => arg.to_string(),
                    })
                    .collect();
                write!(f, "{}<{}>", self.base_type, args.join(";"))?;
            }
            other => write!(f, "{}", other)?,
        }

        for dim in &self.dim {
            if *dim == DIM_AUTO {
                write!(f, "[]")?;
            } else {
                write!(f, "[{}]", dim)?;
            }
        }
        if self.constant {
            write!(f, " const")?;
        }
        if self.remove_constant {
            write!(f, " -const")?;
        }
        if self.ref_ {
            write!(f, "&")?;
        }
        if self.remove_ref {
            write!(f, " -&")?;
        }
        if self.temporary {
            write!(f, "#")?;
        }
        Ok(())
    }
}

fn same_weak<T>(left: &Option<Weak<T>>, right: &Option<Weak<T>>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left.ptr_eq(right),
        (None, None) => true,
        _ => false,
    }
}

fn same_nested(left: &Option<Box<TypeDecl>>, right: &Option<Box<TypeDecl>>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left.is_same_type(right, true, true, true),
        (None, None) => true,
        _ => false,
    }
}

fn align_up(size: usize, align: usize) -> usize {
    let align = align.max(1);
    (size + align - 1) / align * align
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangled_names_distinguish_qualifiers() {
        let int = TypeDecl::new(BaseType::Int);
        let const_int = TypeDecl {
            constant: true,
            ..TypeDecl::new(BaseType::Int)
        };
        let int_ref = TypeDecl {
            ref_: true,
            ..TypeDecl::new(BaseType::Int)
        };

        assert_eq!(int.mangled_name(), "int");
        assert_eq!(const_int.mangled_name(), "Cint");
        assert_eq!(int_ref.mangled_name(), "&int");
        assert_eq!(
            TypeDecl::array_of(TypeDecl::new(BaseType::Float)).mangled_name(),
            "1<float>A"
        );
    }

    #[test]
    fn same_type_respects_flags() {
        let int = TypeDecl::new(BaseType::Int);
        let int_ref = TypeDecl {
            ref_: true,
            ..TypeDecl::new(BaseType::Int)
        };

        assert!(int.is_same_type(&int_ref, false, true, true));
        assert!(!int.is_same_type(&int_ref, true, true, true));
        assert!(!int.is_same_type(&TypeDecl::new(BaseType::UInt), false, false, false));
    }

    #[test]
    fn removed_qualifiers_split_types_and_names() {
        let auto = TypeDecl::auto();
        let auto_no_ref = TypeDecl {
            remove_ref: true,
            ..TypeDecl::auto()
        };
        let auto_no_dim = TypeDecl {
            remove_dim: true,
            ..TypeDecl::auto()
        };

        assert!(!auto.is_same_type(&auto_no_ref, false, false, false));
        assert_ne!(auto, auto_no_dim);
        assert_ne!(auto.mangled_name(), auto_no_ref.mangled_name());
        assert_eq!(auto_no_ref.clone(), auto_no_ref);
        assert_eq!(auto_no_ref.clone().mangled_name(), auto_no_ref.mangled_name());

        let implicit = TypeDecl {
            implicit: true,
            ..TypeDecl::new(BaseType::Int)
        };
        assert_ne!(implicit, TypeDecl::new(BaseType::Int));
    }

    #[test]
    fn nested_types_are_compared() {
        let left = TypeDecl::table_of(TypeDecl::new(BaseType::String), TypeDecl::new(BaseType::Int));
        let right =
            TypeDecl::table_of(TypeDecl::new(BaseType::String), TypeDecl::new(BaseType::Float));

        assert!(left.is_same_type(&left.clone(), true, true, true));
        assert!(!left.is_same_type(&right, true, true, true));
    }

    #[test]
    fn auto_is_detected_in_nested_types() {
        assert!(TypeDecl::auto().is_auto());
        assert!(TypeDecl::pointer_to(TypeDecl::auto()).is_auto());
        assert!(!TypeDecl::pointer_to(TypeDecl::new(BaseType::Int)).is_auto());

        let auto_dim = TypeDecl {
            dim: vec![DIM_AUTO],
            ..TypeDecl::new(BaseType::Int)
        };
        assert!(auto_dim.is_auto());
    }

    #[test]
    fn size_and_alignment() {
        let int3 = TypeDecl {
            dim: vec![3],
            ..TypeDecl::new(BaseType::Int)
        };
        assert_eq!(int3.size_of(), 12);
        assert_eq!(int3.align_of(), 4);

        let tuple = TypeDecl::tuple(
            vec![TypeDecl::new(BaseType::Int8), TypeDecl::new(BaseType::Double)],
            Vec::new(),
        );
        assert_eq!(tuple.size_of(), 16);
        assert_eq!(tuple.align_of(), 8);
    }

    #[test]
    fn describes_types() {
        let table = TypeDecl::table_of(TypeDecl::new(BaseType::String), TypeDecl::new(BaseType::Int));
        assert_eq!(table.to_string(), "table<string;int>");

        let pointer = TypeDecl {
            constant: true,
            ..TypeDecl::pointer_to(TypeDecl::new(BaseType::Float))
        };
        assert_eq!(pointer.to_string(), "float? const");
    }
}
