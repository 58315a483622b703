use crate::program::expressions::{clone_boxed, Expression, ExpressionKind, ExpressionNode};
use crate::program::typing::visit_type_slot;
use crate::program::visitors::{visit_required, CloneContext, Visitor};
use crate::program::{Function, TypeDecl, Variable};
use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::{Rc, Weak};

/// Reference to a variable by name.
pub struct ExprVar {
    pub name: String,

    /// Resolved variable. `None` until names are resolved.
    pub variable: Option<Rc<RefCell<Variable>>>,

    pub local: bool,
    pub argument: bool,
    pub block: bool,
    pub argument_index: Option<usize>,
}

impl ExprVar {
    pub fn new(name: impl Into<String>) -> ExprVar {
        ExprVar {
            name: name.into(),
            variable: None,
            local: false,
            argument: false,
            block: false,
            argument_index: None,
        }
    }

    pub fn resolved(variable: &Rc<RefCell<Variable>>) -> ExprVar {
        ExprVar {
            variable: Some(Rc::clone(variable)),
            ..ExprVar::new(variable.borrow().name.clone())
        }
    }

    /// Whether the node refers to exactly this variable object.
    pub fn refers_to(&self, variable: &Rc<RefCell<Variable>>) -> bool {
        self.variable
            .as_ref()
            .map_or(false, |own| Rc::ptr_eq(own, variable))
    }
}

impl fmt::Debug for ExprVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprVar")
            .field("name", &self.name)
            .field("resolved", &self.variable.is_some())
            .field("local", &self.local)
            .field("argument", &self.argument)
            .finish()
    }
}

impl ExpressionNode for ExprVar {
    fn node_name(&self) -> &'static str {
        "ExprVar"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprVar {
            name: self.name.clone(),
            variable: self
                .variable
                .as_ref()
                .map(|variable| context.remap_variable(variable)),
            local: self.local,
            argument: self.argument,
            block: self.block,
            argument_index: self.argument_index,
        }
        .into()
    }

    fn walk(&mut self, _vis: &mut dyn Visitor) {}
}

/// Access to a structure field, or a named tuple or variant element: `value.name`.
#[derive(Debug)]
pub struct ExprField {
    pub name: String,
    pub value: Box<Expression>,

    /// Index of the field in the resolved structure.
    pub field: Option<usize>,

    pub tuple_or_variant_index: Option<usize>,
    pub unsafe_deref: bool,
}

impl ExprField {
    pub fn new(value: Expression, name: impl Into<String>) -> ExprField {
        ExprField {
            name: name.into(),
            value: Box::new(value),
            field: None,
            tuple_or_variant_index: None,
            unsafe_deref: false,
        }
    }

    fn clone_field(&self, context: &mut CloneContext) -> ExprField {
        ExprField {
            name: self.name.clone(),
            value: clone_boxed(&self.value, context),
            field: self.field,
            tuple_or_variant_index: self.tuple_or_variant_index,
            unsafe_deref: self.unsafe_deref,
        }
    }

    /// Type being accessed, looking through one level of pointer.
    fn accessed_type(&self) -> Option<&TypeDecl> {
        let type_ = self.value.type_.as_ref()?;
        if type_.is_pointer() {
            type_.first_type.as_deref()
        } else {
            Some(type_)
        }
    }

    /// Index of the tuple element the field names.
    ///
    /// Elements are named either positionally (`_0`, `_1`, `_first`, `_last`) or by the element
    /// names of the tuple type.
    pub fn tuple_field_index(&self) -> Option<usize> {
        if let Some(index) = self
            .name
            .strip_prefix('_')
            .and_then(|index| index.parse::<usize>().ok())
        {
            return Some(index);
        }
        let type_ = self.accessed_type()?;
        match self.name.as_str() {
            "_first" => Some(0),
            "_last" => type_.arg_types.len().checked_sub(1),
            name => type_.find_argument_index(name),
        }
    }

    pub fn variant_field_index(&self) -> Option<usize> {
        self.accessed_type()?.find_argument_index(&self.name)
    }
}

impl ExpressionNode for ExprField {
    fn node_name(&self) -> &'static str {
        "ExprField"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        self.clone_field(context).into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.value, vis);
    }
}

macro_rules! field_node {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name(pub ExprField);

        impl $name {
            pub fn new(value: Expression, name: impl Into<String>) -> $name {
                $name(ExprField::new(value, name))
            }
        }

        impl Deref for $name {
            type Target = ExprField;

            fn deref(&self) -> &ExprField {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut ExprField {
                &mut self.0
            }
        }

        impl ExpressionNode for $name {
            fn node_name(&self) -> &'static str {
                stringify!($name)
            }

            fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
                $name(self.0.clone_field(context)).into()
            }

            fn walk(&mut self, vis: &mut dyn Visitor) {
                visit_required(&mut self.0.value, vis);
            }
        }
    };
}

field_node! {
    /// `value?.name`, null if `value` is null.
    ExprSafeField
}

field_node! {
    /// `value is name`, tests the active alternative of a variant.
    ExprIsVariant
}

field_node! {
    /// `value as name`, accesses an alternative of a variant.
    ExprAsVariant
}

field_node! {
    /// `value ?as name`, null if another alternative is active.
    ExprSafeAsVariant
}

/// Vector component selection, e.g. `v.xzy`.
#[derive(Debug)]
pub struct ExprSwizzle {
    pub mask: String,
    pub value: Box<Expression>,

    /// Component indices, filled in once the mask is checked.
    pub fields: Vec<u8>,
}

impl ExprSwizzle {
    pub fn new(value: Expression, mask: impl Into<String>) -> ExprSwizzle {
        ExprSwizzle {
            mask: mask.into(),
            value: Box::new(value),
            fields: Vec::new(),
        }
    }
}

impl ExpressionNode for ExprSwizzle {
    fn node_name(&self) -> &'static str {
        "ExprSwizzle"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprSwizzle {
            mask: self.mask.clone(),
            value: clone_boxed(&self.value, context),
            fields: self.fields.clone(),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.value, vis);
    }
}

/// Indexing `subexpr[index]`.
#[derive(Debug)]
pub struct ExprAt {
    pub subexpr: Box<Expression>,
    pub index: Box<Expression>,
}

impl ExprAt {
    pub fn new(subexpr: Expression, index: Expression) -> ExprAt {
        ExprAt {
            subexpr: Box::new(subexpr),
            index: Box::new(index),
        }
    }
}

impl ExpressionNode for ExprAt {
    fn node_name(&self) -> &'static str {
        "ExprAt"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprAt {
            subexpr: clone_boxed(&self.subexpr, context),
            index: clone_boxed(&self.index, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.subexpr, vis);
        vis.pre_visit_at_index(self, &self.index);
        visit_required(&mut self.index, vis);
    }
}

/// Indexing `subexpr?[index]`, null when the index is out of range.
#[derive(Debug)]
pub struct ExprSafeAt {
    pub subexpr: Box<Expression>,
    pub index: Box<Expression>,
}

impl ExprSafeAt {
    pub fn new(subexpr: Expression, index: Expression) -> ExprSafeAt {
        ExprSafeAt {
            subexpr: Box::new(subexpr),
            index: Box::new(index),
        }
    }
}

impl ExpressionNode for ExprSafeAt {
    fn node_name(&self) -> &'static str {
        "ExprSafeAt"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprSafeAt {
            subexpr: clone_boxed(&self.subexpr, context),
            index: clone_boxed(&self.index, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.subexpr, vis);
        vis.pre_visit_safe_at_index(self, &self.index);
        visit_required(&mut self.index, vis);
    }
}

/// `subexpr ?? default_value`.
#[derive(Debug)]
pub struct ExprNullCoalescing {
    pub subexpr: Box<Expression>,
    pub default_value: Box<Expression>,
}

impl ExprNullCoalescing {
    pub fn new(subexpr: Expression, default_value: Expression) -> ExprNullCoalescing {
        ExprNullCoalescing {
            subexpr: Box::new(subexpr),
            default_value: Box::new(default_value),
        }
    }
}

impl ExpressionNode for ExprNullCoalescing {
    fn node_name(&self) -> &'static str {
        "ExprNullCoalescing"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprNullCoalescing {
            subexpr: clone_boxed(&self.subexpr, context),
            default_value: clone_boxed(&self.default_value, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.subexpr, vis);
        vis.pre_visit_null_coalescing_default(self, &self.default_value);
        visit_required(&mut self.default_value, vis);
    }
}

macro_rules! conversion_node {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            pub subexpr: Box<Expression>,
        }

        impl $name {
            pub fn new(subexpr: Expression) -> $name {
                $name {
                    subexpr: Box::new(subexpr),
                }
            }
        }

        impl ExpressionNode for $name {
            fn node_name(&self) -> &'static str {
                stringify!($name)
            }

            fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
                $name {
                    subexpr: clone_boxed(&self.subexpr, context),
                }
                .into()
            }

            fn walk(&mut self, vis: &mut dyn Visitor) {
                visit_required(&mut self.subexpr, vis);
            }
        }
    };
}

conversion_node! {
    /// Reads the value a reference points to.
    ExprRef2Value
}

conversion_node! {
    /// Takes the address of a reference.
    ExprRef2Ptr
}

conversion_node! {
    /// Dereferences a pointer.
    ExprPtr2Ref
}

/// Address of a function, `@@name`.
#[derive(Debug)]
pub struct ExprAddr {
    pub target: String,
    pub func: Option<Weak<RefCell<Function>>>,

    /// Explicit function type, used to pick an overload.
    pub func_type: Option<TypeDecl>,
}

impl ExprAddr {
    pub fn new(target: impl Into<String>) -> ExprAddr {
        ExprAddr {
            target: target.into(),
            func: None,
            func_type: None,
        }
    }
}

impl ExpressionNode for ExprAddr {
    fn node_name(&self) -> &'static str {
        "ExprAddr"
    }

    fn clone_node(&self, _context: &mut CloneContext) -> ExpressionKind {
        ExprAddr {
            target: self.target.clone(),
            func: self.func.clone(),
            func_type: self.func_type.clone(),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        if let Some(ref mut func_type) = self.func_type {
            visit_type_slot(func_type, vis);
        }
    }
}
