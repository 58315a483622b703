use crate::program::expressions::{
    clone_boxed, clone_fields, clone_list, clone_optional, Expression, ExpressionKind,
    ExpressionNode, MakeFieldDecl,
};
use crate::program::typing::visit_type_slot;
use crate::program::visitors::{
    visit_each, visit_list, visit_optional, visit_required, CloneContext, Visitor,
};
use crate::program::TypeDecl;
use std::mem;

/// `[[Foo a = 1, b = 2; a = 3, b = 4]]`: one or more structures, each a list of field
/// initializers.
#[derive(Debug)]
pub struct ExprMakeStructure {
    pub make_type: TypeDecl,
    pub structs: Vec<Vec<MakeFieldDecl>>,

    /// Fields missing from the initializer get their declared defaults.
    pub use_initializer: bool,
}

impl ExprMakeStructure {
    pub fn new(make_type: TypeDecl, structs: Vec<Vec<MakeFieldDecl>>) -> ExprMakeStructure {
        ExprMakeStructure {
            make_type,
            structs,
            use_initializer: false,
        }
    }
}

impl ExpressionNode for ExprMakeStructure {
    fn node_name(&self) -> &'static str {
        "ExprMakeStructure"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprMakeStructure {
            make_type: self.make_type.clone(),
            structs: self
                .structs
                .iter()
                .map(|fields| clone_fields(fields, context))
                .collect(),
            use_initializer: self.use_initializer,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_type_slot(&mut self.make_type, vis);
        let mut structs = mem::take(&mut self.structs);
        let total = structs.len();
        for (index, fields) in structs.iter_mut().enumerate() {
            let last = index + 1 == total;
            vis.pre_visit_make_structure_index(self, index, last);
            visit_each(fields, vis, &*self, |vis, make, field, _, last| {
                vis.pre_visit_make_structure_field(make, index, field, last);
                visit_required(&mut field.value, vis);
                vis.visit_make_structure_field(make, index, field, last)
            });
            vis.visit_make_structure_index(self, index, last);
        }
        self.structs = structs;
    }
}

/// `[[Variant name = value]]`.
#[derive(Debug)]
pub struct ExprMakeVariant {
    pub make_type: TypeDecl,
    pub variants: Vec<MakeFieldDecl>,
}

impl ExprMakeVariant {
    pub fn new(make_type: TypeDecl, variants: Vec<MakeFieldDecl>) -> ExprMakeVariant {
        ExprMakeVariant {
            make_type,
            variants,
        }
    }
}

impl ExpressionNode for ExprMakeVariant {
    fn node_name(&self) -> &'static str {
        "ExprMakeVariant"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprMakeVariant {
            make_type: self.make_type.clone(),
            variants: clone_fields(&self.variants, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_type_slot(&mut self.make_type, vis);
        let mut variants = mem::take(&mut self.variants);
        visit_each(&mut variants, vis, &*self, |vis, make, field, index, last| {
            vis.pre_visit_make_variant_field(make, index, field, last);
            visit_required(&mut field.value, vis);
            vis.visit_make_variant_field(make, index, field, last)
        });
        self.variants = variants;
    }
}

/// `[[int 1; 2; 3]]`.
#[derive(Debug)]
pub struct ExprMakeArray {
    pub make_type: TypeDecl,
    pub values: Vec<Expression>,
}

impl ExprMakeArray {
    pub fn new(make_type: TypeDecl, values: Vec<Expression>) -> ExprMakeArray {
        ExprMakeArray { make_type, values }
    }
}

impl ExpressionNode for ExprMakeArray {
    fn node_name(&self) -> &'static str {
        "ExprMakeArray"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprMakeArray {
            make_type: self.make_type.clone(),
            values: clone_list(&self.values, context),
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_type_slot(&mut self.make_type, vis);
        let mut values = mem::take(&mut self.values);
        visit_list(
            &mut values,
            vis,
            &*self,
            |vis, make, value, index, last| vis.pre_visit_make_array_index(make, index, value, last),
            |vis, make, value, index, last| vis.visit_make_array_index(make, index, value, last),
        );
        self.values = values;
    }
}

/// `[[auto 1, "one"]]` or a key-value pair `1 => "one"`.
#[derive(Debug)]
pub struct ExprMakeTuple {
    pub make_type: Option<TypeDecl>,
    pub values: Vec<Expression>,
    pub is_key_value: bool,
}

impl ExprMakeTuple {
    pub fn new(values: Vec<Expression>) -> ExprMakeTuple {
        ExprMakeTuple {
            make_type: None,
            values,
            is_key_value: false,
        }
    }
}

impl ExpressionNode for ExprMakeTuple {
    fn node_name(&self) -> &'static str {
        "ExprMakeTuple"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprMakeTuple {
            make_type: self.make_type.clone(),
            values: clone_list(&self.values, context),
            is_key_value: self.is_key_value,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        if let Some(ref mut make_type) = self.make_type {
            visit_type_slot(make_type, vis);
        }
        let mut values = mem::take(&mut self.values);
        visit_list(
            &mut values,
            vis,
            &*self,
            |vis, make, value, index, last| vis.pre_visit_make_tuple_index(make, index, value, last),
            |vis, make, value, index, last| vis.visit_make_tuple_index(make, index, value, last),
        );
        self.values = values;
    }
}

/// `[{for x in xs; x * 2; where x > 0}]`.
#[derive(Debug)]
pub struct ExprArrayComprehension {
    /// The `ExprFor` producing the elements. Its body is empty.
    pub for_: Box<Expression>,

    pub subexpr: Box<Expression>,
    pub where_: Option<Box<Expression>>,

    /// `[{...}]` makes an iterator rather than an array.
    pub generator_syntax: bool,
}

impl ExprArrayComprehension {
    pub fn new(for_: Expression, subexpr: Expression, where_: Option<Expression>) -> ExprArrayComprehension {
        ExprArrayComprehension {
            for_: Box::new(for_),
            subexpr: Box::new(subexpr),
            where_: where_.map(Box::new),
            generator_syntax: false,
        }
    }
}

impl ExpressionNode for ExprArrayComprehension {
    fn node_name(&self) -> &'static str {
        "ExprArrayComprehension"
    }

    fn clone_node(&self, context: &mut CloneContext) -> ExpressionKind {
        ExprArrayComprehension {
            for_: clone_boxed(&self.for_, context),
            subexpr: clone_boxed(&self.subexpr, context),
            where_: clone_optional(&self.where_, context),
            generator_syntax: self.generator_syntax,
        }
        .into()
    }

    fn walk(&mut self, vis: &mut dyn Visitor) {
        visit_required(&mut self.for_, vis);
        vis.pre_visit_array_comprehension_subexpr(self, &self.subexpr);
        visit_required(&mut self.subexpr, vis);
        if let Some(ref where_) = self.where_ {
            vis.pre_visit_array_comprehension_where(self, where_);
        }
        visit_optional(&mut self.where_, vis);
    }
}
