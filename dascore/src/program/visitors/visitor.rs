//! An interface for code processors and rewriters.

use crate::program::expressions::*;
use crate::program::{Enumeration, FieldDeclaration, Function, Program, Structure, TypeDecl, Variable};
use std::cell::RefCell;
use std::rc::Rc;

/// What the parent should do with a node once it has been visited.
#[derive(Debug)]
pub enum Rewrite<T = Expression> {
    Keep,
    Replace(T),
    Remove,
}

impl<T> Rewrite<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Rewrite::Keep)
    }

    /// Stores a replacement into `slot`. Returns `false` if the value should be removed.
    pub fn apply(self, slot: &mut T) -> bool {
        match self {
            Rewrite::Keep => true,
            Rewrite::Replace(value) => {
                *slot = value;
                true
            }
            Rewrite::Remove => false,
        }
    }
}

macro_rules! expression_hooks {
    ($(($pre:ident, $visit:ident)),* $(,)?) => {
        $(
            fn $pre(&mut self, expr: &mut Expression) {
                self.pre_visit_expression(expr)
            }

            fn $visit(&mut self, expr: &mut Expression) -> Rewrite {
                self.visit_expression(expr)
            }
        )*
    };
}

/// A base trait for code processors and rewriters that provides a default implementation for a
/// no-op visitor.
///
/// Every node gets a `pre_visit_*` call before its children and a `visit_*` call after them.
/// Per-kind hooks fall back to `pre_visit_expression` and `visit_expression`. Slot hooks
/// (`*_arg`, `*_right`, `*_body`, ...) are called by the parent around the corresponding child.
///
/// Hooks receive the node being visited, never its parent chain. The declaration currently being
/// visited is detached from the program while its hooks run, so hooks must not reach it through
/// links in the tree.
#[allow(unused_variables)]
pub trait Visitor {
    fn pre_visit_expression(&mut self, expr: &mut Expression) {}

    fn visit_expression(&mut self, expr: &mut Expression) -> Rewrite {
        Rewrite::Keep
    }

    expression_hooks! {
        (pre_visit_label, visit_label),
        (pre_visit_goto, visit_goto),
        (pre_visit_ref2value, visit_ref2value),
        (pre_visit_ref2ptr, visit_ref2ptr),
        (pre_visit_ptr2ref, visit_ptr2ref),
        (pre_visit_addr, visit_addr),
        (pre_visit_null_coalescing, visit_null_coalescing),
        (pre_visit_looks_like_call, visit_looks_like_call),
        (pre_visit_call, visit_call),
        (pre_visit_named_call, visit_named_call),
        (pre_visit_make_generator, visit_make_generator),
        (pre_visit_new, visit_new),
        (pre_visit_yield, visit_yield),
        (pre_visit_make_block, visit_make_block),
        (pre_visit_is, visit_is),
        (pre_visit_type_info, visit_type_info),
        (pre_visit_delete, visit_delete),
        (pre_visit_cast, visit_cast),
        (pre_visit_ascend, visit_ascend),
        (pre_visit_at, visit_at),
        (pre_visit_safe_at, visit_safe_at),
        (pre_visit_block, visit_block),
        (pre_visit_swizzle, visit_swizzle),
        (pre_visit_field, visit_field),
        (pre_visit_safe_field, visit_safe_field),
        (pre_visit_is_variant, visit_is_variant),
        (pre_visit_as_variant, visit_as_variant),
        (pre_visit_safe_as_variant, visit_safe_as_variant),
        (pre_visit_string_builder, visit_string_builder),
        (pre_visit_var, visit_var),
        (pre_visit_op1, visit_op1),
        (pre_visit_op2, visit_op2),
        (pre_visit_op3, visit_op3),
        (pre_visit_move, visit_move),
        (pre_visit_clone, visit_clone),
        (pre_visit_copy, visit_copy),
        (pre_visit_sequence, visit_sequence),
        (pre_visit_try_catch, visit_try_catch),
        (pre_visit_return, visit_return),
        (pre_visit_break, visit_break),
        (pre_visit_continue, visit_continue),
        (pre_visit_if_then_else, visit_if_then_else),
        (pre_visit_with, visit_with),
        (pre_visit_while, visit_while),
        (pre_visit_for, visit_for),
        (pre_visit_let, visit_let),
        (pre_visit_make_structure, visit_make_structure),
        (pre_visit_make_variant, visit_make_variant),
        (pre_visit_make_array, visit_make_array),
        (pre_visit_make_tuple, visit_make_tuple),
        (pre_visit_array_comprehension, visit_array_comprehension),
        (pre_visit_const, visit_const),
    }

    // Constants. The kind-specific hooks run between the generic `pre_visit_const` and
    // `visit_const`; the latter only runs if the specific hook kept the node.

    fn pre_visit_const_value(&mut self, expr: &mut Expression) {}
    fn visit_const_value(&mut self, expr: &mut Expression) -> Rewrite {
        Rewrite::Keep
    }
    fn pre_visit_const_string(&mut self, expr: &mut Expression) {}
    fn visit_const_string(&mut self, expr: &mut Expression) -> Rewrite {
        Rewrite::Keep
    }
    fn pre_visit_const_enumeration(&mut self, expr: &mut Expression) {}
    fn visit_const_enumeration(&mut self, expr: &mut Expression) -> Rewrite {
        Rewrite::Keep
    }
    fn pre_visit_const_ptr(&mut self, expr: &mut Expression) {}
    fn visit_const_ptr(&mut self, expr: &mut Expression) -> Rewrite {
        Rewrite::Keep
    }

    // Calls.

    fn pre_visit_null_coalescing_default(&mut self, expr: &ExprNullCoalescing, default: &Expression) {}

    fn pre_visit_looks_like_call_arg(&mut self, call: &ExprLooksLikeCall, arg: &Expression, last: bool) {}
    fn visit_looks_like_call_arg(
        &mut self,
        call: &ExprLooksLikeCall,
        arg: &mut Expression,
        last: bool,
    ) -> Rewrite {
        Rewrite::Keep
    }

    fn pre_visit_call_arg(&mut self, call: &ExprCall, arg: &Expression, last: bool) {}
    fn visit_call_arg(&mut self, call: &ExprCall, arg: &mut Expression, last: bool) -> Rewrite {
        Rewrite::Keep
    }

    fn pre_visit_named_call_arg(&mut self, call: &ExprNamedCall, arg: &MakeFieldDecl, last: bool) {}
    fn visit_named_call_arg(
        &mut self,
        call: &ExprNamedCall,
        arg: &mut MakeFieldDecl,
        last: bool,
    ) -> Rewrite<MakeFieldDecl> {
        Rewrite::Keep
    }

    fn pre_visit_new_arg(&mut self, new: &ExprNew, arg: &Expression, last: bool) {}
    fn visit_new_arg(&mut self, new: &ExprNew, arg: &mut Expression, last: bool) -> Rewrite {
        Rewrite::Keep
    }

    fn pre_visit_at_index(&mut self, at: &ExprAt, index: &Expression) {}
    fn pre_visit_safe_at_index(&mut self, at: &ExprSafeAt, index: &Expression) {}
    fn pre_visit_is_type(&mut self, is: &ExprIs, type_: &TypeDecl) {}

    // Blocks.

    fn pre_visit_block_argument(&mut self, block: &ExprBlock, arg: &Rc<RefCell<Variable>>, last: bool) {}
    fn visit_block_argument(
        &mut self,
        block: &ExprBlock,
        arg: &Rc<RefCell<Variable>>,
        last: bool,
    ) -> Rewrite<Rc<RefCell<Variable>>> {
        Rewrite::Keep
    }
    fn pre_visit_block_argument_init(
        &mut self,
        block: &ExprBlock,
        arg: &Rc<RefCell<Variable>>,
        init: &Expression,
    ) {
    }
    fn visit_block_argument_init(
        &mut self,
        block: &ExprBlock,
        arg: &Rc<RefCell<Variable>>,
        init: &mut Expression,
    ) -> Rewrite {
        Rewrite::Keep
    }

    fn pre_visit_block_expression(&mut self, block: &ExprBlock, expr: &Expression) {}
    fn visit_block_expression(&mut self, block: &ExprBlock, expr: &mut Expression) -> Rewrite {
        Rewrite::Keep
    }

    fn pre_visit_block_final(&mut self, block: &ExprBlock) {}
    fn visit_block_final(&mut self, block: &ExprBlock) {}
    fn pre_visit_block_final_expression(&mut self, block: &ExprBlock, expr: &Expression) {}
    fn visit_block_final_expression(&mut self, block: &ExprBlock, expr: &mut Expression) -> Rewrite {
        Rewrite::Keep
    }

    fn pre_visit_string_builder_element(
        &mut self,
        builder: &ExprStringBuilder,
        element: &Expression,
        last: bool,
    ) {
    }
    fn visit_string_builder_element(
        &mut self,
        builder: &ExprStringBuilder,
        element: &mut Expression,
        last: bool,
    ) -> Rewrite {
        Rewrite::Keep
    }

    // Operators.

    fn pre_visit_op2_right(&mut self, op: &ExprOp2, right: &Expression) {}
    fn pre_visit_op3_left(&mut self, op: &ExprOp3, left: &Expression) {}
    fn pre_visit_op3_right(&mut self, op: &ExprOp3, right: &Expression) {}
    fn pre_visit_move_right(&mut self, op: &ExprMove, right: &Expression) {}
    fn pre_visit_clone_right(&mut self, op: &ExprClone, right: &Expression) {}
    fn pre_visit_copy_right(&mut self, op: &ExprCopy, right: &Expression) {}
    fn pre_visit_sequence_right(&mut self, sequence: &ExprSequence, right: &Expression) {}

    // Control flow.

    fn pre_visit_catch(&mut self, expr: &ExprTryCatch, catch_block: &Expression) {}

    fn can_visit_if_subexpr(&mut self, expr: &ExprIfThenElse) -> bool {
        true
    }
    fn pre_visit_if_block(&mut self, expr: &ExprIfThenElse, if_block: &Expression) {}
    fn pre_visit_else_block(&mut self, expr: &ExprIfThenElse, else_block: &Expression) {}

    fn pre_visit_with_body(&mut self, expr: &ExprWith, body: &Expression) {}
    fn pre_visit_while_body(&mut self, expr: &ExprWhile, body: &Expression) {}

    fn pre_visit_for_variable(&mut self, expr: &ExprFor, var: &Rc<RefCell<Variable>>, last: bool) {}
    fn visit_for_variable(
        &mut self,
        expr: &ExprFor,
        var: &Rc<RefCell<Variable>>,
        last: bool,
    ) -> Rewrite<Rc<RefCell<Variable>>> {
        Rewrite::Keep
    }
    fn pre_visit_for_source(&mut self, expr: &ExprFor, source: &Expression, last: bool) {}
    fn visit_for_source(&mut self, expr: &ExprFor, source: &mut Expression, last: bool) -> Rewrite {
        Rewrite::Keep
    }
    fn pre_visit_for_stack(&mut self, expr: &ExprFor) {}
    fn pre_visit_for_body(&mut self, expr: &ExprFor, body: &Expression) {}

    fn pre_visit_let_variable(&mut self, expr: &ExprLet, var: &Rc<RefCell<Variable>>, last: bool) {}
    fn visit_let_variable(
        &mut self,
        expr: &ExprLet,
        var: &Rc<RefCell<Variable>>,
        last: bool,
    ) -> Rewrite<Rc<RefCell<Variable>>> {
        Rewrite::Keep
    }
    fn pre_visit_let_init(&mut self, expr: &ExprLet, var: &Rc<RefCell<Variable>>, init: &Expression) {}
    fn visit_let_init(
        &mut self,
        expr: &ExprLet,
        var: &Rc<RefCell<Variable>>,
        init: &mut Expression,
    ) -> Rewrite {
        Rewrite::Keep
    }

    // Aggregate builders.

    fn pre_visit_make_structure_index(&mut self, expr: &ExprMakeStructure, index: usize, last: bool) {}
    fn visit_make_structure_index(&mut self, expr: &ExprMakeStructure, index: usize, last: bool) {}
    fn pre_visit_make_structure_field(
        &mut self,
        expr: &ExprMakeStructure,
        index: usize,
        field: &MakeFieldDecl,
        last: bool,
    ) {
    }
    fn visit_make_structure_field(
        &mut self,
        expr: &ExprMakeStructure,
        index: usize,
        field: &mut MakeFieldDecl,
        last: bool,
    ) -> Rewrite<MakeFieldDecl> {
        Rewrite::Keep
    }

    fn pre_visit_make_variant_field(
        &mut self,
        expr: &ExprMakeVariant,
        index: usize,
        field: &MakeFieldDecl,
        last: bool,
    ) {
    }
    fn visit_make_variant_field(
        &mut self,
        expr: &ExprMakeVariant,
        index: usize,
        field: &mut MakeFieldDecl,
        last: bool,
    ) -> Rewrite<MakeFieldDecl> {
        Rewrite::Keep
    }

    fn pre_visit_make_array_index(
        &mut self,
        expr: &ExprMakeArray,
        index: usize,
        value: &Expression,
        last: bool,
    ) {
    }
    fn visit_make_array_index(
        &mut self,
        expr: &ExprMakeArray,
        index: usize,
        value: &mut Expression,
        last: bool,
    ) -> Rewrite {
        Rewrite::Keep
    }

    fn pre_visit_make_tuple_index(
        &mut self,
        expr: &ExprMakeTuple,
        index: usize,
        value: &Expression,
        last: bool,
    ) {
    }
    fn visit_make_tuple_index(
        &mut self,
        expr: &ExprMakeTuple,
        index: usize,
        value: &mut Expression,
        last: bool,
    ) -> Rewrite {
        Rewrite::Keep
    }

    fn pre_visit_array_comprehension_subexpr(&mut self, expr: &ExprArrayComprehension, subexpr: &Expression) {}
    fn pre_visit_array_comprehension_where(&mut self, expr: &ExprArrayComprehension, where_: &Expression) {}

    // Types.

    fn pre_visit_type(&mut self, type_: &mut TypeDecl) {}
    fn visit_type(&mut self, type_: &mut TypeDecl) {}

    // Declarations.

    fn pre_visit_structure(&mut self, structure: &Structure) {}
    fn pre_visit_structure_field(&mut self, structure: &Structure, field: &FieldDeclaration, last: bool) {}
    fn can_visit_structure_field_init(&mut self, structure: &Structure) -> bool {
        true
    }
    fn visit_structure_field(&mut self, structure: &Structure, field: &FieldDeclaration, last: bool) {}
    fn visit_structure(&mut self, structure: &mut Structure) -> Rewrite<Rc<RefCell<Structure>>> {
        Rewrite::Keep
    }

    fn pre_visit_enumeration(&mut self, enumeration: &Enumeration) {}
    fn pre_visit_enumeration_value(
        &mut self,
        enumeration: &Enumeration,
        name: &str,
        value: Option<&Expression>,
        last: bool,
    ) {
    }
    fn visit_enumeration_value(
        &mut self,
        enumeration: &Enumeration,
        name: &str,
        value: &mut Expression,
        last: bool,
    ) -> Rewrite {
        Rewrite::Keep
    }
    fn visit_enumeration(&mut self, enumeration: &mut Enumeration) -> Rewrite<Rc<RefCell<Enumeration>>> {
        Rewrite::Keep
    }

    fn can_visit_function(&mut self, function: &Function) -> bool {
        true
    }
    fn pre_visit_function(&mut self, function: &Function) {}
    fn pre_visit_argument(&mut self, function: &Function, arg: &Rc<RefCell<Variable>>, last: bool) {}
    fn pre_visit_argument_init(&mut self, function: &Function, arg: &Rc<RefCell<Variable>>, init: &Expression) {}
    fn visit_argument_init(
        &mut self,
        function: &Function,
        arg: &Rc<RefCell<Variable>>,
        init: &mut Expression,
    ) -> Rewrite {
        Rewrite::Keep
    }
    fn visit_argument(
        &mut self,
        function: &Function,
        arg: &Rc<RefCell<Variable>>,
        last: bool,
    ) -> Rewrite<Rc<RefCell<Variable>>> {
        Rewrite::Keep
    }
    fn pre_visit_function_body(&mut self, function: &Function, body: &Expression) {}
    fn visit_function_body(&mut self, function: &Function, body: &mut Expression) -> Rewrite {
        Rewrite::Keep
    }
    fn visit_function(&mut self, function: &mut Function) -> Rewrite<Rc<RefCell<Function>>> {
        Rewrite::Keep
    }

    // Program.

    fn pre_visit_program(&mut self, program: &Program) {}
    fn pre_visit_program_body(&mut self, program: &Program) {}
    fn pre_visit_global_let_body(&mut self, program: &Program) {}
    fn pre_visit_global_let(&mut self, var: &Rc<RefCell<Variable>>) {}
    fn pre_visit_global_let_init(&mut self, var: &Rc<RefCell<Variable>>, init: &Expression) {}
    fn visit_global_let_init(&mut self, var: &Rc<RefCell<Variable>>, init: &mut Expression) -> Rewrite {
        Rewrite::Keep
    }
    fn visit_global_let(&mut self, var: &Rc<RefCell<Variable>>) -> Rewrite<Rc<RefCell<Variable>>> {
        Rewrite::Keep
    }
    fn visit_global_let_body(&mut self, program: &Program) {}
    fn visit_program(&mut self, program: &Program) {}
}

/// Calls the pre-hooks of a node, before its children are visited.
pub(crate) fn dispatch_pre(vis: &mut dyn Visitor, expr: &mut Expression) {
    use ExpressionKind as K;
    match expr.kind {
        K::Label(_) => vis.pre_visit_label(expr),
        K::Goto(_) => vis.pre_visit_goto(expr),
        K::Ref2Value(_) => vis.pre_visit_ref2value(expr),
        K::Ref2Ptr(_) => vis.pre_visit_ref2ptr(expr),
        K::Ptr2Ref(_) => vis.pre_visit_ptr2ref(expr),
        K::Addr(_) => vis.pre_visit_addr(expr),
        K::NullCoalescing(_) => vis.pre_visit_null_coalescing(expr),
        K::LooksLikeCall(_) => vis.pre_visit_looks_like_call(expr),
        K::Call(_) => vis.pre_visit_call(expr),
        K::NamedCall(_) => vis.pre_visit_named_call(expr),
        K::MakeGenerator(_) => vis.pre_visit_make_generator(expr),
        K::New(_) => vis.pre_visit_new(expr),
        K::Yield(_) => vis.pre_visit_yield(expr),
        K::MakeBlock(_) => vis.pre_visit_make_block(expr),
        K::Is(_) => vis.pre_visit_is(expr),
        K::TypeInfo(_) => vis.pre_visit_type_info(expr),
        K::Delete(_) => vis.pre_visit_delete(expr),
        K::Cast(_) => vis.pre_visit_cast(expr),
        K::Ascend(_) => vis.pre_visit_ascend(expr),
        K::At(_) => vis.pre_visit_at(expr),
        K::SafeAt(_) => vis.pre_visit_safe_at(expr),
        K::Block(_) => vis.pre_visit_block(expr),
        K::Swizzle(_) => vis.pre_visit_swizzle(expr),
        K::Field(_) => vis.pre_visit_field(expr),
        K::SafeField(_) => vis.pre_visit_safe_field(expr),
        K::IsVariant(_) => vis.pre_visit_is_variant(expr),
        K::AsVariant(_) => vis.pre_visit_as_variant(expr),
        K::SafeAsVariant(_) => vis.pre_visit_safe_as_variant(expr),
        K::StringBuilder(_) => vis.pre_visit_string_builder(expr),
        K::Var(_) => vis.pre_visit_var(expr),
        K::Op1(_) => vis.pre_visit_op1(expr),
        K::Op2(_) => vis.pre_visit_op2(expr),
        K::Op3(_) => vis.pre_visit_op3(expr),
        K::Move(_) => vis.pre_visit_move(expr),
        K::Clone(_) => vis.pre_visit_clone(expr),
        K::Copy(_) => vis.pre_visit_copy(expr),
        K::Sequence(_) => vis.pre_visit_sequence(expr),
        K::TryCatch(_) => vis.pre_visit_try_catch(expr),
        K::Return(_) => vis.pre_visit_return(expr),
        K::Break(_) => vis.pre_visit_break(expr),
        K::Continue(_) => vis.pre_visit_continue(expr),
        K::IfThenElse(_) => vis.pre_visit_if_then_else(expr),
        K::With(_) => vis.pre_visit_with(expr),
        K::While(_) => vis.pre_visit_while(expr),
        K::For(_) => vis.pre_visit_for(expr),
        K::Let(_) => vis.pre_visit_let(expr),
        K::MakeStructure(_) => vis.pre_visit_make_structure(expr),
        K::MakeVariant(_) => vis.pre_visit_make_variant(expr),
        K::MakeArray(_) => vis.pre_visit_make_array(expr),
        K::MakeTuple(_) => vis.pre_visit_make_tuple(expr),
        K::ArrayComprehension(_) => vis.pre_visit_array_comprehension(expr),
        K::ConstValue(_) => {
            vis.pre_visit_const(expr);
            vis.pre_visit_const_value(expr);
        }
        K::ConstString(_) => {
            vis.pre_visit_const(expr);
            vis.pre_visit_const_string(expr);
        }
        K::ConstEnumeration(_) => {
            vis.pre_visit_const(expr);
            vis.pre_visit_const_enumeration(expr);
        }
        K::ConstPtr(_) => {
            vis.pre_visit_const(expr);
            vis.pre_visit_const_ptr(expr);
        }
    }
}

/// Calls the post-hooks of a node, after its children have been visited.
pub(crate) fn dispatch_post(vis: &mut dyn Visitor, expr: &mut Expression) -> Rewrite {
    use ExpressionKind as K;
    let specific = match expr.kind {
        K::Label(_) => return vis.visit_label(expr),
        K::Goto(_) => return vis.visit_goto(expr),
        K::Ref2Value(_) => return vis.visit_ref2value(expr),
        K::Ref2Ptr(_) => return vis.visit_ref2ptr(expr),
        K::Ptr2Ref(_) => return vis.visit_ptr2ref(expr),
        K::Addr(_) => return vis.visit_addr(expr),
        K::NullCoalescing(_) => return vis.visit_null_coalescing(expr),
        K::LooksLikeCall(_) => return vis.visit_looks_like_call(expr),
        K::Call(_) => return vis.visit_call(expr),
        K::NamedCall(_) => return vis.visit_named_call(expr),
        K::MakeGenerator(_) => return vis.visit_make_generator(expr),
        K::New(_) => return vis.visit_new(expr),
        K::Yield(_) => return vis.visit_yield(expr),
        K::MakeBlock(_) => return vis.visit_make_block(expr),
        K::Is(_) => return vis.visit_is(expr),
        K::TypeInfo(_) => return vis.visit_type_info(expr),
        K::Delete(_) => return vis.visit_delete(expr),
        K::Cast(_) => return vis.visit_cast(expr),
        K::Ascend(_) => return vis.visit_ascend(expr),
        K::At(_) => return vis.visit_at(expr),
        K::SafeAt(_) => return vis.visit_safe_at(expr),
        K::Block(_) => return vis.visit_block(expr),
        K::Swizzle(_) => return vis.visit_swizzle(expr),
        K::Field(_) => return vis.visit_field(expr),
        K::SafeField(_) => return vis.visit_safe_field(expr),
        K::IsVariant(_) => return vis.visit_is_variant(expr),
        K::AsVariant(_) => return vis.visit_as_variant(expr),
        K::SafeAsVariant(_) => return vis.visit_safe_as_variant(expr),
        K::StringBuilder(_) => return vis.visit_string_builder(expr),
        K::Var(_) => return vis.visit_var(expr),
        K::Op1(_) => return vis.visit_op1(expr),
        K::Op2(_) => return vis.visit_op2(expr),
        K::Op3(_) => return vis.visit_op3(expr),
        K::Move(_) => return vis.visit_move(expr),
        K::Clone(_) => return vis.visit_clone(expr),
        K::Copy(_) => return vis.visit_copy(expr),
        K::Sequence(_) => return vis.visit_sequence(expr),
        K::TryCatch(_) => return vis.visit_try_catch(expr),
        K::Return(_) => return vis.visit_return(expr),
        K::Break(_) => return vis.visit_break(expr),
        K::Continue(_) => return vis.visit_continue(expr),
        K::IfThenElse(_) => return vis.visit_if_then_else(expr),
        K::With(_) => return vis.visit_with(expr),
        K::While(_) => return vis.visit_while(expr),
        K::For(_) => return vis.visit_for(expr),
        K::Let(_) => return vis.visit_let(expr),
        K::MakeStructure(_) => return vis.visit_make_structure(expr),
        K::MakeVariant(_) => return vis.visit_make_variant(expr),
        K::MakeArray(_) => return vis.visit_make_array(expr),
        K::MakeTuple(_) => return vis.visit_make_tuple(expr),
        K::ArrayComprehension(_) => return vis.visit_array_comprehension(expr),
        K::ConstValue(_) => vis.visit_const_value(expr),
        K::ConstString(_) => vis.visit_const_string(expr),
        K::ConstEnumeration(_) => vis.visit_const_enumeration(expr),
        K::ConstPtr(_) => vis.visit_const_ptr(expr),
    };
    match specific {
        Rewrite::Keep => vis.visit_const(expr),
        rewrite => rewrite,
    }
}

/// Visits a child that must always be present.
///
/// # Panics
///
/// If the visitor removes the child.
pub(crate) fn visit_required<E: AsMut<Expression>>(slot: &mut E, vis: &mut dyn Visitor) {
    let expr = slot.as_mut();
    match expr.visit(vis) {
        Rewrite::Keep => {}
        Rewrite::Replace(replacement) => *expr = replacement,
        Rewrite::Remove => panic!(
            "visitor removed {} from a slot that can't be empty",
            expr.node_name()
        ),
    }
}

/// Visits an optional child. Removing it empties the slot.
pub(crate) fn visit_optional<E: AsMut<Expression>>(slot: &mut Option<E>, vis: &mut dyn Visitor) {
    let keep = match slot {
        Some(child) => {
            let expr = child.as_mut();
            expr.visit(vis).apply(expr)
        }
        None => true,
    };
    if !keep {
        *slot = None;
    }
}

/// Visits every element of a list with `visit`, erasing the elements it removes.
///
/// `visit` receives the element's original position and whether it was the last one.
pub(crate) fn visit_each<T, P>(
    list: &mut Vec<T>,
    vis: &mut dyn Visitor,
    parent: &P,
    mut visit: impl FnMut(&mut dyn Visitor, &P, &mut T, usize, bool) -> Rewrite<T>,
) {
    let total = list.len();
    let mut index = 0;
    list.retain_mut(|item| {
        let last = index + 1 == total;
        let rewrite = visit(&mut *vis, parent, item, index, last);
        index += 1;
        rewrite.apply(item)
    });
}

/// Visits a list of expressions, calling `pre` before and `post` after each element.
///
/// `post` only runs for elements that were not removed while being visited.
pub(crate) fn visit_list<P>(
    list: &mut Vec<Expression>,
    vis: &mut dyn Visitor,
    parent: &P,
    pre: impl Fn(&mut dyn Visitor, &P, &Expression, usize, bool),
    post: impl Fn(&mut dyn Visitor, &P, &mut Expression, usize, bool) -> Rewrite,
) {
    visit_each(list, vis, parent, |vis, parent, expr, index, last| {
        pre(&mut *vis, parent, expr, index, last);
        match expr.visit(&mut *vis) {
            Rewrite::Keep => {}
            Rewrite::Replace(replacement) => *expr = replacement,
            Rewrite::Remove => return Rewrite::Remove,
        }
        post(vis, parent, expr, index, last)
    });
}

/// Visits the type and the initializer of a declared variable.
///
/// The initializer is detached from the variable while it is visited, so hooks may borrow the
/// variable freely.
pub(crate) fn visit_variable(
    var: &Rc<RefCell<Variable>>,
    vis: &mut dyn Visitor,
    pre_init: impl FnOnce(&mut dyn Visitor, &Expression),
    post_init: impl FnOnce(&mut dyn Visitor, &mut Expression) -> Rewrite,
) {
    let mut type_ = std::mem::take(&mut var.borrow_mut().type_);
    crate::program::typing::visit_type_slot(&mut type_, vis);
    var.borrow_mut().type_ = type_;

    let init = var.borrow_mut().init.take();
    if let Some(mut init) = init {
        pre_init(&mut *vis, &init);
        if init.visit(&mut *vis).apply(&mut init) && post_init(vis, &mut init).apply(&mut init) {
            var.borrow_mut().init = Some(init);
        }
    }
}

/// Visits a list of declared variables and returns the list rebuilt from what `visit` returned.
///
/// # Panics
///
/// If `removable` is false and the hook removes a variable.
pub(crate) fn visit_variables(
    list: &[Rc<RefCell<Variable>>],
    vis: &mut dyn Visitor,
    removable: bool,
    mut visit: impl FnMut(&mut dyn Visitor, &Rc<RefCell<Variable>>, bool) -> Rewrite<Rc<RefCell<Variable>>>,
) -> Vec<Rc<RefCell<Variable>>> {
    let total = list.len();
    let mut result = Vec::with_capacity(total);
    for (index, var) in list.iter().cloned().enumerate() {
        match visit(&mut *vis, &var, index + 1 == total) {
            Rewrite::Keep => result.push(var),
            Rewrite::Replace(replacement) => result.push(replacement),
            Rewrite::Remove if removable => {}
            Rewrite::Remove => panic!(
                "visitor removed variable `{}` which can't be removed",
                var.borrow().name
            ),
        }
    }
    result
}
