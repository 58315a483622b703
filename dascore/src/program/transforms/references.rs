use crate::program::expressions::{Expression, ExpressionKind};
use crate::program::visitors::{Rewrite, Visitor};
use crate::program::Program;

/// Removes conversions that cancel out or have nothing to convert:
/// `ref2value(constant)`, `ptr2ref(ref2ptr(x))` and `ref2ptr(ptr2ref(x))`.
pub fn fold_references(program: &mut Program) -> bool {
    let mut folding = RefFolding { changed: false };
    program.visit(&mut folding, false);
    folding.changed
}

struct RefFolding {
    changed: bool,
}

impl RefFolding {
    fn fold(&mut self, folded: Expression) -> Rewrite {
        self.changed = true;
        Rewrite::Replace(folded)
    }
}

impl Visitor for RefFolding {
    fn visit_ref2value(&mut self, expr: &mut Expression) -> Rewrite {
        match expr.kind {
            ExpressionKind::Ref2Value(ref mut node) if node.subexpr.is_constant() => {
                let constant = node.subexpr.take();
                self.fold(constant)
            }
            _ => Rewrite::Keep,
        }
    }

    fn visit_ptr2ref(&mut self, expr: &mut Expression) -> Rewrite {
        if let ExpressionKind::Ptr2Ref(ref mut node) = expr.kind {
            if let ExpressionKind::Ref2Ptr(ref mut inner) = node.subexpr.kind {
                let value = inner.subexpr.take();
                return self.fold(value);
            }
        }
        Rewrite::Keep
    }

    fn visit_ref2ptr(&mut self, expr: &mut Expression) -> Rewrite {
        if let ExpressionKind::Ref2Ptr(ref mut node) = expr.kind {
            if let ExpressionKind::Ptr2Ref(ref mut inner) = node.subexpr.kind {
                let value = inner.subexpr.take();
                return self.fold(value);
            }
        }
        Rewrite::Keep
    }
}
