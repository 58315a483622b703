use crate::program::expressions::{Expression, ExpressionKind};
use crate::program::visitors::{Rewrite, Visitor};
use crate::program::*;
use crate::sexp;
use crate::utils::sexp::{Sexp, ToSexp};
use std::fmt::{self, Display, Formatter};

const MAX_LINE_LENGTH: usize = 100;

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let module = self.this_module.borrow();
        let mut program = sexp!("program", Sexp::quoted(&module.name));
        for enumeration in module.enumerations() {
            program.push(enumeration.borrow().to_sexp());
        }
        for structure in module.structures() {
            program.push(structure.borrow().to_sexp());
        }
        for alias in module.aliases() {
            program.push(sexp!("typedef", alias.alias.as_str(), alias.to_string()));
        }
        for global in module.globals() {
            program.push(global.borrow().to_sexp());
        }
        for function in module.functions() {
            program.push(function.borrow().to_sexp());
        }
        write!(f, "{}", program.pretty_print(MAX_LINE_LENGTH))
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sexp().pretty_print(MAX_LINE_LENGTH))
    }
}

impl ToSexp for Expression {
    fn to_sexp(&self) -> Sexp {
        // Visiting needs a mutable tree, so the printer walks a copy.
        let mut copy = self.deep_clone();
        let mut printer = SexpPrinter { open: Vec::new(), root: None };
        let rewrite = copy.visit(&mut printer);
        debug_assert!(rewrite.is_keep());
        printer.root.unwrap_or_else(|| Sexp::List(Vec::new()))
    }
}

impl ToSexp for Function {
    fn to_sexp(&self) -> Sexp {
        let arguments: Vec<_> = self
            .arguments
            .iter()
            .map(|arg| arg.borrow().to_sexp())
            .collect();
        let mut result = sexp!("def", self.name.as_str(), arguments, self.result.to_string());
        if let Some(ref body) = self.body {
            result.push(body.to_sexp());
        }
        result
    }
}

impl ToSexp for Variable {
    fn to_sexp(&self) -> Sexp {
        let mut result = sexp!(self.name.as_str(), self.type_.to_string());
        if let Some(ref init) = self.init {
            result.push(init.to_sexp());
        }
        result
    }
}

impl ToSexp for Structure {
    fn to_sexp(&self) -> Sexp {
        let mut result = sexp!("struct", self.name.as_str());
        if let Some(parent) = self.parent_ref() {
            result.push(sexp!(":", parent.borrow().name.as_str()));
        }
        for field in &self.fields {
            let mut declaration = sexp!(field.name.as_str(), field.type_.to_string());
            if let Some(ref init) = field.init {
                declaration.push(init.to_sexp());
            }
            result.push(declaration);
        }
        result
    }
}

impl ToSexp for Enumeration {
    fn to_sexp(&self) -> Sexp {
        let mut result = sexp!("enum", self.name.as_str(), self.base_type.to_string());
        for (name, value) in &self.list {
            result.push(match value {
                Some(value) => sexp!(name.as_str(), value.to_sexp()),
                None => sexp!(name.as_str()),
            });
        }
        result
    }
}

/// Builds the s-expression of a tree bottom-up: every node opens a list on the way down and
/// closes it into its parent on the way up.
struct SexpPrinter {
    open: Vec<Sexp>,
    root: Option<Sexp>,
}

impl Visitor for SexpPrinter {
    fn pre_visit_expression(&mut self, expr: &mut Expression) {
        self.open.push(node_label(expr));
    }

    fn visit_expression(&mut self, _expr: &mut Expression) -> Rewrite {
        let node = match self.open.pop() {
            Some(node) => node,
            None => panic!("expression closed without being opened"),
        };
        match self.open.last_mut() {
            Some(parent) => parent.push(node),
            None => self.root = Some(node),
        }
        Rewrite::Keep
    }
}

/// Node name without the `Expr` prefix, followed by the attributes that are not children.
fn node_label(expr: &Expression) -> Sexp {
    use ExpressionKind as K;
    let mut label = sexp!(expr.node_name().trim_start_matches("Expr"));
    match expr.kind {
        K::Var(ref var) => label.push(var.name.as_str()),
        K::Call(ref call) => label.push(call.name.as_str()),
        K::LooksLikeCall(ref call) => label.push(call.name.as_str()),
        K::NamedCall(ref call) => {
            label.push(call.name.as_str());
            for arg in &call.arguments {
                label.push(sexp!("=", arg.name.as_str()));
            }
        }
        K::Op1(ref op) => label.push(op.op.as_str()),
        K::Op2(ref op) => label.push(op.op.as_str()),
        K::Op3(ref op) => label.push(op.op.as_str()),
        K::Field(ref field) => label.push(field.name.as_str()),
        K::Addr(ref addr) => label.push(addr.target.as_str()),
        K::Label(ref node) => label.push(node.label as i64),
        K::Goto(ref node) => label.push(node.label as i64),
        K::Let(ref node) => {
            for var in &node.variables {
                let var = var.borrow();
                label.push(sexp!(var.name.as_str(), var.type_.to_string()));
            }
        }
        K::For(ref node) => {
            for iterator in &node.iterators {
                label.push(iterator.as_str());
            }
        }
        K::ConstValue(ref constant) => label.push(constant.value.to_string()),
        K::ConstString(ref constant) => label.push(Sexp::quoted(&constant.value)),
        K::ConstEnumeration(ref constant) => label.push(constant.text.as_str()),
        _ => {}
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{ConstValue, ExprBlock, ExprCall, ExprOp2, ExprVar};
    use crate::source::InputSpan;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn int(value: i32) -> Expression {
        Expression::const_value(InputSpan::builtin(), ConstValue::Int(value))
    }

    #[test]
    fn expressions_print_as_sexps() {
        let at = InputSpan::builtin();
        let sum = Expression::new(at, ExprOp2::new("+", Expression::new(at, ExprVar::new("a")), int(1)));
        let call = Expression::new(at, ExprCall::new("print", vec![Expression::const_string(at, "hi")]));
        let block = Expression::new(at, ExprBlock::with_list(vec![sum, call]));
        assert_eq!(
            block.to_string(),
            r#"(Block (Op2 + (Var a) (ConstValue 1)) (Call print (ConstString "hi")))"#
        );
    }

    #[test]
    fn program_lists_declarations() {
        let at = InputSpan::builtin();
        let mut program = Program::new();
        let mut color = Enumeration::new("Color", BaseType::Int, at);
        assert!(color.add("red"));
        assert!(program.add_enumeration(Rc::new(RefCell::new(color))));
        let function = Function {
            body: Some(int(3)),
            result: TypeDecl::new(BaseType::Int),
            ..Function::new("three", at)
        };
        assert!(program.add_function(Rc::new(RefCell::new(function))));
        assert_eq!(
            program.to_string(),
            r#"(program "" (enum Color int (red)) (def three () int (ConstValue 3)))"#
        );
    }
}
