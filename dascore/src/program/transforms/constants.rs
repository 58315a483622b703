use crate::program::expressions::{ConstValue, Expression, ExpressionKind};
use crate::program::visitors::{Rewrite, Visitor};
use crate::program::transforms::is_builtin_operator;
use crate::program::{BaseType, Program};

/// Evaluates operators over constants and concatenates constant string builders.
pub fn fold_constants(program: &mut Program) -> bool {
    let mut folding = ConstFolding { changed: false };
    program.visit(&mut folding, false);
    folding.changed
}

/// Value of a unary operator applied to a scalar constant, if it can be computed.
pub fn fold_op1(op: &str, value: ConstValue) -> Option<ConstValue> {
    let base_type = value.base_type();
    match (op, value) {
        ("!", ConstValue::Bool(value)) => Some(ConstValue::Bool(!value)),
        ("+", _) if base_type.is_numeric() => Some(value),
        ("-", ConstValue::Float(value)) => Some(ConstValue::Float(-value)),
        ("-", ConstValue::Double(value)) => Some(ConstValue::Double(-value)),
        ("-", _) => wrap(base_type, -as_i128(value)?),
        ("~", _) => wrap(base_type, !as_i128(value)?),
        _ => None,
    }
}

/// Value of a binary operator applied to two scalar constants of the same type.
///
/// Integer arithmetic wraps around. Division and modulo by zero are left to the program.
pub fn fold_op2(op: &str, left: ConstValue, right: ConstValue) -> Option<ConstValue> {
    let base_type = left.base_type();
    if base_type != right.base_type() {
        return None;
    }
    match (left, right) {
        (ConstValue::Bool(left), ConstValue::Bool(right)) => fold_bools(op, left, right),
        (ConstValue::Float(left), ConstValue::Float(right)) => {
            fold_floats(op, left as f64, right as f64, |value| ConstValue::Float(value as f32))
        }
        (ConstValue::Double(left), ConstValue::Double(right)) => {
            fold_floats(op, left, right, ConstValue::Double)
        }
        _ => fold_integers(op, base_type, as_i128(left)?, as_i128(right)?),
    }
}

fn fold_bools(op: &str, left: bool, right: bool) -> Option<ConstValue> {
    let result = match op {
        "==" => left == right,
        "!=" | "^^" => left != right,
        "&&" => left && right,
        "||" => left || right,
        _ => return None,
    };
    Some(ConstValue::Bool(result))
}

fn fold_floats(
    op: &str,
    left: f64,
    right: f64,
    make: impl Fn(f64) -> ConstValue,
) -> Option<ConstValue> {
    let result = match op {
        "+" => left + right,
        "-" => left - right,
        "*" => left * right,
        "/" if right != 0.0 => left / right,
        _ => return compare(op, left.partial_cmp(&right)?),
    };
    Some(make(result))
}

fn fold_integers(op: &str, base_type: BaseType, left: i128, right: i128) -> Option<ConstValue> {
    let bits = integer_bits(base_type)?;
    let result = match op {
        "+" => left + right,
        "-" => left - right,
        "*" => left.wrapping_mul(right),
        "/" if right != 0 => left / right,
        "%" if right != 0 => left % right,
        "&" => left & right,
        "|" => left | right,
        "^" => left ^ right,
        "<<" if (0..bits as i128).contains(&right) => left << right as u32,
        ">>" if (0..bits as i128).contains(&right) => left >> right as u32,
        _ => return compare(op, left.cmp(&right)),
    };
    wrap(base_type, result)
}

fn compare(op: &str, ordering: std::cmp::Ordering) -> Option<ConstValue> {
    use std::cmp::Ordering::*;
    let result = match op {
        "==" => ordering == Equal,
        "!=" => ordering != Equal,
        "<" => ordering == Less,
        "<=" => ordering != Greater,
        ">" => ordering == Greater,
        ">=" => ordering != Less,
        _ => return None,
    };
    Some(ConstValue::Bool(result))
}

/// Exact value of an integer constant. Wide enough for every integer type.
fn as_i128(value: ConstValue) -> Option<i128> {
    match value {
        ConstValue::UInt64(value) => Some(value as i128),
        _ => value.as_i64().map(i128::from),
    }
}

/// Truncates an exact result to the width of `base_type`.
fn wrap(base_type: BaseType, value: i128) -> Option<ConstValue> {
    ConstValue::from_i64(base_type, value as i64)
}

fn integer_bits(base_type: BaseType) -> Option<u32> {
    let bits = match base_type {
        BaseType::Int8 | BaseType::UInt8 => 8,
        BaseType::Int16 | BaseType::UInt16 => 16,
        BaseType::Int | BaseType::UInt => 32,
        BaseType::Int64 | BaseType::UInt64 => 64,
        _ => return None,
    };
    Some(bits)
}

/// Text of a constant inside a string builder. Only scalars are interpolated.
fn interpolate(value: ConstValue) -> Option<String> {
    let text = match value {
        ConstValue::Bool(value) => value.to_string(),
        ConstValue::Float(value) => value.to_string(),
        ConstValue::Double(value) => value.to_string(),
        ConstValue::UInt64(value) => value.to_string(),
        _ => value.as_i64()?.to_string(),
    };
    Some(text)
}

struct ConstFolding {
    changed: bool,
}

impl ConstFolding {
    fn fold(&mut self, expr: &Expression, folded: Option<ConstValue>) -> Rewrite {
        match folded {
            Some(value) => {
                self.changed = true;
                Rewrite::Replace(Expression::const_value(expr.at, value))
            }
            None => Rewrite::Keep,
        }
    }
}

impl Visitor for ConstFolding {
    fn visit_op1(&mut self, expr: &mut Expression) -> Rewrite {
        let folded = match expr.kind {
            ExpressionKind::Op1(ref op) if is_builtin_operator(&op.func) => op
                .subexpr
                .as_const_value()
                .and_then(|value| fold_op1(&op.op, value)),
            _ => None,
        };
        self.fold(expr, folded)
    }

    fn visit_op2(&mut self, expr: &mut Expression) -> Rewrite {
        let folded = match expr.kind {
            ExpressionKind::Op2(ref op) if is_builtin_operator(&op.func) => {
                match (op.left.as_const_value(), op.right.as_const_value()) {
                    (Some(left), Some(right)) => fold_op2(&op.op, left, right),
                    _ => None,
                }
            }
            _ => None,
        };
        self.fold(expr, folded)
    }

    fn visit_string_builder(&mut self, expr: &mut Expression) -> Rewrite {
        let builder = match expr.kind {
            ExpressionKind::StringBuilder(ref builder) => builder,
            _ => return Rewrite::Keep,
        };
        let mut text = String::new();
        for element in &builder.elements {
            match element.kind {
                ExpressionKind::ConstString(ref constant) => text.push_str(&constant.value),
                ExpressionKind::ConstValue(ref constant) => match interpolate(constant.value) {
                    Some(value) => text.push_str(&value),
                    None => return Rewrite::Keep,
                },
                _ => return Rewrite::Keep,
            }
        }
        self.changed = true;
        Rewrite::Replace(Expression::const_string(expr.at, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::expressions::{ExprOp1, ExprOp2, ExprStringBuilder, ExprVar};
    use crate::program::transforms::tests::{body_of, int, program_with_body};
    use crate::program::{Function, TypeDecl};
    use crate::source::InputSpan;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn op2(op: &str, left: Expression, right: Expression) -> Expression {
        Expression::new(InputSpan::builtin(), ExprOp2::new(op, left, right))
    }

    #[test]
    fn nested_arithmetic_folds_bottom_up() {
        let at = InputSpan::builtin();
        let body = op2("+", int(2), op2("*", int(3), Expression::new(at, ExprOp1::new("-", int(4)))));
        let (mut program, function) = program_with_body(body);
        assert!(fold_constants(&mut program));
        let body = body_of(&function);
        assert_eq!(body.as_const_value(), Some(ConstValue::Int(-10)));
        assert_eq!(body.type_.as_ref().map(|type_| type_.base_type), Some(BaseType::Int));
    }

    #[test]
    fn integers_wrap_to_their_width() {
        assert_eq!(
            fold_op2("+", ConstValue::Int8(127), ConstValue::Int8(1)),
            Some(ConstValue::Int8(-128))
        );
        assert_eq!(
            fold_op2("-", ConstValue::UInt(0), ConstValue::UInt(1)),
            Some(ConstValue::UInt(u32::MAX))
        );
        assert_eq!(
            fold_op2("*", ConstValue::UInt64(u64::MAX), ConstValue::UInt64(2)),
            Some(ConstValue::UInt64(u64::MAX - 1))
        );
        assert_eq!(
            fold_op2("/", ConstValue::Int(i32::MIN), ConstValue::Int(-1)),
            Some(ConstValue::Int(i32::MIN))
        );
        assert_eq!(fold_op1("-", ConstValue::Int(i32::MIN)), Some(ConstValue::Int(i32::MIN)));
        assert_eq!(fold_op1("~", ConstValue::UInt8(0x0f)), Some(ConstValue::UInt8(0xf0)));
        assert_eq!(
            fold_op2(">>", ConstValue::Int(-8), ConstValue::Int(1)),
            Some(ConstValue::Int(-4))
        );
    }

    #[test]
    fn unsafe_operations_are_not_folded() {
        assert_eq!(fold_op2("/", ConstValue::Int(1), ConstValue::Int(0)), None);
        assert_eq!(fold_op2("%", ConstValue::UInt(1), ConstValue::UInt(0)), None);
        assert_eq!(fold_op2("/", ConstValue::Float(1.0), ConstValue::Float(0.0)), None);
        assert_eq!(fold_op2("<<", ConstValue::Int(1), ConstValue::Int(32)), None);
        assert_eq!(fold_op2("+", ConstValue::Int(1), ConstValue::UInt(1)), None);
        assert_eq!(fold_op1("!", ConstValue::Int(1)), None);

        let (mut program, function) = program_with_body(op2("/", int(1), int(0)));
        assert!(!fold_constants(&mut program));
        assert_eq!(body_of(&function).node_name(), "ExprOp2");
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(
            fold_op2("<=", ConstValue::UInt64(u64::MAX), ConstValue::UInt64(1)),
            Some(ConstValue::Bool(false))
        );
        assert_eq!(
            fold_op2(">", ConstValue::Double(2.5), ConstValue::Double(1.0)),
            Some(ConstValue::Bool(true))
        );
        assert_eq!(
            fold_op2("^^", ConstValue::Bool(true), ConstValue::Bool(true)),
            Some(ConstValue::Bool(false))
        );
        assert_eq!(fold_op1("!", ConstValue::Bool(false)), Some(ConstValue::Bool(true)));
    }

    #[test]
    fn constant_string_builders_become_strings() {
        let at = InputSpan::builtin();
        let elements = vec![
            Expression::const_string(at, "x = "),
            int(4),
            Expression::const_string(at, ", ok = "),
            Expression::const_value(at, ConstValue::Bool(true)),
        ];
        let (mut program, function) = program_with_body(Expression::new(at, ExprStringBuilder::new(elements)));
        assert!(fold_constants(&mut program));
        match body_of(&function).kind {
            ExpressionKind::ConstString(ref constant) => assert_eq!(constant.value, "x = 4, ok = true"),
            _ => unreachable!(),
        }

        let elements = vec![Expression::const_string(at, "x = "), Expression::new(at, ExprVar::new("x"))];
        let (mut program, _) = program_with_body(Expression::new(at, ExprStringBuilder::new(elements)));
        assert!(!fold_constants(&mut program));
    }

    #[test]
    fn user_operators_are_not_evaluated() {
        let at = InputSpan::builtin();
        let user_add = Rc::new(RefCell::new(Function::new("+", at)));
        let builtin_add = Rc::new(RefCell::new(Function::builtin("+", Vec::new(), TypeDecl::new(BaseType::Int))));
        let with_func = |function: &Rc<RefCell<Function>>| {
            let mut op = ExprOp2::new("+", int(1), int(2));
            op.func = Some(Rc::downgrade(function));
            Expression::new(at, op)
        };

        let (mut program, function) = program_with_body(with_func(&user_add));
        assert!(!fold_constants(&mut program));
        assert_eq!(body_of(&function).node_name(), "ExprOp2");

        let mut negate = ExprOp1::new("-", int(4));
        negate.func = Some(Rc::downgrade(&user_add));
        let (mut program, function) = program_with_body(Expression::new(at, negate));
        assert!(!fold_constants(&mut program));
        assert_eq!(body_of(&function).node_name(), "ExprOp1");

        let (mut program, function) = program_with_body(with_func(&builtin_add));
        assert!(fold_constants(&mut program));
        assert_eq!(body_of(&function).as_const_value(), Some(ConstValue::Int(3)));
    }
}
