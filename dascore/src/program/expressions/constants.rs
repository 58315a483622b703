use crate::program::expressions::{ExpressionKind, ExpressionNode};
use crate::program::visitors::{CloneContext, Visitor};
use crate::program::{BaseType, Enumeration};
use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::{Rc, Weak};

/// Value of a numeric, boolean, vector or range literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int(i32),
    UInt(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Int2([i32; 2]),
    Int3([i32; 3]),
    Int4([i32; 4]),
    UInt2([u32; 2]),
    UInt3([u32; 3]),
    UInt4([u32; 4]),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Range([i32; 2]),
    URange([u32; 2]),
}

impl ConstValue {
    pub fn base_type(&self) -> BaseType {
        match self {
            ConstValue::Bool(_) => BaseType::Bool,
            ConstValue::Int8(_) => BaseType::Int8,
            ConstValue::UInt8(_) => BaseType::UInt8,
            ConstValue::Int16(_) => BaseType::Int16,
            ConstValue::UInt16(_) => BaseType::UInt16,
            ConstValue::Int(_) => BaseType::Int,
            ConstValue::UInt(_) => BaseType::UInt,
            ConstValue::Int64(_) => BaseType::Int64,
            ConstValue::UInt64(_) => BaseType::UInt64,
            ConstValue::Float(_) => BaseType::Float,
            ConstValue::Double(_) => BaseType::Double,
            ConstValue::Int2(_) => BaseType::Int2,
            ConstValue::Int3(_) => BaseType::Int3,
            ConstValue::Int4(_) => BaseType::Int4,
            ConstValue::UInt2(_) => BaseType::UInt2,
            ConstValue::UInt3(_) => BaseType::UInt3,
            ConstValue::UInt4(_) => BaseType::UInt4,
            ConstValue::Float2(_) => BaseType::Float2,
            ConstValue::Float3(_) => BaseType::Float3,
            ConstValue::Float4(_) => BaseType::Float4,
            ConstValue::Range(_) => BaseType::Range,
            ConstValue::URange(_) => BaseType::URange,
        }
    }

    /// Value of a scalar integer constant, sign- or zero-extended.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ConstValue::Int8(value) => Some(value as i64),
            ConstValue::UInt8(value) => Some(value as i64),
            ConstValue::Int16(value) => Some(value as i64),
            ConstValue::UInt16(value) => Some(value as i64),
            ConstValue::Int(value) => Some(value as i64),
            ConstValue::UInt(value) => Some(value as i64),
            ConstValue::Int64(value) => Some(value),
            ConstValue::UInt64(value) => Some(value as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ConstValue::Float(value) => Some(value as f64),
            ConstValue::Double(value) => Some(value),
            _ => self.as_i64().map(|value| value as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ConstValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Builds an integer constant of the given type, truncating `value` to its width.
    pub fn from_i64(base_type: BaseType, value: i64) -> Option<ConstValue> {
        let constant = match base_type {
            BaseType::Int8 => ConstValue::Int8(value as i8),
            BaseType::UInt8 => ConstValue::UInt8(value as u8),
            BaseType::Int16 => ConstValue::Int16(value as i16),
            BaseType::UInt16 => ConstValue::UInt16(value as u16),
            BaseType::Int => ConstValue::Int(value as i32),
            BaseType::UInt => ConstValue::UInt(value as u32),
            BaseType::Int64 => ConstValue::Int64(value),
            BaseType::UInt64 => ConstValue::UInt64(value as u64),
            _ => return None,
        };
        Some(constant)
    }

    /// Converts a constant to another scalar type with the semantics of a numeric cast.
    ///
    /// Vector and range constants only convert to their own type.
    pub fn convert(&self, base_type: BaseType) -> Option<ConstValue> {
        if self.base_type() == base_type {
            return Some(*self);
        }
        match base_type {
            BaseType::Bool => match *self {
                ConstValue::Float(value) => Some(ConstValue::Bool(value != 0.0)),
                ConstValue::Double(value) => Some(ConstValue::Bool(value != 0.0)),
                _ => self.as_i64().map(|value| ConstValue::Bool(value != 0)),
            },
            BaseType::Float => self.as_f64().map(|value| ConstValue::Float(value as f32)),
            BaseType::Double => self.as_f64().map(ConstValue::Double),
            _ if base_type.is_integer() => {
                let value = match *self {
                    ConstValue::Bool(value) => value as i64,
                    ConstValue::Float(value) => value as i64,
                    ConstValue::Double(value) => value as i64,
                    _ => self.as_i64()?,
                };
                ConstValue::from_i64(base_type, value)
            }
            _ => None,
        }
    }
}

fn write_vector<T: Display>(f: &mut fmt::Formatter<'_>, name: &str, values: &[T]) -> fmt::Result {
    let values: Vec<_> = values.iter().map(|value| value.to_string()).collect();
    write!(f, "{}({})", name, values.join(","))
}

impl Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(value) => write!(f, "{}", value),
            ConstValue::Int8(value) => write!(f, "{}", value),
            ConstValue::UInt8(value) => write!(f, "{}u8", value),
            ConstValue::Int16(value) => write!(f, "{}", value),
            ConstValue::UInt16(value) => write!(f, "{}u16", value),
            ConstValue::Int(value) => write!(f, "{}", value),
            ConstValue::UInt(value) => write!(f, "{}u", value),
            ConstValue::Int64(value) => write!(f, "{}l", value),
            ConstValue::UInt64(value) => write!(f, "{}ul", value),
            ConstValue::Float(value) => write!(f, "{:?}f", value),
            ConstValue::Double(value) => write!(f, "{:?}lf", value),
            ConstValue::Int2(values) => write_vector(f, "int2", values),
            ConstValue::Int3(values) => write_vector(f, "int3", values),
            ConstValue::Int4(values) => write_vector(f, "int4", values),
            ConstValue::UInt2(values) => write_vector(f, "uint2", values),
            ConstValue::UInt3(values) => write_vector(f, "uint3", values),
            ConstValue::UInt4(values) => write_vector(f, "uint4", values),
            ConstValue::Float2(values) => write_vector(f, "float2", values),
            ConstValue::Float3(values) => write_vector(f, "float3", values),
            ConstValue::Float4(values) => write_vector(f, "float4", values),
            ConstValue::Range(values) => write_vector(f, "range", values),
            ConstValue::URange(values) => write_vector(f, "urange", values),
        }
    }
}

#[derive(Debug)]
pub struct ExprConstValue {
    pub value: ConstValue,
}

impl ExpressionNode for ExprConstValue {
    fn node_name(&self) -> &'static str {
        "ExprConstValue"
    }

    fn clone_node(&self, _context: &mut CloneContext) -> ExpressionKind {
        ExprConstValue { value: self.value }.into()
    }

    fn walk(&mut self, _vis: &mut dyn Visitor) {}
}

#[derive(Debug)]
pub struct ExprConstString {
    pub value: String,
}

impl ExpressionNode for ExprConstString {
    fn node_name(&self) -> &'static str {
        "ExprConstString"
    }

    fn clone_node(&self, _context: &mut CloneContext) -> ExpressionKind {
        ExprConstString {
            value: self.value.clone(),
        }
        .into()
    }

    fn walk(&mut self, _vis: &mut dyn Visitor) {}
}

/// A value of an enumeration, referenced by name.
#[derive(Debug)]
pub struct ExprConstEnumeration {
    pub enum_type: Option<Weak<RefCell<Enumeration>>>,
    pub text: String,
}

impl ExprConstEnumeration {
    pub fn new(enumeration: &Rc<RefCell<Enumeration>>, text: impl Into<String>) -> ExprConstEnumeration {
        ExprConstEnumeration {
            enum_type: Some(Rc::downgrade(enumeration)),
            text: text.into(),
        }
    }

    pub fn enumeration(&self) -> Option<Rc<RefCell<Enumeration>>> {
        self.enum_type.as_ref().and_then(Weak::upgrade)
    }
}

impl ExpressionNode for ExprConstEnumeration {
    fn node_name(&self) -> &'static str {
        "ExprConstEnumeration"
    }

    fn clone_node(&self, _context: &mut CloneContext) -> ExpressionKind {
        ExprConstEnumeration {
            enum_type: self.enum_type.clone(),
            text: self.text.clone(),
        }
        .into()
    }

    fn walk(&mut self, _vis: &mut dyn Visitor) {}
}

/// The null pointer.
#[derive(Debug)]
pub struct ExprConstPtr;

impl ExpressionNode for ExprConstPtr {
    fn node_name(&self) -> &'static str {
        "ExprConstPtr"
    }

    fn clone_node(&self, _context: &mut CloneContext) -> ExpressionKind {
        ExprConstPtr.into()
    }

    fn walk(&mut self, _vis: &mut dyn Visitor) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_constants_truncate() {
        assert_eq!(
            ConstValue::from_i64(BaseType::UInt8, 257),
            Some(ConstValue::UInt8(1))
        );
        assert_eq!(ConstValue::from_i64(BaseType::Float, 1), None);
        assert_eq!(ConstValue::UInt(7).as_i64(), Some(7));
        assert_eq!(ConstValue::Float(1.0).as_i64(), None);
    }

    #[test]
    fn conversions() {
        assert_eq!(
            ConstValue::Double(2.75).convert(BaseType::Int),
            Some(ConstValue::Int(2))
        );
        assert_eq!(
            ConstValue::Int(0).convert(BaseType::Bool),
            Some(ConstValue::Bool(false))
        );
        assert_eq!(ConstValue::Int2([1, 2]).convert(BaseType::Int), None);
    }

    #[test]
    fn display() {
        assert_eq!(ConstValue::Int(-3).to_string(), "-3");
        assert_eq!(ConstValue::UInt(3).to_string(), "3u");
        assert_eq!(ConstValue::Float(1.5).to_string(), "1.5f");
        assert_eq!(ConstValue::Float3([1.0, 2.0, 0.5]).to_string(), "float3(1,2,0.5)");
    }
}
