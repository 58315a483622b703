use crate::program::expressions::{ConstValue, ExprConstValue};
use crate::program::{get_const_expr_int_or_uint, BaseType, Expression, TypeDecl};
use crate::source::InputSpan;
use std::cell::RefCell;
use std::rc::Rc;

/// A named set of integer constants.
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub name: String,

    /// Storage type of the values. One of the 8, 16 or 32 bit integer types.
    pub base_type: BaseType,

    /// Values in declaration order. A missing expression means the value is to be assigned by
    /// `resolve_values`.
    pub list: Vec<(String, Option<Expression>)>,

    pub at: InputSpan,
    pub module: Option<String>,
    pub external: bool,
}

impl Enumeration {
    pub fn new(name: impl Into<String>, base_type: BaseType, at: InputSpan) -> Enumeration {
        Enumeration {
            name: name.into(),
            base_type,
            list: Vec::new(),
            at,
            module: None,
            external: false,
        }
    }

    /// E.g. `colors::Color#int`.
    pub fn mangled_name(&self) -> String {
        let name = match self.module {
            Some(ref module) if !module.is_empty() => format!("{}::{}", module, self.name),
            _ => self.name.clone(),
        };
        format!("{}#{}", name, self.base_type)
    }

    /// Adds a value to be numbered automatically. Returns false if the name is taken.
    #[must_use]
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        self.add_value(name, None)
    }

    #[must_use]
    pub fn add_int(&mut self, name: impl Into<String>, value: i64) -> bool {
        let expression = Expression::new(
            InputSpan::builtin(),
            ExprConstValue {
                value: ConstValue::Int64(value),
            },
        );
        self.add_value(name, Some(expression))
    }

    /// Adds a value. An existing value with the same name is left intact and false is returned.
    #[must_use]
    pub fn add_value(&mut self, name: impl Into<String>, value: Option<Expression>) -> bool {
        let name = name.into();
        if self.list.iter().any(|(existing, _)| *existing == name) {
            return false;
        }
        self.list.push((name, value));
        true
    }

    /// Looks up a value by name. The inner option is `None` for values not assigned yet.
    pub fn find(&self, name: &str) -> Option<Option<&Expression>> {
        self.list
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_ref())
    }

    /// Returns the integer value of an entry, or `default` if there is no such entry.
    ///
    /// # Panics
    ///
    /// If the entry has not been folded to an integer constant.
    pub fn find_value(&self, name: &str, default: i64) -> i64 {
        match self.find(name) {
            Some(value) => value
                .and_then(get_const_expr_int_or_uint)
                .expect("enumeration value was not folded to an integer constant"),
            None => default,
        }
    }

    /// Returns the name of the first entry with the given value.
    pub fn find_name(&self, value: i64, default: &str) -> String {
        self.list
            .iter()
            .find(|(_, expression)| {
                expression
                    .as_ref()
                    .and_then(get_const_expr_int_or_uint)
                    .map_or(false, |existing| existing == value)
            })
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| default.to_string())
    }

    /// Kind of the enumeration type with this storage type.
    ///
    /// # Panics
    ///
    /// If the storage type is not an 8, 16 or 32 bit integer.
    pub fn enum_type(&self) -> BaseType {
        match self.base_type {
            BaseType::Int8 | BaseType::UInt8 => BaseType::Enumeration8,
            BaseType::Int16 | BaseType::UInt16 => BaseType::Enumeration16,
            BaseType::Int | BaseType::UInt => BaseType::Enumeration,
            other => panic!("unsupported enumeration base type `{}`", other),
        }
    }

    pub fn make_base_type(&self) -> TypeDecl {
        TypeDecl::new(self.base_type)
    }

    pub fn make_enum_type(enumeration: &Rc<RefCell<Enumeration>>) -> TypeDecl {
        TypeDecl::enumeration(enumeration)
    }

    /// Assigns consecutive values to entries declared without one.
    ///
    /// Numbering continues from the previous entry, starting at zero. Entries with a value that
    /// is not an integer constant are left for later passes and restart numbering after them.
    pub fn resolve_values(&mut self) {
        let base_type = self.base_type;
        let mut next = 0i64;
        for (_, value) in &mut self.list {
            match value {
                Some(expression) => {
                    if let Some(current) = get_const_expr_int_or_uint(expression) {
                        next = current.wrapping_add(1);
                    }
                }
                None => {
                    let constant = ConstValue::from_i64(base_type, next)
                        .unwrap_or(ConstValue::Int64(next));
                    *value = Some(Expression::new(
                        InputSpan::builtin(),
                        ExprConstValue { value: constant },
                    ));
                    next = next.wrapping_add(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> Enumeration {
        let mut colors = Enumeration::new("Color", BaseType::Int, InputSpan::builtin());
        assert!(colors.add("red"));
        assert!(colors.add_int("green", 10));
        assert!(colors.add("blue"));
        colors
    }

    #[test]
    fn duplicate_value_is_rejected() {
        let mut colors = colors();
        assert!(!colors.add_int("green", 42));
        colors.resolve_values();
        assert_eq!(colors.find_value("green", -1), 10);
        assert_eq!(colors.list.len(), 3);
    }

    #[test]
    fn values_are_numbered_after_previous() {
        let mut colors = colors();
        colors.resolve_values();

        assert_eq!(colors.find_value("red", -1), 0);
        assert_eq!(colors.find_value("blue", -1), 11);
        assert_eq!(colors.find_value("purple", -1), -1);
        assert_eq!(colors.find_name(11, "?"), "blue");
        assert_eq!(colors.find_name(5, "?"), "?");
    }

    #[test]
    fn enum_type_follows_storage() {
        let mut colors = colors();
        assert_eq!(colors.enum_type(), BaseType::Enumeration);
        colors.base_type = BaseType::UInt8;
        assert_eq!(colors.enum_type(), BaseType::Enumeration8);
        colors.module = Some("paint".to_string());
        assert_eq!(colors.mangled_name(), "paint::Color#uint8");
    }

    #[test]
    #[should_panic(expected = "unsupported enumeration base type")]
    fn float_storage_is_rejected() {
        Enumeration::new("Bad", BaseType::Float, InputSpan::builtin()).enum_type();
    }
}
