//! S-expressions for dumping trees in a compact, diffable form.

use std::fmt::{self, Display, Formatter};

/// A tree of atoms. Lists print as `(a b c)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

/// Builds a list from anything convertible to `Sexp`: `sexp!("call", name, arg.to_sexp())`.
#[macro_export]
macro_rules! sexp {
    ($($element:expr),* $(,)?) => {
        $crate::utils::sexp::Sexp::List(vec![$($crate::utils::sexp::Sexp::from($element)),*])
    };
}

pub trait ToSexp {
    fn to_sexp(&self) -> Sexp;
}

impl Sexp {
    pub fn atom(value: impl ToString) -> Sexp {
        Sexp::Atom(value.to_string())
    }

    /// A string literal, quoted and escaped.
    pub fn quoted(value: &str) -> Sexp {
        Sexp::Atom(format!("{:?}", value))
    }

    /// Appends to a list. Atoms are turned into a list first.
    pub fn push(&mut self, element: impl Into<Sexp>) {
        match self {
            Sexp::List(elements) => elements.push(element.into()),
            Sexp::Atom(_) => {
                let atom = std::mem::replace(self, Sexp::List(Vec::new()));
                *self = Sexp::List(vec![atom, element.into()]);
            }
        }
    }

    /// Prints the tree, breaking lists that don't fit into `width` columns one element per line.
    pub fn pretty_print(&self, width: usize) -> String {
        let mut result = String::new();
        self.write_pretty(&mut result, 0, width);
        result
    }

    fn write_pretty(&self, result: &mut String, indent: usize, width: usize) {
        let flat = self.to_string();
        match self {
            Sexp::List(elements) if elements.len() > 1 && indent + flat.len() > width => {
                result.push('(');
                elements[0].write_pretty(result, indent + 1, width);
                for element in &elements[1..] {
                    result.push('\n');
                    result.extend(std::iter::repeat(' ').take(indent + 1));
                    element.write_pretty(result, indent + 1, width);
                }
                result.push(')');
            }
            _ => result.push_str(&flat),
        }
    }
}

impl Display for Sexp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Atom(value) => write!(f, "{}", value),
            Sexp::List(elements) => {
                write!(f, "(")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<&str> for Sexp {
    fn from(value: &str) -> Sexp {
        Sexp::Atom(value.to_string())
    }
}

impl From<String> for Sexp {
    fn from(value: String) -> Sexp {
        Sexp::Atom(value)
    }
}

impl From<i64> for Sexp {
    fn from(value: i64) -> Sexp {
        Sexp::atom(value)
    }
}

impl From<Vec<Sexp>> for Sexp {
    fn from(elements: Vec<Sexp>) -> Sexp {
        Sexp::List(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lists_stay_on_one_line() {
        let tree = sexp!("hello", sexp!("world"));
        assert_eq!(tree.pretty_print(80), "(hello (world))");
        assert_eq!(tree.to_string(), "(hello (world))");
    }

    #[test]
    fn long_lists_wrap_and_indent() {
        let tree = sexp!("hello", sexp!("world"));
        assert_eq!(tree.pretty_print(8), "(hello\n (world))");

        let tree = sexp!("let", sexp!("a", "int", 1i64), sexp!("b", "float"));
        assert_eq!(tree.pretty_print(12), "(let\n (a int 1)\n (b float))");
    }

    #[test]
    fn push_and_quote() {
        let mut tree = Sexp::atom("call");
        tree.push(Sexp::quoted("a \"b\""));
        assert_eq!(tree.to_string(), r#"(call "a \"b\"")"#);
    }
}
