//! Built-in function table: tags, signatures and static-argument positions.

use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::error::BuildError;

/// Function tag of a call node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    And,
    Or,
    AndSc,
    OrSc,
    Not,
    If,
    True,
    False,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Named,
    NamedI,
    NamedRx,
    Cat,
    First,
    Rest,
    Nth,
    SetName,
    Scatter,
    Gather,
    IsLonger,
    Operator,
    Transformation,
}

/// Coarse family of a function, mirroring how the catalogue is documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionGroup {
    Boolean,
    Filter,
    ValueList,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    pub fn minimum(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::AtLeast(n) => n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, ">= {n}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub function: Function,
    pub tag: &'static str,
    pub group: FunctionGroup,
    pub arity: Arity,
    /// Argument positions that must be literal once folding is done.
    pub static_args: &'static [usize],
    /// Child order is irrelevant; children are sorted canonically.
    pub commutative: bool,
}

static SIGNATURES: Lazy<IndexMap<&'static str, Signature>> = Lazy::new(|| {
    use Arity::*;
    use FunctionGroup::*;
    let entries = [
        (Function::And, "and", Boolean, AtLeast(1), &[][..], true),
        (Function::Or, "or", Boolean, AtLeast(1), &[][..], true),
        (Function::AndSc, "and_sc", Boolean, AtLeast(1), &[][..], false),
        (Function::OrSc, "or_sc", Boolean, AtLeast(1), &[][..], false),
        (Function::Not, "not", Boolean, Exact(1), &[][..], false),
        (Function::If, "if", Boolean, Exact(3), &[][..], false),
        (Function::True, "true", Boolean, Exact(0), &[][..], false),
        (Function::False, "false", Boolean, Exact(0), &[][..], false),
        (Function::Eq, "eq", Filter, Exact(2), &[0][..], false),
        (Function::Ne, "ne", Filter, Exact(2), &[0][..], false),
        (Function::Lt, "lt", Filter, Exact(2), &[0][..], false),
        (Function::Le, "le", Filter, Exact(2), &[0][..], false),
        (Function::Gt, "gt", Filter, Exact(2), &[0][..], false),
        (Function::Ge, "ge", Filter, Exact(2), &[0][..], false),
        (Function::Named, "named", Filter, Exact(2), &[0][..], false),
        (Function::NamedI, "named_i", Filter, Exact(2), &[0][..], false),
        (Function::NamedRx, "named_rx", Filter, Exact(2), &[0][..], false),
        (Function::Cat, "cat", ValueList, AtLeast(0), &[][..], false),
        (Function::First, "first", ValueList, Exact(1), &[][..], false),
        (Function::Rest, "rest", ValueList, Exact(1), &[][..], false),
        (Function::Nth, "nth", ValueList, Exact(2), &[0][..], false),
        (Function::SetName, "set_name", ValueList, Exact(2), &[0][..], false),
        (Function::Scatter, "scatter", ValueList, Exact(1), &[][..], false),
        (Function::Gather, "gather", ValueList, Exact(1), &[][..], false),
        (Function::IsLonger, "is_longer", ValueList, Exact(2), &[0][..], false),
        (Function::Operator, "operator", External, Exact(3), &[0, 1][..], false),
        (Function::Transformation, "transformation", External, Exact(2), &[0][..], false),
    ];
    entries
        .into_iter()
        .map(|(function, tag, group, arity, static_args, commutative)| {
            (
                tag,
                Signature {
                    function,
                    tag,
                    group,
                    arity,
                    static_args,
                    commutative,
                },
            )
        })
        .collect()
});

impl Function {
    pub fn from_tag(tag: &str) -> Option<Function> {
        SIGNATURES.get(tag).map(|sig| sig.function)
    }

    pub fn signature(self) -> &'static Signature {
        SIGNATURES
            .values()
            .find(|sig| sig.function == self)
            .unwrap_or_else(|| panic!("function {self:?} missing from signature table"))
    }

    pub fn tag(self) -> &'static str {
        self.signature().tag
    }

    pub fn group(self) -> FunctionGroup {
        self.signature().group
    }

    pub fn is_commutative(self) -> bool {
        self.signature().commutative
    }

    pub fn is_static_arg(self, index: usize) -> bool {
        self.signature().static_args.contains(&index)
    }

    pub fn check_arity(self, count: usize) -> Result<(), BuildError> {
        let arity = self.signature().arity;
        if arity.accepts(count) {
            Ok(())
        } else {
            Err(BuildError::Arity {
                function: self.tag().to_string(),
                expected: arity.to_string(),
                actual: count,
            })
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// All built-in tags in table order.
pub fn builtin_tags() -> impl Iterator<Item = &'static str> {
    SIGNATURES.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_function_round_trips_through_its_tag() {
        for tag in builtin_tags() {
            let function = Function::from_tag(tag).unwrap();
            assert_eq!(function.tag(), tag);
        }
        assert_eq!(Function::from_tag("nope"), None);
    }

    #[test]
    fn only_unordered_boolean_ops_are_commutative() {
        assert!(Function::And.is_commutative());
        assert!(Function::Or.is_commutative());
        assert!(!Function::AndSc.is_commutative());
        assert!(!Function::OrSc.is_commutative());
        assert!(!Function::Cat.is_commutative());
    }

    #[test]
    fn arity_errors_name_the_function() {
        let err = Function::Not.check_arity(2).unwrap_err();
        assert_eq!(
            err,
            BuildError::Arity {
                function: "not".into(),
                expected: "1".into(),
                actual: 2,
            }
        );
        assert!(Function::And.check_arity(5).is_ok());
        assert!(Function::And.check_arity(0).is_err());
        assert!(Function::Cat.check_arity(0).is_ok());
    }

    #[test]
    fn static_positions() {
        assert!(Function::Gt.is_static_arg(0));
        assert!(!Function::Gt.is_static_arg(1));
        assert!(Function::Operator.is_static_arg(1));
        assert_eq!(Function::Transformation.group(), FunctionGroup::External);
    }
}
