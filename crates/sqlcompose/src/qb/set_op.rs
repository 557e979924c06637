//! Set-operation markers (UNION / INTERSECT / EXCEPT with DISTINCT / ALL).
//!
//! A [`SetOp`] is tree metadata attached to each appended branch of a
//! [`Union`](crate::qb::Union); it is never rendered on its own.

use std::fmt;

/// Set-operation keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

impl SetOpKind {
    /// Standard SQL keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            SetOpKind::Union => "UNION",
            SetOpKind::Intersect => "INTERSECT",
            SetOpKind::Except => "EXCEPT",
        }
    }
}

/// Duplicate handling for a set operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SetQuantifier {
    #[default]
    Distinct,
    All,
}

/// A combinator joining a branch to everything before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetOp {
    pub kind: SetOpKind,
    pub quantifier: SetQuantifier,
}

impl SetOp {
    pub const fn new(kind: SetOpKind, quantifier: SetQuantifier) -> Self {
        Self { kind, quantifier }
    }

    pub const fn union() -> Self {
        Self::new(SetOpKind::Union, SetQuantifier::Distinct)
    }

    pub const fn union_all() -> Self {
        Self::new(SetOpKind::Union, SetQuantifier::All)
    }

    pub const fn intersect() -> Self {
        Self::new(SetOpKind::Intersect, SetQuantifier::Distinct)
    }

    pub const fn intersect_all() -> Self {
        Self::new(SetOpKind::Intersect, SetQuantifier::All)
    }

    pub const fn except() -> Self {
        Self::new(SetOpKind::Except, SetQuantifier::Distinct)
    }

    pub const fn except_all() -> Self {
        Self::new(SetOpKind::Except, SetQuantifier::All)
    }

    pub fn is_all(self) -> bool {
        self.quantifier == SetQuantifier::All
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.keyword())?;
        if self.is_all() {
            f.write_str(" ALL")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_standard_spelling() {
        assert_eq!(SetOp::union().to_string(), "UNION");
        assert_eq!(SetOp::intersect_all().to_string(), "INTERSECT ALL");
        assert_eq!(SetOp::except_all().to_string(), "EXCEPT ALL");
    }

    #[test]
    fn default_quantifier_is_distinct() {
        assert_eq!(SetQuantifier::default(), SetQuantifier::Distinct);
        assert!(!SetOp::except().is_all());
    }
}
