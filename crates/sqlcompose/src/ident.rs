//! Schema, table and column names.
//!
//! An [`Ident`] is a dotted path of parts. Bare parts must look like
//! `[A-Za-z_][A-Za-z0-9_$]*` and are written verbatim. Quoted parts may hold
//! anything except NUL and are re-quoted for the target dialect on output.
//!
//! Input may use any of the usual quoting styles: `"name"`, `` `name` `` or
//! `[name]`, each escaping its closing character by doubling it. A name
//! quoted for one engine therefore renders correctly for every other:
//!
//! ```ignore
//! use sqlcompose::{Ident, MySql, Postgres};
//!
//! let ident = Ident::parse("dbo.[Order Items]")?;
//! assert_eq!(ident.to_sql(&Postgres), r#"dbo."Order Items""#);
//! assert_eq!(ident.to_sql(&MySql), "dbo.`Order Items`");
//! # Ok::<(), sqlcompose::QbError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::{QbError, QbResult};

/// One dot-separated segment of an [`Ident`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Written as-is.
    Bare(String),
    /// Written between the dialect's quote characters.
    Quoted(String),
}

/// A validated SQL name such as `users`, `public.users` or `t."Full Name"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

fn closing_quote(open: char) -> Option<char> {
    match open {
        '"' => Some('"'),
        '`' => Some('`'),
        '[' => Some(']'),
        _ => None,
    }
}

/// Read a quoted part whose opening character has been consumed.
fn read_quoted(input: &str, close: char) -> QbResult<(IdentPart, &str)> {
    let mut name = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != close {
            name.push(c);
            continue;
        }
        let after = &input[i + c.len_utf8()..];
        if after.starts_with(close) {
            name.push(close);
            chars.next();
            continue;
        }
        if name.is_empty() {
            return Err(QbError::validation("Empty quoted identifier"));
        }
        return Ok((IdentPart::Quoted(name), after));
    }
    Err(QbError::validation("Unclosed quoted identifier"))
}

fn read_bare(input: &str) -> QbResult<(IdentPart, &str)> {
    let end = input.find('.').unwrap_or(input.len());
    let (name, rest) = input.split_at(end);

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(QbError::validation("Empty identifier segment")),
        Some(c) if c != '_' && !c.is_ascii_alphabetic() => {
            return Err(QbError::validation(format!(
                "Invalid identifier start character: '{c}'"
            )));
        }
        Some(_) => {}
    }
    if let Some(c) = chars.find(|&c| c != '_' && c != '$' && !c.is_ascii_alphanumeric()) {
        return Err(QbError::validation(format!(
            "Invalid character in identifier: '{c}'"
        )));
    }
    Ok((IdentPart::Bare(name.to_string()), rest))
}

impl Ident {
    /// A single quoted part holding `name` verbatim.
    pub fn quoted(name: &str) -> QbResult<Self> {
        if name.is_empty() || name.contains('\0') {
            return Err(QbError::validation(format!(
                "Invalid quoted identifier: {name:?}"
            )));
        }
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// Parse a dotted path such as `public."UserTable".id`.
    pub fn parse(s: &str) -> QbResult<Self> {
        if s.is_empty() {
            return Err(QbError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(QbError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut rest = s;
        loop {
            let (part, tail) = match rest.chars().next() {
                Some(open) => match closing_quote(open) {
                    Some(close) => read_quoted(&rest[open.len_utf8()..], close)?,
                    None => read_bare(rest)?,
                },
                None => return Err(QbError::validation("Trailing '.' in identifier")),
            };
            parts.push(part);

            match tail.chars().next() {
                None => break,
                Some('.') => rest = &tail[1..],
                Some(c) => {
                    return Err(QbError::validation(format!(
                        "Expected '.' between identifier parts, got '{c}'"
                    )));
                }
            }
        }

        Ok(Self { parts })
    }

    /// Render the identifier for the given dialect.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        let mut out = String::new();
        self.write_sql(dialect, &mut out);
        out
    }

    /// The last part (the column or table name itself).
    pub fn name(&self) -> &str {
        match self.parts.last() {
            Some(IdentPart::Bare(s)) | Some(IdentPart::Quoted(s)) => s,
            None => "",
        }
    }

    pub(crate) fn write_sql(&self, dialect: &dyn Dialect, out: &mut String) {
        let (open, close) = dialect.identifier_quote();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Bare(s) => out.push_str(s),
                IdentPart::Quoted(s) => {
                    out.push(open);
                    for ch in s.chars() {
                        if ch == close {
                            out.push(close);
                        }
                        out.push(ch);
                    }
                    out.push(close);
                }
            }
        }
    }
}

/// Anything a builder accepts where a table name is expected.
pub trait IntoIdent {
    fn into_ident(self) -> QbResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> QbResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> QbResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> QbResult<Ident> {
        Ident::parse(&self)
    }
}
