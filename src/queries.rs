//! Minimal GraphQL selection-set builder.
//!
//! The query synthesizer emits selections against these primitives: named
//! fields with literal arguments, inline fragments, and literal values.
//! Rendering via [`std::fmt::Display`] produces compact single-line GraphQL
//! text; the values never touch the store.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Int(i64),
    String(String),
    Enum(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub args: Vec<(String, Value)>,
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Field(Field),
    InlineFragment {
        on: String,
        selections: Vec<Selection>,
    },
}

/// A leaf field with no arguments.
pub fn field<N: Into<String>>(name: N) -> Selection {
    field_with(name, Vec::new(), Vec::new())
}

pub fn field_with<N: Into<String>>(
    name: N,
    args: Vec<(String, Value)>,
    selections: Vec<Selection>,
) -> Selection {
    Selection::Field(Field {
        name: name.into(),
        args,
        selections,
    })
}

pub fn inline_fragment<N: Into<String>>(on: N, selections: Vec<Selection>) -> Selection {
    Selection::InlineFragment {
        on: on.into(),
        selections,
    }
}

/// Renders a selection list as a braced GraphQL selection set.
pub fn selection_set(selections: &[Selection]) -> String {
    SelectionSet(selections).to_string()
}

/// Display adapter for a braced selection set.
pub struct SelectionSet<'a>(pub &'a [Selection]);

impl fmt::Display for SelectionSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_selection_set(f, self.0)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Field(field) => write!(f, "{field}"),
            Selection::InlineFragment { on, selections } => {
                write!(f, "... on {on} ")?;
                write_selection_set(f, selections)
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            for (i, (name, value)) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name}: {value}")?;
            }
            f.write_str(")")?;
        }
        if !self.selections.is_empty() {
            f.write_str(" ")?;
            write_selection_set(f, &self.selections)?;
        }
        Ok(())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(n) => write!(f, "{n}"),
            Value::String(s) => write_escaped(f, s),
            Value::Enum(name) => f.write_str(name),
        }
    }
}

fn write_selection_set<W: fmt::Write>(out: &mut W, selections: &[Selection]) -> fmt::Result {
    out.write_str("{")?;
    for selection in selections {
        write!(out, " {selection}")?;
    }
    out.write_str(" }")
}

fn write_escaped<W: fmt::Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_str("\"")
}
