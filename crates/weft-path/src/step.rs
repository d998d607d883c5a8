//! A single step of a property path.

use crate::PathError;

const EXPR_NESTED: char = '.';
const EXPR_INDEXED_START: char = '[';
const EXPR_INDEXED_END: char = ']';
const EXPR_MAPPED_START: char = '(';
const EXPR_MAPPED_END: char = ')';

/// How a step addresses its property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// A plain property access, e.g. `name`.
    Plain,
    /// A positional access into an ordered sequence, e.g. `items[3]`.
    Indexed(usize),
    /// A string-keyed access into a map, e.g. `settings(ui.theme)`.
    Keyed(String),
}

/// One parsed step of a property path, e.g. `items[3]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    name: String,
    kind: StepKind,
}

impl PathStep {
    /// Parse a single step from its raw text (no `.` separators inside).
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let name_end = raw
            .find([EXPR_INDEXED_START, EXPR_MAPPED_START])
            .unwrap_or(raw.len());
        let name = &raw[..name_end];
        let suffix = &raw[name_end..];

        let kind = if let Some(inner) = suffix.strip_prefix(EXPR_INDEXED_START) {
            let Some(value) = inner.strip_suffix(EXPR_INDEXED_END) else {
                return Err(PathError::MissingEndDelimiter {
                    expression: raw.to_owned(),
                });
            };
            if value.is_empty() {
                return Err(PathError::EmptyIndex {
                    expression: raw.to_owned(),
                });
            }
            let index = value
                .parse::<usize>()
                .map_err(|_| PathError::InvalidIndex {
                    expression: raw.to_owned(),
                    value: value.to_owned(),
                })?;
            StepKind::Indexed(index)
        } else if let Some(inner) = suffix.strip_prefix(EXPR_MAPPED_START) {
            let Some(key) = inner.strip_suffix(EXPR_MAPPED_END) else {
                return Err(PathError::MissingEndDelimiter {
                    expression: raw.to_owned(),
                });
            };
            StepKind::Keyed(key.to_owned())
        } else {
            StepKind::Plain
        };

        Ok(Self {
            name: name.to_owned(),
            kind,
        })
    }

    /// The property name, without any index or key suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    /// The index for an indexed step, `None` otherwise.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self.kind {
            StepKind::Indexed(i) => Some(i),
            _ => None,
        }
    }

    /// The key for a keyed step, `None` otherwise.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Keyed(k) => Some(k),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        matches!(self.kind, StepKind::Indexed(_))
    }

    #[must_use]
    pub fn is_mapped(&self) -> bool {
        matches!(self.kind, StepKind::Keyed(_))
    }
}

/// Find the end (exclusive) of the leading step inside `expression`.
///
/// Scans forward tracking whether the cursor is inside an index or key
/// suffix, so that a `.` inside a key (`field(map.key)`) does not terminate
/// the step. Returns the byte offset where the step's raw text ends.
pub(crate) fn leading_step_end(expression: &str) -> usize {
    let mut indexed = false;
    let mut mapped = false;
    for (pos, c) in expression.char_indices() {
        if indexed {
            if c == EXPR_INDEXED_END {
                return pos + c.len_utf8();
            }
        } else if mapped {
            if c == EXPR_MAPPED_END {
                return pos + c.len_utf8();
            }
        } else {
            match c {
                EXPR_NESTED => return pos,
                EXPR_INDEXED_START => indexed = true,
                EXPR_MAPPED_START => mapped = true,
                _ => {}
            }
        }
    }
    expression.len()
}

pub(crate) const NESTED_SEPARATOR: char = EXPR_NESTED;
