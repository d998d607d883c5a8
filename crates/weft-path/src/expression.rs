//! A full property-path expression and its step iterator.

use crate::step::{NESTED_SEPARATOR, leading_step_end};
use crate::{PathError, PathStep};

/// An immutable property-path expression, e.g. `customer.addresses[0].city`.
///
/// The expression owns the raw path text; steps are parsed lazily during
/// iteration. Obtain a fresh iterator per traversal with [`steps`].
///
/// [`steps`]: PathExpression::steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    raw: String,
}

impl PathExpression {
    /// Wrap a raw path string. An empty string is the synthetic empty path
    /// (zero steps); no validation happens until the steps are iterated.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw path text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// A fresh, lazy iterator over the steps of this path.
    #[must_use]
    pub fn steps(&self) -> Steps<'_> {
        Steps {
            remaining: &self.raw,
        }
    }

    /// Eagerly parse every step, surfacing the first parse error.
    pub fn parse_steps(&self) -> Result<Vec<PathStep>, PathError> {
        self.steps().collect()
    }
}

impl From<&str> for PathExpression {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for PathExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Lazy iterator over the single steps of a path expression.
///
/// Each call to `next()` peels the leading step off the remaining text.
/// Malformed steps are yielded as `Err` and end the iteration.
pub struct Steps<'a> {
    remaining: &'a str,
}

impl Steps<'_> {
    /// Whether further steps remain.
    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.remaining.is_empty()
    }
}

impl Iterator for Steps<'_> {
    type Item = Result<PathStep, PathError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let end = leading_step_end(self.remaining);
        let raw_step = &self.remaining[..end];
        let mut rest = &self.remaining[end..];
        if let Some(stripped) = rest.strip_prefix(NESTED_SEPARATOR) {
            rest = stripped;
        }
        match PathStep::parse(raw_step) {
            Ok(step) => {
                self.remaining = rest;
                Some(Ok(step))
            }
            Err(err) => {
                // Stop after a malformed step; the rest is unreachable anyway.
                self.remaining = "";
                Some(Err(err))
            }
        }
    }
}
