#![forbid(unsafe_code)]

//! Property-path expressions for addressing nested, indexed, and keyed
//! properties of arbitrary object graphs.
//!
//! A path expression is a string like `customer.addresses[0].city` or
//! `settings(ui.theme).name`, addressing a property reachable from some root
//! object. This crate only parses the expression language; resolving a path
//! against an object is the job of `weft-bean`.
//!
//! # Syntax
//!
//! ```text
//! path        := step ('.' step)*
//! step        := identifier (indexSuffix | keySuffix)?
//! indexSuffix := '[' digits ']'
//! keySuffix   := '(' text-without-')' ')'
//! ```
//!
//! No other delimiters are recognized. The key suffix is taken literally:
//! `field(map.key)` has the single key `map.key`, not a nested path.
//!
//! # Invariants
//!
//! 1. Iteration over steps is lazy and restartable; a fresh iterator can be
//!    obtained per traversal via [`PathExpression::steps`].
//! 2. An empty path yields zero steps.
//! 3. An indexed step always carries a parseable non-negative integer; a
//!    malformed index surfaces as [`PathError`], never a silent default.
//! 4. A keyed step's key is the literal substring between its delimiters and
//!    is empty only when written empty (`field()`).
//!
//! # Failure Modes
//!
//! - `field[` / `field(` without a closing delimiter: [`PathError::MissingEndDelimiter`].
//! - `field[]`: [`PathError::EmptyIndex`].
//! - `field[abc]`: [`PathError::InvalidIndex`].

pub mod expression;
pub mod step;

pub use expression::{PathExpression, Steps};
pub use step::{PathStep, StepKind};

use thiserror::Error;

/// Errors raised while parsing a property-path expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// An index or key suffix was opened but never closed.
    #[error("missing end delimiter in expression '{expression}'")]
    MissingEndDelimiter { expression: String },

    /// An indexed step with no index value, e.g. `field[]`.
    #[error("no index value in expression '{expression}'")]
    EmptyIndex { expression: String },

    /// An indexed step whose index is not a non-negative integer.
    #[error("invalid index value '{value}' in expression '{expression}'")]
    InvalidIndex { expression: String, value: String },
}
