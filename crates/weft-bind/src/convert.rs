//! Value conversion between control and model representations.

use weft_bean::Value;

use crate::BindError;

/// The scalar shapes the conversion service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Int,
    Float,
    Bool,
}

impl ValueKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Str => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
        }
    }

    /// The kind of a scalar value, when it has one.
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Str(_) => Some(ValueKind::Str),
            Value::Int(_) => Some(ValueKind::Int),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Bool(_) => Some(ValueKind::Bool),
            _ => None,
        }
    }
}

/// Converts scalar values using canonical decimal text.
///
/// `Null` passes through every conversion unchanged. Conversions the table
/// below does not cover fail with [`BindError::Inconvertible`]; nothing is
/// coerced silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionService;

impl ConversionService {
    pub fn convert(&self, value: &Value, to: ValueKind) -> Result<Value, BindError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if ValueKind::of(value) == Some(to) {
            return Ok(value.clone());
        }
        let inconvertible = || BindError::Inconvertible {
            value: format!("{value:?}"),
            to: to.name(),
        };
        match (value, to) {
            (Value::Int(i), ValueKind::Str) => Ok(Value::Str(i.to_string())),
            (Value::Float(x), ValueKind::Str) => Ok(Value::Str(x.to_string())),
            (Value::Bool(b), ValueKind::Str) => Ok(Value::Str(b.to_string())),
            (Value::Int(i), ValueKind::Float) => Ok(Value::Float(*i as f64)),
            (Value::Str(s), ValueKind::Int) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| inconvertible()),
            (Value::Str(s), ValueKind::Float) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| inconvertible()),
            (Value::Str(s), ValueKind::Bool) => match s.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(inconvertible()),
            },
            _ => Err(inconvertible()),
        }
    }

    #[must_use]
    pub fn can_convert(&self, value: &Value, to: ValueKind) -> bool {
        self.convert(value, to).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_and_null_pass_through() {
        let service = ConversionService;
        assert_eq!(
            service.convert(&Value::from(7), ValueKind::Int).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            service.convert(&Value::Null, ValueKind::Int).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn canonical_decimal_round_trips() {
        let service = ConversionService;
        assert_eq!(
            service.convert(&Value::from(42), ValueKind::Str).unwrap(),
            Value::from("42")
        );
        assert_eq!(
            service.convert(&Value::from("42"), ValueKind::Int).unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            service
                .convert(&Value::from("2.5"), ValueKind::Float)
                .unwrap(),
            Value::Float(2.5)
        );
    }

    #[test]
    fn bool_text_is_strict() {
        let service = ConversionService;
        assert_eq!(
            service
                .convert(&Value::from("true"), ValueKind::Bool)
                .unwrap(),
            Value::Bool(true)
        );
        assert!(service.convert(&Value::from("yes"), ValueKind::Bool).is_err());
    }

    #[test]
    fn unknown_conversions_are_refused() {
        let service = ConversionService;
        assert!(matches!(
            service.convert(&Value::from("abc"), ValueKind::Int),
            Err(BindError::Inconvertible { .. })
        ));
        assert!(service
            .convert(&Value::list(vec![]), ValueKind::Str)
            .is_err());
    }
}
