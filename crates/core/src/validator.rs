//! Declarative field validators.
//!
//! Entities publish a table of `field -> [FieldValidator]`; the generic update
//! path in [`crate::entity::Entity`] runs every rule before assigning anything.

use serde_json::Value;

/// A single validation rule applied to a raw field value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldValidator {
    /// Rejects null, blank strings and empty arrays/objects.
    NonEmpty,
    /// Accepts JSON numbers and strings that parse as a finite number.
    Number,
    /// Numeric value must be `>= 0`. Non-numeric values are left to `Number`.
    NonNegative,
    /// JSON boolean.
    Boolean,
    /// List (array, or object keyed by anything) of records that each carry a
    /// non-empty `id`. Null is left to `NonEmpty`.
    Records,
}

impl FieldValidator {
    pub fn name(self) -> &'static str {
        match self {
            FieldValidator::NonEmpty => "non_empty",
            FieldValidator::Number => "number",
            FieldValidator::NonNegative => "non_negative",
            FieldValidator::Boolean => "boolean",
            FieldValidator::Records => "records",
        }
    }

    /// Check `value` for `field`, returning the violation if the rule fails.
    pub fn check(self, field: &str, value: &Value) -> Result<(), FieldViolation> {
        let ok = match self {
            FieldValidator::NonEmpty => !is_empty(value),
            FieldValidator::Number => as_number(value).is_some(),
            FieldValidator::NonNegative => as_number(value).is_none_or(|n| n >= 0.0),
            FieldValidator::Boolean => value.is_boolean(),
            FieldValidator::Records => {
                value.is_null()
                    || records(value).is_some_and(|items| items.iter().all(|r| record_id(r).is_some()))
            }
        };

        if ok {
            Ok(())
        } else {
            Err(FieldViolation {
                field: field.to_string(),
                rule: self,
            })
        }
    }
}

/// A failed validation rule for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub rule: FieldValidator,
}

impl core::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.rule {
            FieldValidator::NonEmpty => write!(f, "{} cannot be empty", self.field),
            FieldValidator::Number => write!(f, "{} must be a number", self.field),
            FieldValidator::NonNegative => write!(f, "{} cannot be negative", self.field),
            FieldValidator::Boolean => write!(f, "{} must be true or false", self.field),
            FieldValidator::Records => {
                write!(f, "{} must be a list of records with an id", self.field)
            }
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Interpret a raw field value as a finite number.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Items of a record list, or `None` if `value` is not a list.
pub fn records(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(items) => Some(items.values().collect()),
        _ => None,
    }
}

/// The non-empty `id` of a record, if it has one. Numeric ids are stringified.
pub fn record_id(record: &Value) -> Option<String> {
    let id = match record.get("id")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}
