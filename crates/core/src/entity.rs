//! Entity trait: identity, persisted fields and the generic update path.

use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::validator::{FieldValidator, FieldViolation};

/// Raw field data as received from forms, imports or stored documents.
pub type FieldMap = Map<String, Value>;

/// Result of a generic field update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Fields that were validated and assigned, in declaration order.
    pub assigned: Vec<String>,
    /// Fields skipped because they failed validation (non-atomic updates only).
    pub rejected: Vec<FieldViolation>,
}

impl UpdateOutcome {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// A persisted domain object with identity and validated fields.
///
/// Implementors declare which fields they accept and the rules each one must
/// pass; [`Entity::apply_fields`] does the rest.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Name of the document collection this entity is stored in.
    const COLLECTION: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Fields accepted by [`Entity::apply_fields`]. Anything else is ignored.
    fn fields() -> &'static [&'static str];

    /// Declarative validation table.
    fn field_validators() -> &'static [(&'static str, &'static [FieldValidator])];

    /// Assign an already validated value.
    fn assign_field(&mut self, field: &str, value: &Value);

    /// Run the validator table for one field. Stops at the first failed rule.
    fn validate_field(field: &str, value: &Value) -> Result<(), FieldViolation> {
        for (name, rules) in Self::field_validators() {
            if *name == field {
                for rule in rules.iter() {
                    rule.check(field, value)?;
                }
            }
        }
        Ok(())
    }

    /// Validate every known field present in `data`.
    fn validate(data: &FieldMap) -> Vec<FieldViolation> {
        Self::fields()
            .iter()
            .filter_map(|field| data.get(*field).map(|value| (*field, value)))
            .filter_map(|(field, value)| Self::validate_field(field, value).err())
            .collect()
    }

    /// Fail if a field guarded by `NonEmpty` is absent from `data`.
    ///
    /// Used on creation, where every required field has to be supplied.
    fn require_fields(data: &FieldMap) -> DomainResult<()> {
        let missing: Vec<FieldViolation> = Self::field_validators()
            .iter()
            .filter(|(name, rules)| {
                rules.contains(&FieldValidator::NonEmpty) && !data.contains_key(*name)
            })
            .map(|(name, _)| FieldViolation {
                field: name.to_string(),
                rule: FieldValidator::NonEmpty,
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::from_violations(&missing))
        }
    }

    /// Validate and assign the known fields in `data`.
    ///
    /// With `atomic` set, a single invalid field fails the whole update and
    /// nothing is assigned. Otherwise valid fields are assigned and the invalid
    /// ones are reported in the outcome.
    fn apply_fields(&mut self, data: &FieldMap, atomic: bool) -> DomainResult<UpdateOutcome> {
        let mut outcome = UpdateOutcome::default();
        let mut accepted = Vec::new();

        for field in Self::fields() {
            let Some(value) = data.get(*field) else {
                continue;
            };
            match Self::validate_field(field, value) {
                Ok(()) => accepted.push((*field, value)),
                Err(violation) => outcome.rejected.push(violation),
            }
        }

        if atomic && !outcome.rejected.is_empty() {
            return Err(DomainError::from_violations(&outcome.rejected));
        }

        for violation in &outcome.rejected {
            tracing::warn!(
                collection = Self::COLLECTION,
                field = %violation.field,
                rule = violation.rule.name(),
                "skipping invalid field"
            );
        }

        for (field, value) in accepted {
            self.assign_field(field, value);
            outcome.assigned.push(field.to_string());
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Note {
        id: String,
        title: String,
        pinned: bool,
    }

    impl Entity for Note {
        type Id = String;
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> &Self::Id {
            &self.id
        }

        fn fields() -> &'static [&'static str] {
            &["id", "title", "pinned"]
        }

        fn field_validators() -> &'static [(&'static str, &'static [FieldValidator])] {
            &[
                ("id", &[FieldValidator::NonEmpty]),
                ("title", &[FieldValidator::NonEmpty]),
                ("pinned", &[FieldValidator::Boolean]),
            ]
        }

        fn assign_field(&mut self, field: &str, value: &Value) {
            match field {
                "id" => self.id = value.as_str().unwrap_or_default().to_string(),
                "title" => self.title = value.as_str().unwrap_or_default().to_string(),
                "pinned" => self.pinned = value.as_bool().unwrap_or_default(),
                _ => {}
            }
        }
    }

    fn map(value: Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn atomic_update_assigns_nothing_on_failure() {
        let mut note = Note {
            title: "before".into(),
            ..Default::default()
        };

        let err = note
            .apply_fields(&map(json!({ "title": "after", "pinned": "yes", "id": "" })), true)
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(note.title, "before");
        assert!(note.id.is_empty());
    }

    #[test]
    fn non_atomic_update_skips_invalid_fields() {
        let mut note = Note::default();

        let outcome = note
            .apply_fields(&map(json!({ "title": "kept", "id": "  " })), false)
            .unwrap();

        assert_eq!(note.title, "kept");
        assert_eq!(outcome.assigned, vec!["title".to_string()]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].field, "id");
        assert!(!outcome.is_complete());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut note = Note::default();
        let outcome = note
            .apply_fields(&map(json!({ "colour": "red", "pinned": true })), true)
            .unwrap();

        assert!(note.pinned);
        assert_eq!(outcome.assigned, vec!["pinned".to_string()]);
        assert!(Note::validate(&map(json!({ "colour": "" }))).is_empty());
    }

    #[test]
    fn require_fields_lists_missing_non_empty_fields() {
        let err = Note::require_fields(&map(json!({ "title": "only title" }))).unwrap_err();
        assert_eq!(err, DomainError::validation("id cannot be empty"));
        assert!(Note::require_fields(&map(json!({ "id": "n-1", "title": "t" }))).is_ok());
    }
}
