use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::AttendeeProblem;
use crate::field::{Field, FieldValue};

/// One attendee's field mapping.
///
/// A key may be present with a null value; that still satisfies validation,
/// while substitution treats it exactly like an absent key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttendeeRecord {
    fields: BTreeMap<String, Option<FieldValue>>,
}

impl AttendeeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), Some(value.into()));
        self
    }

    pub fn with_null(mut self, key: impl Into<String>) -> Self {
        self.fields.insert(key.into(), None);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<FieldValue>) {
        self.fields.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Value for `field`, with null and absent both yielding `None`.
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(field.as_str()).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a record from a JSON object; any other JSON shape is rejected.
    pub fn from_json(value: &Value) -> Result<Self, AttendeeProblem> {
        let Value::Object(map) = value else {
            return Err(AttendeeProblem::NotAMapping);
        };
        let fields = map
            .iter()
            .map(|(key, value)| (key.clone(), FieldValue::from_json(value)))
            .collect();
        Ok(Self { fields })
    }
}

/// Checks that every required key is present. Values, including nulls, are
/// not inspected.
pub fn validate_attendee(record: &AttendeeRecord) -> Result<(), AttendeeProblem> {
    let missing: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|field| !record.contains_key(field.as_str()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AttendeeProblem::MissingFields { missing })
    }
}

/// Validates an untyped candidate and returns the typed record on success.
pub fn validate_attendee_value(value: &Value) -> Result<AttendeeRecord, AttendeeProblem> {
    let record = AttendeeRecord::from_json(value)?;
    validate_attendee(&record)?;
    Ok(record)
}
