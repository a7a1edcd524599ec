use std::fmt;

use serde_json::{Number, Value};

/// Attendee fields recognised by the generator, in substitution order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum Field {
    Name,
    EventTitle,
    EventDate,
    EventLocation,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Name,
        Field::EventTitle,
        Field::EventDate,
        Field::EventLocation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::EventTitle => "event_title",
            Field::EventDate => "event_date",
            Field::EventLocation => "event_location",
        }
    }

    /// Template token marking this field, e.g. `{event_date}`.
    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Name => "{name}",
            Field::EventTitle => "{event_title}",
            Field::EventDate => "{event_date}",
            Field::EventLocation => "{event_location}",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Field {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Field::Name),
            "event_title" => Ok(Field::EventTitle),
            "event_date" => Ok(Field::EventDate),
            "event_location" => Ok(Field::EventLocation),
            _ => Err(()),
        }
    }
}

/// Comma-separated field names, used in diagnostics.
pub(crate) fn field_list(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Non-null value stored against a record key.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Number),
    Bool(bool),
    /// Arrays and objects, rendered as compact JSON.
    Structured(Value),
}

impl FieldValue {
    /// Converts a JSON value; `null` maps to `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(FieldValue::Text(text.clone())),
            Value::Number(number) => Some(FieldValue::Number(number.clone())),
            Value::Bool(flag) => Some(FieldValue::Bool(*flag)),
            other => Some(FieldValue::Structured(other.clone())),
        }
    }

    /// Text substituted for the placeholder. Booleans read `True`/`False`.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Bool(true) => "True".to_owned(),
            FieldValue::Bool(false) => "False".to_owned(),
            FieldValue::Structured(value) => value.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}
