use crate::attendee::AttendeeRecord;
use crate::error::TemplateProblem;
use crate::field::{Field, FieldValue};

/// Placeholders the template never mentions, in field order.
pub fn missing_placeholders(template: &str) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|field| !template.contains(field.placeholder()))
        .collect()
}

/// A template is usable when it has visible content and mentions every field.
pub fn validate_template(template: &str) -> Result<(), TemplateProblem> {
    if template.trim().is_empty() {
        return Err(TemplateProblem::Empty);
    }

    let missing = missing_placeholders(template);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TemplateProblem::MissingPlaceholders { missing })
    }
}

/// Substitutes every placeholder occurrence, one field at a time in field
/// order. Null or absent values become `missing_value`.
pub fn render_invitation(template: &str, record: &AttendeeRecord, missing_value: &str) -> String {
    let mut invitation = template.to_owned();
    for field in Field::ALL {
        let value = record
            .get(field)
            .map_or_else(|| missing_value.to_owned(), FieldValue::as_text);
        invitation = invitation.replace(field.placeholder(), &value);
    }
    invitation
}
