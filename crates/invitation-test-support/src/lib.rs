//! Shared fixtures for invitation crate tests.

use std::path::Path;

use invitation_config::Config;
use serde_json::{json, Value};

pub const SAMPLE_TEMPLATE: &str = "Hello {name},

You are invited to the {event_title} on {event_date} at {event_location}.

We look forward to your presence.

Best regards,
Event Team";

/// Built-in configuration rooted at `dir`, so output lands in `dir/invitations`.
pub fn test_config(dir: &Path) -> Config {
    Config::builtin(dir)
}

/// Three attendees; the last one has a null `event_date`.
pub fn sample_attendees() -> Value {
    json!([
        {
            "name": "Alice",
            "event_title": "Python Conference",
            "event_date": "2023-07-15",
            "event_location": "New York"
        },
        {
            "name": "Bob",
            "event_title": "Data Science Workshop",
            "event_date": "2023-08-20",
            "event_location": "San Francisco"
        },
        {
            "name": "Charlie",
            "event_title": "AI Summit",
            "event_date": null,
            "event_location": "Boston"
        }
    ])
}
