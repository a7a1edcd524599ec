pub mod attendee;
pub mod error;
pub mod field;
pub mod fs;
pub mod generator;
pub mod log;
pub mod template;

pub use attendee::{validate_attendee, validate_attendee_value, AttendeeRecord};
pub use error::{
    AttendeeProblem, ExitCode, GenerateError, GenerateResult, InputError, RecordError,
    TemplateProblem,
};
pub use field::{Field, FieldValue};
pub use fs::{FsSink, OutputSink};
pub use generator::{
    check_inputs, check_inputs_json, generate_invitations, BatchReport, GenerateOptions,
    Generator, RecordOutcome, RecordStatus,
};
pub use invitation_config::{Config, OutputSettings};
pub use log::{EventLog, LogEntry, RecordingLog, Severity, TracingLog};
pub use template::{missing_placeholders, render_invitation, validate_template};
