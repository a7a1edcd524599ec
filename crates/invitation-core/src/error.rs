use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::field::{field_list, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    RecordsFailed = 1,
    InvalidInput = 2,
    Io = 3,
    Config = 4,
}

/// Why a template was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateProblem {
    #[error("template must be a string")]
    NotText,

    #[error("template is empty")]
    Empty,

    #[error("template is missing placeholders for {}", field_list(.missing))]
    MissingPlaceholders { missing: Vec<Field> },
}

/// Why an attendee record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendeeProblem {
    #[error("record must be a mapping")]
    NotAMapping,

    #[error("record is missing fields {}", field_list(.missing))]
    MissingFields { missing: Vec<Field> },
}

/// Gate failures. Any of these aborts the batch before output is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid template: {0}")]
    Template(#[from] TemplateProblem),

    #[error("attendees must be a list")]
    AttendeesNotSequence,

    #[error("attendee list is empty")]
    AttendeesEmpty,

    #[error("attendee {index} is invalid: {problem}")]
    Attendee {
        index: usize,
        problem: AttendeeProblem,
    },
}

/// Failure confined to a single record; the rest of the batch still runs.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDirectory { path: PathBuf, source: io::Error },
}

impl GenerateError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Input(_) => ExitCode::InvalidInput,
            Self::OutputDirectory { .. } => ExitCode::Io,
        }
    }
}

pub type GenerateResult<T> = Result<T, GenerateError>;
