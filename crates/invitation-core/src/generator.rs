use std::path::{Path, PathBuf};

use invitation_config::{Config, OutputSettings};
use serde_json::Value;

use crate::attendee::{validate_attendee, validate_attendee_value, AttendeeRecord};
use crate::error::{
    ExitCode, GenerateError, GenerateResult, InputError, RecordError, TemplateProblem,
};
use crate::fs::{FsSink, OutputSink};
use crate::log::EventLog;
use crate::template::{render_invitation, validate_template};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output: OutputSettings,
    pub missing_value: String,
}

impl GenerateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output: config.output.clone(),
            missing_value: config.render.missing_value.clone(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.directory = dir.into();
        self
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug)]
pub enum RecordStatus {
    Written,
    Failed(RecordError),
}

#[derive(Debug)]
pub struct RecordOutcome {
    /// 1-based position in the batch.
    pub index: usize,
    pub path: PathBuf,
    pub status: RecordStatus,
}

impl RecordOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, RecordStatus::Written)
    }

    pub fn error(&self) -> Option<&RecordError> {
        match &self.status {
            RecordStatus::Written => None,
            RecordStatus::Failed(err) => Some(err),
        }
    }
}

/// Per-record results of one generation run, in batch order.
#[derive(Debug)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub records: Vec<RecordOutcome>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn written(&self) -> usize {
        self.records.iter().filter(|record| record.is_written()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.written()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.records.iter().filter(|record| !record.is_written())
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.failed() == 0 {
            ExitCode::Success
        } else {
            ExitCode::RecordsFailed
        }
    }
}

/// Runs the template and batch gates on typed input.
pub fn check_inputs(template: &str, attendees: &[AttendeeRecord]) -> Result<(), InputError> {
    validate_template(template)?;
    if attendees.is_empty() {
        return Err(InputError::AttendeesEmpty);
    }
    for (offset, record) in attendees.iter().enumerate() {
        validate_attendee(record).map_err(|problem| InputError::Attendee {
            index: offset + 1,
            problem,
        })?;
    }
    Ok(())
}

/// Runs every gate on untyped JSON input, in gate order, and returns the
/// typed template and records on success.
pub fn check_inputs_json<'t>(
    template: &'t Value,
    attendees: &Value,
) -> Result<(&'t str, Vec<AttendeeRecord>), InputError> {
    let template = template.as_str().ok_or(TemplateProblem::NotText)?;
    validate_template(template)?;

    let entries = attendees
        .as_array()
        .ok_or(InputError::AttendeesNotSequence)?;
    if entries.is_empty() {
        return Err(InputError::AttendeesEmpty);
    }

    let records = entries
        .iter()
        .enumerate()
        .map(|(offset, entry)| {
            validate_attendee_value(entry).map_err(|problem| InputError::Attendee {
                index: offset + 1,
                problem,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((template, records))
}

/// Validates a template and an attendee batch, then writes one invitation per
/// attendee.
pub struct Generator<'a> {
    options: GenerateOptions,
    log: &'a dyn EventLog,
    sink: &'a dyn OutputSink,
}

impl<'a> Generator<'a> {
    pub fn new(options: GenerateOptions, log: &'a dyn EventLog) -> Self {
        Self {
            options,
            log,
            sink: &FsSink,
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn OutputSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn generate(
        &self,
        template: &str,
        attendees: &[AttendeeRecord],
    ) -> GenerateResult<BatchReport> {
        if let Err(err) = check_inputs(template, attendees) {
            return Err(self.reject(err));
        }
        self.emit(template, attendees)
    }

    pub fn generate_json(
        &self,
        template: &Value,
        attendees: &Value,
    ) -> GenerateResult<BatchReport> {
        match check_inputs_json(template, attendees) {
            Ok((template, records)) => self.emit(template, &records),
            Err(err) => Err(self.reject(err)),
        }
    }

    fn reject(&self, err: InputError) -> GenerateError {
        self.log.error(&format!("{err}; no invitations generated"));
        GenerateError::Input(err)
    }

    fn emit(&self, template: &str, attendees: &[AttendeeRecord]) -> GenerateResult<BatchReport> {
        let output_dir = self.options.output.directory.clone();
        if let Err(source) = self.sink.ensure_dir(&output_dir) {
            let err = GenerateError::OutputDirectory {
                path: output_dir,
                source,
            };
            self.log.error(&err.to_string());
            return Err(err);
        }

        let mut records = Vec::with_capacity(attendees.len());
        for (offset, attendee) in attendees.iter().enumerate() {
            let index = offset + 1;
            let path = self.options.output.path_for(index);
            let status = match self.write_record(template, attendee, &path) {
                Ok(()) => {
                    self.log
                        .info(&format!("generated invitation file {}", path.display()));
                    RecordStatus::Written
                }
                Err(err) => {
                    self.log.error(&format!("invitation {index} skipped: {err}"));
                    RecordStatus::Failed(err)
                }
            };
            records.push(RecordOutcome {
                index,
                path,
                status,
            });
        }

        let report = BatchReport {
            output_dir,
            records,
        };
        self.log.info(&format!(
            "generated {} of {} invitations in {}",
            report.written(),
            report.len(),
            report.output_dir.display()
        ));
        Ok(report)
    }

    fn write_record(
        &self,
        template: &str,
        attendee: &AttendeeRecord,
        path: &Path,
    ) -> Result<(), RecordError> {
        let invitation = render_invitation(template, attendee, &self.options.missing_value);
        self.sink
            .write(path, &invitation)
            .map_err(|source| RecordError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Generates invitations with the built-in settings and the local filesystem.
pub fn generate_invitations(
    template: &str,
    attendees: &[AttendeeRecord],
    log: &dyn EventLog,
) -> GenerateResult<BatchReport> {
    Generator::new(GenerateOptions::default(), log).generate(template, attendees)
}
