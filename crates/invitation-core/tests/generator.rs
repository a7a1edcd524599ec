use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use invitation_core::{
    generate_invitations, AttendeeRecord, ExitCode, FsSink, GenerateError, GenerateOptions,
    Generator, InputError, OutputSink, RecordError, RecordingLog, TemplateProblem,
};
use invitation_test_support::{sample_attendees, test_config, SAMPLE_TEMPLATE};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

const PLACEHOLDERS: [&str; 4] = ["{name}", "{event_title}", "{event_date}", "{event_location}"];

fn options_in(dir: &TempDir) -> GenerateOptions {
    GenerateOptions::from_config(&test_config(dir.path()))
}

fn output_dir(dir: &TempDir) -> PathBuf {
    dir.path().join("invitations")
}

fn read_output(dir: &TempDir, index: usize) -> String {
    fs::read_to_string(output_dir(dir).join(format!("output_{index}.txt"))).expect("read output")
}

fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).expect("read dir").count()
}

/// Delegates to the real filesystem except for the listed file names.
struct FailingSink {
    fail_on: Vec<String>,
    attempts: RefCell<Vec<PathBuf>>,
}

impl FailingSink {
    fn failing(names: &[&str]) -> Self {
        Self {
            fail_on: names.iter().map(|name| name.to_string()).collect(),
            attempts: RefCell::new(Vec::new()),
        }
    }
}

impl OutputSink for FailingSink {
    fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
        FsSink.ensure_dir(dir)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.attempts.borrow_mut().push(path.to_path_buf());
        let name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");
        if self.fail_on.iter().any(|target| target == name) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        FsSink.write(path, contents)
    }
}

struct NoDirectorySink;

impl OutputSink for NoDirectorySink {
    fn ensure_dir(&self, _dir: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }

    fn write(&self, _path: &Path, _contents: &str) -> io::Result<()> {
        panic!("no record should be written without an output directory");
    }
}

#[test]
fn writes_one_file_per_attendee() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();
    let generator = Generator::new(options_in(&dir), &log);

    let report = generator
        .generate_json(&json!(SAMPLE_TEMPLATE), &sample_attendees())
        .expect("generate");

    assert_eq!(report.len(), 3);
    assert_eq!(report.written(), 3);
    assert_eq!(report.exit_code(), ExitCode::Success);
    assert_eq!(file_count(&output_dir(&dir)), 3);

    let first = read_output(&dir, 1);
    assert_eq!(
        first,
        "Hello Alice,\n\nYou are invited to the Python Conference on 2023-07-15 at New York.\n\nWe look forward to your presence.\n\nBest regards,\nEvent Team"
    );
    assert!(log.errors().is_empty());
    assert_eq!(log.infos().len(), 4);
}

#[test]
fn no_placeholder_survives_rendering() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();
    Generator::new(options_in(&dir), &log)
        .generate_json(&json!(SAMPLE_TEMPLATE), &sample_attendees())
        .expect("generate");

    for index in 1..=3 {
        let content = read_output(&dir, index);
        for placeholder in PLACEHOLDERS {
            assert!(!content.contains(placeholder), "{placeholder} left in {index}");
        }
    }
}

#[test]
fn single_attendee_scenario() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();
    let attendees = json!([{
        "name": "Alice",
        "event_title": "Conf",
        "event_date": "2023-07-15",
        "event_location": "NY"
    }]);

    let report = Generator::new(options_in(&dir), &log)
        .generate_json(&json!(SAMPLE_TEMPLATE), &attendees)
        .expect("generate");

    assert_eq!(report.len(), 1);
    let names: Vec<_> = fs::read_dir(output_dir(&dir))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["output_1.txt".to_string()]);

    let content = read_output(&dir, 1);
    for expected in ["Alice", "Conf", "2023-07-15", "NY"] {
        assert!(content.contains(expected));
    }
    assert!(!content.contains('{') && !content.contains('}'));
}

#[test]
fn null_title_only_affects_its_own_record() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();
    let attendees = json!([
        {"name": "Charlie", "event_title": null, "event_date": "2023-09-01", "event_location": "Boston"},
        {"name": "Dana", "event_title": "Expo", "event_date": "2023-09-02", "event_location": "Austin"}
    ]);

    Generator::new(options_in(&dir), &log)
        .generate_json(&json!(SAMPLE_TEMPLATE), &attendees)
        .expect("generate");

    let first = read_output(&dir, 1);
    assert!(first.contains("invited to the N/A on 2023-09-01 at Boston"));
    let second = read_output(&dir, 2);
    assert!(second.contains("invited to the Expo on 2023-09-02"));
    assert!(!second.contains("N/A"));
}

#[test]
fn configured_missing_marker_is_used() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();
    let mut options = options_in(&dir);
    options.missing_value = "TBD".into();

    let records = vec![AttendeeRecord::new()
        .with("name", "Eve")
        .with_null("event_title")
        .with_null("event_date")
        .with("event_location", "Oslo")];

    Generator::new(options, &log)
        .generate(SAMPLE_TEMPLATE, &records)
        .expect("generate");

    assert!(read_output(&dir, 1).contains("the TBD on TBD at Oslo"));
}

#[test]
fn repeated_runs_overwrite_with_identical_content() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();
    let generator = Generator::new(options_in(&dir), &log);

    generator
        .generate_json(&json!(SAMPLE_TEMPLATE), &sample_attendees())
        .expect("first run");
    let first: Vec<String> = (1..=3).map(|index| read_output(&dir, index)).collect();

    generator
        .generate_json(&json!(SAMPLE_TEMPLATE), &sample_attendees())
        .expect("second run");
    let second: Vec<String> = (1..=3).map(|index| read_output(&dir, index)).collect();

    assert_eq!(first, second);
    assert_eq!(file_count(&output_dir(&dir)), 3);
}

fn assert_rejected_without_output(template: Value, attendees: Value, expected: InputError) {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();

    let err = Generator::new(options_in(&dir), &log)
        .generate_json(&template, &attendees)
        .unwrap_err();

    match err {
        GenerateError::Input(actual) => assert_eq!(actual, expected),
        other => panic!("expected input error, got {other:?}"),
    }
    assert!(!output_dir(&dir).exists());
    assert_eq!(log.errors().len(), 1);
    assert!(log.infos().is_empty());
}

#[test]
fn empty_template_creates_nothing() {
    assert_rejected_without_output(
        json!(""),
        sample_attendees(),
        InputError::Template(TemplateProblem::Empty),
    );
}

#[test]
fn non_text_template_creates_nothing() {
    assert_rejected_without_output(
        json!(123),
        sample_attendees(),
        InputError::Template(TemplateProblem::NotText),
    );
}

#[test]
fn non_list_attendees_create_nothing() {
    assert_rejected_without_output(
        json!(SAMPLE_TEMPLATE),
        json!("not a list"),
        InputError::AttendeesNotSequence,
    );
}

#[test]
fn empty_attendee_list_creates_nothing() {
    assert_rejected_without_output(json!(SAMPLE_TEMPLATE), json!([]), InputError::AttendeesEmpty);
}

#[test]
fn one_invalid_record_blocks_the_whole_batch() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();
    let attendees = json!([
        {"name": "Alice", "event_title": "Conf", "event_date": "2023-07-15", "event_location": "NY"},
        {"name": "Charlie", "event_title": "AI Summit"}
    ]);

    let err = Generator::new(options_in(&dir), &log)
        .generate_json(&json!(SAMPLE_TEMPLATE), &attendees)
        .unwrap_err();

    assert_eq!(err.exit_code(), ExitCode::InvalidInput);
    assert!(!output_dir(&dir).exists());
    assert_eq!(
        log.errors(),
        vec![
            "attendee 2 is invalid: record is missing fields event_date, event_location; no invitations generated"
        ]
    );
}

#[test]
fn write_failure_is_isolated_to_its_record() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();
    let sink = FailingSink::failing(&["output_2.txt"]);

    let report = Generator::new(options_in(&dir), &log)
        .with_sink(&sink)
        .generate_json(&json!(SAMPLE_TEMPLATE), &sample_attendees())
        .expect("batch still completes");

    assert_eq!(sink.attempts.borrow().len(), 3);
    assert_eq!(report.written(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.exit_code(), ExitCode::RecordsFailed);

    let failure = report.failures().next().expect("one failure");
    assert_eq!(failure.index, 2);
    assert!(matches!(failure.error(), Some(RecordError::Write { .. })));

    assert!(output_dir(&dir).join("output_1.txt").exists());
    assert!(!output_dir(&dir).join("output_2.txt").exists());
    assert!(output_dir(&dir).join("output_3.txt").exists());

    let errors = log.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("invitation 2 skipped: failed to write"));
}

#[test]
fn nested_and_boolean_values_still_produce_a_file() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();
    let attendees = json!([
        {"name": ["A", "B"], "event_title": true, "event_date": "2023-07-15", "event_location": "NY"},
        {
            "name": "Bob",
            "event_title": "Conf",
            "event_date": "2023-07-15",
            "event_location": {"city": "Paris"}
        }
    ]);

    let report = Generator::new(options_in(&dir), &log)
        .generate_json(&json!(SAMPLE_TEMPLATE), &attendees)
        .expect("generate");

    assert_eq!(report.written(), 2);
    assert_eq!(report.exit_code(), ExitCode::Success);
    assert_eq!(file_count(&output_dir(&dir)), 2);
    assert!(log.errors().is_empty());

    let first = read_output(&dir, 1);
    assert!(first.contains(r#"Hello ["A","B"],"#));
    assert!(first.contains("invited to the True on"));
    assert!(read_output(&dir, 2).contains(r#"at {"city":"Paris"}."#));
}

#[test]
fn output_directory_failure_aborts_before_writing() {
    let dir = tempdir().unwrap();
    let log = RecordingLog::new();

    let err = Generator::new(options_in(&dir), &log)
        .with_sink(&NoDirectorySink)
        .generate_json(&json!(SAMPLE_TEMPLATE), &sample_attendees())
        .unwrap_err();

    assert!(matches!(err, GenerateError::OutputDirectory { .. }));
    assert_eq!(err.exit_code(), ExitCode::Io);
    assert_eq!(log.errors().len(), 1);
}

#[test]
fn convenience_entry_point_rejects_empty_template() {
    let log = RecordingLog::new();
    let err = generate_invitations("", &[], &log).unwrap_err();

    assert!(matches!(
        err,
        GenerateError::Input(InputError::Template(TemplateProblem::Empty))
    ));
    assert_eq!(
        log.errors(),
        vec!["invalid template: template is empty; no invitations generated"]
    );
}
