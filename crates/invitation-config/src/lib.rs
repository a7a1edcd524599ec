//! Configuration primitives and loader for the invitation generator.
//!
//! Settings resolve through the precedence stack
//! override flag → working directory → git root → built-in defaults.
//! Every value remembers which layer supplied it so validation failures can
//! point at the offending file.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".invitations.toml";

pub const DEFAULT_OUTPUT_DIRECTORY: &str = "invitations";
pub const DEFAULT_FILE_STEM: &str = "output";
pub const DEFAULT_EXTENSION: &str = "txt";
pub const DEFAULT_MISSING_VALUE: &str = "N/A";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub output: OutputSettings,
    pub render: RenderSettings,
    pub logging: LoggingSettings,
    pub sources: ConfigSources,
}

impl Config {
    /// Built-in settings anchored at `base_dir`, without touching the filesystem.
    pub fn builtin(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Config {
            output: OutputSettings {
                directory: base_dir.join(DEFAULT_OUTPUT_DIRECTORY),
                file_stem: DEFAULT_FILE_STEM.to_owned(),
                extension: DEFAULT_EXTENSION.to_owned(),
            },
            render: RenderSettings {
                missing_value: DEFAULT_MISSING_VALUE.to_owned(),
            },
            logging: LoggingSettings {
                level: LogLevel::Info,
            },
            sources: ConfigSources {
                working_directory: base_dir.clone(),
                layers: vec![ConfigSource::builtin(base_dir)],
            },
        }
    }
}

/// Where and under which names invitation documents are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub file_stem: String,
    pub extension: String,
}

impl OutputSettings {
    /// File name for the 1-based record `index`, e.g. `output_3.txt`.
    pub fn file_name(&self, index: usize) -> String {
        format!("{}_{}.{}", self.file_stem, index, self.extension)
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.directory.join(self.file_name(index))
    }
}

/// Substitution settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    /// Text written in place of a null or absent field value.
    pub missing_value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

/// Verbosity accepted by `logging.level`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    /// Contributing layers, lowest precedence first.
    pub layers: Vec<ConfigSource>,
}

/// One layer of configuration: the built-in defaults or a file on disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    /// Directory that relative paths declared by this layer resolve against.
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn builtin(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} config at {}", self.kind.label(), path.display()),
            None => f.write_str("built-in defaults"),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl ConfigSourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ConfigSourceKind::Default => "built-in",
            ConfigSourceKind::GitRoot => "git-root",
            ConfigSourceKind::Local => "local",
            ConfigSourceKind::Override => "override",
        }
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    fn resolved_working_dir(&self) -> Result<PathBuf, ConfigError> {
        let resolved = match &self.working_dir {
            Some(dir) => fs::canonicalize(dir),
            None => env::current_dir(),
        };
        resolved.map_err(|source| ConfigError::WorkingDirectory {
            path: self.working_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            source,
        })
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot use {path} as the working directory: {source}")]
    WorkingDirectory { path: PathBuf, source: io::Error },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid invitation settings:\n{0}")]
    Validation(ValidationErrors),
}

impl Config {
    /// Resolves settings for the working directory in `options`, merging every
    /// config file that applies on top of the built-in defaults.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = options.resolved_working_dir()?;
        let override_path = options.override_path.map(|path| working_dir.join(path));

        let builtin = ConfigSource::builtin(working_dir.clone());
        let mut merged = PartialConfig::defaults(&builtin);
        let mut layers = vec![builtin.clone()];
        for layer in discover_files(&working_dir, override_path)? {
            if let Some(path) = &layer.path {
                merged.merge(read_layer(path, &layer)?);
            }
            layers.push(layer);
        }

        let resolved = merged.finalize(&builtin).map_err(ConfigError::Validation)?;
        Ok(Config {
            output: resolved.output,
            render: resolved.render,
            logging: resolved.logging,
            sources: ConfigSources {
                working_directory: working_dir,
                layers,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::builtin(PathBuf::from("."))
    }
}

/// Config files that apply to `working_dir`, lowest precedence first. A file
/// reachable through several layers only counts once, at its highest one.
fn discover_files(
    working_dir: &Path,
    override_path: Option<PathBuf>,
) -> Result<Vec<ConfigSource>, ConfigError> {
    if let Some(path) = &override_path {
        if !path.exists() {
            return Err(ConfigError::OverrideNotFound { path: path.clone() });
        }
    }

    let git_config = working_dir
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(|root| root.join(CONFIG_FILE_NAME));
    let candidates: Vec<(ConfigSourceKind, PathBuf)> = [
        (ConfigSourceKind::GitRoot, git_config),
        (ConfigSourceKind::Local, Some(working_dir.join(CONFIG_FILE_NAME))),
        (ConfigSourceKind::Override, override_path),
    ]
    .into_iter()
    .filter_map(|(kind, path)| path.map(|path| (kind, path)))
    .collect();

    Ok(candidates
        .iter()
        .enumerate()
        .filter(|(pos, (_, path))| {
            path.exists() && !candidates[pos + 1..].iter().any(|(_, later)| later == path)
        })
        .map(|(_, (kind, path))| ConfigSource::file(*kind, path.clone()))
        .collect())
}

fn read_layer(path: &Path, source: &ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    output_directory: Option<Located<PathBuf>>,
    file_stem: Option<Located<String>>,
    extension: Option<Located<String>>,
    missing_value: Option<Located<String>>,
    log_level: Option<Located<String>>,
}

impl PartialConfig {
    fn defaults(source: &ConfigSource) -> Self {
        let at = |value: &str| Some(Located::new(value.to_owned(), source.clone()));
        PartialConfig {
            output_directory: Some(Located::new(
                PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
                source.clone(),
            )),
            file_stem: at(DEFAULT_FILE_STEM),
            extension: at(DEFAULT_EXTENSION),
            missing_value: at(DEFAULT_MISSING_VALUE),
            log_level: at(LogLevel::Info.as_str()),
        }
    }

    /// Overlays `higher` on top of `self`; keys it leaves unset keep their value.
    fn merge(&mut self, higher: PartialConfig) {
        self.output_directory = higher.output_directory.or(self.output_directory.take());
        self.file_stem = higher.file_stem.or(self.file_stem.take());
        self.extension = higher.extension.or(self.extension.take());
        self.missing_value = higher.missing_value.or(self.missing_value.take());
        self.log_level = higher.log_level.or(self.log_level.take());
    }

    fn finalize(self, builtin: &ConfigSource) -> Result<ResolvedConfig, ValidationErrors> {
        let text = |slot: Option<Located<String>>, fallback: &str| {
            slot.unwrap_or_else(|| Located::new(fallback.to_owned(), builtin.clone()))
        };
        let directory = self.output_directory.unwrap_or_else(|| {
            Located::new(PathBuf::from(DEFAULT_OUTPUT_DIRECTORY), builtin.clone())
        });
        let file_stem = text(self.file_stem, DEFAULT_FILE_STEM);
        let extension = text(self.extension, DEFAULT_EXTENSION);
        let missing_value = text(self.missing_value, DEFAULT_MISSING_VALUE);
        let log_level = text(self.log_level, LogLevel::Info.as_str());

        let mut issues = Vec::new();
        if directory.value.as_os_str().is_empty() {
            issues.push(SettingIssue::new("output.directory", &directory, "cannot be empty"));
        }
        check_file_component("output.file_stem", &file_stem, &mut issues);
        check_file_component("output.extension", &extension, &mut issues);
        let level = log_level.value.parse::<LogLevel>().unwrap_or_else(|()| {
            let message = format!("unknown level '{}'", log_level.value);
            issues.push(SettingIssue::new("logging.level", &log_level, message));
            LogLevel::Info
        });

        if !issues.is_empty() {
            return Err(ValidationErrors(issues));
        }

        Ok(ResolvedConfig {
            output: OutputSettings {
                directory: directory.source.base_dir.join(&directory.value),
                file_stem: file_stem.value,
                extension: extension.value,
            },
            render: RenderSettings {
                missing_value: missing_value.value,
            },
            logging: LoggingSettings { level },
        })
    }
}

/// File stems and extensions become part of a single file name.
fn check_file_component(
    key: &'static str,
    located: &Located<String>,
    issues: &mut Vec<SettingIssue>,
) {
    if located.value.trim().is_empty() {
        issues.push(SettingIssue::new(key, located, "cannot be empty"));
    } else if located.value.contains(['/', '\\']) {
        let message = format!("'{}' must not contain path separators", located.value);
        issues.push(SettingIssue::new(key, located, message));
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

struct ResolvedConfig {
    output: OutputSettings,
    render: RenderSettings,
    logging: LoggingSettings,
}

/// Every invalid setting found in the merged layers, shown as a bullet list.
#[derive(Debug)]
pub struct ValidationErrors(Vec<SettingIssue>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &SettingIssue> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(|issue| format!("- {issue}")).collect();
        f.write_str(&lines.join("\n"))
    }
}

/// An invalid setting and the layer that supplied it.
#[derive(Clone, Debug)]
pub struct SettingIssue {
    pub key: &'static str,
    pub message: String,
    pub source: ConfigSource,
}

impl SettingIssue {
    fn new<T>(key: &'static str, located: &Located<T>, message: impl Into<String>) -> Self {
        SettingIssue {
            key,
            message: message.into(),
            source: located.source.clone(),
        }
    }
}

impl fmt::Display for SettingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.key, self.message, self.source)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    output: Option<RawOutput>,
    #[serde(default)]
    render: Option<RawRender>,
    #[serde(default)]
    logging: Option<RawLogging>,
}

impl RawConfig {
    fn into_partial(self, source: &ConfigSource) -> PartialConfig {
        fn at<T>(value: Option<T>, source: &ConfigSource) -> Option<Located<T>> {
            value.map(|value| Located::new(value, source.clone()))
        }

        let output = self.output.unwrap_or_default();
        let render = self.render.unwrap_or_default();
        let logging = self.logging.unwrap_or_default();
        PartialConfig {
            output_directory: at(output.directory, source),
            file_stem: at(output.file_stem, source),
            extension: at(output.extension, source),
            missing_value: at(render.missing_value, source),
            log_level: at(logging.level, source),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    #[serde(default)]
    directory: Option<PathBuf>,
    #[serde(default)]
    file_stem: Option<String>,
    #[serde(default)]
    extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRender {
    #[serde(default)]
    missing_value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogging {
    #[serde(default)]
    level: Option<String>,
}
