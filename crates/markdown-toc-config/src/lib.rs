//! Configuration primitives and loader for the markdown-toc updater.
//!
//! Settings resolve through a precedence stack:
//! override file → working directory → git root → built-in defaults.
//! Each layer only overrides the keys it sets. Parsed values are validated
//! and normalised into [`TocSettings`] so downstream crates never touch raw
//! TOML.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".markdown-toc.toml";

pub const DEFAULT_HEADING_PATTERN: &str = "(table[ -]of[ -])?contents?|toc";
pub const DEFAULT_START_MARKER: &str = "<!-- toc -->";
pub const DEFAULT_END_MARKER: &str = "<!-- tocstop -->";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub toc: TocSettings,
    pub sources: ConfigSources,
}

/// Settings that shape TOC discovery and rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocSettings {
    pub tight: bool,
    pub ordered: bool,
    pub min_depth: u8,
    pub max_depth: u8,
    pub heading: String,
    pub skip: Option<String>,
    pub prefix: String,
    pub insert: bool,
    pub start_marker: String,
    pub end_marker: String,
}

impl Default for TocSettings {
    fn default() -> Self {
        TocSettings {
            tight: false,
            ordered: false,
            min_depth: 1,
            max_depth: 6,
            heading: DEFAULT_HEADING_PATTERN.to_string(),
            skip: None,
            prefix: String::new(),
            insert: true,
            start_marker: DEFAULT_START_MARKER.to_string(),
            end_marker: DEFAULT_END_MARKER.to_string(),
        }
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    fn builtin() -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: Some(path),
        }
    }

    pub fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
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

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
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
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::builtin();
        let mut merged = defaults_layer(default_source.clone());
        let mut source_layers = vec![default_source];

        let git_config_path = find_git_root(&working_dir).map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let toc = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            toc,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<TocPartial, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw
        .toc
        .map(|toc| toc.into_partial(source))
        .unwrap_or_default())
}

fn defaults_layer(source: ConfigSource) -> TocPartial {
    let defaults = TocSettings::default();
    let at = |value| Some(Located::new(value, source.clone()));
    TocPartial {
        tight: Some(Located::new(defaults.tight, source.clone())),
        ordered: Some(Located::new(defaults.ordered, source.clone())),
        min_depth: Some(Located::new(defaults.min_depth, source.clone())),
        max_depth: Some(Located::new(defaults.max_depth, source.clone())),
        heading: at(defaults.heading),
        skip: None,
        prefix: at(defaults.prefix),
        insert: Some(Located::new(defaults.insert, source.clone())),
        start_marker: at(defaults.start_marker),
        end_marker: at(defaults.end_marker),
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

#[derive(Clone, Debug, Default)]
struct TocPartial {
    tight: Option<Located<bool>>,
    ordered: Option<Located<bool>>,
    min_depth: Option<Located<u8>>,
    max_depth: Option<Located<u8>>,
    heading: Option<Located<String>>,
    skip: Option<Located<String>>,
    prefix: Option<Located<String>>,
    insert: Option<Located<bool>>,
    start_marker: Option<Located<String>>,
    end_marker: Option<Located<String>>,
}

impl TocPartial {
    fn merge(&mut self, other: TocPartial) {
        fn take<T>(slot: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }

        take(&mut self.tight, other.tight);
        take(&mut self.ordered, other.ordered);
        take(&mut self.min_depth, other.min_depth);
        take(&mut self.max_depth, other.max_depth);
        take(&mut self.heading, other.heading);
        take(&mut self.skip, other.skip);
        take(&mut self.prefix, other.prefix);
        take(&mut self.insert, other.insert);
        take(&mut self.start_marker, other.start_marker);
        take(&mut self.end_marker, other.end_marker);
    }

    fn finalize(self) -> Result<TocSettings, ConfigValidationErrors> {
        let defaults = TocSettings::default();
        let mut errors = Vec::new();

        let min_depth = self.min_depth.map(|located| {
            check_depth(&located, "toc.min_depth", &mut errors);
            located
        });
        let max_depth = self.max_depth.map(|located| {
            check_depth(&located, "toc.max_depth", &mut errors);
            located
        });

        if let (Some(min), Some(max)) = (&min_depth, &max_depth) {
            if min.value > max.value {
                errors.push(
                    ConfigValidationError::new(
                        Some(max.source.clone()),
                        format!(
                            "min_depth ({}) cannot exceed max_depth ({})",
                            min.value, max.value
                        ),
                    )
                    .with_context("toc.max_depth"),
                );
            }
        }

        let heading = self.heading.map(|located| {
            check_pattern(&located, "toc.heading", &mut errors);
            located.value
        });

        let skip = self.skip.and_then(|located| {
            if located.value.trim().is_empty() {
                return None;
            }
            check_pattern(&located, "toc.skip", &mut errors);
            Some(located.value)
        });

        let start_marker = self.start_marker.map(|located| {
            check_marker(&located, "toc.start_marker", &mut errors);
            located.value.trim().to_string()
        });
        let end_marker = self.end_marker.map(|located| {
            check_marker(&located, "toc.end_marker", &mut errors);
            located.value.trim().to_string()
        });

        if let (Some(start), Some(end)) = (&start_marker, &end_marker) {
            if !start.is_empty() && start == end {
                errors.push(
                    ConfigValidationError::new(
                        None,
                        "start and end markers must differ".into(),
                    )
                    .with_context("toc.end_marker"),
                );
            }
        }

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(TocSettings {
            tight: self.tight.map_or(defaults.tight, |located| located.value),
            ordered: self.ordered.map_or(defaults.ordered, |located| located.value),
            min_depth: min_depth.map_or(defaults.min_depth, |located| located.value),
            max_depth: max_depth.map_or(defaults.max_depth, |located| located.value),
            heading: heading.unwrap_or(defaults.heading),
            skip,
            prefix: self.prefix.map_or(defaults.prefix, |located| located.value),
            insert: self.insert.map_or(defaults.insert, |located| located.value),
            start_marker: start_marker.unwrap_or(defaults.start_marker),
            end_marker: end_marker.unwrap_or(defaults.end_marker),
        })
    }
}

fn check_depth(located: &Located<u8>, key: &str, errors: &mut Vec<ConfigValidationError>) {
    if located.value == 0 || located.value > 6 {
        errors.push(
            ConfigValidationError::new(
                Some(located.source.clone()),
                format!("must be between 1 and 6 (received {})", located.value),
            )
            .with_context(key),
        );
    }
}

fn check_pattern(located: &Located<String>, key: &str, errors: &mut Vec<ConfigValidationError>) {
    if let Err(err) = Regex::new(&located.value) {
        errors.push(
            ConfigValidationError::new(
                Some(located.source.clone()),
                format!("invalid pattern '{}': {err}", located.value),
            )
            .with_context(key),
        );
    }
}

fn check_marker(located: &Located<String>, key: &str, errors: &mut Vec<ConfigValidationError>) {
    if located.value.trim().is_empty() {
        errors.push(
            ConfigValidationError::new(Some(located.source.clone()), "cannot be empty".into())
                .with_context(key),
        );
    }
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    toc: Option<RawToc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawToc {
    #[serde(default)]
    tight: Option<bool>,
    #[serde(default)]
    ordered: Option<bool>,
    #[serde(default)]
    min_depth: Option<u8>,
    #[serde(default)]
    max_depth: Option<u8>,
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    skip: Option<String>,
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    insert: Option<bool>,
    #[serde(default)]
    start_marker: Option<String>,
    #[serde(default)]
    end_marker: Option<String>,
}

impl RawToc {
    fn into_partial(self, source: ConfigSource) -> TocPartial {
        let at = |value| Located::new(value, source.clone());
        TocPartial {
            tight: self.tight.map(|value| Located::new(value, source.clone())),
            ordered: self.ordered.map(|value| Located::new(value, source.clone())),
            min_depth: self.min_depth.map(|value| Located::new(value, source.clone())),
            max_depth: self.max_depth.map(|value| Located::new(value, source.clone())),
            heading: self.heading.map(at),
            skip: self.skip.map(at),
            prefix: self.prefix.map(at),
            insert: self.insert.map(|value| Located::new(value, source.clone())),
            start_marker: self.start_marker.map(at),
            end_marker: self.end_marker.map(at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(contents: &str) -> TocPartial {
        let raw: RawConfig = toml::from_str(contents).expect("parse toml");
        raw.toc
            .expect("toc table")
            .into_partial(ConfigSource::for_file(
                ConfigSourceKind::Local,
                PathBuf::from(CONFIG_FILE_NAME),
            ))
    }

    #[test]
    fn later_layers_override_only_the_keys_they_set() {
        let mut merged = defaults_layer(ConfigSource::builtin());
        merged.merge(partial("[toc]\ntight = true\nmax_depth = 3\n"));
        merged.merge(partial("[toc]\nmax_depth = 4\n"));

        let settings = merged.finalize().expect("valid settings");
        assert!(settings.tight);
        assert_eq!(settings.max_depth, 4);
        assert_eq!(settings.min_depth, 1);
        assert_eq!(settings.start_marker, DEFAULT_START_MARKER);
    }

    #[test]
    fn blank_skip_pattern_clears_the_filter() {
        let mut merged = defaults_layer(ConfigSource::builtin());
        merged.merge(partial("[toc]\nskip = \"  \"\n"));
        assert_eq!(merged.finalize().expect("valid settings").skip, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<RawConfig>("[toc]\ntigth = true\n").is_err());
    }
}
