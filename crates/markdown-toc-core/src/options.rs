use markdown_toc_config::TocSettings;
use regex::{Regex, RegexBuilder};

use crate::error::{TocError, TocResult};

/// Resolved options for one TOC transform.
///
/// `heading` and `skip` match the whole normalized heading text,
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct TocOptions {
    pub tight: bool,
    pub ordered: bool,
    pub min_depth: usize,
    pub max_depth: usize,
    pub heading: Regex,
    pub skip: Option<Regex>,
    pub prefix: String,
    pub insert: bool,
    pub start_marker: String,
    pub end_marker: String,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self::from_settings(&TocSettings::default()).expect("built-in TOC settings are valid")
    }
}

impl TocOptions {
    pub fn from_settings(settings: &TocSettings) -> TocResult<Self> {
        let heading = whole_text_pattern(&settings.heading)
            .map_err(|err| invalid(format!("heading pattern '{}': {err}", settings.heading)))?;

        let skip = match settings.skip.as_deref() {
            Some(pattern) if !pattern.trim().is_empty() => Some(
                whole_text_pattern(pattern)
                    .map_err(|err| invalid(format!("skip pattern '{pattern}': {err}")))?,
            ),
            _ => None,
        };

        let options = Self {
            tight: settings.tight,
            ordered: settings.ordered,
            min_depth: usize::from(settings.min_depth),
            max_depth: usize::from(settings.max_depth),
            heading,
            skip,
            prefix: settings.prefix.clone(),
            insert: settings.insert,
            start_marker: settings.start_marker.trim().to_string(),
            end_marker: settings.end_marker.trim().to_string(),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn with_tight(mut self, tight: bool) -> Self {
        self.tight = tight;
        self
    }

    pub fn validate(&self) -> TocResult<()> {
        for (name, depth) in [("min_depth", self.min_depth), ("max_depth", self.max_depth)] {
            if !(1..=6).contains(&depth) {
                return Err(invalid(format!(
                    "{name} must be between 1 and 6 (received {depth})"
                )));
            }
        }

        if self.min_depth > self.max_depth {
            return Err(invalid(format!(
                "min_depth ({}) cannot exceed max_depth ({})",
                self.min_depth, self.max_depth
            )));
        }

        if self.start_marker.is_empty() || self.end_marker.is_empty() {
            return Err(invalid("TOC markers cannot be empty".to_string()));
        }

        if self.start_marker == self.end_marker {
            return Err(invalid("start and end markers must differ".to_string()));
        }

        Ok(())
    }

    pub(crate) fn is_skipped(&self, text: &str) -> bool {
        self.skip
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }
}

fn whole_text_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .size_limit(1024 * 100)
        .build()
}

fn invalid(message: String) -> TocError {
    TocError::InvalidOptions(message)
}
