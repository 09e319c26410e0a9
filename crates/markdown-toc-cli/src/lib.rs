use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use flexi_logger::{Logger, LoggerHandle};
use log::debug;
use markdown_toc_config::{Config, LoadOptions, TocSettings};
use markdown_toc_core::{
    update_file, ExitCode, FileOutcome, FileStatus, TocError, TocMode, TocOptions,
};
use serde_json::json;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<u8> {
    let cli = Cli::parse();
    let _logger = init_logging(cli.verbose)?;

    let mut load = LoadOptions::default();
    if let Some(path) = &cli.config {
        load = load.with_override_path(path);
    }
    let config = Config::load(load).map_err(TocError::from)?;
    for layer in &config.sources.layers {
        debug!("event=config_layer module=cli source=\"{}\"", layer.describe());
    }

    let settings = cli.apply_overrides(config.toc);
    let options = TocOptions::from_settings(&settings)?;
    let mode = cli.mode();

    let mut outcomes = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let outcome = update_file(path, &options, mode)?;
        if matches!(cli.format, OutputFormat::Plain) {
            report(&outcome, cli.quiet);
        }
        outcomes.push(outcome);
    }

    if matches!(cli.format, OutputFormat::Json) {
        let payload = json!({
            "mode": mode_label(mode),
            "files": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    let exit = outcomes
        .iter()
        .map(FileOutcome::exit_code)
        .max_by_key(|code| *code as u8)
        .unwrap_or(ExitCode::Success);
    Ok(exit as u8)
}

/// Map an error escaping [`run`] to the process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<TocError>() {
        Some(toc_err) => toc_err.exit_code() as u8,
        None => ExitCode::InvalidArguments as u8,
    }
}

fn init_logging(verbose: u8) -> Result<LoggerHandle> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let handle = Logger::try_with_env_or_str(level)?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()?;
    Ok(handle)
}

fn report(outcome: &FileOutcome, quiet: bool) {
    let path = outcome.path.display();
    match outcome.status {
        FileStatus::Updated if !quiet => {
            println!("✏️  updated {path} ({} entries)", outcome.entries);
        }
        FileStatus::Unchanged if !quiet => {
            println!("ℹ️  {path} is up to date");
        }
        FileStatus::Stale => {
            println!("❌ {path} has an out-of-date table of contents");
        }
        FileStatus::Updated | FileStatus::Unchanged => {}
    }

    if let Some(diff) = &outcome.diff {
        print!("{diff}");
        if !diff.ends_with('\n') {
            println!();
        }
    }
}

fn mode_label(mode: TocMode) -> &'static str {
    match mode {
        TocMode::Update => "update",
        TocMode::Check => "check",
        TocMode::Diff => "diff",
    }
}

#[derive(Parser)]
#[command(
    name = "markdown-toc",
    author,
    version,
    about = "Insert or refresh the table of contents of markdown files"
)]
struct Cli {
    /// Markdown files to update, processed in order
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
    /// Render the list without blank lines between items
    #[arg(long, conflicts_with = "loose")]
    tight: bool,
    /// Render the list with blank lines between items
    #[arg(long)]
    loose: bool,
    /// Number entries instead of using bullets
    #[arg(long)]
    ordered: bool,
    /// Shallowest heading level to list
    #[arg(long = "min-depth", value_name = "N", value_parser = clap::value_parser!(u8).range(1..=6))]
    min_depth: Option<u8>,
    /// Deepest heading level to list
    #[arg(long = "max-depth", value_name = "N", value_parser = clap::value_parser!(u8).range(1..=6))]
    max_depth: Option<u8>,
    /// Pattern naming the TOC heading (matched against the whole heading text)
    #[arg(long, value_name = "PATTERN")]
    heading: Option<String>,
    /// Leave out headings whose whole text matches this pattern
    #[arg(long, value_name = "PATTERN")]
    skip: Option<String>,
    /// Prefix added in front of every link fragment
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,
    /// Do not add a TOC to documents that lack one
    #[arg(long = "no-insert")]
    no_insert: bool,
    /// Report out-of-date files without modifying them
    #[arg(long, conflicts_with = "diff")]
    check: bool,
    /// Print unified diffs for out-of-date files without modifying them
    #[arg(long)]
    diff: bool,
    /// Use this config file on top of discovered ones
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,
    /// Suppress output for files that needed no attention
    #[arg(short, long)]
    quiet: bool,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn mode(&self) -> TocMode {
        if self.diff {
            TocMode::Diff
        } else if self.check {
            TocMode::Check
        } else {
            TocMode::Update
        }
    }

    fn apply_overrides(&self, mut settings: TocSettings) -> TocSettings {
        if self.tight {
            settings.tight = true;
        }
        if self.loose {
            settings.tight = false;
        }
        if self.ordered {
            settings.ordered = true;
        }
        if let Some(depth) = self.min_depth {
            settings.min_depth = depth;
        }
        if let Some(depth) = self.max_depth {
            settings.max_depth = depth;
        }
        if let Some(heading) = &self.heading {
            settings.heading = heading.clone();
        }
        if let Some(skip) = &self.skip {
            settings.skip = Some(skip.clone());
        }
        if let Some(prefix) = &self.prefix {
            settings.prefix = prefix.clone();
        }
        if self.no_insert {
            settings.insert = false;
        }
        settings
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}
