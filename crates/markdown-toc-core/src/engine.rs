use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use markdown_toc_headings::{scan, Outline, Slugger};
use serde::Serialize;

use crate::diff::build_unified_diff;
use crate::error::{ExitCode, TocError, TocResult};
use crate::fs::write_atomic;
use crate::options::TocOptions;
use crate::region::{
    existing_entries, find_toc_heading, heading_section, locate_markers, ExistingEntry,
    RegionKind, TocRegion,
};
use crate::render::{generate_items, render_items, TocItem};

/// Title of the section added to documents that have no TOC yet.
pub const INSERTED_TITLE: &str = "Table of Contents";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TocMode {
    /// Rewrite the file when its TOC is out of date.
    #[default]
    Update,
    /// Report whether the file is out of date without writing.
    Check,
    /// Like `Check`, but also produce a unified diff.
    Diff,
}

#[derive(Debug, Clone)]
pub struct TocOutcome {
    pub contents: String,
    pub changed: bool,
    pub region: Option<RegionKind>,
    pub items: Vec<TocItem>,
    pub previous: Vec<ExistingEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    Updated,
    Unchanged,
    Stale,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Updated => "updated",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Stale => "stale",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub region: Option<RegionKind>,
    pub entries: usize,
    pub previous_entries: usize,
    pub diff: Option<String>,
}

impl FileOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self.status {
            FileStatus::Stale => ExitCode::Stale,
            FileStatus::Updated | FileStatus::Unchanged => ExitCode::Success,
        }
    }
}

/// Insert or refresh the table of contents of `contents`.
///
/// Text outside the TOC region is carried over byte for byte, and feeding the
/// result back in produces the same text.
pub fn process(contents: &str, options: &TocOptions) -> TocOutcome {
    let outline = scan(contents);
    let toc_heading = find_toc_heading(&outline, options);
    let title = document_title(&outline);

    let eligible: Vec<usize> = outline
        .headings
        .iter()
        .enumerate()
        .filter(|(idx, heading)| {
            Some(*idx) != toc_heading
                && Some(*idx) != title
                && (options.min_depth..=options.max_depth).contains(&heading.depth)
                && !heading.text.is_empty()
                && !options.is_skipped(&heading.text)
        })
        .map(|(idx, _)| idx)
        .collect();

    let region = locate_markers(&outline, options)
        .or_else(|| toc_heading.map(|idx| heading_section(&outline, idx, contents)));

    let insertion = match (&region, eligible.first()) {
        (None, Some(&first)) if options.insert => Some(Insertion::plan(&outline, first, options)),
        _ => None,
    };

    let anchors = assign_anchors(&outline, insertion.as_ref());
    let items = generate_items(
        eligible
            .iter()
            .map(|&idx| (&outline.headings[idx], anchors[idx].clone())),
    );
    let list = render_items(&items, options);

    let (rewritten, region_kind, previous) = match (region, insertion) {
        (Some(region), _) => {
            let previous = existing_entries(&outline, &region.replace);
            let body = region_body(&region, &list);
            let rewritten = splice(contents, &region.replace, &body);
            (rewritten, Some(region.kind), previous)
        }
        (None, Some(insertion)) => {
            let section = insertion.section(&list, options);
            let at = insertion.offset;
            (splice(contents, &(at..at), &section), Some(RegionKind::Inserted), Vec::new())
        }
        (None, None) => (contents.to_string(), None, Vec::new()),
    };

    TocOutcome {
        changed: rewritten != contents,
        contents: rewritten,
        region: region_kind,
        items,
        previous,
    }
}

/// Read `path`, refresh its TOC and act on the result according to `mode`.
pub fn update_file(path: &Path, options: &TocOptions, mode: TocMode) -> TocResult<FileOutcome> {
    let started_at = Instant::now();
    info!(
        "event=toc_update module=core status=start mode={:?} path={}",
        mode,
        path.display()
    );

    let result = run_update(path, options, mode);
    match &result {
        Ok(outcome) => info!(
            "event=toc_update module=core status=ok path={} result={} region={} entries={} duration_ms={}",
            path.display(),
            outcome.status.as_str(),
            outcome.region.map_or("none", RegionKind::as_str),
            outcome.entries,
            started_at.elapsed().as_millis()
        ),
        Err(err) => debug!(
            "event=toc_update module=core status=error path={} duration_ms={} error={}",
            path.display(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn run_update(path: &Path, options: &TocOptions, mode: TocMode) -> TocResult<FileOutcome> {
    options.validate()?;

    let original = fs::read_to_string(path).map_err(|source| TocError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let outcome = process(&original, options);
    debug!(
        "event=toc_process module=core path={} region={} entries={} previous_entries={} changed={}",
        path.display(),
        outcome.region.map_or("none", RegionKind::as_str),
        outcome.items.len(),
        outcome.previous.len(),
        outcome.changed
    );

    let status = match (outcome.changed, mode) {
        (false, _) => FileStatus::Unchanged,
        (true, TocMode::Update) => {
            write_atomic(path, &outcome.contents).map_err(|source| TocError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            FileStatus::Updated
        }
        (true, TocMode::Check | TocMode::Diff) => FileStatus::Stale,
    };

    let diff = match mode {
        TocMode::Diff => {
            build_unified_diff(&original, &outcome.contents, &path.to_string_lossy())
        }
        TocMode::Update | TocMode::Check => None,
    };

    Ok(FileOutcome {
        path: path.to_path_buf(),
        status,
        region: outcome.region,
        entries: outcome.items.len(),
        previous_entries: outcome.previous.len(),
        diff,
    })
}

/// Where and how a missing TOC gets added.
struct Insertion {
    offset: usize,
    before_heading: usize,
    depth: usize,
    as_heading: bool,
}

impl Insertion {
    fn plan(outline: &Outline<'_>, first_entry: usize, options: &TocOptions) -> Self {
        let heading = &outline.headings[first_entry];
        Self {
            offset: heading.byte_range.start,
            before_heading: first_entry,
            depth: heading.depth,
            // A heading the pattern would not find again falls back to markers.
            as_heading: options.heading.is_match(INSERTED_TITLE),
        }
    }

    fn section(&self, list: &str, options: &TocOptions) -> String {
        if self.as_heading {
            let hashes = "#".repeat(self.depth);
            format!("{hashes} {INSERTED_TITLE}\n\n{list}\n")
        } else {
            format!(
                "{}\n{list}{}\n\n",
                options.start_marker, options.end_marker
            )
        }
    }
}

/// The document title: a depth-1 heading that is the first heading of the document.
fn document_title(outline: &Outline<'_>) -> Option<usize> {
    outline
        .headings
        .first()
        .filter(|heading| heading.depth == 1)
        .map(|_| 0)
}

/// Slugs for every heading, numbering repeats across the whole document.
fn assign_anchors(outline: &Outline<'_>, insertion: Option<&Insertion>) -> Vec<String> {
    let mut slugger = Slugger::new();
    outline
        .headings
        .iter()
        .enumerate()
        .map(|(idx, heading)| {
            if let Some(insertion) = insertion {
                if insertion.as_heading && insertion.before_heading == idx {
                    slugger.slug(INSERTED_TITLE);
                }
            }
            slugger.slug(&heading.text)
        })
        .collect()
}

fn region_body(region: &TocRegion, list: &str) -> String {
    match region.kind {
        RegionKind::Markers => list.to_string(),
        RegionKind::Heading | RegionKind::Inserted => {
            let mut body = String::new();
            if !region.opening_terminated {
                body.push('\n');
            }
            if !list.is_empty() {
                body.push('\n');
                body.push_str(list);
            }
            if region.followed_by_heading {
                body.push('\n');
            }
            body
        }
    }
}

fn splice(contents: &str, range: &std::ops::Range<usize>, replacement: &str) -> String {
    let mut output = String::with_capacity(contents.len() + replacement.len());
    output.push_str(&contents[..range.start]);
    output.push_str(replacement);
    output.push_str(&contents[range.end..]);
    output
}
