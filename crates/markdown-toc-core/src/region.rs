use std::ops::Range;

use markdown_toc_headings::{LineRecord, Outline};
use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::options::TocOptions;

/// Where the table of contents lives in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionKind {
    /// Between a start and end marker comment.
    Markers,
    /// The body of a heading such as "Table of Contents".
    Heading,
    /// No TOC existed and a new one was added.
    Inserted,
}

impl RegionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionKind::Markers => "markers",
            RegionKind::Heading => "heading",
            RegionKind::Inserted => "inserted",
        }
    }
}

/// A link already present inside a TOC region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExistingEntry {
    pub text: String,
    pub anchor: String,
    pub line: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct TocRegion {
    pub kind: RegionKind,
    pub replace: Range<usize>,
    pub followed_by_heading: bool,
    pub opening_terminated: bool,
}

/// Index of the first heading whose text names a table of contents.
pub(crate) fn find_toc_heading(outline: &Outline<'_>, options: &TocOptions) -> Option<usize> {
    outline
        .headings
        .iter()
        .position(|heading| options.heading.is_match(&heading.text))
}

pub(crate) fn locate_markers(outline: &Outline<'_>, options: &TocOptions) -> Option<TocRegion> {
    let mut start: Option<&LineRecord<'_>> = None;

    for line in outline.lines.iter().filter(|line| !line.literal) {
        let trimmed = line.text.trim();
        match start {
            None if trimmed == options.start_marker => start = Some(line),
            Some(opening) if trimmed == options.end_marker => {
                return Some(TocRegion {
                    kind: RegionKind::Markers,
                    replace: opening.end..line.start,
                    followed_by_heading: false,
                    opening_terminated: true,
                });
            }
            _ => {}
        }
    }

    None
}

pub(crate) fn heading_section(
    outline: &Outline<'_>,
    heading_index: usize,
    contents: &str,
) -> TocRegion {
    let heading = &outline.headings[heading_index];
    let next = outline.headings.get(heading_index + 1);

    TocRegion {
        kind: RegionKind::Heading,
        replace: heading.byte_range.end..next.map_or(contents.len(), |next| next.byte_range.start),
        followed_by_heading: next.is_some(),
        opening_terminated: contents[..heading.byte_range.end].ends_with('\n'),
    }
}

pub(crate) fn existing_entries(outline: &Outline<'_>, range: &Range<usize>) -> Vec<ExistingEntry> {
    outline
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.start >= range.start && line.start < range.end)
        .filter_map(|(idx, line)| parse_entry(line.text, idx + 1))
        .collect()
}

fn parse_entry(line: &str, line_number: usize) -> Option<ExistingEntry> {
    let trimmed = line.trim_start();
    let after_marker = strip_list_marker(trimmed)?.trim_start();
    if !after_marker.starts_with('[') {
        return None;
    }

    let end_text = after_marker.find("](")?;
    let text = after_marker[1..end_text].trim().to_string();
    let remaining = &after_marker[end_text + 2..];
    let end_paren = remaining.find(')')?;
    let target = remaining[..end_paren].trim();
    let fragment = target.strip_prefix('#')?;

    Some(ExistingEntry {
        text,
        anchor: normalize_anchor_fragment(fragment),
        line: line_number,
    })
}

fn strip_list_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix(['-', '*', '+']) {
        return Some(rest);
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(['.', ')'])
}

fn normalize_anchor_fragment(fragment: &str) -> String {
    percent_decode_str(fragment)
        .decode_utf8_lossy()
        .trim()
        .to_lowercase()
}
