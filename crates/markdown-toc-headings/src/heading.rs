use crate::line::LineRecord;
use pulldown_cmark::{Event, Options, Parser, Tag};
use std::ops::{Range, RangeInclusive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    Atx,
    Setext,
}

/// A heading found in a document.
///
/// `byte_range` spans every line of the heading (both lines for setext)
/// including the final line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub depth: usize,
    pub text: String,
    pub kind: HeadingKind,
    pub byte_range: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct DetectedHeading {
    pub heading: Heading,
    pub line_range: RangeInclusive<usize>,
}

pub(crate) fn detect_heading(lines: &[LineRecord<'_>], index: usize) -> Option<DetectedHeading> {
    detect_atx_heading(lines, index).or_else(|| detect_setext_heading(lines, index))
}

fn detect_atx_heading(lines: &[LineRecord<'_>], index: usize) -> Option<DetectedHeading> {
    let line = lines.get(index)?;
    if leading_indent_width(line.text) > 3 {
        return None;
    }

    let trimmed_start = line.text.trim_start();
    let pound_count = trimmed_start.chars().take_while(|ch| *ch == '#').count();
    if pound_count == 0 || pound_count > 6 {
        return None;
    }

    let after_hashes = &trimmed_start[pound_count..];
    if !after_hashes.is_empty() && !after_hashes.starts_with(char::is_whitespace) {
        return None;
    }

    let mut content = after_hashes.trim();
    let stripped_hashes = content.trim_end_matches('#');
    if stripped_hashes.is_empty() {
        content = "";
    } else if stripped_hashes.len() < content.len() && stripped_hashes.ends_with(char::is_whitespace)
    {
        content = stripped_hashes.trim_end();
    }

    Some(DetectedHeading {
        heading: build_heading(pound_count, content, HeadingKind::Atx, line, line, index),
        line_range: index..=index,
    })
}

fn detect_setext_heading(lines: &[LineRecord<'_>], index: usize) -> Option<DetectedHeading> {
    let line = lines.get(index)?;
    let next = lines.get(index + 1)?;

    if next.literal || leading_indent_width(line.text) > 3 || line.is_blank() {
        return None;
    }

    // List items and block quotes cannot be setext content.
    if starts_container(line.text) {
        return None;
    }

    if leading_indent_width(next.text) > 3 {
        return None;
    }

    let depth = match_setext_depth(next.text)?;

    Some(DetectedHeading {
        heading: build_heading(depth, line.text.trim(), HeadingKind::Setext, line, next, index),
        line_range: index..=index + 1,
    })
}

fn build_heading(
    depth: usize,
    raw: &str,
    kind: HeadingKind,
    first: &LineRecord<'_>,
    last: &LineRecord<'_>,
    index: usize,
) -> Heading {
    Heading {
        depth,
        text: normalize_heading_text(raw),
        kind,
        byte_range: first.start..last.end,
        line: index + 1,
    }
}

fn match_setext_depth(line: &str) -> Option<usize> {
    let trimmed = line.trim();
    let fence_char = trimmed.chars().next()?;
    if fence_char != '=' && fence_char != '-' {
        return None;
    }

    if !trimmed.chars().all(|ch| ch == fence_char) {
        return None;
    }

    if fence_char == '-' && trimmed.len() < 3 {
        return None;
    }

    Some(if fence_char == '=' { 1 } else { 2 })
}

fn starts_container(text: &str) -> bool {
    let trimmed = text.trim_start();
    if trimmed.starts_with('>') {
        return true;
    }

    let mut chars = trimmed.chars();
    match chars.next() {
        Some('-' | '*' | '+') => matches!(chars.next(), None | Some(' ' | '\t')),
        Some(first) if first.is_ascii_digit() => {
            let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
            let rest = &trimmed[digits..];
            digits <= 9
                && (rest.starts_with(". ") || rest.starts_with(") ") || rest == "." || rest == ")")
        }
        _ => false,
    }
}

/// Reduce inline markdown to the plain text a reader sees, collapsing runs of
/// whitespace to single spaces.
///
/// The text is parsed as the content of an ATX heading so a leading `1.`,
/// `-` or `>` stays text instead of opening a list or block quote. The
/// trailing ` #` is a closing sequence that shields hashes ending the text.
pub fn normalize_heading_text(input: &str) -> String {
    let wrapped = format!("# {} #", input.trim());
    let mut text = String::new();
    let mut in_heading = false;

    for event in Parser::new_ext(&wrapped, Options::empty()) {
        match event {
            Event::Start(Tag::Heading(..)) => in_heading = true,
            Event::End(Tag::Heading(..)) => in_heading = false,
            Event::Text(cow) | Event::Code(cow) if in_heading => text.push_str(&cow),
            Event::SoftBreak | Event::HardBreak if in_heading => text.push(' '),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn leading_indent_width(line: &str) -> usize {
    let mut width = 0usize;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}
