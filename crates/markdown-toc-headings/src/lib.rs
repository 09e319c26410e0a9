//! Line-oriented markdown heading scanner used by the TOC updater.
//!
//! Scanning never fails: anything that is not recognisably a heading is left
//! alone. Lines inside YAML front matter, fenced code blocks and indented code
//! blocks are flagged `literal` and never produce headings.

mod heading;
mod line;
mod slug;

pub use heading::{normalize_heading_text, Heading, HeadingKind};
pub use line::LineRecord;
pub use slug::{slugify, Slugger};

use heading::{detect_heading, leading_indent_width};
use line::split_lines;

/// Every line of a document plus the headings found among them.
#[derive(Debug, Clone)]
pub struct Outline<'a> {
    pub lines: Vec<LineRecord<'a>>,
    pub headings: Vec<Heading>,
}

pub fn scan(contents: &str) -> Outline<'_> {
    let mut lines = split_lines(contents);

    let mut front_matter = FrontMatterState::default();
    let mut code_blocks = CodeBlockTracker::default();
    for (idx, line) in lines.iter_mut().enumerate() {
        if front_matter.consume(idx, line.text) || code_blocks.process(line.text) {
            line.literal = true;
        }
    }

    let mut headings = Vec::new();
    let mut skip_through: Option<usize> = None;
    for idx in 0..lines.len() {
        if skip_through.is_some_and(|end| idx <= end) || lines[idx].literal {
            continue;
        }

        if let Some(detected) = detect_heading(&lines, idx) {
            let end_idx = *detected.line_range.end();
            if end_idx > idx {
                skip_through = Some(end_idx);
            }
            headings.push(detected.heading);
        }
    }

    Outline { lines, headings }
}

#[derive(Default)]
struct FrontMatterState {
    active: bool,
    done: bool,
}

impl FrontMatterState {
    fn consume(&mut self, index: usize, text: &str) -> bool {
        if self.done {
            return false;
        }

        let trimmed = text.trim();

        if index == 0 && trimmed == "---" {
            self.active = true;
            return true;
        }

        if self.active {
            if trimmed == "---" || trimmed == "..." {
                self.active = false;
                self.done = true;
            }
            return true;
        }

        self.done = true;
        false
    }
}

#[derive(Default)]
struct CodeBlockTracker {
    fenced: Option<FencedBlock>,
    indented_active: bool,
    previous_blank: bool,
}

#[derive(Clone, Copy)]
struct FencedBlock {
    fence_char: char,
    fence_len: usize,
}

impl CodeBlockTracker {
    fn process(&mut self, line: &str) -> bool {
        let is_blank = line.trim().is_empty();
        let literal = self.classify(line, is_blank);
        self.previous_blank = is_blank;
        literal
    }

    fn classify(&mut self, line: &str, is_blank: bool) -> bool {
        if let Some(fence) = self.fenced {
            if is_closing_fence(line, fence) {
                self.fenced = None;
            }
            return true;
        }

        if let Some(fence) = detect_fence_start(line) {
            self.indented_active = false;
            self.fenced = Some(fence);
            return true;
        }

        let is_indented = !is_blank && leading_indent_width(line) >= 4;

        if self.indented_active {
            if is_blank || is_indented {
                return true;
            }
            self.indented_active = false;
            return false;
        }

        // Indented lines directly under a paragraph or list item are continuations.
        if is_indented && self.previous_blank {
            self.indented_active = true;
            return true;
        }

        false
    }
}

fn detect_fence_start(line: &str) -> Option<FencedBlock> {
    let (indent_width, rest) = split_indent(line);
    if indent_width > 3 {
        return None;
    }

    let first = rest.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = rest.chars().take_while(|ch| *ch == first).count();
    if count < 3 {
        return None;
    }

    if first == '`' && rest[count..].contains('`') {
        return None;
    }

    Some(FencedBlock {
        fence_char: first,
        fence_len: count,
    })
}

fn is_closing_fence(line: &str, fence: FencedBlock) -> bool {
    let (indent_width, rest) = split_indent(line);
    if indent_width > 3 {
        return false;
    }

    let trimmed = rest.trim_end();
    !trimmed.is_empty()
        && trimmed.chars().all(|ch| ch == fence.fence_char)
        && trimmed.len() >= fence.fence_len
}

fn split_indent(line: &str) -> (usize, &str) {
    let rest = line.trim_start_matches([' ', '\t']);
    (leading_indent_width(line), rest)
}
