/// One physical line of a document, borrowed from the source text.
///
/// `start..end` covers the line including its terminator, so consecutive
/// records tile the whole document without gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub literal: bool,
}

impl LineRecord<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub fn split_lines(contents: &str) -> Vec<LineRecord<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0usize;

    for segment in contents.split_inclusive('\n') {
        let mut text = segment.strip_suffix('\n').unwrap_or(segment);
        if let Some(stripped) = text.strip_suffix('\r') {
            text = stripped;
        }

        lines.push(LineRecord {
            text,
            start: offset,
            end: offset + segment.len(),
            literal: false,
        });

        offset += segment.len();
    }

    lines
}
