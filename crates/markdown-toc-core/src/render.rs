use markdown_toc_headings::Heading;
use serde::Serialize;

use crate::options::TocOptions;

/// One rendered TOC line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocItem {
    pub depth: usize,
    pub indent: usize,
    pub text: String,
    pub anchor: String,
}

/// Build items for `headings` (already filtered and in document order).
///
/// Nesting follows heading depth relative to the shallowest entry, but an
/// item is never more than one level deeper than the item before it.
pub(crate) fn generate_items<'h, I>(entries: I) -> Vec<TocItem>
where
    I: IntoIterator<Item = (&'h Heading, String)>,
{
    let entries: Vec<_> = entries.into_iter().collect();
    let Some(base) = entries.iter().map(|(heading, _)| heading.depth).min() else {
        return Vec::new();
    };

    let mut previous: Option<usize> = None;
    entries
        .into_iter()
        .map(|(heading, anchor)| {
            let ceiling = previous.map_or(0, |indent| indent + 1);
            let indent = (heading.depth - base).min(ceiling);
            previous = Some(indent);
            TocItem {
                depth: heading.depth,
                indent,
                text: heading.text.clone(),
                anchor,
            }
        })
        .collect()
}

pub(crate) fn render_items(items: &[TocItem], options: &TocOptions) -> String {
    let mut output = String::new();
    let mut counters: Vec<usize> = Vec::new();
    let indent_width = if options.ordered { 3 } else { 2 };

    for (idx, item) in items.iter().enumerate() {
        if idx > 0 && !options.tight {
            output.push('\n');
        }

        let marker = if options.ordered {
            counters.truncate(item.indent + 1);
            if counters.len() == item.indent {
                counters.push(0);
            }
            counters[item.indent] += 1;
            format!("{}.", counters[item.indent])
        } else {
            "-".to_string()
        };

        output.push_str(&" ".repeat(item.indent * indent_width));
        output.push_str(&format!(
            "{marker} [{}](#{}{})\n",
            escape_link_text(&item.text),
            options.prefix,
            item.anchor
        ));
    }

    output
}

fn escape_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_toc_headings::HeadingKind;
    use pretty_assertions::assert_eq;

    fn heading(depth: usize, text: &str) -> Heading {
        Heading {
            depth,
            text: text.to_string(),
            kind: HeadingKind::Atx,
            byte_range: 0..0,
            line: 1,
        }
    }

    fn items(specs: &[(usize, &str)]) -> Vec<TocItem> {
        let headings: Vec<_> = specs.iter().map(|(d, t)| heading(*d, t)).collect();
        generate_items(
            headings
                .iter()
                .map(|h| (h, markdown_toc_headings::slugify(&h.text))),
        )
    }

    #[test]
    fn skipped_levels_nest_one_step_at_a_time() {
        let generated = items(&[(2, "A"), (4, "Deep"), (3, "Mid"), (2, "B")]);
        let indents: Vec<_> = generated.iter().map(|item| item.indent).collect();
        assert_eq!(indents, vec![0, 1, 1, 0]);
    }

    #[test]
    fn first_item_is_never_indented() {
        let generated = items(&[(3, "Late"), (2, "Early")]);
        assert_eq!(generated[0].indent, 0);
        assert_eq!(generated[1].indent, 0);
    }

    #[test]
    fn tight_and_loose_spacing() {
        let generated = items(&[(2, "A"), (3, "A.1"), (2, "B")]);
        let tight = TocOptions::default().with_tight(true);
        assert_eq!(
            render_items(&generated, &tight),
            "- [A](#a)\n  - [A.1](#a1)\n- [B](#b)\n"
        );

        let loose = TocOptions::default().with_tight(false);
        assert_eq!(
            render_items(&generated, &loose),
            "- [A](#a)\n\n  - [A.1](#a1)\n\n- [B](#b)\n"
        );
    }

    #[test]
    fn ordered_lists_number_per_level() {
        let generated = items(&[(2, "A"), (3, "A1"), (3, "A2"), (2, "B"), (3, "B1")]);
        let options = TocOptions {
            ordered: true,
            tight: true,
            prefix: "user-content-".into(),
            ..TocOptions::default()
        };
        assert_eq!(
            render_items(&generated, &options),
            "1. [A](#user-content-a)\n   1. [A1](#user-content-a1)\n   2. [A2](#user-content-a2)\n2. [B](#user-content-b)\n   1. [B1](#user-content-b1)\n"
        );
    }

    #[test]
    fn brackets_in_heading_text_are_escaped() {
        let generated = items(&[(2, "Array[T] \\ slices")]);
        let options = TocOptions::default().with_tight(true);
        assert_eq!(
            render_items(&generated, &options),
            "- [Array\\[T\\] \\\\ slices](#arrayt--slices)\n"
        );
    }
}
