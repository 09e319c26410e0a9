use std::collections::HashMap;

/// Convert heading text into the anchor GitHub generates for it.
///
/// Letters, digits, `_` and `-` are kept (lowercased), every space becomes a
/// `-`, and everything else is dropped. Dashes are neither merged nor trimmed,
/// so `Foo - Bar` becomes `foo---bar`.
pub fn slugify(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter_map(|ch| match ch {
            ' ' => Some('-'),
            '-' | '_' => Some(ch),
            _ if ch.is_alphanumeric() => Some(ch),
            _ => None,
        })
        .collect()
}

/// Hands out unique slugs for one document, suffixing repeats with `-1`, `-2`, ...
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut candidate = base.clone();

        while self.seen.contains_key(&candidate) {
            let count = self.seen.entry(base.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{base}-{count}");
        }

        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}
