use memchr::memmem;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::core::types::UrlOccurrence;

/// `[label](http(s)://...)`, label without nested brackets.
const MARKDOWN_LINK_PATTERN: &str = r#"\[([^\]]+)\]\((https?://[^\s<>"'()]+)\)"#;

static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(MARKDOWN_LINK_PATTERN).expect("Failed to compile Markdown link pattern")
});

const SCHEMES: [&str; 2] = ["http://", "https://"];

/// Characters that terminate a URL.
fn is_excluded(c: char) -> bool {
    matches!(c, '<' | '>' | '"' | '\'' | '(' | ')')
}

pub trait Detect {
    fn detect(&self, text: &str) -> Vec<UrlOccurrence>;
}

/// Finds Markdown links and bare URLs in text.
///
/// Occurrences come back Markdown first, then bare, each class in text order.
/// A bare URL touching any part of a Markdown link's span is dropped, so no
/// two occurrences overlap.
///
/// Known imprecision: punctuation outside `<>"'()` that directly follows a
/// URL is part of it, so `https://bit.ly/x,` keeps its comma and a trailing
/// `.` ends up in the URL as well.
#[derive(Default, Debug)]
pub struct UrlDetector {}

impl Detect for UrlDetector {
    fn detect(&self, text: &str) -> Vec<UrlOccurrence> {
        // Fast path: nothing resembling a URL scheme
        if memmem::find(text.as_bytes(), b"http").is_none() {
            return Vec::new();
        }

        let markdown = Self::find_markdown_links(text);
        let bare: Vec<UrlOccurrence> = Self::find_bare_urls(text)
            .into_iter()
            .filter(|bare| {
                !markdown.iter().any(|link| link.overlaps(bare))
            })
            .collect();

        let mut occurrences = markdown;
        occurrences.extend(bare);
        occurrences
    }
}

impl UrlDetector {
    fn find_markdown_links(text: &str) -> Vec<UrlOccurrence> {
        MARKDOWN_LINK
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let label = caps.get(1)?;
                let url = caps.get(2)?;
                Some(UrlOccurrence::markdown(
                    url.as_str(),
                    label.as_str(),
                    whole.range(),
                ))
            })
            .collect()
    }

    /// Whitespace-delimited tokens that are entirely a URL.
    fn find_bare_urls(text: &str) -> Vec<UrlOccurrence> {
        Self::tokens(text)
            .filter(|(_, token)| Self::is_bare_url(token))
            .map(|(start, token)| UrlOccurrence::bare(token, start..start + token.len()))
            .collect()
    }

    fn is_bare_url(token: &str) -> bool {
        SCHEMES.iter().any(|scheme| {
            token
                .strip_prefix(scheme)
                .is_some_and(|rest| !rest.is_empty())
        }) && !token.chars().any(is_excluded)
    }

    /// Maximal runs of non-whitespace, with their byte offsets.
    fn tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
        let mut start = None;
        let mut chars = text.char_indices().chain(std::iter::once((text.len(), ' ')));

        std::iter::from_fn(move || {
            for (idx, c) in chars.by_ref() {
                match (start, c.is_whitespace()) {
                    (None, false) => start = Some(idx),
                    (Some(token_start), true) => {
                        start = None;
                        return Some((token_start, &text[token_start..idx]));
                    }
                    _ => {}
                }
            }
            None
        })
    }
}

/// URL values of `occurrences` in first-seen order, each once.
pub fn unique_urls(occurrences: &[UrlOccurrence]) -> Vec<String> {
    let mut seen = FxHashSet::with_capacity_and_hasher(occurrences.len(), Default::default());
    occurrences
        .iter()
        .filter(|occurrence| seen.insert(occurrence.raw_url.as_str()))
        .map(|occurrence| occurrence.raw_url.clone())
        .collect()
}
