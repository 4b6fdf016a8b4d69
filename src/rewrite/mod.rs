//! Text rewriting
//!
//! Applies resolution outcomes back onto the source text. Everything that is
//! not a rewritten URL stays byte-identical.

use memchr::memmem;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::types::{ResolutionOutcome, UrlOccurrence};

/// Every detected URL starts with this.
const SCHEME_PREFIX: &[u8] = b"http";

/// Rewrite `text` with the resolved URLs in `outcomes`.
///
/// Markdown occurrences are applied first, each replacing the first remaining
/// copy of its exact `[label](url)` span text. Bare occurrences follow, and
/// replace *every* literal copy of the URL in the text, including copies the
/// detector never reported (inside code spans, for instance). A copy that is
/// the start of a longer detected URL belongs to that URL and is left alone.
///
/// Occurrences without an outcome, or whose outcome leaves the URL as is,
/// are skipped.
pub fn rewrite(
    text: &str,
    occurrences: &[UrlOccurrence],
    outcomes: &FxHashMap<String, ResolutionOutcome>,
) -> String {
    let mut result = text.to_string();

    for occurrence in occurrences.iter().filter(|o| o.is_markdown()) {
        let Some(outcome) = changed(outcomes, occurrence) else {
            continue;
        };
        let Some(original) = occurrence.span_text(text) else {
            log::warn!("Skipping occurrence with span outside the text: {occurrence:?}");
            continue;
        };

        let label = occurrence.display_text.as_deref().unwrap_or_default();
        let replacement = format!("[{label}]({})", outcome.resolved_url);
        result = result.replacen(original, &replacement, 1);
    }

    replace_bare(&result, occurrences, outcomes)
}

/// Replace every literal copy of each changed bare URL in one left-to-right
/// scan. At each position the longest detected URL wins, so a detected URL is
/// never rewritten with the destination of a shorter one it starts with.
fn replace_bare(
    text: &str,
    occurrences: &[UrlOccurrence],
    outcomes: &FxHashMap<String, ResolutionOutcome>,
) -> String {
    let changed_bare: FxHashSet<&str> = occurrences
        .iter()
        .filter(|o| !o.is_markdown() && changed(outcomes, o).is_some())
        .map(|o| o.raw_url.as_str())
        .collect();
    if changed_bare.is_empty() {
        return text.to_string();
    }

    // Every detected URL takes part in matching; only changed bare ones are replaced
    let mut candidates: Vec<(&str, Option<&str>)> = occurrences
        .iter()
        .map(|o| o.raw_url.as_str())
        .collect::<FxHashSet<_>>()
        .into_iter()
        .map(|url| {
            let replacement = changed_bare
                .contains(url)
                .then(|| outcomes.get(url).map(|o| o.resolved_url.as_str()))
                .flatten();
            (url, replacement)
        })
        .collect();
    candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

    let mut result = String::with_capacity(text.len());
    let mut copied = 0;
    let mut cursor = 0;
    while let Some(found) = memmem::find(&text.as_bytes()[cursor..], SCHEME_PREFIX) {
        let at = cursor + found;
        let rest = &text[at..];
        match candidates.iter().find(|(url, _)| rest.starts_with(url)) {
            Some((url, replacement)) => {
                if let Some(replacement) = replacement {
                    result.push_str(&text[copied..at]);
                    result.push_str(replacement);
                    copied = at + url.len();
                }
                cursor = at + url.len();
            }
            None => cursor = at + SCHEME_PREFIX.len(),
        }
    }
    result.push_str(&text[copied..]);

    result
}

fn changed<'a>(
    outcomes: &'a FxHashMap<String, ResolutionOutcome>,
    occurrence: &UrlOccurrence,
) -> Option<&'a ResolutionOutcome> {
    outcomes
        .get(&occurrence.raw_url)
        .filter(|outcome| outcome.changes_url())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::discovery::{Detect, UrlDetector};

    fn outcomes(pairs: &[(&str, &str)]) -> FxHashMap<String, ResolutionOutcome> {
        pairs
            .iter()
            .map(|(from, to)| (from.to_string(), ResolutionOutcome::resolved(from, *to)))
            .collect()
    }

    fn rewrite_detected(text: &str, map: &FxHashMap<String, ResolutionOutcome>) -> String {
        let occurrences = UrlDetector::default().detect(text);
        rewrite(text, &occurrences, map)
    }

    #[test]
    fn test_rewrite__markdown_and_bare() {
        let text = "Check [this](https://bit.ly/abc) and https://bit.ly/xyz now";
        let map = outcomes(&[
            ("https://bit.ly/abc", "https://example.com/a"),
            ("https://bit.ly/xyz", "https://example.com/b"),
        ]);

        assert_eq!(
            rewrite_detected(text, &map),
            "Check [this](https://example.com/a) and https://example.com/b now"
        );
    }

    #[test]
    fn test_rewrite__no_outcomes_is_identity() {
        let text = "[a](https://bit.ly/a)\n\thttps://bit.ly/b  \r\n";
        assert_eq!(rewrite_detected(text, &FxHashMap::default()), text);
    }

    #[test]
    fn test_rewrite__unresolved_is_skipped() {
        let text = "see https://bit.ly/a";
        let mut map = FxHashMap::default();
        map.insert(
            "https://bit.ly/a".to_string(),
            ResolutionOutcome::unresolved("https://bit.ly/a"),
        );

        assert_eq!(rewrite_detected(text, &map), text);
    }

    #[test]
    fn test_rewrite__repeated_markdown_links() {
        let text = "[x](https://bit.ly/a) then [x](https://bit.ly/a) and [y](https://bit.ly/a)";
        let map = outcomes(&[("https://bit.ly/a", "https://example.com")]);

        assert_eq!(
            rewrite_detected(text, &map),
            "[x](https://example.com) then [x](https://example.com) and [y](https://example.com)"
        );
    }

    #[test]
    fn test_rewrite__bare_replaces_every_literal_copy() {
        // The copy inside backticks is not detected but still rewritten
        let text = "https://bit.ly/a and `curl https://bit.ly/a`";
        let map = outcomes(&[("https://bit.ly/a", "https://example.com")]);

        assert_eq!(
            rewrite_detected(text, &map),
            "https://example.com and `curl https://example.com`"
        );
    }

    #[test]
    fn test_rewrite__resolved_url_extending_original_applied_once() {
        let text = "https://bit.ly/a https://bit.ly/a";
        let map = outcomes(&[("https://bit.ly/a", "https://bit.ly/a/landing")]);

        assert_eq!(
            rewrite_detected(text, &map),
            "https://bit.ly/a/landing https://bit.ly/a/landing"
        );
    }

    #[test]
    fn test_rewrite__shared_prefix_urls_keep_their_own_destination() {
        let text = "https://bit.ly/a and https://bit.ly/ab";
        let map = outcomes(&[
            ("https://bit.ly/a", "https://one.example/"),
            ("https://bit.ly/ab", "https://two.example/"),
        ]);

        assert_eq!(
            rewrite_detected(text, &map),
            "https://one.example/ and https://two.example/"
        );
    }

    #[test]
    fn test_rewrite__unresolved_longer_url_is_not_touched() {
        let text = "https://bit.ly/a https://bit.ly/ab and [l](https://bit.ly/abc)";
        let mut map = outcomes(&[("https://bit.ly/a", "https://one.example/")]);
        map.insert(
            "https://bit.ly/ab".to_string(),
            ResolutionOutcome::unresolved("https://bit.ly/ab"),
        );

        assert_eq!(
            rewrite_detected(text, &map),
            "https://one.example/ https://bit.ly/ab and [l](https://bit.ly/abc)"
        );
    }

    #[test]
    fn test_rewrite__markdown_to_same_url_is_noop() {
        let text = "[same](https://bit.ly/a)";
        let map = outcomes(&[("https://bit.ly/a", "https://bit.ly/a")]);

        assert_eq!(rewrite_detected(text, &map), text);
    }

    #[test]
    fn test_rewrite__preserves_surrounding_bytes() {
        let text = "  héllo\r\n[l](https://bit.ly/a)\u{00a0}end\n";
        let map = outcomes(&[("https://bit.ly/a", "https://example.com/é")]);

        assert_eq!(
            rewrite_detected(text, &map),
            "  héllo\r\n[l](https://example.com/é)\u{00a0}end\n"
        );
    }
}
