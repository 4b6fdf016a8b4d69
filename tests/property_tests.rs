//! Property-based tests for urlexpander using proptest
//!
//! These tests generate random documents to check that detection and
//! rewriting never disturb text they have no business touching.

use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::Arc;
use urlexpander::expansion::Resolve;
use urlexpander::{
    Detect, ExpansionConfig, Expander, ResolutionOutcome, ShortenerRegistry, UrlDetector,
};

/// Maps every URL it is asked about onto a stable non-shortener destination.
struct DeterministicResolver;

#[async_trait]
impl Resolve for DeterministicResolver {
    async fn resolve(&self, url: &str) -> ResolutionOutcome {
        let slug: String = url
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        ResolutionOutcome::resolved(url, format!("https://expanded.example/{slug}"))
    }
}

fn expander() -> Expander {
    Expander::builder(ExpansionConfig::default())
        .resolver(Arc::new(DeterministicResolver))
        .build()
        .expect("engine should build")
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
        .block_on(future)
}

/// URLs on hosts no registry entry can match
fn plain_url_strategy() -> impl Strategy<Value = String> {
    (r"[a-z]{3,10}", prop::collection::vec(r"[a-z0-9]{1,8}", 0..4)).prop_map(
        |(domain, path)| format!("https://{domain}.example/{}", path.join("/")),
    )
}

fn shortened_url_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("bit.ly"), Just("tinyurl.com"), Just("t.co"), Just("goo.gl")],
        r"[A-Za-z0-9]{1,8}",
    )
        .prop_map(|(host, code)| format!("https://{host}/{code}"))
}

fn word_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        r"[a-zA-Z]{1,12}",
        Just("#".to_string()),
        Just("`code`".to_string()),
        Just("héllo".to_string()),
        Just("(aside)".to_string()),
    ]
}

/// A piece of a document: a word, a bare URL or a Markdown link
fn fragment_strategy(url: BoxedStrategy<String>) -> impl Strategy<Value = String> {
    prop_oneof![
        3 => word_strategy(),
        1 => url.clone(),
        1 => (r"[a-z ]{1,10}", url).prop_map(|(label, url)| format!("[{label}]({url})")),
    ]
}

fn document_strategy(url: BoxedStrategy<String>) -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            fragment_strategy(url),
            // An empty separator glues neighbours into one token
            prop_oneof![4 => Just(" "), 1 => Just("\n"), 1 => Just("  "), 1 => Just("\t"), 1 => Just("")],
        ),
        0..20,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(fragment, sep)| format!("{fragment}{sep}"))
            .collect()
    })
}

fn mixed_url_strategy() -> BoxedStrategy<String> {
    prop_oneof![plain_url_strategy(), shortened_url_strategy()].boxed()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_documents_without_shorteners_are_unchanged(
        text in document_strategy(plain_url_strategy().boxed())
    ) {
        let registry = ShortenerRegistry::default();
        let occurrences = UrlDetector::default().detect(&text);
        prop_assume!(occurrences.iter().all(|o| !registry.is_shortened(&o.raw_url)));

        let expanded = block_on(expander().process_text(&text));
        prop_assert_eq!(expanded, text);
    }

    #[test]
    fn test_occurrences_never_overlap(text in document_strategy(mixed_url_strategy())) {
        let occurrences = UrlDetector::default().detect(&text);

        for (i, a) in occurrences.iter().enumerate() {
            prop_assert!(a.span_text(&text).is_some());
            for b in occurrences.iter().skip(i + 1) {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_occurrence_spans_point_at_their_urls(text in document_strategy(mixed_url_strategy())) {
        for occurrence in UrlDetector::default().detect(&text) {
            let span = occurrence.span_text(&text).unwrap_or_default();
            if occurrence.is_markdown() {
                let expected_suffix = format!("({})", occurrence.raw_url);
                prop_assert!(span.starts_with('['));
                prop_assert!(span.ends_with(&expected_suffix));
            } else {
                prop_assert_eq!(span, occurrence.raw_url.as_str());
            }
        }
    }

    #[test]
    fn test_pipeline_is_idempotent(text in document_strategy(mixed_url_strategy())) {
        let expander = expander();
        let (once, twice) = block_on(async {
            let once = expander.process_text(&text).await;
            let twice = expander.process_text(&once).await;
            (once, twice)
        });

        prop_assert_eq!(twice, once);
    }

    #[test]
    fn test_expanded_documents_keep_no_shortened_occurrence(
        text in document_strategy(shortened_url_strategy().boxed())
    ) {
        let registry = ShortenerRegistry::default();
        let expanded = block_on(expander().process_text(&text));

        for occurrence in UrlDetector::default().detect(&expanded) {
            prop_assert!(!registry.is_shortened(&occurrence.raw_url));
        }
    }
}
