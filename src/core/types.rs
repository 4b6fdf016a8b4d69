use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::path::Path;

/// How a URL appeared in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccurrenceKind {
    /// Inside a Markdown link, `[label](url)`
    Markdown,
    /// A standalone token delimited by whitespace
    Bare,
}

impl fmt::Display for OccurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Bare => write!(f, "bare"),
        }
    }
}

/// A URL found in a text, with the byte span of the construct it came from.
///
/// For Markdown occurrences the span covers the whole `[label](url)`; for bare
/// occurrences it covers the URL token only. `span_end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlOccurrence {
    /// The URL exactly as written
    pub raw_url: String,
    /// Markdown link or bare token
    pub kind: OccurrenceKind,
    /// Link label for Markdown occurrences
    pub display_text: Option<String>,
    /// Byte offset where the construct starts
    pub span_start: usize,
    /// Byte offset one past the end of the construct
    pub span_end: usize,
}

impl UrlOccurrence {
    pub fn markdown(raw_url: &str, label: &str, span: Range<usize>) -> Self {
        Self {
            raw_url: raw_url.to_string(),
            kind: OccurrenceKind::Markdown,
            display_text: Some(label.to_string()),
            span_start: span.start,
            span_end: span.end,
        }
    }

    pub fn bare(raw_url: &str, span: Range<usize>) -> Self {
        Self {
            raw_url: raw_url.to_string(),
            kind: OccurrenceKind::Bare,
            display_text: None,
            span_start: span.start,
            span_end: span.end,
        }
    }

    pub fn span(&self) -> Range<usize> {
        self.span_start..self.span_end
    }

    /// The literal text of the construct within `text`.
    pub fn span_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.span())
    }

    pub fn is_markdown(&self) -> bool {
        self.kind == OccurrenceKind::Markdown
    }

    pub fn overlaps(&self, other: &UrlOccurrence) -> bool {
        self.span_start < other.span_end && other.span_start < self.span_end
    }
}

/// Result of resolving one URL.
///
/// `resolved == false` always comes with `resolved_url == original_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionOutcome {
    pub original_url: String,
    pub resolved_url: String,
    pub resolved: bool,
}

impl ResolutionOutcome {
    pub fn resolved(original_url: &str, resolved_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.to_string(),
            resolved_url: resolved_url.into(),
            resolved: true,
        }
    }

    pub fn unresolved(original_url: &str) -> Self {
        Self {
            original_url: original_url.to_string(),
            resolved_url: original_url.to_string(),
            resolved: false,
        }
    }

    /// Whether applying this outcome would change the text.
    pub fn changes_url(&self) -> bool {
        self.resolved && self.resolved_url != self.original_url
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.resolved {
            write!(f, "{} → {}", self.original_url, self.resolved_url)
        } else {
            write!(f, "{} (unresolved)", self.original_url)
        }
    }
}

/// Structured result of processing one file. Never an error: failures are
/// carried in `error` with `success == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn success<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Self {
        Self {
            success: true,
            input_path: Some(input.as_ref().display().to_string()),
            output_path: Some(output.as_ref().display().to_string()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            input_path: None,
            output_path: None,
            error: Some(error.into()),
        }
    }
}
