// crates/stylescope-core/src/paren.rs
//
// Parenthetical-span style analysis.
//
// Finds every balanced `( ... )` span, nested ones included, and measures how
// often and where an author opens an aside: density per thousand words, span
// lengths in words, a positional histogram, and a context snippet per span.
// All offsets are in characters, not bytes.

use serde::{Deserialize, Serialize};

use crate::error::StyleScopeError;

/// Histogram buckets when a request does not say.
pub const DEFAULT_BINS: i64 = 20;
/// Requested bucket counts are clamped into `1..=MAX_BINS`.
pub const MAX_BINS: i64 = 200;
/// Characters of context kept on each side of a span.
pub const DEFAULT_WINDOW: usize = 50;
/// Spans beyond this many are counted but not listed.
pub const MAX_LISTED_SPANS: usize = 500;

fn default_window() -> usize {
    DEFAULT_WINDOW
}

/// One balanced parenthetical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenSpan {
    /// 1-based, in the order the closing parenthesis was seen.
    pub id: usize,
    /// Text between the parentheses.
    pub inner: String,
    /// Offset of `(`.
    pub start: usize,
    /// Offset just past `)`.
    pub end: usize,
}

/// Every balanced span in `text`, ordered by opening offset.
///
/// Unmatched `(` and `)` are ignored. An inner span closes first and so gets
/// the smaller id.
pub fn extract_spans(text: &str) -> Vec<ParenSpan> {
    let chars: Vec<char> = text.chars().collect();
    let mut open: Vec<usize> = Vec::new();
    let mut spans = Vec::new();
    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            '(' => open.push(i),
            ')' => {
                if let Some(start) = open.pop() {
                    spans.push(ParenSpan {
                        id: spans.len() + 1,
                        inner: chars[start + 1..i].iter().collect(),
                        start,
                        end: i + 1,
                    });
                }
            }
            _ => {}
        }
    }
    spans.sort_by_key(|s| s.start);
    spans
}

/// The span plus up to `window` characters either side, newline runs
/// collapsed to one space.
pub fn context(chars: &[char], span: &ParenSpan, window: usize) -> String {
    let from = span.start.saturating_sub(window);
    let to = span.end.saturating_add(window).min(chars.len());
    let mut out = String::with_capacity(to - from);
    let mut in_newlines = false;
    for &ch in &chars[from..to] {
        if ch == '\n' {
            if !in_newlines {
                out.push(' ');
            }
            in_newlines = true;
        } else {
            out.push(ch);
            in_newlines = false;
        }
    }
    out
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Upper median: the element at `len / 2` after sorting. Zero when empty.
pub fn median(values: &[usize]) -> usize {
    percentile(values, 50.0)
}

/// Nearest-rank percentile without interpolation. Zero when empty.
pub fn percentile(values: &[usize], p: f64) -> usize {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let idx = ((p / 100.0) * sorted.len() as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Span counts by where each span opens, over equal slices of the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Right edge of each bucket as a fraction of the text, `(i + 1) / n`.
    pub x: Vec<f64>,
    pub y: Vec<usize>,
}

pub fn clamp_bins(bins: i64) -> usize {
    bins.clamp(1, MAX_BINS) as usize
}

pub fn histogram(spans: &[ParenSpan], text_len: usize, bins: i64) -> Histogram {
    let n = clamp_bins(bins);
    let mut y = vec![0; n];
    if text_len > 0 {
        for span in spans {
            let bucket = (span.start as f64 / text_len as f64 * n as f64).floor() as usize;
            y[bucket.min(n - 1)] += 1;
        }
    }
    let x = (1..=n).map(|i| i as f64 / n as f64).collect();
    Histogram { x, y }
}

/// Input to `analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    /// Histogram buckets, clamped into `1..=200`.
    #[serde(default)]
    pub bins: Option<i64>,
    /// Context characters on each side of a listed span.
    #[serde(default = "default_window")]
    pub window: usize,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bins: None,
            window: DEFAULT_WINDOW,
        }
    }

    pub fn run(&self) -> Result<AnalyzeReport, StyleScopeError> {
        analyze(&self.text, self.bins.unwrap_or(DEFAULT_BINS), self.window)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanReport {
    pub id: usize,
    pub text: String,
    pub context: String,
    pub start_index: usize,
    /// Words inside the parentheses.
    pub tokens: usize,
    /// `start_index / text length`, in `[0, 1)`.
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeReport {
    pub word_count: usize,
    /// Every span found, listed or not.
    pub num_spans: usize,
    /// Spans per thousand words, rounded to two decimals.
    pub per1k: f64,
    pub median_len_tokens: usize,
    pub p95_len_tokens: usize,
    pub histogram: Histogram,
    /// The first `MAX_LISTED_SPANS` spans by position.
    pub spans: Vec<SpanReport>,
}

/// Measure the parenthetical style of `text`.
///
/// Length statistics cover the listed spans; the histogram and the density
/// cover all of them.
pub fn analyze(text: &str, bins: i64, window: usize) -> Result<AnalyzeReport, StyleScopeError> {
    if text.trim().is_empty() {
        return Err(StyleScopeError::Validation("text is required".to_string()));
    }

    let chars: Vec<char> = text.chars().collect();
    let text_len = chars.len();
    let all = extract_spans(text);
    let word_count = count_words(text);
    let per1k = if word_count == 0 {
        0.0
    } else {
        (all.len() as f64 / word_count as f64 * 100_000.0).round() / 100.0
    };

    let spans: Vec<SpanReport> = all
        .iter()
        .take(MAX_LISTED_SPANS)
        .map(|s| SpanReport {
            id: s.id,
            text: s.inner.clone(),
            context: context(&chars, s, window),
            start_index: s.start,
            tokens: count_words(&s.inner),
            position: s.start as f64 / text_len as f64,
        })
        .collect();
    let lengths: Vec<usize> = spans.iter().map(|s| s.tokens).collect();

    tracing::debug!(
        chars = text_len,
        word_count,
        spans = all.len(),
        "Parentheticals analyzed"
    );

    Ok(AnalyzeReport {
        word_count,
        num_spans: all.len(),
        per1k,
        median_len_tokens: median(&lengths),
        p95_len_tokens: percentile(&lengths, 95.0),
        histogram: histogram(&all, text_len, bins),
        spans,
    })
}
