//! Quote matching
//!
//! Finds the occurrence of a quote whose surroundings best agree with the
//! recorded prefix and suffix, then maps it back onto the text nodes.

use worm_dom::{BoundaryPoint, Range};

use crate::corpus::{Corpus, TextNode};
use crate::normalize::{head_chars, normalize, raw_end_offset, raw_start_offset, tail_chars};

/// A scored occurrence, as byte offsets into `Corpus::all_text`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteMatch {
    pub start: usize,
    pub end: usize,
    pub score: usize,
}

/// Best occurrence of `exact` in `text`
///
/// Occurrences are scanned left to right without overlap. The score is 1
/// plus the common tail with `prefix` plus the common head with `suffix`,
/// each counted until the first mismatch. Ties keep the earliest.
pub fn best_match(exact: &str, prefix: &str, suffix: &str, text: &str) -> Option<QuoteMatch> {
    let exact = normalize(exact);
    if exact.is_empty() {
        return None;
    }
    let prefix = normalize(prefix);
    let suffix = normalize(suffix);
    let prefix_len = prefix.chars().count();
    let suffix_len = suffix.chars().count();

    let mut best: Option<QuoteMatch> = None;
    for (start, found) in text.match_indices(exact.as_str()) {
        let end = start + found.len();
        let before = tail_chars(text[..start].trim_end(), prefix_len);
        let after = head_chars(text[end..].trim_start(), suffix_len);

        let score = 1 + common_tail(before, &prefix) + common_head(after, &suffix);
        tracing::trace!(start, score, "quote occurrence");
        if best.is_none_or(|b| score > b.score) {
            best = Some(QuoteMatch { start, end, score });
        }
    }
    best
}

fn common_tail(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

fn common_head(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Live range for the best occurrence of `exact` in `corpus`
pub fn find_range(exact: &str, prefix: &str, suffix: &str, corpus: &Corpus<'_>) -> Option<Range> {
    let found = best_match(exact, prefix, suffix, &corpus.all_text)?;
    let start_seg = corpus.segment_containing(found.start)?;
    let end_seg = corpus.segment_ending_at(found.end)?;

    let start = BoundaryPoint::new(
        start_seg.node,
        raw_offset(corpus, start_seg, found.start, raw_start_offset),
    );
    let end = BoundaryPoint::new(
        end_seg.node,
        raw_offset(corpus, end_seg, found.end, raw_end_offset),
    );
    Some(Range::new(start, end))
}

/// Map a corpus byte offset inside `seg` to a raw char offset in its node
fn raw_offset(
    corpus: &Corpus<'_>,
    seg: &TextNode,
    offset: usize,
    map: fn(&str, usize) -> usize,
) -> usize {
    let local = seg.text[..offset - seg.start].chars().count();
    let raw = corpus.raw_text(seg.node).unwrap_or(seg.text.as_str());
    map(raw, local).min(raw.chars().count())
}
