//! Text normalization
//!
//! Every text comparison in this crate runs on normalized strings.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::canonical_combining_class;

/// NFC composition, whitespace runs collapsed to one space, trimmed
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max` chars of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Last `max` chars of `text`
pub(crate) fn tail_chars(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    let skip = count - max;
    let start = text.char_indices().nth(skip).map_or(text.len(), |(i, _)| i);
    &text[start..]
}

/// First `max` chars of `text`, borrowed
pub(crate) fn head_chars(text: &str, max: usize) -> &str {
    let end = text.char_indices().nth(max).map_or(text.len(), |(i, _)| i);
    &text[..end]
}

/// Raw char offset where normalized char `target` begins
pub(crate) fn raw_start_offset(raw: &str, target: usize) -> usize {
    char_spans(raw)
        .get(target)
        .map_or_else(|| raw.chars().count(), |&(start, _)| start)
}

/// Raw char offset just past normalized char `target - 1`
pub(crate) fn raw_end_offset(raw: &str, target: usize) -> usize {
    if target == 0 {
        return raw_start_offset(raw, 0);
    }
    char_spans(raw)
        .get(target - 1)
        .map_or_else(|| raw.chars().count(), |&(_, end)| end)
}

/// Raw chars that compose as one piece under NFC
#[derive(Debug)]
struct Unit {
    start: usize,
    end: usize,
    text: String,
}

/// Split `raw` so that composing each unit alone gives the same text as
/// composing the whole string
fn composition_units(raw: &str) -> Vec<Unit> {
    let chars: Vec<char> = raw.chars().collect();
    let compose = |start: usize, end: usize| chars[start..end].iter().copied().nfc().collect::<String>();

    let mut spans: Vec<(usize, usize)> = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        match spans.last_mut() {
            Some(last) if canonical_combining_class(c) != 0 => last.1 = i + 1,
            _ => spans.push((i, i + 1)),
        }
    }

    let mut units: Vec<Unit> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        let text = compose(start, end);
        if let Some(prev) = units.last_mut() {
            // Starters such as Hangul vowels still compose with what precedes them.
            let joined = compose(prev.start, end);
            if joined != format!("{}{}", prev.text, text) {
                prev.end = end;
                prev.text = joined;
                continue;
            }
        }
        units.push(Unit { start, end, text });
    }
    units
}

/// Raw char span `[start, end)` behind each char of `normalize(raw)`
///
/// A collapsed space spans its whole whitespace run; a composed char spans
/// every raw char it was built from.
fn char_spans(raw: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut run: Option<(usize, usize)> = None;
    for unit in composition_units(raw) {
        for c in unit.text.chars() {
            if c.is_whitespace() {
                run = Some(run.map_or((unit.start, unit.end), |(start, _)| (start, unit.end)));
                continue;
            }
            if let Some(ws) = run.take() {
                if !spans.is_empty() {
                    spans.push(ws);
                }
            }
            spans.push((unit.start, unit.end));
        }
    }
    spans
}
