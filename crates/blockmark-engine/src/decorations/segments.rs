use std::collections::{BTreeMap, BTreeSet};

use super::range::DecorationRange;

/// A run of text with one set of active tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub tags: BTreeSet<String>,
}

impl Segment {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Splits `text` into consecutive runs, each carrying the union of the tags
/// of every range covering it. Runs with no tags are included, so the
/// segments always cover the whole text.
///
/// One sweep over the range boundaries, keeping a count per active tag.
pub fn segments(text: &str, ranges: &[DecorationRange]) -> Vec<Segment> {
    let len = text.len();
    let mut opens: Vec<(usize, &DecorationRange)> = Vec::with_capacity(ranges.len());
    let mut closes: Vec<(usize, &DecorationRange)> = Vec::with_capacity(ranges.len());
    for range in ranges {
        let start = ceil_char_boundary(text, range.start.min(len));
        let end = floor_char_boundary(text, range.end.min(len));
        if start < end {
            opens.push((start, range));
            closes.push((end, range));
        }
    }
    opens.sort_unstable_by_key(|(at, _)| *at);
    closes.sort_unstable_by_key(|(at, _)| *at);

    let mut cuts: Vec<usize> = opens
        .iter()
        .chain(&closes)
        .map(|(at, _)| *at)
        .chain([0, len])
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut active: BTreeMap<&str, usize> = BTreeMap::new();
    let (mut next_open, mut next_close) = (0, 0);
    let mut out: Vec<Segment> = Vec::new();
    for pair in cuts.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        while let Some((at, range)) = closes.get(next_close)
            && *at <= start
        {
            for tag in &range.tags {
                if let Some(count) = active.get_mut(tag.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        active.remove(tag.as_str());
                    }
                }
            }
            next_close += 1;
        }
        while let Some((at, range)) = opens.get(next_open)
            && *at <= start
        {
            for tag in &range.tags {
                *active.entry(tag.as_str()).or_default() += 1;
            }
            next_open += 1;
        }

        if let Some(last) = out.last_mut()
            && last.tags.len() == active.len()
            && last.tags.iter().zip(active.keys()).all(|(a, b)| a == b)
        {
            last.end = end;
            continue;
        }
        let tags = active.keys().map(|tag| tag.to_string()).collect();
        out.push(Segment { start, end, tags });
    }
    out
}

fn floor_char_boundary(text: &str, mut at: usize) -> usize {
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

fn ceil_char_boundary(text: &str, mut at: usize) -> usize {
    while !text.is_char_boundary(at) {
        at += 1;
    }
    at
}
