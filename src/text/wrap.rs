//! Caption normalisation and greedy character-level wrapping.

use crate::text::measure::TextMeasure;

/// Wrap parameters shared by every segment of one caption.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WrapOptions {
    /// Pixel width a segment is compared against (the source image width).
    pub max_width: f32,
    /// Subtracted from `max_width` once a segment has to be broken.
    pub side_padding: f32,
    /// Chunk every segment into pieces of at most this many characters before wrapping.
    pub auto_split: Option<usize>,
}

/// Wrapped caption: hard-break segments, each holding its rendered lines top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptionLines {
    segments: Vec<Vec<String>>,
}

impl CaptionLines {
    pub fn segments(&self) -> &[Vec<String>] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().flatten().map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    pub fn first_line(&self) -> &str {
        self.lines().next().unwrap_or("")
    }

    /// All lines joined with `\n`.
    pub fn joined(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }
}

/// Turn literal `\n` escapes into real breaks and split into hard-break segments.
pub fn split_segments(text: &str) -> Vec<String> {
    text.replace("\\n", "\n")
        .split('\n')
        .map(str::to_owned)
        .collect()
}

/// Break `text` into lines that each measure below `max_width - side_padding`.
///
/// Text already narrower than `max_width` is returned as a single line. Otherwise characters are
/// appended one at a time and a line is closed as soon as the next character would reach the
/// budget; that character starts the next line. A single character wider than the budget still
/// gets a line of its own.
pub fn wrap_line<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    max_width: f32,
    side_padding: f32,
) -> Vec<String> {
    if measure.text_width(text) < max_width {
        return vec![text.to_owned()];
    }

    let budget = max_width - side_padding;
    let mut lines = Vec::new();
    let mut line = String::new();
    for ch in text.chars() {
        let mut candidate = line.clone();
        candidate.push(ch);
        if line.is_empty() || measure.text_width(&candidate) < budget {
            line = candidate;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push(ch);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split `text` into pieces of at most `n` characters. Empty input yields one empty piece.
pub fn chunk_chars(text: &str, n: usize) -> Vec<String> {
    let n = n.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(n).map(|c| c.iter().collect()).collect()
}

/// Normalise escapes, split on hard breaks, and wrap every segment independently.
#[tracing::instrument(skip_all, fields(chars = text.chars().count()))]
pub fn normalize_and_wrap<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    opts: WrapOptions,
) -> CaptionLines {
    let mut segments = Vec::new();
    for segment in split_segments(text) {
        let pieces = match opts.auto_split {
            Some(n) => chunk_chars(&segment, n),
            None => vec![segment],
        };
        let mut lines = Vec::new();
        for piece in &pieces {
            lines.extend(wrap_line(measure, piece, opts.max_width, opts.side_padding));
        }
        segments.push(lines);
    }

    let out = CaptionLines { segments };
    tracing::debug!(
        segments = out.segment_count(),
        lines = out.line_count(),
        "wrapped caption"
    );
    out
}
