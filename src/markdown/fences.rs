//! Fenced code tracking
//!
//! Heading splitters and the math shield work line by line or byte by byte
//! over raw Markdown. Anything inside a ``` / ~~~ fence or an inline code span
//! is code and must be left alone.

use std::ops::Range;

/// Tracks whether successive lines sit inside a fenced code block.
#[derive(Debug, Default)]
pub struct FenceTracker {
    open: Option<Fence>,
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: u8,
    len: usize,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next line. Returns true when the line is part of a fence,
    /// including the opening and closing delimiter lines.
    pub fn observe(&mut self, line: &str) -> bool {
        let delimiter = parse_fence(line);
        match (self.open, delimiter) {
            (None, Some((fence, _))) => {
                self.open = Some(fence);
                true
            }
            (None, None) => false,
            (Some(open), Some((fence, bare)))
                if bare && fence.marker == open.marker && fence.len >= open.len =>
            {
                self.open = None;
                true
            }
            (Some(_), _) => true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

/// Parse a fence delimiter line. The flag is true when nothing but
/// whitespace follows the marker run (required for a closing fence).
fn parse_fence(line: &str) -> Option<(Fence, bool)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }

    let rest = &line.as_bytes()[indent..];
    let marker = *rest.first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }

    let len = rest.iter().take_while(|&&b| b == marker).count();
    if len < 3 {
        return None;
    }

    let info = &rest[len..];
    // Backtick fences may not carry backticks in their info string
    if marker == b'`' && info.contains(&b'`') {
        return None;
    }

    let bare = info.iter().all(|b| b.is_ascii_whitespace());
    Some((Fence { marker, len }, bare))
}

/// Byte ranges of `text` that are code: fenced blocks (delimiters included)
/// and inline code spans. Ranges are sorted and do not overlap.
pub fn code_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut tracker = FenceTracker::new();
    let mut fence_start: Option<usize> = None;
    let mut prose_start = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let was_open = tracker.is_open();
        let in_fence = tracker.observe(line.trim_end_matches(['\r', '\n']));

        if in_fence && !was_open {
            code_spans(text, prose_start..offset, &mut ranges);
            fence_start = Some(offset);
        }

        offset += line.len();

        if was_open && !tracker.is_open() {
            if let Some(start) = fence_start.take() {
                ranges.push(start..offset);
            }
            prose_start = offset;
        }
    }

    match fence_start {
        // An unclosed fence runs to the end of the document
        Some(start) => ranges.push(start..text.len()),
        None => code_spans(text, prose_start..text.len(), &mut ranges),
    }

    ranges
}

/// Find inline code spans inside a prose region. A run of N backticks opens a
/// span closed by the next run of exactly N backticks in the same paragraph.
fn code_spans(text: &str, region: Range<usize>, ranges: &mut Vec<Range<usize>>) {
    let bytes = text.as_bytes();
    let mut i = region.start;

    while i < region.end {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let open_len = run_length(bytes, i, region.end, b'`');
                match find_closing_run(bytes, i + open_len, region.end, open_len) {
                    Some(close_end) => {
                        ranges.push(i..close_end);
                        i = close_end;
                    }
                    None => i += open_len,
                }
            }
            _ => i += 1,
        }
    }
}

fn find_closing_run(bytes: &[u8], from: usize, end: usize, len: usize) -> Option<usize> {
    let mut j = from;
    while j < end {
        match bytes[j] {
            b'`' => {
                let run = run_length(bytes, j, end, b'`');
                if run == len {
                    return Some(j + run);
                }
                j += run;
            }
            // A blank line ends the paragraph
            b'\n' if is_blank_line_ahead(bytes, j + 1, end) => return None,
            _ => j += 1,
        }
    }
    None
}

fn run_length(bytes: &[u8], start: usize, end: usize, byte: u8) -> usize {
    bytes[start..end].iter().take_while(|&&b| b == byte).count()
}

fn is_blank_line_ahead(bytes: &[u8], from: usize, end: usize) -> bool {
    bytes[from.min(end)..end]
        .iter()
        .take_while(|&&b| b != b'\n')
        .all(|b| b.is_ascii_whitespace())
        && from < end
}
