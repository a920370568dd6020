use std::ops::Range;

use crate::markdown::fences::code_ranges;

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';

/// Kind of math span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathKind {
    /// `$...$`, rendered as `\(...\)`
    Inline,
    /// `$$...$$`, rendered as `\[...\]`
    Block,
}

/// A math span lifted out of a text buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    pub kind: MathKind,
    /// Math body with the dollar delimiters stripped
    pub body: String,
    /// Placeholder standing in for the span in the shielded text
    pub token: String,
}

impl MathSpan {
    /// The form restored into rendered HTML. The body is escaped as HTML
    /// text so `<`, `>` and `&` reach MathJax intact.
    pub fn display(&self) -> String {
        let body = html_escape::encode_text(&self.body);
        match self.kind {
            MathKind::Inline => format!("\\({}\\)", body),
            MathKind::Block => format!("\\[{}\\]", body),
        }
    }
}

/// Placeholders produced by one [`shield`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MathMap {
    spans: Vec<MathSpan>,
}

impl MathMap {
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MathSpan> {
        self.spans.iter()
    }

    fn push(&mut self, kind: MathKind, body: &str) -> String {
        let token = format!("{}{}{}", TOKEN_OPEN, self.spans.len(), TOKEN_CLOSE);
        self.spans.push(MathSpan {
            kind,
            body: body.to_string(),
            token: token.clone(),
        });
        token
    }
}

/// Replace every math span in `text` with a placeholder token.
///
/// Block math is replaced over the whole buffer before inline math is looked
/// for, so single dollars inside a block are never matched on their own.
/// Code (fences and inline spans) is left untouched.
pub fn shield(text: &str) -> (String, MathMap) {
    let mut map = MathMap::default();
    let blocks_shielded = replace_spans(text, &mut map, find_block_spans);
    let shielded = replace_spans(&blocks_shielded, &mut map, find_inline_spans);
    (shielded, map)
}

/// Put every span of `map` back into `rendered`, in display form
pub fn unshield(rendered: &str, map: &MathMap) -> String {
    let mut output = rendered.to_string();
    for span in map.iter() {
        output = output.replace(&span.token, &span.display());
    }
    output
}

/// A located span: byte range of the whole match plus the range of its body
struct Found {
    kind: MathKind,
    outer: Range<usize>,
    body: Range<usize>,
}

fn replace_spans(
    text: &str,
    map: &mut MathMap,
    finder: fn(&str, &[Range<usize>]) -> Vec<Found>,
) -> String {
    let code = code_ranges(text);
    let found = finder(text, &code);
    if found.is_empty() {
        return text.to_string();
    }

    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    for span in found {
        output.push_str(&text[last..span.outer.start]);
        let body = &text[span.body];
        let body = match span.kind {
            MathKind::Block => body.trim(),
            MathKind::Inline => body,
        };
        output.push_str(&map.push(span.kind, body));
        last = span.outer.end;
    }
    output.push_str(&text[last..]);
    output
}

fn find_block_spans(text: &str, code: &[Range<usize>]) -> Vec<Found> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if let Some(end) = code_end_at(code, i) {
            i = end;
            continue;
        }
        if !is_double_dollar(bytes, i) || is_escaped(bytes, i) {
            i += 1;
            continue;
        }

        match find_block_close(bytes, i + 2, code) {
            Some(close) if !text[i + 2..close].trim().is_empty() => {
                found.push(Found {
                    kind: MathKind::Block,
                    outer: i..close + 2,
                    body: i + 2..close,
                });
                i = close + 2;
            }
            _ => i += 2,
        }
    }

    found
}

fn find_block_close(bytes: &[u8], from: usize, code: &[Range<usize>]) -> Option<usize> {
    let mut j = from;
    while j + 1 < bytes.len() {
        if code_end_at(code, j).is_some() {
            return None;
        }
        if is_double_dollar(bytes, j) && !is_escaped(bytes, j) {
            return Some(j);
        }
        j += 1;
    }
    None
}

fn find_inline_spans(text: &str, code: &[Range<usize>]) -> Vec<Found> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = code_end_at(code, i) {
            i = end;
            continue;
        }
        if !is_single_dollar(bytes, i) || is_escaped(bytes, i) {
            i += 1;
            continue;
        }

        match find_inline_close(bytes, i + 1, code) {
            Some(close) if close > i + 1 => {
                found.push(Found {
                    kind: MathKind::Inline,
                    outer: i..close + 1,
                    body: i + 1..close,
                });
                i = close + 1;
            }
            _ => i += 1,
        }
    }

    found
}

fn find_inline_close(bytes: &[u8], from: usize, code: &[Range<usize>]) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        // Inline spans never swallow a block placeholder
        if bytes[j] == b'\n' || code_end_at(code, j).is_some() || starts_token(bytes, j) {
            return None;
        }
        if bytes[j] == b'$' && !is_escaped(bytes, j) {
            return is_single_dollar(bytes, j).then_some(j);
        }
        j += 1;
    }
    None
}

/// If `pos` starts a code range, the end of that range
fn code_end_at(code: &[Range<usize>], pos: usize) -> Option<usize> {
    code.iter().find(|range| range.start == pos).map(|range| range.end)
}

fn starts_token(bytes: &[u8], pos: usize) -> bool {
    let mut buf = [0u8; 4];
    bytes[pos..].starts_with(TOKEN_OPEN.encode_utf8(&mut buf).as_bytes())
}

fn is_double_dollar(bytes: &[u8], pos: usize) -> bool {
    bytes[pos] == b'$' && bytes.get(pos + 1) == Some(&b'$')
}

/// A `$` with no `$` neighbour on either side
fn is_single_dollar(bytes: &[u8], pos: usize) -> bool {
    bytes[pos] == b'$'
        && bytes.get(pos + 1) != Some(&b'$')
        && (pos == 0 || bytes[pos - 1] != b'$')
}

/// Preceded by an odd number of backslashes
fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    bytes[..pos].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1
}
