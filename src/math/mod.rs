//! Math shielding
//!
//! Markdown renderers mangle TeX: `_` turns into emphasis and `\\` collapses
//! to `\`. Math spans are swapped for opaque tokens before rendering
//! and swapped back, as MathJax delimiters Anki understands, afterwards.

mod shield;

pub use shield::*;
