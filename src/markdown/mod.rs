//! Markdown helpers
//!
//! - Front-matter splitting and `tags` extraction
//! - Fenced code tracking for line-oriented scanners
//! - HTML rendering with math shielding

pub mod fences;
pub mod frontmatter;
pub mod render;

pub use frontmatter::{split_frontmatter, Frontmatter, FrontmatterError};
pub use render::{markdown_to_html, render, render_card};
