//! Markdown to HTML for card fields

use pulldown_cmark::{html, Options, Parser};

use crate::cards::{CardPair, RenderedCard};
use crate::math::{shield, unshield};

fn render_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_DEFINITION_LIST);
    options
}

/// Plain Markdown to HTML conversion, with no math handling
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, render_options());
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output.truncate(output.trim_end().len());
    output
}

/// Render one field: shield math, convert to HTML, restore math.
///
/// The placeholder map never leaves this call.
pub fn render(markdown: &str) -> String {
    let (shielded, math) = shield(markdown);
    let html = markdown_to_html(&shielded);
    unshield(&html, &math)
}

/// Render front and back independently
pub fn render_card(card: &CardPair) -> RenderedCard {
    RenderedCard {
        front: render(&card.front),
        back: render(&card.back),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_html() {
        let html = markdown_to_html("# Test\n**Bold** and *italic*");
        assert!(html.contains("<h1>Test</h1>"));
        assert!(html.contains("<strong>Bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
    }

    #[test]
    fn test_lists_and_tables() {
        let html = markdown_to_html("- one\n- two\n\n| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>2</td>"));
    }

    #[test]
    fn test_definition_list() {
        let html = markdown_to_html("Mitosis\n: cell division");
        assert!(html.contains("<dl>"));
    }

    #[test]
    fn test_math_survives_markdown() {
        let html = render("Area is $a_1 * b_1$ and $c_2 * d_2$");
        assert_eq!(html, r"<p>Area is \(a_1 * b_1\) and \(c_2 * d_2\)</p>");
    }

    #[test]
    fn test_block_math_survives_markdown() {
        let html = render("The equations are:\n\n$$\nx_1 = \\frac{a}{b} \\\\\ny_2 = c\n$$");
        assert!(html.contains("\\[x_1 = \\frac{a}{b} \\\\\ny_2 = c\\]"));
        assert!(!html.contains('\u{E000}'));
    }

    #[test]
    fn test_math_with_html_special_characters() {
        let html = render("If $a<b$ then $x<y$");
        assert_eq!(html, r"<p>If \(a&lt;b\) then \(x&lt;y\)</p>");
        assert!(!html.contains("<b"));
        assert!(!html.contains("<y"));

        let html = render("$$x>0 \\land y<1$$");
        assert_eq!(html, r"<p>\[x&gt;0 \land y&lt;1\]</p>");
    }

    #[test]
    fn test_alignment_ampersands_escaped() {
        let html = render("$$\n\\begin{align}\na &= b \\\\\nc &= d\n\\end{align}\n$$");
        assert!(html.contains(r"a &amp;= b \\"));
        assert!(html.contains(r"c &amp;= d"));
        assert!(!html.contains(" &= "));
    }

    #[test]
    fn test_math_free_text_unchanged_by_shielding() {
        let text = "Some *text* with `code` and a [link](http://example.com)";
        assert_eq!(render(text), markdown_to_html(text));
    }

    #[test]
    fn test_render_card_fields_independent() {
        let card = CardPair::new("What is $x$?", "It is $y$ and $z$");
        let rendered = render_card(&card);
        assert_eq!(rendered.front, r"<p>What is \(x\)?</p>");
        assert_eq!(rendered.back, r"<p>It is \(y\) and \(z\)</p>");
    }
}
