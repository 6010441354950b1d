//! Text sanitization for server-supplied strings
//!
//! Image descriptions arrive as HTML and may contain anything. Views never
//! render that markup: [`plain_text`] parses it with `scraper`, keeps the
//! text nodes (entities decoded, comments and `script`/`style` bodies
//! dropped), and removes terminal control sequences so a description cannot
//! repaint the screen.

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements whose content is discarded along with the tags
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "iframe", "svg"];
/// Elements that end a line of text
const BLOCK_ELEMENTS: [&str; 9] = ["p", "div", "li", "h1", "h2", "h3", "h4", "tr", "blockquote"];

/// HTML description to printable plain text
///
/// # Examples
///
/// ```
/// use space_explorer::utils::text::plain_text;
///
/// assert_eq!(plain_text("<p>Red <b>planet</b> &amp; moons</p>"), "Red planet & moons");
/// ```
pub fn plain_text(html: &str) -> String {
    strip_ansi_codes(&html_to_text(html)).trim().to_string()
}

/// Text nodes of an HTML fragment with entities decoded
///
/// Comments and skipped elements vanish; `<br>` and block elements end a
/// line. Lines are trimmed and blank ones dropped.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::with_capacity(html.len());
    collect_text(fragment.root_element(), &mut raw);

    raw.lines().map(str::trim).filter(|line| !line.is_empty()).collect::<Vec<_>>().join("\n")
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.iter().any(|e| *e == name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if BLOCK_ELEMENTS.iter().any(|e| *e == name) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Strips ANSI CSI sequences and control characters other than tab/newline/CR
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI ends at the first letter
            for next_ch in chars.by_ref() {
                if next_ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_basic_tags() {
        assert_eq!(html_to_text("<p>Hello <em>world</em></p>"), "Hello world");
    }

    #[test]
    fn test_html_to_text_drops_script_bodies() {
        let html = "before<script type=\"text/javascript\">alert('x')</script>after";
        assert_eq!(html_to_text(html), "beforeafter");

        let styled = "<style>p { color: red }</style>text";
        assert_eq!(html_to_text(styled), "text");
    }

    #[test]
    fn test_html_to_text_line_breaks() {
        assert_eq!(html_to_text("one<br>two<br/>three"), "one\ntwo\nthree");
        assert_eq!(html_to_text("<p>first</p>\n   <p>second</p>"), "first\nsecond");
    }

    #[test]
    fn test_html_to_text_bare_angle_bracket() {
        assert_eq!(html_to_text("a < b"), "a < b");
    }

    #[test]
    fn test_html_to_text_attributes_with_handlers() {
        assert_eq!(html_to_text("<img src=x onerror=alert(1)>caption"), "caption");
    }

    #[test]
    fn test_plain_text_drops_comments() {
        assert_eq!(plain_text("<!-- <b>x</b> -->Saturn"), "Saturn");
        assert_eq!(plain_text("Io<!-- hidden -->&nbsp;moon"), "Io\u{a0}moon");
    }

    #[test]
    fn test_plain_text_quoted_angle_bracket_in_attribute() {
        assert_eq!(plain_text(r#"<a title="a>b">Mars</a>"#), "Mars");
        assert_eq!(plain_text(r#"<img alt='x > y' src="m.jpg">Phobos"#), "Phobos");
    }

    #[test]
    fn test_plain_text_decodes_entities() {
        assert_eq!(plain_text("Tom &amp; Jerry &lt;3"), "Tom & Jerry <3");
        assert_eq!(plain_text("&#65;&#x42;&quot;"), "AB\"");
        assert_eq!(plain_text("fish & chips"), "fish & chips");
        assert_eq!(plain_text("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_plain_text_removes_escape_sequences() {
        assert_eq!(plain_text("<b>\x1b[31mRed\x1b[0m</b> planet\x07"), "Red planet");
    }

    #[test]
    fn test_strip_ansi_codes_cursor_movement() {
        assert_eq!(strip_ansi_codes("\x1b[2J\x1b[H Cleared"), " Cleared");
    }

    #[test]
    fn test_strip_ansi_codes_preserves_whitespace_controls() {
        let text = "Line 1\nLine 2\rLine 3\tTabbed";
        assert_eq!(strip_ansi_codes(text), text);
    }

    #[test]
    fn test_strip_ansi_codes_unicode() {
        assert_eq!(strip_ansi_codes("Saturn 🪐 \x1b[1mrings\x1b[0m"), "Saturn 🪐 rings");
    }
}
