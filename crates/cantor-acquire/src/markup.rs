//! Small helpers shared by the source adapters for walking parsed pages.

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use std::ops::Deref;

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Concatenated, trimmed text of an element.
pub(crate) fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text under `element` with `<br>` and block boundaries turned into newlines.
///
/// Scripts, styles and comments are skipped. Leading/trailing blank lines are
/// dropped and each line is trimmed.
pub(crate) fn block_text(element: ElementRef) -> String {
    let mut raw = String::new();
    collect_text(*element, &mut raw);

    let lines: Vec<&str> = raw.lines().map(str::trim).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

fn collect_text(node: NodeRef<Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t.deref()),
            Node::Element(elem) => match elem.name() {
                "br" => out.push('\n'),
                "script" | "style" | "noscript" => {}
                "p" | "div" => {
                    collect_text(child, out);
                    out.push('\n');
                }
                _ => collect_text(child, out),
            },
            _ => {}
        }
    }
}

/// Next element sibling of `element` with the given tag name, skipping text
/// and other elements in between.
pub(crate) fn next_sibling_named<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == name)
}

/// First parenthesized group in `text`, e.g. "1972" from "Bad News Is Coming (1972)".
pub(crate) fn parenthesized(text: &str) -> Option<String> {
    let re = Regex::new(r"\(([^()]+)\)").expect("valid regex");
    re.captures(text).map(|c| c[1].trim().to_string())
}

/// Resolve a possibly relative `href` against a site's base URL.
pub(crate) fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let base = base_url.trim_end_matches('/');
    let path = href.trim_start_matches("..");
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_block_text_keeps_line_breaks() {
        let html = Html::parse_fragment(
            "<div class='lyricbox'>\n  I recall the day<br>you came my way<br/><br>\
             <script>var ad = 1;</script>And I hope you'll stay.<br></div>",
        );
        let div = html.select(&selector("div.lyricbox")).next().unwrap();
        assert_eq!(
            block_text(div),
            "I recall the day\nyou came my way\n\nAnd I hope you'll stay."
        );
    }

    #[test]
    fn test_block_text_paragraphs() {
        let html = Html::parse_fragment("<div id='x'><p>one</p><p>two</p></div>");
        let div = html.select(&selector("#x")).next().unwrap();
        assert_eq!(block_text(div), "one\ntwo");
    }

    #[test]
    fn test_next_sibling_named() {
        let html = Html::parse_fragment("<h2>A</h2>text<p>x</p><ol><li>1</li></ol><ol><li>2</li></ol>");
        let h2 = html.select(&selector("h2")).next().unwrap();
        let ol = next_sibling_named(h2, "ol").unwrap();
        assert_eq!(text_of(ol), "1");
        assert!(next_sibling_named(h2, "table").is_none());
    }

    #[test]
    fn test_parenthesized() {
        assert_eq!(parenthesized("Bad News Is Coming (1972)").as_deref(), Some("1972"));
        assert_eq!(parenthesized(r#"album: "Simplified" (2004)"#).as_deref(), Some("2004"));
        assert_eq!(parenthesized("No date here"), None);
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url("https://site.com", "/wiki/A"), "https://site.com/wiki/A");
        assert_eq!(absolute_url("https://site.com/", "../lyrics/a/b.html"), "https://site.com/lyrics/a/b.html");
        assert_eq!(absolute_url("https://site.com", "https://other.com/x"), "https://other.com/x");
        assert_eq!(absolute_url("https://site.com", "x.html"), "https://site.com/x.html");
    }
}
