use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Turn an artist, album or song name into a file-system friendly slug.
///
/// Drops everything that is not a word character, whitespace or `-`, trims,
/// then collapses runs of whitespace and dashes into a single `-`.
pub fn normalize_name(value: &str) -> String {
    let strip = Regex::new(r"[^\w\s-]").expect("valid regex");
    let collapse = Regex::new(r"[-\s]+").expect("valid regex");
    let stripped = strip.replace_all(value, "");
    collapse.replace_all(stripped.trim(), "-").into_owned()
}

/// Normalize Unicode text to NFC form and strip trailing whitespace per line.
pub fn normalize_text(input: &str) -> String {
    let nfc: String = input.nfc().collect();

    nfc.lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse multiple consecutive blank lines into a single blank line.
pub fn collapse_blank_lines(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut prev_blank = false;

    for line in input.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && prev_blank {
            continue;
        }
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(line);
        prev_blank = is_blank;
    }

    result
}
