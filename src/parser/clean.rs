use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());
static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Upper bound on decode rounds for text escaped more than once.
const MAX_DECODE_ROUNDS: usize = 16;

/// Normalize extracted page text into plain printable lines.
///
/// Entities are decoded and leftover tags removed until neither changes the
/// text, so `&amp;lt;b&amp;gt;` ends up as nothing rather than `<b>`. Then `\r`
/// becomes `\n`, tabs become four spaces, control characters other than `\n`
/// are dropped, blank-line runs collapse to a single blank line and space runs
/// to one space. A second application is a no-op.
pub fn clean_text(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_DECODE_ROUNDS {
        let next = decode_round(&current);
        if next == current {
            break;
        }
        current = next;
    }
    let paragraphs = BLANK_RUN_RE.replace_all(&current, "\n\n");
    let spaced = SPACE_RUN_RE.replace_all(&paragraphs, " ");
    spaced.trim().to_string()
}

fn decode_round(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    let untagged = TAG_RE.replace_all(&decoded, "");
    let expanded = untagged.replace('\r', "\n").replace('\t', "    ");
    strip_control(&expanded)
}

/// Drop every character below U+0020 except line feeds.
pub fn strip_control(text: &str) -> String {
    text.chars().filter(|&c| c == '\n' || c as u32 >= 32).collect()
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
