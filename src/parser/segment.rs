use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_MAX_LENGTH: usize = 280;

static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Split cleaned text into paragraphs on blank lines, breaking any paragraph
/// longer than `max_length` characters into pieces. A `max_length` of 0
/// disables the length split.
pub fn split_paragraphs(text: &str, max_length: usize) -> Vec<String> {
    let mut paragraphs = Vec::new();
    for raw in PARAGRAPH_BREAK_RE.split(text) {
        let p = raw.trim();
        if p.is_empty() {
            continue;
        }
        if max_length > 0 && p.chars().count() > max_length {
            split_long(p, max_length, &mut paragraphs);
        } else {
            paragraphs.push(p.to_string());
        }
    }
    paragraphs
}

/// Cut `p` into windows of at most `max` chars, backing off to the last space
/// past the window midpoint when the window does not reach the end.
fn split_long(p: &str, max: usize, out: &mut Vec<String>) {
    let chars: Vec<char> = p.chars().collect();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + max).min(chars.len());
        let window = &chars[start..end];
        if start + max < chars.len() {
            if let Some(space) = window.iter().rposition(|&c| c == ' ') {
                if space > max / 2 {
                    push_trimmed(&window[..space], out);
                    start += space + 1;
                    continue;
                }
            }
        }
        push_trimmed(window, out);
        start += max;
    }
}

fn push_trimmed(part: &[char], out: &mut Vec<String>) {
    let s: String = part.iter().collect();
    let s = s.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines() {
        let text = "first\nstill first\n\nsecond\n   \n\n third ";
        assert_eq!(
            split_paragraphs(text, DEFAULT_MAX_LENGTH),
            vec!["first\nstill first", "second", "third"]
        );
    }

    #[test]
    fn backs_off_to_word_boundary() {
        let text = "alpha beta gamma delta";
        // window "alpha beta" reaches no end, last space at 5 is not past 10/2
        assert_eq!(split_paragraphs(text, 10), vec!["alpha beta", "gamma", "delta"]);
        assert_eq!(split_paragraphs("aaaa bbbbbb cc", 12), vec!["aaaa bbbbbb", "cc"]);
    }

    #[test]
    fn cuts_hard_without_space() {
        let text = "x".repeat(25);
        assert_eq!(
            split_paragraphs(&text, 10),
            vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]
        );
    }

    #[test]
    fn zero_max_disables_split() {
        let text = "word ".repeat(100);
        assert_eq!(split_paragraphs(&text, 0).len(), 1);
    }

    #[test]
    fn pieces_never_exceed_max() {
        let samples = [
            "Vue 是一款用于构建用户界面的 JavaScript 框架。".repeat(20),
            "lorem ipsum dolor sit amet ".repeat(40),
            format!("{} {}", "a".repeat(300), "b".repeat(700)),
        ];
        for max in [10, 57, 280] {
            for s in &samples {
                for piece in split_paragraphs(s, max) {
                    assert!(piece.chars().count() <= max, "{} > {}", piece.len(), max);
                    assert!(!piece.is_empty());
                }
            }
        }
    }
}
