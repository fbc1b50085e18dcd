use std::sync::LazyLock;

use scraper::{Html, Selector};

/// Blocks whose trimmed text is this short or shorter are dropped.
pub const MIN_CODE_CHARS: usize = 20;
/// Whole lines are kept while the joined block stays within this length.
const LINE_BUDGET_CHARS: usize = 400;
pub const MAX_CODE_CHARS: usize = 420;

static PRE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Position among all `<pre>` elements of the page, kept or not.
    pub index: usize,
    pub code: String,
    pub tag: String,
}

/// Extract code samples from every `<pre>` in the whole document.
pub fn extract_code_blocks(doc: &Html) -> Vec<CodeBlock> {
    doc.select(&PRE_SELECTOR)
        .enumerate()
        .filter_map(|(index, el)| {
            let text: String = el.text().collect();
            let code = bound_code(&text)?;
            Some(CodeBlock {
                index,
                code,
                tag: el.value().name().to_string(),
            })
        })
        .collect()
}

/// Trim a raw sample down to whole lines within the line budget.
/// Returns `None` when too little code remains.
pub fn bound_code(text: &str) -> Option<String> {
    let stripped = text.trim();
    if stripped.chars().count() <= MIN_CODE_CHARS {
        return None;
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut len = 0usize;
    for line in stripped.split('\n') {
        let line_len = line.chars().count();
        let next = if kept.is_empty() { line_len } else { len + 1 + line_len };
        if next > LINE_BUDGET_CHARS {
            break;
        }
        kept.push(line);
        len = next;
    }

    if kept.is_empty() || len <= MIN_CODE_CHARS {
        return None;
    }
    Some(kept.join("\n").chars().take(MAX_CODE_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_blocks_are_dropped() {
        assert_eq!(bound_code("x".repeat(10).as_str()), None);
        assert_eq!(bound_code(&format!("  {}  \n", "y".repeat(20))), None);
    }

    #[test]
    fn small_block_kept_verbatim() {
        let code = "x".repeat(25);
        assert_eq!(bound_code(&code), Some(code));
    }

    #[test]
    fn stops_before_line_crossing_budget() {
        let line = "a".repeat(99);
        let text = vec![line.as_str(); 6].join("\n");
        let code = bound_code(&text).unwrap();
        assert_eq!(code.lines().count(), 4);
        assert_eq!(code.chars().count(), 399);
    }

    #[test]
    fn oversized_first_line_drops_block() {
        assert_eq!(bound_code(&"z".repeat(500)), None);
    }

    #[test]
    fn never_exceeds_cap() {
        let inputs = [
            "let x = 1;\n".repeat(80),
            format!("{}\n{}", "q".repeat(390), "w".repeat(30)),
            "中文注释 // comment line\n".repeat(40),
        ];
        for input in &inputs {
            if let Some(code) = bound_code(input) {
                assert!(code.chars().count() <= MAX_CODE_CHARS);
                assert!(code.trim().chars().count() > MIN_CODE_CHARS);
            }
        }
    }

    #[test]
    fn index_counts_every_pre() {
        let html = Html::parse_document(
            "<body><pre>tiny</pre><main><pre>const app = createApp(App)</pre></main>\
             <aside><pre><code>app.mount('#app') // mounted</code></pre></aside></body>",
        );
        let blocks = extract_code_blocks(&html);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, 1);
        assert_eq!(blocks[0].code, "const app = createApp(App)");
        assert_eq!(blocks[1].index, 2);
        assert_eq!(blocks[1].tag, "pre");
    }
}
