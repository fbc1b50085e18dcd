pub mod clean;
pub mod code;
pub mod segment;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use code::CodeBlock;

/// Hard cap on the body text kept per page.
pub const MAX_TEXT_CHARS: usize = 1200;

static MAIN_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("main").unwrap());
static ARTICLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("no <main> or <article> region")]
    NoMainContent,
}

/// What one page contributes to the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub text: String,
    pub code_blocks: Vec<CodeBlock>,
}

/// Two scopes over one parse: code samples come from the whole page,
/// body text only from the main-content region.
pub fn extract_page(markup: &str) -> Result<FetchedPage, PageError> {
    let doc = Html::parse_document(markup);
    let code_blocks = code::extract_code_blocks(&doc);

    let main = find_main(&doc).ok_or(PageError::NoMainContent)?;
    let text = clean::clean_text(&region_text(main));

    Ok(FetchedPage {
        text: clean::truncate_chars(&text, MAX_TEXT_CHARS),
        code_blocks,
    })
}

fn find_main(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&MAIN_SELECTOR)
        .next()
        .or_else(|| doc.select(&ARTICLE_SELECTOR).next())
}

/// Text nodes of `region` joined with line breaks, skipping anything inside
/// `<script>` or `<style>`.
fn region_text(region: ElementRef<'_>) -> String {
    region
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let in_raw = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|el| matches!(el.value().name(), "script" | "style"));
            (!in_raw).then_some(&**text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn guide_page_text_from_main_only() {
        let page = extract_page(&fixture("guide_page")).unwrap();
        assert!(page.text.starts_with("创建一个应用"));
        assert!(page.text.contains("函数创建一个新的应用实例："));
        assert!(page.text.contains("我们传入 createApp 的对象实际上是一个组件"));
        assert!(!page.text.contains("navbar"));
        assert!(!page.text.contains("console.log"));
        assert!(!page.text.contains("font-family"));
        assert!(!page.text.contains("\n\n\n"));
    }

    #[test]
    fn guide_page_code_spans_whole_page() {
        let page = extract_page(&fixture("guide_page")).unwrap();
        let indexes: Vec<usize> = page.code_blocks.iter().map(|b| b.index).collect();
        // index 1 is a one-liner below the minimum
        assert_eq!(indexes, vec![0, 2, 3]);
        assert!(page.code_blocks[0].code.starts_with("import { createApp } from 'vue'"));
        assert!(page.code_blocks[2].code.contains("outside main"));
        assert!(page.code_blocks.iter().all(|b| b.tag == "pre"));
    }

    #[test]
    fn falls_back_to_article() {
        let page = extract_page(&fixture("article_only")).unwrap();
        assert!(page.text.contains("Article body survives"));
        assert!(page.code_blocks.is_empty());
    }

    #[test]
    fn missing_region_is_an_error() {
        assert_eq!(
            extract_page(&fixture("no_main")),
            Err(PageError::NoMainContent)
        );
    }

    #[test]
    fn text_is_capped() {
        let body = "字".repeat(1500);
        let page = extract_page(&format!("<html><body><main>{}</main></body></html>", body)).unwrap();
        assert_eq!(page.text.chars().count(), MAX_TEXT_CHARS);
        assert_eq!(page.text, "字".repeat(MAX_TEXT_CHARS));
    }

    #[test]
    fn code_not_limited_by_text_cap() {
        let filler = "p".repeat(2000);
        let html = format!(
            "<main><p>{}</p><pre>const late = 'after the text cap'</pre></main>",
            filler
        );
        let page = extract_page(&html).unwrap();
        assert_eq!(page.text.chars().count(), MAX_TEXT_CHARS);
        assert_eq!(page.code_blocks.len(), 1);
    }
}
