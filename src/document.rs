use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};

use crate::catalog::Entry;
use crate::parser::clean::{strip_control, truncate_chars};
use crate::parser::segment::{self, DEFAULT_MAX_LENGTH};
use crate::parser::FetchedPage;

pub const DOCUMENT_TITLE: &str = "Vue 3 完整使用手册";
const TOC_TITLE: &str = "目 录";

/// TOC numbering stops (and the TOC ends) past this many pages.
pub const MAX_TOC_ENTRIES: usize = 200;
const MAX_HEADING_CHARS: usize = 60;
const FALLBACK_HEADING_CHARS: usize = 50;
pub const MAX_PARAGRAPHS: usize = 8;
pub const MAX_PARAGRAPH_CHARS: usize = 500;
const MIN_PARAGRAPH_CHARS: usize = 10;
pub const MAX_CODE_BLOCKS: usize = 100;
pub const MAX_CODE_LINES: usize = 50;

static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").unwrap());
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\p{Han}]").unwrap());

/// One layout block. Spacer heights are in inches.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Subtitle(String),
    TocHeading(String),
    TocGroup(String),
    TocEntry { number: usize, title: String },
    SectionHeading(String),
    Paragraph(String),
    CodeLabel(String),
    Code(String),
    Spacer(f64),
    PageBreak,
}

impl Block {
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Title(_) => "title",
            Block::Subtitle(_) => "subtitle",
            Block::TocHeading(_) => "toc heading",
            Block::TocGroup(_) => "toc group",
            Block::TocEntry { .. } => "toc entry",
            Block::SectionHeading(_) => "section heading",
            Block::Paragraph(_) => "paragraph",
            Block::CodeLabel(_) => "code label",
            Block::Code(_) => "code",
            Block::Spacer(_) => "spacer",
            Block::PageBreak => "page break",
        }
    }

    /// Text the block displays, if any.
    pub fn text(&self) -> Option<String> {
        match self {
            Block::Title(t)
            | Block::Subtitle(t)
            | Block::TocHeading(t)
            | Block::TocGroup(t)
            | Block::SectionHeading(t)
            | Block::Paragraph(t)
            | Block::CodeLabel(t)
            | Block::Code(t) => Some(t.clone()),
            Block::TocEntry { number, title } => Some(format!("{}. {}", number, title)),
            Block::Spacer(_) | Block::PageBreak => None,
        }
    }
}

/// Append-only block sequence; document order is append order.
#[derive(Debug, Default)]
pub struct Story {
    blocks: Vec<Block>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

pub fn title_page(story: &mut Story, generated: NaiveDate) {
    story.push(Block::Spacer(0.5));
    story.push(Block::Title(DOCUMENT_TITLE.to_string()));
    story.push(Block::Subtitle(generated.format("%Y-%m-%d").to_string()));
    story.push(Block::Spacer(1.0));
    story.push(Block::PageBreak);
}

/// Group labels are unnumbered; pages are numbered from 1 and the listing
/// ends once numbering would pass `MAX_TOC_ENTRIES`.
pub fn table_of_contents(story: &mut Story, entries: &[Entry]) {
    story.push(Block::TocHeading(TOC_TITLE.to_string()));
    story.push(Block::Spacer(0.2));

    let mut number = 0;
    for entry in entries {
        if entry.is_group() {
            story.push(Block::TocGroup(entry.title.clone()));
            continue;
        }
        number += 1;
        if number > MAX_TOC_ENTRIES {
            break;
        }
        story.push(Block::TocEntry {
            number,
            title: entry.title.clone(),
        });
    }

    story.push(Block::Spacer(0.3));
    story.push(Block::PageBreak);
}

/// Heading, up to `MAX_PARAGRAPHS` paragraphs, the code samples, then a page break.
pub fn section(story: &mut Story, title: &str, page: &FetchedPage) {
    match heading_text(title) {
        Some(heading) => story.push(Block::SectionHeading(heading)),
        None => warn!("Heading for {:?} has no printable text, omitted", title),
    }

    let paragraphs = segment::split_paragraphs(&page.text, DEFAULT_MAX_LENGTH)
        .into_iter()
        .filter_map(|p| display_paragraph(&p))
        .take(MAX_PARAGRAPHS);
    for text in paragraphs {
        story.push(Block::Paragraph(text));
    }

    if !page.code_blocks.is_empty() {
        story.push(Block::Spacer(0.08));
        story.push(Block::CodeLabel(format!(
            "代码示例 ({} 个)",
            page.code_blocks.len()
        )));
        for block in page.code_blocks.iter().take(MAX_CODE_BLOCKS) {
            debug!("Code sample #{} from <{}> in {}", block.index, block.tag, title);
            story.push(Block::Code(format_code(&block.code)));
        }
    }

    story.push(Block::Spacer(0.15));
    story.push(Block::PageBreak);
}

/// Printable title cut to 60 chars, else its word characters cut to 50.
pub fn heading_text(title: &str) -> Option<String> {
    let clean = truncate_chars(&strip_control(title.trim()), MAX_HEADING_CHARS);
    if !clean.trim().is_empty() {
        return Some(clean);
    }
    let fallback = truncate_chars(&NON_WORD_RE.replace_all(title, ""), FALLBACK_HEADING_CHARS);
    (!fallback.is_empty()).then_some(fallback)
}

/// Normalized paragraph text, or `None` when too short to be worth showing.
pub fn display_paragraph(text: &str) -> Option<String> {
    let collapsed = SPACE_RUN_RE.replace_all(text.trim(), " ");
    let printable = strip_control(&collapsed);
    if printable.chars().count() <= MIN_PARAGRAPH_CHARS {
        return None;
    }
    Some(truncate_chars(&printable, MAX_PARAGRAPH_CHARS))
}

/// Right-trim lines, collapse blank runs, drop leading/trailing blanks and
/// stop after `MAX_CODE_LINES` non-blank lines.
pub fn format_code(code: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut non_blank = 0;
    for line in code.split('\n') {
        if non_blank >= MAX_CODE_LINES {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push(line);
            }
            continue;
        }
        lines.push(line);
        non_blank += 1;
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
