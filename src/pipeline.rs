use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use indicatif::ProgressBar;
use tracing::{debug, info};

use crate::catalog::{self, Entry};
use crate::document::{self, Story};
use crate::fetcher::{Fetcher, PageSource, Sleep};
use crate::settings::Settings;

/// Counts reported after assembling the story.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub attempted: usize,
    pub processed: usize,
}

/// One crawl-and-assemble run: owns the visited set (via the fetcher) and
/// the story.
pub struct Pipeline<S> {
    fetcher: Fetcher<S>,
    story: Story,
    page_delay: Duration,
    limit: Option<usize>,
    sleep: Sleep,
    progress: ProgressBar,
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(source: S, settings: &Settings) -> Self {
        Self::with_sleep(source, settings, Rc::new(std::thread::sleep))
    }

    pub fn with_sleep(source: S, settings: &Settings, sleep: Sleep) -> Self {
        Pipeline {
            fetcher: Fetcher::new(source, settings, Rc::clone(&sleep)),
            story: Story::new(),
            page_delay: settings.page_delay,
            limit: settings.limit,
            sleep,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Title page, table of contents, then one section per page that
    /// yielded text, in catalog order.
    pub fn assemble(&mut self, entries: &[Entry], generated: NaiveDate) -> RunStats {
        document::title_page(&mut self.story, generated);
        document::table_of_contents(&mut self.story, entries);

        let total = entries.len();
        let pages: Vec<(usize, &Entry)> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_group())
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();
        self.progress.set_length(pages.len() as u64);

        let mut stats = RunStats::default();
        for (i, entry) in pages {
            info!("Processing ({}/{}): {}", i + 1, total, entry.title);
            self.progress.set_message(entry.title.clone());
            stats.attempted += 1;

            let page = self.fetcher.fetch(&entry.path);
            self.progress.inc(1);
            let Some(page) = page.filter(|p| !p.text.is_empty()) else {
                debug!("No content for {}", entry.path);
                continue;
            };

            document::section(&mut self.story, &entry.title, &page);
            stats.processed += 1;
            (self.sleep)(self.page_delay);
        }

        self.progress.finish_and_clear();
        info!(
            "Processed {} of {} pages ({} catalog pages)",
            stats.processed,
            stats.attempted,
            catalog::page_count(entries)
        );
        stats
    }

    pub fn into_story(self) -> Story {
        self.story
    }
}
