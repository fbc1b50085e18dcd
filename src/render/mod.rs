pub mod fonts;
pub mod pdf;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::document::{Block, Story};

/// A single block could not be laid out; the block is dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("no printable text")]
    Empty,
    #[error("{0:?} is outside the built-in font's character set")]
    UnsupportedGlyph(char),
}

/// The artifact cannot be produced at all.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no usable font: {0}")]
    NoFont(String),
    #[error("failed to load font {path}: {source}")]
    Font {
        path: PathBuf,
        #[source]
        source: genpdf::error::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: genpdf::error::Error,
    },
}

/// Layout backend fed one block at a time, then serialized once.
pub trait BlockSink {
    fn render(&mut self, block: &Block) -> Result<(), RenderError>;
    fn finish(self, path: &Path) -> Result<(), BuildError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub rendered: usize,
    pub skipped: usize,
}

/// Feed the story to `sink` in order, logging and skipping blocks that fail,
/// then write the artifact.
pub fn build<S: BlockSink>(
    story: &Story,
    mut sink: S,
    path: &Path,
) -> Result<BuildStats, BuildError> {
    let mut stats = BuildStats::default();
    for block in story.blocks() {
        match sink.render(block) {
            Ok(()) => stats.rendered += 1,
            Err(e) => {
                warn!("Skipping {} block: {}", block.kind(), e);
                stats.skipped += 1;
            }
        }
    }
    info!(
        "Writing {} blocks ({} skipped) to {}",
        stats.rendered,
        stats.skipped,
        path.display()
    );
    sink.finish(path)?;
    Ok(stats)
}
