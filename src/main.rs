mod catalog;
mod document;
mod fetcher;
mod parser;
mod pipeline;
mod render;
mod settings;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;

use fetcher::HttpSource;
use pipeline::Pipeline;
use render::pdf::PdfSink;
use settings::Settings;

#[derive(Parser)]
#[command(name = "vuedoc_pdf", about = "Render the Vue 3 guide into a single PDF manual")]
struct Cli {
    /// Output PDF path (default: vue3_manual.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JSON catalog of {"title", "path"} entries replacing the built-in list
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Site origin prepended to relative paths
    #[arg(long)]
    base_url: Option<String>,
    /// Max pages to fetch (default: all)
    #[arg(short = 'n', long)]
    limit: Option<usize>,
    /// Directory containing <name>-Regular.ttf (and optionally <name>-Bold.ttf)
    #[arg(long)]
    font_dir: Option<PathBuf>,
    /// Skip retry and between-page pauses
    #[arg(long)]
    no_delay: bool,
}

impl Cli {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = &self.font_dir {
            settings.font_dir = Some(dir.clone());
        }
        if self.limit.is_some() {
            settings.limit = self.limit;
        }
        if self.no_delay {
            settings.retry_delay = Duration::ZERO;
            settings.page_delay = Duration::ZERO;
        }
        settings
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = cli.apply(Settings::from_env()?);

    let entries = match &cli.catalog {
        Some(path) => catalog::load(path)?,
        None => catalog::builtin(),
    };

    // Resolve fonts before crawling.
    let fonts = match render::fonts::load(settings.font_dir.as_deref()) {
        Ok(fonts) => fonts,
        Err(e) => {
            error!("Cannot generate PDF: {}", e);
            std::process::exit(1);
        }
    };

    let source = HttpSource::new(&settings).context("Failed to create HTTP client")?;
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    println!(
        "Fetching {} pages from {}...",
        catalog::page_count(&entries),
        settings.base_url
    );
    let mut pipeline = Pipeline::new(source, &settings).with_progress(pb);
    let stats = pipeline.assemble(&entries, chrono::Local::now().date_naive());
    let story = pipeline.into_story();

    let sink = PdfSink::new(fonts, document::DOCUMENT_TITLE);
    match render::build(&story, sink, &settings.output) {
        Ok(built) => {
            println!("\nPDF written: {}", settings.output.display());
            println!(
                "Processed {} of {} pages ({} blocks, {} skipped)",
                stats.processed, stats.attempted, built.rendered, built.skipped
            );
            if let Ok(meta) = std::fs::metadata(&settings.output) {
                println!("File size: {:.1} KB", meta.len() as f64 / 1024.0);
            }
        }
        Err(e) => {
            error!("Failed to generate PDF: {}", e);
            std::process::exit(1);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
