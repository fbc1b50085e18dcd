use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://cn.vuejs.org";
pub const DEFAULT_OUTPUT: &str = "vue3_manual.pdf";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const ENV_PREFIX: &str = "VUEDOC";

/// Runtime knobs for one run. Defaults reproduce the fixed crawl behaviour;
/// `VUEDOC_*` env vars and CLI flags may override them.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub page_delay: Duration,
    pub output: PathBuf,
    pub font_dir: Option<PathBuf>,
    pub limit: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
            page_delay: Duration::from_millis(600),
            output: PathBuf::from(DEFAULT_OUTPUT),
            font_dir: None,
            limit: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvOverrides {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    max_attempts: Option<u32>,
    retry_delay_ms: Option<u64>,
    page_delay_ms: Option<u64>,
    output: Option<String>,
    font_dir: Option<String>,
}

impl Settings {
    /// Defaults overlaid with `VUEDOC_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let overrides: EnvOverrides = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read VUEDOC_* settings")?
            .try_deserialize()
            .context("Invalid VUEDOC_* settings")?;
        Ok(Self::default().merge(overrides))
    }

    fn merge(mut self, o: EnvOverrides) -> Self {
        if let Some(v) = o.base_url {
            self.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = o.user_agent {
            self.user_agent = v;
        }
        if let Some(v) = o.timeout_secs {
            self.timeout = Duration::from_secs(v);
        }
        if let Some(v) = o.max_attempts {
            self.max_attempts = v.max(1);
        }
        if let Some(v) = o.retry_delay_ms {
            self.retry_delay = Duration::from_millis(v);
        }
        if let Some(v) = o.page_delay_ms {
            self.page_delay = Duration::from_millis(v);
        }
        if let Some(v) = o.output {
            self.output = PathBuf::from(v);
        }
        if let Some(v) = o.font_dir {
            self.font_dir = Some(PathBuf::from(v));
        }
        self
    }
}
