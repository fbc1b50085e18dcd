use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::parser::{self, FetchedPage};
use crate::settings::Settings;

/// Pause used between attempts and between pages; swapped for a no-op in tests.
pub type Sleep = Rc<dyn Fn(Duration)>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
}

/// Where page markup comes from.
pub trait PageSource {
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP source. Certificate validation is off: the docs mirror is
/// fetched over HTTPS but its chain is not trusted.
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(HttpSource { client })
    }
}

impl PageSource for HttpSource {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes()?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

pub struct Fetcher<S> {
    source: S,
    base_url: String,
    max_attempts: u32,
    retry_delay: Duration,
    visited: HashSet<String>,
    sleep: Sleep,
}

impl<S: PageSource> Fetcher<S> {
    pub fn new(source: S, settings: &Settings, sleep: Sleep) -> Self {
        Fetcher {
            source,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_attempts: settings.max_attempts.max(1),
            retry_delay: settings.retry_delay,
            visited: HashSet::new(),
            sleep,
        }
    }

    /// Absolute URLs pass through; site paths are joined onto the origin.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Fetch and extract one page. Returns `None` for an already visited
    /// path, for a page without a main-content region, and after the last
    /// failed attempt. Never errors.
    pub fn fetch(&mut self, path: &str) -> Option<FetchedPage> {
        if !self.visited.insert(path.to_string()) {
            debug!("Already fetched {}, skipping", path);
            return None;
        }
        let url = self.resolve(path);

        for attempt in 1..=self.max_attempts {
            match self.source.get(&url) {
                Ok(markup) => {
                    return match parser::extract_page(&markup) {
                        Ok(page) => Some(page),
                        Err(e) => {
                            warn!("Skipping {}: {}", path, e);
                            None
                        }
                    };
                }
                Err(e) => {
                    warn!(
                        "Fetch failed for {} (attempt {}/{}): {}",
                        path, attempt, self.max_attempts, e
                    );
                    if attempt < self.max_attempts {
                        (self.sleep)(self.retry_delay);
                    }
                }
            }
        }

        warn!("Giving up on {} after {} attempts", path, self.max_attempts);
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    /// Scripted responses per URL; a URL with no script left fails with 503.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        pub responses: RefCell<HashMap<String, VecDeque<Result<String, FetchError>>>>,
        pub calls: RefCell<Vec<String>>,
    }

    impl ScriptedSource {
        pub fn with(mut self, url: &str, response: Result<String, FetchError>) -> Self {
            self.responses
                .get_mut()
                .entry(url.to_string())
                .or_default()
                .push_back(response);
            self
        }

        pub fn calls_to(&self, url: &str) -> usize {
            self.calls.borrow().iter().filter(|u| u.as_str() == url).count()
        }
    }

    impl PageSource for Rc<ScriptedSource> {
        fn get(&self, url: &str) -> Result<String, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            self.responses
                .borrow_mut()
                .get_mut(url)
                .and_then(|queue| queue.pop_front())
                .unwrap_or(Err(FetchError::Status(503)))
        }
    }

    pub(crate) fn recording_sleep() -> (Sleep, Rc<RefCell<Vec<Duration>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (Rc::new(move |d: Duration| sink.borrow_mut().push(d)), log)
    }

    fn page(body: &str) -> Result<String, FetchError> {
        Ok(format!("<html><body><main>{}</main></body></html>", body))
    }

    fn fetcher(source: &Rc<ScriptedSource>) -> (Fetcher<Rc<ScriptedSource>>, Rc<RefCell<Vec<Duration>>>) {
        let (sleep, log) = recording_sleep();
        (Fetcher::new(Rc::clone(source), &Settings::default(), sleep), log)
    }

    #[test]
    fn resolves_relative_and_absolute() {
        let source = Rc::new(ScriptedSource::default());
        let (f, _) = fetcher(&source);
        assert_eq!(f.resolve("/guide/a.html"), "https://cn.vuejs.org/guide/a.html");
        assert_eq!(f.resolve("guide/a.html"), "https://cn.vuejs.org/guide/a.html");
        assert_eq!(f.resolve("https://vuejs.org/x"), "https://vuejs.org/x");
    }

    #[test]
    fn successful_fetch() {
        let source = Rc::new(
            ScriptedSource::default().with("https://cn.vuejs.org/a", page("<p>hello</p>")),
        );
        let (mut f, sleeps) = fetcher(&source);
        let fetched = f.fetch("/a").unwrap();
        assert_eq!(fetched.text, "hello");
        assert!(f.visited.contains("/a"));
        assert!(sleeps.borrow().is_empty());
    }

    #[test]
    fn visited_path_is_not_refetched() {
        let source = Rc::new(
            ScriptedSource::default()
                .with("https://cn.vuejs.org/a", page("<p>first</p>"))
                .with("https://cn.vuejs.org/a", page("<p>second</p>")),
        );
        let (mut f, _) = fetcher(&source);
        assert!(f.fetch("/a").is_some());
        assert!(f.fetch("/a").is_none());
        assert_eq!(source.calls_to("https://cn.vuejs.org/a"), 1);
    }

    #[test]
    fn three_failures_give_up() {
        let source = Rc::new(ScriptedSource::default());
        let (mut f, sleeps) = fetcher(&source);
        assert!(f.fetch("/c").is_none());
        assert_eq!(source.calls_to("https://cn.vuejs.org/c"), 3);
        assert_eq!(*sleeps.borrow(), vec![Duration::from_secs(1); 2]);
        // a failed path still counts as visited
        assert!(f.fetch("/c").is_none());
        assert_eq!(source.calls_to("https://cn.vuejs.org/c"), 3);
    }

    #[test]
    fn recovers_on_retry() {
        let source = Rc::new(
            ScriptedSource::default()
                .with("https://cn.vuejs.org/r", Err(FetchError::Status(502)))
                .with("https://cn.vuejs.org/r", page("<p>back</p>")),
        );
        let (mut f, sleeps) = fetcher(&source);
        assert_eq!(f.fetch("/r").unwrap().text, "back");
        assert_eq!(sleeps.borrow().len(), 1);
    }

    #[test]
    fn missing_main_is_not_retried() {
        let source = Rc::new(ScriptedSource::default().with(
            "https://cn.vuejs.org/n",
            Ok("<html><body><div>nothing</div></body></html>".to_string()),
        ));
        let (mut f, sleeps) = fetcher(&source);
        assert!(f.fetch("/n").is_none());
        assert_eq!(source.calls_to("https://cn.vuejs.org/n"), 1);
        assert!(sleeps.borrow().is_empty());
    }
}
