//! Page fetching through a headless Chrome session.
//!
//! [`PageFetcher`] is the seam the pipeline depends on; [`ChromeFetcher`]
//! drives a real browser. The browser process lives as long as the fetcher
//! and every fetch runs in its own tab, closed when the fetch returns.

use std::ffi::OsStr;
use std::ops::Deref;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use log::{debug, info, warn};

use crate::models::config::BrowserConfig;
use crate::services::errors::FetchError;

/// Fractions of the page height visited by the warm-up scroll.
const WARMUP_STEPS: [f64; 3] = [0.25, 0.6, 0.0];

/// Rendered content of a product page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub html: String,
}

/// How long to wait for a page to become readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Element whose presence marks the page as rendered.
    pub selector: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub fn new(selector: impl Into<String>, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            selector: selector.into(),
            timeout,
            poll_interval,
        }
    }

    /// Wait policy for `selector` using the browser timeouts.
    pub fn from_config(selector: impl Into<String>, config: &BrowserConfig) -> Self {
        Self::new(
            selector,
            Duration::from_secs(config.wait_timeout_secs),
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    /// Number of presence checks performed before giving up.
    pub fn max_attempts(&self) -> u32 {
        let interval = self.poll_interval.as_millis().max(1);
        let attempts = self.timeout.as_millis() / interval + 1;
        u32::try_from(attempts).unwrap_or(u32::MAX)
    }
}

/// Calls `probe` with a fixed backoff until it succeeds or the policy's
/// attempts run out. Returns whether the probe succeeded.
pub fn poll_until<F>(policy: &WaitPolicy, mut probe: F) -> bool
where
    F: FnMut() -> bool,
{
    let attempts = policy.max_attempts();
    for attempt in 1..=attempts {
        if probe() {
            return true;
        }
        if attempt < attempts {
            thread::sleep(policy.poll_interval);
        }
    }
    false
}

/// Loads a URL and returns its rendered HTML.
pub trait PageFetcher {
    fn fetch(&self, url: &str, wait: &WaitPolicy) -> Result<Page, FetchError>;
}

/// Acquires fetchers, one per browser session.
pub trait FetcherProvider {
    type Fetcher: PageFetcher;

    fn acquire(&self) -> Result<Self::Fetcher, FetchError>;
}

/// Launches a Chrome process per acquired session.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl FetcherProvider for ChromeLauncher {
    type Fetcher = ChromeFetcher;

    fn acquire(&self) -> Result<ChromeFetcher, FetchError> {
        ChromeFetcher::launch(&self.config)
    }
}

/// Fetcher backed by a headless Chrome process. Dropping the `Browser`
/// terminates the process.
pub struct ChromeFetcher {
    browser: Browser,
    config: BrowserConfig,
}

impl ChromeFetcher {
    pub fn launch(config: &BrowserConfig) -> Result<Self, FetchError> {
        let lang = format!("--lang={}", config.language);
        let idle_timeout = Duration::from_secs(
            config
                .navigation_timeout_secs
                .max(config.wait_timeout_secs)
                .saturating_mul(2),
        );
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .path(config.chrome_path.clone())
            .args(vec![OsStr::new(lang.as_str())])
            .idle_browser_timeout(idle_timeout)
            .build()
            .map_err(|e| FetchError::Launch(e.to_string()))?;
        let browser = Browser::new(options).map_err(|e| FetchError::Launch(e.to_string()))?;
        info!("Browser launched (headless: {})", config.headless);
        Ok(Self {
            browser,
            config: config.clone(),
        })
    }

    fn open_tab(&self, url: &str) -> Result<TabGuard, FetchError> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| navigation_error(url, e))?;
        Ok(TabGuard(tab))
    }

    fn warmup(&self, tab: &Tab, poll_interval: Duration) {
        for fraction in WARMUP_STEPS {
            let script = format!("window.scrollTo(0, document.body.scrollHeight * {fraction});");
            if let Err(e) = tab.evaluate(&script, false) {
                debug!("Warm-up scroll failed: {e}");
                return;
            }
            thread::sleep(poll_interval);
        }
    }
}

impl PageFetcher for ChromeFetcher {
    fn fetch(&self, url: &str, wait: &WaitPolicy) -> Result<Page, FetchError> {
        let tab = self.open_tab(url)?;
        tab.set_default_timeout(Duration::from_secs(self.config.navigation_timeout_secs));
        if let Some(user_agent) = &self.config.user_agent {
            tab.set_user_agent(user_agent, Some(self.config.language.as_str()), None)
                .map_err(|e| navigation_error(url, e))?;
        }
        tab.navigate_to(url).map_err(|e| navigation_error(url, e))?;
        tab.wait_until_navigated().map_err(|e| navigation_error(url, e))?;

        if !poll_until(wait, || tab.find_element(&wait.selector).is_ok()) {
            return Err(FetchError::Timeout {
                url: url.to_string(),
                selector: wait.selector.clone(),
                waited: wait.timeout,
            });
        }

        if self.config.warmup_scroll {
            self.warmup(&tab, wait.poll_interval);
        }

        let html = tab.get_content().map_err(|e| FetchError::Content {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!("Fetched {} bytes from {url}", html.len());
        Ok(Page {
            url: url.to_string(),
            html,
        })
    }
}

fn navigation_error(url: &str, error: impl std::fmt::Display) -> FetchError {
    FetchError::Navigation {
        url: url.to_string(),
        message: error.to_string(),
    }
}

/// Browser tab closed when dropped.
struct TabGuard(Arc<Tab>);

impl Deref for TabGuard {
    type Target = Tab;

    fn deref(&self) -> &Tab {
        &self.0
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.close(false) {
            warn!("Failed to close browser tab: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn policy(timeout_ms: u64, interval_ms: u64) -> WaitPolicy {
        WaitPolicy::new(
            "#price",
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    #[test]
    fn attempts_are_bounded_by_timeout() {
        assert_eq!(policy(1000, 250).max_attempts(), 5);
        assert_eq!(policy(0, 250).max_attempts(), 1);
        assert_eq!(policy(10, 0).max_attempts(), 11);
    }

    #[test]
    fn polling_stops_at_first_success() {
        let calls = Cell::new(0);
        let found = poll_until(&policy(50, 1), || {
            calls.set(calls.get() + 1);
            calls.get() == 3
        });

        assert!(found);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn polling_gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let found = poll_until(&policy(4, 1), || {
            calls.set(calls.get() + 1);
            false
        });

        assert!(!found);
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn wait_policy_reads_browser_timeouts() {
        let config = BrowserConfig {
            wait_timeout_secs: 3,
            poll_interval_ms: 100,
            ..BrowserConfig::default()
        };
        let wait = WaitPolicy::from_config("h1", &config);

        assert_eq!(wait.timeout, Duration::from_secs(3));
        assert_eq!(wait.poll_interval, Duration::from_millis(100));
        assert_eq!(wait.max_attempts(), 31);
    }
}
