//! Sequential scraping run over a target list.
//!
//! Each target goes through fetch, extract, normalize and sink before the
//! next one starts. A failing target is logged and recorded in the
//! [`RunSummary`]; the run moves on.

use std::fmt::{Display, Formatter};

use log::{error, info};

use crate::models::config::{BrowserConfig, SessionScope, TargetConfig};
use crate::services::errors::{InitError, ScrapeError};
use crate::services::extractor::extract;
use crate::services::fetcher::{FetcherProvider, PageFetcher, WaitPolicy};
use crate::services::marketplace::MarketplaceRegistry;
use crate::services::normalizer::normalize;
use crate::services::sink::{ScrapedListing, Sink};

/// A target whose cycle failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTarget {
    pub url: String,
    pub error: String,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: Vec<FailedTarget>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    fn record(&mut self, target: &TargetConfig, result: Result<(), ScrapeError>) {
        match result {
            Ok(()) => self.succeeded += 1,
            Err(e) => {
                error!("{}: {e}", target.url);
                self.failed.push(FailedTarget {
                    url: target.url.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} target(s) scraped, {} failed",
            self.succeeded,
            self.total(),
            self.failed.len()
        )?;
        for failed in &self.failed {
            write!(f, "\n  {}: {}", failed.url, failed.error)?;
        }
        Ok(())
    }
}

pub struct Pipeline<P> {
    provider: P,
    registry: MarketplaceRegistry,
    browser: BrowserConfig,
}

impl<P: FetcherProvider> Pipeline<P> {
    pub fn new(provider: P, registry: MarketplaceRegistry, browser: BrowserConfig) -> Self {
        Self {
            provider,
            registry,
            browser,
        }
    }

    /// Scrape every target into `sink`. The sink is not finished here.
    ///
    /// With a per-run session, failing to start the browser aborts the run.
    /// With per-URL sessions it fails only the affected target.
    pub fn run(
        &self,
        targets: &[TargetConfig],
        sink: &mut dyn Sink,
    ) -> Result<RunSummary, InitError> {
        let mut summary = RunSummary::default();
        info!("Scraping {} target(s)", targets.len());

        match self.browser.session {
            SessionScope::PerRun => {
                let fetcher = self.provider.acquire()?;
                for target in targets {
                    summary.record(target, self.scrape(&fetcher, target, sink));
                }
            }
            SessionScope::PerUrl => {
                for target in targets {
                    let result = self
                        .provider
                        .acquire()
                        .map_err(ScrapeError::from)
                        .and_then(|fetcher| self.scrape(&fetcher, target, sink));
                    summary.record(target, result);
                }
            }
        }

        info!("{summary}");
        Ok(summary)
    }

    fn scrape<F: PageFetcher>(
        &self,
        fetcher: &F,
        target: &TargetConfig,
        sink: &mut dyn Sink,
    ) -> Result<(), ScrapeError> {
        let resolved = self.registry.resolve(target)?;
        let marketplace = resolved.marketplace;
        info!(
            "Scraping {} [{}] {}",
            target.product.as_deref().unwrap_or("-"),
            marketplace.id,
            target.url
        );

        let wait = WaitPolicy::from_config(&marketplace.wait_for, &self.browser);
        let page = fetcher.fetch(&target.url, &wait)?;
        let raw = extract(&page.html, &marketplace.selectors, marketplace.json_ld)?;
        let record = normalize(&raw, &resolved.supplier)?;
        info!(
            "{}: {} | price {} | rating {} | shipping {}",
            target.url, record.name, record.price, record.rating, record.shipping_price
        );

        sink.write(&ScrapedListing {
            url: target.url.clone(),
            supplier: resolved.supplier,
            record,
        })?;
        Ok(())
    }
}
