use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::repository::errors::RepositoryError;
use crate::services::export::ExportError;
use crate::services::targets::TargetsError;

/// A field read from a product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Price,
    Rating,
    Shipping,
    ShippingEta,
    Seller,
    WaitFor,
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Price => "price",
            Field::Rating => "rating",
            Field::Shipping => "shipping",
            Field::ShippingEta => "shipping_eta",
            Field::Seller => "seller",
            Field::WaitFor => "wait_for",
        };
        f.write_str(name)
    }
}

/// Failures while loading a page in the browser.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("`{selector}` did not appear on {url} within {waited:?}")]
    Timeout {
        url: String,
        selector: String,
        waited: Duration,
    },
    #[error("failed to read page content of {url}: {message}")]
    Content { url: String, message: String },
}

/// Failures while reading fields from rendered HTML.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no element matched `{selector}` for required field {field}")]
    SelectorMiss { field: Field, selector: String },
    #[error("invalid selector `{selector}` for field {field}")]
    InvalidSelector { field: Field, selector: String },
}

/// Failures while converting extracted text into typed values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("unparsable price: {0:?}")]
    Price(String),
    #[error("unparsable rating: {0:?}")]
    Rating(String),
    #[error("{0}")]
    Constraint(String),
}

/// Failures while writing normalized records.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Failure of one URL's fetch, extract, normalize and sink cycle.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid target: {0}")]
    Target(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Fatal failures: configuration, browser launch, database setup or
/// writing the final output. The process exits with a non-zero code.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("marketplace configuration error: {0}")]
    Marketplace(#[from] ExtractionError),
    #[error("target list error: {0}")]
    Targets(#[from] TargetsError),
    #[error("browser error: {0}")]
    Browser(#[from] FetchError),
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),
    #[error("output error: {0}")]
    Output(#[from] SinkError),
}
