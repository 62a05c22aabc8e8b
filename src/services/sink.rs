//! Destinations for normalized listings.
//!
//! [`TableSink`] collects rows and renders a CSV or XLSX file when the run
//! finishes. [`SqlSink`] records every listing in the relational store as it
//! arrives.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::db::{establish_connection_pool, run_migrations};
use crate::domain::listing::Observation;
use crate::domain::product::NewProduct;
use crate::domain::supplier::NewSupplier;
use crate::domain::types::{ListingUrl, SupplierName};
use crate::repository::{DieselRepository, ListingWriter, RepositoryResult};
use crate::services::errors::SinkError;
use crate::services::export::{ExportFormat, render_table};
use crate::services::normalizer::NormalizedRecord;

/// Columns of an exported listing table.
pub const EXPORT_HEADERS: [&str; 6] = [
    "product",
    "price",
    "rating",
    "shipping_price",
    "shipping_eta",
    "marketplace",
];

/// A normalized record with the page and supplier it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedListing {
    pub url: String,
    /// Supplier (marketplace) display name.
    pub supplier: String,
    pub record: NormalizedRecord,
}

impl ScrapedListing {
    /// The export row, in [`EXPORT_HEADERS`] order.
    pub fn to_row(&self) -> Vec<String> {
        let record = &self.record;
        vec![
            record.name.to_string(),
            record.price.to_string(),
            record.rating.to_string(),
            record.shipping_price.to_string(),
            record
                .shipping_eta
                .as_ref()
                .map(|eta| eta.to_string())
                .unwrap_or_default(),
            self.supplier.clone(),
        ]
    }

    /// The relational observation: supplier code from the supplier name and
    /// product identity derived from the product name.
    pub fn to_observation<B: AsRef<str>>(&self, brands: &[B]) -> Result<Observation, SinkError> {
        let record = &self.record;
        Ok(Observation {
            supplier: NewSupplier::from_name(SupplierName::new(self.supplier.as_str())?)?,
            seller: record.seller.clone(),
            product: NewProduct::from_name(&record.name, brands)?,
            url: ListingUrl::new(self.url.as_str())?,
            price: record.price,
            rating: record.rating,
            shipping_price: record.shipping_price,
            shipping_eta: record.shipping_eta.clone(),
        })
    }
}

pub trait Sink {
    fn write(&mut self, listing: &ScrapedListing) -> Result<(), SinkError>;

    /// Flush buffered output. Returns the written file, if any.
    fn finish(&mut self) -> Result<Option<PathBuf>, SinkError>;
}

/// Buffers rows and writes a spreadsheet on [`Sink::finish`].
#[derive(Debug)]
pub struct TableSink {
    format: ExportFormat,
    path: PathBuf,
    rows: Vec<Vec<String>>,
}

impl TableSink {
    /// `path` receives the format's extension when it has none.
    pub fn new(format: ExportFormat, path: impl Into<PathBuf>) -> Self {
        let mut path = path.into();
        if path.extension().is_none() {
            path.set_extension(format.extension());
        }
        Self {
            format,
            path,
            rows: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl Sink for TableSink {
    fn write(&mut self, listing: &ScrapedListing) -> Result<(), SinkError> {
        self.rows.push(listing.to_row());
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<PathBuf>, SinkError> {
        let bytes = render_table(self.format, &EXPORT_HEADERS, &self.rows)?;
        std::fs::write(&self.path, bytes).map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(
            "Wrote {} listing(s) to {}",
            self.rows.len(),
            self.path.display()
        );
        Ok(Some(self.path.clone()))
    }
}

/// Records listings through a repository, one transaction per listing.
pub struct SqlSink<R> {
    repo: R,
    brands: Vec<String>,
    written: usize,
}

impl SqlSink<DieselRepository> {
    /// Connect to `database_url` and apply pending migrations.
    pub fn open(database_url: &str, brands: Vec<String>) -> RepositoryResult<Self> {
        let pool = establish_connection_pool(database_url)?;
        run_migrations(&pool)?;
        Ok(Self::new(DieselRepository::new(pool), brands))
    }
}

impl<R: ListingWriter> SqlSink<R> {
    pub fn new(repo: R, brands: Vec<String>) -> Self {
        Self {
            repo,
            brands,
            written: 0,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

impl<R: ListingWriter> Sink for SqlSink<R> {
    fn write(&mut self, listing: &ScrapedListing) -> Result<(), SinkError> {
        let observation = listing.to_observation(&self.brands)?;
        let stored = self.repo.record_observation(&observation)?;
        self.written += 1;
        debug!(
            "Stored listing {} for product {} from {}",
            stored.id, stored.product_id, listing.url
        );
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<PathBuf>, SinkError> {
        info!("Stored {} listing(s) in the database", self.written);
        Ok(None)
    }
}
