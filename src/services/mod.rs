//! Scraping pipeline: fetch, extract, normalize and sink.

pub mod errors;
pub mod export;
pub mod extractor;
pub mod fetcher;
pub mod marketplace;
pub mod normalizer;
pub mod pipeline;
pub mod sink;
pub mod targets;
