//! Core library exports for the marketplace scraper.
//!
//! The `data` feature exposes the persistence layer: domain entities, Diesel
//! models, the schema and repositories for the Suppliers → Sellers →
//! Products → Listings snapshot log. The `cli` feature adds the scraping
//! pipeline (fetch, extract, normalize, sink) and its configuration.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "cli")]
pub mod services;
