//! Diesel row types and their conversions to domain entities.

#[cfg(feature = "cli")]
pub mod config;
pub mod listing;
pub mod product;
pub mod seller;
pub mod supplier;
