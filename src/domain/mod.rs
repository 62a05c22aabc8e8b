//! Persistence-independent domain entities.

pub mod listing;
pub mod product;
pub mod seller;
pub mod supplier;
pub mod types;
