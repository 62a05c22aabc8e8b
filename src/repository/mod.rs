use crate::db::{DbConnection, DbPool};
use crate::domain::listing::{Listing, NewListing, Observation};
use crate::domain::product::{NewProduct, Product};
use crate::domain::seller::{NewSeller, Seller};
use crate::domain::supplier::{NewSupplier, Supplier};
use crate::domain::types::{ProductCode, ProductId, SellerId, SellerName, SupplierCode, SupplierId};

pub mod errors;
pub mod listing;
pub mod product;
pub mod seller;
pub mod supplier;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when reading a price history.
#[derive(Debug, Clone)]
pub struct ListingHistoryQuery {
    /// Product whose observations are returned.
    pub product_id: ProductId,
    /// Restrict to a single seller.
    pub seller_id: Option<SellerId>,
}

impl ListingHistoryQuery {
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            seller_id: None,
        }
    }
    pub fn seller(mut self, seller_id: SellerId) -> Self {
        self.seller_id = Some(seller_id);
        self
    }
}

/// Read-only operations for supplier entities.
pub trait SupplierReader {
    /// Retrieve a supplier by its unique code.
    fn get_supplier_by_code(&self, code: &SupplierCode) -> RepositoryResult<Option<Supplier>>;
    /// List all suppliers ordered by name.
    fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>>;
}

/// Write operations for supplier entities.
pub trait SupplierWriter {
    /// Return the supplier with the same code, inserting it when absent.
    fn get_or_create_supplier(&self, supplier: &NewSupplier) -> RepositoryResult<Supplier>;
}

/// Read-only operations for seller entities.
pub trait SellerReader {
    /// Retrieve a seller by name within a supplier.
    fn get_seller(
        &self,
        supplier_id: SupplierId,
        name: &SellerName,
    ) -> RepositoryResult<Option<Seller>>;
}

/// Write operations for seller entities.
pub trait SellerWriter {
    /// Return the seller with the same supplier and name, inserting it when absent.
    fn get_or_create_seller(&self, seller: &NewSeller) -> RepositoryResult<Seller>;
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// Retrieve a product by its unique code.
    fn get_product_by_code(&self, code: &ProductCode) -> RepositoryResult<Option<Product>>;
    /// Number of catalog products.
    fn count_products(&self) -> RepositoryResult<usize>;
}

/// Write operations for product entities.
pub trait ProductWriter {
    /// Return the product with the same code, inserting it when absent.
    fn get_or_create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
}

/// Read-only operations for listing entities.
pub trait ListingReader {
    /// Observations of a product ordered from oldest to newest.
    fn list_price_history(&self, query: ListingHistoryQuery) -> RepositoryResult<Vec<Listing>>;
    /// Number of stored observations.
    fn count_listings(&self) -> RepositoryResult<usize>;
}

/// Append-only operations for listing entities.
pub trait ListingWriter {
    /// Append a listing referencing existing parents. `created_at` is
    /// assigned here.
    fn insert_listing(&self, listing: &NewListing) -> RepositoryResult<Listing>;
    /// Resolve the observation's parents by natural key and append the
    /// listing in a single transaction.
    fn record_observation(&self, observation: &Observation) -> RepositoryResult<Listing>;
}
