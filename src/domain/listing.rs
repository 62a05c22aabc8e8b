use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::product::NewProduct;
use crate::domain::supplier::NewSupplier;
use crate::domain::types::{
    ListingId, ListingUrl, Price, ProductId, Rating, SellerId, SellerName, ShippingEta,
    ShippingPrice, SupplierId,
};

/// One timestamped observation of a product offered by a seller.
///
/// Listings are append-only: `created_at` is assigned on insertion and rows
/// are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub url: ListingUrl,
    pub price: Price,
    pub rating: Rating,
    pub shipping_price: ShippingPrice,
    pub shipping_eta: Option<ShippingEta>,
    pub created_at: NaiveDateTime,
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub supplier_id: SupplierId,
}

/// Information required to append a new [`Listing`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewListing {
    pub url: ListingUrl,
    pub price: Price,
    pub rating: Rating,
    pub shipping_price: ShippingPrice,
    pub shipping_eta: Option<ShippingEta>,
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub supplier_id: SupplierId,
}

/// A scraped listing with the natural keys of its parents.
///
/// Recording an observation resolves the supplier, seller and product by
/// natural key (creating them when absent) and appends one [`Listing`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub supplier: NewSupplier,
    pub seller: SellerName,
    pub product: NewProduct,
    pub url: ListingUrl,
    pub price: Price,
    pub rating: Rating,
    pub shipping_price: ShippingPrice,
    pub shipping_eta: Option<ShippingEta>,
}
