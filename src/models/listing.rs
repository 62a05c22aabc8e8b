use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::listing::{Listing as DomainListing, NewListing as DomainNewListing};
use crate::domain::types::{
    ListingUrl, Price, Rating, ShippingEta, ShippingPrice, TypeConstraintError,
};

/// Diesel representation of a listing row.
///
/// Decimal columns are stored as text so that prices keep their exact
/// fixed-point value.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::listings)]
pub struct Listing {
    pub id: i32,
    pub url: String,
    pub price: String,
    pub rating: String,
    pub shipping_price: String,
    pub shipping_eta: Option<String>,
    pub created_at: NaiveDateTime,
    pub product_id: i32,
    pub seller_id: i32,
    pub supplier_id: i32,
}

/// Insertable form of [`Listing`]; `created_at` is supplied by the repository.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::listings)]
pub struct NewListing<'a> {
    pub url: &'a str,
    pub price: String,
    pub rating: String,
    pub shipping_price: String,
    pub shipping_eta: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub product_id: i32,
    pub seller_id: i32,
    pub supplier_id: i32,
}

impl TryFrom<Listing> for DomainListing {
    type Error = TypeConstraintError;

    fn try_from(listing: Listing) -> Result<Self, Self::Error> {
        Ok(Self {
            id: listing.id.try_into()?,
            url: ListingUrl::new(listing.url)?,
            price: Price::parse(&listing.price)?,
            rating: Rating::parse(&listing.rating)?,
            shipping_price: ShippingPrice::parse(&listing.shipping_price)?,
            shipping_eta: listing.shipping_eta.map(ShippingEta::new).transpose()?,
            created_at: listing.created_at,
            product_id: listing.product_id.try_into()?,
            seller_id: listing.seller_id.try_into()?,
            supplier_id: listing.supplier_id.try_into()?,
        })
    }
}

impl<'a> NewListing<'a> {
    /// Builds the insertable row, stamping it with `created_at`.
    pub fn new(listing: &'a DomainNewListing, created_at: NaiveDateTime) -> Self {
        Self {
            url: listing.url.as_str(),
            price: listing.price.to_string(),
            rating: listing.rating.to_string(),
            shipping_price: listing.shipping_price.to_string(),
            shipping_eta: listing.shipping_eta.as_ref().map(|eta| eta.as_str()),
            created_at,
            product_id: listing.product_id.get(),
            seller_id: listing.seller_id.get(),
            supplier_id: listing.supplier_id.get(),
        }
    }
}
