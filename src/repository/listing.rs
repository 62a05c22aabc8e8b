use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::listing::{Listing, NewListing, Observation};
use crate::domain::seller::NewSeller;
use crate::models::listing::{Listing as DbListing, NewListing as DbNewListing};
use crate::repository::product::find_or_create_product;
use crate::repository::seller::find_or_create_seller;
use crate::repository::supplier::find_or_create_supplier;
use crate::repository::{
    DieselRepository, ListingHistoryQuery, ListingReader, ListingWriter, RepositoryError,
    RepositoryResult,
};

/// Appends a listing on an open connection.
fn append_listing(conn: &mut SqliteConnection, listing: &NewListing) -> RepositoryResult<Listing> {
    use crate::schema::{listings, sellers, suppliers};

    // Unknown sellers and suppliers are left to the foreign key check.
    let seller_supplier = sellers::table
        .filter(sellers::id.eq(listing.seller_id.get()))
        .select(sellers::supplier_id)
        .first::<i32>(conn)
        .optional()?;
    if let Some(supplier_id) = seller_supplier {
        let supplier_exists = suppliers::table
            .filter(suppliers::id.eq(listing.supplier_id.get()))
            .select(suppliers::id)
            .first::<i32>(conn)
            .optional()?
            .is_some();
        if supplier_exists && supplier_id != listing.supplier_id.get() {
            return Err(RepositoryError::ValidationError(format!(
                "seller {} does not belong to supplier {}",
                listing.seller_id, listing.supplier_id
            )));
        }
    }

    let created_at = Utc::now().naive_utc();
    let row = diesel::insert_into(listings::table)
        .values(DbNewListing::new(listing, created_at))
        .returning(DbListing::as_returning())
        .get_result(conn)?;

    Ok(row.try_into()?)
}

impl ListingReader for DieselRepository {
    fn list_price_history(&self, query: ListingHistoryQuery) -> RepositoryResult<Vec<Listing>> {
        use crate::schema::listings;

        let mut conn = self.conn()?;

        let mut items = listings::table
            .filter(listings::product_id.eq(query.product_id.get()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(seller_id) = query.seller_id {
            items = items.filter(listings::seller_id.eq(seller_id.get()));
        }

        let items = items
            .order((listings::created_at.asc(), listings::id.asc()))
            .load::<DbListing>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Listing>, _>>()?;

        Ok(items)
    }

    fn count_listings(&self) -> RepositoryResult<usize> {
        use crate::schema::listings;

        let mut conn = self.conn()?;
        let total = listings::table.count().get_result::<i64>(&mut conn)? as usize;
        Ok(total)
    }
}

impl ListingWriter for DieselRepository {
    fn insert_listing(&self, listing: &NewListing) -> RepositoryResult<Listing> {
        let mut conn = self.conn()?;
        conn.transaction::<_, RepositoryError, _>(|conn| append_listing(conn, listing))
    }

    fn record_observation(&self, observation: &Observation) -> RepositoryResult<Listing> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let supplier = find_or_create_supplier(conn, &observation.supplier)?;
            let seller = find_or_create_seller(
                conn,
                &NewSeller {
                    name: observation.seller.clone(),
                    supplier_id: supplier.id,
                },
            )?;
            let product = find_or_create_product(conn, &observation.product)?;

            append_listing(
                conn,
                &NewListing {
                    url: observation.url.clone(),
                    price: observation.price,
                    rating: observation.rating,
                    shipping_price: observation.shipping_price,
                    shipping_eta: observation.shipping_eta.clone(),
                    product_id: product.id,
                    seller_id: seller.id,
                    supplier_id: supplier.id,
                },
            )
        })
    }
}
