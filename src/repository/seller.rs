use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::seller::{NewSeller, Seller};
use crate::domain::types::{SellerName, SupplierId};
use crate::models::seller::{NewSeller as DbNewSeller, Seller as DbSeller};
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, SellerReader, SellerWriter,
};

/// Lookup-or-create by `(supplier_id, name)` on an open connection.
pub(crate) fn find_or_create_seller(
    conn: &mut SqliteConnection,
    seller: &NewSeller,
) -> RepositoryResult<Seller> {
    use crate::schema::sellers;

    let existing = sellers::table
        .filter(sellers::supplier_id.eq(seller.supplier_id.get()))
        .filter(sellers::name.eq(seller.name.as_str()))
        .first::<DbSeller>(conn)
        .optional()?;

    let row = match existing {
        Some(row) => row,
        None => diesel::insert_into(sellers::table)
            .values(DbNewSeller::from(seller))
            .returning(DbSeller::as_returning())
            .get_result(conn)?,
    };

    Ok(row.try_into()?)
}

impl SellerReader for DieselRepository {
    fn get_seller(
        &self,
        supplier_id: SupplierId,
        name: &SellerName,
    ) -> RepositoryResult<Option<Seller>> {
        use crate::schema::sellers;

        let mut conn = self.conn()?;

        let result = sellers::table
            .filter(sellers::supplier_id.eq(supplier_id.get()))
            .filter(sellers::name.eq(name.as_str()))
            .first::<DbSeller>(&mut conn)
            .optional()?;

        let result = result.map(TryInto::try_into).transpose()?;
        Ok(result)
    }
}

impl SellerWriter for DieselRepository {
    fn get_or_create_seller(&self, seller: &NewSeller) -> RepositoryResult<Seller> {
        let mut conn = self.conn()?;
        conn.transaction::<_, RepositoryError, _>(|conn| find_or_create_seller(conn, seller))
    }
}
