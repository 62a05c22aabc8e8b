use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::ProductCode;
use crate::models::product::{NewProduct as DbNewProduct, Product as DbProduct};
use crate::repository::{
    DieselRepository, ProductReader, ProductWriter, RepositoryError, RepositoryResult,
};

/// Lookup-or-create by `code` on an open connection.
pub(crate) fn find_or_create_product(
    conn: &mut SqliteConnection,
    product: &NewProduct,
) -> RepositoryResult<Product> {
    use crate::schema::products;

    let existing = products::table
        .filter(products::code.eq(product.code.as_str()))
        .first::<DbProduct>(conn)
        .optional()?;

    let row = match existing {
        Some(row) => row,
        None => {
            log::debug!("Creating product {} ({})", product.code, product.model);
            diesel::insert_into(products::table)
                .values(DbNewProduct::from(product))
                .returning(DbProduct::as_returning())
                .get_result(conn)?
        }
    };

    Ok(row.try_into()?)
}

impl ProductReader for DieselRepository {
    fn get_product_by_code(&self, code: &ProductCode) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let result = products::table
            .filter(products::code.eq(code.as_str()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        let result = result.map(TryInto::try_into).transpose()?;
        Ok(result)
    }

    fn count_products(&self) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let total = products::table.count().get_result::<i64>(&mut conn)? as usize;
        Ok(total)
    }
}

impl ProductWriter for DieselRepository {
    fn get_or_create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let mut conn = self.conn()?;
        conn.transaction::<_, RepositoryError, _>(|conn| find_or_create_product(conn, product))
    }
}
