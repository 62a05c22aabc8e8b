use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::supplier::{NewSupplier, Supplier};
use crate::domain::types::SupplierCode;
use crate::models::supplier::{NewSupplier as DbNewSupplier, Supplier as DbSupplier};
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, SupplierReader, SupplierWriter,
};

/// Lookup-or-create by `code` on an open connection.
pub(crate) fn find_or_create_supplier(
    conn: &mut SqliteConnection,
    supplier: &NewSupplier,
) -> RepositoryResult<Supplier> {
    use crate::schema::suppliers;

    let existing = suppliers::table
        .filter(suppliers::code.eq(supplier.code.as_str()))
        .first::<DbSupplier>(conn)
        .optional()?;

    let row = match existing {
        Some(row) => row,
        None => {
            log::debug!("Creating supplier {}", supplier.code);
            diesel::insert_into(suppliers::table)
                .values(DbNewSupplier::from(supplier))
                .returning(DbSupplier::as_returning())
                .get_result(conn)?
        }
    };

    Ok(row.try_into()?)
}

impl SupplierReader for DieselRepository {
    fn get_supplier_by_code(&self, code: &SupplierCode) -> RepositoryResult<Option<Supplier>> {
        use crate::schema::suppliers;

        let mut conn = self.conn()?;

        let result = suppliers::table
            .filter(suppliers::code.eq(code.as_str()))
            .first::<DbSupplier>(&mut conn)
            .optional()?;

        let result = result.map(TryInto::try_into).transpose()?;
        Ok(result)
    }

    fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>> {
        use crate::schema::suppliers;

        let mut conn = self.conn()?;

        let results = suppliers::table
            .order(suppliers::name.asc())
            .load::<DbSupplier>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Supplier>, _>>()?;
        Ok(results)
    }
}

impl SupplierWriter for DieselRepository {
    fn get_or_create_supplier(&self, supplier: &NewSupplier) -> RepositoryResult<Supplier> {
        let mut conn = self.conn()?;
        conn.transaction::<_, RepositoryError, _>(|conn| find_or_create_supplier(conn, supplier))
    }
}
