use diesel::prelude::*;

use crate::domain::supplier::{NewSupplier as DomainNewSupplier, Supplier as DomainSupplier};
use crate::domain::types::{SupplierCode, SupplierName, TypeConstraintError};

/// Diesel representation of a supplier row.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::suppliers)]
pub struct Supplier {
    pub id: i32,
    pub name: String,
    pub code: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::suppliers)]
pub struct NewSupplier<'a> {
    pub name: &'a str,
    pub code: &'a str,
}

impl TryFrom<Supplier> for DomainSupplier {
    type Error = TypeConstraintError;

    fn try_from(supplier: Supplier) -> Result<Self, Self::Error> {
        Ok(Self {
            id: supplier.id.try_into()?,
            name: SupplierName::new(supplier.name)?,
            code: SupplierCode::new(supplier.code)?,
        })
    }
}

impl<'a> From<&'a DomainNewSupplier> for NewSupplier<'a> {
    fn from(supplier: &'a DomainNewSupplier) -> Self {
        Self {
            name: supplier.name.as_str(),
            code: supplier.code.as_str(),
        }
    }
}
