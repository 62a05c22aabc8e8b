use diesel::prelude::*;

use crate::domain::seller::{NewSeller as DomainNewSeller, Seller as DomainSeller};
use crate::domain::types::{SellerName, TypeConstraintError};

/// Diesel representation of a seller row.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::sellers)]
pub struct Seller {
    pub id: i32,
    pub name: String,
    pub supplier_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sellers)]
pub struct NewSeller<'a> {
    pub name: &'a str,
    pub supplier_id: i32,
}

impl TryFrom<Seller> for DomainSeller {
    type Error = TypeConstraintError;

    fn try_from(seller: Seller) -> Result<Self, Self::Error> {
        Ok(Self {
            id: seller.id.try_into()?,
            name: SellerName::new(seller.name)?,
            supplier_id: seller.supplier_id.try_into()?,
        })
    }
}

impl<'a> From<&'a DomainNewSeller> for NewSeller<'a> {
    fn from(seller: &'a DomainNewSeller) -> Self {
        Self {
            name: seller.name.as_str(),
            supplier_id: seller.supplier_id.get(),
        }
    }
}
