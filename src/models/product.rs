use diesel::prelude::*;

use crate::domain::product::{NewProduct as DomainNewProduct, Product as DomainProduct};
use crate::domain::types::{
    ProductBrand, ProductCode, ProductModel, ProductVariant, TypeConstraintError,
};

/// Diesel representation of a product row.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub brand: String,
    pub code: String,
    pub model: String,
    pub variant: Option<String>,
}

/// Insertable form of [`Product`] used for creating new rows.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub brand: &'a str,
    pub code: &'a str,
    pub model: &'a str,
    pub variant: Option<&'a str>,
}

impl TryFrom<Product> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: product.id.try_into()?,
            brand: ProductBrand::new(product.brand)?,
            code: ProductCode::new(product.code)?,
            model: ProductModel::new(product.model)?,
            variant: product
                .variant
                .filter(|v| !v.trim().is_empty())
                .map(ProductVariant::new)
                .transpose()?,
        })
    }
}

impl<'a> From<&'a DomainNewProduct> for NewProduct<'a> {
    fn from(product: &'a DomainNewProduct) -> Self {
        Self {
            brand: product.brand.as_str(),
            code: product.code.as_str(),
            model: product.model.as_str(),
            variant: product.variant.as_ref().map(|v| v.as_str()),
        }
    }
}
