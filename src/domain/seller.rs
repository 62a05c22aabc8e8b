use serde::{Deserialize, Serialize};

use crate::domain::types::{SellerId, SellerName, SupplierId};

/// A merchant account operating within a supplier's marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seller {
    pub id: SellerId,
    pub name: SellerName,
    pub supplier_id: SupplierId,
}

/// Information required to create a new [`Seller`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSeller {
    pub name: SellerName,
    pub supplier_id: SupplierId,
}
