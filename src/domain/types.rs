//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, text values and numeric constraints are enforced at the
//! boundary. Monetary values and ratings are fixed-point decimals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use validator::ValidateUrl;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A numeric value fell outside its allowed range.
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// Stored decimal text could not be parsed.
    #[error("{0} is not a valid decimal")]
    InvalidDecimal(&'static str),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        Self::new_for_field(value, "value")
    }

    /// Same as [`Self::new`] but with field-specific error context.
    pub fn new_for_field<S: Into<String>>(
        value: S,
        field: &'static str,
    ) -> Result<Self, TypeConstraintError> {
        trim_and_require_non_empty(value, field).map(Self)
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new_for_field(value, $field)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! url_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed URL and validates its format.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                if !trimmed.as_str().validate_url() {
                    return Err(TypeConstraintError::InvalidUrl($field));
                }
                Ok(Self(trimmed))
            }

            /// Borrow the URL as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! non_negative_decimal_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(Decimal);

        impl $name {
            /// Constructs a decimal value that is zero or greater, with two
            /// fractional digits.
            pub fn new(value: Decimal) -> Result<Self, TypeConstraintError> {
                if value.is_sign_negative() && !value.is_zero() {
                    return Err(TypeConstraintError::NegativeNumber($field));
                }
                let mut value = value;
                value.rescale(2);
                Ok(Self(value))
            }

            /// Zero amount, rendered as `0.00`.
            pub fn zero() -> Self {
                Self(Decimal::new(0, 2))
            }

            /// Parses the decimal text representation used in persistence.
            pub fn parse(text: &str) -> Result<Self, TypeConstraintError> {
                let value = Decimal::from_str(text.trim())
                    .map_err(|_| TypeConstraintError::InvalidDecimal($field))?;
                Self::new(value)
            }

            /// Returns the raw decimal value.
            pub const fn get(self) -> Decimal {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<Decimal> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: Decimal) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for Decimal {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<Decimal> for $name {
            fn eq(&self, other: &Decimal) -> bool {
                self.0 == *other
            }
        }
    };
}

id_newtype!(SupplierId, "Unique identifier for a supplier.", "supplier_id");
id_newtype!(SellerId, "Unique identifier for a seller.", "seller_id");
id_newtype!(ProductId, "Unique identifier for a product.", "product_id");
id_newtype!(ListingId, "Unique identifier for a listing.", "listing_id");

non_empty_string_newtype!(
    SupplierName,
    "Supplier (marketplace) display name enforcing non-empty values.",
    "supplier name"
);
non_empty_string_newtype!(
    SupplierCode,
    "Unique supplier code enforcing non-empty values.",
    "supplier code"
);
non_empty_string_newtype!(
    SellerName,
    "Seller name enforcing non-empty values.",
    "seller name"
);
non_empty_string_newtype!(
    ProductName,
    "Product name as displayed on the listing page.",
    "product name"
);
non_empty_string_newtype!(ProductBrand, "Product brand.", "brand");
non_empty_string_newtype!(
    ProductCode,
    "Unique product code enforcing non-empty values.",
    "product code"
);
non_empty_string_newtype!(ProductModel, "Product model.", "model");
non_empty_string_newtype!(
    ProductVariant,
    "Product variant (storage, colour).",
    "variant"
);
non_empty_string_newtype!(
    ShippingEta,
    "Free-form shipping time estimate.",
    "shipping eta"
);

url_string_newtype!(ListingUrl, "URL of an observed listing page.", "listing url");

non_negative_decimal_newtype!(
    Price,
    "Non-negative listing price in standard currency units.",
    "price"
);
non_negative_decimal_newtype!(
    ShippingPrice,
    "Non-negative shipping cost in standard currency units.",
    "shipping price"
);

/// Review rating on a five-point scale.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Rating(Decimal);

impl Rating {
    /// Constructs a rating in the inclusive range `[0, 5]`.
    pub fn new(value: Decimal) -> Result<Self, TypeConstraintError> {
        if value < Decimal::ZERO || value > Decimal::new(5, 0) {
            return Err(TypeConstraintError::OutOfRange("rating"));
        }
        Ok(Self(value))
    }

    /// Parses the decimal text representation used in persistence.
    pub fn parse(text: &str) -> Result<Self, TypeConstraintError> {
        let value = Decimal::from_str(text.trim())
            .map_err(|_| TypeConstraintError::InvalidDecimal("rating"))?;
        Self::new(value)
    }

    /// Returns the raw decimal value.
    pub const fn get(self) -> Decimal {
        self.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<Decimal> for Rating {
    fn eq(&self, other: &Decimal) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_non_empty_strings() {
        let value = NonEmptyString::new("  product  ").unwrap();
        assert_eq!(value.as_str(), "product");
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = ProductId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("product_id"));
    }

    #[test]
    fn validates_urls() {
        assert!(ListingUrl::new("https://www.amazon.com.br/dp/B0XYZ").is_ok());
        let err = ListingUrl::new("not-a-url").unwrap_err();
        assert_eq!(err, TypeConstraintError::InvalidUrl("listing url"));
    }

    #[test]
    fn price_is_rescaled_to_cents() {
        let price = Price::new(Decimal::new(899, 1)).unwrap();
        assert_eq!(price.to_string(), "89.90");
        assert_eq!(ShippingPrice::zero().to_string(), "0.00");
    }

    #[test]
    fn price_rejects_negative_numbers() {
        assert_eq!(
            Price::new(Decimal::new(-1, 2)).unwrap_err(),
            TypeConstraintError::NegativeNumber("price")
        );
    }

    #[test]
    fn price_round_trips_through_text() {
        let price = Price::parse("1299.90").unwrap();
        assert_eq!(price, Decimal::new(129990, 2));
        assert_eq!(
            Price::parse("abc").unwrap_err(),
            TypeConstraintError::InvalidDecimal("price")
        );
    }

    #[test]
    fn rating_must_be_on_five_point_scale() {
        assert!(Rating::new(Decimal::new(46, 1)).is_ok());
        assert!(Rating::new(Decimal::new(5, 0)).is_ok());
        assert_eq!(
            Rating::new(Decimal::new(51, 1)).unwrap_err(),
            TypeConstraintError::OutOfRange("rating")
        );
    }
}
