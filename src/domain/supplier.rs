use serde::{Deserialize, Serialize};

use crate::domain::types::{SupplierCode, SupplierId, SupplierName, TypeConstraintError};

/// Maximum length of a supplier code.
const CODE_MAX_LEN: usize = 100;

/// A marketplace platform listings are observed on.
///
/// Suppliers are created on first sighting and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: SupplierName,
    pub code: SupplierCode,
}

/// Information required to create a new [`Supplier`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSupplier {
    pub name: SupplierName,
    pub code: SupplierCode,
}

impl NewSupplier {
    /// Builds a supplier whose code is the slug of its name.
    pub fn from_name(name: SupplierName) -> Result<Self, TypeConstraintError> {
        let code = SupplierCode::new(slugify(name.as_str(), CODE_MAX_LEN))?;
        Ok(Self { name, code })
    }
}

/// Lowercases `value`, drops punctuation and joins words with `-`.
pub fn slugify(value: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug.chars().take(max_len).collect::<String>().trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_drops_punctuation() {
        assert_eq!(slugify("KaBuM!", 100), "kabum");
        assert_eq!(slugify("  Mercado   Livre ", 100), "mercado-livre");
        assert_eq!(slugify("loja_do-zé", 100), "loja-do-zé");
    }

    #[test]
    fn supplier_code_is_derived_from_name() {
        let supplier = NewSupplier::from_name(SupplierName::new("Magazine Luiza").unwrap()).unwrap();
        assert_eq!(supplier.code, "magazine-luiza");
    }

    #[test]
    fn name_without_word_characters_is_rejected() {
        let err = NewSupplier::from_name(SupplierName::new("!!!").unwrap()).unwrap_err();
        assert_eq!(err, TypeConstraintError::EmptyString("supplier code"));
    }
}
