use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::types::{
    ProductBrand, ProductCode, ProductId, ProductModel, ProductName, ProductVariant,
    TypeConstraintError,
};

/// Brands recognised in product names when no list is configured.
pub const DEFAULT_BRANDS: &[&str] = &[
    "Apple", "Samsung", "Motorola", "Xiaomi", "Nokia", "Asus", "Google", "Sony", "LG", "Realme",
    "OnePlus", "Huawei", "Infinix", "OPPO", "Vivo", "Lenovo",
];

/// Brand stored when none of the known brands appears in the name.
pub const UNKNOWN_BRAND: &str = "Desconhecida";

const FIELD_MAX_LEN: usize = 255;
const CODE_HASH_LEN: usize = 20;

static STORAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{2,4}\s?GB)\b").expect("storage regex is valid"));
static COLOUR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(preto|black|azul|blue|verde|green|branco|white|cinza|gray|graphite|violet|violeta|pink|rosa)\b",
    )
    .expect("colour regex is valid")
});
static MODEL_STOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-|,(]").expect("model stop regex is valid"));

/// A catalog item, identified across suppliers by its `code`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub brand: ProductBrand,
    pub code: ProductCode,
    pub model: ProductModel,
    pub variant: Option<ProductVariant>,
}

/// Information required to create a new [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub brand: ProductBrand,
    pub code: ProductCode,
    pub model: ProductModel,
    pub variant: Option<ProductVariant>,
}

impl NewProduct {
    /// Derives the catalog identity of a scraped product name.
    ///
    /// The code is stable for names that differ only in case or whitespace,
    /// so re-scraping the same page resolves to the same product.
    pub fn from_name<B: AsRef<str>>(
        name: &ProductName,
        brands: &[B],
    ) -> Result<Self, TypeConstraintError> {
        let name = name.as_str();
        let found = brands.iter().find_map(|brand| {
            let brand: &str = brand.as_ref();
            brand_match(name, brand).map(|end| (brand, end))
        });

        let brand = found.map(|(brand, _)| brand).unwrap_or(UNKNOWN_BRAND);
        let model = derive_model(name, found);
        let variant = derive_variant(name);

        Ok(Self {
            brand: ProductBrand::new(truncate(brand))?,
            code: ProductCode::new(product_code(name))?,
            model: ProductModel::new(truncate(&model))?,
            variant: variant.map(|v| ProductVariant::new(truncate(&v))).transpose()?,
        })
    }
}

/// Stable code for a product name: `p_` followed by a SHA-256 prefix.
pub fn product_code(name: &str) -> String {
    let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    let hex = digest
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    format!("p_{}", &hex[..CODE_HASH_LEN])
}

/// Byte offset just past the first whole-word, case-insensitive occurrence
/// of `brand` in `name`.
fn brand_match(name: &str, brand: &str) -> Option<usize> {
    if brand.trim().is_empty() {
        return None;
    }
    let pattern = format!(r"(?i)\b{}\b", regex::escape(brand.trim()));
    let re = Regex::new(&pattern).ok()?;
    re.find(name).map(|m| m.end())
}

fn derive_model(name: &str, found: Option<(&str, usize)>) -> String {
    let rest = match found {
        Some((_, end)) => &name[end..],
        None => name,
    };
    let head = MODEL_STOP_RE.split(rest).next().unwrap_or_default();
    let model = head.split_whitespace().collect::<Vec<_>>().join(" ");
    if model.chars().count() < 3 {
        name.trim().to_string()
    } else {
        model
    }
}

fn derive_variant(name: &str) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(storage) = STORAGE_RE.captures(name).and_then(|c| c.get(1)) {
        parts.push(storage.as_str().to_uppercase());
    }
    if let Some(colour) = COLOUR_RE.captures(name).and_then(|c| c.get(1)) {
        let colour = colour.as_str().to_lowercase();
        let mut chars = colour.chars();
        if let Some(first) = chars.next() {
            let capitalized = first.to_uppercase().chain(chars).collect::<String>();
            if !parts.contains(&capitalized) {
                parts.push(capitalized);
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn truncate(value: &str) -> String {
    value.chars().take(FIELD_MAX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str) -> ProductName {
        ProductName::new(value).unwrap()
    }

    #[test]
    fn code_ignores_case_and_whitespace() {
        assert_eq!(
            product_code("Fone Bluetooth XYZ"),
            product_code("  fone   bluetooth xyz ")
        );
        assert!(product_code("Fone Bluetooth XYZ").starts_with("p_"));
        assert_eq!(product_code("Fone Bluetooth XYZ").len(), 22);
    }

    #[test]
    fn derives_brand_model_and_variant() {
        let product = NewProduct::from_name(
            &name("Smartphone Samsung Galaxy S24 128GB Preto - 5G"),
            DEFAULT_BRANDS,
        )
        .unwrap();

        assert_eq!(product.brand, "Samsung");
        assert_eq!(product.model, "Galaxy S24 128GB Preto");
        assert_eq!(product.variant.unwrap(), "128GB Preto");
    }

    #[test]
    fn unknown_brand_keeps_whole_name_as_model() {
        let product = NewProduct::from_name(&name("Fone Bluetooth XYZ"), DEFAULT_BRANDS).unwrap();

        assert_eq!(product.brand, UNKNOWN_BRAND);
        assert_eq!(product.model, "Fone Bluetooth XYZ");
        assert!(product.variant.is_none());
    }

    #[test]
    fn brand_must_match_whole_word() {
        let product = NewProduct::from_name(&name("Capa Galaxy Vivoactive"), &["Vivo"]).unwrap();
        assert_eq!(product.brand, UNKNOWN_BRAND);
    }
}
