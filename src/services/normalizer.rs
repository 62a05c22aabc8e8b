//! Conversion of raw page text into typed listing values.
//!
//! Page text is read in Brazilian notation (`R$ 1.299,90`, `R$ 1.299`,
//! `R$ 89,9`), where `.` only groups thousands. Structured values
//! (`1299.90`) use a decimal point.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::domain::types::{Price, ProductName, Rating, SellerName, ShippingEta, ShippingPrice};
use crate::services::errors::NormalizationError;
use crate::services::extractor::{PriceSource, RawFields, collapse_whitespace};

/// Amount in page text: thousands grouped by `.`, up to two decimals after `,`.
const PAGE_AMOUNT: &str = r"\d{1,3}(?:\.\d{3})+\b(?:,\d{1,2})?|\d+(?:,\d{1,2})?";

static PAGE_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PAGE_AMOUNT).expect("page amount regex is valid"));
static PLAIN_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("plain amount regex is valid"));
static SHIPPING_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"R\$\s*({PAGE_AMOUNT})")).expect("shipping amount regex is valid")
});
static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("rating regex is valid"));
static ETA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)em até\s+\d+\s+dias?\s+úteis|\d+\s+dias?\s+úteis|chega\s+\w+")
        .expect("eta regex is valid")
});

const FREE_MARKERS: &[&str] = &["grátis", "gratis", "free"];
const SELLER_PREFIXES: &[&str] = &[
    "vendido e entregue por",
    "vendido por",
    "entregue por",
    "loja:",
];
const SELLER_NOISE: &[&str] = &[
    "cadastre",
    "login",
    "entrar",
    "crie sua conta",
    "assine",
    "newsletter",
    "oferta exclusiva",
    "receba ofertas",
];

/// A listing's typed values, ready to be written to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub name: ProductName,
    pub price: Price,
    pub rating: Rating,
    pub shipping_price: ShippingPrice,
    pub shipping_eta: Option<ShippingEta>,
    pub seller: SellerName,
}

/// Normalize extracted fields. `default_seller` names the seller when the
/// page does not show one.
pub fn normalize(
    raw: &RawFields,
    default_seller: &str,
) -> Result<NormalizedRecord, NormalizationError> {
    let name = ProductName::new(collapse_whitespace(&raw.name))?;
    let price = match raw.price_source {
        PriceSource::Markup => parse_price(&raw.price_text)?,
        PriceSource::Structured => parse_structured_price(&raw.price_text)?,
    };
    let rating = parse_rating(&raw.rating_text)?;
    let shipping_price = parse_shipping(&raw.shipping_lines)?;
    let shipping_eta = shipping_eta(raw.shipping_eta_text.as_deref(), &raw.shipping_lines)
        .map(ShippingEta::new)
        .transpose()?;
    let seller = clean_seller(raw.seller.as_deref()).unwrap_or_else(|| default_seller.to_string());

    Ok(NormalizedRecord {
        name,
        price,
        rating,
        shipping_price,
        shipping_eta,
        seller: SellerName::new(seller)?,
    })
}

/// Price shown on the page: `"R$ 1.299,90"` parses to `1299.90` and
/// `"R$ 1.299"` to `1299.00`.
pub fn parse_price(text: &str) -> Result<Price, NormalizationError> {
    let amount = PAGE_AMOUNT_RE
        .find(text)
        .and_then(|m| page_decimal(m.as_str()))
        .ok_or_else(|| NormalizationError::Price(text.to_string()))?;
    Ok(Price::new(amount)?)
}

/// Machine-readable price: `"1299.9"` parses to `1299.90`.
pub fn parse_structured_price(text: &str) -> Result<Price, NormalizationError> {
    let amount = PLAIN_AMOUNT_RE
        .find(text)
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
        .ok_or_else(|| NormalizationError::Price(text.to_string()))?;
    Ok(Price::new(amount)?)
}

/// Leading number of a rating text: `"4.6 de 5"` and `"4,6"` parse to `4.6`.
pub fn parse_rating(text: &str) -> Result<Rating, NormalizationError> {
    let value = RATING_RE
        .find(text)
        .and_then(|m| Decimal::from_str(&m.as_str().replace(',', ".")).ok())
        .ok_or_else(|| NormalizationError::Rating(text.to_string()))?;
    Rating::new(value).map_err(|_| NormalizationError::Rating(text.to_string()))
}

/// Cost of the cheapest shipping option. Lines with neither an amount nor a
/// free marker (`Calcule o frete`) are not options; no option at all is zero.
pub fn parse_shipping(lines: &[String]) -> Result<ShippingPrice, NormalizationError> {
    match cheapest_shipping(lines) {
        Some((amount, _)) => Ok(ShippingPrice::new(amount)?),
        None => Ok(ShippingPrice::zero()),
    }
}

/// Delivery estimate: the explicit ETA text, else a phrase such as
/// `em até 5 dias úteis` from the cheapest option, else from any line.
pub fn shipping_eta(eta_text: Option<&str>, shipping_lines: &[String]) -> Option<String> {
    let eta_in = |line: &str| ETA_RE.find(line).map(|m| collapse_whitespace(m.as_str()));
    eta_text
        .map(collapse_whitespace)
        .filter(|eta| !eta.is_empty())
        .or_else(|| cheapest_shipping(shipping_lines).and_then(|(_, line)| eta_in(line)))
        .or_else(|| shipping_lines.iter().find_map(|line| eta_in(line)))
}

/// Seller name without "sold by" boilerplate. Login and newsletter prompts
/// captured by loose selectors are discarded.
pub fn clean_seller(text: Option<&str>) -> Option<String> {
    let mut seller = collapse_whitespace(text?);
    let lowered = seller.to_lowercase();
    if SELLER_NOISE.iter().any(|noise| lowered.contains(noise)) {
        return None;
    }
    if let Some(prefix) = SELLER_PREFIXES.iter().find(|p| lowered.starts_with(*p)) {
        // Prefixes are ASCII, so the byte offset is valid in the original.
        seller = seller[prefix.len()..].to_string();
    }
    let seller = seller
        .trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '-')
        .to_string();
    (!seller.is_empty()).then_some(seller)
}

fn page_decimal(amount: &str) -> Option<Decimal> {
    Decimal::from_str(&amount.replace('.', "").replace(',', ".")).ok()
}

/// Free markers win over amounts in the same line (`Grátis acima de R$ 79,00`).
fn shipping_amount(line: &str) -> Option<Decimal> {
    let lowered = line.to_lowercase();
    if FREE_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return Some(Decimal::ZERO);
    }
    SHIPPING_AMOUNT_RE
        .captures(line)
        .and_then(|captures| page_decimal(&captures[1]))
}

fn cheapest_shipping(lines: &[String]) -> Option<(Decimal, &str)> {
    lines
        .iter()
        .filter_map(|line| shipping_amount(line).map(|amount| (amount, line.as_str())))
        .min_by_key(|(amount, _)| *amount)
}
