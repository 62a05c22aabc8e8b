//! Field extraction from rendered product pages.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::models::config::SelectorConfig;
use crate::services::errors::{ExtractionError, Field};

/// Class fragments marking a crossed-out "from" price.
const OLD_PRICE_CLASSES: &[&str] = &[
    "old",
    "strike",
    "line-through",
    "price-from",
    "preco-de",
    "de-preco",
];

/// Tags rendering struck-through text.
const STRUCK_TAGS: &[&str] = &["s", "del", "strike"];

/// Text fragments of instalment offers (`10x de R$ 12,99`).
const INSTALLMENT_MARKERS: &[&str] = &["x de", "parcela", "em até"];

/// Shipping elements read per page.
const MAX_SHIPPING_LINES: usize = 20;

/// A CSS selector together with its source text for error reporting.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    source: String,
    selector: Selector,
}

impl CompiledSelector {
    pub fn parse(field: Field, source: &str) -> Result<Self, ExtractionError> {
        let selector = Selector::parse(source).map_err(|_| ExtractionError::InvalidSelector {
            field,
            selector: source.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Compiled selectors of one marketplace.
#[derive(Debug, Clone)]
pub struct SelectorMap {
    pub name: CompiledSelector,
    pub price: CompiledSelector,
    pub rating: CompiledSelector,
    pub shipping: Option<CompiledSelector>,
    pub shipping_eta: Option<CompiledSelector>,
    pub seller: Option<CompiledSelector>,
}

impl SelectorMap {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ExtractionError> {
        let optional = |field, source: &Option<String>| {
            source
                .as_deref()
                .map(|s| CompiledSelector::parse(field, s))
                .transpose()
        };
        Ok(Self {
            name: CompiledSelector::parse(Field::Name, &config.name)?,
            price: CompiledSelector::parse(Field::Price, &config.price)?,
            rating: CompiledSelector::parse(Field::Rating, &config.rating)?,
            shipping: optional(Field::Shipping, &config.shipping)?,
            shipping_eta: optional(Field::ShippingEta, &config.shipping_eta)?,
            seller: optional(Field::Seller, &config.seller)?,
        })
    }
}

/// Origin of a price text, which decides how its number is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceSource {
    /// Visible page text in Brazilian notation (`R$ 1.299,90`).
    #[default]
    Markup,
    /// Machine-readable value with a decimal point, from a `content`
    /// attribute or JSON-LD (`1299.90`).
    Structured,
}

/// Raw field text read from a page, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub name: String,
    pub price_text: String,
    pub price_source: PriceSource,
    pub rating_text: String,
    /// Texts of the shipping option elements, in document order.
    pub shipping_lines: Vec<String>,
    pub shipping_eta_text: Option<String>,
    pub seller: Option<String>,
}

/// Read the configured fields from `html`.
///
/// With `json_ld` enabled, required fields missing from the markup are taken
/// from the page's schema.org `Product` data.
pub fn extract(
    html: &str,
    selectors: &SelectorMap,
    json_ld: bool,
) -> Result<RawFields, ExtractionError> {
    let document = Html::parse_document(html);
    let structured = if json_ld {
        JsonLdProduct::from_document(&document)
    } else {
        None
    };
    let structured = structured.as_ref();

    let name = first_text(&document, &selectors.name)
        .or_else(|| structured.and_then(|p| p.name.clone()))
        .ok_or_else(|| miss(Field::Name, &selectors.name))?;
    let (price_text, price_source) = first_price(&document, &selectors.price)
        .or_else(|| {
            structured
                .and_then(|p| p.price.clone())
                .map(|price| (price, PriceSource::Structured))
        })
        .ok_or_else(|| miss(Field::Price, &selectors.price))?;
    let rating_text = first_text(&document, &selectors.rating)
        .or_else(|| structured.and_then(|p| p.rating.clone()))
        .ok_or_else(|| miss(Field::Rating, &selectors.rating))?;

    let optional = |selector: &Option<CompiledSelector>| {
        selector
            .as_ref()
            .and_then(|selector| first_text(&document, selector))
    };
    let seller = optional(&selectors.seller).or_else(|| structured.and_then(|p| p.seller.clone()));
    let shipping_lines = selectors
        .shipping
        .as_ref()
        .map(|selector| {
            document
                .select(&selector.selector)
                .filter_map(element_text)
                .take(MAX_SHIPPING_LINES)
                .collect()
        })
        .unwrap_or_default();

    Ok(RawFields {
        name,
        price_text,
        price_source,
        rating_text,
        shipping_lines,
        shipping_eta_text: optional(&selectors.shipping_eta),
        seller,
    })
}

fn miss(field: Field, selector: &CompiledSelector) -> ExtractionError {
    ExtractionError::SelectorMiss {
        field,
        selector: selector.as_str().to_string(),
    }
}

/// Whitespace-collapsed text of an element, or its `content` attribute for
/// `<meta>`-style elements.
fn element_text(element: ElementRef<'_>) -> Option<String> {
    visible_text(element).or_else(|| content_attr(element))
}

fn visible_text(element: ElementRef<'_>) -> Option<String> {
    let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

fn content_attr(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("content")
        .map(collapse_whitespace)
        .filter(|content| !content.is_empty())
}

fn first_text(document: &Html, selector: &CompiledSelector) -> Option<String> {
    document.select(&selector.selector).find_map(element_text)
}

/// First element that reads as a current cash price. Old prices and
/// instalment offers are skipped.
fn first_price(document: &Html, selector: &CompiledSelector) -> Option<(String, PriceSource)> {
    document
        .select(&selector.selector)
        .filter(|element| !is_old_price(*element))
        .filter_map(|element| {
            visible_text(element)
                .map(|text| (text, PriceSource::Markup))
                .or_else(|| content_attr(element).map(|text| (text, PriceSource::Structured)))
        })
        .find(|(text, _)| is_cash_price(text))
}

fn is_cash_price(text: &str) -> bool {
    let lowered = text.to_lowercase();
    text.chars().any(|c| c.is_ascii_digit())
        && !INSTALLMENT_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
}

fn is_old_price(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if STRUCK_TAGS.contains(&value.name()) {
        return true;
    }
    value.classes().any(|class| {
        let class = class.to_lowercase();
        OLD_PRICE_CLASSES
            .iter()
            .any(|marker| class.contains(marker))
    })
}

pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Product data embedded as `application/ld+json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct JsonLdProduct {
    name: Option<String>,
    price: Option<String>,
    rating: Option<String>,
    seller: Option<String>,
}

impl JsonLdProduct {
    fn from_document(document: &Html) -> Option<Self> {
        let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
        document
            .select(&selector)
            .filter_map(|script| serde_json::from_str::<Value>(&script.inner_html()).ok())
            .find_map(|value| find_product(&value).map(Self::from_value))
    }

    fn from_value(product: &Value) -> Self {
        let offer = match product.get("offers") {
            Some(Value::Array(offers)) => offers.first(),
            other => other,
        };
        Self {
            name: product.get("name").and_then(scalar_text),
            price: offer.and_then(|offer| {
                offer
                    .get("price")
                    .or_else(|| offer.get("lowPrice"))
                    .and_then(scalar_text)
            }),
            rating: product
                .get("aggregateRating")
                .and_then(|rating| rating.get("ratingValue"))
                .and_then(scalar_text),
            seller: offer
                .and_then(|offer| offer.get("seller"))
                .and_then(|seller| seller.get("name"))
                .and_then(scalar_text),
        }
    }
}

/// Depth-first search for a node typed `Product`, including `@graph` lists.
fn find_product(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_product),
        Value::Object(map) => {
            if is_product(map.get("@type")) {
                return Some(value);
            }
            map.get("@graph").and_then(find_product)
        }
        _ => None,
    }
}

fn is_product(kind: Option<&Value>) -> bool {
    match kind {
        Some(Value::String(kind)) => kind == "Product",
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some("Product")),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => collapse_whitespace(s),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> SelectorMap {
        SelectorMap::compile(&SelectorConfig {
            name: "h1".to_string(),
            price: ".price".to_string(),
            rating: ".rating".to_string(),
            shipping: Some(".shipping".to_string()),
            shipping_eta: None,
            seller: Some(".seller".to_string()),
            wait_for: None,
        })
        .unwrap()
    }

    #[test]
    fn extracts_required_and_optional_fields() {
        let html = r#"
            <html><body>
              <h1>  Fone   Bluetooth XYZ </h1>
              <span class="price">R$ 89,90</span>
              <div class="rating">4.6 de 5</div>
              <p class="shipping">Frete Grátis</p>
            </body></html>"#;

        let raw = extract(html, &selectors(), false).unwrap();

        assert_eq!(raw.name, "Fone Bluetooth XYZ");
        assert_eq!(raw.price_text, "R$ 89,90");
        assert_eq!(raw.rating_text, "4.6 de 5");
        assert_eq!(raw.shipping_lines, vec!["Frete Grátis".to_string()]);
        assert_eq!(raw.price_source, PriceSource::Markup);
        assert_eq!(raw.seller, None);
    }

    #[test]
    fn missing_required_field_is_a_selector_miss() {
        let html = r#"<h1>Fone</h1><span class="price">R$ 89,90</span>"#;

        let err = extract(html, &selectors(), false).unwrap_err();

        assert_eq!(
            err,
            ExtractionError::SelectorMiss {
                field: Field::Rating,
                selector: ".rating".to_string(),
            }
        );
    }

    #[test]
    fn old_prices_are_skipped() {
        let html = r#"
            <h1>Fone</h1>
            <span class="price price-old">R$ 129,90</span>
            <s class="price">R$ 119,90</s>
            <span class="price"></span>
            <span class="price">R$ 89,90</span>
            <div class="rating">4,6</div>"#;

        let raw = extract(html, &selectors(), false).unwrap();

        assert_eq!(raw.price_text, "R$ 89,90");
    }

    #[test]
    fn meta_content_is_read_when_element_has_no_text() {
        let html = r#"
            <h1>Fone</h1>
            <meta class="price" content="89.90">
            <div class="rating">4.6</div>"#;

        let raw = extract(html, &selectors(), false).unwrap();

        assert_eq!(raw.price_text, "89.90");
        assert_eq!(raw.price_source, PriceSource::Structured);
    }

    #[test]
    fn installment_offers_are_not_prices() {
        let html = r#"
            <h1>Fone</h1>
            <div class="price installment">10x de R$ 12,99 sem juros</div>
            <div class="price">ou 3 parcelas de R$ 43,30</div>
            <div class="price">R$ 129,90</div>
            <div class="rating">4.6</div>"#;

        let raw = extract(html, &selectors(), false).unwrap();

        assert_eq!(raw.price_text, "R$ 129,90");
    }

    #[test]
    fn every_shipping_line_is_collected() {
        let html = r#"
            <h1>Fone</h1>
            <span class="price">R$ 89,90</span>
            <div class="rating">4.6</div>
            <ul>
              <li class="shipping">Calcule o frete</li>
              <li class="shipping"> </li>
              <li class="shipping">Frete Grátis - chega amanhã</li>
            </ul>"#;

        let raw = extract(html, &selectors(), false).unwrap();

        assert_eq!(
            raw.shipping_lines,
            vec![
                "Calcule o frete".to_string(),
                "Frete Grátis - chega amanhã".to_string(),
            ]
        );
    }

    #[test]
    fn json_ld_fills_missing_fields_when_enabled() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">
              {"@context": "https://schema.org", "@graph": [
                {"@type": "BreadcrumbList"},
                {"@type": "Product", "name": "Fone Bluetooth XYZ",
                 "offers": [{"price": 89.9, "seller": {"name": "Loja XYZ"}}],
                 "aggregateRating": {"ratingValue": "4.6"}}
              ]}
            </script></head><body></body></html>"#;

        assert!(extract(html, &selectors(), false).is_err());

        let raw = extract(html, &selectors(), true).unwrap();
        assert_eq!(raw.name, "Fone Bluetooth XYZ");
        assert_eq!(raw.price_text, "89.9");
        assert_eq!(raw.price_source, PriceSource::Structured);
        assert_eq!(raw.rating_text, "4.6");
        assert_eq!(raw.seller.as_deref(), Some("Loja XYZ"));
    }

    #[test]
    fn invalid_selector_is_reported_at_compile_time() {
        let err = CompiledSelector::parse(Field::Price, "div[").unwrap_err();

        assert_eq!(
            err,
            ExtractionError::InvalidSelector {
                field: Field::Price,
                selector: "div[".to_string(),
            }
        );
    }
}
