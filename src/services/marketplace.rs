//! Marketplace registry: selector sets and URL-based resolution.

use url::Url;

use crate::models::config::{MarketplaceConfig, SelectorConfig, TargetConfig};
use crate::services::errors::{ExtractionError, Field, ScrapeError};
use crate::services::extractor::{CompiledSelector, SelectorMap};

/// Id of the selector set applied to hosts no marketplace claims.
pub const GENERIC_ID: &str = "generic";

/// A marketplace with compiled selectors.
#[derive(Debug, Clone)]
pub struct Marketplace {
    pub id: String,
    pub name: String,
    pub domains: Vec<String>,
    pub json_ld: bool,
    pub selectors: SelectorMap,
    /// Element awaited before reading the page.
    pub wait_for: String,
}

impl Marketplace {
    pub fn compile(config: &MarketplaceConfig) -> Result<Self, ExtractionError> {
        let selectors = SelectorMap::compile(&config.selectors)?;
        let wait_for = config
            .selectors
            .wait_for
            .clone()
            .unwrap_or_else(|| config.selectors.price.clone());
        CompiledSelector::parse(Field::WaitFor, &wait_for)?;
        Ok(Self {
            id: config.id.clone(),
            name: config.name.clone(),
            domains: config.domains.iter().map(|d| d.to_lowercase()).collect(),
            json_ld: config.json_ld,
            selectors,
            wait_for,
        })
    }

    fn serves(&self, host: &str) -> bool {
        self.domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")))
    }
}

/// Marketplace chosen for a target, with the supplier name to record.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub marketplace: &'a Marketplace,
    pub supplier: String,
}

#[derive(Debug, Clone)]
pub struct MarketplaceRegistry {
    marketplaces: Vec<Marketplace>,
    generic: Marketplace,
}

impl MarketplaceRegistry {
    /// Built-in marketplaces, replaced or extended by `overrides` (matched by
    /// id). An override with id `generic` replaces the fallback selector set.
    pub fn new(overrides: &[MarketplaceConfig]) -> Result<Self, ExtractionError> {
        let mut configs = builtin_marketplaces();
        for config in overrides {
            match configs.iter_mut().find(|c| c.id == config.id) {
                Some(existing) => *existing = config.clone(),
                None => configs.push(config.clone()),
            }
        }
        let generic = match configs.iter().position(|c| c.id == GENERIC_ID) {
            Some(index) => configs.remove(index),
            None => generic_marketplace(),
        };
        Ok(Self {
            marketplaces: configs
                .iter()
                .map(Marketplace::compile)
                .collect::<Result<_, _>>()?,
            generic: Marketplace::compile(&generic)?,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Marketplace> {
        if id == GENERIC_ID {
            return Some(&self.generic);
        }
        self.marketplaces.iter().find(|m| m.id == id)
    }

    /// Pick the marketplace for `target`: by explicit id, else by URL host.
    /// Unknown hosts use the generic selectors with the host as supplier.
    pub fn resolve(&self, target: &TargetConfig) -> Result<Resolved<'_>, ScrapeError> {
        let url = Url::parse(&target.url)
            .map_err(|e| ScrapeError::Target(format!("{}: {e}", target.url)))?;
        let host = url
            .host_str()
            .map(|h| h.trim_start_matches("www.").to_lowercase())
            .ok_or_else(|| ScrapeError::Target(format!("{}: missing host", target.url)))?;

        if let Some(id) = &target.marketplace {
            let marketplace = self
                .get(id)
                .ok_or_else(|| ScrapeError::Target(format!("unknown marketplace `{id}`")))?;
            return Ok(self.resolved(marketplace, host));
        }

        let marketplace = self
            .marketplaces
            .iter()
            .find(|m| m.serves(&host))
            .unwrap_or(&self.generic);
        Ok(self.resolved(marketplace, host))
    }

    fn resolved<'a>(&'a self, marketplace: &'a Marketplace, host: String) -> Resolved<'a> {
        let supplier = if marketplace.id == GENERIC_ID || marketplace.name.trim().is_empty() {
            host
        } else {
            marketplace.name.clone()
        };
        Resolved {
            marketplace,
            supplier,
        }
    }
}

fn selectors(
    name: &str,
    price: &str,
    rating: &str,
    shipping: Option<&str>,
    shipping_eta: Option<&str>,
    seller: Option<&str>,
    wait_for: Option<&str>,
) -> SelectorConfig {
    SelectorConfig {
        name: name.to_string(),
        price: price.to_string(),
        rating: rating.to_string(),
        shipping: shipping.map(str::to_string),
        shipping_eta: shipping_eta.map(str::to_string),
        seller: seller.map(str::to_string),
        wait_for: wait_for.map(str::to_string),
    }
}

const SHIPPING_LINES: &str =
    r#"[data-testid*="shipping"], .shipping-option, .frete-opcao, .delivery-options li"#;

/// Selector sets shipped with the scraper.
pub fn builtin_marketplaces() -> Vec<MarketplaceConfig> {
    vec![
        MarketplaceConfig {
            id: "magalu".to_string(),
            name: "Magalu".to_string(),
            domains: vec!["magazineluiza.com.br".to_string(), "magalu.com".to_string()],
            json_ld: true,
            selectors: selectors(
                r#"[data-testid="heading-product-title"], h1"#,
                r#"[data-testid="price-value"], [data-testid="price-big"], [data-testid="price-amount"], [class*="Price"]"#,
                r#"[data-testid="review-summary-overall-rating"], [data-testid="rating-value"], [itemprop="ratingValue"]"#,
                Some(SHIPPING_LINES),
                None,
                Some(r#"[data-testid="marketplace-seller-name"], [data-testid="store-link"]"#),
                Some(r#"[data-testid="price-value"], [data-testid="price-big"], h1"#),
            ),
        },
        MarketplaceConfig {
            id: "kabum".to_string(),
            name: "KaBuM!".to_string(),
            domains: vec!["kabum.com.br".to_string()],
            json_ld: true,
            selectors: selectors(
                "h1",
                r#"[data-testid="product-price"], span.finalPrice, h4.finalPrice, .priceCard strong"#,
                r#"[data-testid="rating-value"], [itemprop="ratingValue"], .rating__value"#,
                Some(SHIPPING_LINES),
                None,
                Some(r#"[data-testid="marketplace-seller-name"], .seller-name"#),
                Some("h1"),
            ),
        },
        MarketplaceConfig {
            id: "amazon".to_string(),
            name: "Amazon".to_string(),
            domains: vec!["amazon.com.br".to_string(), "amazon.com".to_string()],
            json_ld: false,
            selectors: selectors(
                "#productTitle",
                ".a-price .a-offscreen",
                "#acrPopover .a-icon-alt",
                Some("#mir-layout-DELIVERY_BLOCK-slot-PRIMARY_DELIVERY_MESSAGE_LARGE"),
                Some("#mir-layout-DELIVERY_BLOCK-slot-PRIMARY_DELIVERY_MESSAGE_LARGE .a-text-bold"),
                Some("#sellerProfileTriggerId"),
                Some("#productTitle"),
            ),
        },
    ]
}

/// Loose selectors for hosts without a dedicated marketplace entry.
pub fn generic_marketplace() -> MarketplaceConfig {
    MarketplaceConfig {
        id: GENERIC_ID.to_string(),
        name: String::new(),
        domains: Vec::new(),
        json_ld: true,
        selectors: selectors(
            r#"h1, [itemprop="name"]"#,
            r#"[itemprop="price"], [data-testid*="price"], [class*="price"]"#,
            r#"[itemprop="ratingValue"], [class*="rating"]"#,
            Some(SHIPPING_LINES),
            None,
            Some(r#"[data-testid*="seller"], [class*="seller"]"#),
            Some("body"),
        ),
    }
}
