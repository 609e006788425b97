//! Static price lookup for prescription pads.
//!
//! Prices are whole US dollars. The base price comes from a tier x quantity
//! table; paper type and production speed add flat modifiers. The full quote
//! adds shipping and sales tax on top of the subtotal.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::jurisdiction::SecurityTier;

/// Pad quantities that can be ordered.
pub const QUANTITIES: [u32; 5] = [8, 16, 24, 40, 80];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("quantity {0} is not offered (choose one of 8, 16, 24, 40, 80)")]
    UnsupportedQuantity(u32),
    #[error("no price for {tier} at quantity {quantity}")]
    MissingPrice { tier: SecurityTier, quantity: u32 },
    #[error("no price modifier for {0}")]
    MissingModifier(String),
}

/// A quantity from [`QUANTITIES`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "u32", into = "u32")]
#[schema(value_type = u32, example = 8)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Result<Self, PricingError> {
        if QUANTITIES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(PricingError::UnsupportedQuantity(value))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(QUANTITIES[0])
    }
}

impl TryFrom<u32> for Quantity {
    type Error = PricingError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum PaperType {
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "carbonless-2")]
    Carbonless2,
}

impl PaperType {
    pub fn id(self) -> &'static str {
        match self {
            PaperType::Single => "single",
            PaperType::Carbonless2 => "carbonless-2",
        }
    }
}

impl Default for PaperType {
    fn default() -> Self {
        PaperType::Carbonless2
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ProductionTime {
    Standard,
    Rush,
}

impl ProductionTime {
    pub fn id(self) -> &'static str {
        match self {
            ProductionTime::Standard => "standard",
            ProductionTime::Rush => "rush",
        }
    }

    /// Days from order to the start of the delivery window.
    pub fn lead_days(self) -> i64 {
        match self {
            ProductionTime::Standard => 5,
            ProductionTime::Rush => 2,
        }
    }
}

impl Default for ProductionTime {
    fn default() -> Self {
        ProductionTime::Standard
    }
}

/// Label, justification and per-quantity prices of a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TierPricing {
    #[schema(example = "Maximum Security")]
    pub label: String,
    #[schema(example = "Required for controlled substances (Schedule II-V)")]
    pub description: String,
    pub prices: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaperOption {
    pub id: PaperType,
    pub name: String,
    pub description: String,
    pub price_modifier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductionOption {
    pub id: ProductionTime,
    pub name: String,
    pub description: String,
    pub price_modifier: u32,
    pub shipping: u32,
}

/// Quantity, paper and production selected for an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct OrderOptions {
    pub quantity: Quantity,
    pub paper_type: PaperType,
    pub production_time: ProductionTime,
}

/// Itemised price of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Quote {
    pub base: u32,
    pub paper_modifier: u32,
    pub production_modifier: u32,
    pub subtotal: u32,
    pub shipping: u32,
    pub tax: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub tiers: BTreeMap<SecurityTier, TierPricing>,
    pub paper_types: Vec<PaperOption>,
    pub production_times: Vec<ProductionOption>,
    pub tax_rate_percent: u32,
}

fn tier_pricing(label: &str, description: &str, prices: [u32; 5]) -> TierPricing {
    TierPricing {
        label: label.to_string(),
        description: description.to_string(),
        prices: QUANTITIES.into_iter().zip(prices).collect(),
    }
}

impl PriceTable {
    pub fn arizona() -> Self {
        let tiers = BTreeMap::from([
            (
                SecurityTier::MaximumSecurity,
                tier_pricing(
                    "Maximum Security",
                    "Required for controlled substances (Schedule II-V)",
                    [135, 210, 295, 450, 775],
                ),
            ),
            (
                SecurityTier::MinimumSecurity,
                tier_pricing(
                    "Minimum Security",
                    "Meets federal Medicaid tamper-resistant requirements",
                    [95, 155, 215, 325, 595],
                ),
            ),
            (
                SecurityTier::NoSecurity,
                tier_pricing(
                    "Standard (No Security)",
                    "For non-controlled, non-Medicaid prescriptions",
                    [55, 85, 125, 195, 295],
                ),
            ),
        ]);

        Self {
            tiers,
            paper_types: vec![
                PaperOption {
                    id: PaperType::Single,
                    name: "Single Ply".to_string(),
                    description: "100 scripts per pad".to_string(),
                    price_modifier: 0,
                },
                PaperOption {
                    id: PaperType::Carbonless2,
                    name: "2-Part Carbonless".to_string(),
                    description: "50 scripts per pad".to_string(),
                    price_modifier: 25,
                },
            ],
            production_times: vec![
                ProductionOption {
                    id: ProductionTime::Standard,
                    name: "Standard".to_string(),
                    description: "5-7 business days".to_string(),
                    price_modifier: 0,
                    shipping: 12,
                },
                ProductionOption {
                    id: ProductionTime::Rush,
                    name: "Rush".to_string(),
                    description: "2-3 business days".to_string(),
                    price_modifier: 35,
                    shipping: 25,
                },
            ],
            tax_rate_percent: 8,
        }
    }

    pub fn tier(&self, tier: SecurityTier) -> Option<&TierPricing> {
        self.tiers.get(&tier)
    }

    pub fn price(&self, tier: SecurityTier, quantity: Quantity) -> Result<u32, PricingError> {
        self.tier(tier)
            .and_then(|pricing| pricing.prices.get(&quantity.get()))
            .copied()
            .ok_or(PricingError::MissingPrice {
                tier,
                quantity: quantity.get(),
            })
    }

    fn paper_option(&self, paper: PaperType) -> Result<&PaperOption, PricingError> {
        self.paper_types
            .iter()
            .find(|option| option.id == paper)
            .ok_or_else(|| PricingError::MissingModifier(paper.id().to_string()))
    }

    fn production_option(
        &self,
        production: ProductionTime,
    ) -> Result<&ProductionOption, PricingError> {
        self.production_times
            .iter()
            .find(|option| option.id == production)
            .ok_or_else(|| PricingError::MissingModifier(production.id().to_string()))
    }

    pub fn paper_modifier(&self, paper: PaperType) -> Result<u32, PricingError> {
        Ok(self.paper_option(paper)?.price_modifier)
    }

    pub fn production_modifier(&self, production: ProductionTime) -> Result<u32, PricingError> {
        Ok(self.production_option(production)?.price_modifier)
    }

    /// Base price plus paper and production modifiers.
    pub fn subtotal(&self, tier: SecurityTier, options: &OrderOptions) -> Result<u32, PricingError> {
        Ok(self.price(tier, options.quantity)?
            + self.paper_modifier(options.paper_type)?
            + self.production_modifier(options.production_time)?)
    }

    pub fn quote(&self, tier: SecurityTier, options: &OrderOptions) -> Result<Quote, PricingError> {
        let base = self.price(tier, options.quantity)?;
        let paper_modifier = self.paper_modifier(options.paper_type)?;
        let production = self.production_option(options.production_time)?;
        let subtotal = base + paper_modifier + production.price_modifier;
        // Rounded half up to whole dollars.
        let tax = (subtotal * self.tax_rate_percent + 50) / 100;

        Ok(Quote {
            base,
            paper_modifier,
            production_modifier: production.price_modifier,
            subtotal,
            shipping: production.shipping,
            tax,
            total: subtotal + production.shipping + tax,
        })
    }

    /// Fails on the first tier x quantity pair or option without a price.
    pub fn ensure_complete(&self, tiers: &[SecurityTier]) -> Result<(), PricingError> {
        for tier in tiers {
            for quantity in QUANTITIES {
                self.price(*tier, Quantity(quantity))?;
            }
        }
        for paper in [PaperType::Single, PaperType::Carbonless2] {
            self.paper_modifier(paper)?;
        }
        for production in [ProductionTime::Standard, ProductionTime::Rush] {
            self.production_modifier(production)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_rejects_unlisted_values() {
        assert!(Quantity::new(16).is_ok());
        assert_eq!(
            Quantity::new(10),
            Err(PricingError::UnsupportedQuantity(10))
        );
    }

    #[test]
    fn test_quantity_deserialization_is_checked() {
        let options: OrderOptions =
            serde_json::from_str(r#"{"quantity": 40, "paper_type": "single"}"#).unwrap();
        assert_eq!(options.quantity.get(), 40);
        assert_eq!(options.paper_type, PaperType::Single);
        assert_eq!(options.production_time, ProductionTime::Standard);

        let bad: Result<OrderOptions, _> = serde_json::from_str(r#"{"quantity": 12}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_default_order_options() {
        let options = OrderOptions::default();
        assert_eq!(options.quantity.get(), 8);
        assert_eq!(options.paper_type, PaperType::Carbonless2);
        assert_eq!(options.production_time, ProductionTime::Standard);
    }

    #[test]
    fn test_missing_tier_is_reported() {
        let mut table = PriceTable::arizona();
        table.tiers.remove(&SecurityTier::NoSecurity);
        assert_eq!(
            table.price(SecurityTier::NoSecurity, Quantity::default()),
            Err(PricingError::MissingPrice {
                tier: SecurityTier::NoSecurity,
                quantity: 8
            })
        );
        assert!(table.ensure_complete(&SecurityTier::ALL).is_err());
        assert!(table
            .ensure_complete(&[SecurityTier::MaximumSecurity])
            .is_ok());
    }
}
