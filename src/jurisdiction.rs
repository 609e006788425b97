//! Per-state compliance rules and pricing.
//!
//! A [`Jurisdiction`] bundles the layout rules of one state (which security
//! tiers print a warning band or microprint, the legal disclaimer, order
//! limits) with the state's [`PriceTable`]. Arizona is built in; other states
//! can be supplied as a JSON document at startup.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::layout::templates::MAX_TEMPLATE_SLOTS;
use crate::pricing::{PriceTable, PricingError};

/// Prescription-pad compliance level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum SecurityTier {
    #[serde(rename = "maximum-security")]
    MaximumSecurity,
    #[serde(rename = "minimum-security")]
    MinimumSecurity,
    #[serde(rename = "no-security")]
    NoSecurity,
}

impl SecurityTier {
    pub const ALL: [SecurityTier; 3] = [
        SecurityTier::MaximumSecurity,
        SecurityTier::MinimumSecurity,
        SecurityTier::NoSecurity,
    ];

    /// Stable identifier used in URLs, file names and JSON.
    pub fn id(self) -> &'static str {
        match self {
            SecurityTier::MaximumSecurity => "maximum-security",
            SecurityTier::MinimumSecurity => "minimum-security",
            SecurityTier::NoSecurity => "no-security",
        }
    }

    /// On-screen background image for the tier. Never embedded in exports.
    pub fn background_asset(self) -> Option<String> {
        match self {
            SecurityTier::NoSecurity => None,
            tier => Some(format!("/assets/backgrounds/{}.png", tier.id())),
        }
    }
}

impl Default for SecurityTier {
    fn default() -> Self {
        SecurityTier::MaximumSecurity
    }
}

impl fmt::Display for SecurityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Anti-fraud print feature that a tier may require.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SecurityFeature {
    WarningBand,
    Microprint,
}

/// Text of a printed feature and the tiers that carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeatureRule {
    pub text: String,
    pub show_on: Vec<SecurityTier>,
}

impl FeatureRule {
    pub fn applies_to(&self, tier: SecurityTier) -> bool {
        self.show_on.contains(&tier)
    }
}

/// Layout and ordering rules of one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JurisdictionConfig {
    #[schema(example = "Arizona")]
    pub state: String,
    #[schema(example = "AZ")]
    pub state_code: String,
    pub security_tiers: Vec<SecurityTier>,
    pub default_security_tier: SecurityTier,
    pub max_locations: usize,
    pub max_prescribers: usize,
    pub warning_band: FeatureRule,
    pub microprint: FeatureRule,
    pub disclaimer: String,
}

impl JurisdictionConfig {
    pub fn arizona() -> Self {
        Self {
            state: "Arizona".to_string(),
            state_code: "AZ".to_string(),
            security_tiers: SecurityTier::ALL.to_vec(),
            default_security_tier: SecurityTier::MaximumSecurity,
            max_locations: 2,
            max_prescribers: 6,
            warning_band: FeatureRule {
                text: "MICROPRINT SECURITY \u{2022} SERIAL BATCH NUMBERING \u{2022} SEQUENTIAL NUMBERING"
                    .to_string(),
                show_on: vec![SecurityTier::MaximumSecurity, SecurityTier::MinimumSecurity],
            },
            microprint: FeatureRule {
                text: "RXFORMSSECUREPRESCRIPTION".to_string(),
                show_on: vec![SecurityTier::MaximumSecurity],
            },
            disclaimer:
                "Prescription is void if more than one (1) controlled substance is written per blank."
                    .to_string(),
        }
    }

    pub fn rule(&self, feature: SecurityFeature) -> &FeatureRule {
        match feature {
            SecurityFeature::WarningBand => &self.warning_band,
            SecurityFeature::Microprint => &self.microprint,
        }
    }

    /// Capability set of a tier: every feature whose rule lists it.
    pub fn features(&self, tier: SecurityTier) -> BTreeSet<SecurityFeature> {
        [SecurityFeature::WarningBand, SecurityFeature::Microprint]
            .into_iter()
            .filter(|feature| self.rule(*feature).applies_to(tier))
            .collect()
    }

    pub fn shows(&self, tier: SecurityTier, feature: SecurityFeature) -> bool {
        self.rule(feature).applies_to(tier)
    }

    pub fn offers(&self, tier: SecurityTier) -> bool {
        self.security_tiers.contains(&tier)
    }
}

#[derive(Debug, Error)]
pub enum JurisdictionError {
    #[error("failed to read jurisdiction file: {0}")]
    Io(#[source] std::io::Error),
    #[error("failed to parse jurisdiction file: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("jurisdiction must offer at least one security tier")]
    NoTiers,
    #[error("default security tier {0} is not offered")]
    DefaultTierNotOffered(SecurityTier),
    #[error("limit {0} must be at least 1")]
    ZeroLimit(&'static str),
    #[error("limit {name} must be between 1 and {max}, got {value}")]
    Limit {
        name: &'static str,
        value: usize,
        max: usize,
    },
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Rules plus prices for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub rules: JurisdictionConfig,
    pub pricing: PriceTable,
}

impl Jurisdiction {
    pub fn arizona() -> Self {
        Self {
            rules: JurisdictionConfig::arizona(),
            pricing: PriceTable::arizona(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, JurisdictionError> {
        let raw = fs::read_to_string(path).map_err(JurisdictionError::Io)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, JurisdictionError> {
        let jurisdiction: Jurisdiction =
            serde_json::from_str(raw).map_err(JurisdictionError::Parse)?;
        jurisdiction.validate()?;
        Ok(jurisdiction)
    }

    /// Checks that the data can drive every wizard operation.
    pub fn validate(&self) -> Result<(), JurisdictionError> {
        let rules = &self.rules;
        if rules.security_tiers.is_empty() {
            return Err(JurisdictionError::NoTiers);
        }
        if !rules.offers(rules.default_security_tier) {
            return Err(JurisdictionError::DefaultTierNotOffered(
                rules.default_security_tier,
            ));
        }
        if rules.max_locations == 0 {
            return Err(JurisdictionError::ZeroLimit("max_locations"));
        }
        if rules.max_prescribers == 0 || rules.max_prescribers > MAX_TEMPLATE_SLOTS {
            return Err(JurisdictionError::Limit {
                name: "max_prescribers",
                value: rules.max_prescribers,
                max: MAX_TEMPLATE_SLOTS,
            });
        }
        self.pricing.ensure_complete(&rules.security_tiers)?;
        Ok(())
    }
}

impl Default for Jurisdiction {
    fn default() -> Self {
        Self::arizona()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arizona_capability_sets() {
        let rules = JurisdictionConfig::arizona();

        let max = rules.features(SecurityTier::MaximumSecurity);
        assert!(max.contains(&SecurityFeature::WarningBand));
        assert!(max.contains(&SecurityFeature::Microprint));

        let min = rules.features(SecurityTier::MinimumSecurity);
        assert!(min.contains(&SecurityFeature::WarningBand));
        assert!(!min.contains(&SecurityFeature::Microprint));

        assert!(rules.features(SecurityTier::NoSecurity).is_empty());
    }

    #[test]
    fn test_tier_serialization_uses_kebab_ids() {
        let json = serde_json::to_string(&SecurityTier::MinimumSecurity).unwrap();
        assert_eq!(json, "\"minimum-security\"");

        let tier: SecurityTier = serde_json::from_str("\"no-security\"").unwrap();
        assert_eq!(tier, SecurityTier::NoSecurity);
    }

    #[test]
    fn test_background_assets() {
        assert_eq!(
            SecurityTier::MaximumSecurity.background_asset().as_deref(),
            Some("/assets/backgrounds/maximum-security.png")
        );
        assert!(SecurityTier::NoSecurity.background_asset().is_none());
    }

    #[test]
    fn test_arizona_is_valid() {
        assert!(Jurisdiction::arizona().validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_is_accepted() {
        let json = serde_json::to_string(&Jurisdiction::arizona()).unwrap();
        let loaded = Jurisdiction::from_json(&json).unwrap();
        assert_eq!(loaded, Jurisdiction::arizona());
    }

    #[test]
    fn test_prescriber_limit_above_template_capacity_is_rejected() {
        let mut jurisdiction = Jurisdiction::arizona();
        jurisdiction.rules.max_prescribers = MAX_TEMPLATE_SLOTS + 1;
        assert!(matches!(
            jurisdiction.validate(),
            Err(JurisdictionError::Limit { name: "max_prescribers", .. })
        ));
    }

    #[test]
    fn test_default_tier_must_be_offered() {
        let mut jurisdiction = Jurisdiction::arizona();
        jurisdiction.rules.security_tiers = vec![SecurityTier::NoSecurity];
        assert!(matches!(
            jurisdiction.validate(),
            Err(JurisdictionError::DefaultTierNotOffered(
                SecurityTier::MaximumSecurity
            ))
        ));
    }
}
