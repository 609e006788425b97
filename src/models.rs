use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::jurisdiction::{JurisdictionConfig, SecurityTier};
use crate::pricing::OrderOptions;

pub const DEFAULT_STARTING_NUMBER: &str = "0001";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, ToSchema)]
#[serde(default)]
pub struct PracticeLocation {
    #[schema(example = "Arizona Family Medical Group")]
    pub name: String,
    #[schema(example = "4521 E Sunrise Drive")]
    pub address: String,
    #[schema(example = "Tucson")]
    pub city: String,
    #[schema(example = "AZ")]
    pub state: String,
    #[schema(example = "85718")]
    pub zip: String,
    #[schema(example = "(520) 555-0123")]
    pub phone: String,
    #[schema(example = "(520) 555-0124")]
    pub fax: String,
}

impl PracticeLocation {
    /// Blank location pre-set to the jurisdiction's state code.
    pub fn in_state(state_code: &str) -> Self {
        Self {
            state: state_code.to_string(),
            ..Self::default()
        }
    }

    /// `address, city, state, zip` with blank parts skipped.
    pub fn address_line(&self) -> String {
        [&self.address, &self.city, &self.state, &self.zip]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, ToSchema)]
#[serde(default)]
pub struct Prescriber {
    #[schema(example = "Sarah Chen")]
    pub name: String,
    #[schema(example = "MD")]
    pub credentials: String,
    #[schema(example = "Family Medicine")]
    pub specialty: String,
    #[schema(example = "MD-45892")]
    pub license_number: String,
    /// Suppress the license number on the printed pad.
    pub hide_license: bool,
    #[schema(example = "1234567890")]
    pub npi_number: String,
    #[schema(example = "FC1234563")]
    pub dea_number: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
#[serde(default)]
pub struct PadOptions {
    /// First sequential number printed on the pad.
    #[schema(example = "0001")]
    pub starting_number: String,
}

impl Default for PadOptions {
    fn default() -> Self {
        Self {
            starting_number: DEFAULT_STARTING_NUMBER.to_string(),
        }
    }
}

/// Everything the customer has entered for one order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct OrderDraft {
    pub practices: Vec<PracticeLocation>,
    pub prescribers: Vec<Prescriber>,
    pub pad_options: PadOptions,
    pub security_tier: SecurityTier,
    pub order_options: OrderOptions,
    pub proof_approved: bool,
}

impl OrderDraft {
    pub fn new(rules: &JurisdictionConfig) -> Self {
        Self {
            practices: vec![PracticeLocation::in_state(&rules.state_code)],
            prescribers: vec![Prescriber::default()],
            pad_options: PadOptions::default(),
            security_tier: rules.default_security_tier,
            order_options: OrderOptions::default(),
            proof_approved: false,
        }
    }
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdatePracticeRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdatePrescriberRequest {
    pub name: Option<String>,
    pub credentials: Option<String>,
    pub specialty: Option<String>,
    pub license_number: Option<String>,
    pub hide_license: Option<bool>,
    pub npi_number: Option<String>,
    pub dea_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SecurityTierRequest {
    pub security_tier: SecurityTier,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovalRequest {
    pub approved: bool,
}

/// Tucson sample location used by the "prefill" action.
pub fn sample_practice() -> PracticeLocation {
    PracticeLocation {
        name: "Arizona Family Medical Group".to_string(),
        address: "4521 E Sunrise Drive".to_string(),
        city: "Tucson".to_string(),
        state: "AZ".to_string(),
        zip: "85718".to_string(),
        phone: "(520) 555-0123".to_string(),
        fax: "(520) 555-0124".to_string(),
    }
}

pub fn sample_prescriber() -> Prescriber {
    Prescriber {
        name: "Sarah Chen".to_string(),
        credentials: "MD".to_string(),
        specialty: "Family Medicine".to_string(),
        license_number: "MD-45892".to_string(),
        hide_license: false,
        npi_number: "1234567890".to_string(),
        dea_number: "FC1234563".to_string(),
    }
}
