//! Read-only endpoints: jurisdiction catalogue and stand-alone field checks.

use std::collections::{BTreeMap, BTreeSet};

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::jurisdiction::{Jurisdiction, JurisdictionConfig, SecurityFeature, SecurityTier};
use crate::models::{PracticeLocation, Prescriber};
use crate::pricing::{PaperOption, ProductionOption, QUANTITIES};
use crate::validation::{
    format_phone, validate_dea, validate_npi, validate_practice, validate_prescriber,
    IdentifierCheck, ValidationOutcome,
};
use crate::AppState;

/// One selectable security tier.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TierView {
    pub id: SecurityTier,
    pub label: String,
    pub description: String,
    /// Quantity -> price in whole dollars.
    pub prices: BTreeMap<u32, u32>,
    pub features: BTreeSet<SecurityFeature>,
    /// On-screen background; absent for the plain tier.
    pub background: Option<String>,
}

/// Everything the client needs to render the wizard's option lists.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogView {
    pub rules: JurisdictionConfig,
    pub tiers: Vec<TierView>,
    pub quantities: Vec<u32>,
    pub paper_types: Vec<PaperOption>,
    pub production_times: Vec<ProductionOption>,
    pub tax_rate_percent: u32,
}

impl CatalogView {
    pub fn new(jurisdiction: &Jurisdiction) -> Self {
        let rules = &jurisdiction.rules;
        let tiers = rules
            .security_tiers
            .iter()
            .filter_map(|tier| {
                jurisdiction.pricing.tier(*tier).map(|pricing| TierView {
                    id: *tier,
                    label: pricing.label.clone(),
                    description: pricing.description.clone(),
                    prices: pricing.prices.clone(),
                    features: rules.features(*tier),
                    background: tier.background_asset(),
                })
            })
            .collect();

        Self {
            rules: rules.clone(),
            tiers,
            quantities: QUANTITIES.to_vec(),
            paper_types: jurisdiction.pricing.paper_types.clone(),
            production_times: jurisdiction.pricing.production_times.clone(),
            tax_rate_percent: jurisdiction.pricing.tax_rate_percent,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IdentifierRequest {
    #[schema(example = "AB1234563")]
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PhoneFormatResponse {
    #[schema(example = "(520) 555-0123")]
    pub formatted: String,
}

#[utoipa::path(
    get,
    path = "/api/jurisdiction",
    tag = "Catalog",
    responses(
        (status = 200, description = "Tiers, prices, options and limits", body = CatalogView)
    )
)]
pub async fn get_jurisdiction(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(CatalogView::new(&state.jurisdiction))
}

#[utoipa::path(
    post,
    path = "/api/validate/dea",
    tag = "Catalog",
    request_body = IdentifierRequest,
    responses(
        (status = 200, description = "Format and checksum result", body = IdentifierCheck)
    )
)]
pub async fn check_dea(item: web::Json<IdentifierRequest>) -> impl Responder {
    HttpResponse::Ok().json(validate_dea(&item.value))
}

#[utoipa::path(
    post,
    path = "/api/validate/npi",
    tag = "Catalog",
    request_body = IdentifierRequest,
    responses(
        (status = 200, description = "Format result", body = IdentifierCheck)
    )
)]
pub async fn check_npi(item: web::Json<IdentifierRequest>) -> impl Responder {
    HttpResponse::Ok().json(validate_npi(&item.value))
}

#[utoipa::path(
    post,
    path = "/api/validate/practice",
    tag = "Catalog",
    request_body = PracticeLocation,
    responses(
        (status = 200, description = "Field errors of the location", body = ValidationOutcome)
    )
)]
pub async fn check_practice(item: web::Json<PracticeLocation>) -> impl Responder {
    HttpResponse::Ok().json(validate_practice(&item))
}

#[utoipa::path(
    post,
    path = "/api/validate/prescriber",
    tag = "Catalog",
    request_body = Prescriber,
    responses(
        (status = 200, description = "Field errors of the prescriber", body = ValidationOutcome)
    )
)]
pub async fn check_prescriber(item: web::Json<Prescriber>) -> impl Responder {
    HttpResponse::Ok().json(validate_prescriber(&item))
}

#[utoipa::path(
    post,
    path = "/api/format/phone",
    tag = "Catalog",
    request_body = IdentifierRequest,
    responses(
        (status = 200, description = "Progressively punctuated phone number", body = PhoneFormatResponse)
    )
)]
pub async fn phone_format(item: web::Json<IdentifierRequest>) -> impl Responder {
    HttpResponse::Ok().json(PhoneFormatResponse {
        formatted: format_phone(&item.value),
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/jurisdiction").route(web::get().to(get_jurisdiction)))
        .service(web::resource("/validate/dea").route(web::post().to(check_dea)))
        .service(web::resource("/validate/npi").route(web::post().to(check_npi)))
        .service(web::resource("/validate/practice").route(web::post().to(check_practice)))
        .service(web::resource("/validate/prescriber").route(web::post().to(check_prescriber)))
        .service(web::resource("/format/phone").route(web::post().to(phone_format)));
}
