use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod catalog;
pub mod config;
pub mod export;
pub mod jurisdiction;
pub mod layout;
pub mod metrics;
pub mod models;
pub mod pricing;
pub mod state;
pub mod validation;
pub mod wizard;

pub use crate::config::ServerConfig;
pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    /// Field -> message map for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::catalog::get_jurisdiction,
        crate::catalog::check_dea,
        crate::catalog::check_npi,
        crate::catalog::check_practice,
        crate::catalog::check_prescriber,
        crate::catalog::phone_format,
        crate::wizard::routes::create_session,
        crate::wizard::routes::get_session,
        crate::wizard::routes::delete_session,
        crate::wizard::routes::reset_session,
        crate::wizard::routes::prefill_sample,
        crate::wizard::routes::add_practice,
        crate::wizard::routes::update_practice,
        crate::wizard::routes::remove_practice,
        crate::wizard::routes::add_prescriber,
        crate::wizard::routes::update_prescriber,
        crate::wizard::routes::remove_prescriber,
        crate::wizard::routes::set_pad_options,
        crate::wizard::routes::set_security_tier,
        crate::wizard::routes::set_order_options,
        crate::wizard::routes::set_approval,
        crate::wizard::routes::navigate,
        crate::wizard::routes::validation_report,
        crate::wizard::routes::preview,
        crate::wizard::routes::layout,
        crate::wizard::routes::quote,
        crate::wizard::routes::export_pdf,
        crate::wizard::routes::submit
    ),
    components(
        schemas(
            ErrorResponse,
            models::PracticeLocation,
            models::Prescriber,
            models::PadOptions,
            models::OrderDraft,
            models::UpdatePracticeRequest,
            models::UpdatePrescriberRequest,
            models::SecurityTierRequest,
            models::ApprovalRequest,
            jurisdiction::SecurityTier,
            jurisdiction::SecurityFeature,
            jurisdiction::FeatureRule,
            jurisdiction::JurisdictionConfig,
            pricing::OrderOptions,
            pricing::PaperType,
            pricing::ProductionTime,
            pricing::PaperOption,
            pricing::ProductionOption,
            pricing::Quote,
            validation::IdentifierCheck,
            validation::ValidationOutcome,
            catalog::CatalogView,
            catalog::TierView,
            catalog::IdentifierRequest,
            catalog::PhoneFormatResponse,
            wizard::Step,
            wizard::NavigationRequest,
            wizard::SessionView,
            wizard::ValidationReport,
            wizard::OrderConfirmation,
        )
    ),
    tags(
        (name = "Catalog", description = "Jurisdiction data and field checks."),
        (name = "Wizard", description = "Session lifecycle and step navigation."),
        (name = "Practice", description = "Practice locations."),
        (name = "Prescribers", description = "Prescribers and pad numbering."),
        (name = "Review", description = "Security tier and proof approval."),
        (name = "Order", description = "Order options, pricing and submission."),
        (name = "Preview", description = "Pad preview and PDF export.")
    )
)]
pub struct ApiDoc;

/// Registers the JSON API and the business metrics endpoint.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(catalog::config)
            .configure(wizard::routes::config),
    )
    .service(web::resource("/metrics/orders").route(web::get().to(metrics::render)));
}

fn cors(allowed_origins: &[String]) -> Cors {
    let cors = allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin));

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers(vec![header::CONTENT_DISPOSITION])
        .max_age(3600)
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match AppState::from_config(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to initialise application state: {}", e);
            std::process::exit(1);
        }
    };

    metrics::register();
    let prometheus = PrometheusMetricsBuilder::new("rxpad_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    log::info!(
        "Starting server at http://{}:{} ({} jurisdiction, renderer {})",
        config.host,
        config.port,
        app_state.jurisdiction.rules.state,
        config.typst_bin.display()
    );

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors(&allowed_origins))
            .app_data(app_state.clone())
            .configure(configure_app)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
