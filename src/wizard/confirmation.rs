use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::jurisdiction::SecurityTier;
use crate::pricing::{OrderOptions, ProductionTime, Quote};

/// Length of the delivery window in days.
pub const DELIVERY_WINDOW_DAYS: i64 = 2;

/// Receipt for a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderConfirmation {
    #[schema(example = "RXF-2026-04817")]
    pub order_number: String,
    #[schema(example = "October 24-26, 2026")]
    pub estimated_delivery: String,
    pub security_tier: SecurityTier,
    pub order_options: OrderOptions,
    pub quote: Quote,
    pub submitted_at: DateTime<Utc>,
}

/// `RXF-<year>-<5 digits>`, the digits taken from a random UUID.
pub fn order_number(year: i32) -> String {
    let serial = Uuid::new_v4().as_u128() % 100_000;
    format!("RXF-{}-{:05}", year, serial)
}

/// `"<Month> <d1>-<d2>, <year>"`, named after the month the window opens in.
pub fn estimated_delivery(ordered_on: NaiveDate, production: ProductionTime) -> String {
    let start = ordered_on + Duration::days(production.lead_days());
    let end = start + Duration::days(DELIVERY_WINDOW_DAYS);
    format!(
        "{} {}-{}, {}",
        start.format("%B"),
        start.day(),
        end.day(),
        start.year()
    )
}

impl OrderConfirmation {
    pub fn new(
        security_tier: SecurityTier,
        order_options: OrderOptions,
        quote: Quote,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_number: order_number(submitted_at.year()),
            estimated_delivery: estimated_delivery(
                submitted_at.date_naive(),
                order_options.production_time,
            ),
            security_tier,
            order_options,
            quote,
            submitted_at,
        }
    }
}
