use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::confirmation::OrderConfirmation;
use super::error::WizardError;
use super::session::{SessionView, ValidationReport, WizardSession};
use super::step::{NavigationRequest, Step};
use crate::metrics;
use crate::models::{
    ApprovalRequest, PadOptions, SecurityTierRequest, UpdatePracticeRequest,
    UpdatePrescriberRequest,
};
use crate::pricing::{OrderOptions, Quote};
use crate::{AppState, ErrorResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Name the file as a proof (`RxPad-Proof-<tier>.pdf`).
    pub proof: Option<bool>,
}

/// Maps a wizard error onto its HTTP status.
pub fn error_response(err: &WizardError) -> HttpResponse {
    let message = err.to_string();
    match err {
        WizardError::SessionNotFound(_) | WizardError::IndexOutOfRange { .. } => {
            HttpResponse::NotFound().json(ErrorResponse::not_found(&message))
        }
        WizardError::LimitReached { .. } | WizardError::LastEntry(_) | WizardError::Locked => {
            HttpResponse::Conflict().json(ErrorResponse::new(err.kind(), &message))
        }
        WizardError::InvalidTransition { .. }
        | WizardError::StepLocked(_)
        | WizardError::TierNotOffered(_) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
        WizardError::Invalid { errors, .. } => HttpResponse::UnprocessableEntity().json(
            ErrorResponse::new(err.kind(), &message).with_details(serde_json::json!(errors)),
        ),
        WizardError::ProofNotApproved => {
            HttpResponse::UnprocessableEntity().json(ErrorResponse::new(err.kind(), &message))
        }
        WizardError::Pricing(e) => {
            log::error!("Pricing data is incomplete: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&message))
        }
    }
}

/// Runs `f` against the locked session.
async fn with_session<T, F>(state: &AppState, id: Uuid, f: F) -> Result<T, WizardError>
where
    F: FnOnce(&mut WizardSession) -> Result<T, WizardError>,
{
    let session = state.session(id).await?;
    let mut guard = session.lock();
    f(&mut guard)
}

/// Applies a mutation and answers with the updated session.
async fn mutate<F>(state: &AppState, id: Uuid, f: F) -> HttpResponse
where
    F: FnOnce(&mut WizardSession) -> Result<(), WizardError>,
{
    match with_session(state, id, |session| {
        f(session)?;
        Ok(session.view())
    })
    .await
    {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Wizard",
    responses(
        (status = 201, description = "Session created", body = SessionView)
    )
)]
pub async fn create_session(state: web::Data<AppState>) -> impl Responder {
    let session = state.create_session().await;
    let view = session.lock().view();
    HttpResponse::Created().json(view)
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Current session state", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match with_session(&state, path.into_inner(), |s| Ok(s.view())).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn delete_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.discard_session(path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/reset",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Order discarded, wizard back at the first step", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn reset_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    mutate(&state, path.into_inner(), |s| {
        s.reset();
        Ok(())
    })
    .await
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/sample",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "First location and prescriber filled with sample data", body = SessionView),
        (status = 409, description = "Order already submitted", body = ErrorResponse)
    )
)]
pub async fn prefill_sample(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    mutate(&state, path.into_inner(), |s| s.prefill_sample()).await
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/practices",
    tag = "Practice",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 201, description = "Blank location added", body = SessionView),
        (status = 409, description = "Location limit reached", body = ErrorResponse)
    )
)]
pub async fn add_practice(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match with_session(&state, path.into_inner(), |s| {
        s.add_practice()?;
        Ok(s.view())
    })
    .await
    {
        Ok(view) => HttpResponse::Created().json(view),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}/practices/{index}",
    tag = "Practice",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("index" = usize, Path, description = "Location index, 0 is primary")
    ),
    request_body = UpdatePracticeRequest,
    responses(
        (status = 200, description = "Location updated", body = SessionView),
        (status = 404, description = "Session or location not found", body = ErrorResponse)
    )
)]
pub async fn update_practice(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
    item: web::Json<UpdatePracticeRequest>,
) -> impl Responder {
    let (id, index) = path.into_inner();
    mutate(&state, id, |s| s.update_practice(index, &item).map(|_| ())).await
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}/practices/{index}",
    tag = "Practice",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("index" = usize, Path, description = "Location index")
    ),
    responses(
        (status = 200, description = "Location removed", body = SessionView),
        (status = 404, description = "Session or location not found", body = ErrorResponse),
        (status = 409, description = "Last location cannot be removed", body = ErrorResponse)
    )
)]
pub async fn remove_practice(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
) -> impl Responder {
    let (id, index) = path.into_inner();
    mutate(&state, id, |s| s.remove_practice(index)).await
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/prescribers",
    tag = "Prescribers",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 201, description = "Blank prescriber added", body = SessionView),
        (status = 409, description = "Prescriber limit reached", body = ErrorResponse)
    )
)]
pub async fn add_prescriber(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match with_session(&state, path.into_inner(), |s| {
        s.add_prescriber()?;
        Ok(s.view())
    })
    .await
    {
        Ok(view) => HttpResponse::Created().json(view),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}/prescribers/{index}",
    tag = "Prescribers",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("index" = usize, Path, description = "Prescriber index")
    ),
    request_body = UpdatePrescriberRequest,
    responses(
        (status = 200, description = "Prescriber updated", body = SessionView),
        (status = 404, description = "Session or prescriber not found", body = ErrorResponse)
    )
)]
pub async fn update_prescriber(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
    item: web::Json<UpdatePrescriberRequest>,
) -> impl Responder {
    let (id, index) = path.into_inner();
    mutate(&state, id, |s| s.update_prescriber(index, &item).map(|_| ())).await
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}/prescribers/{index}",
    tag = "Prescribers",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("index" = usize, Path, description = "Prescriber index")
    ),
    responses(
        (status = 200, description = "Prescriber removed", body = SessionView),
        (status = 404, description = "Session or prescriber not found", body = ErrorResponse),
        (status = 409, description = "Last prescriber cannot be removed", body = ErrorResponse)
    )
)]
pub async fn remove_prescriber(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
) -> impl Responder {
    let (id, index) = path.into_inner();
    mutate(&state, id, |s| s.remove_prescriber(index)).await
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}/pad-options",
    tag = "Prescribers",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = PadOptions,
    responses(
        (status = 200, description = "Pad options updated", body = SessionView)
    )
)]
pub async fn set_pad_options(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    item: web::Json<PadOptions>,
) -> impl Responder {
    let options = item.into_inner();
    mutate(&state, path.into_inner(), |s| s.set_pad_options(options)).await
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}/security-tier",
    tag = "Review",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = SecurityTierRequest,
    responses(
        (status = 200, description = "Security tier selected", body = SessionView),
        (status = 400, description = "Tier not offered in this jurisdiction", body = ErrorResponse)
    )
)]
pub async fn set_security_tier(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    item: web::Json<SecurityTierRequest>,
) -> impl Responder {
    let tier = item.security_tier;
    mutate(&state, path.into_inner(), |s| s.set_security_tier(tier)).await
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}/order-options",
    tag = "Order",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = OrderOptions,
    responses(
        (status = 200, description = "Order options updated", body = SessionView)
    )
)]
pub async fn set_order_options(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    item: web::Json<OrderOptions>,
) -> impl Responder {
    let options = item.into_inner();
    mutate(&state, path.into_inner(), |s| s.set_order_options(options)).await
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}/approval",
    tag = "Review",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Proof approval recorded", body = SessionView),
        (status = 400, description = "Proof cannot be reviewed yet", body = ErrorResponse)
    )
)]
pub async fn set_approval(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    item: web::Json<ApprovalRequest>,
) -> impl Responder {
    let approved = item.approved;
    mutate(&state, path.into_inner(), |s| s.set_approval(approved)).await
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/navigation",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = NavigationRequest,
    responses(
        (status = 200, description = "Moved to the resulting step", body = SessionView),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 422, description = "Current step has invalid fields", body = ErrorResponse)
    )
)]
pub async fn navigate(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    item: web::Json<NavigationRequest>,
) -> impl Responder {
    let request = item.into_inner();
    let result = with_session(&state, path.into_inner(), |s| {
        let from = s.step();
        let to = s.navigate(request, Utc::now())?;
        Ok((from != Step::Confirmed && to == Step::Confirmed, s.view()))
    })
    .await;

    match result {
        Ok((submitted, view)) => {
            if submitted {
                metrics::ORDERS_SUBMITTED_TOTAL.inc();
            }
            HttpResponse::Ok().json(view)
        }
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/validation",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Field errors per record and unlocked steps", body = ValidationReport)
    )
)]
pub async fn validation_report(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match with_session(&state, path.into_inner(), |s| Ok(s.validation_report())).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/preview",
    tag = "Preview",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "SVG preview of the pad", body = String, content_type = "image/svg+xml")
    )
)]
pub async fn preview(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match with_session(&state, path.into_inner(), |s| Ok(s.preview())).await {
        Ok(layout) => HttpResponse::Ok()
            .content_type("image/svg+xml")
            .body(layout.to_svg()),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/layout",
    tag = "Preview",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Vector description of the pad", body = Object, content_type = "application/json")
    )
)]
pub async fn layout(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match with_session(&state, path.into_inner(), |s| Ok(s.layout())).await {
        Ok(layout) => HttpResponse::Ok().json(layout),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/quote",
    tag = "Order",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Itemised price", body = Quote)
    )
)]
pub async fn quote(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match with_session(&state, path.into_inner(), |s| s.quote()).await {
        Ok(quote) => HttpResponse::Ok().json(quote),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}/export",
    tag = "Preview",
    params(("id" = Uuid, Path, description = "Session ID"), ExportQuery),
    responses(
        (status = 200, description = "Print-ready PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 204, description = "Nothing to export"),
        (status = 500, description = "Renderer failed", body = ErrorResponse)
    )
)]
pub async fn export_pdf(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ExportQuery>,
) -> impl Responder {
    let proof = query.proof.unwrap_or(false);
    // The lock is released before the renderer runs.
    let prepared = with_session(&state, path.into_inner(), |s| {
        Ok((s.layout(), s.export_context(proof)))
    })
    .await;
    let (layout, context) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return error_response(&e),
    };

    match state.exporter.export(&layout, &context).await {
        Ok(Some(document)) => {
            metrics::record_export("ok");
            HttpResponse::Ok()
                .content_type("application/pdf")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.filename),
                ))
                .body(document.pdf)
        }
        Ok(None) => {
            metrics::record_export("skipped");
            HttpResponse::NoContent().finish()
        }
        Err(e) => {
            metrics::record_export("failed");
            log::error!("Export of {} failed: {}", context, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("RendererError", &e.to_string()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/sessions/{id}/submit",
    tag = "Order",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Order placed", body = OrderConfirmation),
        (status = 400, description = "Not at the order step", body = ErrorResponse),
        (status = 409, description = "Order already submitted", body = ErrorResponse)
    )
)]
pub async fn submit(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match with_session(&state, path.into_inner(), |s| {
        s.submit(Utc::now()).cloned()
    })
    .await
    {
        Ok(confirmation) => {
            metrics::ORDERS_SUBMITTED_TOTAL.inc();
            HttpResponse::Ok().json(confirmation)
        }
        Err(e) => error_response(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/sessions").route(web::post().to(create_session)))
        .service(
            web::resource("/sessions/{id}")
                .route(web::get().to(get_session))
                .route(web::delete().to(delete_session)),
        )
        .service(web::resource("/sessions/{id}/reset").route(web::post().to(reset_session)))
        .service(web::resource("/sessions/{id}/sample").route(web::post().to(prefill_sample)))
        .service(web::resource("/sessions/{id}/practices").route(web::post().to(add_practice)))
        .service(
            web::resource("/sessions/{id}/practices/{index}")
                .route(web::put().to(update_practice))
                .route(web::delete().to(remove_practice)),
        )
        .service(
            web::resource("/sessions/{id}/prescribers").route(web::post().to(add_prescriber)),
        )
        .service(
            web::resource("/sessions/{id}/prescribers/{index}")
                .route(web::put().to(update_prescriber))
                .route(web::delete().to(remove_prescriber)),
        )
        .service(
            web::resource("/sessions/{id}/pad-options").route(web::put().to(set_pad_options)),
        )
        .service(
            web::resource("/sessions/{id}/security-tier")
                .route(web::put().to(set_security_tier)),
        )
        .service(
            web::resource("/sessions/{id}/order-options")
                .route(web::put().to(set_order_options)),
        )
        .service(web::resource("/sessions/{id}/approval").route(web::put().to(set_approval)))
        .service(web::resource("/sessions/{id}/navigation").route(web::post().to(navigate)))
        .service(
            web::resource("/sessions/{id}/validation").route(web::get().to(validation_report)),
        )
        .service(web::resource("/sessions/{id}/preview").route(web::get().to(preview)))
        .service(web::resource("/sessions/{id}/layout").route(web::get().to(layout)))
        .service(web::resource("/sessions/{id}/quote").route(web::get().to(quote)))
        .service(web::resource("/sessions/{id}/export").route(web::get().to(export_pdf)))
        .service(web::resource("/sessions/{id}/submit").route(web::post().to(submit)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingError;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;

    async fn error_body(err: WizardError) -> (StatusCode, serde_json::Value) {
        let resp = error_response(&err);
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_error_kind_matches_status() {
        let (status, body) = error_body(WizardError::SessionNotFound(Uuid::nil())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NotFound");

        let (status, body) = error_body(WizardError::StepLocked(Step::Order)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BadRequest");

        let (status, body) = error_body(WizardError::Locked).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Conflict");

        let (status, body) =
            error_body(WizardError::Pricing(PricingError::UnsupportedQuantity(3))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "InternalServerError");
        assert!(body.get("details").is_none());
    }
}
