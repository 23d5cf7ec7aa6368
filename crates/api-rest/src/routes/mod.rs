//! Router assembly and shell endpoints.

pub mod patients;
pub mod spam;

use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{HealthRes, HealthService, WelcomeRes};
use parking_lot::Mutex;
use pms_core::{PatientError, PatientRepository, TxFailure};
use spam_model::{EmailGenerator, SpamDetector};

/// Application state shared across REST API handlers.
///
/// The repository serialises store access internally; the detector and
/// generator carry their own guards because handlers mutate them.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<PatientRepository>,
    pub detector: Arc<Mutex<SpamDetector>>,
    pub generator: Arc<Mutex<EmailGenerator>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        home,
        health,
        patients::view_all,
        patients::get_patient,
        patients::sort_patients,
        patients::create_patient,
        patients::update_patient,
        patients::delete_patient,
        spam::train,
        spam::predict,
        spam::new_input,
        spam::evaluate,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::WelcomeRes,
        api_shared::MessageRes,
        api_shared::PatientRes,
        api_shared::PatientEnvelope,
        api_shared::CreatePatientReq,
        api_shared::UpdatePatientReq,
        api_shared::PredictReq,
        api_shared::PredictRes,
        api_shared::TrainRes,
        api_shared::NewInputReq,
        api_shared::EvaluateRes,
        pms_core::Gender,
    ))
)]
struct ApiDoc;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route(
            "/patients",
            get(patients::view_all).post(patients::create_patient),
        )
        .route("/patients/sort", get(patients::sort_patients))
        .route(
            "/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route("/spam/train", post(spam::train))
        .route("/spam/predict", post(spam::predict))
        .route("/spam/new-input", post(spam::new_input))
        .route("/spam/evaluate", get(spam::evaluate))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a core error to the HTTP status the caller should see.
pub(crate) fn status_for(err: &PatientError) -> StatusCode {
    match err {
        PatientError::NotFound(_) => StatusCode::NOT_FOUND,
        PatientError::DuplicateId(_) | PatientError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a transactional failure to an HTTP response, logging server faults.
pub(crate) fn failure_response(failure: &TxFailure) -> (StatusCode, String) {
    let status = status_for(&failure.source);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(command = %failure.command, "operation failed: {}", failure.source);
        (status, "Internal error".to_string())
    } else {
        (status, failure.message.clone())
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome payload", body = WelcomeRes)
    )
)]
/// Welcome endpoint with API information.
#[axum::debug_handler]
pub(crate) async fn home() -> Json<WelcomeRes> {
    Json(WelcomeRes {
        message: "Welcome to Patient + Spam Detection API".into(),
        version: "1.0.0".into(),
        docs: "/swagger-ui".into(),
        health: "/health".into(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancer probes.
#[axum::debug_handler]
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}
