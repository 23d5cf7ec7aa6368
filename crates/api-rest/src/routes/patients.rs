//! Patient CRUD and sorting endpoints.
//!
//! Identifier collision and not-found checks happen here, inside the
//! transactional mutators; the repository layer only sees validated stores.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use std::collections::BTreeMap;

use api_shared::{
    CreatePatientReq, MessageRes, PatientEnvelope, PatientRes, SortQuery, UpdatePatientReq,
};
use pms_core::{PatientError, Store};

use super::{failure_response, AppState};

const VALID_SORT_FIELDS: &[&str] = &["height", "weight", "bmi"];

fn load_store(state: &AppState) -> Result<Store, (StatusCode, String)> {
    state.repository.load().map_err(|e| {
        tracing::error!("failed to load patient store: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All patient records keyed by identifier"),
        (status = 500, description = "Internal server error")
    )
)]
/// View the full patient store.
///
/// Returns every record keyed by its identifier, with derived BMI and
/// verdict included.
#[axum::debug_handler]
pub(crate) async fn view_all(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, PatientRes>>, (StatusCode, String)> {
    let store = load_store(&state)?;
    let view = store
        .iter()
        .map(|(id, record)| (id.clone(), PatientRes::from_record(record)))
        .collect();
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Patient record", body = PatientRes),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Fetch a single patient by identifier.
#[axum::debug_handler]
pub(crate) async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientRes>, (StatusCode, String)> {
    let store = load_store(&state)?;
    match store.get(&id) {
        Some(record) => Ok(Json(PatientRes::from_record(record))),
        None => Err((StatusCode::NOT_FOUND, "Patient not found".into())),
    }
}

#[utoipa::path(
    get,
    path = "/patients/sort",
    params(SortQuery),
    responses(
        (status = 200, description = "Sorted patient records", body = [PatientRes]),
        (status = 400, description = "Invalid sort field or order"),
        (status = 500, description = "Internal server error")
    )
)]
/// List patients sorted by height, weight or BMI.
#[axum::debug_handler]
pub(crate) async fn sort_patients(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> Result<Json<Vec<PatientRes>>, (StatusCode, String)> {
    if !VALID_SORT_FIELDS.contains(&query.sort_by.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid sort field. Valid fields are: {}",
                VALID_SORT_FIELDS.join(", ")
            ),
        ));
    }
    if query.order != "asc" && query.order != "desc" {
        return Err((
            StatusCode::BAD_REQUEST,
            "Invalid sort order. Use 'asc' or 'desc'.".into(),
        ));
    }

    let store = load_store(&state)?;
    let mut records: Vec<PatientRes> = store.values().map(PatientRes::from_record).collect();

    let key = |r: &PatientRes| match query.sort_by.as_str() {
        "height" => r.height,
        "weight" => r.weight,
        _ => r.bmi,
    };
    records.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal));
    if query.order == "desc" {
        records.reverse();
    }

    Ok(Json(records))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = PatientEnvelope),
        (status = 400, description = "Invalid input or duplicate identifier"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a new patient record.
#[axum::debug_handler]
pub(crate) async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<CreatePatientReq>,
) -> Result<(StatusCode, Json<PatientEnvelope>), (StatusCode, String)> {
    let (id, record) = req
        .into_parts()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let created = state
        .repository
        .transactional_apply("create_patient", move |store| {
            if store.contains_key(&id) {
                return Err(PatientError::DuplicateId(id));
            }
            store.insert(id, record.clone());
            Ok(record)
        })
        .map_err(|f| failure_response(&f))?;

    Ok((
        StatusCode::CREATED,
        Json(PatientEnvelope {
            message: "Patient created successfully".into(),
            patient: PatientRes::from_record(&created),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientEnvelope),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Partially update an existing patient.
///
/// Only the supplied fields change; the merged record is revalidated before
/// it is persisted.
#[axum::debug_handler]
pub(crate) async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePatientReq>,
) -> Result<Json<PatientEnvelope>, (StatusCode, String)> {
    let update = req.into_update();

    let updated = state
        .repository
        .transactional_apply("update_patient", move |store| {
            let existing = store
                .get(&id)
                .ok_or_else(|| PatientError::NotFound(id.clone()))?;
            let merged = existing.merged(&update)?;
            store.insert(id, merged.clone());
            Ok(merged)
        })
        .map_err(|f| failure_response(&f))?;

    Ok(Json(PatientEnvelope {
        message: "Patient updated successfully".into(),
        patient: PatientRes::from_record(&updated),
    }))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageRes),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Delete a patient record.
#[axum::debug_handler]
pub(crate) async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageRes>, (StatusCode, String)> {
    state
        .repository
        .transactional_apply("delete_patient", move |store| {
            store
                .remove(&id)
                .ok_or_else(|| PatientError::NotFound(id.clone()))
        })
        .map_err(|f| failure_response(&f))?;

    Ok(Json(MessageRes {
        message: "Patient deleted successfully".into(),
    }))
}
