//! # API REST
//!
//! REST API for the hospital registry.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! The registry itself is single-threaded; the API shares one instance behind a
//! `tokio::sync::Mutex`, which serialises admissions and billing across requests.

#![warn(rust_2018_idioms)]

pub mod models;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use hospital_core::{BillingStrategy, HospitalError, Registry};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use models::{
    AdmitPatientReq, BillRes, CreateBillReq, ErrorRes, HealthRes, ListBillsRes, ListPatientsRes,
    ListStrategiesRes, PatientRes, StrategyRes, UpdatePatientReq,
};

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorRes>);

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<Mutex<Registry>>,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        admit_patient,
        get_patient,
        update_patient,
        list_patient_bills,
        list_bills,
        create_bill,
        list_strategies,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        AdmitPatientReq,
        UpdatePatientReq,
        PatientRes,
        ListPatientsRes,
        CreateBillReq,
        BillRes,
        ListBillsRes,
        StrategyRes,
        ListStrategiesRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(admit_patient))
        .route("/patients/:id", get(get_patient).put(update_patient))
        .route("/patients/:id/bills", get(list_patient_bills))
        .route("/bills", get(list_bills).post(create_bill))
        .route("/strategies", get(list_strategies))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps a core error onto an HTTP status and JSON body.
fn api_error(e: HospitalError) -> ApiError {
    let status = match e {
        HospitalError::PatientNotFound(_) => StatusCode::NOT_FOUND,
        HospitalError::InvalidCategory(_)
        | HospitalError::InvalidAttribute(_)
        | HospitalError::UnknownStrategy(_)
        | HospitalError::InvalidInput(_) => StatusCode::BAD_REQUEST,
    };
    tracing::debug!("request rejected ({}): {}", status, e);
    (
        status,
        Json(ErrorRes {
            error: e.to_string(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Hospital REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "Patients in admission order", body = ListPatientsRes)
    )
)]
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Json<ListPatientsRes> {
    let registry = state.registry.lock().await;
    let patients = registry
        .list_patients()
        .iter()
        .map(PatientRes::from)
        .collect();
    Json(ListPatientsRes { patients })
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = AdmitPatientReq,
    responses(
        (status = 201, description = "Patient admitted", body = PatientRes),
        (status = 400, description = "Invalid category or attributes", body = ErrorRes)
    )
)]
/// Admit a new patient
///
/// Admission announces the patient to every subscribed department. Department failures are
/// logged by the registry and do not affect the response.
#[axum::debug_handler]
async fn admit_patient(
    State(state): State<AppState>,
    Json(req): Json<AdmitPatientReq>,
) -> Result<(StatusCode, Json<PatientRes>), ApiError> {
    let mut registry = state.registry.lock().await;
    let patient = registry
        .admit(&req.category, &req.name, req.age, req.attributes())
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(PatientRes::from(&patient))))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier, e.g. P0001")),
    responses(
        (status = 200, description = "Patient", body = PatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientRes>, ApiError> {
    let registry = state.registry.lock().await;
    let patient = registry.patient(&id).map_err(api_error)?;
    Ok(Json(PatientRes::from(&patient)))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier, e.g. P0001")),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientRes),
        (status = 400, description = "Invalid name", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Update a patient's name and/or age
///
/// Category and category-specific attributes are fixed at admission and cannot be changed.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePatientReq>,
) -> Result<Json<PatientRes>, ApiError> {
    let mut registry = state.registry.lock().await;
    let patient = registry
        .update_patient(&id, req.name.as_deref(), req.age)
        .map_err(api_error)?;
    Ok(Json(PatientRes::from(&patient)))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/bills",
    params(("id" = String, Path, description = "Patient identifier, e.g. P0001")),
    responses(
        (status = 200, description = "Bills for the patient", body = ListBillsRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_patient_bills(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListBillsRes>, ApiError> {
    let registry = state.registry.lock().await;
    let bills = registry.bills_for_patient(&id).map_err(api_error)?;
    Ok(Json(ListBillsRes {
        bills: bills.iter().map(BillRes::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/bills",
    responses(
        (status = 200, description = "Bills in issue order", body = ListBillsRes)
    )
)]
#[axum::debug_handler]
async fn list_bills(State(state): State<AppState>) -> Json<ListBillsRes> {
    let registry = state.registry.lock().await;
    let bills = registry.list_bills().iter().map(BillRes::from).collect();
    Json(ListBillsRes { bills })
}

#[utoipa::path(
    post,
    path = "/bills",
    request_body = CreateBillReq,
    responses(
        (status = 201, description = "Bill issued", body = BillRes),
        (status = 400, description = "Unknown billing strategy", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn create_bill(
    State(state): State<AppState>,
    Json(req): Json<CreateBillReq>,
) -> Result<(StatusCode, Json<BillRes>), ApiError> {
    let mut registry = state.registry.lock().await;
    let bill = registry
        .bill(&req.patient_id, &req.strategy)
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(BillRes::from(&bill))))
}

#[utoipa::path(
    get,
    path = "/strategies",
    responses(
        (status = 200, description = "Available billing strategies", body = ListStrategiesRes)
    )
)]
#[axum::debug_handler]
async fn list_strategies(State(_state): State<AppState>) -> Json<ListStrategiesRes> {
    Json(ListStrategiesRes {
        strategies: BillingStrategy::ALL
            .into_iter()
            .map(StrategyRes::from)
            .collect(),
    })
}
