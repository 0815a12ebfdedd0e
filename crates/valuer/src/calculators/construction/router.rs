use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{CalculatorKind, PropId, YearRangeValue};
use super::repository::{ConstructionRepository, RateScheduleRepository, RepositoryError};
use super::service::{CalculationService, CalculationServiceError};
use super::validation::{CalculationRequest, NewConstructionRequest};

/// Router builder exposing the calculator endpoints over a shared service.
pub fn construction_router<R, S>(service: Arc<CalculationService<R, S>>) -> Router
where
    R: ConstructionRepository + 'static,
    S: RateScheduleRepository + 'static,
{
    Router::new()
        .route("/api/v1/constructions", post(create_handler::<R, S>))
        .route(
            "/api/v1/constructions/:prop_id",
            get(get_handler::<R, S>),
        )
        .route(
            "/api/v1/constructions/:prop_id/calculate",
            post(calculate_handler::<R, S>),
        )
        .route(
            "/api/v1/rates/:kind",
            get(schedule_handler::<R, S>).put(replace_schedule_handler::<R, S>),
        )
        .route("/api/v1/rates", get(kinds_handler))
        .with_state(service)
}

pub(crate) async fn create_handler<R, S>(
    State(service): State<Arc<CalculationService<R, S>>>,
    axum::Json(request): axum::Json<NewConstructionRequest>,
) -> Response
where
    R: ConstructionRepository + 'static,
    S: RateScheduleRepository + 'static,
{
    match service.create(request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<R, S>(
    State(service): State<Arc<CalculationService<R, S>>>,
    Path(prop_id): Path<String>,
) -> Response
where
    R: ConstructionRepository + 'static,
    S: RateScheduleRepository + 'static,
{
    match service.get(&PropId(prop_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn calculate_handler<R, S>(
    State(service): State<Arc<CalculationService<R, S>>>,
    Path(prop_id): Path<String>,
    axum::Json(request): axum::Json<CalculationRequest>,
) -> Response
where
    R: ConstructionRepository + 'static,
    S: RateScheduleRepository + 'static,
{
    match service.calculate(&PropId(prop_id), request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn schedule_handler<R, S>(
    State(service): State<Arc<CalculationService<R, S>>>,
    Path(kind): Path<String>,
) -> Response
where
    R: ConstructionRepository + 'static,
    S: RateScheduleRepository + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    match service.schedule(kind) {
        Ok(rows) => (StatusCode::OK, axum::Json(rows)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn replace_schedule_handler<R, S>(
    State(service): State<Arc<CalculationService<R, S>>>,
    Path(kind): Path<String>,
    axum::Json(rows): axum::Json<Vec<YearRangeValue>>,
) -> Response
where
    R: ConstructionRepository + 'static,
    S: RateScheduleRepository + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    match service.replace_schedule(kind, rows) {
        Ok(count) => {
            let payload = json!({ "kind": kind.label(), "rows": count });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn kinds_handler() -> Response {
    let labels: Vec<&'static str> = CalculatorKind::ALL.iter().map(|kind| kind.label()).collect();
    (StatusCode::OK, axum::Json(labels)).into_response()
}

fn parse_kind(raw: &str) -> Result<CalculatorKind, Response> {
    raw.parse::<CalculatorKind>().map_err(|err| {
        let payload = json!({
            "error": "submission failed validation",
            "fields": [{ "field": "kind", "message": err.to_string() }],
        });
        (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
    })
}

fn error_response(err: CalculationServiceError) -> Response {
    match err {
        CalculationServiceError::Validation(validation) => {
            let payload = json!({
                "error": "submission failed validation",
                "fields": validation.fields,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        CalculationServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "construction record not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        CalculationServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "construction record already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        CalculationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            // Persistence details stay out of the response body.
            let payload = json!({ "error": "operation failed" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
