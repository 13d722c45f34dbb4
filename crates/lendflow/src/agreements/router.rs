use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use crate::contracts::{
    ActivateAgreementRequest, AgreementId, ClientAgreementsResponse, ClientId,
    CreateAgreementRequest, CreateAgreementResponse, PaymentScheduleResponse, ProductsResponse,
};

use super::domain::ScheduledPayment;
use super::repository::{AgreementRepository, ProductCatalog, ScheduleStore};
use super::service::{AgreementService, AgreementServiceError};

/// Router builder exposing the agreement engine endpoints.
pub fn agreement_router<P, A, S>(service: Arc<AgreementService<P, A, S>>) -> Router
where
    P: ProductCatalog + 'static,
    A: AgreementRepository + 'static,
    S: ScheduleStore + 'static,
{
    Router::new()
        .route("/api/v1/agreements", post(create_handler::<P, A, S>))
        .route(
            "/api/v1/agreements/:agreement_id/activate",
            post(activate_handler::<P, A, S>),
        )
        .route(
            "/api/v1/agreements/:agreement_id/schedule",
            get(schedule_handler::<P, A, S>),
        )
        .route(
            "/api/v1/agreements/:agreement_id/schedule/approximated",
            get(approximated_handler::<P, A, S>),
        )
        .route(
            "/api/v1/clients/:client_id/agreements",
            get(client_agreements_handler::<P, A, S>),
        )
        .route("/api/v1/products", get(products_handler::<P, A, S>))
        .with_state(service)
}

pub(crate) async fn create_handler<P, A, S>(
    State(service): State<Arc<AgreementService<P, A, S>>>,
    axum::Json(request): axum::Json<CreateAgreementRequest>,
) -> Response
where
    P: ProductCatalog + 'static,
    A: AgreementRepository + 'static,
    S: ScheduleStore + 'static,
{
    match service.create_agreement(request) {
        Ok(agreement_id) => (
            StatusCode::CREATED,
            axum::Json(CreateAgreementResponse { agreement_id }),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn activate_handler<P, A, S>(
    State(service): State<Arc<AgreementService<P, A, S>>>,
    Path(agreement_id): Path<String>,
    axum::Json(request): axum::Json<ActivateAgreementRequest>,
) -> Response
where
    P: ProductCatalog + 'static,
    A: AgreementRepository + 'static,
    S: ScheduleStore + 'static,
{
    let id = AgreementId(agreement_id);
    match service.activate(&id, request.disbursement_date) {
        Ok(schedule) => (StatusCode::OK, axum::Json(schedule.response())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn schedule_handler<P, A, S>(
    State(service): State<Arc<AgreementService<P, A, S>>>,
    Path(agreement_id): Path<String>,
) -> Response
where
    P: ProductCatalog + 'static,
    A: AgreementRepository + 'static,
    S: ScheduleStore + 'static,
{
    let id = AgreementId(agreement_id);
    match service.payment_schedule(&id) {
        Ok(schedule) => (StatusCode::OK, axum::Json(schedule.response())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approximated_handler<P, A, S>(
    State(service): State<Arc<AgreementService<P, A, S>>>,
    Path(agreement_id): Path<String>,
) -> Response
where
    P: ProductCatalog + 'static,
    A: AgreementRepository + 'static,
    S: ScheduleStore + 'static,
{
    let id = AgreementId(agreement_id);
    match service.approximated_schedule(&id) {
        Ok(payments) => {
            let response = PaymentScheduleResponse {
                agreement_id: id,
                version: 0, // never persisted; versions start at 1
                payments: payments.iter().map(ScheduledPayment::view).collect(),
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn client_agreements_handler<P, A, S>(
    State(service): State<Arc<AgreementService<P, A, S>>>,
    Path(client_id): Path<String>,
) -> Response
where
    P: ProductCatalog + 'static,
    A: AgreementRepository + 'static,
    S: ScheduleStore + 'static,
{
    match service.agreements_for_client(&ClientId(client_id)) {
        Ok(agreement_ids) => (
            StatusCode::OK,
            axum::Json(ClientAgreementsResponse { agreement_ids }),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn products_handler<P, A, S>(
    State(service): State<Arc<AgreementService<P, A, S>>>,
) -> Response
where
    P: ProductCatalog + 'static,
    A: AgreementRepository + 'static,
    S: ScheduleStore + 'static,
{
    match service.products() {
        Ok(products) => (StatusCode::OK, axum::Json(ProductsResponse { products })).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AgreementServiceError) -> Response {
    let status = match &error {
        AgreementServiceError::NotFound | AgreementServiceError::UnknownProduct { .. } => {
            StatusCode::NOT_FOUND
        }
        AgreementServiceError::AlreadyActivated { .. } => StatusCode::CONFLICT,
        AgreementServiceError::ProductConstraintViolation { .. }
        | AgreementServiceError::NotActivated => StatusCode::UNPROCESSABLE_ENTITY,
        AgreementServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}
