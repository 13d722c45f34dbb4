use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::contracts::AgreementId;

use super::domain::{Application, ApplicationId, ClientProfile};
use super::gateways::GatewayError;
use super::repository::{ApplicationRepository, ClientDirectory};
use super::service::{ApplicationService, ApplicationServiceError};

/// Router builder exposing the application lifecycle endpoints.
pub fn application_router<D, R>(service: Arc<ApplicationService<D, R>>) -> Router
where
    D: ClientDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(create_handler::<D, R>))
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<D, R>),
        )
        .route(
            "/api/v1/applications/:application_id/cancel",
            post(cancel_handler::<D, R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub salary: Decimal,
    pub disbursement_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CreateApplicationResponse {
    pub application_id: ApplicationId,
}

/// Sanitized representation of an application's exposed state.
#[derive(Debug, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub agreement_id: AgreementId,
    pub status: &'static str,
    pub disbursement_amount: Decimal,
}

impl ApplicationStatusView {
    fn from_application(application: Application) -> Self {
        Self {
            application_id: application.id,
            agreement_id: application.agreement_id,
            status: application.status.label(),
            disbursement_amount: application.disbursement_amount,
        }
    }
}

pub(crate) async fn create_handler<D, R>(
    State(service): State<Arc<ApplicationService<D, R>>>,
    axum::Json(request): axum::Json<CreateApplicationRequest>,
) -> Response
where
    D: ClientDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let CreateApplicationRequest {
        first_name,
        last_name,
        email,
        salary,
        disbursement_amount,
    } = request;
    let profile = ClientProfile {
        first_name,
        last_name,
        email,
        salary,
    };

    match service.create(profile, disbursement_amount).await {
        Ok(application_id) => (
            StatusCode::CREATED,
            axum::Json(CreateApplicationResponse { application_id }),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<D, R>(
    State(service): State<Arc<ApplicationService<D, R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    D: ClientDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(application) => (
            StatusCode::OK,
            axum::Json(ApplicationStatusView::from_application(application)),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<D, R>(
    State(service): State<Arc<ApplicationService<D, R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    D: ClientDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.cancel(&id) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "application_id": id.0, "status": "CANCELLED" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::NotFound => StatusCode::NOT_FOUND,
        ApplicationServiceError::InvalidTransition { .. }
        | ApplicationServiceError::IdentityConflict
        | ApplicationServiceError::NoMatchingProduct
        | ApplicationServiceError::Gateway(GatewayError::Rejected(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ApplicationServiceError::Gateway(GatewayError::Transport(_)) => StatusCode::BAD_GATEWAY,
        ApplicationServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}
