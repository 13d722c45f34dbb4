//! Outbound ports to the remote collaborators: the agreement engine, the
//! scoring service, the disbursement executor, and the notification channel.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::contracts::{AgreementId, ClientId, Product, ProductRequest};

use super::domain::ClientProfile;

/// Client of the agreement engine.
#[async_trait]
pub trait AgreementGateway: Send + Sync {
    /// Enumerate the published product catalog, in declared order.
    async fn products(&self) -> Result<Vec<Product>, GatewayError>;
    async fn create_agreement(
        &self,
        client_id: &ClientId,
        product: ProductRequest,
    ) -> Result<AgreementId, GatewayError>;
}

/// Client of the external scoring service. The score is an opaque integer
/// signal; negative means reject.
#[async_trait]
pub trait ScoringGateway: Send + Sync {
    async fn score(
        &self,
        client_id: &ClientId,
        agreement_id: &AgreementId,
        salary: Decimal,
    ) -> Result<i32, GatewayError>;
}

/// Client of the disbursement executor.
#[async_trait]
pub trait DisbursementGateway: Send + Sync {
    async fn disburse(
        &self,
        agreement_id: &AgreementId,
        amount: Decimal,
    ) -> Result<(), GatewayError>;
}

/// Outbound client-facing messages. Best-effort: callers log failures and
/// never let them affect application state.
pub trait NotificationSender: Send + Sync {
    fn send_accepted(&self, client: &ClientProfile) -> Result<(), NotificationError>;
    fn send_rejected(&self, client: &ClientProfile) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The collaborator answered and refused the request.
    #[error("collaborator rejected the request: {0}")]
    Rejected(String),
    /// The collaborator could not be reached or answered garbage.
    #[error("collaborator transport failure: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport failure: {0}")]
    Transport(String),
}
