use chrono::NaiveDate;

use crate::contracts::{AgreementId, ClientId, Product};

use super::domain::{Agreement, AgreementStatus, PaymentSchedule, ScheduledPayment};

/// Read-only view of the product catalog (owned by an external collaborator).
/// `all` preserves the catalog's declared order — product selection on the
/// origination side depends on it.
pub trait ProductCatalog: Send + Sync {
    fn all(&self) -> Result<Vec<Product>, RepositoryError>;
    fn by_code(&self, code: &str) -> Result<Option<Product>, RepositoryError>;
}

/// Agreement storage port.
///
/// `claim_activation` is the activation gate: a compare-and-set from `NEW` to
/// `ACTIVE` that also stamps the disbursement date, so an agreement can be
/// activated exactly once no matter how many callers race.
pub trait AgreementRepository: Send + Sync {
    fn insert(&self, agreement: Agreement) -> Result<Agreement, RepositoryError>;
    fn fetch(&self, id: &AgreementId) -> Result<Option<Agreement>, RepositoryError>;
    /// Every agreement ever created for the client, regardless of status.
    fn by_client(&self, client_id: &ClientId) -> Result<Vec<Agreement>, RepositoryError>;
    fn claim_activation(
        &self,
        id: &AgreementId,
        disbursement_date: NaiveDate,
    ) -> Result<ActivationClaim, RepositoryError>;
    fn set_next_payment_date(
        &self,
        id: &AgreementId,
        date: NaiveDate,
    ) -> Result<(), RepositoryError>;
}

/// Result of an activation compare-and-set.
#[derive(Debug, Clone)]
pub enum ActivationClaim {
    /// The agreement was `NEW`; it is now `ACTIVE` with the disbursement date
    /// set. Carries the updated row.
    Claimed(Agreement),
    /// The agreement had already left `NEW`; nothing was changed.
    Refused { current: AgreementStatus },
}

/// Append-only store for versioned schedules. `append` allocates the next
/// version for the agreement under the store's own lock; persisted versions
/// are never mutated.
pub trait ScheduleStore: Send + Sync {
    fn append(
        &self,
        agreement_id: &AgreementId,
        payments: Vec<ScheduledPayment>,
    ) -> Result<PaymentSchedule, RepositoryError>;
    /// Highest persisted version for the agreement, if any.
    fn current(&self, agreement_id: &AgreementId) -> Result<Option<PaymentSchedule>, RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
