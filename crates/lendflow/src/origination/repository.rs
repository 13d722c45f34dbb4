use crate::contracts::ClientId;

use super::domain::{Application, ApplicationId, ApplicationStatus, ClientProfile, ClientRecord};

/// Identity directory port. Resolution logic (strict-field validation) lives
/// in the service; the directory only stores and looks up records.
pub trait ClientDirectory: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<ClientRecord>, RepositoryError>;
    fn insert(&self, profile: ClientProfile) -> Result<ClientRecord, RepositoryError>;
    fn fetch(&self, id: &ClientId) -> Result<Option<ClientRecord>, RepositoryError>;
}

/// Application storage port.
///
/// `transition` is the single-writer gate for the whole lifecycle: it compares
/// the stored status against `expected` and applies `next` atomically. Every
/// writer (sweep claim, post-scoring commit, cancellation) goes through it, so
/// two sweep ticks can never both claim an application and a cancel can never
/// be overwritten by a late scoring result.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// Ids of applications currently in `NEW`, in stable order.
    fn ready_for_scoring(&self) -> Result<Vec<ApplicationId>, RepositoryError>;
    fn transition(
        &self,
        id: &ApplicationId,
        expected: &[ApplicationStatus],
        next: ApplicationStatus,
    ) -> Result<TransitionOutcome, RepositoryError>;
}

/// Result of a compare-and-set status transition.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The expected status held; `next` was applied. Carries the updated row.
    Applied(Application),
    /// Another writer got there first; nothing was changed.
    Refused { current: ApplicationStatus },
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
