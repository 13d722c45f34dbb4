//! Application lifecycle: intake, recurring evaluation, cancellation.
//!
//! An application is created in `NEW`, picked up by the evaluation sweep,
//! scored through the external scoring collaborator, and either rejected,
//! accepted-then-activated, or cancelled by the client. Cancellation remains
//! effective throughout evaluation: every status commit is a compare-and-set
//! so an in-flight scoring result can never overwrite a cancel.

pub mod domain;
pub mod gateways;
pub mod repository;
pub mod router;
pub mod selection;
pub mod service;
pub mod sweep;

#[cfg(test)]
mod tests;

pub use domain::{Application, ApplicationId, ApplicationStatus, ClientProfile, ClientRecord};
pub use gateways::{
    AgreementGateway, DisbursementGateway, GatewayError, NotificationError, NotificationSender,
    ScoringGateway,
};
pub use repository::{
    ApplicationRepository, ClientDirectory, RepositoryError, TransitionOutcome,
};
pub use router::application_router;
pub use selection::select_product;
pub use service::{ApplicationService, ApplicationServiceError};
pub use sweep::run_sweep;
