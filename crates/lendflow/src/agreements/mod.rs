//! Agreement ledger and amortization engine.
//!
//! Agreements are cut from catalog products, persisted in `NEW`, and activated
//! exactly once; activation stamps the disbursement date and computes the
//! first (and, under current flows, only) version of the repayment schedule.
//! Schedules are versioned and immutable — a future re-activation flow would
//! append a new version, never rewrite one.

pub mod amortization;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use amortization::build_schedule;
pub use domain::{
    Agreement, AgreementStatus, PaymentSchedule, PaymentStatus, ScheduleId, ScheduledPayment,
};
pub use repository::{
    ActivationClaim, AgreementRepository, ProductCatalog, RepositoryError, ScheduleStore,
};
pub use router::agreement_router;
pub use service::{AgreementService, AgreementServiceError};
