use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::contracts::{AgreementId, ClientId};

/// Identity data presented at intake. Email is the natural dedup key; every
/// later submission under the same email must match the other fields exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub salary: Decimal,
}

/// A client as stored in the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub profile: ClientProfile,
}

/// Identifier wrapper for loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a loan application.
///
/// `Accepted`, `Active`, `Rejected`, and `Cancelled` are terminal as far as
/// the controller is concerned; only `New` and `Scoring` admit cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    New,
    Scoring,
    Accepted,
    Rejected,
    Active,
    Cancelled,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::New => "NEW",
            ApplicationStatus::Scoring => "SCORING",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Active => "ACTIVE",
            ApplicationStatus::Cancelled => "CANCELLED",
        }
    }

    /// Cancellation is a one-way gate: once terms are locked in or the
    /// application is resolved, it can no longer be cancelled.
    pub const fn is_cancellable(self) -> bool {
        matches!(self, ApplicationStatus::New | ApplicationStatus::Scoring)
    }
}

/// One loan request, owned exclusively by the origination side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub client_id: ClientId,
    pub agreement_id: AgreementId,
    pub disbursement_amount: Decimal,
    pub status: ApplicationStatus,
}
