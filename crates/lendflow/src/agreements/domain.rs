use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::contracts::{AgreementId, ClientId, ScheduledPaymentView};

/// Lifecycle status of an agreement. `Closed` is reserved for settlement
/// flows that do not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgreementStatus {
    New,
    Active,
    Closed,
}

impl AgreementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AgreementStatus::New => "NEW",
            AgreementStatus::Active => "ACTIVE",
            AgreementStatus::Closed => "CLOSED",
        }
    }
}

/// One loan contract instance with fixed term, rate, and principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: AgreementId,
    pub client_id: ClientId,
    pub product_code: String,
    pub term_months: u32,
    /// Annual interest, percent.
    pub interest_rate: Decimal,
    /// Origination plus disbursement; what the annuity amortizes to zero.
    pub principal_amount: Decimal,
    pub origination_amount: Decimal,
    pub disbursement_amount: Decimal,
    pub status: AgreementStatus,
    pub disbursement_date: Option<NaiveDate>,
    pub next_payment_date: Option<NaiveDate>,
}

/// Repayment-period status, fixed at schedule generation time from the
/// payment date ("strictly in the past" means overdue). `Paid` is reserved
/// for future settlement tracking; nothing sets it today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Future,
    Overdue,
    Paid,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Future => "FUTURE",
            PaymentStatus::Overdue => "OVERDUE",
            PaymentStatus::Paid => "PAID",
        }
    }
}

/// One repayment installment. Periods are numbered 1..=term with no gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub period_number: u32,
    pub status: PaymentStatus,
    pub payment_date: NaiveDate,
    pub period_payment: Decimal,
    pub interest_payment: Decimal,
    pub principal_payment: Decimal,
}

impl ScheduledPayment {
    pub fn view(&self) -> ScheduledPaymentView {
        ScheduledPaymentView {
            period_number: self.period_number,
            status: self.status.label().to_string(),
            payment_date: self.payment_date,
            period_payment: self.period_payment,
            interest_payment: self.interest_payment,
            principal_payment: self.principal_payment,
        }
    }
}

/// Identifier wrapper for persisted schedules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub String);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A versioned, immutable repayment schedule. Versions start at 1 and only
/// grow; "the schedule" of an agreement is the highest version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub id: ScheduleId,
    pub agreement_id: AgreementId,
    pub version: u32,
    pub payments: Vec<ScheduledPayment>,
}

impl PaymentSchedule {
    pub fn response(&self) -> crate::contracts::PaymentScheduleResponse {
        crate::contracts::PaymentScheduleResponse {
            agreement_id: self.agreement_id.clone(),
            version: self.version,
            payments: self.payments.iter().map(ScheduledPayment::view).collect(),
        }
    }
}
