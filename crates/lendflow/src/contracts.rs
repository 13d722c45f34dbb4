//! Wire-level types shared between the origination side, the agreement engine,
//! and the external collaborators. Everything here crosses a service boundary,
//! so the shapes are serde-stable and money is carried as exact decimals.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a client in the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an agreement in the engine's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgreementId(pub String);

impl fmt::Display for AgreementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog template defining the allowable ranges for agreements cut from it.
///
/// Terms are months, interest is an annual percentage, and the amount bounds
/// are inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub min_term: u32,
    pub max_term: u32,
    pub min_principal: Decimal,
    pub max_principal: Decimal,
    pub min_interest: Decimal,
    pub max_interest: Decimal,
    pub min_origination: Decimal,
    pub max_origination: Decimal,
}

/// A concrete parameterization of a product, as requested from the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRequest {
    pub code: String,
    pub term_months: u32,
    pub interest_rate: Decimal,
    pub origination_amount: Decimal,
    pub disbursement_amount: Decimal,
}

impl ProductRequest {
    /// Principal financed by the agreement: what the client receives plus the
    /// origination fee rolled into the loan.
    pub fn principal_amount(&self) -> Decimal {
        self.origination_amount + self.disbursement_amount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAgreementRequest {
    pub client_id: ClientId,
    pub product: ProductRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAgreementResponse {
    pub agreement_id: AgreementId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivateAgreementRequest {
    pub disbursement_date: NaiveDate,
}

/// One repayment period as exposed over the wire, ordered by period number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPaymentView {
    pub period_number: u32,
    pub status: String,
    pub payment_date: NaiveDate,
    pub period_payment: Decimal,
    pub interest_payment: Decimal,
    pub principal_payment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleResponse {
    pub agreement_id: AgreementId,
    pub version: u32,
    pub payments: Vec<ScheduledPaymentView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAgreementsResponse {
    pub agreement_ids: Vec<AgreementId>,
}

/// Request shape the origination side sends to the external scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub client_id: ClientId,
    pub agreement_id: AgreementId,
    pub salary: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResponse {
    pub score: i32,
}

/// Request shape the origination side sends to the disbursement executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbursementRequest {
    pub agreement_id: AgreementId,
    pub amount: Decimal,
}
