use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::contracts::{AgreementId, ClientId, CreateAgreementRequest, Product, ProductRequest};

use super::amortization::build_schedule;
use super::domain::{Agreement, AgreementStatus, PaymentSchedule, ScheduledPayment};
use super::repository::{
    ActivationClaim, AgreementRepository, ProductCatalog, RepositoryError, ScheduleStore,
};

/// Service composing the product catalog, agreement storage, and the
/// append-only schedule store.
pub struct AgreementService<P, A, S> {
    catalog: Arc<P>,
    agreements: Arc<A>,
    schedules: Arc<S>,
}

static AGREEMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_agreement_id() -> AgreementId {
    let id = AGREEMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AgreementId(format!("agr-{id:06}"))
}

impl<P, A, S> AgreementService<P, A, S>
where
    P: ProductCatalog + 'static,
    A: AgreementRepository + 'static,
    S: ScheduleStore + 'static,
{
    pub fn new(catalog: Arc<P>, agreements: Arc<A>, schedules: Arc<S>) -> Self {
        Self {
            catalog,
            agreements,
            schedules,
        }
    }

    /// Validate the requested parameterization against the product's
    /// published bounds and persist a new agreement in `NEW`.
    pub fn create_agreement(
        &self,
        request: CreateAgreementRequest,
    ) -> Result<AgreementId, AgreementServiceError> {
        let product = self
            .catalog
            .by_code(&request.product.code)?
            .ok_or_else(|| AgreementServiceError::UnknownProduct {
                code: request.product.code.clone(),
            })?;
        if !satisfies(&product, &request.product) {
            return Err(AgreementServiceError::ProductConstraintViolation {
                code: product.code,
            });
        }

        let agreement = Agreement {
            id: next_agreement_id(),
            client_id: request.client_id,
            product_code: product.code,
            term_months: request.product.term_months,
            interest_rate: request.product.interest_rate,
            principal_amount: request.product.principal_amount(),
            origination_amount: request.product.origination_amount,
            disbursement_amount: request.product.disbursement_amount,
            status: AgreementStatus::New,
            disbursement_date: None,
            next_payment_date: None,
        };
        let stored = self.agreements.insert(agreement)?;
        info!(agreement = %stored.id, product = %stored.product_code, "agreement created");
        Ok(stored.id)
    }

    /// Activate an agreement exactly once and compute its first schedule
    /// version. Returns the schedule ordered by period number.
    pub fn activate(
        &self,
        id: &AgreementId,
        disbursement_date: NaiveDate,
    ) -> Result<PaymentSchedule, AgreementServiceError> {
        let agreement = match self.agreements.claim_activation(id, disbursement_date) {
            Ok(ActivationClaim::Claimed(agreement)) => agreement,
            Ok(ActivationClaim::Refused { current }) => {
                return Err(AgreementServiceError::AlreadyActivated { current })
            }
            Err(RepositoryError::NotFound) => return Err(AgreementServiceError::NotFound),
            Err(other) => return Err(other.into()),
        };

        let today = Local::now().date_naive();
        let payments = build_schedule(&agreement, disbursement_date, today);
        let schedule = self.schedules.append(id, payments)?;
        if let Some(first) = schedule.payments.first() {
            self.agreements
                .set_next_payment_date(id, first.payment_date)?;
        }
        info!(agreement = %id, version = schedule.version, "agreement activated");
        Ok(schedule)
    }

    /// The persisted schedule at its highest version.
    pub fn payment_schedule(
        &self,
        id: &AgreementId,
    ) -> Result<PaymentSchedule, AgreementServiceError> {
        let agreement = self
            .agreements
            .fetch(id)?
            .ok_or(AgreementServiceError::NotFound)?;
        self.schedules
            .current(&agreement.id)?
            .ok_or(AgreementServiceError::NotActivated)
    }

    /// A throwaway schedule computed with "today" standing in for the
    /// disbursement date. Never persisted; works for any status.
    pub fn approximated_schedule(
        &self,
        id: &AgreementId,
    ) -> Result<Vec<ScheduledPayment>, AgreementServiceError> {
        let agreement = self
            .agreements
            .fetch(id)?
            .ok_or(AgreementServiceError::NotFound)?;
        let today = Local::now().date_naive();
        Ok(build_schedule(&agreement, today, today))
    }

    /// Every agreement id ever created for the client, no status filter.
    pub fn agreements_for_client(
        &self,
        client_id: &ClientId,
    ) -> Result<Vec<AgreementId>, AgreementServiceError> {
        Ok(self
            .agreements
            .by_client(client_id)?
            .into_iter()
            .map(|agreement| agreement.id)
            .collect())
    }

    pub fn products(&self) -> Result<Vec<Product>, AgreementServiceError> {
        Ok(self.catalog.all()?)
    }
}

/// All bounds are inclusive on both ends.
fn satisfies(product: &Product, request: &ProductRequest) -> bool {
    let principal = request.principal_amount();
    product.min_term <= request.term_months
        && request.term_months <= product.max_term
        && product.min_principal <= principal
        && principal <= product.max_principal
        && product.min_interest <= request.interest_rate
        && request.interest_rate <= product.max_interest
        && product.min_origination <= request.origination_amount
        && request.origination_amount <= product.max_origination
}

/// Error raised by the agreement service.
#[derive(Debug, thiserror::Error)]
pub enum AgreementServiceError {
    #[error("agreement not found")]
    NotFound,
    #[error("unknown product code ({code})")]
    UnknownProduct { code: String },
    #[error("requested parameters violate the bounds published for product {code}")]
    ProductConstraintViolation { code: String },
    #[error("agreement has already been activated (status {current:?})")]
    AlreadyActivated { current: AgreementStatus },
    #[error("agreement has no payment schedule yet")]
    NotActivated,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
