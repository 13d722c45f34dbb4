use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::agreements::domain::{
    Agreement, AgreementStatus, PaymentSchedule, ScheduleId, ScheduledPayment,
};
use crate::agreements::repository::{
    ActivationClaim, AgreementRepository, ProductCatalog, RepositoryError, ScheduleStore,
};
use crate::agreements::service::AgreementService;
use crate::contracts::{
    AgreementId, ClientId, CreateAgreementRequest, Product, ProductRequest,
};

pub(super) fn consumer_products() -> Vec<Product> {
    vec![
        Product {
            code: "CL1.0".to_string(),
            min_term: 6,
            max_term: 12,
            min_principal: dec!(10000),
            max_principal: dec!(200000),
            min_interest: dec!(1.0),
            max_interest: dec!(10.0),
            min_origination: dec!(1000),
            max_origination: dec!(10000),
        },
        Product {
            code: "CL2.0".to_string(),
            min_term: 12,
            max_term: 60,
            min_principal: dec!(150000),
            max_principal: dec!(2000000),
            min_interest: dec!(4.0),
            max_interest: dec!(16.0),
            min_origination: dec!(5000),
            max_origination: dec!(50000),
        },
    ]
}

pub(super) fn product_request() -> ProductRequest {
    ProductRequest {
        code: "CL1.0".to_string(),
        term_months: 12,
        interest_rate: dec!(1.0),
        origination_amount: dec!(1000),
        disbursement_amount: dec!(100000),
    }
}

pub(super) fn create_request() -> CreateAgreementRequest {
    CreateAgreementRequest {
        client_id: ClientId("cli-000001".to_string()),
        product: product_request(),
    }
}

pub(super) struct MemoryCatalog {
    products: Vec<Product>,
}

impl MemoryCatalog {
    pub(super) fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

impl ProductCatalog for MemoryCatalog {
    fn all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.clone())
    }

    fn by_code(&self, code: &str) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.iter().find(|p| p.code == code).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryAgreements {
    records: Mutex<HashMap<AgreementId, Agreement>>,
}

impl MemoryAgreements {
    pub(super) fn fetch_unchecked(&self, id: &AgreementId) -> Agreement {
        self.records
            .lock()
            .expect("agreement mutex poisoned")
            .get(id)
            .expect("agreement present")
            .clone()
    }
}

impl AgreementRepository for MemoryAgreements {
    fn insert(&self, agreement: Agreement) -> Result<Agreement, RepositoryError> {
        let mut guard = self.records.lock().expect("agreement mutex poisoned");
        if guard.contains_key(&agreement.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(agreement.id.clone(), agreement.clone());
        Ok(agreement)
    }

    fn fetch(&self, id: &AgreementId) -> Result<Option<Agreement>, RepositoryError> {
        let guard = self.records.lock().expect("agreement mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn by_client(&self, client_id: &ClientId) -> Result<Vec<Agreement>, RepositoryError> {
        let guard = self.records.lock().expect("agreement mutex poisoned");
        let mut agreements: Vec<_> = guard
            .values()
            .filter(|agreement| &agreement.client_id == client_id)
            .cloned()
            .collect();
        agreements.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(agreements)
    }

    fn claim_activation(
        &self,
        id: &AgreementId,
        disbursement_date: NaiveDate,
    ) -> Result<ActivationClaim, RepositoryError> {
        let mut guard = self.records.lock().expect("agreement mutex poisoned");
        let Some(agreement) = guard.get_mut(id) else {
            return Err(RepositoryError::NotFound);
        };
        if agreement.status != AgreementStatus::New {
            return Ok(ActivationClaim::Refused {
                current: agreement.status,
            });
        }
        agreement.status = AgreementStatus::Active;
        agreement.disbursement_date = Some(disbursement_date);
        Ok(ActivationClaim::Claimed(agreement.clone()))
    }

    fn set_next_payment_date(
        &self,
        id: &AgreementId,
        date: NaiveDate,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("agreement mutex poisoned");
        let agreement = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        agreement.next_payment_date = Some(date);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryScheduleStore {
    schedules: Mutex<HashMap<AgreementId, Vec<PaymentSchedule>>>,
    sequence: AtomicU64,
}

impl ScheduleStore for MemoryScheduleStore {
    fn append(
        &self,
        agreement_id: &AgreementId,
        payments: Vec<ScheduledPayment>,
    ) -> Result<PaymentSchedule, RepositoryError> {
        let mut guard = self.schedules.lock().expect("schedule mutex poisoned");
        let versions = guard.entry(agreement_id.clone()).or_default();
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let schedule = PaymentSchedule {
            id: ScheduleId(format!("sched-{id:06}")),
            agreement_id: agreement_id.clone(),
            version: versions.len() as u32 + 1,
            payments,
        };
        versions.push(schedule.clone());
        Ok(schedule)
    }

    fn current(
        &self,
        agreement_id: &AgreementId,
    ) -> Result<Option<PaymentSchedule>, RepositoryError> {
        let guard = self.schedules.lock().expect("schedule mutex poisoned");
        Ok(guard
            .get(agreement_id)
            .and_then(|versions| versions.last().cloned()))
    }
}

pub(super) struct Harness {
    pub(super) service: Arc<AgreementService<MemoryCatalog, MemoryAgreements, MemoryScheduleStore>>,
    pub(super) agreements: Arc<MemoryAgreements>,
    pub(super) schedules: Arc<MemoryScheduleStore>,
}

pub(super) fn harness() -> Harness {
    let catalog = Arc::new(MemoryCatalog::new(consumer_products()));
    let agreements = Arc::new(MemoryAgreements::default());
    let schedules = Arc::new(MemoryScheduleStore::default());
    let service = Arc::new(AgreementService::new(
        catalog,
        agreements.clone(),
        schedules.clone(),
    ));
    Harness {
        service,
        agreements,
        schedules,
    }
}
