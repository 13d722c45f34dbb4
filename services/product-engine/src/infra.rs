use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal_macros::dec;

use lendflow::agreements::{
    ActivationClaim, Agreement, AgreementRepository, AgreementStatus, PaymentSchedule,
    ProductCatalog, RepositoryError, ScheduleId, ScheduleStore, ScheduledPayment,
};
use lendflow::contracts::{AgreementId, ClientId, Product};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Catalog backed by a declared-order product list. Selection on the
/// origination side is first-match, so the order here is part of the contract.
pub(crate) struct InMemoryProductCatalog {
    products: Vec<Product>,
}

impl InMemoryProductCatalog {
    pub(crate) fn seeded() -> Self {
        Self {
            products: vec![
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
            ],
        }
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.clone())
    }

    fn by_code(&self, code: &str) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .products
            .iter()
            .find(|product| product.code == code)
            .cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryAgreementRepository {
    records: Arc<Mutex<HashMap<AgreementId, Agreement>>>,
}

impl AgreementRepository for InMemoryAgreementRepository {
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

/// Append-only schedule store. Versions are allocated under the store lock so
/// they stay dense per agreement.
#[derive(Default)]
pub(crate) struct InMemoryScheduleStore {
    schedules: Arc<Mutex<HashMap<AgreementId, Vec<PaymentSchedule>>>>,
    sequence: AtomicU64,
}

impl ScheduleStore for InMemoryScheduleStore {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalog_preserves_declared_order() {
        let catalog = InMemoryProductCatalog::seeded();
        let codes: Vec<_> = catalog
            .all()
            .expect("catalog readable")
            .into_iter()
            .map(|product| product.code)
            .collect();
        assert_eq!(codes, vec!["CL1.0".to_string(), "CL2.0".to_string()]);
        assert!(catalog.by_code("CL2.0").expect("lookup").is_some());
        assert!(catalog.by_code("CL9.9").expect("lookup").is_none());
    }

    #[test]
    fn schedule_versions_grow_densely_per_agreement() {
        let store = InMemoryScheduleStore::default();
        let agreement = AgreementId("agr-000001".to_string());

        let first = store.append(&agreement, Vec::new()).expect("append");
        let second = store.append(&agreement, Vec::new()).expect("append");
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);

        let current = store
            .current(&agreement)
            .expect("store readable")
            .expect("schedule present");
        assert_eq!(current.version, 2, "current is the highest version");

        let other = AgreementId("agr-000002".to_string());
        let fresh = store.append(&other, Vec::new()).expect("append");
        assert_eq!(fresh.version, 1, "versions are per agreement");
    }

    #[test]
    fn activation_claim_is_single_shot() {
        let repository = InMemoryAgreementRepository::default();
        let agreement = Agreement {
            id: AgreementId("agr-000001".to_string()),
            client_id: ClientId("cli-000001".to_string()),
            product_code: "CL1.0".to_string(),
            term_months: 12,
            interest_rate: dec!(1.0),
            principal_amount: dec!(101000),
            origination_amount: dec!(1000),
            disbursement_amount: dec!(100000),
            status: AgreementStatus::New,
            disbursement_date: None,
            next_payment_date: None,
        };
        repository.insert(agreement.clone()).expect("inserted");

        let date = NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date");
        match repository
            .claim_activation(&agreement.id, date)
            .expect("claim")
        {
            ActivationClaim::Claimed(claimed) => {
                assert_eq!(claimed.status, AgreementStatus::Active);
                assert_eq!(claimed.disbursement_date, Some(date));
            }
            other => panic!("expected claim, got {other:?}"),
        }

        match repository
            .claim_activation(&agreement.id, date)
            .expect("claim")
        {
            ActivationClaim::Refused { current } => assert_eq!(current, AgreementStatus::Active),
            other => panic!("expected refusal, got {other:?}"),
        }
    }
}
