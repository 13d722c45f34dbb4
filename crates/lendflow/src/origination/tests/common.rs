use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::contracts::{AgreementId, ClientId, Product, ProductRequest};
use crate::origination::domain::{
    Application, ApplicationId, ApplicationStatus, ClientProfile, ClientRecord,
};
use crate::origination::gateways::{
    AgreementGateway, DisbursementGateway, GatewayError, NotificationError, NotificationSender,
    ScoringGateway,
};
use crate::origination::repository::{
    ApplicationRepository, ClientDirectory, RepositoryError, TransitionOutcome,
};
use crate::origination::service::ApplicationService;

pub(super) fn client_profile() -> ClientProfile {
    ClientProfile {
        first_name: "Avery".to_string(),
        last_name: "Nolan".to_string(),
        email: "a@x.com".to_string(),
        salary: dec!(40000),
    }
}

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

#[derive(Default)]
pub(super) struct MemoryDirectory {
    records: Mutex<HashMap<String, ClientRecord>>,
    sequence: AtomicU64,
}

impl MemoryDirectory {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("directory mutex poisoned").len()
    }
}

impl ClientDirectory for MemoryDirectory {
    fn find_by_email(&self, email: &str) -> Result<Option<ClientRecord>, RepositoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(email).cloned())
    }

    fn insert(&self, profile: ClientProfile) -> Result<ClientRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        if guard.contains_key(&profile.email) {
            return Err(RepositoryError::Conflict);
        }
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let record = ClientRecord {
            id: ClientId(format!("cli-{id:06}")),
            profile,
        };
        guard.insert(record.profile.email.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ClientId) -> Result<Option<ClientRecord>, RepositoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.values().find(|record| &record.id == id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<HashMap<ApplicationId, Application>>,
}

impl MemoryApplications {
    pub(super) fn status_of(&self, id: &ApplicationId) -> ApplicationStatus {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .expect("application present")
            .status
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn ready_for_scoring(&self) -> Result<Vec<ApplicationId>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut ids: Vec<_> = guard
            .values()
            .filter(|application| application.status == ApplicationStatus::New)
            .map(|application| application.id.clone())
            .collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(ids)
    }

    fn transition(
        &self,
        id: &ApplicationId,
        expected: &[ApplicationStatus],
        next: ApplicationStatus,
    ) -> Result<TransitionOutcome, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let Some(application) = guard.get_mut(id) else {
            return Err(RepositoryError::NotFound);
        };
        if expected.contains(&application.status) {
            application.status = next;
            Ok(TransitionOutcome::Applied(application.clone()))
        } else {
            Ok(TransitionOutcome::Refused {
                current: application.status,
            })
        }
    }
}

pub(super) struct StubAgreementGateway {
    products: Vec<Product>,
    pub(super) created: Mutex<Vec<(ClientId, ProductRequest)>>,
    sequence: AtomicU64,
}

impl StubAgreementGateway {
    pub(super) fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            created: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
        }
    }

    pub(super) fn created_requests(&self) -> Vec<(ClientId, ProductRequest)> {
        self.created.lock().expect("gateway mutex poisoned").clone()
    }
}

#[async_trait]
impl AgreementGateway for StubAgreementGateway {
    async fn products(&self) -> Result<Vec<Product>, GatewayError> {
        Ok(self.products.clone())
    }

    async fn create_agreement(
        &self,
        client_id: &ClientId,
        product: ProductRequest,
    ) -> Result<AgreementId, GatewayError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        self.created
            .lock()
            .expect("gateway mutex poisoned")
            .push((client_id.clone(), product));
        Ok(AgreementId(format!("agr-{id:06}")))
    }
}

pub(super) enum ScoreBehavior {
    Score(i32),
    Fail,
}

pub(super) struct ScriptedScoring {
    behavior: Mutex<ScoreBehavior>,
    pub(super) calls: AtomicUsize,
}

impl ScriptedScoring {
    pub(super) fn new(behavior: ScoreBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ScoringGateway for ScriptedScoring {
    async fn score(
        &self,
        _client_id: &ClientId,
        _agreement_id: &AgreementId,
        _salary: Decimal,
    ) -> Result<i32, GatewayError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match &*self.behavior.lock().expect("scoring mutex poisoned") {
            ScoreBehavior::Score(score) => Ok(*score),
            ScoreBehavior::Fail => Err(GatewayError::Transport("scoring offline".to_string())),
        }
    }
}

/// Simulates a client cancelling while the scoring call is still in flight:
/// the cancel lands before the (positive) score is returned to the sweep.
pub(super) struct CancellingScoring {
    pub(super) repository: Arc<MemoryApplications>,
    pub(super) target: Mutex<Option<ApplicationId>>,
    pub(super) score: i32,
}

#[async_trait]
impl ScoringGateway for CancellingScoring {
    async fn score(
        &self,
        _client_id: &ClientId,
        _agreement_id: &AgreementId,
        _salary: Decimal,
    ) -> Result<i32, GatewayError> {
        if let Some(id) = self.target.lock().expect("target mutex poisoned").clone() {
            self.repository
                .transition(
                    &id,
                    &[ApplicationStatus::New, ApplicationStatus::Scoring],
                    ApplicationStatus::Cancelled,
                )
                .expect("cancel transition");
        }
        Ok(self.score)
    }
}

#[derive(Default)]
pub(super) struct RecordingDisbursement {
    pub(super) calls: Mutex<Vec<(AgreementId, Decimal)>>,
    pub(super) fail: AtomicBool,
}

impl RecordingDisbursement {
    pub(super) fn recorded(&self) -> Vec<(AgreementId, Decimal)> {
        self.calls.lock().expect("disbursement mutex poisoned").clone()
    }
}

#[async_trait]
impl DisbursementGateway for RecordingDisbursement {
    async fn disburse(
        &self,
        agreement_id: &AgreementId,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(GatewayError::Transport(
                "disbursement executor offline".to_string(),
            ));
        }
        self.calls
            .lock()
            .expect("disbursement mutex poisoned")
            .push((agreement_id.clone(), amount));
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifications {
    pub(super) accepted: Mutex<Vec<String>>,
    pub(super) rejected: Mutex<Vec<String>>,
    pub(super) fail: AtomicBool,
}

impl RecordingNotifications {
    pub(super) fn accepted_emails(&self) -> Vec<String> {
        self.accepted.lock().expect("notification mutex poisoned").clone()
    }

    pub(super) fn rejected_emails(&self) -> Vec<String> {
        self.rejected.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationSender for RecordingNotifications {
    fn send_accepted(&self, client: &ClientProfile) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(NotificationError::Transport("mail relay down".to_string()));
        }
        self.accepted
            .lock()
            .expect("notification mutex poisoned")
            .push(client.email.clone());
        Ok(())
    }

    fn send_rejected(&self, client: &ClientProfile) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(NotificationError::Transport("mail relay down".to_string()));
        }
        self.rejected
            .lock()
            .expect("notification mutex poisoned")
            .push(client.email.clone());
        Ok(())
    }
}

pub(super) struct Harness {
    pub(super) service: Arc<ApplicationService<MemoryDirectory, MemoryApplications>>,
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) repository: Arc<MemoryApplications>,
    pub(super) agreements: Arc<StubAgreementGateway>,
    pub(super) scoring: Arc<ScriptedScoring>,
    pub(super) disbursement: Arc<RecordingDisbursement>,
    pub(super) notifications: Arc<RecordingNotifications>,
}

pub(super) fn harness() -> Harness {
    harness_with_score(ScoreBehavior::Score(10))
}

pub(super) fn harness_with_score(behavior: ScoreBehavior) -> Harness {
    let directory = Arc::new(MemoryDirectory::default());
    let repository = Arc::new(MemoryApplications::default());
    let agreements = Arc::new(StubAgreementGateway::new(consumer_products()));
    let scoring = Arc::new(ScriptedScoring::new(behavior));
    let disbursement = Arc::new(RecordingDisbursement::default());
    let notifications = Arc::new(RecordingNotifications::default());
    let service = Arc::new(ApplicationService::new(
        directory.clone(),
        repository.clone(),
        agreements.clone(),
        scoring.clone(),
        disbursement.clone(),
        notifications.clone(),
    ));
    Harness {
        service,
        directory,
        repository,
        agreements,
        scoring,
        disbursement,
        notifications,
    }
}
