use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use lendflow::contracts::ClientId;
use lendflow::origination::{
    Application, ApplicationId, ApplicationRepository, ApplicationStatus, ClientDirectory,
    ClientProfile, ClientRecord, NotificationError, NotificationSender, RepositoryError,
    TransitionOutcome,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryClientDirectory {
    records: Arc<Mutex<HashMap<String, ClientRecord>>>,
    sequence: AtomicU64,
}

impl ClientDirectory for InMemoryClientDirectory {
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
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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

/// Default notification adapter: a structured log line per message. The trait
/// seam admits an SMTP adapter without touching the service.
#[derive(Default)]
pub(crate) struct LoggingNotificationSender;

impl NotificationSender for LoggingNotificationSender {
    fn send_accepted(&self, client: &ClientProfile) -> Result<(), NotificationError> {
        info!(email = %client.email, "notifying client: loan application accepted");
        Ok(())
    }

    fn send_rejected(&self, client: &ClientProfile) -> Result<(), NotificationError> {
        info!(email = %client.email, "notifying client: loan application rejected");
        Ok(())
    }
}
