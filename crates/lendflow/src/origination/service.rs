use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, ClientProfile, ClientRecord,
};
use super::gateways::{
    AgreementGateway, DisbursementGateway, GatewayError, NotificationSender, ScoringGateway,
};
use super::repository::{
    ApplicationRepository, ClientDirectory, RepositoryError, TransitionOutcome,
};
use super::selection::select_product;

/// Service composing the identity directory, application storage, and the
/// remote collaborator gateways.
pub struct ApplicationService<D, R> {
    directory: Arc<D>,
    repository: Arc<R>,
    agreements: Arc<dyn AgreementGateway>,
    scoring: Arc<dyn ScoringGateway>,
    disbursement: Arc<dyn DisbursementGateway>,
    notifications: Arc<dyn NotificationSender>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

const CANCELLABLE: &[ApplicationStatus] = &[ApplicationStatus::New, ApplicationStatus::Scoring];

impl<D, R> ApplicationService<D, R>
where
    D: ClientDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    pub fn new(
        directory: Arc<D>,
        repository: Arc<R>,
        agreements: Arc<dyn AgreementGateway>,
        scoring: Arc<dyn ScoringGateway>,
        disbursement: Arc<dyn DisbursementGateway>,
        notifications: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            directory,
            repository,
            agreements,
            scoring,
            disbursement,
            notifications,
        }
    }

    /// Create a loan application: resolve the client, pick a product, open an
    /// agreement on the engine, and persist the application in `NEW`.
    pub async fn create(
        &self,
        profile: ClientProfile,
        disbursement_amount: Decimal,
    ) -> Result<ApplicationId, ApplicationServiceError> {
        let client = self.resolve_client(profile)?;

        let products = self.agreements.products().await?;
        let Some(request) = select_product(&products, disbursement_amount) else {
            self.notify_rejected(&client.profile);
            return Err(ApplicationServiceError::NoMatchingProduct);
        };

        let agreement_id = self
            .agreements
            .create_agreement(&client.id, request)
            .await?;

        let application = Application {
            id: next_application_id(),
            client_id: client.id,
            agreement_id,
            disbursement_amount,
            status: ApplicationStatus::New,
        };
        let stored = self.repository.insert(application)?;
        info!(application = %stored.id, agreement = %stored.agreement_id, "application created");
        Ok(stored.id)
    }

    fn resolve_client(
        &self,
        profile: ClientProfile,
    ) -> Result<ClientRecord, ApplicationServiceError> {
        match self.directory.find_by_email(&profile.email)? {
            Some(existing) if existing.profile == profile => Ok(existing),
            Some(_) => Err(ApplicationServiceError::IdentityConflict),
            None => Ok(self.directory.insert(profile)?),
        }
    }

    /// Cancel an application. Allowed only while the status is still `NEW` or
    /// `SCORING`; the compare-and-set means a cancel issued mid-evaluation
    /// wins over the in-flight scoring result.
    pub fn cancel(&self, id: &ApplicationId) -> Result<(), ApplicationServiceError> {
        match self
            .repository
            .transition(id, CANCELLABLE, ApplicationStatus::Cancelled)
        {
            Ok(TransitionOutcome::Applied(_)) => {
                info!(application = %id, "application cancelled");
                Ok(())
            }
            Ok(TransitionOutcome::Refused { current }) => {
                Err(ApplicationServiceError::InvalidTransition { current })
            }
            Err(RepositoryError::NotFound) => Err(ApplicationServiceError::NotFound),
            Err(other) => Err(other.into()),
        }
    }

    /// Fetch an application for API status responses.
    pub fn get(&self, id: &ApplicationId) -> Result<Application, ApplicationServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(ApplicationServiceError::NotFound)
    }

    /// One evaluation sweep tick: claim every `NEW` application and drive it
    /// through scoring. Overlapping ticks are safe, the `NEW -> SCORING`
    /// compare-and-set hands each application to exactly one claimant.
    pub async fn evaluate_pending(&self) -> Result<(), ApplicationServiceError> {
        for id in self.repository.ready_for_scoring()? {
            let application = match self.repository.transition(
                &id,
                &[ApplicationStatus::New],
                ApplicationStatus::Scoring,
            ) {
                Ok(TransitionOutcome::Applied(application)) => application,
                Ok(TransitionOutcome::Refused { .. }) | Err(RepositoryError::NotFound) => continue,
                Err(other) => return Err(other.into()),
            };
            self.evaluate(application).await?;
        }
        Ok(())
    }

    async fn evaluate(&self, application: Application) -> Result<(), ApplicationServiceError> {
        let Some(client) = self.directory.fetch(&application.client_id)? else {
            error!(application = %application.id, "owning client record missing, rejecting");
            self.commit(&application.id, ApplicationStatus::Rejected)?;
            return Ok(());
        };

        let score = match self
            .scoring
            .score(&client.id, &application.agreement_id, client.profile.salary)
            .await
        {
            Ok(score) => score,
            Err(err) => {
                // Internal failure, not a business rejection: no notification.
                warn!(application = %application.id, error = %err, "scoring call failed");
                self.commit(&application.id, ApplicationStatus::Rejected)?;
                return Ok(());
            }
        };

        if score < 0 {
            if self.commit(&application.id, ApplicationStatus::Rejected)? {
                info!(application = %application.id, score, "application rejected by scoring");
                self.notify_rejected(&client.profile);
            }
            return Ok(());
        }

        // Re-check after the suspension point: a concurrent cancel must win
        // and the scoring result is then discarded without side effects.
        if !self.commit(&application.id, ApplicationStatus::Accepted)? {
            return Ok(());
        }
        info!(application = %application.id, score, "application accepted");
        self.notify_accepted(&client.profile);

        match self
            .disbursement
            .disburse(&application.agreement_id, application.disbursement_amount)
            .await
        {
            Ok(()) => {
                self.repository.transition(
                    &application.id,
                    &[ApplicationStatus::Accepted],
                    ApplicationStatus::Active,
                )?;
                info!(application = %application.id, "application active");
            }
            Err(err) => {
                error!(application = %application.id, error = %err, "disbursement call failed, agreement not activated");
            }
        }
        Ok(())
    }

    /// Commit a post-scoring outcome. Returns false when the application left
    /// `SCORING` in the meantime (i.e. was cancelled) and the result must be
    /// dropped.
    fn commit(
        &self,
        id: &ApplicationId,
        next: ApplicationStatus,
    ) -> Result<bool, ApplicationServiceError> {
        match self
            .repository
            .transition(id, &[ApplicationStatus::Scoring], next)?
        {
            TransitionOutcome::Applied(_) => Ok(true),
            TransitionOutcome::Refused { current } => {
                info!(application = %id, current = current.label(), "scoring result discarded");
                Ok(false)
            }
        }
    }

    fn notify_accepted(&self, client: &ClientProfile) {
        if let Err(err) = self.notifications.send_accepted(client) {
            warn!(email = %client.email, error = %err, "acceptance notification failed");
        }
    }

    fn notify_rejected(&self, client: &ClientProfile) {
        if let Err(err) = self.notifications.send_rejected(client) {
            warn!(email = %client.email, error = %err, "rejection notification failed");
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("application not found")]
    NotFound,
    #[error("application in status {current:?} cannot be cancelled")]
    InvalidTransition { current: ApplicationStatus },
    #[error("existing client record does not match the supplied identity data")]
    IdentityConflict,
    #[error("no product satisfies the requested disbursement amount")]
    NoMatchingProduct,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
