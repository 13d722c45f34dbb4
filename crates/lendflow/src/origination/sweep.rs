use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::error;

use super::repository::{ApplicationRepository, ClientDirectory};
use super::service::ApplicationService;

/// Recurring evaluation worker: every `interval`, advance all pending
/// applications through scoring.
///
/// The loop itself carries no exclusivity guarantees; the repository's
/// `NEW -> SCORING` compare-and-set is what keeps a slow tick from racing a
/// fast one over the same application.
pub async fn run_sweep<D, R>(service: Arc<ApplicationService<D, R>>, interval: Duration)
where
    D: ClientDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = service.evaluate_pending().await {
            error!(error = %err, "evaluation sweep tick failed");
        }
    }
}
