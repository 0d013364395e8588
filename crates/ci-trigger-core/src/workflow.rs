//! Trigger-then-poll orchestration

use std::time::Duration;

use chrono::{
    DateTime,
    Utc,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::BuildService;
use crate::config::TriggerConfig;
use crate::error::{
    TriggerError,
    TriggerResult,
};
use crate::poller::{
    PollOutcome,
    Poller,
};
use crate::trigger;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub request_id: u64,
    pub outcome: PollOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: Duration,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }
}

/// Triggers a build and polls it to completion.
///
/// Trigger errors abort the run. Once a request id exists, only a status
/// check the provider rejects outright (bad token, unknown request) is an
/// error; every other ending is reported through [`PollOutcome`].
pub async fn run(
    config: &TriggerConfig, api: &dyn BuildService, cancel: CancellationToken,
) -> TriggerResult<RunReport> {
    let started_at = Utc::now();
    let clock = Instant::now();

    tracing::info!(
        repo = %format!("{}/{}", config.repo.owner, config.repo.name),
        branch = %config.branch,
        "Starting Travis build"
    );

    let request_id = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(TriggerError::Cancelled);
        }
        id = trigger::trigger_build(api, &config.branch) => id?,
    };

    let outcome = Poller::new(api, &config.poller, cancel)
        .poll(request_id)
        .await?;

    tracing::info!(request_id, %outcome, "Polling finished");

    Ok(RunReport {
        request_id,
        outcome,
        started_at,
        finished_at: Utc::now(),
        duration: clock.elapsed(),
    })
}

/// Loads configuration through `lookup`, builds the service with `make_api`
/// and runs the workflow. Configuration problems return before `make_api`
/// is called, so no request is ever sent with incomplete settings.
pub async fn run_from_lookup<L, M, S>(
    lookup: L, make_api: M, cancel: CancellationToken,
) -> TriggerResult<RunReport>
where
    L: Fn(&str) -> Option<String>,
    M: FnOnce(&TriggerConfig) -> TriggerResult<S>,
    S: BuildService,
{
    let config = TriggerConfig::from_lookup(lookup)?;
    let api = make_api(&config)?;
    run(&config, &api, cancel).await
}
