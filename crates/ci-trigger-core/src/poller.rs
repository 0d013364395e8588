//! Polls a build request until its latest build reaches a terminal state

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::client::BuildService;
use crate::config::PollerConfig;
use crate::error::TriggerResult;
use crate::mapper::{
    self,
    Verdict,
};

/// How a poll loop ended. None of these are errors: a failed build or an
/// exhausted budget is a legitimate negative result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Passed {
        build_id: u64,
        attempts: u32,
    },
    Failed {
        build_id: u64,
        state: String,
        attempts: u32,
    },
    Exhausted {
        attempts: u32,
        last_state: Option<String>,
        last_error: Option<String>,
    },
    Cancelled {
        attempts: u32,
    },
}

impl PollOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, PollOutcome::Passed { .. })
    }

    /// Number of status checks that completed
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Passed { attempts, .. }
            | PollOutcome::Failed { attempts, .. }
            | PollOutcome::Exhausted { attempts, .. }
            | PollOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollOutcome::Passed { build_id, .. } => write!(f, "build {build_id} passed"),
            PollOutcome::Failed {
                build_id, state, ..
            } => write!(f, "build {build_id} finished as {state}"),
            PollOutcome::Exhausted {
                attempts,
                last_state,
                ..
            } => match last_state {
                Some(state) => write!(
                    f,
                    "no terminal state after {attempts} attempts (last seen: {state})"
                ),
                None => write!(f, "no terminal state after {attempts} attempts"),
            },
            PollOutcome::Cancelled { attempts } => {
                write!(f, "cancelled after {attempts} attempts")
            }
        }
    }
}

pub struct Poller<'a> {
    api: &'a dyn BuildService,
    config: &'a PollerConfig,
    cancel: CancellationToken,
}

impl<'a> Poller<'a> {
    pub fn new(
        api: &'a dyn BuildService, config: &'a PollerConfig, cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            config,
            cancel,
        }
    }

    /// Checks `request_id` until a terminal state, the end of the budget, or
    /// cancellation. Failed checks that may succeed on a later attempt use
    /// up that attempt; anything else, like a rejected token, is returned as
    /// an error.
    pub async fn poll(&self, request_id: u64) -> TriggerResult<PollOutcome> {
        let max_attempts = self.config.max_attempts;
        let mut last_state = None;
        let mut last_error = None;
        let mut warned_unknown = false;

        for attempt in 1..=max_attempts {
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Ok(PollOutcome::Cancelled { attempts: attempt - 1 });
                }
                result = self.api.request_status(request_id) => result,
            };

            match result {
                Ok(status) => {
                    last_error = None;
                    match status.latest_build() {
                        Some(build) => {
                            let state = mapper::map_build_state(&build.state);
                            if !state.is_known() && !warned_unknown {
                                tracing::warn!(
                                    build_id = build.id,
                                    %state,
                                    "Unrecognized build state, treating as in progress"
                                );
                                warned_unknown = true;
                            }
                            tracing::info!(
                                attempt,
                                build_id = build.id,
                                %state,
                                "Travis build status"
                            );

                            match mapper::classify(
                                &build.state,
                                &self.config.success_states,
                                &self.config.failure_states,
                            ) {
                                Verdict::Success => {
                                    return Ok(PollOutcome::Passed {
                                        build_id: build.id,
                                        attempts: attempt,
                                    });
                                }
                                Verdict::Failure => {
                                    return Ok(PollOutcome::Failed {
                                        build_id: build.id,
                                        state: build.state.clone(),
                                        attempts: attempt,
                                    });
                                }
                                Verdict::Pending => last_state = Some(build.state.clone()),
                            }
                        }
                        None => tracing::info!(attempt, request_id, "No builds created yet"),
                    }
                }
                Err(e) if !e.is_retryable() => {
                    tracing::error!(attempt, request_id, "Status check rejected: {e}");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(attempt, request_id, "Status check failed: {e}");
                    last_error = Some(e.to_string());
                }
            }

            if attempt < max_attempts {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        return Ok(PollOutcome::Cancelled { attempts: attempt });
                    }
                    _ = tokio::time::sleep(self.config.interval) => {}
                }
            }
        }

        Ok(PollOutcome::Exhausted {
            attempts: max_attempts,
            last_state,
            last_error,
        })
    }
}
