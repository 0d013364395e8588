//! Trigger a Travis CI build and wait for its verdict
//!
//! The workflow is two steps run in order:
//! - `trigger` - POSTs a fixed build request for a branch and returns the
//!   request id
//! - `poller` - checks that request's latest build on an interval until it
//!   passes, errors, or the attempt budget runs out
//!
//! HTTP goes through the [`BuildService`] trait; [`TravisClient`] is the
//! reqwest implementation.
//!
//! # Example Usage
//!
//! ```no_run
//! use ci_trigger_core::{workflow, TravisClient, TriggerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> ci_trigger_core::TriggerResult<()> {
//! let config = TriggerConfig::from_env()?;
//! let client = TravisClient::from_config(&config)?;
//! let report = workflow::run(&config, &client, CancellationToken::new()).await?;
//! println!("passed: {}", report.passed());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod poller;
pub mod trigger;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use client::{
    BuildService,
    TravisClient,
};
pub use config::{
    PollerConfig,
    RepoSlug,
    TriggerConfig,
};
pub use error::{
    TriggerError,
    TriggerResult,
};
pub use poller::{
    PollOutcome,
    Poller,
};
pub use workflow::RunReport;
