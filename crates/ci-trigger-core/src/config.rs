//! Environment-sourced configuration
//!
//! Values are read through a lookup function so callers (and tests) decide
//! where they come from. Empty values are treated as unset.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::{
    TriggerError,
    TriggerResult,
};

pub const ENV_TOKEN: &str = "TRAVIS_CI_TOKEN";
pub const ENV_REPO_OWNER: &str = "GITHUB_REPO_OWNER";
pub const ENV_REPO_NAME: &str = "GITHUB_REPO_NAME";
pub const ENV_BRANCH: &str = "BRANCH_NAME";
pub const ENV_API_URL: &str = "TRAVIS_API_URL";
pub const ENV_POLL_ATTEMPTS: &str = "TRAVIS_POLL_ATTEMPTS";
pub const ENV_POLL_INTERVAL_SECS: &str = "TRAVIS_POLL_INTERVAL_SECS";
pub const ENV_FAILURE_STATES: &str = "TRAVIS_FAILURE_STATES";

pub const DEFAULT_API_URL: &str = "https://api.travis-ci.com";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 21;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// The repository a build is triggered for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name` as a single percent-encoded path segment
    pub fn encoded(&self) -> String {
        urlencoding::encode(&format!("{}/{}", self.owner, self.name)).into_owned()
    }
}

/// Poll loop settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Total status checks, the first one included
    pub max_attempts: u32,
    pub interval: Duration,
    pub success_states: Vec<String>,
    pub failure_states: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
            success_states: vec!["passed".to_string()],
            failure_states: vec!["errored".to_string()],
        }
    }
}

#[derive(Debug)]
pub struct TriggerConfig {
    pub api_url: String,
    pub token: SecretString,
    pub repo: RepoSlug,
    pub branch: String,
    pub poller: PollerConfig,
}

impl TriggerConfig {
    pub fn from_env() -> TriggerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> TriggerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| TriggerError::ConfigurationMissing(key.to_string()));

        let token = require(ENV_TOKEN)?;
        let owner = require(ENV_REPO_OWNER)?;
        let name = require(ENV_REPO_NAME)?;
        let branch = get(ENV_BRANCH).unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let api_url = get(ENV_API_URL)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut poller = PollerConfig::default();
        if let Some(raw) = get(ENV_POLL_ATTEMPTS) {
            poller.max_attempts = parse_number(ENV_POLL_ATTEMPTS, &raw)?;
            if poller.max_attempts == 0 {
                return Err(TriggerError::ConfigurationInvalid {
                    key: ENV_POLL_ATTEMPTS.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if let Some(raw) = get(ENV_POLL_INTERVAL_SECS) {
            poller.interval = Duration::from_secs(parse_number(ENV_POLL_INTERVAL_SECS, &raw)?);
        }
        if let Some(raw) = get(ENV_FAILURE_STATES) {
            let states: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if states.iter().any(|s| poller.success_states.contains(s)) {
                return Err(TriggerError::ConfigurationInvalid {
                    key: ENV_FAILURE_STATES.to_string(),
                    reason: "a state cannot be both a success and a failure".to_string(),
                });
            }
            if !states.is_empty() {
                poller.failure_states = states;
            }
        }

        Ok(Self {
            api_url,
            token: SecretString::from(token),
            repo: RepoSlug::new(owner, name),
            branch,
            poller,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> TriggerResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| TriggerError::ConfigurationInvalid {
            key: key.to_string(),
            reason: format!("{raw:?} is not a valid number: {e}"),
        })
}
