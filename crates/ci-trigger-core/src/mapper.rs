use std::fmt;

/// Build states reported by Travis CI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildState {
    Created,
    Received,
    Started,
    Passed,
    Failed,
    Errored,
    Canceled,
    Other(String),
}

pub fn map_build_state(state: &str) -> BuildState {
    match state {
        "created" => BuildState::Created,
        "received" => BuildState::Received,
        "started" => BuildState::Started,
        "passed" => BuildState::Passed,
        "failed" => BuildState::Failed,
        "errored" => BuildState::Errored,
        "canceled" => BuildState::Canceled,
        other => BuildState::Other(other.to_string()),
    }
}

impl BuildState {
    pub fn as_str(&self) -> &str {
        match self {
            BuildState::Created => "created",
            BuildState::Received => "received",
            BuildState::Started => "started",
            BuildState::Passed => "passed",
            BuildState::Failed => "failed",
            BuildState::Errored => "errored",
            BuildState::Canceled => "canceled",
            BuildState::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, BuildState::Other(_))
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a state leaves the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
    Pending,
}

/// Sorts a raw state into the configured terminal sets. Anything not listed
/// keeps the poller waiting, including states the provider adds later.
pub fn classify(state: &str, success_states: &[String], failure_states: &[String]) -> Verdict {
    if success_states.iter().any(|s| s == state) {
        Verdict::Success
    } else if failure_states.iter().any(|s| s == state) {
        Verdict::Failure
    } else {
        Verdict::Pending
    }
}
