//! Scripted `BuildService` used by unit tests

use std::collections::VecDeque;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::BuildService;
use crate::error::{
    TriggerError,
    TriggerResult,
};
use crate::types::{
    Build,
    BuildRequest,
    CreatedRequest,
    RequestStatus,
    StatusResponse,
    TriggerResponse,
};

#[derive(Default)]
pub(crate) struct ScriptedService {
    trigger: Mutex<Option<TriggerResult<TriggerResponse>>>,
    statuses: Mutex<VecDeque<TriggerResult<StatusResponse>>>,
    pub sent: Mutex<Vec<BuildRequest>>,
    pub polled_ids: Mutex<Vec<u64>>,
    trigger_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(self, id: u64) -> Self {
        self.with_trigger(Ok(TriggerResponse {
            request: CreatedRequest { id: Some(id) },
        }))
    }

    pub fn with_trigger(self, result: TriggerResult<TriggerResponse>) -> Self {
        *self.trigger.lock().unwrap() = Some(result);
        self
    }

    pub fn then_no_builds(self) -> Self {
        self.then(Ok(status(&[])))
    }

    pub fn then_state(self, state: &str) -> Self {
        self.then(Ok(status(&[(1000, state)])))
    }

    pub fn then_error(self, err: TriggerError) -> Self {
        self.then(Err(err))
    }

    pub fn then(self, result: TriggerResult<StatusResponse>) -> Self {
        self.statuses.lock().unwrap().push_back(result);
        self
    }

    pub fn trigger_calls(&self) -> usize {
        self.trigger_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

pub(crate) fn status(builds: &[(u64, &str)]) -> StatusResponse {
    StatusResponse::Wrapped {
        request: RequestStatus {
            builds: builds
                .iter()
                .map(|(id, state)| Build {
                    id: *id,
                    state: state.to_string(),
                })
                .collect(),
        },
    }
}

#[async_trait]
impl BuildService for ScriptedService {
    async fn create_request(&self, body: &BuildRequest) -> TriggerResult<TriggerResponse> {
        self.trigger_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(body.clone());
        self.trigger
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(TriggerError::Internal("no trigger response scripted".into())))
    }

    async fn request_status(&self, request_id: u64) -> TriggerResult<StatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.polled_ids.lock().unwrap().push(request_id);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status(&[(1000, "started")])))
    }
}
