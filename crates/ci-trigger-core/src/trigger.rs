//! One-shot build trigger

use crate::client::BuildService;
use crate::error::{
    TriggerError,
    TriggerResult,
};
use crate::types::BuildRequest;

/// Sends the fixed build request for `branch` and returns the request id
/// the provider assigned to it.
pub async fn trigger_build(api: &dyn BuildService, branch: &str) -> TriggerResult<u64> {
    let body = BuildRequest::for_branch(branch);

    match serde_json::to_string(&body) {
        Ok(json) => tracing::info!(payload = %json, "Triggering build"),
        Err(e) => tracing::debug!("Could not render payload for logging: {e}"),
    }

    let response = api.create_request(&body).await?;
    let request_id = response.request.id.ok_or(TriggerError::MissingRequestId)?;

    tracing::info!(request_id, "Travis request created");
    Ok(request_id)
}
