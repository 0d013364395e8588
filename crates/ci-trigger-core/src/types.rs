//! Request and response shapes for the Travis CI v3 API
//!
//! Only the fields this workflow reads are modeled; serde ignores the rest
//! of what the API returns.

use serde::{
    Deserialize,
    Serialize,
};

pub const DEFAULT_MESSAGE: &str = "End-to-end build triggered by ci-trigger";
pub const MERGE_MODE_REPLACE: &str = "replace";
pub const PLACEHOLDER_BUILD_SCRIPT: &str = "echo build";
pub const PLACEHOLDER_DEPLOY_SCRIPT: &str = "echo deploy";

/// Body of `POST /repo/{slug}/requests`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRequest {
    pub request: BuildPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPayload {
    pub message: String,
    pub branch: String,
    pub config: BuildConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    pub merge_mode: Vec<String>,
    pub script: String,
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployConfig {
    pub script: String,
}

impl BuildRequest {
    /// The fixed payload this tool sends, targeting `branch`
    pub fn for_branch(branch: impl Into<String>) -> Self {
        Self {
            request: BuildPayload {
                message: DEFAULT_MESSAGE.to_string(),
                branch: branch.into(),
                config: BuildConfig {
                    merge_mode: vec![MERGE_MODE_REPLACE.to_string()],
                    script: PLACEHOLDER_BUILD_SCRIPT.to_string(),
                    deploy: DeployConfig {
                        script: PLACEHOLDER_DEPLOY_SCRIPT.to_string(),
                    },
                },
            },
        }
    }
}

/// Response of the trigger call
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerResponse {
    pub request: CreatedRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRequest {
    pub id: Option<u64>,
}

/// Response of `GET /repo/{slug}/request/{id}`
///
/// Travis returns the request resource at the top level; some proxies and
/// older fixtures wrap it in a `request` object. Both decode.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Wrapped { request: RequestStatus },
    Bare(RequestStatus),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestStatus {
    #[serde(default)]
    pub builds: Vec<Build>,
}

/// A build as listed on a request. Missing fields decode to their zero
/// values, which keep the poller waiting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Build {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub state: String,
}

impl StatusResponse {
    pub fn status(&self) -> &RequestStatus {
        match self {
            StatusResponse::Wrapped { request } => request,
            StatusResponse::Bare(request) => request,
        }
    }

    /// The most recent build, if the request has produced one yet
    pub fn latest_build(&self) -> Option<&Build> {
        self.status().builds.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_wire_shape() {
        let body = serde_json::to_value(BuildRequest::for_branch("release/1.2")).unwrap();

        assert_eq!(body["request"]["branch"], "release/1.2");
        assert_eq!(body["request"]["message"], DEFAULT_MESSAGE);
        assert_eq!(
            body["request"]["config"]["merge_mode"],
            serde_json::json!(["replace"])
        );
        assert_eq!(body["request"]["config"]["script"], "echo build");
        assert_eq!(body["request"]["config"]["deploy"]["script"], "echo deploy");
    }

    #[test]
    fn test_trigger_response_with_travis_envelope() {
        let body = r#"{
            "@type": "pending",
            "remaining_requests": 9,
            "repository": {"id": 1, "slug": "acme/widgets"},
            "request": {"id": 42, "message": "hi", "branch": "master"}
        }"#;
        let parsed: TriggerResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.request.id, Some(42));
    }

    #[test]
    fn test_trigger_response_without_id() {
        let parsed: TriggerResponse = serde_json::from_str(r#"{"request": {}}"#).unwrap();
        assert_eq!(parsed.request.id, None);
    }

    #[test]
    fn test_status_response_latest_build_is_first() {
        let body = r#"{"request": {"id": 7, "builds": [
            {"id": 300, "state": "started"},
            {"id": 299, "state": "passed"}
        ]}}"#;
        let parsed: StatusResponse = serde_json::from_str(body).unwrap();
        let latest = parsed.latest_build().unwrap();
        assert_eq!(latest.id, 300);
        assert_eq!(latest.state, "started");
    }

    #[test]
    fn test_status_response_without_builds() {
        let parsed: StatusResponse = serde_json::from_str(r#"{"request": {"id": 7}}"#).unwrap();
        assert!(parsed.latest_build().is_none());
    }

    #[test]
    fn test_status_response_top_level_request() {
        let body = r#"{"@type": "request", "id": 7, "state": "processed", "builds": [
            {"@type": "build", "id": 1, "state": "passed"}
        ]}"#;
        let parsed: StatusResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(parsed, StatusResponse::Bare(_)));
        assert_eq!(
            parsed.latest_build(),
            Some(&Build {
                id: 1,
                state: "passed".to_string(),
            })
        );
    }

    #[test]
    fn test_both_status_shapes_agree() {
        let wrapped: StatusResponse =
            serde_json::from_str(r#"{"request": {"builds": [{"id": 3, "state": "errored"}]}}"#)
                .unwrap();
        let bare: StatusResponse =
            serde_json::from_str(r#"{"builds": [{"id": 3, "state": "errored"}]}"#).unwrap();

        assert!(matches!(wrapped, StatusResponse::Wrapped { .. }));
        assert_eq!(wrapped.latest_build(), bare.latest_build());
    }

    #[test]
    fn test_build_missing_fields_use_zero_values() {
        let parsed: StatusResponse =
            serde_json::from_str(r#"{"builds": [{"state": "started"}, {}]}"#).unwrap();
        let builds = &parsed.status().builds;

        assert_eq!(builds[0].id, 0);
        assert_eq!(builds[0].state, "started");
        assert_eq!(builds[1].state, "");
    }

    #[test]
    fn test_status_body_that_is_not_an_object() {
        assert!(serde_json::from_str::<StatusResponse>("[1, 2]").is_err());
    }

    #[test]
    fn test_status_decoding_is_stable() {
        let body = r#"{"request": {"builds": [{"id": 5, "state": "errored"}]}}"#;
        let first: StatusResponse = serde_json::from_str(body).unwrap();
        let second: StatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first.latest_build(), second.latest_build());
    }
}
