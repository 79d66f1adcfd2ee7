//! API DTOs (Data Transfer Objects)

use serde::Serialize;

/// Response for POST /api/throttle/check
///
/// A refused attempt is still a successful call: the verdict is data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAttemptResponse {
    pub allowed: bool,
    pub attempt_count: u64,
    pub max_attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}
