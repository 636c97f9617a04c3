use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for the FCM legacy HTTP API.
#[derive(Debug, Serialize)]
pub struct FcmMessage {
    pub to: String,
    pub notification: FcmNotification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

/// Top-level response from the FCM send endpoint.
#[derive(Debug, Deserialize)]
pub struct FcmResponse {
    pub success: i64,
    pub failure: i64,
    #[serde(default)]
    pub results: Vec<FcmResult>,
}

/// Per-message result; exactly one of `message_id` or `error` is set.
#[derive(Debug, Deserialize)]
pub struct FcmResult {
    pub message_id: Option<String>,
    pub error: Option<String>,
}
