// Thin client for the Firebase Cloud Messaging HTTP API.
// https://firebase.google.com/docs/cloud-messaging/http-server-ref

pub mod models;

use reqwest::Client;
use serde_json::Value;

use crate::models::{FcmMessage, FcmNotification, FcmResponse};

const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// Error codes FCM returns when a registration token is permanently dead.
const INVALID_TOKEN_ERRORS: &[&str] = &[
    "NotRegistered",
    "InvalidRegistration",
    "MissingRegistration",
];

#[derive(Debug, thiserror::Error)]
pub enum FcmError {
    /// The registration token is invalid or no longer registered.
    /// Callers should stop sending to this token.
    #[error("registration token is invalid or unregistered")]
    InvalidToken,

    #[error("fcm request failed: {0}")]
    Request(String),

    #[error("fcm returned error: {0}")]
    Response(String),
}

#[derive(Debug, Clone)]
pub struct FcmOptions {
    pub server_key: String,
}

#[derive(Debug, Clone)]
pub struct FcmService {
    options: FcmOptions,
    client: Client,
}

impl FcmService {
    pub fn new(options: FcmOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    /// Send a single notification message to a registration token.
    ///
    /// Returns `FcmError::InvalidToken` when the provider confirms the
    /// token is dead, so callers can prune their registries.
    pub async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<Value>,
    ) -> Result<(), FcmError> {
        let message = FcmMessage {
            to: token.to_string(),
            notification: FcmNotification {
                title: title.to_string(),
                body: body.to_string(),
                sound: Some("notification".to_string()),
            },
            data,
        };

        let response = self
            .client
            .post(FCM_SEND_URL)
            .header(
                "Authorization",
                format!("key={}", self.options.server_key),
            )
            .json(&message)
            .send()
            .await
            .map_err(|e| FcmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FcmError::Response(format!("{}: {}", status, body)));
        }

        let parsed: FcmResponse = response
            .json()
            .await
            .map_err(|e| FcmError::Request(e.to_string()))?;

        if parsed.failure == 0 {
            return Ok(());
        }

        // Single-recipient send: the first result carries the error code.
        let code = parsed
            .results
            .first()
            .and_then(|r| r.error.as_deref())
            .unwrap_or("Unknown");

        if INVALID_TOKEN_ERRORS.contains(&code) {
            Err(FcmError::InvalidToken)
        } else {
            Err(FcmError::Response(code.to_string()))
        }
    }
}
