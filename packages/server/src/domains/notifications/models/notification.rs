use serde::{Deserialize, Serialize};

const DEFAULT_ICON: &str = "https://new.codebuilder.org/images/logo2.png";
const DEFAULT_BADGE: &str = "https://new.codebuilder.org/images/logo2.png";

/// What a push notification carries, independent of the channel that
/// delivers it. Serialized as-is into the Web Push payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

impl NotificationPayload {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: url.into(),
            icon: Some(DEFAULT_ICON.to_string()),
            badge: Some(DEFAULT_BADGE.to_string()),
        }
    }
}
