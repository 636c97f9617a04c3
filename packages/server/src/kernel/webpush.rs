use anyhow::Result;
use async_trait::async_trait;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder,
};

use super::traits::{BaseWebPushService, PushError};

/// Web Push delivery with VAPID signing. The crate handles the payload
/// encryption; we only classify the outcome.
pub struct WebPushService {
    client: IsahcWebPushClient,
    vapid_private_pem: String,
    subject: String,
}

impl WebPushService {
    pub fn new(vapid_private_pem: String, subject: String) -> Result<Self> {
        Ok(Self {
            client: IsahcWebPushClient::new()?,
            vapid_private_pem,
            subject,
        })
    }
}

fn to_push_error(e: WebPushError) -> PushError {
    match e {
        // The push service has told us this subscription is dead.
        WebPushError::EndpointNotValid | WebPushError::EndpointNotFound => PushError::EndpointGone,
        other => PushError::Provider(other.to_string()),
    }
}

#[async_trait]
impl BaseWebPushService for WebPushService {
    async fn deliver(
        &self,
        endpoint: &str,
        p256dh: &str,
        auth: &str,
        payload: &[u8],
    ) -> Result<(), PushError> {
        let info = SubscriptionInfo::new(endpoint, p256dh, auth);

        let mut signature =
            VapidSignatureBuilder::from_pem(self.vapid_private_pem.as_bytes(), &info)
                .map_err(|e| PushError::Transport(e.to_string()))?;
        signature.add_claim("sub", self.subject.clone());
        let signature = signature
            .build()
            .map_err(|e| PushError::Transport(e.to_string()))?;

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        let message = builder
            .build()
            .map_err(|e| PushError::Transport(e.to_string()))?;

        self.client.send(message).await.map_err(to_push_error)
    }
}
