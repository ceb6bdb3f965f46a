use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// The only event that changes anything
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

/// Payload delivered by the payment provider.
///
/// `data` stays untyped until the event is known, so events we ignore are
/// accepted whatever their data looks like.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

impl WebhookRequest {
    pub fn is_upgrade(&self) -> bool {
        self.event == USER_UPGRADED_EVENT
    }

    /// Decodes `data` as an upgrade target; `None` if missing or malformed
    pub fn upgrade_data(&self) -> Option<WebhookData> {
        let data = self.data.clone()?;
        serde_json::from_value(data).ok()
    }
}
