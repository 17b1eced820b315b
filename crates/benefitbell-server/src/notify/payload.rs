use serde::{Deserialize, Serialize};

pub const DEFAULT_ICON: &str = "/icons/icon-192x192.png";
pub const DEFAULT_BADGE: &str = "/icons/badge-72x72.png";

/// Notification shown by the service worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    /// Opened when the notification is clicked
    pub url: String,
    /// Notifications sharing a tag replace each other
    pub tag: String,
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
        tag: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: url.into(),
            tag: tag.into(),
            icon: None,
            badge: None,
        }
    }

    pub fn with_icons(mut self) -> Self {
        self.icon = Some(DEFAULT_ICON.to_string());
        self.badge = Some(DEFAULT_BADGE.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons_omitted_unless_set() {
        let payload = NotificationPayload::new("t", "b", "/", "tag");
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("icon").is_none());

        let json = serde_json::to_value(payload.with_icons()).unwrap();
        assert_eq!(json["badge"], DEFAULT_BADGE);
    }
}
