use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audience used when none is given
pub const DEFAULT_AUDIENCE: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub message: String,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub sent_date: Option<String>,
    #[serde(default, deserialize_with = "super::flag")]
    pub is_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NotificationCreate {
    pub message: String,
    pub target_audience: String,
    /// ISO-8601 send time; the service sends immediately when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_time: Option<String>,
}

impl NotificationCreate {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            target_audience: DEFAULT_AUDIENCE.to_string(),
            send_time: None,
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.send_time = Some(at.to_rfc3339());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_notification_create_defaults() {
        let n = NotificationCreate::new("Скидка 20%");
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            serde_json::json!({"message": "Скидка 20%", "target_audience": "all"})
        );
    }

    #[test]
    fn test_notification_create_scheduled() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let n = NotificationCreate::new("hi").with_audience("paid").scheduled_at(at);
        assert_eq!(n.target_audience, "paid");
        assert_eq!(n.send_time.as_deref(), Some("2024-05-01T09:30:00+00:00"));
    }

    #[test]
    fn test_parse_notification_row() {
        let json = r#"{"id": 1, "title": "Promo", "message": "hi", "target_audience": "all",
                       "scheduled_date": null, "sent_date": null, "is_sent": 0}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert!(!n.is_sent);
        assert_eq!(n.title.as_deref(), Some("Promo"));
    }
}
