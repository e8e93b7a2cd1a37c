use chrono::{DateTime, SecondsFormat, Utc};
use hicalendar_push_domain::NotificationBatch;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ALERT_TITLE: &str = "HiCalendar提醒";
const DIAGNOSTIC_TITLE: &str = "🧪 APNs测试";
const DIAGNOSTIC_BODY: &str = "如果你收到这条消息，说明推送配置正确！";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsAlert {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aps {
    pub alert: ApnsAlert,
    pub badge: u32,
    pub sound: String,
    #[serde(rename = "mutable-content", skip_serializing_if = "Option::is_none")]
    pub mutable_content: Option<u8>,
}

/// JSON body of an APNs request. Custom keys sit next to `aps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsPayload {
    pub aps: Aps,
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl ApnsPayload {
    pub fn for_batch(batch: &NotificationBatch) -> Self {
        let mut custom = Map::new();
        if let Some(event_id) = batch.representative_event_id() {
            custom.insert("event_id".into(), Value::String(event_id.to_string()));
        }
        custom.insert(
            "notification_type".into(),
            Value::String(batch.kind.as_str().into()),
        );
        custom.insert("event_count".into(), Value::from(batch.events.len()));

        Self {
            aps: Aps {
                alert: ApnsAlert {
                    title: ALERT_TITLE.into(),
                    body: batch.message.clone(),
                },
                badge: 1,
                sound: "default".into(),
                mutable_content: Some(1),
            },
            custom,
        }
    }

    /// Fixed notification used to check the gateway setup against one device
    pub fn diagnostic(sent_at: DateTime<Utc>) -> Self {
        let mut custom = Map::new();
        custom.insert("test".into(), Value::Bool(true));
        custom.insert(
            "timestamp".into(),
            Value::String(sent_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        Self {
            aps: Aps {
                alert: ApnsAlert {
                    title: DIAGNOSTIC_TITLE.into(),
                    body: DIAGNOSTIC_BODY.into(),
                },
                badge: 1,
                sound: "default".into(),
                mutable_content: None,
            },
            custom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hicalendar_push_domain::{DueReminderGroup, PushEvent, ReminderKind, ID};
    use serde_json::json;

    #[test]
    fn batch_payload_wire_shape() {
        let user_id = ID::default();
        let first = PushEvent::new(user_id, "A");
        let second = PushEvent::new(user_id, "B");
        let group = DueReminderGroup {
            user_id,
            kind: ReminderKind::OneDay,
            events: vec![first.clone(), second],
        };
        let batch = NotificationBatch::new(group, "两件事".into(), vec!["token".into()]);

        let value = serde_json::to_value(ApnsPayload::for_batch(&batch)).unwrap();
        assert_eq!(
            value,
            json!({
                "aps": {
                    "alert": { "title": "HiCalendar提醒", "body": "两件事" },
                    "badge": 1,
                    "sound": "default",
                    "mutable-content": 1
                },
                "event_id": first.id.to_string(),
                "notification_type": "1_day",
                "event_count": 2
            })
        );
    }

    #[test]
    fn diagnostic_payload_has_no_mutable_content() {
        let value = serde_json::to_value(ApnsPayload::diagnostic(Utc::now())).unwrap();
        assert!(value["aps"].get("mutable-content").is_none());
        assert_eq!(value["aps"]["alert"]["title"], "🧪 APNs测试");
        assert_eq!(value["test"], true);
    }
}
