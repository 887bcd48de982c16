//! Request and response bodies exchanged with the serverless functions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DELETE_DEVICE: &str = "delete-device";
pub const ASSIGN_DEVICE_GROUP: &str = "assign-device-group";
pub const SEND_TELEGRAM_NOTIFICATION: &str = "send-telegram-notification";
pub const SEND_EMAIL_NOTIFICATION: &str = "send-email-notification";

/// Body every function answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Function-specific payload, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl FunctionResponse {
    /// Best human-readable reason for a failed call.
    pub fn failure_reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDeviceRequest {
    pub device_id: String,
}

/// `group_id: None` removes the device from its current group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignGroupRequest {
    pub device_id: String,
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Telegram,
    Email,
}

impl NotificationChannel {
    pub fn function_name(&self) -> &'static str {
        match self {
            NotificationChannel::Telegram => SEND_TELEGRAM_NOTIFICATION,
            NotificationChannel::Email => SEND_EMAIL_NOTIFICATION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub channel: NotificationChannel,
    /// Email address or Telegram chat id. Telegram falls back to the
    /// chat configured on the function side when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_with_optional_fields_missing() {
        let resp: FunctionResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(resp.success);
        assert!(resp.message.is_none());
        assert!(resp.failure_reason().is_none());
    }

    #[test]
    fn failure_reason_prefers_error() {
        let resp: FunctionResponse = serde_json::from_str(
            r#"{"success":false,"message":"could not delete","error":"device is locked"}"#,
        )
        .unwrap();
        assert_eq!(resp.failure_reason(), Some("device is locked"));
    }

    #[test]
    fn requests_use_camel_case() {
        let body = serde_json::to_value(AssignGroupRequest {
            device_id: "dev-1".into(),
            group_id: None,
        })
        .unwrap();
        assert_eq!(body["deviceId"], "dev-1");
        assert!(body["groupId"].is_null());

        let body = serde_json::to_value(NotificationRequest {
            channel: NotificationChannel::Telegram,
            recipient: None,
            subject: None,
            message: "battery low".into(),
        })
        .unwrap();
        assert_eq!(body["channel"], "telegram");
        assert!(body.get("recipient").is_none());
    }

    #[test]
    fn channel_function_names() {
        assert_eq!(
            NotificationChannel::Email.function_name(),
            "send-email-notification"
        );
        assert_eq!(
            NotificationChannel::Telegram.function_name(),
            "send-telegram-notification"
        );
    }
}
