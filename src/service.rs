//! Retry-wrapped fleet operations.
//!
//! [`FleetService`] validates inputs, then runs each serverless call through
//! the [`RetryableExecutor`]. Every method returns an [`OperationOutcome`],
//! so callers branch on data instead of handling errors.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ErrorCode, OperationError};
use crate::executor::{OperationOutcome, RetryableExecutor};
use crate::functions::types::{ASSIGN_DEVICE_GROUP, DELETE_DEVICE};
use crate::functions::{
    AssignGroupRequest, DeleteDeviceRequest, FunctionInvoker, FunctionResponse,
    NotificationChannel, NotificationRequest,
};

pub struct FleetService<I> {
    invoker: I,
    executor: RetryableExecutor,
}

impl<I: FunctionInvoker> FleetService<I> {
    pub fn new(invoker: I, executor: RetryableExecutor) -> Self {
        Self { invoker, executor }
    }

    pub fn executor(&self) -> &RetryableExecutor {
        &self.executor
    }

    /// Calls `function` with an arbitrary JSON body.
    pub async fn invoke(&self, function: &str, body: Value) -> OperationOutcome<FunctionResponse> {
        if function.trim().is_empty() {
            return rejected(OperationError::validation(
                "function name must not be empty",
                "invoke",
            ));
        }
        let invoker = &self.invoker;
        let body = &body;
        self.executor
            .execute(move || invoker.invoke(function, body), function)
            .await
    }

    pub async fn delete_device(&self, device_id: &str) -> OperationOutcome<FunctionResponse> {
        if device_id.trim().is_empty() {
            return rejected(OperationError::validation(
                "device id must not be empty",
                DELETE_DEVICE,
            ));
        }
        let request = DeleteDeviceRequest {
            device_id: device_id.to_string(),
        };
        match encode(DELETE_DEVICE, &request) {
            Ok(body) => self.invoke(DELETE_DEVICE, body).await,
            Err(err) => rejected(err),
        }
    }

    /// Moves a device into `group_id`, or out of any group when `None`.
    pub async fn assign_group(
        &self,
        device_id: &str,
        group_id: Option<&str>,
    ) -> OperationOutcome<FunctionResponse> {
        if device_id.trim().is_empty() {
            return rejected(OperationError::validation(
                "device id must not be empty",
                ASSIGN_DEVICE_GROUP,
            ));
        }
        if group_id.is_some_and(|g| g.trim().is_empty()) {
            return rejected(OperationError::validation(
                "group id must not be blank",
                ASSIGN_DEVICE_GROUP,
            ));
        }
        let request = AssignGroupRequest {
            device_id: device_id.to_string(),
            group_id: group_id.map(str::to_string),
        };
        match encode(ASSIGN_DEVICE_GROUP, &request) {
            Ok(body) => self.invoke(ASSIGN_DEVICE_GROUP, body).await,
            Err(err) => rejected(err),
        }
    }

    pub async fn send_notification(
        &self,
        request: &NotificationRequest,
    ) -> OperationOutcome<FunctionResponse> {
        let function = request.channel.function_name();
        if let Err(err) = validate_notification(request) {
            return rejected(err);
        }
        match encode(function, request) {
            Ok(body) => self.invoke(function, body).await,
            Err(err) => rejected(err),
        }
    }
}

fn validate_notification(request: &NotificationRequest) -> Result<(), OperationError> {
    let function = request.channel.function_name();
    if request.message.trim().is_empty() {
        return Err(OperationError::validation(
            "notification message must not be empty",
            function,
        ));
    }
    if request.channel == NotificationChannel::Email {
        match request.recipient.as_deref() {
            Some(to) if to.contains('@') => {}
            Some(to) => {
                return Err(OperationError::validation(
                    format!("invalid email recipient: {to}"),
                    function,
                ));
            }
            None => {
                return Err(OperationError::validation(
                    "email notifications require a recipient",
                    function,
                ));
            }
        }
    }
    Ok(())
}

fn encode<B: Serialize>(function: &str, body: &B) -> Result<Value, OperationError> {
    serde_json::to_value(body)
        .map_err(|e| OperationError::new(ErrorCode::ValidationError, e.to_string(), function))
}

/// Outcome for input rejected before any attempt was made.
fn rejected<T>(error: OperationError) -> OperationOutcome<T> {
    OperationOutcome::Failure {
        error,
        elapsed_ms: 0,
        attempts: 0,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::executor::ExecutorConfig;

    struct MockInvoker {
        responses: Mutex<VecDeque<Result<FunctionResponse, OperationError>>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl MockInvoker {
        fn new(responses: Vec<Result<FunctionResponse, OperationError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FunctionInvoker for MockInvoker {
        async fn invoke(
            &self,
            function: &str,
            body: &Value,
        ) -> Result<FunctionResponse, OperationError> {
            self.calls
                .lock()
                .unwrap()
                .push((function.to_string(), body.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(OperationError::new(ErrorCode::DatabaseError, "no response", function)))
        }
    }

    fn ok(message: &str) -> Result<FunctionResponse, OperationError> {
        Ok(FunctionResponse {
            success: true,
            message: Some(message.to_string()),
            error: None,
            data: None,
        })
    }

    fn service(responses: Vec<Result<FunctionResponse, OperationError>>) -> FleetService<MockInvoker> {
        let executor = RetryableExecutor::new(ExecutorConfig::new(3, 1000).unwrap());
        FleetService::new(MockInvoker::new(responses), executor)
    }

    #[tokio::test(start_paused = true)]
    async fn delete_device_sends_camel_case_body() {
        let svc = service(vec![ok("Device deleted")]);

        let outcome = svc.delete_device("dev-42").await;

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 1);
        let calls = svc.invoker.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "delete-device");
        assert_eq!(calls[0].1, json!({"deviceId": "dev-42"}));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures() {
        let svc = service(vec![
            Err(OperationError::new(ErrorCode::RateLimitExceeded, "slow down", "assign-device-group")),
            ok("Group assigned"),
        ]);

        let outcome = svc.assign_group("dev-1", Some("grp-9")).await;

        assert_eq!(outcome.attempts(), 2);
        assert_eq!(
            outcome.value().and_then(|r| r.message.as_deref()),
            Some("Group assigned")
        );
        assert_eq!(
            svc.invoker.calls()[1].1,
            json!({"deviceId": "dev-1", "groupId": "grp-9"})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_report_last_error() {
        let svc = service(vec![
            Err(OperationError::new(ErrorCode::DatabaseError, "db down", "delete-device")),
            Err(OperationError::new(ErrorCode::DatabaseError, "db still down", "delete-device")),
            Err(OperationError::new(ErrorCode::NotFound, "Device not found", "delete-device")),
        ]);

        let outcome = svc.delete_device("dev-1").await;

        assert_eq!(outcome.attempts(), 3);
        let err = outcome.error().unwrap();
        assert_eq!(err.code, ErrorCode::OperationFailed);
        assert_eq!(err.message, "Device not found");
        assert_eq!(
            err.context_value("originalCode"),
            Some(&Value::from("NOT_FOUND"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unassign_sends_null_group() {
        let svc = service(vec![ok("Device removed from group")]);

        let outcome = svc.assign_group("dev-1", None).await;

        assert!(outcome.is_success());
        assert!(svc.invoker.calls()[0].1["groupId"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_input_skips_the_invoker() {
        let svc = service(vec![]);

        for outcome in [
            svc.delete_device("  ").await,
            svc.assign_group("", Some("grp")).await,
            svc.assign_group("dev-1", Some(" ")).await,
            svc.invoke("", json!({})).await,
        ] {
            assert_eq!(outcome.attempts(), 0);
            assert_eq!(outcome.error().unwrap().code, ErrorCode::ValidationError);
        }
        assert!(svc.invoker.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn notification_routes_by_channel() {
        let svc = service(vec![ok("sent"), ok("sent")]);

        let telegram = NotificationRequest {
            channel: NotificationChannel::Telegram,
            recipient: None,
            subject: None,
            message: "Device dev-1 battery at 5%".into(),
        };
        let email = NotificationRequest {
            channel: NotificationChannel::Email,
            recipient: Some("ops@example.com".into()),
            subject: Some("Security alert".into()),
            message: "Unauthorized access attempt".into(),
        };

        assert!(svc.send_notification(&telegram).await.is_success());
        assert!(svc.send_notification(&email).await.is_success());

        let calls = svc.invoker.calls();
        assert_eq!(calls[0].0, "send-telegram-notification");
        assert_eq!(calls[1].0, "send-email-notification");
        assert_eq!(calls[1].1["recipient"], "ops@example.com");
    }

    #[tokio::test(start_paused = true)]
    async fn email_requires_valid_recipient() {
        let svc = service(vec![]);
        let mut request = NotificationRequest {
            channel: NotificationChannel::Email,
            recipient: None,
            subject: None,
            message: "hello".into(),
        };

        let outcome = svc.send_notification(&request).await;
        assert_eq!(outcome.error().unwrap().code, ErrorCode::ValidationError);

        request.recipient = Some("not-an-address".into());
        let outcome = svc.send_notification(&request).await;
        assert!(outcome.error().unwrap().message.contains("not-an-address"));

        request.recipient = Some("ops@example.com".into());
        request.message = String::new();
        let outcome = svc.send_notification(&request).await;
        assert_eq!(outcome.attempts(), 0);

        assert!(svc.invoker.calls().is_empty());
    }
}
