/// Lambda event handlers
pub mod sns;
pub mod sqs;

use crate::context::WorkerContext;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use vows_core::VowsError;
use vows_core::models::{CommentCreated, QueueEvent};
use vows_core::services::{DispatchOutcome, NotificationReport};

/// What processing one message payload amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Notified(NotificationReport),
    Dispatched(DispatchOutcome),
}

/// Main Lambda handler - routes events to the SNS or SQS handler
pub async fn handler(ctx: Arc<WorkerContext>, event: LambdaEvent<Value>) -> Result<Value, Error> {
    info!(request_id = %event.context.request_id, "Received Lambda event");

    let queue_event: QueueEvent = serde_json::from_value(event.payload).map_err(|e| {
        error!("Failed to parse Lambda event: {}", e);
        VowsError::Lambda(format!("Invalid event type: {}", e))
    })?;

    match queue_event {
        QueueEvent::Sns(sns_event) => {
            info!("Processing SNS event ({} record(s))", sns_event.records.len());
            sns::handle(&ctx, sns_event).await?;
            Ok(serde_json::json!({ "statusCode": 200, "body": "OK" }))
        }
        QueueEvent::Sqs(sqs_event) => {
            info!("Processing SQS event ({} record(s))", sqs_event.records.len());
            let response = sqs::handle(&ctx, sqs_event).await;
            Ok(serde_json::to_value(response)?)
        }
    }
}

/// Routes one message body: comment events notify subscribers, anything
/// else is treated as a mail to dispatch
pub async fn process_message(ctx: &WorkerContext, body: &str) -> Result<MessageOutcome, VowsError> {
    match serde_json::from_str::<CommentCreated>(body) {
        Ok(event) => {
            let report = ctx.notifications.notify(&event).await?;
            Ok(MessageOutcome::Notified(report))
        }
        Err(_) => {
            let outcome = ctx.dispatcher.dispatch(body).await?;
            Ok(MessageOutcome::Dispatched(outcome))
        }
    }
}
