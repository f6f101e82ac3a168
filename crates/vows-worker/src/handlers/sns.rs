/// SNS handler - comment events and mail published to a topic
use crate::context::WorkerContext;
use crate::handlers::process_message;
use tracing::{error, info};
use vows_core::VowsError;
use vows_core::models::SnsEvent;

/// Processes every record; fails the invocation if any record failed so
/// SNS retries the delivery
pub async fn handle(ctx: &WorkerContext, event: SnsEvent) -> Result<(), VowsError> {
    let mut failed = Vec::new();

    for record in event.records {
        let message_id = record.sns.message_id;
        match process_message(ctx, &record.sns.message).await {
            Ok(outcome) => info!(message_id = %message_id, outcome = ?outcome, "SNS record processed"),
            Err(e) => {
                error!(message_id = %message_id, error = %e, "Failed to process SNS record");
                failed.push(message_id);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(VowsError::Lambda(format!(
            "{} SNS record(s) failed: {}",
            failed.len(),
            failed.join(", ")
        )))
    }
}
