/// SQS handler - queued mail with partial-batch failure reporting
use crate::context::WorkerContext;
use crate::handlers::process_message;
use tracing::{error, info, warn};
use vows_core::models::{BatchItemFailure, BatchResponse, SqsEvent};

/// Processes every record and reports only the retriable failures, so the
/// queue redelivers those and deletes the rest
#[tracing::instrument(name = "sqs.handle", skip_all, fields(records = event.records.len()))]
pub async fn handle(ctx: &WorkerContext, event: SqsEvent) -> BatchResponse {
    let mut response = BatchResponse::default();

    for record in event.records {
        let receive_count = record
            .attributes
            .get("ApproximateReceiveCount")
            .map(String::as_str)
            .unwrap_or("1");

        match process_message(ctx, &record.body).await {
            Ok(outcome) => info!(
                message_id = %record.message_id,
                outcome = ?outcome,
                "SQS record processed"
            ),
            Err(e) => {
                if e.is_retriable() {
                    error!(
                        message_id = %record.message_id,
                        receive_count = %receive_count,
                        error = %e,
                        "Failed to process SQS record, returning it to the queue"
                    );
                    response.batch_item_failures.push(BatchItemFailure {
                        item_identifier: record.message_id,
                    });
                } else {
                    warn!(
                        message_id = %record.message_id,
                        error = %e,
                        "Dropping SQS record that cannot succeed"
                    );
                }
            }
        }
    }

    response
}
