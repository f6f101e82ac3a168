/// Comment-notification subscriptions
use crate::constants::{ATTR_EMAIL, ATTR_PHOTO_ID};
use crate::error::VowsError;
use crate::models::{Subscription, SubscriptionKey, UnsubscribeOutcome};
use crate::services::store::{KeyValueStore, PutOutcome, QueryInput, query_all};
use crate::utils::redact_email;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tracing::info;

pub struct SubscriptionService {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Adds the pair; an existing pair is a conflict
    pub async fn subscribe(&self, key: SubscriptionKey) -> Result<Subscription, VowsError> {
        let subscription = Subscription {
            photo_id: key.photo_id,
            email: key.email,
            created_at: Some(Utc::now().trunc_subsecs(3)),
        };

        match self
            .store
            .put_if_absent(&self.table, subscription.to_item(), ATTR_EMAIL)
            .await?
        {
            PutOutcome::Created => {
                info!(
                    photo_id = %subscription.photo_id,
                    email = %redact_email(&subscription.email),
                    "Subscribed"
                );
                Ok(subscription)
            }
            PutOutcome::AlreadyExists => Err(VowsError::Conflict(format!(
                "Already subscribed to photo {}",
                subscription.photo_id
            ))),
        }
    }

    /// Removes the pair. Removing an absent pair is not an error.
    pub async fn unsubscribe(&self, key: &SubscriptionKey) -> Result<UnsubscribeOutcome, VowsError> {
        let previous = self
            .store
            .delete_returning_old(&self.table, Subscription::key(&key.photo_id, &key.email))
            .await?;

        let outcome = UnsubscribeOutcome {
            existed: previous.is_some(),
        };
        info!(
            photo_id = %key.photo_id,
            email = %redact_email(&key.email),
            existed = outcome.existed,
            "Unsubscribed"
        );
        Ok(outcome)
    }

    pub async fn subscribers_for(&self, photo_id: &str) -> Result<Vec<Subscription>, VowsError> {
        let input = QueryInput::builder()
            .table(self.table.as_str())
            .partition_attr(ATTR_PHOTO_ID)
            .partition_value(photo_id)
            .build();

        query_all(self.store.as_ref(), input)
            .await?
            .iter()
            .map(Subscription::from_item)
            .collect()
    }
}
