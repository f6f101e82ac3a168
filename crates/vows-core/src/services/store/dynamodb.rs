/// DynamoDB implementation of the key-value store
use super::{KeyValueStore, PutOutcome, QueryInput, QueryOutput};
use crate::error::VowsError;
use crate::models::{AttrValue, Item};
use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue, Select};
use std::collections::HashMap;
use tracing::debug;

/// DynamoDB-backed store
pub struct DynamoDbStore {
    client: DynamoDbClient,
}

impl DynamoDbStore {
    pub fn new(client: DynamoDbClient) -> Self {
        Self { client }
    }

    fn native_value(value: AttrValue) -> AttributeValue {
        match value {
            AttrValue::S(s) => AttributeValue::S(s),
            AttrValue::N(n) => AttributeValue::N(n),
            AttrValue::Bool(b) => AttributeValue::Bool(b),
        }
    }

    fn to_native(item: Item) -> HashMap<String, AttributeValue> {
        item.into_iter()
            .map(|(name, value)| (name, Self::native_value(value)))
            .collect()
    }

    /// Converts a DynamoDB item, dropping attribute types the site never writes
    fn from_native(item: &HashMap<String, AttributeValue>) -> Item {
        item.iter()
            .filter_map(|(name, value)| {
                let value = match value {
                    AttributeValue::S(s) => AttrValue::S(s.clone()),
                    AttributeValue::N(n) => AttrValue::N(n.clone()),
                    AttributeValue::Bool(b) => AttrValue::Bool(*b),
                    _ => return None,
                };
                Some((name.clone(), value))
            })
            .collect()
    }

    fn is_put_conditional_check_failed(err: &SdkError<PutItemError>) -> bool {
        match err {
            SdkError::ServiceError(service_err) => {
                matches!(
                    service_err.err(),
                    PutItemError::ConditionalCheckFailedException(_)
                )
            }
            _ => false,
        }
    }
}

#[async_trait]
impl KeyValueStore for DynamoDbStore {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, VowsError> {
        let mut request = self
            .client
            .query()
            .table_name(&input.table)
            .key_condition_expression("#pk = :pk")
            .expression_attribute_names("#pk", &input.partition_attr)
            .expression_attribute_values(":pk", Self::native_value(input.partition_value))
            .scan_index_forward(input.scan_forward)
            .set_index_name(input.index)
            .set_limit(input.limit.map(|l| l.min(i32::MAX as u32) as i32));

        if input.count_only {
            request = request.select(Select::Count);
        }

        if let Some(key) = input.start_key.filter(|k| !k.is_empty()) {
            request = request.set_exclusive_start_key(Some(Self::to_native(key)));
        }

        let response = request
            .send()
            .await
            .map_err(|e| VowsError::Store(format!("DynamoDB Query failed: {}", e)))?;

        let continuation_key = match response.last_evaluated_key() {
            Some(key) if !key.is_empty() => Some(Self::from_native(key)),
            _ => None,
        };

        debug!(
            table = %input.table,
            count = response.count(),
            has_more = continuation_key.is_some(),
            "DynamoDB query completed"
        );

        Ok(QueryOutput {
            items: response.items().iter().map(Self::from_native).collect(),
            count: response.count().max(0) as u64,
            continuation_key,
        })
    }

    async fn put_if_absent(
        &self,
        table: &str,
        item: Item,
        key_attr: &str,
    ) -> Result<PutOutcome, VowsError> {
        let result = self
            .client
            .put_item()
            .table_name(table)
            .set_item(Some(Self::to_native(item)))
            .condition_expression("attribute_not_exists(#k)")
            .expression_attribute_names("#k", key_attr)
            .send()
            .await;

        match result {
            Ok(_) => Ok(PutOutcome::Created),
            Err(e) if Self::is_put_conditional_check_failed(&e) => Ok(PutOutcome::AlreadyExists),
            Err(e) => Err(VowsError::Store(format!("DynamoDB PutItem failed: {}", e))),
        }
    }

    async fn delete_returning_old(
        &self,
        table: &str,
        key: Item,
    ) -> Result<Option<Item>, VowsError> {
        let response = self
            .client
            .delete_item()
            .table_name(table)
            .set_key(Some(Self::to_native(key)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| VowsError::Store(format!("DynamoDB DeleteItem failed: {}", e)))?;

        Ok(response
            .attributes()
            .filter(|old| !old.is_empty())
            .map(Self::from_native))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_conversion() {
        let item = Item::from([
            ("photoId".to_string(), AttrValue::from("p1")),
            ("count".to_string(), AttrValue::N("3".to_string())),
            ("active".to_string(), AttrValue::Bool(true)),
        ]);

        let native = DynamoDbStore::to_native(item.clone());
        assert_eq!(native["photoId"], AttributeValue::S("p1".to_string()));
        assert_eq!(native["count"], AttributeValue::N("3".to_string()));
        assert_eq!(DynamoDbStore::from_native(&native), item);
    }

    #[test]
    fn test_unsupported_attributes_are_dropped() {
        let native = HashMap::from([
            ("photoId".to_string(), AttributeValue::S("p1".to_string())),
            ("tags".to_string(), AttributeValue::Ss(vec!["a".to_string()])),
        ]);
        let item = DynamoDbStore::from_native(&native);
        assert_eq!(item.len(), 1);
        assert!(item.contains_key("photoId"));
    }
}
