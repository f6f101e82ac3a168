/// Ordered key-value store collaborator
///
/// Items live in partitions and are ordered by a sort key; reads are range
/// scans over one partition that stop after `limit` items and hand back a
/// continuation key. Writes are conditional puts and deletes that return the
/// previous item.
mod dynamodb;
mod memory;

pub use dynamodb::DynamoDbStore;
pub use memory::{InMemoryStore, TableSchema};

use crate::error::VowsError;
use crate::models::{AttrValue, Item, NativeKey};
use async_trait::async_trait;
use typed_builder::TypedBuilder;

/// A range scan over one partition
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct QueryInput {
    #[builder(setter(into))]
    pub table: String,
    /// Query a secondary index instead of the table
    #[builder(default, setter(strip_option, into))]
    pub index: Option<String>,
    #[builder(setter(into))]
    pub partition_attr: String,
    #[builder(setter(into))]
    pub partition_value: AttrValue,
    /// Exclusive start position, as returned by a previous query
    #[builder(default)]
    pub start_key: Option<NativeKey>,
    #[builder(default, setter(strip_option))]
    pub limit: Option<u32>,
    #[builder(default = true)]
    pub scan_forward: bool,
    /// Return only the number of matching items
    #[builder(default)]
    pub count_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    /// Empty for count-only queries
    pub items: Vec<Item>,
    pub count: u64,
    /// Present when the scan stopped before the end of the partition
    pub continuation_key: Option<NativeKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    /// The conditional write failed: an item with this key exists
    AlreadyExists,
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, VowsError>;

    /// Writes `item` only if no item with the same primary key exists.
    /// `key_attr` names a key attribute every stored item carries.
    async fn put_if_absent(
        &self,
        table: &str,
        item: Item,
        key_attr: &str,
    ) -> Result<PutOutcome, VowsError>;

    /// Deletes by primary key and returns the previous item, if any
    async fn delete_returning_old(&self, table: &str, key: Item)
    -> Result<Option<Item>, VowsError>;
}

/// Counts every item matching `input`, following continuation keys
pub async fn count_all(store: &dyn KeyValueStore, input: QueryInput) -> Result<u64, VowsError> {
    let mut total = 0u64;
    let mut start_key = None;

    loop {
        let page = store
            .query(QueryInput {
                start_key: start_key.take(),
                limit: None,
                count_only: true,
                ..input.clone()
            })
            .await?;

        total += page.count;

        match page.continuation_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    Ok(total)
}

/// Reads every item matching `input`, following continuation keys
pub async fn query_all(store: &dyn KeyValueStore, input: QueryInput) -> Result<Vec<Item>, VowsError> {
    let mut items = Vec::new();
    let mut start_key = None;

    loop {
        let page = store
            .query(QueryInput {
                start_key: start_key.take(),
                count_only: false,
                ..input.clone()
            })
            .await?;

        items.extend(page.items);

        match page.continuation_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    Ok(items)
}
