/// In-memory key-value store for tests and local runs
use super::{KeyValueStore, PutOutcome, QueryInput, QueryOutput};
use crate::config::TableConfig;
use crate::constants::{ATTR_COMMENT_ID, ATTR_EMAIL, ATTR_PHOTO_ID, ATTR_SORT_KEY};
use crate::error::VowsError;
use crate::models::{AttrValue, Item, NativeKey};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

/// Key layout of a table or index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl TableSchema {
    pub fn new(partition_key: &str, sort_key: Option<&str>) -> Self {
        Self {
            partition_key: partition_key.to_string(),
            sort_key: sort_key.map(str::to_string),
        }
    }
}

type PrimaryKey = (AttrValue, Option<AttrValue>);

struct Table {
    schema: TableSchema,
    indexes: HashMap<String, TableSchema>,
    items: BTreeMap<PrimaryKey, Item>,
}

/// In-memory store for tests and local runs
///
/// Behaves like the managed store for everything the functions rely on:
/// sorted range scans, exclusive start keys, conditional puts and
/// delete-returning-old. `with_max_page_items` caps every response the way
/// the managed store caps responses by size.
pub struct InMemoryStore {
    tables: tokio::sync::Mutex<HashMap<String, Table>>,
    max_page_items: Option<usize>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: tokio::sync::Mutex::new(HashMap::new()),
            max_page_items: None,
            unavailable: AtomicBool::new(false),
        }
    }

    /// A store laid out like the site's comments and subscriptions tables
    pub fn for_site(tables: &TableConfig) -> Self {
        Self::new()
            .with_table(&tables.comments, TableSchema::new(ATTR_PHOTO_ID, Some(ATTR_SORT_KEY)))
            .with_index(
                &tables.comments,
                &tables.comments_by_id_index,
                TableSchema::new(ATTR_COMMENT_ID, None),
            )
            .with_table(&tables.subscriptions, TableSchema::new(ATTR_PHOTO_ID, Some(ATTR_EMAIL)))
    }

    pub fn with_table(mut self, name: &str, schema: TableSchema) -> Self {
        self.tables.get_mut().insert(
            name.to_string(),
            Table {
                schema,
                indexes: HashMap::new(),
                items: BTreeMap::new(),
            },
        );
        self
    }

    pub fn with_index(mut self, table: &str, index: &str, schema: TableSchema) -> Self {
        if let Some(t) = self.tables.get_mut().get_mut(table) {
            t.indexes.insert(index.to_string(), schema);
        }
        self
    }

    /// Caps the number of items (or counted items) per response
    pub fn with_max_page_items(mut self, max: usize) -> Self {
        self.max_page_items = Some(max.max(1));
        self
    }

    /// Makes every call fail with a store error, to exercise outage paths
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self, table: &str) -> usize {
        self.tables
            .lock()
            .await
            .get(table)
            .map(|t| t.items.len())
            .unwrap_or(0)
    }

    fn check_available(&self) -> Result<(), VowsError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(VowsError::Store("Store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn primary_key(schema: &TableSchema, item: &Item) -> Result<PrimaryKey, VowsError> {
        let partition = item
            .get(&schema.partition_key)
            .cloned()
            .ok_or_else(|| VowsError::Store(format!("Missing key attribute '{}'", schema.partition_key)))?;

        let sort = match &schema.sort_key {
            Some(attr) => Some(
                item.get(attr)
                    .cloned()
                    .ok_or_else(|| VowsError::Store(format!("Missing key attribute '{}'", attr)))?,
            ),
            None => None,
        };

        Ok((partition, sort))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of an item within a scan: index sort value, then primary key
type ScanPosition = (Option<AttrValue>, AttrValue, Option<AttrValue>);

fn scan_position(table: &TableSchema, index: &TableSchema, item: &Item) -> ScanPosition {
    let index_sort = index.sort_key.as_ref().and_then(|attr| item.get(attr).cloned());
    let partition = item
        .get(&table.partition_key)
        .cloned()
        .unwrap_or(AttrValue::S(String::new()));
    let sort = table.sort_key.as_ref().and_then(|attr| item.get(attr).cloned());
    (index_sort, partition, sort)
}

fn continuation_key(table: &TableSchema, index: &TableSchema, item: &Item) -> NativeKey {
    let mut attrs = vec![table.partition_key.clone(), index.partition_key.clone()];
    attrs.extend(table.sort_key.clone());
    attrs.extend(index.sort_key.clone());

    attrs
        .into_iter()
        .filter_map(|attr| item.get(&attr).map(|v| (attr, v.clone())))
        .collect()
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, VowsError> {
        self.check_available()?;

        let tables = self.tables.lock().await;
        let table = tables
            .get(&input.table)
            .ok_or_else(|| VowsError::Store(format!("Table not found: {}", input.table)))?;

        let index = match &input.index {
            Some(name) => table
                .indexes
                .get(name)
                .ok_or_else(|| VowsError::Store(format!("Index not found: {}", name)))?,
            None => &table.schema,
        };

        if index.partition_key != input.partition_attr {
            return Err(VowsError::Store(format!(
                "Query condition must use partition key '{}'",
                index.partition_key
            )));
        }

        let mut matching: Vec<(ScanPosition, &Item)> = table
            .items
            .values()
            .filter(|item| item.get(&index.partition_key) == Some(&input.partition_value))
            .filter(|item| index.sort_key.as_ref().is_none_or(|attr| item.contains_key(attr)))
            .map(|item| (scan_position(&table.schema, index, item), item))
            .collect();

        matching.sort_by(|a, b| a.0.cmp(&b.0));
        if !input.scan_forward {
            matching.reverse();
        }

        if let Some(start_key) = &input.start_key {
            let start = scan_position(&table.schema, index, start_key);
            matching.retain(|(position, _)| {
                if input.scan_forward {
                    *position > start
                } else {
                    *position < start
                }
            });
        }

        let mut take = input.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        if let Some(max) = self.max_page_items {
            take = take.min(max);
        }

        let window: Vec<&Item> = matching.iter().take(take).map(|(_, item)| *item).collect();
        let continuation_key = if matching.len() > window.len() {
            window
                .last()
                .map(|last| continuation_key(&table.schema, index, last))
        } else {
            None
        };

        Ok(QueryOutput {
            count: window.len() as u64,
            items: if input.count_only {
                Vec::new()
            } else {
                window.into_iter().cloned().collect()
            },
            continuation_key,
        })
    }

    async fn put_if_absent(
        &self,
        table: &str,
        item: Item,
        key_attr: &str,
    ) -> Result<PutOutcome, VowsError> {
        self.check_available()?;

        if !item.contains_key(key_attr) {
            return Err(VowsError::Store(format!(
                "Item is missing condition attribute '{}'",
                key_attr
            )));
        }

        let mut tables = self.tables.lock().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| VowsError::Store(format!("Table not found: {}", table)))?;

        let key = Self::primary_key(&table.schema, &item)?;
        if table.items.contains_key(&key) {
            return Ok(PutOutcome::AlreadyExists);
        }

        table.items.insert(key, item);
        Ok(PutOutcome::Created)
    }

    async fn delete_returning_old(
        &self,
        table: &str,
        key: Item,
    ) -> Result<Option<Item>, VowsError> {
        self.check_available()?;

        let mut tables = self.tables.lock().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| VowsError::Store(format!("Table not found: {}", table)))?;

        let key = Self::primary_key(&table.schema, &key)?;
        Ok(table.items.remove(&key))
    }
}
