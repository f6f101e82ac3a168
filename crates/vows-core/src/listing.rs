/// Comment listing over the photo partition
///
/// Both addressing modes re-derive their window from the store's native
/// ordering on every call and compute `totalElements` with a full count scan.
use crate::constants::{ATTR_PHOTO_ID, ATTR_SORT_KEY};
use crate::cursor;
use crate::error::VowsError;
use crate::models::{AttrValue, Comment, CommentPage, NativeKey, PageRequest, total_pages};
use crate::services::store::{KeyValueStore, QueryInput, count_all};
use crate::utils::validate_photo_id;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CommentLister {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

struct Window {
    elements: Vec<Comment>,
    has_more: bool,
    cursor: Option<String>,
}

impl CommentLister {
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub async fn list(&self, photo_id: &str, request: &PageRequest) -> Result<CommentPage, VowsError> {
        validate_photo_id(photo_id)?;

        let base = QueryInput::builder()
            .table(self.table.as_str())
            .partition_attr(ATTR_PHOTO_ID)
            .partition_value(photo_id)
            .scan_forward(request.order().scan_forward())
            .build();

        let window = match request {
            PageRequest::Indexed {
                page_index,
                page_size,
                ..
            } => self.walk_to_page(&base, *page_index, *page_size).await?,
            PageRequest::Cursor { cursor, limit, .. } => {
                let start_key = start_key_for(photo_id, cursor.as_deref());
                self.page_from_cursor(&base, start_key, *limit).await?
            }
        };

        let total_elements = count_all(self.store.as_ref(), base).await?;
        let page_size = request.page_size();

        let (has_next, page_index) = match request {
            PageRequest::Indexed { page_index, .. } => (
                window.has_more && (*page_index as u64) * (page_size as u64) < total_elements,
                Some(*page_index),
            ),
            PageRequest::Cursor { .. } => (window.has_more, None),
        };

        debug!(
            photo_id = %photo_id,
            returned = window.elements.len(),
            total_elements,
            has_next,
            "Listed comments"
        );

        Ok(CommentPage {
            elements: window.elements,
            has_next,
            total_elements,
            total_pages_count: total_pages(total_elements, page_size),
            cursor: window.cursor,
            page_index,
        })
    }

    /// Legacy page-index walk: issues `page_index` bounded queries, following
    /// continuation keys from the start of the partition
    async fn walk_to_page(
        &self,
        base: &QueryInput,
        page_index: u32,
        page_size: u32,
    ) -> Result<Window, VowsError> {
        let mut start_key = None;

        for step in 1..=page_index {
            let page = self
                .store
                .query(QueryInput {
                    start_key: start_key.take(),
                    limit: Some(page_size),
                    ..base.clone()
                })
                .await?;

            if step == page_index {
                return Ok(Window {
                    elements: to_comments(&page.items)?,
                    has_more: page.continuation_key.is_some(),
                    cursor: None,
                });
            }

            match page.continuation_key {
                Some(key) if page.items.len() >= page_size as usize => start_key = Some(key),
                // Ran out before reaching the requested page
                _ => break,
            }
        }

        Ok(Window {
            elements: Vec::new(),
            has_more: false,
            cursor: None,
        })
    }

    async fn page_from_cursor(
        &self,
        base: &QueryInput,
        start_key: Option<NativeKey>,
        limit: u32,
    ) -> Result<Window, VowsError> {
        let page = self
            .store
            .query(QueryInput {
                start_key,
                limit: Some(limit),
                ..base.clone()
            })
            .await?;

        let next_cursor = cursor::encode(page.continuation_key.as_ref());

        Ok(Window {
            elements: to_comments(&page.items)?,
            has_more: next_cursor.is_some(),
            cursor: next_cursor,
        })
    }
}

/// Decodes a cursor into a start key for this photo's partition
///
/// Only a key made of exactly `photoId` (this photo) and a string `sortKey`
/// is accepted; anything else starts from the beginning.
fn start_key_for(photo_id: &str, cursor: Option<&str>) -> Option<NativeKey> {
    let key = cursor::decode(cursor)?;

    let belongs = key.len() == 2
        && key.get(ATTR_PHOTO_ID).and_then(AttrValue::as_s) == Some(photo_id)
        && matches!(key.get(ATTR_SORT_KEY), Some(AttrValue::S(_)));

    if belongs {
        Some(key)
    } else {
        warn!(photo_id = %photo_id, "Ignoring cursor that does not address this photo");
        None
    }
}

fn to_comments(items: &[crate::models::Item]) -> Result<Vec<Comment>, VowsError> {
    items.iter().map(Comment::from_item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortOrder;
    use crate::services::store::{InMemoryStore, PutOutcome, TableSchema};
    use chrono::{Duration, TimeZone, Utc};

    const TABLE: &str = "comments";

    fn memory_store() -> InMemoryStore {
        InMemoryStore::new().with_table(TABLE, TableSchema::new("photoId", Some("sortKey")))
    }

    fn comment(photo_id: &str, n: i64) -> Comment {
        Comment {
            photo_id: photo_id.to_string(),
            comment_id: format!("c-{}", n),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap() + Duration::minutes(n),
            author_name: "Guest".to_string(),
            content: format!("comment {}", n),
        }
    }

    async fn seed(store: InMemoryStore, count: i64) -> Arc<InMemoryStore> {
        for n in 1..=count {
            let outcome = store
                .put_if_absent(TABLE, comment("p1", n).to_item(), "sortKey")
                .await
                .unwrap();
            assert_eq!(outcome, PutOutcome::Created);
        }
        store
            .put_if_absent(TABLE, comment("other", 1).to_item(), "sortKey")
            .await
            .unwrap();
        Arc::new(store)
    }

    fn ids(page: &CommentPage) -> Vec<&str> {
        page.elements.iter().map(|c| c.comment_id.as_str()).collect()
    }

    fn indexed(page_index: u32, page_size: u32, order: SortOrder) -> PageRequest {
        PageRequest::Indexed {
            page_index,
            page_size,
            order,
        }
    }

    fn by_cursor(cursor: Option<String>, limit: u32, order: SortOrder) -> PageRequest {
        PageRequest::Cursor { cursor, limit, order }
    }

    #[tokio::test]
    async fn test_page_index_addressing() {
        let lister = CommentLister::new(seed(memory_store(), 3).await, TABLE);

        let first = lister.list("p1", &indexed(1, 2, SortOrder::Desc)).await.unwrap();
        assert_eq!(ids(&first), vec!["c-3", "c-2"]);
        assert!(first.has_next);
        assert_eq!(first.page_index, Some(1));
        assert_eq!(first.total_elements, 3);
        assert_eq!(first.total_pages_count, 2);
        assert_eq!(first.cursor, None);

        let second = lister.list("p1", &indexed(2, 2, SortOrder::Desc)).await.unwrap();
        assert_eq!(ids(&second), vec!["c-1"]);
        assert!(!second.has_next);
    }

    #[tokio::test]
    async fn test_page_index_past_the_end_is_empty() {
        let lister = CommentLister::new(seed(memory_store(), 3).await, TABLE);

        let page = lister.list("p1", &indexed(5, 2, SortOrder::Asc)).await.unwrap();
        assert!(page.elements.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.total_elements, 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_next_page() {
        let lister = CommentLister::new(seed(memory_store(), 4).await, TABLE);

        let page = lister.list("p1", &indexed(2, 2, SortOrder::Asc)).await.unwrap();
        assert_eq!(ids(&page), vec!["c-3", "c-4"]);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn test_cursor_addressing() {
        let lister = CommentLister::new(seed(memory_store(), 3).await, TABLE);

        let first = lister.list("p1", &by_cursor(None, 2, SortOrder::Desc)).await.unwrap();
        assert_eq!(ids(&first), vec!["c-3", "c-2"]);
        assert!(first.has_next);
        assert_eq!(first.page_index, None);
        let cursor = first.cursor.clone().unwrap();
        assert!(!cursor.is_empty());

        let second = lister
            .list("p1", &by_cursor(Some(cursor), 2, SortOrder::Desc))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["c-1"]);
        assert!(!second.has_next);
        assert_eq!(second.cursor, None);
    }

    #[tokio::test]
    async fn test_ascending_order() {
        let lister = CommentLister::new(seed(memory_store(), 3).await, TABLE);

        let page = lister.list("p1", &by_cursor(None, 10, SortOrder::Asc)).await.unwrap();
        assert_eq!(ids(&page), vec!["c-1", "c-2", "c-3"]);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn test_corrupted_cursor_starts_from_beginning() {
        let lister = CommentLister::new(seed(memory_store(), 3).await, TABLE);

        let page = lister
            .list("p1", &by_cursor(Some("not-base64-json".to_string()), 2, SortOrder::Desc))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["c-3", "c-2"]);
    }

    #[tokio::test]
    async fn test_cursor_from_another_photo_starts_from_beginning() {
        let store = seed(memory_store(), 3).await;
        store
            .put_if_absent(TABLE, comment("other", 2).to_item(), "sortKey")
            .await
            .unwrap();
        let lister = CommentLister::new(store, TABLE);

        let other = lister.list("other", &by_cursor(None, 1, SortOrder::Desc)).await.unwrap();
        let foreign = other.cursor.unwrap();

        let page = lister
            .list("p1", &by_cursor(Some(foreign), 2, SortOrder::Desc))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["c-3", "c-2"]);
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn test_tampered_cursor_starts_from_beginning() {
        let lister = CommentLister::new(seed(memory_store(), 3).await, TABLE);

        let mut tampered = NativeKey::new();
        tampered.insert("foo".to_string(), AttrValue::S("zzz".to_string()));
        let mut wrong_type = NativeKey::new();
        wrong_type.insert(ATTR_PHOTO_ID.to_string(), AttrValue::S("p1".to_string()));
        wrong_type.insert(ATTR_SORT_KEY.to_string(), AttrValue::N("7".to_string()));

        for key in [tampered, wrong_type] {
            let cursor = cursor::encode(Some(&key));
            let page = lister
                .list("p1", &by_cursor(cursor, 2, SortOrder::Desc))
                .await
                .unwrap();
            assert_eq!(ids(&page), vec!["c-3", "c-2"]);
            assert!(page.has_next);
        }
    }

    #[tokio::test]
    async fn test_short_intermediate_page_ends_the_walk() {
        // The first step comes back with a continuation key but only one item
        let lister = CommentLister::new(seed(memory_store().with_max_page_items(1), 3).await, TABLE);

        let page = lister.list("p1", &indexed(2, 2, SortOrder::Desc)).await.unwrap();
        assert!(page.elements.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.total_elements, 3);
    }

    #[tokio::test]
    async fn test_identical_timestamps_tie_break_on_id() {
        let store = memory_store();
        for id in ["b", "a", "c"] {
            let mut c = comment("p1", 1);
            c.comment_id = id.to_string();
            store.put_if_absent(TABLE, c.to_item(), "sortKey").await.unwrap();
        }
        let lister = CommentLister::new(Arc::new(store), TABLE);

        let page = lister.list("p1", &by_cursor(None, 10, SortOrder::Asc)).await.unwrap();
        assert_eq!(ids(&page), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_count_is_independent_of_page_size() {
        let lister = CommentLister::new(seed(memory_store(), 7).await, TABLE);

        for size in [1, 2, 3, 7, 100] {
            let page = lister.list("p1", &by_cursor(None, size, SortOrder::Desc)).await.unwrap();
            assert_eq!(page.total_elements, 7);
            assert_eq!(page.total_pages_count, 7u64.div_ceil(size as u64));
        }
    }

    #[tokio::test]
    async fn test_count_aggregates_truncated_scans() {
        // Every store response holds at most 2 items, so the count needs 4 scans
        let lister = CommentLister::new(seed(memory_store().with_max_page_items(2), 7).await, TABLE);

        let page = lister.list("p1", &by_cursor(None, 2, SortOrder::Asc)).await.unwrap();
        assert_eq!(page.total_elements, 7);
        assert_eq!(page.total_pages_count, 4);
    }

    #[tokio::test]
    async fn test_empty_partition() {
        let lister = CommentLister::new(Arc::new(memory_store()), TABLE);

        let page = lister.list("p1", &indexed(1, 20, SortOrder::Desc)).await.unwrap();
        assert!(page.elements.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.total_elements, 0);
        assert_eq!(page.total_pages_count, 0);
    }

    #[tokio::test]
    async fn test_invalid_photo_id() {
        let lister = CommentLister::new(Arc::new(memory_store()), TABLE);
        assert!(matches!(
            lister.list("", &by_cursor(None, 2, SortOrder::Desc)).await,
            Err(VowsError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_store_unavailable_propagates() {
        let store = Arc::new(memory_store());
        store.set_unavailable(true);
        let lister = CommentLister::new(store, TABLE);

        assert!(matches!(
            lister.list("p1", &by_cursor(None, 2, SortOrder::Desc)).await,
            Err(VowsError::Store(_))
        ));
    }
}
