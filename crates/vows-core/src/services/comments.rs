/// Photo comment service: creation and listing, plus lookup by id
use crate::config::{SiteConfig, TableConfig};
use crate::constants::{ATTR_COMMENT_ID, ATTR_SORT_KEY};
use crate::error::VowsError;
use crate::listing::CommentLister;
use crate::models::{Comment, CommentCreated, CommentPage, NewComment, PageRequest};
use crate::services::messaging::{MessagePublisher, PublishOutcome, publish_best_effort};
use crate::services::store::{KeyValueStore, PutOutcome, QueryInput};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct CommentService {
    store: Arc<dyn KeyValueStore>,
    publisher: Arc<dyn MessagePublisher>,
    lister: CommentLister,
    tables: TableConfig,
    topic: String,
}

impl CommentService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        publisher: Arc<dyn MessagePublisher>,
        config: &SiteConfig,
    ) -> Self {
        Self {
            lister: CommentLister::new(store.clone(), config.tables.comments.as_str()),
            store,
            publisher,
            tables: config.tables.clone(),
            topic: config.comment_topic_arn.clone(),
        }
    }

    pub async fn create(&self, comment: NewComment) -> Result<Comment, VowsError> {
        self.create_with(comment, Uuid::new_v4().to_string(), Utc::now())
            .await
    }

    /// Stores a comment with a caller-chosen id and timestamp
    ///
    /// The write is conditional on the sort key, so two writers that produce
    /// the same `createdAt#commentId` cannot both succeed.
    pub async fn create_with(
        &self,
        comment: NewComment,
        comment_id: String,
        created_at: DateTime<Utc>,
    ) -> Result<Comment, VowsError> {
        let comment = Comment {
            photo_id: comment.photo_id,
            comment_id,
            created_at: created_at.trunc_subsecs(3),
            author_name: comment.author_name,
            content: comment.content,
        };

        match self
            .store
            .put_if_absent(&self.tables.comments, comment.to_item(), ATTR_SORT_KEY)
            .await?
        {
            PutOutcome::Created => {}
            PutOutcome::AlreadyExists => {
                return Err(VowsError::Store(format!(
                    "Comment sort key collision: {}",
                    comment.sort_key()
                )));
            }
        }

        info!(
            photo_id = %comment.photo_id,
            comment_id = %comment.comment_id,
            "Comment stored"
        );

        let event = CommentCreated {
            photo_id: comment.photo_id.clone(),
            comment_id: comment.comment_id.clone(),
        };
        if let PublishOutcome::Dropped { reason } =
            publish_best_effort(self.publisher.as_ref(), &self.topic, &event).await
        {
            warn!(
                comment_id = %comment.comment_id,
                reason = %reason,
                "Comment stored without notification"
            );
        }

        Ok(comment)
    }

    pub async fn list(&self, photo_id: &str, request: &PageRequest) -> Result<CommentPage, VowsError> {
        self.lister.list(photo_id, request).await
    }
}

/// Looks a comment up through the `commentId` secondary index
pub async fn find_comment(
    store: &dyn KeyValueStore,
    tables: &TableConfig,
    comment_id: &str,
) -> Result<Option<Comment>, VowsError> {
    let input = QueryInput::builder()
        .table(tables.comments.as_str())
        .index(tables.comments_by_id_index.as_str())
        .partition_attr(ATTR_COMMENT_ID)
        .partition_value(comment_id)
        .limit(1)
        .build();

    let output = store.query(input).await?;
    output.items.first().map(Comment::from_item).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::base_env;
    use crate::models::SortOrder;
    use crate::services::messaging::{InMemoryPublisher, MockMessagePublisher};
    use crate::services::store::InMemoryStore;
    use chrono::TimeZone;

    fn config() -> SiteConfig {
        let env = base_env();
        SiteConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap()
    }

    fn new_comment() -> NewComment {
        NewComment {
            photo_id: "first-dance".to_string(),
            author_name: "Grandma".to_string(),
            content: "Lovely!".to_string(),
        }
    }

    fn service(publisher: Arc<dyn MessagePublisher>) -> (CommentService, Arc<InMemoryStore>) {
        let config = config();
        let store = Arc::new(InMemoryStore::for_site(&config.tables));
        (CommentService::new(store.clone(), publisher, &config), store)
    }

    #[tokio::test]
    async fn test_create_stores_and_publishes() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let (service, store) = service(publisher.clone());

        let comment = service.create(new_comment()).await.unwrap();
        assert_eq!(comment.photo_id, "first-dance");
        assert!(Uuid::parse_str(&comment.comment_id).is_ok());
        assert_eq!(store.len("wedding-comments").await, 1);

        let published = publisher.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "arn:aws:sns:us-east-1:123:comments");
        let event: CommentCreated = serde_json::from_str(&published[0].1).unwrap();
        assert_eq!(event.comment_id, comment.comment_id);

        let tables = config().tables;
        let found = find_comment(store.as_ref(), &tables, &comment.comment_id).await.unwrap();
        assert_eq!(found, Some(comment));
        assert_eq!(find_comment(store.as_ref(), &tables, "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sort_key_collision_rejects_second_write() {
        let (service, store) = service(Arc::new(InMemoryPublisher::new()));
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 18, 30, 0).unwrap();

        let (first, second) = tokio::join!(
            service.create_with(new_comment(), "same-id".to_string(), at),
            service.create_with(new_comment(), "same-id".to_string(), at),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(VowsError::Store(msg)) if msg.contains("collision")))
        );
        assert_eq!(store.len("wedding-comments").await, 1);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_create() {
        let mut publisher = MockMessagePublisher::new();
        publisher
            .expect_publish()
            .returning(|_, _| Err(VowsError::Messaging("SNS down".to_string())));
        let (service, store) = service(Arc::new(publisher));

        assert!(service.create(new_comment()).await.is_ok());
        assert_eq!(store.len("wedding-comments").await, 1);
    }

    #[tokio::test]
    async fn test_store_failure_skips_publish() {
        let mut publisher = MockMessagePublisher::new();
        publisher.expect_publish().never();
        let (service, store) = service(Arc::new(publisher));
        store.set_unavailable(true);

        assert!(matches!(
            service.create(new_comment()).await,
            Err(VowsError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_created_comments_are_listed_newest_first() {
        let (service, _) = service(Arc::new(InMemoryPublisher::new()));
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();

        for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
            service
                .create_with(new_comment(), id.to_string(), base + chrono::Duration::seconds(i as i64))
                .await
                .unwrap();
        }

        let page = service
            .list(
                "first-dance",
                &PageRequest::Cursor {
                    cursor: None,
                    limit: 20,
                    order: SortOrder::Desc,
                },
            )
            .await
            .unwrap();
        let ids: Vec<_> = page.elements.iter().map(|c| c.comment_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(page.total_elements, 3);
    }
}
