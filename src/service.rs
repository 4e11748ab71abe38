use crate::sentiment::SentimentClassifier;
use crate::storage::{Review, ReviewStore, StoreError};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::info;

/// Classifies and persists reviews, and reads them back.
///
/// Store calls run on the blocking thread pool.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<ReviewStore>,
    classifier: Arc<SentimentClassifier>,
}

impl ReviewService {
    pub fn new(store: Arc<ReviewStore>, classifier: SentimentClassifier) -> Self {
        Self {
            store,
            classifier: Arc::new(classifier),
        }
    }

    /// Classify `text`, stamp it with the current UTC time and store it.
    /// Any text is accepted, including an empty one.
    pub async fn create(&self, text: String) -> Result<Review, StoreError> {
        let sentiment = self.classifier.classify(&text);
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let store = self.store.clone();
        let review = tokio::task::spawn_blocking(move || {
            let id = store.insert(&text, sentiment, &created_at)?;
            Ok::<_, StoreError>(Review {
                id,
                text,
                sentiment,
                created_at,
            })
        })
        .await??;

        info!(id = review.id, sentiment = %review.sentiment, "Review stored");
        Ok(review)
    }

    /// Reviews in insertion order. The filter is passed to the store as-is.
    pub async fn query(&self, sentiment: Option<String>) -> Result<Vec<Review>, StoreError> {
        let store = self.store.clone();
        let reviews =
            tokio::task::spawn_blocking(move || store.list(sentiment.as_deref())).await??;
        Ok(reviews)
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.count()).await?
    }
}
