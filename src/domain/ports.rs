use crate::domain::model::{Contest, Message, SeenSet};
use crate::utils::error::{DeliveryError, FetchError, LoadError, SaveError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of contest records (normally the HTTP feed).
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Contest>, FetchError>;
}

/// Persistence for the set of already-announced contests.
pub trait SeenStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<SeenSet, LoadError>> + Send;
    fn save(
        &self,
        state: &SeenSet,
    ) -> impl std::future::Future<Output = Result<(), SaveError>> + Send;
}

/// Outbound chat channel.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait ConfigProvider: Send + Sync {
    fn feed_url(&self) -> &str;
    fn update_interval(&self) -> std::time::Duration;
    fn max_contests(&self) -> usize;
    fn command_prefix(&self) -> &str;
    fn display_offset(&self) -> chrono::FixedOffset;
}

#[async_trait]
impl<T: FeedSource + ?Sized> FeedSource for std::sync::Arc<T> {
    async fn fetch(&self) -> Result<Vec<Contest>, FetchError> {
        (**self).fetch().await
    }
}

#[async_trait]
impl<T: Channel + ?Sized> Channel for std::sync::Arc<T> {
    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        (**self).deliver(message).await
    }
}
