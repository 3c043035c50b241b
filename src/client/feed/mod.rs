//! # Event Feed
//!
//! The community feed merges three server tables (video posts, events, DJ
//! events) into one newest-first list of [`FeedItem`]s.
//!
//! - [`FeedSource`]: fetches the raw tables ([`HttpFeedSource`] talks to
//!   the API server)
//! - [`EventFeedAdapter`]: loads all three concurrently and normalizes them
//! - [`FeedCache`]: the merged feed, updated one row at a time
//! - [`RealtimeFeed`]: a cache fed by a stream of [`RowChange`]s
//!
//! A realtime change touches exactly the row it names; the feed is never
//! reloaded wholesale because one row changed.

pub mod cache;

pub use cache::{CacheUpdate, FeedCache};

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join3;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::config::Config;
use crate::client::error::ApiError;
use crate::shared::{DjEventRow, EventRow, FeedItem, FeedItemKind, FeedKey, RowChange, VideoPostRow};

/// Raw access to the feed tables
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn video_posts(&self, limit: usize) -> Result<Vec<VideoPostRow>, ApiError>;
    async fn events(&self, limit: usize) -> Result<Vec<EventRow>, ApiError>;
    async fn dj_events(&self, limit: usize) -> Result<Vec<DjEventRow>, ApiError>;
}

/// [`FeedSource`] backed by `GET /api/feed/{table}?limit=`
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    config: Config,
}

impl HttpFeedSource {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.app().request_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    async fn fetch<T: DeserializeOwned>(&self, kind: FeedItemKind, limit: usize) -> Result<Vec<T>, ApiError> {
        let url = self.config.api_url(&format!("/api/feed/{}", kind.table()));
        let mut request = self.client.get(&url).query(&[("limit", limit)]);
        if let Some(token) = self.config.get_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(e)
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn video_posts(&self, limit: usize) -> Result<Vec<VideoPostRow>, ApiError> {
        self.fetch(FeedItemKind::VideoPost, limit).await
    }

    async fn events(&self, limit: usize) -> Result<Vec<EventRow>, ApiError> {
        self.fetch(FeedItemKind::Event, limit).await
    }

    async fn dj_events(&self, limit: usize) -> Result<Vec<DjEventRow>, ApiError> {
        self.fetch(FeedItemKind::DjEvent, limit).await
    }
}

/// Loads and normalizes the merged feed
#[derive(Clone)]
pub struct EventFeedAdapter {
    source: Arc<dyn FeedSource>,
}

impl EventFeedAdapter {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    /// Fetch the three tables concurrently; newest first, at most `limit`
    /// items, each `(kind, id)` once
    pub async fn load(&self, limit: usize) -> Result<Vec<FeedItem>, ApiError> {
        let (videos, events, dj_events) = try_join3(
            self.source.video_posts(limit),
            self.source.events(limit),
            self.source.dj_events(limit),
        )
        .await?;
        tracing::debug!(
            "Loaded feed: {} video posts, {} events, {} DJ events",
            videos.len(),
            events.len(),
            dj_events.len()
        );

        let mut items: Vec<FeedItem> = videos
            .into_iter()
            .map(FeedItem::from)
            .chain(events.into_iter().map(FeedItem::from))
            .chain(dj_events.into_iter().map(FeedItem::from))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut seen: HashSet<FeedKey> = HashSet::new();
        items.retain(|item| seen.insert(item.key()));
        items.truncate(limit);
        Ok(items)
    }
}

/// Feed cache kept current by realtime row changes
#[derive(Clone)]
pub struct RealtimeFeed {
    adapter: EventFeedAdapter,
    cache: Arc<RwLock<FeedCache>>,
    version: Arc<watch::Sender<u64>>,
}

impl RealtimeFeed {
    pub fn new(adapter: EventFeedAdapter) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            adapter,
            cache: Arc::new(RwLock::new(FeedCache::new())),
            version: Arc::new(version),
        }
    }

    /// Receiver that wakes whenever the cached feed changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    /// Full load, replacing the cache
    pub async fn refresh(&self, limit: usize) -> Result<usize, ApiError> {
        let items = self.adapter.load(limit).await?;
        let count = items.len();
        self.cache.write().await.replace_all(items);
        self.bump();
        Ok(count)
    }

    pub async fn apply(&self, change: RowChange) -> CacheUpdate {
        let update = self.cache.write().await.apply(change);
        if update != CacheUpdate::Ignored {
            self.bump();
        }
        update
    }

    /// Apply every change from `changes` until the stream ends
    ///
    /// The task resolves to the number of changes that touched the cache.
    pub fn follow<S>(&self, changes: S) -> JoinHandle<usize>
    where
        S: Stream<Item = RowChange> + Send + 'static,
    {
        let feed = self.clone();
        tokio::spawn(async move {
            let mut changes = Box::pin(changes);
            let mut applied = 0;
            while let Some(change) = changes.next().await {
                match feed.apply(change).await {
                    CacheUpdate::Ignored => tracing::trace!("Ignored change for an uncached row"),
                    update => {
                        tracing::debug!("Feed change applied: {:?}", update);
                        applied += 1;
                    }
                }
            }
            tracing::debug!("Feed change stream ended after {} change(s)", applied);
            applied
        })
    }

    /// Current feed, newest first
    pub async fn items(&self) -> Vec<FeedItem> {
        self.cache.read().await.items()
    }

    pub async fn like(&self, key: &FeedKey) -> Option<Uuid> {
        let id = self.cache.write().await.like(key);
        if id.is_some() {
            self.bump();
        }
        id
    }

    pub async fn confirm_like(&self, update_id: &Uuid, server_likes: u32) -> bool {
        let confirmed = self.cache.write().await.confirm_like(update_id, server_likes);
        if confirmed {
            self.bump();
        }
        confirmed
    }

    pub async fn rollback_like(&self, update_id: &Uuid) -> bool {
        let rolled_back = self.cache.write().await.rollback_like(update_id);
        if rolled_back {
            self.bump();
        }
        rolled_back
    }
}
