//! Incremental feed cache.
//!
//! Holds the merged feed keyed by `(kind, row id)` and applies realtime row
//! changes one row at a time. Like counts go through an
//! [`OptimisticLayer`] so a tap shows immediately and a refused like is
//! undone exactly.

use std::collections::HashMap;

use uuid::Uuid;

use crate::client::offline::OptimisticLayer;
use crate::shared::{FeedItem, FeedKey, RowChange};

/// What applying a row change did to the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheUpdate {
    Inserted(FeedKey),
    Updated(FeedKey),
    Removed(FeedKey),
    /// Delete for a row the cache never held
    Ignored,
}

#[derive(Debug, Default)]
pub struct FeedCache {
    items: HashMap<FeedKey, FeedItem>,
    likes: OptimisticLayer<FeedKey, u32>,
}

impl FeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache with a fresh load
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = FeedItem>) {
        self.items.clear();
        self.likes = OptimisticLayer::new();
        for item in items {
            self.upsert(item);
        }
    }

    pub fn apply(&mut self, change: RowChange) -> CacheUpdate {
        match change {
            RowChange::Insert(record) | RowChange::Update(record) => {
                let item = record.into_item();
                let key = item.key();
                if self.upsert(item) {
                    CacheUpdate::Updated(key)
                } else {
                    CacheUpdate::Inserted(key)
                }
            }
            RowChange::Delete { kind, id } => {
                let key = (kind, id);
                if self.items.remove(&key).is_some() {
                    self.likes.remove_key(&key);
                    CacheUpdate::Removed(key)
                } else {
                    CacheUpdate::Ignored
                }
            }
        }
    }

    /// Insert or replace; returns whether the key was already cached
    fn upsert(&mut self, item: FeedItem) -> bool {
        let key = item.key();
        self.likes.set_confirmed(key.clone(), item.engagement.likes);
        self.items.insert(key, item).is_some()
    }

    /// Item with optimistic likes applied
    pub fn get(&self, key: &FeedKey) -> Option<FeedItem> {
        self.items.get(key).map(|item| self.with_likes(item))
    }

    /// All items, newest first
    pub fn items(&self) -> Vec<FeedItem> {
        let mut items: Vec<FeedItem> = self.items.values().map(|item| self.with_likes(item)).collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.key().cmp(&b.key())));
        items
    }

    fn with_likes(&self, item: &FeedItem) -> FeedItem {
        let mut item = item.clone();
        if let Some(likes) = self.likes.current(&item.key()) {
            item.engagement.likes = *likes;
        }
        item
    }

    /// Count a like before the server confirms it
    pub fn like(&mut self, key: &FeedKey) -> Option<Uuid> {
        self.items.get(key)?;
        let likes = self.likes.current(key).copied().unwrap_or(0);
        Some(self.likes.apply(key.clone(), likes.saturating_add(1)))
    }

    pub fn confirm_like(&mut self, update_id: &Uuid, server_likes: u32) -> bool {
        self.likes.confirm(update_id, server_likes)
    }

    pub fn rollback_like(&mut self, update_id: &Uuid) -> bool {
        self.likes.rollback(update_id).is_some()
    }

    pub fn pending_likes(&self) -> usize {
        self.likes.pending_count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
