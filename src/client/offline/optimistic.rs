//! # Optimistic Updates
//!
//! Show a change before the server confirms it, and undo it exactly if the
//! server refuses.
//!
//! [`OptimisticLayer`] keeps the confirmed server value per key plus a stack
//! of pending changes. Each change stores the value it replaced, so a
//! rollback restores that value directly instead of re-deriving state.
//! Stacks stay linked: the oldest pending change always replaced the
//! confirmed value, and every later change replaced the one below it.
//!
//! ## Usage
//!
//! ```rust
//! use wolfpack_sync::client::offline::OptimisticLayer;
//!
//! let mut likes: OptimisticLayer<&str, u64> = OptimisticLayer::new();
//! likes.set_confirmed("post-1", 10);
//!
//! let first = likes.apply("post-1", 11);
//! let second = likes.apply("post-1", 12);
//!
//! // The first like failed; the second still shows on top of the restored value.
//! likes.rollback(&first);
//! assert_eq!(likes.current(&"post-1"), Some(&12));
//!
//! likes.confirm(&second, 11);
//! assert_eq!(likes.current(&"post-1"), Some(&11));
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One not-yet-confirmed change
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange<V> {
    pub id: Uuid,
    /// Value shown while the change is pending
    pub value: V,
    /// Value this change replaced; `None` if the key had no value
    pub previous: Option<V>,
    pub applied_at: DateTime<Utc>,
}

/// Confirmed values plus per-key stacks of pending changes
#[derive(Debug, Clone)]
pub struct OptimisticLayer<K, V> {
    confirmed: HashMap<K, V>,
    pending: HashMap<K, Vec<PendingChange<V>>>,
    index: HashMap<Uuid, K>,
}

impl<K, V> Default for OptimisticLayer<K, V> {
    fn default() -> Self {
        Self {
            confirmed: HashMap::new(),
            pending: HashMap::new(),
            index: HashMap::new(),
        }
    }
}

impl<K, V> OptimisticLayer<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Value to display: the newest pending change, else the confirmed value
    pub fn current(&self, key: &K) -> Option<&V> {
        self.pending
            .get(key)
            .and_then(|stack| stack.last())
            .map(|change| &change.value)
            .or_else(|| self.confirmed.get(key))
    }

    pub fn confirmed(&self, key: &K) -> Option<&V> {
        self.confirmed.get(key)
    }

    /// Record a server value that did not come from one of our changes
    pub fn set_confirmed(&mut self, key: K, value: V) {
        if let Some(bottom) = self.pending.get_mut(&key).and_then(|stack| stack.first_mut()) {
            bottom.previous = Some(value.clone());
        }
        self.confirmed.insert(key, value);
    }

    /// Forget a key entirely, pending changes included
    pub fn remove_key(&mut self, key: &K) {
        self.confirmed.remove(key);
        if let Some(stack) = self.pending.remove(key) {
            for change in stack {
                self.index.remove(&change.id);
            }
        }
    }

    /// Show `value` for `key` until confirmed or rolled back
    pub fn apply(&mut self, key: K, value: V) -> Uuid {
        let id = Uuid::new_v4();
        let previous = self.current(&key).cloned();
        self.pending.entry(key.clone()).or_default().push(PendingChange {
            id,
            value,
            previous,
            applied_at: Utc::now(),
        });
        self.index.insert(id, key);
        id
    }

    /// The server accepted the change
    ///
    /// Changes below it in the stack are confirmed with it, since the server
    /// applies a key's changes in order. Returns `false` for an unknown id.
    pub fn confirm(&mut self, update_id: &Uuid, server_value: V) -> bool {
        let Some(key) = self.index.remove(update_id) else {
            return false;
        };
        if let Some(stack) = self.pending.get_mut(&key) {
            if let Some(pos) = stack.iter().position(|change| change.id == *update_id) {
                for settled in stack.drain(..=pos) {
                    self.index.remove(&settled.id);
                }
                if let Some(next) = stack.first_mut() {
                    next.previous = Some(server_value.clone());
                }
            }
            if stack.is_empty() {
                self.pending.remove(&key);
            }
        }
        self.confirmed.insert(key, server_value);
        true
    }

    /// The server refused the change; restore what it replaced
    ///
    /// The change above it, if any, is re-linked onto the restored value.
    /// Returns the removed change.
    pub fn rollback(&mut self, update_id: &Uuid) -> Option<PendingChange<V>> {
        let key = self.index.remove(update_id)?;
        let stack = self.pending.get_mut(&key)?;
        let pos = stack.iter().position(|change| change.id == *update_id)?;
        let removed = stack.remove(pos);
        if let Some(above) = stack.get_mut(pos) {
            above.previous = removed.previous.clone();
        }
        if stack.is_empty() {
            self.pending.remove(&key);
        }
        Some(removed)
    }

    pub fn is_pending(&self, update_id: &Uuid) -> bool {
        self.index.contains_key(update_id)
    }

    /// Number of unconfirmed changes across all keys
    pub fn pending_count(&self) -> usize {
        self.index.len()
    }

    pub fn pending_for(&self, key: &K) -> &[PendingChange<V>] {
        self.pending.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
