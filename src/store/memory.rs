/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! In-memory [`RemoteStore`] used by tests and demos.
//!
//! Behaves like a tiny remote database: optional simulated latency,
//! injectable failures, and per-operation call counters so tests can
//! assert that the engine never re-issues a fetch.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::store::Item;
use crate::store::NodeId;
use crate::store::RemoteStore;

/// Number of calls the store has served, per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `load_root` calls served.
    pub load_root: usize,
    /// `load_children` calls served.
    pub load_children: usize,
    /// `update_content` calls served.
    pub update_content: usize,
    /// `add_child` calls served.
    pub add_child: usize,
}

/// Mutable state behind the store's lock.
#[derive(Debug, Default)]
struct Inner {
    /// Rows keyed by id. `BTreeMap` keeps sibling order deterministic
    /// (insertion ids are monotonic).
    rows: BTreeMap<NodeId, Item>,
    /// Next id handed out by `add_child`.
    next_id: u64,
    /// When set, every operation fails with this message.
    fail: Option<String>,
    /// Served-call accounting.
    calls: CallCounts,
}

/// In-memory mock of the remote data source.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    latency: Duration,
}

impl MemoryStore {
    /// An empty store with no latency.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with the canonical sample dataset:
    /// `1:"one"` at the root, `2:"two"` and `3:"three"` under 1,
    /// `4:"four"` under 2.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.insert(Item {
            id: NodeId::new(1),
            content: "one".to_string(),
            parent: None,
        });
        store.insert(Item {
            id: NodeId::new(2),
            content: "two".to_string(),
            parent: Some(NodeId::new(1)),
        });
        store.insert(Item {
            id: NodeId::new(3),
            content: "three".to_string(),
            parent: Some(NodeId::new(1)),
        });
        store.insert(Item {
            id: NodeId::new(4),
            content: "four".to_string(),
            parent: Some(NodeId::new(2)),
        });
        store
    }

    /// Add simulated per-operation latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Insert (or replace) a row directly, bypassing latency, failure
    /// mode, and counters.
    pub fn insert(&self, item: Item) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.next_id = inner.next_id.max(item.id.raw() + 1);
        inner.rows.insert(item.id, item);
    }

    /// Make every subsequent operation fail with `msg` until
    /// [`Self::clear_failure`] is called.
    pub fn fail_with(&self, msg: impl Into<String>) {
        self.inner.lock().expect("store lock poisoned").fail = Some(msg.into());
    }

    /// Clear an injected failure.
    pub fn clear_failure(&self) {
        self.inner.lock().expect("store lock poisoned").fail = None;
    }

    /// Snapshot of the per-operation call counters.
    pub fn calls(&self) -> CallCounts {
        self.inner.lock().expect("store lock poisoned").calls
    }

    /// Current content of a row, if present. Test convenience.
    pub fn content_of(&self, id: NodeId) -> Option<String> {
        let inner = self.inner.lock().expect("store lock poisoned");
        inner.rows.get(&id).map(|item| item.content.clone())
    }

    /// Simulate network latency, then run `op` under the lock.
    async fn serve<T>(
        &self,
        op: impl FnOnce(&mut Inner) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if let Some(msg) = &inner.fail {
            return Err(StoreError::Remote(msg.clone()));
        }
        op(&mut inner)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn load_root(&self) -> Result<Vec<Item>, StoreError> {
        self.serve(|inner| {
            inner.calls.load_root += 1;
            Ok(inner
                .rows
                .values()
                .filter(|item| item.parent.is_none())
                .cloned()
                .collect())
        })
        .await
    }

    async fn load_children(&self, parent: NodeId) -> Result<Vec<Item>, StoreError> {
        self.serve(|inner| {
            inner.calls.load_children += 1;
            Ok(inner
                .rows
                .values()
                .filter(|item| item.parent == Some(parent))
                .cloned()
                .collect())
        })
        .await
    }

    async fn update_content(&self, id: NodeId, content: String) -> Result<String, StoreError> {
        self.serve(|inner| {
            inner.calls.update_content += 1;
            let item = inner
                .rows
                .get_mut(&id)
                .ok_or(StoreError::ItemNotFound(id))?;
            item.content = content.clone();
            Ok(content)
        })
        .await
    }

    async fn add_child(&self, parent: Option<NodeId>) -> Result<Item, StoreError> {
        self.serve(|inner| {
            inner.calls.add_child += 1;
            if let Some(parent) = parent {
                if !inner.rows.contains_key(&parent) {
                    return Err(StoreError::ItemNotFound(parent));
                }
            }
            let id = NodeId::new(inner.next_id);
            inner.next_id += 1;
            let item = Item {
                id,
                content: String::new(),
                parent,
            };
            inner.rows.insert(id, item.clone());
            Ok(item)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_dataset_is_reachable_by_parent() {
        let store = MemoryStore::seeded();

        let root = store.load_root().await.expect("load_root");
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].id, NodeId::new(1));
        assert_eq!(root[0].content, "one");

        let children = store.load_children(NodeId::new(1)).await.expect("children");
        let ids: Vec<_> = children.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![NodeId::new(2), NodeId::new(3)]);

        let grandchildren = store.load_children(NodeId::new(2)).await.expect("children");
        assert_eq!(grandchildren.len(), 1);
        assert_eq!(grandchildren[0].content, "four");
    }

    #[tokio::test]
    async fn update_content_confirms_new_value() {
        let store = MemoryStore::seeded();
        let confirmed = store
            .update_content(NodeId::new(2), "changed".to_string())
            .await
            .expect("update");
        assert_eq!(confirmed, "changed");
        assert_eq!(store.content_of(NodeId::new(2)), Some("changed".to_string()));
    }

    #[tokio::test]
    async fn update_content_unknown_id_fails() {
        let store = MemoryStore::seeded();
        let err = store
            .update_content(NodeId::new(99), "x".to_string())
            .await
            .expect_err("missing id");
        assert_eq!(err, StoreError::ItemNotFound(NodeId::new(99)));
    }

    #[tokio::test]
    async fn add_child_assigns_fresh_monotonic_ids() {
        let store = MemoryStore::seeded();
        let first = store.add_child(Some(NodeId::new(1))).await.expect("add");
        let second = store.add_child(None).await.expect("add");
        assert_eq!(first.id, NodeId::new(5));
        assert_eq!(second.id, NodeId::new(6));
        assert_eq!(first.parent, Some(NodeId::new(1)));
        assert_eq!(second.parent, None);
    }

    #[tokio::test]
    async fn add_child_unknown_parent_fails() {
        let store = MemoryStore::seeded();
        let err = store
            .add_child(Some(NodeId::new(99)))
            .await
            .expect_err("missing parent");
        assert_eq!(err, StoreError::ItemNotFound(NodeId::new(99)));
    }

    #[tokio::test]
    async fn injected_failure_rejects_every_operation() {
        let store = MemoryStore::seeded();
        store.fail_with("backend down");
        let err = store.load_root().await.expect_err("should fail");
        assert_eq!(err, StoreError::Remote("backend down".to_string()));

        store.clear_failure();
        assert!(store.load_root().await.is_ok());
    }

    #[tokio::test]
    async fn call_counters_track_served_operations() {
        let store = MemoryStore::seeded();
        let _ = store.load_root().await;
        let _ = store.load_children(NodeId::new(1)).await;
        let _ = store.load_children(NodeId::new(2)).await;
        let counts = store.calls();
        assert_eq!(counts.load_root, 1);
        assert_eq!(counts.load_children, 2);
        assert_eq!(counts.update_content, 0);
    }
}
