/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The Remote Store contract: the asynchronous data source the tree is
//! a lazy view of.
//!
//! Every call is single-shot: no pagination, no retries, no timeouts.
//! A call that fails settles as [`StoreError`] in the one loadable
//! that wrapped it; re-issuing the same mutation is the caller's
//! decision.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::StoreError;

pub mod memory;

/// Identity of one stored item, assigned by the store at creation and
/// stable for the item's lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(u64);

impl NodeId {
    /// Construct an id from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value of this id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// One row of the remote dataset as the store reports it.
///
/// `parent: None` marks a top-level item (child of the implicit root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identity.
    pub id: NodeId,
    /// Current text content.
    pub content: String,
    /// Owning parent, or `None` for top-level items.
    pub parent: Option<NodeId>,
}

/// Asynchronous remote data source.
///
/// Implementations are shared behind an `Arc` so in-flight operation
/// tasks can hold the store across awaits.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the top-level items (those with `parent: None`).
    async fn load_root(&self) -> Result<Vec<Item>, StoreError>;

    /// Fetch the direct children of `parent`, in store order.
    async fn load_children(&self, parent: NodeId) -> Result<Vec<Item>, StoreError>;

    /// Replace the content of `id`, returning the confirmed value.
    async fn update_content(&self, id: NodeId, content: String) -> Result<String, StoreError>;

    /// Create a new item under `parent` (`None` = top level) and
    /// return it.
    async fn add_child(&self, parent: Option<NodeId>) -> Result<Item, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_displays_raw_value() {
        assert_eq!(NodeId::new(42).to_string(), "42");
        assert_eq!(NodeId::from(7).raw(), 7);
    }
}
