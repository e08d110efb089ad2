/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The node model: one value node per stored item, plus the tri-state
//! lazy-loading status of its child collection.
//!
//! Nodes live in the tree's arena keyed by [`NodeId`]; `parent` is a
//! plain id lookup, never an owning reference, so there are no
//! reference cycles. The root is implicit: it has no node, no id and
//! no content, only the tree's own children slot.

use crate::loadable::Keyed;
use crate::loadable::LoadState;
use crate::loadable::Loadable;
use crate::store::Item;
use crate::store::NodeId;

/// Resolved result of a children-producing operation.
///
/// `order` is the final child sequence; `fetched` holds the store
/// items that do not have arena nodes yet. Existing children referenced
/// by `order` pass through untouched: materialization only inserts
/// absent ids, so re-adding under a loaded parent never resets sibling
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildBatch {
    /// Child ids in display order.
    pub order: Vec<NodeId>,
    /// Freshly fetched items that still need arena nodes.
    pub fetched: Vec<Item>,
}

impl ChildBatch {
    /// A batch in which every child was freshly fetched.
    pub fn from_items(fetched: Vec<Item>) -> Self {
        Self {
            order: fetched.iter().map(|item| item.id).collect(),
            fetched,
        }
    }
}

/// Tri-state lazy-loading status of a node's child collection.
///
/// The state machine is one-way:
/// `NotRequested → LoadingBatch → LoadingIncremental`. A children
/// fetch, once issued for a node, is never issued again; the only
/// transition back into `LoadingBatch` is `add_node`, which replaces
/// the collection wholesale with a batch that appends the new child.
#[derive(Debug)]
pub enum ChildrenState {
    /// No fetch has been issued for this node.
    NotRequested,
    /// One in-flight operation that will produce the whole child
    /// sequence. Settled and materialized by the tree's pump.
    LoadingBatch(Loadable<ChildBatch>),
    /// Materialized per-child slots. Each entry carries its id as an
    /// immutable key, the stable identity for list rendering.
    LoadingIncremental(Vec<Keyed<NodeId>>),
}

impl ChildrenState {
    /// True once a fetch has been issued (in flight or materialized).
    pub fn is_requested(&self) -> bool {
        !matches!(self, ChildrenState::NotRequested)
    }

    /// The resolved child ids in order, if materialized.
    ///
    /// Pending entries are skipped rather than blocking the rest of
    /// the collection.
    pub fn loaded_ids(&self) -> Option<Vec<NodeId>> {
        match self {
            ChildrenState::LoadingIncremental(entries) => Some(
                entries
                    .iter()
                    .filter_map(|entry| entry.loadable().state().ready().copied())
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// A value node: one stored item materialized into the tree.
#[derive(Debug)]
pub struct ValueNode {
    /// Store-assigned identity, fixed at creation.
    id: NodeId,
    /// Parent id, or `None` for children of the implicit root.
    /// Non-owning: ownership flows root → descendant via the arena.
    parent: Option<NodeId>,
    /// Current content. Wholesale-replaced by a fresh loadable on
    /// every edit, never mutated in place.
    pub(crate) content: Loadable<String>,
    /// Lazy-loading status of this node's children.
    pub(crate) children: ChildrenState,
    /// Whether this node is expanded. Starts closed.
    pub(crate) open: bool,
}

impl ValueNode {
    /// Materialize a store item into a node: content settled, children
    /// untouched, closed.
    pub(crate) fn from_item(item: Item) -> Self {
        Self {
            id: item.id,
            parent: item.parent,
            content: Loadable::ready(item.content),
            children: ChildrenState::NotRequested,
            open: false,
        }
    }

    /// This node's identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The parent id (`None` = child of the root).
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The content loadable: value, pending, or error marker.
    pub fn content(&self) -> &Loadable<String> {
        &self.content
    }

    /// The children-loading state.
    pub fn children(&self) -> &ChildrenState {
        &self.children
    }

    /// Whether this node is expanded.
    pub fn open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, content: &str, parent: Option<u64>) -> Item {
        Item {
            id: NodeId::new(id),
            content: content.to_string(),
            parent: parent.map(NodeId::new),
        }
    }

    #[test]
    fn from_item_starts_closed_with_settled_content() {
        let node = ValueNode::from_item(item(5, "hello", Some(1)));
        assert_eq!(node.id(), NodeId::new(5));
        assert_eq!(node.parent(), Some(NodeId::new(1)));
        assert!(!node.open());
        assert!(!node.children().is_requested());
        assert_eq!(node.content().get(), Ok(&"hello".to_string()));
    }

    #[test]
    fn child_batch_orders_follow_item_order() {
        let batch = ChildBatch::from_items(vec![item(3, "c", None), item(1, "a", None)]);
        assert_eq!(batch.order, vec![NodeId::new(3), NodeId::new(1)]);
    }

    #[test]
    fn loaded_ids_skips_pending_entries() {
        let state = ChildrenState::LoadingIncremental(vec![
            Keyed::ready(NodeId::new(1), NodeId::new(1)),
            Keyed::new(NodeId::new(2), Loadable::failed(crate::StoreError::Interrupted)),
            Keyed::ready(NodeId::new(3), NodeId::new(3)),
        ]);
        assert_eq!(
            state.loaded_ids(),
            Some(vec![NodeId::new(1), NodeId::new(3)])
        );
        assert!(ChildrenState::NotRequested.loaded_ids().is_none());
    }
}
