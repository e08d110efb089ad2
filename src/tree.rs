/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The tree engine: arena of value nodes plus the mutation operations
//! and the settlement pass that applies completed remote results.
//!
//! Concurrency model: one logical thread of control owns the [`Tree`].
//! Mutation operations issue at most one remote call each and return
//! immediately; each in-flight operation writes only to the single
//! loadable it was issued for. Completed results are applied by
//! [`Tree::pump`] (non-blocking) or [`Tree::quiesce`] (drain), so
//! readers observe state changes only between settlement passes. There
//! is no cancellation: a collapsed node's in-flight fetch still lands
//! and its result is kept for the next expand.

use std::collections::HashMap;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::StoreError;
use crate::error::TreeError;
use crate::loadable::Keyed;
use crate::loadable::LoadState;
use crate::loadable::Loadable;
use crate::node::ChildBatch;
use crate::node::ChildrenState;
use crate::node::ValueNode;
use crate::store::Item;
use crate::store::NodeId;
use crate::store::RemoteStore;

/// Boxed children-producing operation, in the shape `add_node` chains
/// them.
type ChildOp = Pin<Box<dyn Future<Output = Result<ChildBatch, StoreError>> + Send>>;

/// A lazily loaded, editable tree over a [`RemoteStore`].
///
/// All nodes live in one arena keyed by store id; children are id
/// lists inside each node's [`ChildrenState`] and `parent` is a plain
/// id, so ancestor walks are O(1) per hop and nothing is owned twice.
pub struct Tree {
    store: Arc<dyn RemoteStore>,
    nodes: HashMap<NodeId, ValueNode>,
    root_children: ChildrenState,
}

impl Tree {
    /// Build a tree by fetching the root items.
    ///
    /// One operation creates the root and its first-level subtree
    /// together: the fetched items are materialized immediately as
    /// settled per-child entries.
    pub async fn load(store: Arc<dyn RemoteStore>) -> Result<Self, StoreError> {
        let items = store.load_root().await?;
        let mut tree = Self {
            store,
            nodes: HashMap::new(),
            root_children: ChildrenState::NotRequested,
        };
        let entries = items
            .into_iter()
            .map(|item| {
                let id = item.id;
                tree.nodes.insert(id, ValueNode::from_item(item));
                Keyed::ready(id, id)
            })
            .collect();
        tree.root_children = ChildrenState::LoadingIncremental(entries);
        tracing::debug!(nodes = tree.nodes.len(), "root loaded");
        Ok(tree)
    }

    // Read accessors (consumed by the rendering layer; never mutate).

    /// Look up a node by id. O(1).
    pub fn node(&self, id: NodeId) -> Option<&ValueNode> {
        self.nodes.get(&id)
    }

    /// Whether `id` has been materialized into the tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// The implicit root's children slot.
    pub fn root_children(&self) -> &ChildrenState {
        &self.root_children
    }

    /// Number of materialized nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // Mutation operations. Each issues at most one remote call and
    // returns without waiting for it.

    /// Expand or collapse a node.
    ///
    /// Flips `open`; if that opened the node and its children were
    /// never requested, issues the one children fetch this node will
    /// ever get. Collapsing discards nothing, so a later re-open is
    /// instant. Toggling while the fetch is in flight only flips
    /// `open` again; the fetch settles regardless.
    pub fn toggle(&mut self, id: NodeId) -> Result<bool, TreeError> {
        let store = Arc::clone(&self.store);
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))?;
        node.open = !node.open;
        if node.open && !node.children.is_requested() {
            tracing::debug!(node = %id, "loading children");
            node.children = ChildrenState::LoadingBatch(Loadable::spawn(async move {
                store.load_children(id).await.map(ChildBatch::from_items)
            }));
        }
        Ok(node.open)
    }

    /// Replace a node's content.
    ///
    /// The old content loadable is discarded wholesale; readers
    /// observe previous value → pending → confirmed value (or error).
    /// No other node is touched.
    pub fn save_content(&mut self, id: NodeId, content: String) -> Result<(), TreeError> {
        let store = Arc::clone(&self.store);
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))?;
        tracing::debug!(node = %id, "saving content");
        node.content =
            Loadable::spawn(async move { store.update_content(id, content).await });
        Ok(())
    }

    /// Create a new child under `parent` (`None` = root).
    ///
    /// The parent's children collection is replaced by one batch that
    /// resolves to the existing children, in their original order,
    /// with the new node appended last. If a children fetch is still
    /// in flight the new operation chains onto it; if the children
    /// were never requested they are fetched first. A value-node
    /// parent is opened so the insertion is visible.
    ///
    /// The returned receiver fires exactly once, after creation
    /// resolves, with the new node's id — so the caller can select the
    /// node just added.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
    ) -> Result<oneshot::Receiver<NodeId>, TreeError> {
        let store = Arc::clone(&self.store);
        let (tx, rx) = oneshot::channel();

        let slot = match parent {
            None => &mut self.root_children,
            Some(id) => {
                let node = self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))?;
                node.open = true;
                &mut node.children
            }
        };
        tracing::debug!(parent = ?parent.map(|id| id.raw()), "adding node");

        let prior = mem::replace(slot, ChildrenState::NotRequested);
        let op: ChildOp = match prior {
            ChildrenState::NotRequested => Box::pin(async move {
                let existing = match parent {
                    Some(id) => store.load_children(id).await?,
                    None => store.load_root().await?,
                };
                let mut batch = ChildBatch::from_items(existing);
                let item = store.add_child(parent).await?;
                let _ = tx.send(item.id);
                batch.order.push(item.id);
                batch.fetched.push(item);
                Ok(batch)
            }),
            ChildrenState::LoadingBatch(loadable) => Box::pin(async move {
                let mut batch = loadable.into_result().await?;
                let item = store.add_child(parent).await?;
                let _ = tx.send(item.id);
                batch.order.push(item.id);
                batch.fetched.push(item);
                Ok(batch)
            }),
            ChildrenState::LoadingIncremental(entries) => {
                let mut order: Vec<NodeId> = entries.iter().map(Keyed::key).collect();
                Box::pin(async move {
                    let item = store.add_child(parent).await?;
                    let _ = tx.send(item.id);
                    order.push(item.id);
                    Ok(ChildBatch {
                        order,
                        fetched: vec![item],
                    })
                })
            }
        };
        *slot = ChildrenState::LoadingBatch(Loadable::spawn(op));
        Ok(rx)
    }

    // Settlement. The only paths that transition loadables and
    // materialize fetched items into arena nodes.

    /// Apply every completed result without blocking.
    ///
    /// The embedding event loop calls this after any operation may
    /// have finished (the poll-based replacement for a renderer that
    /// re-renders on future completion). Returns true if anything
    /// settled.
    pub fn pump(&mut self) -> Result<bool, TreeError> {
        let mut progressed = false;
        let mut staged: Vec<Item> = Vec::new();

        progressed |= Self::settle_slot(&mut self.root_children, &mut staged);
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            progressed |= node.content.try_settle();
            progressed |= Self::settle_slot(&mut node.children, &mut staged);
        }

        for item in staged {
            self.insert_if_absent(item);
        }
        Ok(progressed)
    }

    /// Drain every in-flight operation, applying results as they land.
    ///
    /// Loops until the tree is quiescent; materializing a batch can
    /// surface nothing new to await, so in practice this is one pass
    /// plus a verification pass.
    pub async fn quiesce(&mut self) -> Result<(), TreeError> {
        loop {
            let mut progressed = false;
            if let ChildrenState::LoadingBatch(loadable) = &mut self.root_children {
                if loadable.state().is_pending() {
                    loadable.settle().await;
                    progressed = true;
                }
            }
            let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
            for id in ids {
                let Some(node) = self.nodes.get_mut(&id) else {
                    continue;
                };
                if node.content.state().is_pending() {
                    node.content.settle().await;
                    progressed = true;
                }
                if let ChildrenState::LoadingBatch(loadable) = &mut node.children {
                    if loadable.state().is_pending() {
                        loadable.settle().await;
                        progressed = true;
                    }
                }
            }
            let pumped = self.pump()?;
            if !progressed && !pumped {
                return Ok(());
            }
        }
    }

    /// Settle a children slot and materialize it if the batch
    /// resolved. Newly fetched items are staged for arena insertion by
    /// the caller (the slot mutation and the arena mutation cannot
    /// alias).
    ///
    /// A failed batch stays in place so reads surface the error; it is
    /// local to this node and recovery is a fresh load.
    fn settle_slot(slot: &mut ChildrenState, staged: &mut Vec<Item>) -> bool {
        let ChildrenState::LoadingBatch(loadable) = slot else {
            return false;
        };
        let transitioned = loadable.try_settle();
        // The batch may also have been settled by an awaited pass
        // (`quiesce`); materialize from the state, not the transition.
        if !loadable.state().is_ready() {
            return transitioned;
        }
        let prior = mem::replace(slot, ChildrenState::NotRequested);
        if let ChildrenState::LoadingBatch(loadable) = prior {
            if let LoadState::Ready(batch) = loadable.into_state() {
                tracing::trace!(children = batch.order.len(), "materializing batch");
                let entries = batch
                    .order
                    .into_iter()
                    .map(|id| Keyed::ready(id, id))
                    .collect();
                staged.extend(batch.fetched);
                *slot = ChildrenState::LoadingIncremental(entries);
            }
        }
        true
    }

    /// Insert a fetched item unless its node already exists. Existing
    /// nodes keep their content, open flag, and children untouched.
    fn insert_if_absent(&mut self, item: Item) {
        self.nodes
            .entry(item.id)
            .or_insert_with(|| ValueNode::from_item(item));
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.nodes.len())
            .field("root_children", &self.root_children)
            .finish_non_exhaustive()
    }
}
