/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! An asynchronous lazy-loading tree model.
//!
//! The crate keeps an editable tree whose structure and content live
//! behind a slow remote store, loading each node's children on first
//! expand and applying edits and insertions optimistically through
//! settle-once future containers. Its design pillars:
//!
//! - **Explicit settlement**: every asynchronous value is a
//!   [`Loadable`], readable at any time as pending, ready, or failed.
//!   A settled container never changes again, so reads are idempotent
//!   and failures re-raise identically.
//! - **Arena ownership**: all nodes live in one arena keyed by store
//!   id; children are id lists and `parent` is a plain id, so nothing
//!   is owned twice and lookups are O(1).
//! - **Pure projection**: flattening and navigation ([`nav`]) read the
//!   tree without mutating it. State changes only through the mutation
//!   operations and the settlement passes [`Tree::pump`] and
//!   [`Tree::quiesce`].
//! - **No cancellation**: a collapsed node's in-flight fetch still
//!   lands, and its result is kept for the next expand.
//!
//! Operations spawn onto the ambient tokio runtime, so a [`Tree`] must
//! be created and driven from within one.

pub mod error;
pub mod loadable;
pub mod nav;
pub mod node;
pub mod store;
pub mod tree;

#[cfg(test)]
mod tests;

pub use crate::error::StoreError;
pub use crate::error::TreeError;
pub use crate::loadable::Keyed;
pub use crate::loadable::LoadState;
pub use crate::loadable::Loadable;
pub use crate::loadable::ReadError;
pub use crate::nav::FlatRow;
pub use crate::nav::flatten;
pub use crate::nav::next_id;
pub use crate::nav::previous_id;
pub use crate::node::ChildBatch;
pub use crate::node::ChildrenState;
pub use crate::node::ValueNode;
pub use crate::store::Item;
pub use crate::store::NodeId;
pub use crate::store::RemoteStore;
pub use crate::store::memory::CallCounts;
pub use crate::store::memory::MemoryStore;
pub use crate::tree::Tree;
