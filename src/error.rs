/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Error taxonomy for the tree engine.
//!
//! Remote failures ([`StoreError`]) are data: they settle into the one
//! loadable that wrapped the failing operation and surface only when
//! that value is read. Tree-level failures ([`TreeError`]) are bugs:
//! an id that should be present is not, or the engine observed a state
//! it is supposed to make unrepresentable. They propagate with `?` and
//! abort the current operation; nothing in the engine retries.

use crate::store::NodeId;

/// The type of error that can occur on a Remote Store operation.
///
/// `Clone` is load-bearing: a failed loadable re-raises the same error
/// on every read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The referenced item does not exist in the store.
    #[error("item {0} not found in store")]
    ItemNotFound(NodeId),

    /// The remote operation failed.
    #[error("remote operation failed: {0}")]
    Remote(String),

    /// The operation task was dropped before delivering a result.
    #[error("operation interrupted before settling")]
    Interrupted,
}

/// The type of error that can occur on tree mutations and navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// An operation referenced an id that is not present in the tree.
    /// This is a desync between the caller's view and the model, not a
    /// transient condition.
    #[error("node {0} is not present in the tree")]
    NotFound(NodeId),

    /// The engine observed a state its own transitions should never
    /// produce (e.g. a settled child entry whose node is missing from
    /// the arena).
    #[error("invariant violated: {0}")]
    Invariant(&'static str),
}
