/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Flattening and keyboard-order navigation.
//!
//! Everything here is a pure projection of the [`Tree`]: flattening
//! walks the materialized children lists in depth-first pre-order, and
//! the next/previous moves walk the flattened rows. Children whose
//! batch is unrequested or still in flight simply do not appear yet;
//! settlement adds them on the next projection.

use crate::error::TreeError;
use crate::store::NodeId;
use crate::tree::Tree;

/// One row of the depth-first flattening.
///
/// Rows exist for every materialized node; `visible` is false when any
/// strict ancestor is closed. Navigation moves only between visible
/// rows, but a hidden row still anchors its id in the full order so a
/// selection inside a collapsed subtree stays meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRow {
    pub id: NodeId,
    pub depth: usize,
    pub visible: bool,
}

/// Flatten the tree into depth-first pre-order rows.
pub fn flatten(tree: &Tree) -> Result<Vec<FlatRow>, TreeError> {
    let mut rows = Vec::new();
    if let Some(ids) = tree.root_children().loaded_ids() {
        for id in ids {
            walk(tree, id, 0, true, &mut rows)?;
        }
    }
    Ok(rows)
}

fn walk(
    tree: &Tree,
    id: NodeId,
    depth: usize,
    ancestors_open: bool,
    rows: &mut Vec<FlatRow>,
) -> Result<(), TreeError> {
    let node = tree
        .node(id)
        .ok_or(TreeError::Invariant("settled child id missing from arena"))?;
    rows.push(FlatRow {
        id,
        depth,
        visible: ancestors_open,
    });
    if let Some(ids) = node.children().loaded_ids() {
        let descend = ancestors_open && node.open();
        for child in ids {
            walk(tree, child, depth + 1, descend, rows)?;
        }
    }
    Ok(())
}

/// The id one visible row below `cur`.
///
/// `None` selects the first visible row; at the last visible row the
/// selection clamps in place. An id that is not in the tree at all is
/// a desync and errors.
pub fn next_id(tree: &Tree, cur: Option<NodeId>) -> Result<Option<NodeId>, TreeError> {
    let rows = flatten(tree)?;
    let Some(cur) = cur else {
        return Ok(rows.iter().find(|row| row.visible).map(|row| row.id));
    };
    let pos = position_of(&rows, cur)?;
    Ok(Some(
        rows[pos + 1..]
            .iter()
            .find(|row| row.visible)
            .map_or(cur, |row| row.id),
    ))
}

/// The id one visible row above `cur`.
///
/// `None` selects the last visible row; at the first visible row the
/// selection clamps in place.
pub fn previous_id(tree: &Tree, cur: Option<NodeId>) -> Result<Option<NodeId>, TreeError> {
    let rows = flatten(tree)?;
    let Some(cur) = cur else {
        return Ok(rows.iter().rev().find(|row| row.visible).map(|row| row.id));
    };
    let pos = position_of(&rows, cur)?;
    Ok(Some(
        rows[..pos]
            .iter()
            .rev()
            .find(|row| row.visible)
            .map_or(cur, |row| row.id),
    ))
}

/// Position of `cur` in the full (hidden rows included) order.
fn position_of(rows: &[FlatRow], cur: NodeId) -> Result<usize, TreeError> {
    rows.iter()
        .position(|row| row.id == cur)
        .ok_or(TreeError::NotFound(cur))
}
