/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! End-to-end scenarios driving the engine the way an embedding UI
//! would: mutate, quiesce, project, navigate.

use std::sync::Arc;
use std::time::Duration;

use crate::nav;
use crate::store::Item;
use crate::store::NodeId;
use crate::store::memory::MemoryStore;
use crate::tree::Tree;

fn id(raw: u64) -> NodeId {
    NodeId::new(raw)
}

/// Three top-level nodes with one child under the second:
///   1 "one"   2 "two" ── 4 "four"   3 "three"
fn session_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.insert(Item {
        id: id(1),
        content: "one".to_string(),
        parent: None,
    });
    store.insert(Item {
        id: id(2),
        content: "two".to_string(),
        parent: None,
    });
    store.insert(Item {
        id: id(3),
        content: "three".to_string(),
        parent: None,
    });
    store.insert(Item {
        id: id(4),
        content: "four".to_string(),
        parent: Some(id(2)),
    });
    Arc::new(store)
}

fn visible_ids(tree: &Tree) -> Vec<NodeId> {
    nav::flatten(tree)
        .expect("flatten")
        .into_iter()
        .filter(|row| row.visible)
        .map(|row| row.id)
        .collect()
}

#[tokio::test]
async fn expand_then_walk_session() {
    let mut tree = Tree::load(session_store()).await.expect("load root");
    assert_eq!(visible_ids(&tree), vec![id(1), id(2), id(3)]);

    // Expanding node 2 shows nothing until the fetch settles.
    tree.toggle(id(2)).expect("toggle");
    assert_eq!(visible_ids(&tree), vec![id(1), id(2), id(3)]);
    tree.quiesce().await.expect("quiesce");
    assert_eq!(visible_ids(&tree), vec![id(1), id(2), id(4), id(3)]);

    // A full downward walk from nothing, clamping at the end.
    let mut cur = None;
    let mut walked = Vec::new();
    for _ in 0..4 {
        cur = nav::next_id(&tree, cur).expect("next");
        walked.push(cur.expect("id"));
    }
    assert_eq!(walked, vec![id(1), id(2), id(4), id(3)]);
    assert_eq!(nav::next_id(&tree, cur), Ok(Some(id(3))));

    // And back up, clamping at the start.
    assert_eq!(nav::previous_id(&tree, cur), Ok(Some(id(4))));
    assert_eq!(nav::previous_id(&tree, Some(id(1))), Ok(Some(id(1))));
}

#[tokio::test]
async fn edit_and_add_session() {
    let store = session_store();
    let mut tree = Tree::load(store.clone()).await.expect("load root");
    tree.toggle(id(2)).expect("toggle");
    tree.quiesce().await.expect("quiesce");

    // Edit while a sibling add is in flight; neither disturbs the
    // other and the projection stays stable except for the append.
    tree.save_content(id(4), "FOUR".to_string()).expect("save");
    let rx = tree.add_node(Some(id(2))).expect("add");
    tree.quiesce().await.expect("quiesce");

    let new_id = rx.await.expect("creation callback");
    assert_eq!(new_id, id(5));
    assert_eq!(
        visible_ids(&tree),
        vec![id(1), id(2), id(4), id(5), id(3)]
    );
    assert_eq!(
        tree.node(id(4)).expect("node 4").content().get(),
        Ok(&"FOUR".to_string())
    );
    assert_eq!(store.content_of(id(4)), Some("FOUR".to_string()));

    // The new node is selectable immediately after the walk reaches it.
    assert_eq!(nav::next_id(&tree, Some(id(4))), Ok(Some(id(5))));
}

#[tokio::test(start_paused = true)]
async fn interleaved_expands_settle_independently() {
    let store = Arc::new(MemoryStore::seeded().with_latency(Duration::from_millis(30)));
    let mut tree = Tree::load(store.clone()).await.expect("load root");
    tree.toggle(id(1)).expect("toggle");
    tree.quiesce().await.expect("quiesce");

    // Open both children of node 1 back to back; the two fetches are
    // independent and one quiesce drains both.
    tree.toggle(id(2)).expect("toggle");
    tree.toggle(id(3)).expect("toggle");
    tree.quiesce().await.expect("quiesce");

    assert_eq!(
        tree.node(id(2)).expect("node 2").children().loaded_ids(),
        Some(vec![id(4)])
    );
    assert_eq!(
        tree.node(id(3)).expect("node 3").children().loaded_ids(),
        Some(vec![])
    );
    assert_eq!(store.calls().load_children, 3);
    assert_eq!(visible_ids(&tree), vec![id(1), id(2), id(4), id(3)]);
}
