/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Settle-once containers for in-flight asynchronous values.
//!
//! A [`Loadable`] wraps exactly one asynchronous operation. The
//! operation starts eagerly at construction; its result is applied to
//! the container exactly once, after which the observed state never
//! changes. Callers never block and control is never transferred
//! implicitly: they peek ([`Loadable::state`]), read
//! ([`Loadable::get`]), poll ([`Loadable::try_settle`]), or await
//! ([`Loadable::settle`]).
//!
//! [`Keyed`] attaches an immutable key at construction, so list
//! renderers have a stable identity for an entry whose value is still
//! pending.

use std::future::Future;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::StoreError;
use crate::store::NodeId;

/// The observable state of one asynchronous operation.
///
/// Transitions exactly once, `Pending → Ready | Failed`, and only
/// through [`Loadable::try_settle`] / [`Loadable::settle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    /// The operation has not delivered a result yet.
    Pending,
    /// The operation succeeded.
    Ready(T),
    /// The operation failed. The error is re-raised identically on
    /// every read.
    Failed(StoreError),
}

impl<T> LoadState<T> {
    /// True while the operation is still in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    /// True once the operation succeeded.
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    /// True once the operation failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }

    /// The settled value, if any.
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Error returned by [`Loadable::get`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// The wrapped operation has not settled yet. The caller's
    /// scheduler should re-read after the next settlement pass.
    #[error("value is not ready yet")]
    NotReady,

    /// The wrapped operation failed. Identical on every read.
    #[error(transparent)]
    Failed(#[from] StoreError),
}

/// A settle-once box around one asynchronous operation's eventual
/// value.
///
/// Construction via [`Loadable::spawn`] starts the operation
/// immediately on a tokio task and installs a oneshot channel as the
/// completion hook. The state transition happens on the owner's
/// thread, in `try_settle`/`settle`, so readers observe `Pending`
/// until the owner runs a settlement pass even if the task already
/// finished.
#[derive(Debug)]
pub struct Loadable<T> {
    state: LoadState<T>,
    rx: Option<oneshot::Receiver<Result<T, StoreError>>>,
}

impl<T> Loadable<T> {
    /// Start `op` now and return a pending container for its result.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(op: F) -> Self
    where
        T: Send + 'static,
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            // The receiver may have been dropped (e.g. the loadable was
            // replaced by an edit); the result is simply discarded.
            let _ = tx.send(op.await);
        });
        Self {
            state: LoadState::Pending,
            rx: Some(rx),
        }
    }

    /// A container that settled `Ready(value)` at construction.
    pub fn ready(value: T) -> Self {
        Self {
            state: LoadState::Ready(value),
            rx: None,
        }
    }

    /// A container that settled `Failed(error)` at construction.
    pub fn failed(error: StoreError) -> Self {
        Self {
            state: LoadState::Failed(error),
            rx: None,
        }
    }

    /// Peek at the current state without suspending or settling.
    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    /// Read the value as if it were synchronous.
    ///
    /// Once settled, repeated reads yield the same value or the same
    /// error every time; there is no re-fetch and no staleness window.
    pub fn get(&self) -> Result<&T, ReadError> {
        match &self.state {
            LoadState::Ready(value) => Ok(value),
            LoadState::Pending => Err(ReadError::NotReady),
            LoadState::Failed(error) => Err(ReadError::Failed(error.clone())),
        }
    }

    /// Apply a completed result without blocking.
    ///
    /// Returns true if the container transitioned out of `Pending`.
    /// Returns false while the operation is still running or once the
    /// container has already settled.
    pub fn try_settle(&mut self) -> bool {
        let Some(rx) = self.rx.as_mut() else {
            return false;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.apply(result);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Closed) => {
                self.apply(Err(StoreError::Interrupted));
                true
            }
        }
    }

    /// Wait for the operation to complete and apply its result.
    ///
    /// Returns immediately if the container already settled.
    pub async fn settle(&mut self) -> &LoadState<T> {
        if let Some(rx) = self.rx.take() {
            let result = match rx.await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Interrupted),
            };
            self.state = match result {
                Ok(value) => LoadState::Ready(value),
                Err(error) => LoadState::Failed(error),
            };
        }
        &self.state
    }

    /// Consume the container and resolve to the operation's result.
    ///
    /// Used to chain a new operation onto an in-flight one (the old
    /// container is being replaced wholesale, so its completion hook
    /// moves into the new operation).
    pub async fn into_result(self) -> Result<T, StoreError> {
        match self.state {
            LoadState::Ready(value) => Ok(value),
            LoadState::Failed(error) => Err(error),
            LoadState::Pending => match self.rx {
                Some(rx) => match rx.await {
                    Ok(result) => result,
                    Err(_) => Err(StoreError::Interrupted),
                },
                None => Err(StoreError::Interrupted),
            },
        }
    }

    /// Consume the container, yielding its current state.
    ///
    /// A still-pending container's in-flight result is dropped; the
    /// settlement paths only call this after the state transition.
    pub fn into_state(self) -> LoadState<T> {
        self.state
    }

    fn apply(&mut self, result: Result<T, StoreError>) {
        self.rx = None;
        self.state = match result {
            Ok(value) => LoadState::Ready(value),
            Err(error) => LoadState::Failed(error),
        };
    }
}

/// A loadable carrying an immutable key fixed at construction.
///
/// The key is independent of the wrapped state: it identifies the
/// entry (for list rendering, ordering, bookkeeping) before the value
/// settles and forever after.
#[derive(Debug)]
pub struct Keyed<T> {
    key: NodeId,
    inner: Loadable<T>,
}

impl<T> Keyed<T> {
    /// Attach `key` to an existing loadable.
    pub fn new(key: NodeId, inner: Loadable<T>) -> Self {
        Self { key, inner }
    }

    /// A keyed entry that settled `Ready(value)` at construction.
    pub fn ready(key: NodeId, value: T) -> Self {
        Self {
            key,
            inner: Loadable::ready(value),
        }
    }

    /// The immutable key.
    pub fn key(&self) -> NodeId {
        self.key
    }

    /// The wrapped loadable.
    pub fn loadable(&self) -> &Loadable<T> {
        &self.inner
    }
}
