// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fan-in completion gate.
//!
//! A `FanIn` joins a fixed number of members that contribute to one shared
//! accumulator from arbitrary tasks. The member count is fixed when the gate
//! is created, before any member can run, so a member finishing early can
//! never make the gate look complete while siblings are still being issued.
//!
//! Every mutation of the accumulator and every completion check happens under
//! one mutex. The terminal outcome is sent on a oneshot channel exactly once;
//! anything delivered afterwards is ignored.

use crate::error::AssemblyError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::oneshot;

/// What happened to a contribution or failure handed to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted; the gate is still waiting on other members.
    Accepted,
    /// Accepted, and it moved the gate into its terminal state.
    Terminal,
    /// Dropped: the gate was already terminal, the member had already
    /// finished, or the member index is out of range.
    Ignored,
}

/// Snapshot of a gate's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Pending { remaining: usize },
    Completed,
    Failed,
}

/// All members of a gate went away before it reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateAbandoned;

impl From<GateAbandoned> for AssemblyError {
    fn from(_: GateAbandoned) -> Self {
        AssemblyError::Interrupted("fan-out members exited before completing".to_string())
    }
}

struct GateState<A, E> {
    finished: Vec<bool>,
    remaining: usize,
    status: GateStatus,
    acc: Option<A>,
    done_tx: Option<oneshot::Sender<Result<A, E>>>,
}

impl<A, E> GateState<A, E> {
    fn resolve(&mut self, outcome: Result<A, E>) {
        self.status = if outcome.is_ok() {
            GateStatus::Completed
        } else {
            GateStatus::Failed
        };
        if let Some(tx) = self.done_tx.take() {
            // Receiver may already be dropped.
            let _ = tx.send(outcome);
        }
    }

    fn is_terminal(&self) -> bool {
        !matches!(self.status, GateStatus::Pending { .. })
    }

    fn pending_members(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.finished
            .iter()
            .enumerate()
            .filter(|(_, done)| !**done)
            .map(|(i, _)| i)
            .collect()
    }
}

fn lock_state<A, E>(state: &Mutex<GateState<A, E>>) -> MutexGuard<'_, GateState<A, E>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to a fan-in gate. Clone one per member.
pub struct FanIn<A, E> {
    state: Arc<Mutex<GateState<A, E>>>,
}

impl<A, E> Clone for FanIn<A, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

/// Receiving end of a gate's terminal outcome.
pub struct GateReceiver<A, E> {
    rx: oneshot::Receiver<Result<A, E>>,
}

impl<A, E> GateReceiver<A, E>
where
    E: From<GateAbandoned>,
{
    /// Wait for the gate's terminal outcome.
    ///
    /// Stays pending for as long as any member is alive and not finished.
    /// If every handle is dropped first, resolves to `GateAbandoned`.
    pub async fn wait(self) -> Result<A, E> {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(GateAbandoned.into()),
        }
    }
}

impl<A, E> FanIn<A, E> {
    /// Create a gate expecting `members` members, starting from `acc`.
    ///
    /// A gate with zero members completes immediately with `acc`.
    pub fn new(members: usize, acc: A) -> (Self, GateReceiver<A, E>) {
        let (tx, rx) = oneshot::channel();
        let mut state = GateState {
            finished: vec![false; members],
            remaining: members,
            status: GateStatus::Pending { remaining: members },
            acc: Some(acc),
            done_tx: Some(tx),
        };

        if members == 0 {
            let acc = state.acc.take();
            if let Some(acc) = acc {
                state.resolve(Ok(acc));
            }
        }

        (
            Self {
                state: Arc::new(Mutex::new(state)),
            },
            GateReceiver { rx },
        )
    }

    fn lock(&self) -> MutexGuard<'_, GateState<A, E>> {
        lock_state(&self.state)
    }

    /// A view of this gate for progress reporting. It does not keep the gate
    /// alive, so dropping every member still resolves the receiver.
    pub fn observer(&self) -> GateObserver<A, E> {
        GateObserver {
            state: Arc::downgrade(&self.state),
        }
    }

    /// Add a member's contribution to the accumulator.
    ///
    /// `finished` marks the member's last contribution. When the last
    /// outstanding member finishes, the accumulator is handed to the waiter.
    pub fn contribute(
        &self,
        member: usize,
        finished: bool,
        apply: impl FnOnce(&mut A),
    ) -> Delivery {
        let mut state = self.lock();

        if state.is_terminal() || state.finished.get(member).copied().unwrap_or(true) {
            return Delivery::Ignored;
        }

        if let Some(acc) = state.acc.as_mut() {
            apply(acc);
        }

        if !finished {
            return Delivery::Accepted;
        }

        state.finished[member] = true;
        state.remaining -= 1;

        if state.remaining > 0 {
            state.status = GateStatus::Pending {
                remaining: state.remaining,
            };
            return Delivery::Accepted;
        }

        match state.acc.take() {
            Some(acc) => {
                state.resolve(Ok(acc));
                Delivery::Terminal
            }
            None => Delivery::Ignored,
        }
    }

    /// Fail the whole gate. The accumulator is discarded so no partial
    /// result can escape.
    pub fn fail(&self, error: E) -> Delivery {
        let mut state = self.lock();
        if state.is_terminal() {
            return Delivery::Ignored;
        }
        state.acc = None;
        state.resolve(Err(error));
        Delivery::Terminal
    }

    pub fn status(&self) -> GateStatus {
        self.lock().status
    }

    /// Indices of members that have not finished yet.
    pub fn pending_members(&self) -> Vec<usize> {
        self.lock().pending_members()
    }
}

/// Read-only handle on a gate that is not one of its members.
pub struct GateObserver<A, E> {
    state: Weak<Mutex<GateState<A, E>>>,
}

impl<A, E> Clone for GateObserver<A, E> {
    fn clone(&self) -> Self {
        Self {
            state: Weak::clone(&self.state),
        }
    }
}

impl<A, E> GateObserver<A, E> {
    /// Status snapshot, or `None` once every member handle is gone.
    pub fn status(&self) -> Option<GateStatus> {
        self.state.upgrade().map(|state| lock_state(&state).status)
    }

    /// Indices of members that have not finished yet; empty once the gate
    /// is terminal or gone.
    pub fn pending_members(&self) -> Vec<usize> {
        self.state
            .upgrade()
            .map(|state| lock_state(&state).pending_members())
            .unwrap_or_default()
    }
}
