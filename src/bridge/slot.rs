//! One-shot result cell shared by a running task and its handle.

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

enum SlotState<T> {
    Pending,
    Ready(Result<T>),
    Consumed,
    Abandoned,
}

pub(crate) struct ResultSlot<T> {
    state: Mutex<SlotState<T>>,
    resolved: AtomicBool,
    cond: Condvar,
}

impl<T> ResultSlot<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SlotState::Pending),
            resolved: AtomicBool::new(false),
            cond: Condvar::new(),
        })
    }

    /// Stores the task outcome. Only a pending slot accepts a write.
    pub(crate) fn complete(&self, outcome: Result<T>) -> Result<()> {
        let mut state = self.state.lock();
        if !matches!(*state, SlotState::Pending) {
            return Err(Error::AlreadyCompleted);
        }
        *state = SlotState::Ready(outcome);
        self.resolved.store(true, Ordering::Release);
        drop(state);
        self.cond.notify_all();
        Ok(())
    }

    /// Marks a pending slot as never going to receive a value.
    pub(crate) fn abandon(&self) {
        let mut state = self.state.lock();
        if matches!(*state, SlotState::Pending) {
            *state = SlotState::Abandoned;
            self.resolved.store(true, Ordering::Release);
            drop(state);
            self.cond.notify_all();
        }
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    /// Blocks until the slot resolves, then takes the outcome.
    pub(crate) fn wait_take(&self) -> Result<T> {
        let mut state = self.state.lock();
        while matches!(*state, SlotState::Pending) {
            self.cond.wait(&mut state);
        }
        Self::take(&mut state)
    }

    /// Takes the outcome if the slot has resolved.
    pub(crate) fn try_take(&self) -> Option<Result<T>> {
        if !self.is_resolved() {
            return None;
        }
        let mut state = self.state.lock();
        Some(Self::take(&mut state))
    }

    fn take(state: &mut SlotState<T>) -> Result<T> {
        match std::mem::replace(state, SlotState::Consumed) {
            SlotState::Ready(outcome) => outcome,
            SlotState::Consumed => Err(Error::AlreadyConsumed),
            SlotState::Abandoned => {
                *state = SlotState::Abandoned;
                Err(Error::Abandoned)
            }
            SlotState::Pending => {
                *state = SlotState::Pending;
                unreachable!("take called on a pending slot")
            }
        }
    }
}

/// Write half of a [`ResultSlot`].
///
/// Dropping it unwritten abandons the slot, which is how units discarded at
/// shutdown release their waiting callers.
pub(crate) struct Completer<T> {
    slot: Arc<ResultSlot<T>>,
    written: bool,
}

impl<T> Completer<T> {
    pub(crate) fn new(slot: Arc<ResultSlot<T>>) -> Self {
        Self {
            slot,
            written: false,
        }
    }

    pub(crate) fn complete(mut self, outcome: Result<T>) -> Result<()> {
        self.written = true;
        self.slot.complete(outcome)
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if !self.written {
            self.slot.abandon();
        }
    }
}
