/// State mutation barrier
///
/// Shared device-level state (device creation, hardware selection, context
/// creation, teardown) is only mutated while holding a [`MutationPermit`].
/// Any number of permits may be held at once. Freezing the barrier waits for
/// every outstanding permit to be released and blocks new ones until the
/// freeze guard is dropped.

use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};

#[derive(Default)]
struct BarrierState {
    /// Outstanding permits per thread
    permits: FxHashMap<ThreadId, usize>,
    active_permits: usize,
    frozen_by: Option<ThreadId>,
}

/// Process-wide barrier handing out mutation permits
#[derive(Default)]
pub struct StateMutationBarrier {
    state: Mutex<BarrierState>,
    changed: Condvar,
}

impl StateMutationBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, BarrierState>) -> MutexGuard<'a, BarrierState> {
        self.changed.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire a permit, waiting while the barrier is frozen by another thread
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOperation` if the calling thread is the one
    /// holding the freeze (waiting would deadlock).
    pub fn acquire_permit(&self) -> Result<MutationPermit<'_>> {
        let current = thread::current().id();
        let mut state = self.lock_state();

        if state.frozen_by == Some(current) {
            return Err(Error::InvalidOperation(
                "Can not acquire a mutation permit while the current thread holds the mutation freeze.".to_string()
            ));
        }
        while state.frozen_by.is_some() {
            state = self.wait(state);
        }

        state.active_permits += 1;
        *state.permits.entry(current).or_insert(0) += 1;

        Ok(MutationPermit { barrier: self, thread: current })
    }

    /// Acquire a permit and then lock `lock`, releasing both when the guard drops
    pub fn acquire_permit_with_lock<'a, T>(&'a self, lock: &'a Mutex<T>) -> Result<LockedMutationPermit<'a, T>> {
        let permit = self.acquire_permit()?;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(LockedMutationPermit { guard, _permit: permit })
    }

    /// Wait for outstanding permits to be released and block new ones
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOperation` if the calling thread already holds the
    /// freeze or still holds a permit of its own.
    pub fn freeze_mutations(&self) -> Result<FrozenMutations<'_>> {
        let current = thread::current().id();
        let mut state = self.lock_state();

        if state.frozen_by == Some(current) {
            return Err(Error::InvalidOperation("Mutations are already frozen by the current thread.".to_string()));
        }
        if state.permits.get(&current).copied().unwrap_or(0) > 0 {
            return Err(Error::InvalidOperation(
                "Can not freeze mutations while the current thread holds a mutation permit.".to_string()
            ));
        }

        while state.frozen_by.is_some() {
            state = self.wait(state);
        }
        state.frozen_by = Some(current);
        while state.active_permits > 0 {
            state = self.wait(state);
        }

        Ok(FrozenMutations { barrier: self })
    }

    pub fn is_frozen(&self) -> bool {
        self.lock_state().frozen_by.is_some()
    }

    /// Number of permits currently held across all threads
    pub fn active_permits(&self) -> usize {
        self.lock_state().active_permits
    }

    fn release_permit(&self, thread: ThreadId) {
        let mut state = self.lock_state();
        state.active_permits -= 1;
        if let Some(count) = state.permits.get_mut(&thread) {
            *count -= 1;
            if *count == 0 {
                state.permits.remove(&thread);
            }
        }
        self.changed.notify_all();
    }

    fn unfreeze(&self) {
        self.lock_state().frozen_by = None;
        self.changed.notify_all();
    }
}

/// Scoped mutation permit; released on drop
pub struct MutationPermit<'a> {
    barrier: &'a StateMutationBarrier,
    thread: ThreadId,
}

impl Drop for MutationPermit<'_> {
    fn drop(&mut self) {
        self.barrier.release_permit(self.thread);
    }
}

/// Mutation permit combined with a held lock
///
/// The lock is released before the permit.
pub struct LockedMutationPermit<'a, T> {
    guard: MutexGuard<'a, T>,
    _permit: MutationPermit<'a>,
}

impl<T> Deref for LockedMutationPermit<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for LockedMutationPermit<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

/// Freeze guard; unfreezes the barrier on drop
pub struct FrozenMutations<'a> {
    barrier: &'a StateMutationBarrier,
}

impl Drop for FrozenMutations<'_> {
    fn drop(&mut self) {
        self.barrier.unfreeze();
    }
}

#[cfg(test)]
#[path = "barrier_tests.rs"]
mod tests;
