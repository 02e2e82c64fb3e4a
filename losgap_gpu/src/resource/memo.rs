/// Per-builder memo backing implicit resource creation

use std::sync::{Arc, Mutex, PoisonError};
use crate::error::Result;

/// Resource created from one builder state
///
/// Clones of a builder share the memo (they describe the same state); every
/// `with_*` call starts a fresh one.
pub(crate) struct Memo<R>(Arc<Mutex<Option<Arc<R>>>>);

impl<R> Memo<R> {
    pub(crate) fn new() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }

    /// The memoized resource, created with `create` on first call
    pub(crate) fn get_or_try_init<F>(&self, create: F) -> Result<Arc<R>>
    where
        F: FnOnce() -> Result<R>,
    {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resource) = slot.as_ref() {
            return Ok(Arc::clone(resource));
        }
        let resource = Arc::new(create()?);
        *slot = Some(Arc::clone(&resource));
        Ok(resource)
    }
}

impl<R> Clone for Memo<R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<R> Default for Memo<R> {
    fn default() -> Self {
        Self::new()
    }
}
