//! Validation layer
//!
//! Range and precondition checks ("assurances") are routed through a
//! [`Validation`] value so they can be switched off at runtime. When disabled,
//! violating a precondition is undefined behaviour at the backend level.

use crate::error::{Error, Result};

/// Runtime switch for precondition checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    enabled: bool,
}

impl Validation {
    /// Validation layer that performs every check
    pub const ENABLED: Validation = Validation { enabled: true };
    /// Validation layer that skips every check
    pub const DISABLED: Validation = Validation { enabled: false };

    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fail with [`Error::AssuranceFailed`] if `condition` is false
    ///
    /// The message is only built when the check fails.
    pub fn assure<F>(&self, condition: bool, message: F) -> Result<()>
    where
        F: FnOnce() -> String,
    {
        if !self.enabled || condition {
            return Ok(());
        }
        let message = message();
        crate::losgap_error!("losgap::Validation", "{}", message);
        Err(Error::AssuranceFailed(message))
    }

    /// Assure `first + count <= capacity` without overflowing
    pub fn assure_range(&self, first: u64, count: u64, capacity: u64, what: &str) -> Result<()> {
        self.assure(
            first.checked_add(count).map_or(false, |end| end <= capacity),
            || format!("{} range [{}, {}+{}) exceeds capacity {}.", what, first, first, count, capacity),
        )
    }

    /// Assure `index < count`
    pub fn assure_index(&self, index: u32, count: u32, what: &str) -> Result<()> {
        self.assure(index < count, || format!("{} {} out of range (count {}).", what, index, count))
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new(cfg!(debug_assertions))
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
