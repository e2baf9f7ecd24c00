//! Single-use enforcement for fetch tools.
//!
//! Instance-scoped and advisory: a fresh instance starts unused, so this
//! guards against replaying an approved handle, not against a determined
//! caller. Every call still goes through the URL gate.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{SecurityError, SecurityResult};

/// A used-flag carried by a gate or fetch tool instance.
#[derive(Debug, Default)]
pub struct UseGuard {
    used: AtomicBool,
}

impl UseGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark this instance as used.
    pub fn mark_used(&self) {
        self.used.store(true, Ordering::SeqCst);
    }

    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::SeqCst)
    }

    /// Fail with [`SecurityError::AlreadyUsed`] if the flag is set.
    pub fn check_not_used(&self) -> SecurityResult<()> {
        if self.is_used() {
            return Err(SecurityError::AlreadyUsed);
        }
        Ok(())
    }

    /// Check and mark in one atomic step.
    pub fn claim(&self) -> SecurityResult<()> {
        self.used
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| SecurityError::AlreadyUsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_guard_is_unused() {
        let guard = UseGuard::new();
        assert!(!guard.is_used());
        assert!(guard.check_not_used().is_ok());
    }

    #[test]
    fn test_double_use_rejected() {
        let guard = UseGuard::new();
        guard.mark_used();
        assert!(guard.is_used());
        assert_eq!(guard.check_not_used(), Err(SecurityError::AlreadyUsed));
    }

    #[test]
    fn test_claim_succeeds_once() {
        let guard = UseGuard::new();
        assert!(guard.claim().is_ok());
        assert_eq!(guard.claim(), Err(SecurityError::AlreadyUsed));
        assert!(guard.is_used());
    }

    #[test]
    fn test_claim_is_exclusive_across_threads() {
        let guard = std::sync::Arc::new(UseGuard::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                std::thread::spawn(move || guard.claim().is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
