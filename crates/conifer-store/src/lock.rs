//! Advisory candidate lock
//!
//! One lock guards the candidate datastore across all sessions. The lock
//! is advisory: it serializes cooperating sessions but unlocked sessions
//! may still race (last writer wins at commit). Running is never lockable
//! in this design - that is policy, enforced at the provider.

use std::sync::Mutex;

use conifer_core_types::SessionId;

use crate::errors::{Result, StoreError};

/// Session-scoped advisory lock over the candidate datastore
#[derive(Debug, Default)]
pub struct LockManager {
    candidate: Mutex<Option<SessionId>>,
}

impl LockManager {
    /// Create an unheld lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the candidate lock for `session`
    ///
    /// # Errors
    ///
    /// Returns `LockDenied` naming the holder when the lock is already
    /// held - including by the requesting session (a second lock from the
    /// same session is a protocol error, not reentrancy).
    pub fn acquire(&self, session: &SessionId) -> Result<()> {
        let mut holder = self.candidate.lock().expect("lock manager poisoned");
        match holder.as_ref() {
            Some(current) => Err(StoreError::LockDenied {
                holder: current.clone(),
            }),
            None => {
                *holder = Some(session.clone());
                Ok(())
            }
        }
    }

    /// Release the candidate lock held by `session`
    ///
    /// # Errors
    ///
    /// Returns `LockDenied` when the lock is unheld or held elsewhere.
    pub fn release(&self, session: &SessionId) -> Result<()> {
        let mut holder = self.candidate.lock().expect("lock manager poisoned");
        match holder.as_ref() {
            Some(current) if current == session => {
                *holder = None;
                Ok(())
            }
            Some(current) => Err(StoreError::LockDenied {
                holder: current.clone(),
            }),
            None => Err(StoreError::LockDenied {
                holder: session.clone(),
            }),
        }
    }

    /// Drop the lock on session teardown, if this session holds it
    pub fn release_if_held(&self, session: &SessionId) {
        let mut holder = self.candidate.lock().expect("lock manager poisoned");
        if holder.as_ref() == Some(session) {
            *holder = None;
        }
    }

    /// The current holder, if any
    pub fn holder(&self) -> Option<SessionId> {
        self.candidate.lock().expect("lock manager poisoned").clone()
    }

    /// Whether another session than `session` holds the lock
    pub fn held_by_other(&self, session: &SessionId) -> Option<SessionId> {
        let holder = self.candidate.lock().expect("lock manager poisoned");
        match holder.as_ref() {
            Some(current) if current != session => Some(current.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_exclusivity() {
        let locks = LockManager::new();
        let session_a = SessionId::new();
        let session_b = SessionId::new();

        locks.acquire(&session_a).unwrap();
        let err = locks.acquire(&session_b).unwrap_err();
        assert_eq!(
            err,
            StoreError::LockDenied {
                holder: session_a.clone()
            }
        );
        assert_eq!(locks.held_by_other(&session_b), Some(session_a.clone()));
        assert_eq!(locks.held_by_other(&session_a), None);
    }

    #[test]
    fn test_relock_by_holder_is_denied() {
        let locks = LockManager::new();
        let session = SessionId::new();
        locks.acquire(&session).unwrap();
        assert!(locks.acquire(&session).is_err());
    }

    #[test]
    fn test_unlock_without_holding_fails() {
        let locks = LockManager::new();
        let session = SessionId::new();
        assert!(locks.release(&session).is_err());
    }

    #[test]
    fn test_release_if_held_is_teardown_safe() {
        let locks = LockManager::new();
        let session_a = SessionId::new();
        let session_b = SessionId::new();

        locks.acquire(&session_a).unwrap();
        // Foreign teardown leaves the lock alone
        locks.release_if_held(&session_b);
        assert_eq!(locks.holder(), Some(session_a.clone()));
        // Holder teardown releases it
        locks.release_if_held(&session_a);
        assert_eq!(locks.holder(), None);
    }
}
