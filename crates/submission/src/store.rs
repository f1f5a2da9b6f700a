//! Pending-submission registry.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::model::{PendingSubmission, UserId};

/// At most one pending submission per user, last write wins.
///
/// Implementations need not serialize concurrent transitions for the same
/// user; [`crate::SubmissionFlow`] holds a per-user lock around every
/// read-modify-write.
pub trait SubmissionStore: Send + Sync {
    fn get(&self, user_id: UserId) -> Option<PendingSubmission>;

    /// Insert or overwrite, returning the replaced entry.
    fn put(&self, user_id: UserId, pending: PendingSubmission) -> Option<PendingSubmission>;

    fn remove(&self, user_id: UserId) -> Option<PendingSubmission>;
}

/// Process-local store. Nothing survives a restart.
///
/// Uses `std::sync::Mutex`: every operation is a synchronous map access and
/// the guard is never held across an `.await`.
#[derive(Default)]
pub struct InMemorySubmissionStore {
    entries: Mutex<HashMap<UserId, PendingSubmission>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<UserId, PendingSubmission>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn get(&self, user_id: UserId) -> Option<PendingSubmission> {
        self.entries().get(&user_id).cloned()
    }

    fn put(&self, user_id: UserId, pending: PendingSubmission) -> Option<PendingSubmission> {
        self.entries().insert(user_id, pending)
    }

    fn remove(&self, user_id: UserId) -> Option<PendingSubmission> {
        self.entries().remove(&user_id)
    }
}
