//! State storage implementation
//!
//! The dialogue engine touches persistence only through a per-message
//! transaction: user state and registrations are read and written inside one
//! [`DialogueTransaction`] that is committed once all replies went out, and
//! discarded otherwise. Implementations serialize transactions per user id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use uuid::Uuid;

use crate::models::{NewRegistration, NewUserState, Registration, UserState};
use crate::utils::errors::{Result, TicketBuddyError};

/// Source of per-message transactions
#[async_trait]
pub trait DialogueStorage: Send + Sync {
    /// Open a transaction holding the exclusive right to change `user_id`'s state
    async fn begin(&self, user_id: &str) -> Result<Box<dyn DialogueTransaction>>;
}

/// Unit of work for one inbound message
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// every write made through it.
#[async_trait]
pub trait DialogueTransaction: Send {
    async fn get_user_state(&mut self, user_id: &str) -> Result<Option<UserState>>;

    /// Insert a state; fails with `UserStateExists` if the user already has one
    async fn create_user_state(&mut self, state: NewUserState) -> Result<UserState>;

    /// Persist step and context changes of an existing state
    async fn update_user_state(&mut self, state: &UserState) -> Result<UserState>;

    async fn delete_user_state(&mut self, state: &UserState) -> Result<()>;

    async fn create_registration(&mut self, registration: NewRegistration) -> Result<Registration>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

#[derive(Debug, Default)]
struct Committed {
    states: HashMap<String, UserState>,
    registrations: Vec<Registration>,
}

#[derive(Debug, Clone)]
enum StateChange {
    Upsert(UserState),
    Delete,
}

/// Process-local storage
///
/// Writes are staged in the transaction and applied together on commit.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    committed: Arc<Mutex<Committed>>,
    user_locks: Arc<LockTable>,
}

type LockTable = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

impl InMemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed state of a user
    pub fn user_state(&self, user_id: &str) -> Option<UserState> {
        lock_ignoring_poison(&self.committed).states.get(user_id).cloned()
    }

    /// All committed registrations in creation order
    pub fn registrations(&self) -> Vec<Registration> {
        lock_ignoring_poison(&self.committed).registrations.clone()
    }

    /// Number of users currently inside a scenario
    pub fn active_users(&self) -> usize {
        lock_ignoring_poison(&self.committed).states.len()
    }

    fn user_lock(&self, user_id: &str) -> Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .user_locks
            .lock()
            .map_err(|_| TicketBuddyError::Storage("user lock table poisoned".to_string()))?;
        Ok(locks.entry(user_id.to_string()).or_default().clone())
    }
}

/// Exclusive hold on one user's lock
///
/// Releasing the last hold removes the user's entry from the lock table.
struct UserLease {
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
}

impl Drop for UserLease {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Waiters clone the entry under the table lock, so a count of one means nobody else holds it
        let mut locks = lock_ignoring_poison(&self.locks);
        if locks.get(&self.user_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.user_id);
        }
    }
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("active_users", &self.active_users())
            .finish_non_exhaustive()
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DialogueStorage for InMemoryStorage {
    async fn begin(&self, user_id: &str) -> Result<Box<dyn DialogueTransaction>> {
        let guard = self.user_lock(user_id)?.lock_owned().await;
        debug!(user_id = user_id, "In-memory transaction started");

        Ok(Box::new(InMemoryTransaction {
            committed: self.committed.clone(),
            _lease: UserLease {
                user_id: user_id.to_string(),
                guard: Some(guard),
                locks: self.user_locks.clone(),
            },
            changes: HashMap::new(),
            registrations: Vec::new(),
        }))
    }
}

struct InMemoryTransaction {
    committed: Arc<Mutex<Committed>>,
    _lease: UserLease,
    changes: HashMap<String, StateChange>,
    registrations: Vec<Registration>,
}

impl InMemoryTransaction {
    fn current(&self, user_id: &str) -> Result<Option<UserState>> {
        match self.changes.get(user_id) {
            Some(StateChange::Upsert(state)) => Ok(Some(state.clone())),
            Some(StateChange::Delete) => Ok(None),
            None => {
                let committed = self
                    .committed
                    .lock()
                    .map_err(|_| TicketBuddyError::Storage("state table poisoned".to_string()))?;
                Ok(committed.states.get(user_id).cloned())
            }
        }
    }
}

#[async_trait]
impl DialogueTransaction for InMemoryTransaction {
    async fn get_user_state(&mut self, user_id: &str) -> Result<Option<UserState>> {
        self.current(user_id)
    }

    async fn create_user_state(&mut self, state: NewUserState) -> Result<UserState> {
        if self.current(&state.user_id)?.is_some() {
            return Err(TicketBuddyError::UserStateExists { user_id: state.user_id });
        }

        let state = state.into_state(Utc::now());
        self.changes.insert(state.user_id.clone(), StateChange::Upsert(state.clone()));
        Ok(state)
    }

    async fn update_user_state(&mut self, state: &UserState) -> Result<UserState> {
        if self.current(&state.user_id)?.is_none() {
            return Err(TicketBuddyError::UserStateNotFound { user_id: state.user_id.clone() });
        }

        let mut updated = state.clone();
        updated.updated_at = Utc::now();
        self.changes.insert(updated.user_id.clone(), StateChange::Upsert(updated.clone()));
        Ok(updated)
    }

    async fn delete_user_state(&mut self, state: &UserState) -> Result<()> {
        self.changes.insert(state.user_id.clone(), StateChange::Delete);
        Ok(())
    }

    async fn create_registration(&mut self, registration: NewRegistration) -> Result<Registration> {
        let registration = registration.into_registration(Uuid::new_v4(), Utc::now());
        self.registrations.push(registration.clone());
        Ok(registration)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        let mut committed = this
            .committed
            .lock()
            .map_err(|_| TicketBuddyError::Storage("state table poisoned".to_string()))?;

        for (user_id, change) in this.changes {
            match change {
                StateChange::Upsert(state) => {
                    committed.states.insert(user_id, state);
                }
                StateChange::Delete => {
                    committed.states.remove(&user_id);
                }
            }
        }
        committed.registrations.extend(this.registrations);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        debug!(discarded = self.changes.len(), "In-memory transaction rolled back");
        Ok(())
    }
}
