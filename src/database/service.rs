//! Database service layer
//!
//! PostgreSQL-backed dialogue storage. Each message runs in one database
//! transaction that first takes a transaction-scoped advisory lock keyed by
//! the user id, so transitions of one user are serialized across workers and
//! processes while different users proceed in parallel.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::database::connection::DatabasePool;
use crate::database::repositories::{RegistrationRepository, UserStateRepository};
use crate::models::{NewRegistration, NewUserState, Registration, UserState};
use crate::state::storage::{DialogueStorage, DialogueTransaction};
use crate::utils::errors::TicketBuddyError;

#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: DatabasePool,
    user_states: UserStateRepository,
    registrations: RegistrationRepository,
}

impl PostgresStorage {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            user_states: UserStateRepository,
            registrations: RegistrationRepository,
        }
    }

    /// Committed state of a user
    pub async fn user_state(&self, user_id: &str) -> Result<Option<UserState>, TicketBuddyError> {
        let mut conn = self.pool.acquire().await?;
        self.user_states.find(&mut conn, user_id).await
    }

    /// Registrations of a user, newest first
    pub async fn registrations_for(&self, user_id: &str) -> Result<Vec<Registration>, TicketBuddyError> {
        let mut conn = self.pool.acquire().await?;
        self.registrations.find_by_user(&mut conn, user_id).await
    }

    /// Count total registrations
    pub async fn count_registrations(&self) -> Result<i64, TicketBuddyError> {
        let mut conn = self.pool.acquire().await?;
        self.registrations.count(&mut conn).await
    }

    /// Count users currently inside a scenario
    pub async fn count_active_users(&self) -> Result<i64, TicketBuddyError> {
        let mut conn = self.pool.acquire().await?;
        self.user_states.count(&mut conn).await
    }
}

#[async_trait]
impl DialogueStorage for PostgresStorage {
    async fn begin(&self, user_id: &str) -> Result<Box<dyn DialogueTransaction>, TicketBuddyError> {
        // The pooled connection and the user's lock stay held until commit, across
        // ticket rendering (bounded by `ticket.timeout_seconds`) and reply delivery.
        // `database.max_connections` caps how many users are mid-message at once.
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        debug!(user_id = user_id, "Database transaction started");

        Ok(Box::new(PostgresTransaction {
            tx,
            user_states: self.user_states,
            registrations: self.registrations,
        }))
    }
}

struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
    user_states: UserStateRepository,
    registrations: RegistrationRepository,
}

#[async_trait]
impl DialogueTransaction for PostgresTransaction {
    async fn get_user_state(&mut self, user_id: &str) -> Result<Option<UserState>, TicketBuddyError> {
        self.user_states.find(&mut self.tx, user_id).await
    }

    async fn create_user_state(&mut self, state: NewUserState) -> Result<UserState, TicketBuddyError> {
        self.user_states.create(&mut self.tx, state).await
    }

    async fn update_user_state(&mut self, state: &UserState) -> Result<UserState, TicketBuddyError> {
        self.user_states.update(&mut self.tx, state).await
    }

    async fn delete_user_state(&mut self, state: &UserState) -> Result<(), TicketBuddyError> {
        self.user_states.delete(&mut self.tx, &state.user_id).await
    }

    async fn create_registration(&mut self, registration: NewRegistration) -> Result<Registration, TicketBuddyError> {
        self.registrations.create(&mut self.tx, registration).await
    }

    async fn commit(self: Box<Self>) -> Result<(), TicketBuddyError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), TicketBuddyError> {
        self.tx.rollback().await?;
        debug!("Database transaction rolled back");
        Ok(())
    }
}
