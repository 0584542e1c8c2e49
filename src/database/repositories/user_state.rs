//! User state repository implementation

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgConnection;

use crate::models::{NewUserState, UserState};
use crate::state::context::ConversationContext;
use crate::utils::errors::TicketBuddyError;

#[derive(sqlx::FromRow)]
struct UserStateRow {
    user_id: String,
    scenario_name: String,
    step_name: String,
    context: Json<ConversationContext>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserStateRow> for UserState {
    fn from(row: UserStateRow) -> Self {
        Self {
            user_id: row.user_id,
            scenario_name: row.scenario_name,
            step_name: row.step_name,
            context: row.context.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Queries over `user_states`, run on a caller-provided connection
#[derive(Debug, Clone, Copy, Default)]
pub struct UserStateRepository;

impl UserStateRepository {
    /// Find the state of a user
    pub async fn find(&self, conn: &mut PgConnection, user_id: &str) -> Result<Option<UserState>, TicketBuddyError> {
        let row = sqlx::query_as::<_, UserStateRow>(
            "SELECT user_id, scenario_name, step_name, context, created_at, updated_at FROM user_states WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(UserState::from))
    }

    /// Create a new state; a user already holding one is reported, not overwritten
    pub async fn create(&self, conn: &mut PgConnection, state: NewUserState) -> Result<UserState, TicketBuddyError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UserStateRow>(
            r#"
            INSERT INTO user_states (user_id, scenario_name, step_name, context, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING user_id, scenario_name, step_name, context, created_at, updated_at
            "#
        )
        .bind(&state.user_id)
        .bind(&state.scenario_name)
        .bind(&state.step_name)
        .bind(Json(&state.context))
        .bind(now)
        .fetch_optional(conn)
        .await?;

        row.map(UserState::from)
            .ok_or(TicketBuddyError::UserStateExists { user_id: state.user_id })
    }

    /// Update step and context
    pub async fn update(&self, conn: &mut PgConnection, state: &UserState) -> Result<UserState, TicketBuddyError> {
        let row = sqlx::query_as::<_, UserStateRow>(
            r#"
            UPDATE user_states
            SET scenario_name = $2,
                step_name = $3,
                context = $4,
                updated_at = $5
            WHERE user_id = $1
            RETURNING user_id, scenario_name, step_name, context, created_at, updated_at
            "#
        )
        .bind(&state.user_id)
        .bind(&state.scenario_name)
        .bind(&state.step_name)
        .bind(Json(&state.context))
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;

        row.map(UserState::from)
            .ok_or_else(|| TicketBuddyError::UserStateNotFound { user_id: state.user_id.clone() })
    }

    /// Delete a user's state
    pub async fn delete(&self, conn: &mut PgConnection, user_id: &str) -> Result<(), TicketBuddyError> {
        sqlx::query("DELETE FROM user_states WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Count users currently inside a scenario
    pub async fn count(&self, conn: &mut PgConnection) -> Result<i64, TicketBuddyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_states")
            .fetch_one(conn)
            .await?;

        Ok(count.0)
    }
}
