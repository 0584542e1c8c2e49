//! Registration repository implementation

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{NewRegistration, Registration};
use crate::utils::errors::TicketBuddyError;

#[derive(sqlx::FromRow)]
struct RegistrationRow {
    id: Uuid,
    user_id: String,
    scenario_name: String,
    fields: Json<BTreeMap<String, String>>,
    created_at: DateTime<Utc>,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            scenario_name: row.scenario_name,
            fields: row.fields.0,
            created_at: row.created_at,
        }
    }
}

/// Queries over `registrations`, run on a caller-provided connection
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationRepository;

impl RegistrationRepository {
    /// Record a completed scenario run
    pub async fn create(&self, conn: &mut PgConnection, registration: NewRegistration) -> Result<Registration, TicketBuddyError> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            r#"
            INSERT INTO registrations (id, user_id, scenario_name, fields, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, scenario_name, fields, created_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(&registration.user_id)
        .bind(&registration.scenario_name)
        .bind(Json(&registration.fields))
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }

    /// Registrations of one user, newest first
    pub async fn find_by_user(&self, conn: &mut PgConnection, user_id: &str) -> Result<Vec<Registration>, TicketBuddyError> {
        let rows = sqlx::query_as::<_, RegistrationRow>(
            "SELECT id, user_id, scenario_name, fields, created_at FROM registrations WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(Registration::from).collect())
    }

    /// Count total registrations
    pub async fn count(&self, conn: &mut PgConnection) -> Result<i64, TicketBuddyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM registrations")
            .fetch_one(conn)
            .await?;

        Ok(count.0)
    }
}
