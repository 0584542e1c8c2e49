//! User state model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::context::ConversationContext;

/// Position of one user inside a running scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub user_id: String,
    pub scenario_name: String,
    pub step_name: String,
    pub context: ConversationContext,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUserState {
    pub user_id: String,
    pub scenario_name: String,
    pub step_name: String,
    pub context: ConversationContext,
}

impl NewUserState {
    pub fn into_state(self, now: DateTime<Utc>) -> UserState {
        UserState {
            user_id: self.user_id,
            scenario_name: self.scenario_name,
            step_name: self.step_name,
            context: self.context,
            created_at: now,
            updated_at: now,
        }
    }
}
