//! Registration model
//!
//! A registration is the immutable record written when a scenario reaches its
//! terminal step. It carries exactly the fields collected during the run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: Uuid,
    pub user_id: String,
    pub scenario_name: String,
    pub fields: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").map(String::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.fields.get("email").map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRegistration {
    pub user_id: String,
    pub scenario_name: String,
    pub fields: BTreeMap<String, String>,
}

impl NewRegistration {
    pub fn into_registration(self, id: Uuid, created_at: DateTime<Utc>) -> Registration {
        Registration {
            id,
            user_id: self.user_id,
            scenario_name: self.scenario_name,
            fields: self.fields,
            created_at,
        }
    }
}
