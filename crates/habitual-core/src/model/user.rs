//! Users, as far as this engine needs them.
//!
//! Identity, roles, and credentials live outside the core; this is the
//! minimal projection the materializer and aggregator key rate rows on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            username: username.into(),
            email,
            created_at: Utc::now(),
        }
    }
}
