//! Organization and cluster membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role recorded for a member.
///
/// Stored and reported only; the login gate does not consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Guest,
    Developer,
    Admin,
}

/// A user's membership in an organization or cluster.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub username: String,
    pub role: MemberRole,
    pub creator: String,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(username: impl Into<String>, role: MemberRole, creator: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role,
            creator: creator.into(),
            created_at: Utc::now(),
        }
    }
}
