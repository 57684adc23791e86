//! Per-request identity context.
//!
//! Created empty for every request, filled in by the login gate, read by the
//! handler that serves the request and dropped with it. It is never shared
//! across requests.

use crate::domain::user::User;

/// The identity resolved for the current request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    user: Option<User>,
    username: Option<String>,
}

impl RequestContext {
    /// Context for a request that passed no login gate.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for a request whose identity was resolved to `user`.
    ///
    /// The username is taken from the resolved record, not from whatever the
    /// caller presented, so audit output follows the authoritative source.
    pub fn logged_in(user: User) -> Self {
        Self {
            username: Some(user.name.clone()),
            user: Some(user),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}
