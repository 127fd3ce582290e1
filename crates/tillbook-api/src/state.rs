//! Application state shared across handlers
//!
//! Contains the database, authentication services, the policy
//! configuration and the clock every window check reads "now" from.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use tillbook_auth::AuthService;
use tillbook_db::Database;
use tillbook_policy::{AuthorizationPolicy, Clock, PolicyConfig, SystemClock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connections
    pub db: Arc<Database>,
    /// Authentication service
    pub auth: Arc<AuthService>,
    /// Window rules and authorization switches
    pub policy: Arc<PolicyConfig>,
    /// Source of "now"
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state on the system clock
    pub fn new(db: Arc<Database>, auth: Arc<AuthService>, policy: PolicyConfig) -> Self {
        Self {
            db,
            auth,
            policy: Arc::new(policy),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn authorization(&self) -> AuthorizationPolicy {
        self.policy.authorization()
    }
}
