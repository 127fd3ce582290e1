//! Database configuration

use serde::{Deserialize, Serialize};

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://tillbook.db?mode=rwc".to_string(),
            max_connections: 8,
            acquire_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    /// Mask sensitive parts of the URL for logging
    pub fn url_masked(&self) -> String {
        mask_url(&self.url)
    }
}

fn mask_url(url: &str) -> String {
    // Simple masking: replace password with ***
    if let (Some(at_pos), Some(scheme_end)) = (url.find('@'), url.find("://")) {
        if scheme_end + 3 <= at_pos {
            let scheme = &url[..scheme_end + 3];
            let after_at = &url[at_pos..];
            let user_pass = &url[scheme_end + 3..at_pos];
            if let Some(colon_pos) = user_pass.find(':') {
                let user = &user_pass[..colon_pos];
                return format!("{}{}:***{}", scheme, user, after_at);
            }
        }
    }
    url.to_string()
}
