//! Policy configuration
//!
//! Every (entry kind, action) pair names its own window rule, so a
//! deployment picks each one deliberately instead of inheriting whichever
//! variant a given handler happened to hard-code.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tillbook_types::EntryKind;

use crate::authz::{Action, AuthorizationPolicy};
use crate::error::PolicyResult;
use crate::window::{DateWindowPolicy, DayBoundary, WindowRule, MAX_OFFSET_MINUTES};

/// Longest rolling lookback accepted by [`PolicyConfig::validate`]
pub const MAX_LOOKBACK_DAYS: u32 = 366;

/// Window rules for one entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryWindows {
    #[serde(default)]
    pub create: WindowRule,
    #[serde(default)]
    pub update: WindowRule,
    #[serde(default)]
    pub delete: WindowRule,
}

impl EntryWindows {
    /// The same rule for every action
    pub const fn uniform(rule: WindowRule) -> Self {
        Self {
            create: rule,
            update: rule,
            delete: rule,
        }
    }

    pub fn rule_for(&self, action: Action) -> WindowRule {
        match action {
            Action::Create | Action::Read => self.create,
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }
}

impl Default for EntryWindows {
    fn default() -> Self {
        Self::uniform(WindowRule::default())
    }
}

/// Policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Zone deciding which calendar day "now" is
    #[serde(default)]
    pub day_boundary: DayBoundary,
    /// Only business owners may edit or delete expenses
    #[serde(default)]
    pub expense_edits_owner_only: bool,
    #[serde(default)]
    pub income: EntryWindows,
    #[serde(default)]
    pub expense: EntryWindows,
}

impl PolicyConfig {
    /// Windows for `kind`
    pub fn windows(&self, kind: EntryKind) -> &EntryWindows {
        match kind {
            EntryKind::Income => &self.income,
            EntryKind::Expense => &self.expense,
        }
    }

    /// Window policy for `action` on a `kind` entry
    pub fn window_policy(&self, kind: EntryKind, action: Action) -> DateWindowPolicy {
        DateWindowPolicy::new(self.windows(kind).rule_for(action), self.day_boundary)
    }

    pub fn authorization(&self) -> AuthorizationPolicy {
        AuthorizationPolicy::new(self.expense_edits_owner_only)
    }

    /// Check an already-stored date.
    pub fn check_entry_date(
        &self,
        kind: EntryKind,
        action: Action,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> PolicyResult<()> {
        self.window_policy(kind, action).check(date, now, kind, action)
    }

    /// Parse and check a client-supplied `YYYY-MM-DD` date.
    pub fn check_entry_date_str(
        &self,
        kind: EntryKind,
        action: Action,
        raw: &str,
        now: DateTime<Utc>,
    ) -> PolicyResult<NaiveDate> {
        self.window_policy(kind, action).check_str(raw, now, kind, action)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let DayBoundary::FixedOffset { minutes } = self.day_boundary {
            if minutes.abs() > MAX_OFFSET_MINUTES {
                errors.push(format!(
                    "Day boundary offset must be within +/-{MAX_OFFSET_MINUTES} minutes"
                ));
            }
        }

        for kind in [EntryKind::Income, EntryKind::Expense] {
            for action in [Action::Create, Action::Update, Action::Delete] {
                if let WindowRule::Rolling {
                    lookback_days,
                    lookahead_days,
                } = self.windows(kind).rule_for(action)
                {
                    if lookback_days > MAX_LOOKBACK_DAYS {
                        errors.push(format!(
                            "{kind} {action} lookback must be at most {MAX_LOOKBACK_DAYS} days"
                        ));
                    }
                    if lookahead_days > lookback_days.max(1) {
                        errors.push(format!(
                            "{kind} {action} lookahead must not exceed its lookback"
                        ));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
