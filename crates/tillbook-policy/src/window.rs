//! Date window policy
//!
//! Decides whether a dated record may be created, edited or deleted "now".
//! A window is a pair of inclusive calendar days computed fresh from the
//! current instant on every check.

use chrono::{DateTime, Datelike, Days, FixedOffset, Local, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use tillbook_types::EntryKind;

use crate::authz::Action;
use crate::date::parse_calendar_date;
use crate::error::{PolicyRejection, PolicyResult};

/// Largest UTC offset accepted for [`DayBoundary::FixedOffset`], in minutes.
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

// =============================================================================
// Window rules
// =============================================================================

/// How the allowed range is derived from today's date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowRule {
    /// `today - lookback_days ..= today + lookahead_days`
    Rolling {
        lookback_days: u32,
        #[serde(default)]
        lookahead_days: u32,
    },
    /// First day of the previous month through the last day of this month
    CalendarMonth,
}

impl WindowRule {
    /// 15 days back plus one day of slack for client/server zone skew
    pub const fn rolling_15_with_slack() -> Self {
        Self::Rolling {
            lookback_days: 15,
            lookahead_days: 1,
        }
    }

    /// 15 days back, nothing ahead
    pub const fn rolling_15_strict() -> Self {
        Self::Rolling {
            lookback_days: 15,
            lookahead_days: 0,
        }
    }

    /// Previous calendar month plus the current one
    pub const fn previous_and_current_month() -> Self {
        Self::CalendarMonth
    }

    /// Compute the window around `today`.
    ///
    /// Saturates at the representable date range instead of failing.
    pub fn window_for(&self, today: NaiveDate) -> DateWindow {
        match *self {
            Self::Rolling {
                lookback_days,
                lookahead_days,
            } => DateWindow {
                earliest: today
                    .checked_sub_days(Days::new(u64::from(lookback_days)))
                    .unwrap_or(NaiveDate::MIN),
                latest: today
                    .checked_add_days(Days::new(u64::from(lookahead_days)))
                    .unwrap_or(NaiveDate::MAX),
            },
            Self::CalendarMonth => {
                let first_of_month = today.with_day(1).unwrap_or(today);
                let earliest = first_of_month
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(NaiveDate::MIN);
                let latest = first_of_month
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(NaiveDate::MAX);
                DateWindow { earliest, latest }
            }
        }
    }

    /// User-facing reason for rejecting `action` on a `kind` entry.
    ///
    /// These strings are shown to clients verbatim.
    pub fn rejection_reason(&self, kind: EntryKind, action: Action) -> String {
        match (*self, action) {
            (Self::Rolling { lookback_days, .. }, Action::Create) => format!(
                "Can only add {} for the last {} days",
                kind.plural_noun(),
                lookback_days
            ),
            (Self::Rolling { lookback_days, .. }, Action::Update) => match kind {
                EntryKind::Income => format!("Cannot edit entries older than {lookback_days} days"),
                EntryKind::Expense => {
                    format!("Can only edit expenses for the last {lookback_days} days")
                }
            },
            (Self::Rolling { lookback_days, .. }, Action::Delete) => match kind {
                EntryKind::Income => {
                    format!("Cannot delete entries older than {lookback_days} days")
                }
                EntryKind::Expense => {
                    format!("Can only delete expenses for the last {lookback_days} days")
                }
            },
            (Self::CalendarMonth, Action::Create) => format!(
                "Can only add {} for the last month and current month",
                kind.plural_noun()
            ),
            (Self::CalendarMonth, Action::Update) => {
                "Cannot edit entries older than last month".to_string()
            }
            (Self::CalendarMonth, Action::Delete) => {
                "Cannot delete entries older than last month".to_string()
            }
            (_, Action::Read) => "Date is outside the allowed range".to_string(),
        }
    }
}

impl Default for WindowRule {
    fn default() -> Self {
        Self::rolling_15_with_slack()
    }
}

impl fmt::Display for WindowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rolling {
                lookback_days,
                lookahead_days,
            } => write!(f, "rolling(-{lookback_days}d, +{lookahead_days}d)"),
            Self::CalendarMonth => f.write_str("calendar_month"),
        }
    }
}

// =============================================================================
// Day boundary
// =============================================================================

/// Which time zone decides the calendar day "now" falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "zone", rename_all = "snake_case")]
pub enum DayBoundary {
    #[default]
    Utc,
    /// The server's local zone
    Local,
    FixedOffset { minutes: i32 },
}

impl DayBoundary {
    /// Calendar day of `now` under this boundary.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match *self {
            Self::Utc => now.date_naive(),
            Self::Local => now.with_timezone(&Local).date_naive(),
            Self::FixedOffset { minutes } => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(|offset| now.with_timezone(&offset).date_naive())
                .unwrap_or_else(|| now.date_naive()),
        }
    }
}

// =============================================================================
// Windows and decisions
// =============================================================================

/// Inclusive range of calendar days.
///
/// `earliest` stands for the start of its day, `latest` for the end of its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.earliest <= date && date <= self.latest
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.earliest, self.latest)
    }
}

/// Outcome of a window check, kept for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowDecision {
    /// The parsed target, `None` when the input was malformed
    pub target: Option<NaiveDate>,
    pub window: DateWindow,
    pub allowed: bool,
}

/// A window rule evaluated under a day boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateWindowPolicy {
    pub rule: WindowRule,
    #[serde(default)]
    pub boundary: DayBoundary,
}

impl DateWindowPolicy {
    pub const fn new(rule: WindowRule, boundary: DayBoundary) -> Self {
        Self { rule, boundary }
    }

    /// The window in force at `now`
    pub fn window_at(&self, now: DateTime<Utc>) -> DateWindow {
        self.rule.window_for(self.boundary.today(now))
    }

    pub fn evaluate(&self, target: NaiveDate, now: DateTime<Utc>) -> WindowDecision {
        let window = self.window_at(now);
        WindowDecision {
            target: Some(target),
            window,
            allowed: window.contains(target),
        }
    }

    /// Evaluate a raw `YYYY-MM-DD` string. Malformed input is never allowed.
    pub fn evaluate_str(&self, raw: &str, now: DateTime<Utc>) -> WindowDecision {
        match parse_calendar_date(raw) {
            Some(target) => self.evaluate(target, now),
            None => WindowDecision {
                target: None,
                window: self.window_at(now),
                allowed: false,
            },
        }
    }

    /// Check `target` for `action` on a `kind` entry.
    pub fn check(
        &self,
        target: NaiveDate,
        now: DateTime<Utc>,
        kind: EntryKind,
        action: Action,
    ) -> PolicyResult<()> {
        let decision = self.evaluate(target, now);
        if decision.allowed {
            return Ok(());
        }

        tracing::debug!(
            kind = %kind,
            action = %action,
            target = %target,
            earliest = %decision.window.earliest,
            latest = %decision.window.latest,
            rule = %self.rule,
            "Date outside allowed window"
        );

        Err(PolicyRejection::OutOfWindow {
            reason: self.rule.rejection_reason(kind, action),
            window: decision.window,
        })
    }

    /// Parse and check a raw date, returning the parsed day when allowed.
    pub fn check_str(
        &self,
        raw: &str,
        now: DateTime<Utc>,
        kind: EntryKind,
        action: Action,
    ) -> PolicyResult<NaiveDate> {
        let target = parse_calendar_date(raw).ok_or_else(|| {
            tracing::debug!(raw = %raw, "Malformed calendar date");
            PolicyRejection::MalformedDate {
                raw: raw.to_string(),
            }
        })?;
        self.check(target, now, kind, action)?;
        Ok(target)
    }
}
