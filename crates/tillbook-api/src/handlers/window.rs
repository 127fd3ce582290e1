//! Date-window diagnostic
//!
//! Shows how the server sees "today" and which dates a given kind and
//! action would currently accept. Useful when clients in other time zones
//! report rejected dates.

use axum::{extract::State, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tillbook_policy::{Action, DateWindow, DayBoundary, WindowRule};
use tillbook_types::EntryKind;

use crate::extractors::ApiQuery;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowQuery {
    /// `YYYY-MM-DD` date to evaluate
    pub date: Option<String>,
    /// Defaults to income
    pub kind: Option<EntryKind>,
    /// Defaults to create
    pub action: Option<Action>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateVerdict {
    pub raw: String,
    pub parsed: Option<NaiveDate>,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowResponse {
    pub server_time: DateTime<Utc>,
    pub day_boundary: DayBoundary,
    pub today: NaiveDate,
    pub kind: EntryKind,
    pub action: Action,
    pub rule: WindowRule,
    pub window: DateWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateVerdict>,
}

pub async fn date_window(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<WindowQuery>,
) -> Json<WindowResponse> {
    let now = state.now();
    let kind = query.kind.unwrap_or(EntryKind::Income);
    let action = query.action.unwrap_or(Action::Create);
    let policy = state.policy.window_policy(kind, action);

    let date = query.date.map(|raw| {
        let decision = policy.evaluate_str(&raw, now);
        let reason = match (decision.allowed, decision.target) {
            (true, _) => None,
            (false, None) => Some(format!("Invalid date: {}", raw)),
            (false, Some(_)) => Some(policy.rule.rejection_reason(kind, action)),
        };
        DateVerdict {
            raw,
            parsed: decision.target,
            allowed: decision.allowed,
            reason,
        }
    });

    Json(WindowResponse {
        server_time: now,
        day_boundary: policy.boundary,
        today: policy.boundary.today(now),
        kind,
        action,
        rule: policy.rule,
        window: policy.window_at(now),
        date,
    })
}
