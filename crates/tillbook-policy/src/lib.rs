//! Tillbook Policy - date-window validation and role-scoped authorization
//!
//! Every mutating bookkeeping endpoint runs two independent checks before it
//! writes:
//!
//! - [`AuthorizationPolicy`]: may this [`Principal`](tillbook_types::Principal)
//!   perform this [`Action`] on this [`Target`]?
//! - [`DateWindowPolicy`]: does the record's calendar date fall inside the
//!   window computed from "now"?
//!
//! Both are pure functions of their inputs. "Now" is supplied by a [`Clock`]
//! so callers and tests control it, and each endpoint's window is a named
//! entry in [`PolicyConfig`].
//!
//! ```text
//! fetch record ─▶ AuthorizationPolicy ─▶ DateWindowPolicy ─▶ write
//! ```

pub mod authz;
pub mod clock;
pub mod config;
pub mod date;
pub mod error;
pub mod window;

pub use authz::{AccessDecision, Action, AuthorizationPolicy, DependentRecords, ReadScope, Target};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EntryWindows, PolicyConfig};
pub use date::parse_calendar_date;
pub use error::{PolicyRejection, PolicyResult, RejectionKind};
pub use window::{DateWindow, DateWindowPolicy, DayBoundary, WindowDecision, WindowRule};
