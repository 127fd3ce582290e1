//! Role-scoped authorization
//!
//! Ownership is strict equality between the record's owner and the
//! principal's id. The only exception is the business owner's read access
//! to every record of their own business.

use serde::{Deserialize, Serialize};
use std::fmt;

use tillbook_types::{BusinessId, EntryKind, Principal, Role, UserId};

use crate::error::{PolicyRejection, PolicyResult};

const UNAUTHORIZED: &str = "Unauthorized";
const STORE_HAS_DEPENDENTS: &str =
    "Cannot delete store with associated income entries or expenses";

/// Requested operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the action is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// An income or expense record. For create, the owner is the would-be owner.
    Entry {
        kind: EntryKind,
        owner: UserId,
        business_id: BusinessId,
    },
    /// A store, or the store collection of a business
    Store { business_id: BusinessId },
    /// An employee account, or the employee collection of a business
    Employee { business_id: BusinessId },
    /// The principal's own credentials
    OwnPassword,
}

impl Target {
    pub fn entry(kind: EntryKind, owner: UserId, business_id: BusinessId) -> Self {
        Self::Entry {
            kind,
            owner,
            business_id,
        }
    }
}

/// Tagged authorization outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    /// No verified principal
    Unauthenticated,
    /// Authenticated but not permitted
    Forbidden { reason: String },
}

impl AccessDecision {
    fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn into_result(self) -> PolicyResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Unauthenticated => Err(PolicyRejection::Unauthenticated),
            Self::Forbidden { reason } => Err(PolicyRejection::Forbidden { reason }),
        }
    }
}

/// Which records a principal may list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadScope {
    /// Only records the principal owns
    Own(UserId),
    /// Every record of the business
    Business(BusinessId),
}

/// Records still referencing a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependentRecords {
    pub income: u64,
    pub expense: u64,
}

impl DependentRecords {
    pub fn is_empty(&self) -> bool {
        self.income == 0 && self.expense == 0
    }
}

/// Role x ownership matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationPolicy {
    /// When set, employees may not edit or delete expenses, even their own
    #[serde(default)]
    pub expense_edits_owner_only: bool,
}

impl AuthorizationPolicy {
    pub const fn new(expense_edits_owner_only: bool) -> Self {
        Self {
            expense_edits_owner_only,
        }
    }

    /// Decide whether `principal` may perform `action` on `target`.
    pub fn authorize(
        &self,
        principal: Option<&Principal>,
        action: Action,
        target: Target,
    ) -> AccessDecision {
        let Some(principal) = principal else {
            return AccessDecision::Unauthenticated;
        };

        let decision = match target {
            Target::Entry {
                kind,
                owner,
                business_id,
            } => self.authorize_entry(principal, action, kind, owner, business_id),
            Target::Store { business_id } => {
                if business_id != principal.business_id {
                    AccessDecision::forbidden(UNAUTHORIZED)
                } else if action == Action::Read || principal.role == Role::Business {
                    AccessDecision::Allowed
                } else {
                    AccessDecision::forbidden(UNAUTHORIZED)
                }
            }
            Target::Employee { business_id } => {
                if principal.role == Role::Business && business_id == principal.business_id {
                    AccessDecision::Allowed
                } else {
                    AccessDecision::forbidden(UNAUTHORIZED)
                }
            }
            Target::OwnPassword => AccessDecision::Allowed,
        };

        if let AccessDecision::Forbidden { reason } = &decision {
            tracing::debug!(
                principal = %principal.id,
                role = %principal.role,
                action = %action,
                reason = %reason,
                "Access denied"
            );
        }

        decision
    }

    fn authorize_entry(
        &self,
        principal: &Principal,
        action: Action,
        kind: EntryKind,
        owner: UserId,
        business_id: BusinessId,
    ) -> AccessDecision {
        let is_owner = owner == principal.id && business_id == principal.business_id;

        match action {
            Action::Read => {
                if is_owner
                    || (principal.role == Role::Business && business_id == principal.business_id)
                {
                    AccessDecision::Allowed
                } else {
                    AccessDecision::forbidden(UNAUTHORIZED)
                }
            }
            Action::Create => {
                if is_owner {
                    AccessDecision::Allowed
                } else {
                    AccessDecision::forbidden(UNAUTHORIZED)
                }
            }
            Action::Update | Action::Delete => {
                if !is_owner {
                    return AccessDecision::forbidden(not_owner_reason(kind, action));
                }
                if kind == EntryKind::Expense
                    && self.expense_edits_owner_only
                    && principal.role == Role::Employee
                {
                    let verb = if action == Action::Update { "edit" } else { "delete" };
                    return AccessDecision::forbidden(format!(
                        "Only business owners can {verb} expenses"
                    ));
                }
                AccessDecision::Allowed
            }
        }
    }

    /// Scope for list queries.
    pub fn read_scope(&self, principal: &Principal) -> ReadScope {
        match principal.role {
            Role::Business => ReadScope::Business(principal.business_id),
            Role::Employee => ReadScope::Own(principal.id),
        }
    }

    /// Referential-integrity guard for store deletion.
    pub fn check_store_deletion(&self, dependents: DependentRecords) -> PolicyResult<()> {
        if dependents.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            income = dependents.income,
            expense = dependents.expense,
            "{}",
            STORE_HAS_DEPENDENTS
        );
        Err(PolicyRejection::DependentRecords {
            income: dependents.income,
            expense: dependents.expense,
        })
    }
}

fn not_owner_reason(kind: EntryKind, action: Action) -> &'static str {
    match (kind, action) {
        (EntryKind::Expense, Action::Update) => "Cannot edit other users expenses",
        (EntryKind::Expense, Action::Delete) => "Cannot delete other users expenses",
        _ => UNAUTHORIZED,
    }
}
