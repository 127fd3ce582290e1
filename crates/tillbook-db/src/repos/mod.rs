//! Repository implementations

mod expense;
mod income;
mod store;
mod user;

pub use expense::ExpenseRepo;
pub use income::IncomeRepo;
pub use store::StoreRepo;
pub use user::UserRepo;

use sqlx::{QueryBuilder, Sqlite};

use crate::models::{EntryFilter, EntryScope};

/// Append the shared entry-listing predicates. `alias` is the entry table alias.
pub(crate) fn push_entry_filter(
    builder: &mut QueryBuilder<'_, Sqlite>,
    alias: &str,
    filter: &EntryFilter,
) {
    match filter.scope {
        EntryScope::Owner(user_id) => {
            builder.push(format!(" WHERE {alias}.user_id = "));
            builder.push_bind(user_id);
        }
        EntryScope::Business(business_id) => {
            builder.push(format!(" WHERE {alias}.business_id = "));
            builder.push_bind(business_id);
        }
    }

    if let Some((start, end)) = filter.range {
        builder.push(format!(" AND {alias}.date >= "));
        builder.push_bind(start);
        builder.push(format!(" AND {alias}.date <= "));
        builder.push_bind(end);
    }

    if let Some(store_id) = filter.store_id {
        builder.push(format!(" AND {alias}.store_id = "));
        builder.push_bind(store_id);
    }

    builder.push(format!(" ORDER BY {alias}.date DESC, {alias}.created_at DESC"));
}
