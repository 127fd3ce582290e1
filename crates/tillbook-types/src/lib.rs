//! Tillbook Types - Canonical domain types for multi-tenant bookkeeping
//!
//! This crate contains the foundational types shared by every other tillbook
//! crate, with zero dependencies on them:
//!
//! - Identity types (UserId, BusinessId)
//! - The authenticated [`Principal`] and its [`Role`]
//! - Entry kinds (income vs. expense) and expense types

pub mod identity;
pub mod principal;
pub mod entry;
pub mod error;

pub use identity::*;
pub use principal::*;
pub use entry::*;
pub use error::*;
