//! Data Transfer Objects
//!
//! Request and response structures for the API. Field names are camelCase
//! on the wire.

pub mod auth;
pub mod common;
pub mod employee;
pub mod entry;
pub mod store;

pub use auth::*;
pub use common::*;
pub use employee::*;
pub use entry::*;
pub use store::*;
