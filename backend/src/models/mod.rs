//! Database models for the Purchasing & Inventory Management Platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
