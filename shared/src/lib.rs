//! Shared types and models for the Purchasing & Inventory Management Platform
//!
//! This crate contains the domain vocabulary shared between the backend and
//! other components of the system: entity models, the order status graph,
//! and pure validation helpers that do not require a database.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
