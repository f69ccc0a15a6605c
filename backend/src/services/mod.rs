//! Business logic services

pub mod expiration;
pub mod notification;
pub mod order;
pub mod product;

pub use expiration::{ExpirationScheduler, ExpirationService};
pub use notification::NotificationService;
pub use order::OrderService;
pub use product::ProductService;
