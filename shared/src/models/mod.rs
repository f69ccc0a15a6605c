//! Domain vocabulary for the Purchasing & Inventory Management Platform
//!
//! Row and wire types live with the services that own them; this module
//! holds only the enumerations shared across the system.

mod notification;
mod order;

pub use notification::*;
pub use order::*;
