//! Shared types and domain rules for the GreenFund platform
//!
//! Everything here is free of I/O: the risk assessment engine, badge
//! milestones, emissions bucketing and request validation helpers used by
//! the backend.

pub mod assessment;
pub mod models;
pub mod types;
pub mod validation;

pub use assessment::*;
pub use models::*;
pub use types::*;
pub use validation::*;
