//! Domain models for the GreenFund platform

mod activity;
mod advisory;
mod badge;
mod soil;
mod weather;

pub use activity::*;
pub use advisory::*;
pub use badge::*;
pub use soil::*;
pub use weather::*;
