//! HTTP request handlers

pub mod activity;
pub mod auth;
pub mod badge;
pub mod chatbot;
pub mod climate;
pub mod farm;
pub mod forum;
pub mod health;
pub mod notification;
pub mod soil;
pub mod user;

pub use activity::*;
pub use auth::*;
pub use badge::*;
pub use chatbot::*;
pub use climate::*;
pub use farm::*;
pub use forum::*;
pub use health::*;
pub use notification::*;
pub use soil::*;
pub use user::*;
