//! Business logic services for the GreenFund platform

pub mod activity;
pub mod advisory;
pub mod auth;
pub mod badge;
pub mod badge_award;
pub mod chatbot;
pub mod climate;
pub mod farm;
pub mod forum;
pub mod notification;
pub mod soil;
pub mod user;

pub use activity::ActivityService;
pub use advisory::AdvisoryService;
pub use auth::AuthService;
pub use badge::BadgeService;
pub use badge_award::BadgeCoordinator;
pub use chatbot::ChatbotService;
pub use climate::ClimateService;
pub use farm::FarmService;
pub use forum::ForumService;
pub use notification::NotificationService;
pub use soil::SoilService;
pub use user::UserService;
