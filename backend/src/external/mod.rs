//! External API integrations

pub mod geocoding;
pub mod llm;
pub mod weather;

pub use geocoding::GeocodingClient;
pub use llm::{ChatMessage, LlmClient};
pub use weather::WeatherClient;
