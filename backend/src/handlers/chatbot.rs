//! Chatbot handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::chatbot::{ChatReply, ChatRequest};
use crate::services::ChatbotService;
use crate::AppState;

pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatReply>> {
    let service = ChatbotService::new(state.llm);
    Ok(Json(service.ask(request).await?))
}
