//! Farming assistant chatbot

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::external::{ChatMessage, LlmClient};

const SYSTEM_PROMPT: &str = "You are GreenBot, a friendly and knowledgeable AI assistant for Kenyan smallholder farmers. \
Your goal is to provide helpful, concise, and practical advice on sustainable farming and climate action. \
Answer questions related to: soil health, pest control, crop selection, water management, and reducing carbon footprint. \
Do NOT answer questions outside of this scope (e.g., politics, general knowledge). \
Keep your answers encouraging and easy to understand.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Clone)]
pub struct ChatbotService {
    llm: LlmClient,
}

impl ChatbotService {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub async fn ask(&self, request: ChatRequest) -> AppResult<ChatReply> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(AppError::validation("prompt", "Prompt cannot be empty"));
        }

        let reply = self
            .llm
            .complete_text(vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)])
            .await?;

        Ok(ChatReply { reply })
    }
}
