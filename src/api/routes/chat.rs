use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{Answer, DocumentMetadata};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
    pub conversation_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<DocumentMetadata>,
    pub conversation_id: String,
}

impl From<Answer> for ChatResponse {
    fn from(answer: Answer) -> Self {
        Self {
            response: answer.response,
            sources: answer.sources,
            conversation_id: answer.conversation_id,
        }
    }
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let answer = state
        .qa_service
        .ask(&request.text, &request.conversation_id)
        .await?;

    Ok(Json(ChatResponse::from(answer)))
}
