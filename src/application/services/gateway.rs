use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use super::QaService;
use crate::domain::{ports::MessagingPlatform, DomainError};

pub const USER_MESSAGE_TOPIC: &str = "conversation.user.created";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Replied { conversation_id: String },
    Ignored { topic: Option<String> },
}

/// A user message extracted from an Intercom webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub conversation_id: String,
    pub body: String,
}

impl InboundMessage {
    /// Reads `data.item.id` and `data.item.conversation_message.body`.
    pub fn from_payload(payload: &Value) -> Result<Self, DomainError> {
        let item = payload
            .pointer("/data/item")
            .ok_or_else(|| DomainError::malformed("missing data.item"))?;

        let conversation_id = match item.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(DomainError::malformed("missing data.item.id")),
        };
        if !is_valid_conversation_id(&conversation_id) {
            return Err(DomainError::malformed("invalid data.item.id"));
        }

        let body = item
            .pointer("/conversation_message/body")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::malformed("missing data.item.conversation_message.body"))?
            .to_string();

        Ok(Self {
            conversation_id,
            body,
        })
    }
}

/// Intercom conversation ids are alphanumeric, with `-` and `_` allowed.
fn is_valid_conversation_id(id: &str) -> bool {
    id.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub struct MessagingGateway {
    qa: Arc<QaService>,
    platform: Arc<dyn MessagingPlatform>,
}

impl MessagingGateway {
    pub fn new(qa: Arc<QaService>, platform: Arc<dyn MessagingPlatform>) -> Self {
        Self { qa, platform }
    }

    #[instrument(skip_all, fields(topic = tracing::field::Empty))]
    pub async fn handle_inbound_event(&self, event: &Value) -> Result<WebhookOutcome, DomainError> {
        let topic = event.get("topic").and_then(Value::as_str);
        tracing::Span::current().record("topic", topic.unwrap_or("<none>"));

        if topic != Some(USER_MESSAGE_TOPIC) {
            tracing::debug!("ignoring webhook topic");
            return Ok(WebhookOutcome::Ignored {
                topic: topic.map(str::to_string),
            });
        }

        let message = InboundMessage::from_payload(event)?;
        let answer = self.qa.ask(&message.body, &message.conversation_id).await?;

        self.platform
            .reply_as_admin(&message.conversation_id, &answer.response)
            .await?;

        Ok(WebhookOutcome::Replied {
            conversation_id: message.conversation_id,
        })
    }
}
