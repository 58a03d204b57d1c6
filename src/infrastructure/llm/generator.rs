use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::{anthropic, openai};
use std::time::Duration;
use tracing::instrument;

use super::prompt;
use crate::domain::{
    ports::{GenerationRequest, Generator},
    DomainError, Message,
};
use crate::infrastructure::config::{LlmConfig, LlmProvider, PromptsConfig};

const ANTHROPIC_MAX_TOKENS: u64 = 1024;

enum Backend {
    OpenAi(openai::Client),
    Anthropic(anthropic::Client),
}

/// Chat-completion generator backed by a rig provider client.
pub struct RigGenerator {
    backend: Backend,
    model: String,
    temperature: f64,
    timeout: Duration,
    prompts: PromptsConfig,
}

impl RigGenerator {
    /// Fails instead of panicking when the provider's API key is not set.
    pub fn from_config(llm: &LlmConfig, prompts: &PromptsConfig) -> Result<Self, DomainError> {
        let backend = match llm.provider {
            LlmProvider::OpenAi => {
                require_env("OPENAI_API_KEY")?;
                Backend::OpenAi(openai::Client::from_env())
            }
            LlmProvider::Anthropic => {
                require_env("ANTHROPIC_API_KEY")?;
                Backend::Anthropic(anthropic::Client::from_env())
            }
        };

        Ok(Self {
            backend,
            model: llm.model.clone(),
            temperature: llm.temperature,
            timeout: Duration::from_secs(llm.timeout_seconds),
            prompts: prompts.clone(),
        })
    }

    async fn complete(&self, preamble: &str, prompt: &str) -> Result<String, DomainError> {
        let call = async {
            match &self.backend {
                Backend::OpenAi(client) => {
                    client
                        .agent(&self.model)
                        .preamble(preamble)
                        .temperature(self.temperature)
                        .build()
                        .prompt(prompt)
                        .await
                }
                Backend::Anthropic(client) => {
                    client
                        .agent(&self.model)
                        .preamble(preamble)
                        .temperature(self.temperature)
                        .max_tokens(ANTHROPIC_MAX_TOKENS)
                        .build()
                        .prompt(prompt)
                        .await
                }
            }
        };

        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| DomainError::timeout("Language model call timed out"))?
            .map_err(|e| DomainError::external(format!("Language model failed: {e}")))
    }
}

#[async_trait]
impl Generator for RigGenerator {
    #[instrument(skip_all, fields(model = %self.model, context = request.context.len()))]
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, DomainError> {
        let preamble = prompt::answer_preamble(&self.prompts, request.context);
        let user_prompt = prompt::answer_prompt(request.question, request.history);
        self.complete(&preamble, &user_prompt).await
    }

    #[instrument(skip_all, fields(model = %self.model, history = history.len()))]
    async fn condense(&self, question: &str, history: &[Message]) -> Result<String, DomainError> {
        let condense = prompt::condense_prompt(&self.prompts, question, history);
        let standalone = self
            .complete("You rewrite questions. Reply with the question only.", &condense)
            .await?;

        let standalone = standalone.trim();
        Ok(if standalone.is_empty() {
            question.to_string()
        } else {
            standalone.to_string()
        })
    }
}

pub(crate) fn require_env(key: &str) -> Result<(), DomainError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(DomainError::internal(format!("{key} is not set"))),
    }
}
