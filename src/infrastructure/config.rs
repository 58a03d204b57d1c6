use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::DomainError;

pub const DEFAULT_CONFIG_PATH: &str = "config/app.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub knowledge_base: KnowledgeBaseConfig,
    pub vector_store: VectorStoreConfig,
    pub intercom: IntercomConfig,
    pub memory: MemoryConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            model: "gpt-4".to_string(),
            temperature: 0.7,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            dimension: 1536,
            batch_size: 128,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    pub documents_dir: PathBuf,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreBackend {
    Local,
    Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorStoreBackend,
    pub persist_directory: PathBuf,
    pub qdrant_url: String,
    pub collection: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorStoreBackend::Local,
            persist_directory: PathBuf::from("./vector_db"),
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "knowledge_base".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntercomConfig {
    pub base_url: String,
    pub api_version: String,
    pub access_token: String,
    pub admin_id: Option<String>,
}

impl Default for IntercomConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.intercom.io".to_string(),
            api_version: "2.11".to_string(),
            access_token: String::new(),
            admin_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Unbounded when unset.
    pub max_turns: Option<usize>,
    /// Least recently used idle conversations are evicted past this count.
    pub max_conversations: Option<usize>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: None,
            max_conversations: Some(10_000),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub system: String,
    pub condense: String,
    pub no_context: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system: "Use the following pieces of context to answer the user's question. \
                     If you don't know the answer, just say that you don't know, \
                     don't try to make up an answer."
                .to_string(),
            condense: "Given the following conversation and a follow up question, rephrase \
                       the follow up question to be a standalone question, in its original \
                       language."
                .to_string(),
            no_context: "No relevant documents found.".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `$APP_CONFIG` (or [`DEFAULT_CONFIG_PATH`]) when present, then
    /// applies environment overrides and validates the result.
    pub fn load() -> Result<Self, DomainError> {
        let path = std::env::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let path = Path::new(&path);

        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::internal(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(raw).map_err(|e| DomainError::internal(format!("invalid config: {e}")))
    }

    pub fn apply_env(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), DomainError> {
        if let Some(host) = var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("SERVER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| DomainError::internal(format!("invalid SERVER_PORT: {port}")))?;
        }
        if let Some(token) = var("INTERCOM_ACCESS_TOKEN") {
            self.intercom.access_token = token;
        }
        if let Some(admin_id) = var("INTERCOM_ADMIN_ID") {
            self.intercom.admin_id = Some(admin_id);
        }
        if let Some(url) = var("QDRANT_URL") {
            self.vector_store.qdrant_url = url;
        }
        if let Some(dir) = var("DOCUMENTS_DIR") {
            self.knowledge_base.documents_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.rag.top_k == 0 {
            return Err(DomainError::internal("rag.top_k must be greater than zero"));
        }
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(DomainError::internal(
                "rag.chunk_overlap must be smaller than rag.chunk_size",
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(DomainError::internal("embedding.batch_size must be greater than zero"));
        }
        if self.intercom.access_token.trim().is_empty() {
            return Err(DomainError::internal(
                "INTERCOM_ACCESS_TOKEN is not set and intercom.access_token is empty",
            ));
        }
        if self
            .intercom
            .admin_id
            .as_deref()
            .map_or(true, |id| id.trim().is_empty())
        {
            return Err(DomainError::internal(
                "INTERCOM_ADMIN_ID is not set and intercom.admin_id is empty",
            ));
        }
        if self.memory.max_conversations == Some(0) {
            return Err(DomainError::internal(
                "memory.max_conversations must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = AppConfig::default();
        assert_eq!(config.rag.top_k, 3);
        assert_eq!(config.rag.chunk_size, 1000);
        assert_eq!(config.rag.chunk_overlap, 200);
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.vector_store.backend, VectorStoreBackend::Local);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            "llm:\n  provider: anthropic\n  model: claude-3-5-sonnet-latest\nrag:\n  top_k: 5\n",
        )
        .unwrap();

        assert_eq!(config.llm.provider, LlmProvider::Anthropic);
        assert_eq!(config.llm.timeout_seconds, 60);
        assert_eq!(config.rag.top_k, 5);
        assert_eq!(config.rag.chunk_size, 1000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SERVER_PORT", "9090"),
            ("INTERCOM_ACCESS_TOKEN", "tok"),
            ("INTERCOM_ADMIN_ID", "814"),
            ("DOCUMENTS_DIR", "/srv/docs"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.intercom.access_token, "tok");
        assert_eq!(config.intercom.admin_id.as_deref(), Some("814"));
        assert_eq!(config.knowledge_base.documents_dir, PathBuf::from("/srv/docs"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|k| (k == "SERVER_PORT").then(|| "eighty".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_chunking_and_missing_token() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err());

        config.intercom.access_token = "tok".into();
        config.intercom.admin_id = Some("814".into());
        assert!(config.validate().is_ok());

        config.rag.chunk_overlap = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_admin_id() {
        let mut config = AppConfig::default();
        config.intercom.access_token = "tok".into();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, DomainError::Internal(msg) if msg.contains("INTERCOM_ADMIN_ID")));

        config.intercom.admin_id = Some("  ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_limits() {
        let config = AppConfig::from_yaml("memory:\n  max_turns: 5\n").unwrap();
        assert_eq!(config.memory.max_turns, Some(5));
        assert_eq!(config.memory.max_conversations, Some(10_000));

        let mut config = AppConfig::from_yaml("memory:\n  max_conversations: 0\n").unwrap();
        config.intercom.access_token = "tok".into();
        config.intercom.admin_id = Some("814".into());
        assert!(config.validate().is_err());
    }
}
