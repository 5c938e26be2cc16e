use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_COLLECTION: &str = "rulesmith_chunks";

/// Chunking, retrieval and indexing knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    /// Upper bound on bytes of chunk text accepted by a single indexing run
    pub max_index_bytes: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            max_index_bytes: 512 * 1024,
        }
    }
}

impl FromEnv for RagConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            chunk_size: env_parse("RAG_CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: env_parse("RAG_CHUNK_OVERLAP", defaults.chunk_overlap)?,
            top_k: env_parse("RAG_TOP_K", defaults.top_k)?,
            max_index_bytes: env_parse("RAG_MAX_INDEX_BYTES", defaults.max_index_bytes)?,
        })
    }
}

/// OpenAI-compatible API settings shared by embeddings and chat completions
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout_secs: 60,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `None` when `OPENAI_API_KEY` is unset, so callers can run without RAG.
    pub fn from_env_optional() -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = env_optional("OPENAI_API_KEY") else {
            return Ok(None);
        };

        Ok(Some(Self {
            api_key,
            base_url: env_or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            embedding_model: env_or_default("OPENAI_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            chat_model: env_or_default("OPENAI_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            timeout_secs: env_parse("OPENAI_TIMEOUT_SECS", 60u64)?,
        }))
    }
}

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub timeout_secs: u64,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            collection: DEFAULT_COLLECTION.to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// `None` when `QDRANT_URL` is unset; the caller falls back to an in-memory index.
    pub fn from_env_optional() -> Result<Option<Self>, ConfigError> {
        let Some(url) = env_optional("QDRANT_URL") else {
            return Ok(None);
        };

        Ok(Some(Self {
            url,
            api_key: env_optional("QDRANT_API_KEY"),
            collection: env_or_default("QDRANT_COLLECTION", DEFAULT_COLLECTION),
            timeout_secs: env_parse("QDRANT_TIMEOUT_SECS", 30u64)?,
        }))
    }
}
