//! Shared application state.
//!
//! Cloned into the readiness router; domain routers get their services
//! built once in [`crate::api::routes`].

use std::sync::Arc;

use database::postgres::DatabaseConnection;
use domain_rag::{
    CompletionProvider, EMBEDDING_DIMENSION, EmbeddingProvider, InMemoryVectorIndex, OpenAIChat,
    OpenAIProvider, QdrantConfig, QdrantVectorIndex, RagService, VectorIndex,
};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::Config;

static VECTOR_INDEX: OnceCell<Arc<dyn VectorIndex>> = OnceCell::const_new();

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
    pub vector_index: Arc<dyn VectorIndex>,
    /// Present only when an OpenAI key is configured
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub rag: Option<Arc<RagService>>,
}

impl AppState {
    pub async fn new(config: Config, db: DatabaseConnection) -> eyre::Result<Self> {
        let vector_index = shared_vector_index(config.qdrant.as_ref()).await?;
        Self::with_vector_index(config, db, vector_index)
    }

    pub fn with_vector_index(
        config: Config,
        db: DatabaseConnection,
        vector_index: Arc<dyn VectorIndex>,
    ) -> eyre::Result<Self> {
        let (embedder, rag) = match config.openai.clone() {
            Some(openai) => {
                let embedder: Arc<dyn EmbeddingProvider> =
                    Arc::new(OpenAIProvider::new(openai.clone())?);
                let completion: Arc<dyn CompletionProvider> = Arc::new(OpenAIChat::new(openai)?);
                let rag = RagService::new(
                    &config.rag,
                    embedder.clone(),
                    vector_index.clone(),
                    completion,
                )?;
                info!("RAG pipeline enabled");
                (Some(embedder), Some(Arc::new(rag)))
            }
            None => {
                warn!("OPENAI_API_KEY not set: documentation routes disabled, generation uses templates");
                (None, None)
            }
        };

        Ok(Self {
            config,
            db,
            vector_index,
            embedder,
            rag,
        })
    }
}

/// The process-wide vector index, built on first use
pub async fn shared_vector_index(
    qdrant: Option<&QdrantConfig>,
) -> eyre::Result<Arc<dyn VectorIndex>> {
    let index = VECTOR_INDEX
        .get_or_try_init(|| async { build_vector_index(qdrant) })
        .await?;
    Ok(index.clone())
}

pub fn build_vector_index(qdrant: Option<&QdrantConfig>) -> eyre::Result<Arc<dyn VectorIndex>> {
    match qdrant {
        Some(config) => {
            info!(url = %config.url, collection = %config.collection, "Using Qdrant vector index");
            Ok(Arc::new(QdrantVectorIndex::new(config, EMBEDDING_DIMENSION)?))
        }
        None => {
            warn!("QDRANT_URL not set: using in-memory vector index, vectors are lost on restart");
            Ok(Arc::new(InMemoryVectorIndex::new()))
        }
    }
}
