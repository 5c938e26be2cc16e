//! Retrieval-augmented generation over a user's documentation.
//!
//! ```text
//! text ─▶ Chunker ─▶ EmbeddingProvider ─▶ VectorIndex (namespace per user)
//!                                              │
//! query ─▶ EmbeddingProvider ─▶ query ─────────┘─▶ RagOrchestrator ─▶ CompletionProvider
//! ```
//!
//! Remote collaborators sit behind traits: [`EmbeddingProvider`],
//! [`CompletionProvider`] and [`VectorIndex`]. OpenAI and Qdrant
//! implementations are provided, plus an in-memory index for development.

pub mod chunker;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod index;
pub mod indexer;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod service;

pub use chunker::{Chunker, Chunks};
pub use completion::{CompletionProvider, OpenAIChat};
pub use config::{OpenAIConfig, QdrantConfig, RagConfig};
pub use embedding::{EMBEDDING_DIMENSION, EmbeddingProvider, OpenAIProvider};
pub use error::{RagError, RagResult};
pub use handlers::ApiDoc;
pub use index::{
    FilterValue, InMemoryVectorIndex, Metadata, MetadataFilter, Namespace, QdrantVectorIndex,
    VectorIndex, VectorMatch,
};
pub use indexer::DocumentIndexer;
pub use models::{DocumentChunk, IndexReport, RetrievedChunk, SourceDocument};
pub use orchestrator::RagOrchestrator;
pub use service::RagService;
