use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// One bounded window of a source document, the unit of embedding and retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentChunk {
    pub source: String,
    pub index: usize,
    pub text: String,
    pub owner_id: Uuid,
    pub project_ids: Vec<Uuid>,
}

impl DocumentChunk {
    /// Stable id so that re-indexing the same source replaces its entries
    pub fn point_id(&self) -> Uuid {
        chunk_point_id(self.owner_id, &self.source, self.index)
    }
}

pub fn chunk_point_id(owner_id: Uuid, source: &str, index: usize) -> Uuid {
    let name = format!("{source}#{index}");
    Uuid::new_v5(&owner_id, name.as_bytes())
}

/// A documentation file handed over for indexing
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct SourceDocument {
    /// Path or URL identifying the document
    #[validate(length(min = 1, max = 1024))]
    pub source: String,
    pub text: String,
}

/// Request body for `POST /documents`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct IndexDocumentsRequest {
    /// Repositories the documents belong to
    #[serde(default)]
    pub project_ids: Vec<Uuid>,
    #[validate(length(min = 1, max = 500), nested)]
    pub documents: Vec<SourceDocument>,
}

/// Outcome of a bulk indexing run; failures are counted, not propagated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IndexReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Chunks dropped because the byte cap was reached
    pub skipped: usize,
}

/// Request body for `POST /search`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 4000))]
    pub query: String,
    #[serde(default)]
    pub project_ids: Vec<Uuid>,
}

/// A documentation chunk that survived retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RetrievedChunk {
    pub id: String,
    pub score: f32,
    pub source: Option<String>,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub chunks: Vec<RetrievedChunk>,
}
