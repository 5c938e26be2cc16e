use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, CollectionExistsRequest, Condition, CreateCollectionBuilder,
    CreateFieldIndexCollectionBuilder, DeletePointsBuilder, Distance, FieldType, Filter, PointId,
    PointStruct, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use serde_json::Value;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::{FilterValue, Metadata, MetadataFilter, Namespace, VectorIndex, VectorMatch, rank_matches};
use crate::config::QdrantConfig;
use crate::error::{RagError, RagResult};

/// Payload field carrying the namespace of every point
const NAMESPACE_FIELD: &str = "namespace";

/// Keyword indexes created with the collection
const INDEXED_FIELDS: [&str; 3] = [NAMESPACE_FIELD, "owner_id", "type"];

/// Qdrant-backed index: one shared collection, tenants separated by a payload field
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    dimension: u64,
    ready: OnceCell<()>,
}

impl QdrantVectorIndex {
    pub fn new(config: &QdrantConfig, dimension: usize) -> RagResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = &config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::Config(format!("Failed to build Qdrant client: {e}")))?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
            dimension: dimension as u64,
            ready: OnceCell::new(),
        })
    }

    /// Create the collection and its payload indexes on first use
    async fn ensure_collection(&self) -> RagResult<()> {
        self.ready
            .get_or_try_init(|| async {
                let exists = self
                    .client
                    .collection_exists(CollectionExistsRequest {
                        collection_name: self.collection.clone(),
                    })
                    .await?;

                if !exists {
                    tracing::info!(collection = %self.collection, dimension = self.dimension, "Creating Qdrant collection");
                    self.client
                        .create_collection(
                            CreateCollectionBuilder::new(&self.collection).vectors_config(
                                VectorParamsBuilder::new(self.dimension, Distance::Cosine),
                            ),
                        )
                        .await?;

                    for field in INDEXED_FIELDS {
                        self.client
                            .create_field_index(
                                CreateFieldIndexCollectionBuilder::new(
                                    &self.collection,
                                    field,
                                    FieldType::Keyword,
                                )
                                .wait(true),
                            )
                            .await?;
                    }
                }

                Ok::<(), RagError>(())
            })
            .await
            .map(|_| ())
    }

    fn namespace_condition(namespace: &Namespace) -> Condition {
        Condition::matches(NAMESPACE_FIELD, namespace.as_str().to_string())
    }

    /// Namespace is always the first `must` clause
    fn build_filter(namespace: &Namespace, filter: &MetadataFilter) -> Filter {
        let mut conditions = vec![Self::namespace_condition(namespace)];
        conditions.extend(filter.conditions().iter().map(|(field, value)| {
            match value {
                FilterValue::Str(s) => Condition::matches(field.clone(), s.clone()),
                FilterValue::Int(i) => Condition::matches(field.clone(), *i),
                FilterValue::Bool(b) => Condition::matches(field.clone(), *b),
            }
        }));
        Filter::must(conditions)
    }

    fn point_id(id: Uuid) -> PointId {
        PointId::from(id.to_string())
    }

    fn point_id_to_uuid(point_id: &PointId) -> RagResult<Uuid> {
        match &point_id.point_id_options {
            Some(qdrant::point_id::PointIdOptions::Uuid(raw)) => Uuid::parse_str(raw)
                .map_err(|e| RagError::Internal(format!("Invalid point id: {e}"))),
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(Uuid::from_u128(*num as u128)),
            None => Err(RagError::Internal("Missing point id".to_string())),
        }
    }

    fn to_match(
        id: Option<&PointId>,
        score: f32,
        payload: HashMap<String, QdrantValue>,
    ) -> RagResult<VectorMatch> {
        let id = id
            .map(Self::point_id_to_uuid)
            .transpose()?
            .ok_or_else(|| RagError::Internal("Missing point id".to_string()))?;

        Ok(VectorMatch {
            id,
            score,
            metadata: from_payload(payload),
        })
    }
}

fn json_to_qdrant_value(value: Value) -> Option<QdrantValue> {
    use qdrant::value::Kind;

    match value {
        Value::Null => None,
        Value::Bool(b) => Some(QdrantValue::from(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(QdrantValue::from(i)),
            None => n.as_f64().map(QdrantValue::from),
        },
        Value::String(s) => Some(QdrantValue::from(s)),
        Value::Array(items) => Some(QdrantValue {
            kind: Some(Kind::ListValue(qdrant::ListValue {
                values: items.into_iter().filter_map(json_to_qdrant_value).collect(),
            })),
        }),
        Value::Object(_) => Some(QdrantValue::from(value.to_string())),
    }
}

fn qdrant_value_to_json(value: QdrantValue) -> Option<Value> {
    use qdrant::value::Kind;

    match value.kind? {
        Kind::NullValue(_) => Some(Value::Null),
        Kind::BoolValue(b) => Some(Value::Bool(b)),
        Kind::IntegerValue(i) => Some(Value::Number(i.into())),
        Kind::DoubleValue(f) => serde_json::Number::from_f64(f).map(Value::Number),
        Kind::StringValue(s) => Some(Value::String(s)),
        Kind::ListValue(list) => Some(Value::Array(
            list.values.into_iter().filter_map(qdrant_value_to_json).collect(),
        )),
        Kind::StructValue(_) => None,
    }
}

fn to_payload(namespace: &Namespace, metadata: Metadata) -> HashMap<String, QdrantValue> {
    let mut payload: HashMap<String, QdrantValue> = metadata
        .into_iter()
        .filter_map(|(key, value)| json_to_qdrant_value(value).map(|v| (key, v)))
        .collect();
    payload.insert(
        NAMESPACE_FIELD.to_string(),
        QdrantValue::from(namespace.as_str().to_string()),
    );
    payload
}

fn from_payload(payload: HashMap<String, QdrantValue>) -> Metadata {
    payload
        .into_iter()
        .filter(|(key, _)| key != NAMESPACE_FIELD)
        .filter_map(|(key, value)| qdrant_value_to_json(value).map(|v| (key, v)))
        .collect()
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(
        &self,
        namespace: &Namespace,
        id: Uuid,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> RagResult<()> {
        if vector.len() as u64 != self.dimension {
            return Err(RagError::Validation(format!(
                "vector has dimension {}, collection expects {}",
                vector.len(),
                self.dimension
            )));
        }

        self.ensure_collection().await?;

        let point = PointStruct::new(Self::point_id(id), vector, to_payload(namespace, metadata));
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await?;
        Ok(())
    }

    async fn query(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        top_k: usize,
        filter: &MetadataFilter,
    ) -> RagResult<Vec<VectorMatch>> {
        if top_k == 0 {
            return Ok(vec![]);
        }

        self.ensure_collection().await?;

        let request = SearchPointsBuilder::new(&self.collection, vector, top_k as u64)
            .filter(Self::build_filter(namespace, filter))
            .with_payload(true);

        let response = self.client.search_points(request).await?;

        let mut matches = response
            .result
            .into_iter()
            .map(|point| Self::to_match(point.id.as_ref(), point.score, point.payload))
            .collect::<RagResult<Vec<_>>>()?;

        rank_matches(&mut matches);
        Ok(matches)
    }

    async fn scan(
        &self,
        namespace: &Namespace,
        filter: &MetadataFilter,
        limit: usize,
    ) -> RagResult<Vec<VectorMatch>> {
        if limit == 0 {
            return Ok(vec![]);
        }

        self.ensure_collection().await?;

        let request = ScrollPointsBuilder::new(&self.collection)
            .filter(Self::build_filter(namespace, filter))
            .limit(u32::try_from(limit).unwrap_or(u32::MAX))
            .with_payload(true)
            .with_vectors(false);

        let response = self.client.scroll(request).await?;

        let mut matches = response
            .result
            .into_iter()
            .map(|point| Self::to_match(point.id.as_ref(), 0.0, point.payload))
            .collect::<RagResult<Vec<_>>>()?;

        matches.sort_by_key(|m| m.id);
        Ok(matches)
    }

    async fn delete(&self, namespace: &Namespace, ids: &[Uuid]) -> RagResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        self.ensure_collection().await?;

        let ids: Vec<PointId> = ids.iter().map(|id| Self::point_id(*id)).collect();
        let selector = Filter::must([Self::namespace_condition(namespace), Condition::has_id(ids)]);

        self.client
            .delete_points(DeletePointsBuilder::new(&self.collection).points(selector).wait(true))
            .await?;
        Ok(())
    }

    async fn health(&self) -> RagResult<()> {
        self.client.health_check().await?;
        Ok(())
    }
}
