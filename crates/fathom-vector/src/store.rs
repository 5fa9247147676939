//! In-memory `VectorStore` implementation.
//!
//! Grounded on `riptide_intelligence::registry::LlmRegistry`'s `DashMap`-keyed
//! registry (per-key independence, no global lock) generalized from LLM
//! providers to embedding records, and on
//! `riptide_types::ports::cache::CacheStorage`'s trait shape.

use crate::similarity::cosine_similarity;
use async_trait::async_trait;
use dashmap::DashMap;
use fathom_types::{
    FathomError, Result, SearchOptions, VectorMatch, VectorRecord, VectorStats, VectorStore,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Cosine-similarity brute-force vector store. Adequate at the scale a single
/// Fathom process operates at (thousands, not millions, of records); no ANN
/// index is required per spec.md §4.5.
pub struct InMemoryVectorStore {
    records: DashMap<String, VectorRecord>,
    dimensions: usize,
}

impl InMemoryVectorStore {
    pub fn new(dimensions: usize) -> Self {
        Self {
            records: DashMap::new(),
            dimensions,
        }
    }

    fn validate_dimensions(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(FathomError::InvalidRequest(format!(
                "embedding has {} dimensions, store expects {}",
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(())
    }

    fn matches_filter(
        metadata: &HashMap<String, serde_json::Value>,
        filter: &HashMap<String, serde_json::Value>,
    ) -> bool {
        filter
            .iter()
            .all(|(k, v)| metadata.get(k) == Some(v))
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, record: VectorRecord) -> Result<()> {
        self.validate_dimensions(&record.embedding)?;
        debug!(id = %record.id, "adding vector record");
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn add_batch(&self, records: Vec<VectorRecord>) -> Result<()> {
        for record in records {
            self.add(record).await?;
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.records.remove(id).is_some())
    }

    async fn delete_by_filter(
        &self,
        filter: &HashMap<String, serde_json::Value>,
    ) -> Result<usize> {
        let to_remove: Vec<String> = self
            .records
            .iter()
            .filter(|entry| Self::matches_filter(&entry.value().metadata, filter))
            .map(|entry| entry.key().clone())
            .collect();

        let count = to_remove.len();
        for id in to_remove {
            self.records.remove(&id);
        }
        if count > 0 {
            warn!(count, "deleted vector records by filter");
        }
        Ok(count)
    }

    async fn search(&self, query: &[f32], options: &SearchOptions) -> Result<Vec<VectorMatch>> {
        self.search_filtered(query, options, &HashMap::new()).await
    }

    async fn search_filtered(
        &self,
        query: &[f32],
        options: &SearchOptions,
        filter: &HashMap<String, serde_json::Value>,
    ) -> Result<Vec<VectorMatch>> {
        self.validate_dimensions(query)?;

        let mut scored: Vec<VectorMatch> = self
            .records
            .iter()
            .filter(|entry| Self::matches_filter(&entry.value().metadata, filter))
            .map(|entry| VectorMatch {
                id: entry.key().clone(),
                score: cosine_similarity(query, &entry.value().embedding),
                metadata: entry.value().metadata.clone(),
                vector: options.include_vector.then(|| entry.value().embedding.clone()),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(options.limit);
        // minScore filters post-k (spec.md §4.5): applied after the top-k
        // cut, so it narrows the returned page rather than widening it.
        if let Some(min_score) = options.min_score {
            scored.retain(|m| m.score >= min_score);
        }
        Ok(scored)
    }

    async fn get(&self, id: &str) -> Result<Option<VectorRecord>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn stats(&self) -> Result<VectorStats> {
        Ok(VectorStats {
            count: self.records.len(),
            dimensions: self.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            embedding,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn add_then_get_roundtrips() {
        let store = InMemoryVectorStore::new(3);
        store.add(record("a", vec![1.0, 0.0, 0.0])).await.unwrap();
        let got = store.get("a").await.unwrap().unwrap();
        assert_eq!(got.id, "a");
    }

    #[tokio::test]
    async fn rejects_mismatched_dimensions() {
        let store = InMemoryVectorStore::new(3);
        let err = store.add(record("a", vec![1.0, 0.0])).await.unwrap_err();
        assert!(matches!(err, FathomError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn search_ranks_by_cosine_similarity() {
        let store = InMemoryVectorStore::new(2);
        store.add(record("same", vec![1.0, 0.0])).await.unwrap();
        store.add(record("orthogonal", vec![0.0, 1.0])).await.unwrap();

        let results = store
            .search(&[1.0, 0.0], &SearchOptions { limit: 2, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(results[0].id, "same");
        assert_eq!(results[1].id, "orthogonal");
        assert!(results[0].score > results[1].score);
        assert!(results[0].vector.is_none());
    }

    #[tokio::test]
    async fn search_min_score_filters_after_truncation() {
        let store = InMemoryVectorStore::new(2);
        store.add(record("same", vec![1.0, 0.0])).await.unwrap();
        store.add(record("orthogonal", vec![0.0, 1.0])).await.unwrap();

        let options = SearchOptions { limit: 2, min_score: Some(0.5), include_vector: false };
        let results = store.search(&[1.0, 0.0], &options).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "same");
    }

    #[tokio::test]
    async fn search_include_vector_echoes_the_embedding() {
        let store = InMemoryVectorStore::new(2);
        store.add(record("a", vec![1.0, 0.0])).await.unwrap();

        let options = SearchOptions { limit: 1, min_score: None, include_vector: true };
        let results = store.search(&[1.0, 0.0], &options).await.unwrap();
        assert_eq!(results[0].vector.as_deref(), Some([1.0, 0.0].as_slice()));
    }

    #[tokio::test]
    async fn search_filtered_respects_metadata() {
        let store = InMemoryVectorStore::new(2);
        let mut rec_a = record("a", vec![1.0, 0.0]);
        rec_a.metadata.insert("domain".to_string(), serde_json::json!("example.com"));
        let mut rec_b = record("b", vec![1.0, 0.0]);
        rec_b.metadata.insert("domain".to_string(), serde_json::json!("other.com"));
        store.add(rec_a).await.unwrap();
        store.add(rec_b).await.unwrap();

        let mut filter = HashMap::new();
        filter.insert("domain".to_string(), serde_json::json!("example.com"));
        let options = SearchOptions { limit: 10, ..Default::default() };
        let results = store.search_filtered(&[1.0, 0.0], &options, &filter).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "a");
    }

    #[tokio::test]
    async fn delete_by_filter_removes_matching_records() {
        let store = InMemoryVectorStore::new(2);
        let mut rec = record("a", vec![1.0, 0.0]);
        rec.metadata.insert("entityType".to_string(), serde_json::json!("pattern"));
        store.add(rec).await.unwrap();
        store.add(record("b", vec![0.0, 1.0])).await.unwrap();

        let mut filter = HashMap::new();
        filter.insert("entityType".to_string(), serde_json::json!("pattern"));
        let removed = store.delete_by_filter(&filter).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn stats_report_count_and_dimensions() {
        let store = InMemoryVectorStore::new(4);
        store.add(record("a", vec![0.0; 4])).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.dimensions, 4);
    }
}
