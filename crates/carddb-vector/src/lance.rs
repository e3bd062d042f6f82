//! LanceDB-backed similarity backend.
//!
//! Documents are stored with their vectors in one table and upserted by `id`
//! through `merge_insert`, so repeated pushes do not duplicate rows. Queries
//! use cosine distance; `score = 1 - distance`. The trait is blocking, so an
//! owned tokio runtime drives the async LanceDB client.

use anyhow::{anyhow, Result};
use arrow_array::{FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::{DataType, Field, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, DistanceType};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use carddb_core::traits::{Embedder, SimilarityBackend};
use carddb_core::types::{RetrievalDocument, SearchHit};

pub struct LanceVectorStore {
    runtime: tokio::runtime::Runtime,
    db: Connection,
    table_name: String,
    embedder: Box<dyn Embedder>,
}

impl LanceVectorStore {
    pub fn open(db_path: &Path, table_name: &str, embedder: Box<dyn Embedder>) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let db = runtime.block_on(async { connect(db_path.to_string_lossy().as_ref()).execute().await })?;
        info!(path = %db_path.display(), table = table_name, "opened lancedb");
        Ok(Self { runtime, db, table_name: table_name.to_string(), embedder })
    }

    fn schema(&self) -> Arc<Schema> {
        let item = Arc::new(Field::new("item", DataType::Float32, true));
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("text", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("company", DataType::Utf8, false),
            Field::new("city", DataType::Utf8, false),
            Field::new("services", DataType::Utf8, false),
            Field::new("vector", DataType::FixedSizeList(item, self.embedder.dim() as i32), true),
        ]))
    }

    fn to_record_batch(&self, docs: &[RetrievalDocument], vectors: Vec<Vec<f32>>) -> Result<RecordBatch> {
        let meta = |d: &RetrievalDocument, key: &str| d.metadata.get(key).cloned().unwrap_or_default();
        let ids: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let names: Vec<String> = docs.iter().map(|d| meta(d, "name")).collect();
        let companies: Vec<String> = docs.iter().map(|d| meta(d, "company")).collect();
        let cities: Vec<String> = docs.iter().map(|d| meta(d, "city")).collect();
        let services: Vec<String> = docs.iter().map(|d| meta(d, "services")).collect();
        let vectors: Vec<Option<Vec<Option<f32>>>> =
            vectors.into_iter().map(|v| Some(v.into_iter().map(Some).collect())).collect();
        let record_batch = RecordBatch::try_new(self.schema(), vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(names)),
            Arc::new(StringArray::from(companies)),
            Arc::new(StringArray::from(cities)),
            Arc::new(StringArray::from(services)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(
                vectors.into_iter(),
                self.embedder.dim() as i32,
            )),
        ])?;
        Ok(record_batch)
    }

    async fn table_exists(&self) -> Result<bool> {
        Ok(self.db.table_names().execute().await?.contains(&self.table_name))
    }
}

impl SimilarityBackend for LanceVectorStore {
    fn add(&self, documents: &[RetrievalDocument]) -> Result<()> {
        if documents.is_empty() { return Ok(()); }
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        let record_batch = self.to_record_batch(documents, vectors)?;
        let schema = record_batch.schema();
        self.runtime.block_on(async {
            let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
            if self.table_exists().await? {
                let table = self.db.open_table(&self.table_name).execute().await?;
                let mut mi = table.merge_insert(&["id"]);
                mi.when_matched_update_all(None).when_not_matched_insert_all();
                let _ = mi.execute(reader).await?;
            } else {
                self.db.create_table(&self.table_name, reader).execute().await?;
            }
            Ok::<_, anyhow::Error>(())
        })?;
        info!(documents = documents.len(), table = %self.table_name, "lancedb upsert complete");
        Ok(())
    }

    fn ranked_retrieve(&self, query: &str, top_k: usize, min_score: f32) -> Result<Vec<SearchHit>> {
        if top_k == 0 { return Ok(Vec::new()); }
        let q_vec = self
            .embedder
            .embed_batch(&[query.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
        self.runtime.block_on(async {
            if !self.table_exists().await? { return Ok(Vec::new()); }
            let table = self.db.open_table(&self.table_name).execute().await?;
            let mut stream = table
                .vector_search(q_vec)?
                .distance_type(DistanceType::Cosine)
                .limit(top_k)
                .execute()
                .await?;
            let mut hits = Vec::new();
            while let Some(batch) = TryStreamExt::try_next(&mut stream).await? {
                let ids = batch
                    .column_by_name("id")
                    .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                    .ok_or_else(|| anyhow!("id column missing"))?;
                let distances = batch
                    .column_by_name("_distance")
                    .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                    .ok_or_else(|| anyhow!("_distance column missing"))?;
                for i in 0..batch.num_rows() {
                    let score = 1.0 - distances.value(i);
                    if score >= min_score { hits.push(SearchHit { id: ids.value(i).to_string(), score }); }
                }
            }
            hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
            hits.truncate(top_k);
            Ok(hits)
        })
    }
}
