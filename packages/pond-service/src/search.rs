use serde::{Deserialize, Serialize};

use crate::{Error, MAX_QUERY_CHARS, MemoryView, PondService, Result};
use pond_domain::tenant::TenantName;
use pond_storage::queries;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchRequest {
	pub tenant: String,
	pub query: Option<String>,
	pub entity: Option<String>,
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchHit {
	#[serde(flatten)]
	pub memory: MemoryView,
	/// Present for semantic matches only.
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub similarity: Option<f32>,
}
impl From<MemoryView> for SearchHit {
	fn from(memory: MemoryView) -> Self {
		Self { memory, similarity: None }
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchResponse {
	pub memories: Vec<SearchHit>,
	pub count: usize,
}
impl From<Vec<SearchHit>> for SearchResponse {
	fn from(memories: Vec<SearchHit>) -> Self {
		Self { count: memories.len(), memories }
	}
}

impl PondService {
	/// Entity lookup when `entity` is set, semantic search when `query` is set, and the last 24
	/// hours otherwise.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let tenant = crate::parse_tenant(&req.tenant)?;
		let limit = crate::resolve_limit(req.limit)?;

		if let Some(entity) = req.entity.as_deref()
			&& !entity.trim().is_empty()
		{
			let hits = self.search_entity(&tenant, entity.trim(), limit).await?;

			return Ok(hits.into_iter().map(SearchHit::from).collect::<Vec<_>>().into());
		}

		let query = req.query.as_deref().map(str::trim).unwrap_or_default();

		if query.is_empty() {
			let hits = self.recent_memories(&tenant, crate::DEFAULT_SINCE_HOURS, limit).await?;

			return Ok(hits.into_iter().map(SearchHit::from).collect::<Vec<_>>().into());
		}
		if query.chars().count() > MAX_QUERY_CHARS {
			return Err(Error::InvalidRequest {
				message: format!("query must be at most {MAX_QUERY_CHARS} characters."),
			});
		}

		let embedding = self.embed(query).await?;
		let hits = self.search_semantic(&tenant, &embedding, limit).await?;

		Ok(hits.into())
	}

	/// Active memories nearest to `embedding`, most similar first.
	pub async fn search_semantic(
		&self,
		tenant: &TenantName,
		embedding: &[f32],
		limit: u32,
	) -> Result<Vec<SearchHit>> {
		let namespace = self.registry.resolve(tenant).await?;
		let mut conn = self.db.acquire(&namespace).await?;
		let rows = queries::search_semantic(&mut conn, embedding, limit).await?;

		tracing::debug!(tenant = %tenant, results = rows.len(), "Semantic search finished.");

		Ok(rows
			.into_iter()
			.map(|row| {
				let similarity = row.similarity as f32;

				SearchHit { memory: MemoryView::from(row), similarity: Some(similarity) }
			})
			.collect())
	}

	/// Active memories carrying an entity whose text equals `entity_text` exactly.
	pub async fn search_entity(
		&self,
		tenant: &TenantName,
		entity_text: &str,
		limit: u32,
	) -> Result<Vec<MemoryView>> {
		let namespace = self.registry.resolve(tenant).await?;
		let mut conn = self.db.acquire(&namespace).await?;
		let rows = queries::search_entity(&mut conn, entity_text, limit).await?;

		tracing::debug!(tenant = %tenant, results = rows.len(), "Entity search finished.");

		Ok(rows.into_iter().map(MemoryView::from).collect())
	}
}
