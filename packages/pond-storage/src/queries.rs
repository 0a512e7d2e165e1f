use sqlx::types::Json;

use crate::{
	NamespaceScope, Result,
	models::{InsertedMemory, MemoryRow, NewMemory, ScoredMemoryRow},
	vector,
};
use pond_domain::band::SimilarityBand;

const MEMORY_COLUMNS: &str = "id, content, tags, entities, actions, created_at, active";

pub async fn insert_memory<S>(scope: &mut S, memory: &NewMemory<'_>) -> Result<InsertedMemory>
where
	S: NamespaceScope,
{
	vector::check_dimension(memory.embedding, scope.namespace().vector_dim())?;

	let sql = format!(
		"\
INSERT INTO {table} (content, tags, entities, actions, embedding)
VALUES ($1, $2, $3, $4, $5::text::vector)
RETURNING id, created_at",
		table = scope.namespace().table(),
	);
	let inserted = sqlx::query_as::<_, InsertedMemory>(&sql)
		.bind(memory.content)
		.bind(memory.tags)
		.bind(Json(memory.entities))
		.bind(memory.actions)
		.bind(vector::vector_to_pg(memory.embedding))
		.fetch_one(scope.connection())
		.await?;

	Ok(inserted)
}

/// Active rows strictly inside `band` relative to `embedding`, excluding `exclude_id`.
///
/// Ordered by similarity desc, then `created_at` desc, then `id` desc, and capped at the band
/// limit.
pub async fn splashback_candidates<S>(
	scope: &mut S,
	embedding: &[f32],
	exclude_id: i64,
	band: &SimilarityBand,
) -> Result<Vec<ScoredMemoryRow>>
where
	S: NamespaceScope,
{
	let sql = format!(
		"\
SELECT {MEMORY_COLUMNS}, similarity
FROM (
	SELECT
		{MEMORY_COLUMNS},
		1 - (embedding <=> $1::text::vector) AS similarity
	FROM {table}
	WHERE active AND id <> $2
) scored
WHERE similarity > $3 AND similarity < $4
ORDER BY similarity DESC, created_at DESC, id DESC
LIMIT $5",
		table = scope.namespace().table(),
	);
	let rows = sqlx::query_as::<_, ScoredMemoryRow>(&sql)
		.bind(vector::vector_to_pg(embedding))
		.bind(exclude_id)
		.bind(band.lower)
		.bind(band.upper)
		.bind(band.limit as i64)
		.fetch_all(scope.connection())
		.await?;

	Ok(rows)
}

pub async fn search_semantic<S>(
	scope: &mut S,
	embedding: &[f32],
	limit: u32,
) -> Result<Vec<ScoredMemoryRow>>
where
	S: NamespaceScope,
{
	let sql = format!(
		"\
SELECT
	{MEMORY_COLUMNS},
	1 - (embedding <=> $1::text::vector) AS similarity
FROM {table}
WHERE active
ORDER BY embedding <=> $1::text::vector, created_at DESC, id DESC
LIMIT $2",
		table = scope.namespace().table(),
	);
	let rows = sqlx::query_as::<_, ScoredMemoryRow>(&sql)
		.bind(vector::vector_to_pg(embedding))
		.bind(i64::from(limit))
		.fetch_all(scope.connection())
		.await?;

	Ok(rows)
}

/// Rows whose entity list has an element with `text` exactly equal to `entity_text`.
pub async fn search_entity<S>(
	scope: &mut S,
	entity_text: &str,
	limit: u32,
) -> Result<Vec<MemoryRow>>
where
	S: NamespaceScope,
{
	let sql = format!(
		"\
SELECT {MEMORY_COLUMNS}
FROM {table}
WHERE active AND entities @> $1
ORDER BY created_at DESC, id DESC
LIMIT $2",
		table = scope.namespace().table(),
	);
	let probe = serde_json::json!([{ "text": entity_text }]);
	let rows = sqlx::query_as::<_, MemoryRow>(&sql)
		.bind(probe)
		.bind(i64::from(limit))
		.fetch_all(scope.connection())
		.await?;

	Ok(rows)
}

pub async fn recent<S>(scope: &mut S, since_hours: u32, limit: u32) -> Result<Vec<MemoryRow>>
where
	S: NamespaceScope,
{
	let sql = format!(
		"\
SELECT {MEMORY_COLUMNS}
FROM {table}
WHERE active AND created_at >= now() - make_interval(hours => $1)
ORDER BY created_at DESC, id DESC
LIMIT $2",
		table = scope.namespace().table(),
	);
	let rows = sqlx::query_as::<_, MemoryRow>(&sql)
		.bind(since_hours as i32)
		.bind(i64::from(limit))
		.fetch_all(scope.connection())
		.await?;

	Ok(rows)
}

pub async fn count_memories<S>(scope: &mut S) -> Result<i64>
where
	S: NamespaceScope,
{
	let sql = format!("SELECT count(*) FROM {table}", table = scope.namespace().table());
	let count: i64 = sqlx::query_scalar(&sql).fetch_one(scope.connection()).await?;

	Ok(count)
}
