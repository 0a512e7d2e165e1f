use sqlx::types::Json;
use time::OffsetDateTime;

use pond_domain::{band::BandCandidate, extraction::Entity};

#[derive(Debug, sqlx::FromRow)]
pub struct MemoryRow {
	pub id: i64,
	pub content: String,
	pub tags: Vec<String>,
	pub entities: Json<Vec<Entity>>,
	pub actions: Vec<String>,
	pub created_at: OffsetDateTime,
	pub active: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ScoredMemoryRow {
	pub id: i64,
	pub content: String,
	pub tags: Vec<String>,
	pub entities: Json<Vec<Entity>>,
	pub actions: Vec<String>,
	pub created_at: OffsetDateTime,
	pub active: bool,
	/// Cosine similarity to the probe vector, `1 - cosine distance`.
	pub similarity: f64,
}
impl BandCandidate for ScoredMemoryRow {
	fn similarity(&self) -> f64 {
		self.similarity
	}

	fn created_at(&self) -> OffsetDateTime {
		self.created_at
	}

	fn id(&self) -> i64 {
		self.id
	}
}

#[derive(Debug)]
pub struct NewMemory<'a> {
	pub content: &'a str,
	pub tags: &'a [String],
	pub entities: &'a [Entity],
	pub actions: &'a [String],
	pub embedding: &'a [f32],
}

#[derive(Debug, sqlx::FromRow)]
pub struct InsertedMemory {
	pub id: i64,
	pub created_at: OffsetDateTime,
}
