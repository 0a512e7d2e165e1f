pub mod recent;
pub mod search;
pub mod splashback;
pub mod store;
pub mod time_serde;

mod error;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use error::{Error, Result};
use pond_config::{Config, EmbeddingProviderConfig};
use pond_domain::{extraction::Entity, tenant::TenantName};
use pond_providers::{
	embedding,
	extractor::{Extractor, RuleExtractor},
};
use pond_storage::{
	TenantRegistry,
	db::Db,
	models::{MemoryRow, ScoredMemoryRow},
};
pub use recent::{InitRequest, InitResponse, RecentRequest, RecentResponse};
pub use search::{SearchHit, SearchRequest, SearchResponse};
pub use splashback::SplashbackItem;
pub use store::{StoreRequest, StoreResponse};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;
pub const DEFAULT_SINCE_HOURS: u32 = 24;
pub const MAX_SINCE_HOURS: u32 = 168;
pub const MAX_QUERY_CHARS: usize = 500;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, pond_providers::Result<Vec<f32>>>;
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, pond_providers::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub extractor: Arc<dyn Extractor>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, extractor: Arc<dyn Extractor>) -> Self {
		Self { embedding, extractor }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders), extractor: Arc::new(RuleExtractor) }
	}
}

/// A stored memory as callers see it. Row ids stay internal.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MemoryView {
	pub content: String,
	pub tags: Vec<String>,
	pub entities: Vec<Entity>,
	pub actions: Vec<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl From<MemoryRow> for MemoryView {
	fn from(row: MemoryRow) -> Self {
		Self {
			content: row.content,
			tags: row.tags,
			entities: row.entities.0,
			actions: row.actions,
			created_at: row.created_at,
		}
	}
}
impl From<ScoredMemoryRow> for MemoryView {
	fn from(row: ScoredMemoryRow) -> Self {
		Self {
			content: row.content,
			tags: row.tags,
			entities: row.entities.0,
			actions: row.actions,
			created_at: row.created_at,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HealthReport {
	pub database: bool,
	pub embeddings: bool,
}

pub struct PondService {
	pub cfg: Config,
	pub db: Db,
	pub registry: TenantRegistry,
	pub providers: Providers,
}
impl PondService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self::with_providers(cfg, db, Providers::default())
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		let registry = TenantRegistry::new(&db, cfg.providers.embedding.dimensions);

		Self { cfg, db, registry, providers }
	}

	/// Database reachability plus whether an embedding provider is configured. The provider itself
	/// is not called.
	pub async fn health(&self) -> HealthReport {
		let database = match self.db.ping().await {
			Ok(()) => true,
			Err(err) => {
				tracing::warn!(error = %err, "Database health check failed.");

				false
			},
		};
		let embeddings = !self.cfg.providers.embedding.provider_id.is_empty();

		HealthReport { database, embeddings }
	}

	/// Embeds `text` under the provider timeout and rejects unusable vectors.
	pub(crate) async fn embed(&self, text: &str) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let timeout = Duration::from_millis(cfg.timeout_ms);
		let vector = match tokio::time::timeout(timeout, self.providers.embedding.embed(cfg, text))
			.await
		{
			Ok(Ok(vector)) => vector,
			Ok(Err(err)) => {
				tracing::error!(
					error = %err,
					provider = %cfg.provider_id,
					"Embedding provider failed."
				);

				return Err(Error::EmbeddingUnavailable { message: err.to_string() });
			},
			Err(_) => {
				tracing::error!(
					provider = %cfg.provider_id,
					timeout_ms = cfg.timeout_ms,
					"Embedding provider timed out."
				);

				return Err(Error::EmbeddingUnavailable {
					message: format!("Embedding timed out after {} ms.", cfg.timeout_ms),
				});
			},
		};

		embedding::check_embedding(vector, cfg.dimensions as usize).map_err(|err| {
			tracing::error!(error = %err, provider = %cfg.provider_id, "Embedding rejected.");

			Error::EmbeddingUnavailable { message: err.to_string() }
		})
	}
}

pub(crate) fn parse_tenant(raw: &str) -> Result<TenantName> {
	TenantName::parse(raw)
		.map_err(|rejection| Error::InvalidTenant { message: rejection.message().to_string() })
}

pub(crate) fn resolve_limit(limit: Option<u32>) -> Result<u32> {
	let limit = limit.unwrap_or(DEFAULT_LIMIT);

	if !(1..=MAX_LIMIT).contains(&limit) {
		return Err(Error::InvalidRequest {
			message: format!("limit must be between 1 and {MAX_LIMIT}."),
		});
	}

	Ok(limit)
}

pub(crate) fn resolve_since_hours(hours: Option<u32>) -> Result<u32> {
	let hours = hours.unwrap_or(DEFAULT_SINCE_HOURS);

	if !(1..=MAX_SINCE_HOURS).contains(&hours) {
		return Err(Error::InvalidRequest {
			message: format!("hours must be between 1 and {MAX_SINCE_HOURS}."),
		});
	}

	Ok(hours)
}
