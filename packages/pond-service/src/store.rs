use serde::{Deserialize, Serialize};

use crate::{Error, MemoryView, PondService, Result, SplashbackItem, splashback};
use pond_domain::{
	content,
	extraction::{self, Extraction},
};
use pond_storage::{models::NewMemory, queries};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoreRequest {
	pub tenant: String,
	pub content: String,
	#[serde(default)]
	pub tags: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoreResponse {
	pub memory: MemoryView,
	pub splashback: Vec<SplashbackItem>,
}

impl PondService {
	/// Stores one memory and returns it with its splashback.
	///
	/// Stages run in order and stop at the first failure: tenant, content, extraction, tags,
	/// embedding, then a single transaction that inserts the row and reads the splashback. Nothing
	/// is written unless every stage succeeds.
	pub async fn store(&self, req: StoreRequest) -> Result<StoreResponse> {
		let tenant = crate::parse_tenant(&req.tenant)?;

		content::validate_content(&req.content)
			.map_err(|rejection| Error::InvalidContent { message: rejection.message() })?;

		let content = req.content.trim();
		let extraction = self.extract(content).await?;
		let tags = extraction::merge_tags(&req.tags, &extraction);
		let embedding = self.embed(content).await?;
		let namespace = self.registry.resolve(&tenant).await?;
		let mut conn = self.db.acquire(&namespace).await?;
		let mut tx = conn.begin().await?;
		let inserted = queries::insert_memory(
			&mut tx,
			&NewMemory {
				content,
				tags: &tags,
				entities: &extraction.entities,
				actions: &extraction.actions,
				embedding: &embedding,
			},
		)
		.await?;
		let splashback = splashback::splashback(&mut tx, &embedding, inserted.id).await?;

		tx.commit().await?;

		tracing::info!(
			tenant = %tenant,
			tags = tags.len(),
			entities = extraction.entities.len(),
			splashback = splashback.len(),
			"Memory stored."
		);

		let memory = MemoryView {
			content: content.to_string(),
			tags,
			entities: extraction.entities,
			actions: extraction.actions,
			created_at: inserted.created_at,
		};

		Ok(StoreResponse { memory, splashback })
	}

	async fn extract(&self, content: &str) -> Result<Extraction> {
		let extractor = self.providers.extractor.clone();
		let text = content.to_string();

		match tokio::task::spawn_blocking(move || extractor.extract(&text)).await {
			Ok(Ok(extraction)) => Ok(extraction),
			Ok(Err(err)) => {
				tracing::error!(error = %err, "Extractor failed.");

				Err(Error::ExtractionFailed { message: err.to_string() })
			},
			Err(err) => {
				tracing::error!(error = %err, "Extractor task aborted.");

				Err(Error::ExtractionFailed { message: "Extractor task aborted.".to_string() })
			},
		}
	}
}
