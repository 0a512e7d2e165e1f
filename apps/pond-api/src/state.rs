use std::{sync::Arc, time::Duration};

use pond_service::PondService;
use pond_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<PondService>,
}
impl AppState {
	/// Connects the pool, installs pgvector, and builds the service with the default providers.
	pub async fn new(config: pond_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_extension().await?;

		Ok(Self::from_service(PondService::new(config, db)))
	}

	pub fn from_service(service: PondService) -> Self {
		Self { service: Arc::new(service) }
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.service.cfg.service.request_timeout_ms)
	}

	pub fn api_key(&self) -> Option<&str> {
		self.service.cfg.security.api_key.as_deref()
	}
}
