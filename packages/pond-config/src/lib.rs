mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, EmbeddingProviderConfig, Postgres, Providers, Security, Service, Storage};

use std::{fs, net::SocketAddr, path::Path};

pub const EMBEDDING_PROVIDERS: [&str; 3] = ["ollama", "openai", "mock"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	let http_addr: SocketAddr = cfg.service.http_bind.parse().map_err(|_| Error::Validation {
		message: "service.http_bind must be a socket address such as 127.0.0.1:8000.".to_string(),
	})?;

	if cfg.security.api_key.is_none() && !http_addr.ip().is_loopback() {
		return Err(Error::Validation {
			message: "security.api_key is required when service.http_bind is not a loopback address."
				.to_string(),
		});
	}
	if cfg.service.request_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "service.request_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_min_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_min_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns < cfg.storage.postgres.pool_min_conns {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be at least storage.postgres.pool_min_conns."
				.to_string(),
		});
	}
	if cfg.storage.postgres.acquire_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.acquire_timeout_ms must be greater than zero.".to_string(),
		});
	}

	let provider_id = cfg.providers.embedding.provider_id.as_str();

	if !EMBEDDING_PROVIDERS.contains(&provider_id) {
		return Err(Error::Validation {
			message: "providers.embedding.provider_id must be one of ollama, openai, or mock."
				.to_string(),
		});
	}
	if provider_id != "mock" && cfg.providers.embedding.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.model must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.security.api_key = None;
	}

	cfg.providers.embedding.provider_id = cfg.providers.embedding.provider_id.trim().to_lowercase();
}
