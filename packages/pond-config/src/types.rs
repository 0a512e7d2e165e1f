use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Upper bound on a single API call, enforced by the HTTP layer. Expiry cancels the in-flight
	/// storage or embedding wait.
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	#[serde(default = "default_pool_min_conns")]
	pub pool_min_conns: u32,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
	/// How long `acquire` waits for a free connection before reporting pool exhaustion.
	#[serde(default = "default_acquire_timeout_ms")]
	pub acquire_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	/// One of `ollama`, `openai`, or `mock`.
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	#[serde(default = "default_dimensions")]
	pub dimensions: u32,
	#[serde(default = "default_embedding_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Security {
	/// Shared secret expected in the `X-API-Key` header. Unset disables auth, which is only
	/// accepted on a loopback bind.
	pub api_key: Option<String>,
}

fn default_request_timeout_ms() -> u64 {
	90_000
}

fn default_pool_min_conns() -> u32 {
	10
}

fn default_pool_max_conns() -> u32 {
	20
}

fn default_acquire_timeout_ms() -> u64 {
	30_000
}

fn default_dimensions() -> u32 {
	768
}

fn default_embedding_timeout_ms() -> u64 {
	60_000
}
