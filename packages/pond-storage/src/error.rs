#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Timed out waiting for a pooled database connection.")]
	PoolExhausted,
	#[error("Failed to initialize namespace {schema}.")]
	NamespaceInit { schema: String, source: sqlx::Error },
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
