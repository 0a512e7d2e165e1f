pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid content: {message}")]
	InvalidContent { message: String },
	#[error("Invalid tenant: {message}")]
	InvalidTenant { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Namespace initialization failed for {schema}.")]
	NamespaceInitFailed { schema: String },
	#[error("Embedding unavailable: {message}")]
	EmbeddingUnavailable { message: String },
	#[error("Extraction failed: {message}")]
	ExtractionFailed { message: String },
	#[error("Storage error: {message}")]
	StorageFailed { message: String },
	#[error("Connection pool exhausted.")]
	PoolExhausted,
}
impl From<pond_storage::Error> for Error {
	fn from(err: pond_storage::Error) -> Self {
		match err {
			pond_storage::Error::PoolExhausted => Self::PoolExhausted,
			pond_storage::Error::NamespaceInit { schema, .. } =>
				Self::NamespaceInitFailed { schema },
			other => {
				tracing::error!(error = %other, "Storage operation failed.");

				Self::StorageFailed { message: other.to_string() }
			},
		}
	}
}
