use std::future::Future;

use axum::{
	Json, Router,
	body::Body,
	extract::{FromRequestParts, State, rejection::JsonRejection},
	http::{HeaderMap, HeaderValue, Request, StatusCode, request::Parts},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::state::AppState;
use pond_service::{
	Error as ServiceError, InitRequest, InitResponse, RecentRequest, RecentResponse,
	SearchRequest, SearchResponse, StoreRequest, StoreResponse,
};

pub const HEADER_TENANT: &str = "x-pond-tenant";
pub const HEADER_API_KEY: &str = "x-api-key";
pub const HEADER_REQUEST_ID: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
	let memories = Router::new()
		.route("/api/v1/store", post(store))
		.route("/api/v1/search", post(search))
		.route("/api/v1/recent", post(recent))
		.route("/api/v1/init", post(init))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

	Router::new()
		.route("/api/v1/health", get(health))
		.merge(memories)
		.layer(middleware::from_fn(assign_request_id))
		.with_state(state)
}

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Per-request identity: the request id and the tenant named by `X-Pond-Tenant`.
#[derive(Clone, Debug)]
pub struct RequestContext {
	pub request_id: String,
	pub tenant: String,
}
impl RequestContext {
	/// Runs a service call under the request timeout. Expiry drops the call, which rolls back any
	/// open transaction and releases its connection.
	async fn call<T, F>(&self, state: &AppState, call: F) -> Result<Json<T>, ApiError>
	where
		F: Future<Output = pond_service::Result<T>>,
	{
		match tokio::time::timeout(state.request_timeout(), call).await {
			Ok(Ok(value)) => Ok(Json(value)),
			Ok(Err(err)) => Err(ApiError::from_service(err, &self.request_id)),
			Err(_) => {
				tracing::warn!(tenant = %self.tenant, "Request timed out.");

				Err(ApiError::new(
					StatusCode::GATEWAY_TIMEOUT,
					"REQUEST_TIMEOUT",
					"Request timed out.",
					&self.request_id,
				))
			},
		}
	}
}
impl<S> FromRequestParts<S> for RequestContext
where
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let request_id = request_id_of(parts.extensions.get::<RequestId>());
		let tenant = header_str(&parts.headers, HEADER_TENANT).ok_or_else(|| {
			ApiError::new(
				StatusCode::BAD_REQUEST,
				"INVALID_TENANT",
				"X-Pond-Tenant header is required.",
				&request_id,
			)
		})?;

		Ok(Self { tenant: tenant.to_string(), request_id })
	}
}

#[derive(Debug, Serialize)]
struct HealthBody {
	status: &'static str,
	database: &'static str,
	embeddings: &'static str,
	version: &'static str,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
	let report = state.service.health().await;
	let label = |ok: bool| if ok { "healthy" } else { "unhealthy" };
	let status = if report.database { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
	let body = HealthBody {
		status: label(report.database && report.embeddings),
		database: label(report.database),
		embeddings: label(report.embeddings),
		version: pond_cli::VERSION,
	};

	(status, Json(body))
}

#[derive(Debug, Deserialize)]
struct StoreBody {
	content: String,
	#[serde(default)]
	tags: Vec<String>,
}

async fn store(
	State(state): State<AppState>,
	ctx: RequestContext,
	payload: Result<Json<StoreBody>, JsonRejection>,
) -> Result<Json<StoreResponse>, ApiError> {
	let Json(body) = payload.map_err(|err| ApiError::bad_json(err, &ctx.request_id))?;
	let req = StoreRequest { tenant: ctx.tenant.clone(), content: body.content, tags: body.tags };

	ctx.call(&state, state.service.store(req)).await
}

#[derive(Debug, Deserialize)]
struct SearchBody {
	query: Option<String>,
	entity: Option<String>,
	limit: Option<u32>,
}

async fn search(
	State(state): State<AppState>,
	ctx: RequestContext,
	payload: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(body) = payload.map_err(|err| ApiError::bad_json(err, &ctx.request_id))?;
	let req = SearchRequest {
		tenant: ctx.tenant.clone(),
		query: body.query,
		entity: body.entity,
		limit: body.limit,
	};

	ctx.call(&state, state.service.search(req)).await
}

#[derive(Debug, Deserialize)]
struct RecentBody {
	hours: Option<u32>,
	limit: Option<u32>,
}

async fn recent(
	State(state): State<AppState>,
	ctx: RequestContext,
	payload: Result<Json<RecentBody>, JsonRejection>,
) -> Result<Json<RecentResponse>, ApiError> {
	let Json(body) = payload.map_err(|err| ApiError::bad_json(err, &ctx.request_id))?;
	let req = RecentRequest { tenant: ctx.tenant.clone(), hours: body.hours, limit: body.limit };

	ctx.call(&state, state.service.recent(req)).await
}

async fn init(
	State(state): State<AppState>,
	ctx: RequestContext,
) -> Result<Json<InitResponse>, ApiError> {
	let req = InitRequest { tenant: ctx.tenant.clone() };

	ctx.call(&state, state.service.init(req)).await
}

/// Tags every request with an id, taken from a well-formed inbound `X-Request-Id` or generated,
/// and echoes it on the response.
async fn assign_request_id(mut req: Request<Body>, next: Next) -> Response {
	let request_id = header_str(req.headers(), HEADER_REQUEST_ID)
		.filter(|raw| Uuid::parse_str(raw).is_ok())
		.map(str::to_string)
		.unwrap_or_else(|| Uuid::new_v4().to_string());
	let span = tracing::info_span!(
		"request",
		request_id = %request_id,
		method = %req.method(),
		path = %req.uri().path(),
	);

	req.extensions_mut().insert(RequestId(request_id.clone()));

	let mut response = next.run(req).instrument(span).await;

	if let Ok(value) = HeaderValue::from_str(&request_id) {
		response.headers_mut().insert(HEADER_REQUEST_ID, value);
	}

	response
}

/// Checks `X-API-Key` before any handler runs, so no tenant is resolved for a rejected caller.
async fn require_api_key(
	State(state): State<AppState>,
	req: Request<Body>,
	next: Next,
) -> Response {
	let Some(expected) = state.api_key() else {
		return next.run(req).await;
	};
	let authorized = header_str(req.headers(), HEADER_API_KEY)
		.is_some_and(|provided| keys_match(provided, expected));

	if !authorized {
		let request_id = request_id_of(req.extensions().get::<RequestId>());

		tracing::warn!("Rejected request without a valid API key.");

		return ApiError::new(
			StatusCode::UNAUTHORIZED,
			"UNAUTHORIZED",
			"A valid X-API-Key header is required.",
			&request_id,
		)
		.into_response();
	}

	next.run(req).await
}

/// Compares digests; `blake3::Hash` equality is constant-time.
fn keys_match(provided: &str, expected: &str) -> bool {
	blake3::hash(provided.as_bytes()) == blake3::hash(expected.as_bytes())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	let value = headers.get(name)?.to_str().ok()?.trim();

	if value.is_empty() { None } else { Some(value) }
}

fn request_id_of(extension: Option<&RequestId>) -> String {
	extension.map(|id| id.0.clone()).unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: &'static str,
	message: String,
	request_id: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
	request_id: String,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: &'static str,
		message: impl Into<String>,
		request_id: &str,
	) -> Self {
		Self { status, error_code, message: message.into(), request_id: request_id.to_string() }
	}

	fn bad_json(err: JsonRejection, request_id: &str) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text(), request_id)
	}

	/// Validation messages pass through. Every other kind gets a fixed message; its cause was
	/// already logged where it happened.
	fn from_service(err: ServiceError, request_id: &str) -> Self {
		let (status, code, message) = match err {
			ServiceError::InvalidContent { message } =>
				(StatusCode::BAD_REQUEST, "INVALID_CONTENT", message),
			ServiceError::InvalidTenant { message } =>
				(StatusCode::BAD_REQUEST, "INVALID_TENANT", message),
			ServiceError::InvalidRequest { message } =>
				(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::EmbeddingUnavailable { .. } => (
				StatusCode::SERVICE_UNAVAILABLE,
				"EMBEDDING_UNAVAILABLE",
				"Embedding service is unavailable.".to_string(),
			),
			ServiceError::PoolExhausted => (
				StatusCode::SERVICE_UNAVAILABLE,
				"POOL_EXHAUSTED",
				"No database connection is available.".to_string(),
			),
			ServiceError::ExtractionFailed { .. } => (
				StatusCode::INTERNAL_SERVER_ERROR,
				"EXTRACTION_FAILED",
				"Text analysis failed.".to_string(),
			),
			ServiceError::NamespaceInitFailed { .. } => (
				StatusCode::INTERNAL_SERVER_ERROR,
				"NAMESPACE_INIT_FAILED",
				"Tenant namespace could not be initialized.".to_string(),
			),
			ServiceError::StorageFailed { .. } => (
				StatusCode::INTERNAL_SERVER_ERROR,
				"STORAGE_FAILED",
				"Storage operation failed.".to_string(),
			),
		};

		tracing::info!(error_code = code, status = status.as_u16(), "Request failed.");

		Self::new(status, code, message, request_id)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			request_id: self.request_id,
		};

		(self.status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn key_comparison() {
		assert!(keys_match("s3cret", "s3cret"));
		assert!(!keys_match("s3cret ", "s3cret"));
		assert!(!keys_match("", "s3cret"));
	}

	#[test]
	fn internal_causes_stay_out_of_error_messages() {
		let err = ApiError::from_service(
			ServiceError::StorageFailed {
				message: "relation pond_x.memories is locked".to_string(),
			},
			"req-1",
		);

		assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(err.error_code, "STORAGE_FAILED");
		assert!(!err.message.contains("pond_x"));

		let err = ApiError::from_service(
			ServiceError::InvalidContent { message: "Content must not be empty.".to_string() },
			"req-2",
		);

		assert_eq!(err.status, StatusCode::BAD_REQUEST);
		assert_eq!(err.message, "Content must not be empty.");
	}
}
