use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{DEFAULT_LIMIT, DEFAULT_SINCE_HOURS, MemoryView, PondService, Result};
use pond_domain::tenant::TenantName;
use pond_storage::queries;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecentRequest {
	pub tenant: String,
	pub hours: Option<u32>,
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecentResponse {
	pub memories: Vec<MemoryView>,
	pub count: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InitRequest {
	pub tenant: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InitResponse {
	#[serde(with = "crate::time_serde")]
	pub current_time: OffsetDateTime,
	pub recent_memories: Vec<MemoryView>,
}

impl PondService {
	pub async fn recent(&self, req: RecentRequest) -> Result<RecentResponse> {
		let tenant = crate::parse_tenant(&req.tenant)?;
		let hours = crate::resolve_since_hours(req.hours)?;
		let limit = crate::resolve_limit(req.limit)?;
		let memories = self.recent_memories(&tenant, hours, limit).await?;

		Ok(RecentResponse { count: memories.len(), memories })
	}

	/// Session bootstrap: the server clock and the last day of memories.
	pub async fn init(&self, req: InitRequest) -> Result<InitResponse> {
		let tenant = crate::parse_tenant(&req.tenant)?;
		let recent_memories =
			self.recent_memories(&tenant, DEFAULT_SINCE_HOURS, DEFAULT_LIMIT).await?;

		Ok(InitResponse { current_time: OffsetDateTime::now_utc(), recent_memories })
	}

	/// Active memories created within the last `since_hours`, newest first.
	pub async fn recent_memories(
		&self,
		tenant: &TenantName,
		since_hours: u32,
		limit: u32,
	) -> Result<Vec<MemoryView>> {
		let namespace = self.registry.resolve(tenant).await?;
		let mut conn = self.db.acquire(&namespace).await?;
		let rows = queries::recent(&mut conn, since_hours, limit).await?;

		Ok(rows.into_iter().map(MemoryView::from).collect())
	}
}
