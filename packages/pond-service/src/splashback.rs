use serde::{Deserialize, Serialize};

use crate::{MemoryView, Result};
use pond_domain::band::SimilarityBand;
use pond_storage::{NamespaceScope, models::ScoredMemoryRow, queries};

/// A prior memory surfaced next to a newly stored one.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SplashbackItem {
	#[serde(flatten)]
	pub memory: MemoryView,
	pub similarity: f32,
}
impl From<ScoredMemoryRow> for SplashbackItem {
	fn from(row: ScoredMemoryRow) -> Self {
		let similarity = row.similarity as f32;

		Self { memory: MemoryView::from(row), similarity }
	}
}

/// Up to three active memories whose similarity to `embedding` lies strictly inside the
/// splashback band, excluding `exclude_id`. Returns fewer, or none, rather than padding.
pub async fn splashback<S>(
	scope: &mut S,
	embedding: &[f32],
	exclude_id: i64,
) -> Result<Vec<SplashbackItem>>
where
	S: NamespaceScope,
{
	let band = SimilarityBand::splashback();
	let candidates = queries::splashback_candidates(scope, embedding, exclude_id, &band).await?;

	Ok(band.select(candidates).into_iter().map(SplashbackItem::from).collect())
}
