use std::cmp::Ordering;

use time::OffsetDateTime;

pub const SPLASHBACK_LOWER: f64 = 0.7;
pub const SPLASHBACK_UPPER: f64 = 0.9;
pub const SPLASHBACK_LIMIT: usize = 3;

/// A row that can be ranked by the splashback band.
pub trait BandCandidate {
	fn similarity(&self) -> f64;
	fn created_at(&self) -> OffsetDateTime;
	fn id(&self) -> i64;
}

/// Open similarity interval `(lower, upper)` with a result cap. Both bounds are exclusive:
/// exact matches on either edge never qualify. Compared in double precision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityBand {
	pub lower: f64,
	pub upper: f64,
	pub limit: usize,
}
impl SimilarityBand {
	pub const fn splashback() -> Self {
		Self { lower: SPLASHBACK_LOWER, upper: SPLASHBACK_UPPER, limit: SPLASHBACK_LIMIT }
	}

	pub fn contains(&self, similarity: f64) -> bool {
		similarity.is_finite() && similarity > self.lower && similarity < self.upper
	}

	/// Filters to the band, orders by similarity desc, then `created_at` desc, then `id` desc,
	/// and truncates to the limit. Never pads.
	pub fn select<T>(&self, candidates: Vec<T>) -> Vec<T>
	where
		T: BandCandidate,
	{
		let mut in_band: Vec<T> =
			candidates.into_iter().filter(|row| self.contains(row.similarity())).collect();

		in_band.sort_by(compare_candidates);
		in_band.truncate(self.limit);

		in_band
	}
}
impl Default for SimilarityBand {
	fn default() -> Self {
		Self::splashback()
	}
}

fn compare_candidates<T>(a: &T, b: &T) -> Ordering
where
	T: BandCandidate,
{
	b.similarity()
		.total_cmp(&a.similarity())
		.then_with(|| b.created_at().cmp(&a.created_at()))
		.then_with(|| b.id().cmp(&a.id()))
}

/// Cosine similarity of two equal-length vectors. `None` for mismatched lengths or a zero vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
	if a.len() != b.len() || a.is_empty() {
		return None;
	}

	let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);

	for (x, y) in a.iter().zip(b) {
		let (x, y) = (f64::from(*x), f64::from(*y));

		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	if norm_a == 0.0 || norm_b == 0.0 {
		return None;
	}

	Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
