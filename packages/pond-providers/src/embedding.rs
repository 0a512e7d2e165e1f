use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};
use pond_config::EmbeddingProviderConfig;

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
	embedding: Vec<f64>,
}

/// Embeds one text with the configured provider and checks the vector before returning it.
///
/// Any upstream problem is an error; a degraded or zero vector is never returned.
pub async fn embed(cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let vector = match cfg.provider_id.as_str() {
		"ollama" => embed_ollama(cfg, text).await?,
		"openai" => embed_openai(cfg, text).await?,
		"mock" => embed_mock(text, cfg.dimensions as usize),
		other => {
			return Err(Error::InvalidConfig {
				message: format!("Unsupported embedding provider {other:?}."),
			});
		},
	};

	let vector = check_embedding(vector, cfg.dimensions as usize)?;

	tracing::debug!(
		provider = %cfg.provider_id,
		model = %cfg.model,
		dimensions = vector.len(),
		"Embedding generated."
	);

	Ok(vector)
}

async fn embed_ollama(cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"prompt": text,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let parsed: OllamaEmbeddingResponse = serde_json::from_value(json)?;

	Ok(parsed.embedding.into_iter().map(|value| value as f32).collect())
}

async fn embed_openai(cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": [text],
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_openai_response(json)?.into_iter().next().ok_or_else(|| Error::InvalidResponse {
		message: "Embedding response data array is empty.".to_string(),
	})
}

/// Deterministic unit vector derived from the text. Equal texts embed identically.
pub fn embed_mock(text: &str, dimensions: usize) -> Vec<f32> {
	let mut hasher = blake3::Hasher::new();

	hasher.update(text.as_bytes());

	let mut reader = hasher.finalize_xof();
	let mut bytes = vec![0_u8; dimensions * 4];

	reader.fill(&mut bytes);

	let raw: Vec<f32> = bytes
		.chunks_exact(4)
		.map(|chunk| {
			let value = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

			(value as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
		})
		.collect();
	let norm = raw.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm == 0.0 {
		return raw;
	}

	raw.into_iter().map(|value| value / norm).collect()
}

fn parse_openai_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding item missing embedding array.".to_string(),
			}
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

/// Rejects empty, non-finite, all-zero, or wrongly sized vectors.
pub fn check_embedding(vector: Vec<f32>, dimensions: usize) -> Result<Vec<f32>> {
	if vector.is_empty() {
		return Err(Error::InvalidResponse { message: "Embedding vector is empty.".to_string() });
	}
	if vector.len() != dimensions {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding has {} dimensions; expected {dimensions}.",
				vector.len()
			),
		});
	}
	if vector.iter().any(|value| !value.is_finite()) {
		return Err(Error::InvalidResponse {
			message: "Embedding vector contains non-finite values.".to_string(),
		});
	}
	if vector.iter().all(|value| *value == 0.0) {
		return Err(Error::InvalidResponse {
			message: "Embedding vector is all zeros.".to_string(),
		});
	}

	Ok(vector)
}
