use crate::{Error, Result};

/// Formats a vector as pgvector text input, e.g. `[0.1,0.2]`.
pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

/// Refuses to write a vector the namespace column cannot hold.
pub fn check_dimension(vec: &[f32], vector_dim: u32) -> Result<()> {
	if vec.len() != vector_dim as usize {
		return Err(Error::InvalidArgument(format!(
			"Embedding has {} dimensions; namespace expects {vector_dim}.",
			vec.len()
		)));
	}
	if vec.iter().any(|value| !value.is_finite()) {
		return Err(Error::InvalidArgument("Embedding contains non-finite values.".to_string()));
	}

	Ok(())
}
