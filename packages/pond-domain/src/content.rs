pub const MAX_CONTENT_CHARS: usize = 7_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRejection {
	Empty,
	TooLong { chars: usize },
}
impl ContentRejection {
	pub fn message(&self) -> String {
		match self {
			Self::Empty => "Memory content must not be empty.".to_string(),
			Self::TooLong { chars } => format!(
				"Memory content is {chars} characters; the maximum is {MAX_CONTENT_CHARS}."
			),
		}
	}
}

/// Checks stored-memory content. Length counts Unicode scalar values of the untrimmed text.
pub fn validate_content(content: &str) -> Result<(), ContentRejection> {
	if content.trim().is_empty() {
		return Err(ContentRejection::Empty);
	}

	let chars = content.chars().count();

	if chars > MAX_CONTENT_CHARS {
		return Err(ContentRejection::TooLong { chars });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn whitespace_only_is_empty() {
		assert_eq!(validate_content(" \n\t "), Err(ContentRejection::Empty));
	}

	#[test]
	fn length_counts_chars_not_bytes() {
		let content = "é".repeat(MAX_CONTENT_CHARS);

		assert!(content.len() > MAX_CONTENT_CHARS);
		assert_eq!(validate_content(&content), Ok(()));
	}

	#[test]
	fn one_past_the_limit_is_rejected() {
		let content = "a".repeat(MAX_CONTENT_CHARS + 1);

		assert_eq!(
			validate_content(&content),
			Err(ContentRejection::TooLong { chars: MAX_CONTENT_CHARS + 1 })
		);
	}
}
