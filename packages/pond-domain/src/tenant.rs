use std::{fmt, sync::OnceLock};

use regex::Regex;

pub const MAX_TENANT_CHARS: usize = 48;
pub const SCHEMA_PREFIX: &str = "pond_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantRejection {
	Empty,
	TooLong,
	InvalidStart,
	InvalidCharacter,
}
impl TenantRejection {
	pub fn message(&self) -> &'static str {
		match self {
			Self::Empty => "Tenant name must not be empty.",
			Self::TooLong => "Tenant name must be at most 48 characters.",
			Self::InvalidStart => "Tenant name must start with a lowercase letter.",
			Self::InvalidCharacter =>
				"Tenant name may only contain lowercase letters, digits, and underscores.",
		}
	}
}

/// A validated tenant identifier. Safe to embed in a Postgres identifier once quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantName(String);
impl TenantName {
	pub fn parse(raw: &str) -> Result<Self, TenantRejection> {
		if raw.is_empty() {
			return Err(TenantRejection::Empty);
		}
		if raw.chars().count() > MAX_TENANT_CHARS {
			return Err(TenantRejection::TooLong);
		}
		if !raw.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
			return Err(TenantRejection::InvalidStart);
		}
		if !tenant_pattern().map(|re| re.is_match(raw)).unwrap_or(false) {
			return Err(TenantRejection::InvalidCharacter);
		}

		Ok(Self(raw.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The Postgres schema that holds this tenant's memories.
	pub fn schema_name(&self) -> String {
		format!("{SCHEMA_PREFIX}{}", self.0)
	}
}
impl fmt::Display for TenantName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

fn tenant_pattern() -> Option<&'static Regex> {
	static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

	PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").ok()).as_ref()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn schema_name_is_prefixed() {
		let tenant = TenantName::parse("claude").expect("Tenant must parse.");

		assert_eq!(tenant.schema_name(), "pond_claude");
	}

	#[test]
	fn rejects_sql_metacharacters() {
		assert_eq!(TenantName::parse("a\";drop"), Err(TenantRejection::InvalidCharacter));
		assert_eq!(TenantName::parse("a b"), Err(TenantRejection::InvalidCharacter));
	}
}
