pub const MEMORIES_TABLE: &str = "memories";

/// Renders the per-tenant DDL for `schema`, an unquoted identifier already validated by
/// [`pond_domain::tenant::TenantName`].
pub fn render_namespace_schema(schema: &str, vector_dim: u32) -> String {
	include_str!("../sql/namespace.sql")
		.replace("<SCHEMA>", &quote_ident(schema))
		.replace("<VECTOR_DIM>", &vector_dim.to_string())
}

/// Splits rendered DDL into executable statements.
pub fn statements(sql: &str) -> impl Iterator<Item = &str> {
	sql.split(';').map(str::trim).filter(|statement| !statement.is_empty())
}

pub fn quote_ident(ident: &str) -> String {
	format!("\"{}\"", ident.replace('"', "\"\""))
}
