use std::{collections::HashMap, sync::Arc};

use sqlx::PgPool;
use tokio::sync::{Mutex, OnceCell};

use crate::{
	Error, Result,
	db::{self, Db},
	schema,
};
use pond_domain::tenant::TenantName;

/// A resolved tenant namespace. Only [`TenantRegistry::resolve`] constructs one, so holding a
/// `Namespace` means its schema and table exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespace {
	tenant: TenantName,
	schema: String,
	table: String,
	vector_dim: u32,
}
impl Namespace {
	fn new(tenant: TenantName, vector_dim: u32) -> Self {
		let schema_name = tenant.schema_name();
		let table = format!(
			"{}.{}",
			schema::quote_ident(&schema_name),
			schema::quote_ident(schema::MEMORIES_TABLE)
		);

		Self { tenant, schema: schema_name, table, vector_dim }
	}

	pub fn tenant(&self) -> &TenantName {
		&self.tenant
	}

	pub fn schema(&self) -> &str {
		&self.schema
	}

	/// Quoted, schema-qualified table name safe to splice into SQL.
	pub fn table(&self) -> &str {
		&self.table
	}

	pub fn vector_dim(&self) -> u32 {
		self.vector_dim
	}
}

/// Maps tenant names to initialized namespaces, creating them on first use.
///
/// Within a process, concurrent first calls for one tenant share a single initialization. Across
/// processes, a transaction-scoped advisory lock keyed by the schema name serializes the DDL.
pub struct TenantRegistry {
	pool: PgPool,
	vector_dim: u32,
	cells: Mutex<HashMap<TenantName, Arc<OnceCell<Namespace>>>>,
}
impl TenantRegistry {
	pub fn new(db: &Db, vector_dim: u32) -> Self {
		Self { pool: db.pool.clone(), vector_dim, cells: Mutex::new(HashMap::new()) }
	}

	pub async fn resolve(&self, tenant: &TenantName) -> Result<Namespace> {
		let cell = {
			let mut cells = self.cells.lock().await;

			cells.entry(tenant.clone()).or_default().clone()
		};
		let namespace = cell
			.get_or_try_init(|| async {
				let namespace = Namespace::new(tenant.clone(), self.vector_dim);

				initialize(&self.pool, &namespace).await?;

				tracing::info!(tenant = %tenant, schema = namespace.schema(), "Namespace ready.");

				Ok::<_, Error>(namespace)
			})
			.await?;

		Ok(namespace.clone())
	}

	/// Whether the tenant's memory table exists, without creating it.
	pub async fn exists(&self, tenant: &TenantName) -> Result<bool> {
		let exists: bool = sqlx::query_scalar(
			"\
SELECT EXISTS (
	SELECT 1
	FROM information_schema.tables
	WHERE table_schema = $1 AND table_name = $2
)",
		)
		.bind(tenant.schema_name())
		.bind(schema::MEMORIES_TABLE)
		.fetch_one(&self.pool)
		.await?;

		Ok(exists)
	}
}

/// Runs the namespace DDL in one transaction. Postgres DDL is transactional, so a failure leaves
/// no partial schema behind.
///
/// A checkout timeout is [`Error::PoolExhausted`]; only failures after a connection is held count
/// as [`Error::NamespaceInit`].
async fn initialize(pool: &PgPool, namespace: &Namespace) -> Result<()> {
	let schema_name = namespace.schema().to_string();
	let sql = schema::render_namespace_schema(&schema_name, namespace.vector_dim());
	let mut tx = pool.begin().await.map_err(db::pool_error)?;
	let run = async {
		sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
			.bind(&schema_name)
			.execute(&mut *tx)
			.await?;

		for statement in schema::statements(&sql) {
			sqlx::query(statement).execute(&mut *tx).await?;
		}

		tx.commit().await
	};

	run.await.map_err(|source| {
		tracing::error!(error = %source, schema = %schema_name, "Namespace initialization failed.");

		Error::NamespaceInit { schema: schema_name.clone(), source }
	})
}
