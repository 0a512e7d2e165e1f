use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Error, Namespace, Result, ScopedConnection};

const EXTENSION_LOCK_ID: i64 = 7_120_115;

#[derive(Clone)]
pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &pond_config::Postgres) -> Result<Self> {
		let pool = pool_options(cfg).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	/// Builds the pool without opening a connection. Connections are established on first use.
	pub fn connect_lazy(cfg: &pond_config::Postgres) -> Result<Self> {
		let pool = pool_options(cfg).connect_lazy(&cfg.dsn)?;

		Ok(Self { pool })
	}

	/// Installs the `vector` extension once per database.
	pub async fn ensure_extension(&self) -> Result<()> {
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)")
			.bind(EXTENSION_LOCK_ID)
			.execute(&mut *tx)
			.await?;
		sqlx::query("CREATE EXTENSION IF NOT EXISTS vector").execute(&mut *tx).await?;

		tx.commit().await?;

		Ok(())
	}

	/// Checks out a connection bound to `namespace`.
	///
	/// Waits up to the configured acquire timeout and then fails with [`Error::PoolExhausted`]. The
	/// connection returns to the pool when the scope is dropped.
	pub async fn acquire(&self, namespace: &Namespace) -> Result<ScopedConnection> {
		let conn = self.pool.acquire().await.map_err(pool_error)?;

		Ok(ScopedConnection::new(conn, namespace.clone()))
	}

	pub async fn ping(&self) -> Result<()> {
		sqlx::query("SELECT 1").execute(&self.pool).await.map_err(pool_error)?;

		Ok(())
	}
}

/// Maps a checkout failure, turning an acquire timeout into [`Error::PoolExhausted`].
pub(crate) fn pool_error(err: sqlx::Error) -> Error {
	match err {
		sqlx::Error::PoolTimedOut => Error::PoolExhausted,
		other => Error::Sqlx(other),
	}
}

fn pool_options(cfg: &pond_config::Postgres) -> PgPoolOptions {
	PgPoolOptions::new()
		.min_connections(cfg.pool_min_conns)
		.max_connections(cfg.pool_max_conns)
		.acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
}
