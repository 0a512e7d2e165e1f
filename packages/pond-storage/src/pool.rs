//! Namespace-bound connections.
//!
//! A [`ScopedConnection`] owns one pooled connection for the duration of a single operation and
//! remembers which tenant namespace it serves. Every query in [`crate::queries`] takes its table
//! from that binding, so there is no way to address two namespaces through one scope.

use sqlx::{Acquire, PgConnection, Postgres, Transaction, pool::PoolConnection};

use crate::{Namespace, Result};

/// A database handle bound to exactly one namespace.
pub trait NamespaceScope
where
	Self: Send,
{
	fn namespace(&self) -> &Namespace;

	fn connection(&mut self) -> &mut PgConnection;
}

pub struct ScopedConnection {
	conn: PoolConnection<Postgres>,
	namespace: Namespace,
}
impl ScopedConnection {
	pub(crate) fn new(conn: PoolConnection<Postgres>, namespace: Namespace) -> Self {
		Self { conn, namespace }
	}

	/// Opens a `REPEATABLE READ` transaction. Dropping it without [`ScopedTransaction::commit`]
	/// rolls back.
	pub async fn begin(&mut self) -> Result<ScopedTransaction<'_>> {
		let mut tx = self.conn.begin().await?;

		sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ").execute(&mut *tx).await?;

		Ok(ScopedTransaction { tx, namespace: &self.namespace })
	}
}
impl NamespaceScope for ScopedConnection {
	fn namespace(&self) -> &Namespace {
		&self.namespace
	}

	fn connection(&mut self) -> &mut PgConnection {
		&mut self.conn
	}
}

pub struct ScopedTransaction<'c> {
	tx: Transaction<'c, Postgres>,
	namespace: &'c Namespace,
}
impl ScopedTransaction<'_> {
	pub async fn commit(self) -> Result<()> {
		self.tx.commit().await?;

		Ok(())
	}
}
impl NamespaceScope for ScopedTransaction<'_> {
	fn namespace(&self) -> &Namespace {
		self.namespace
	}

	fn connection(&mut self) -> &mut PgConnection {
		&mut self.tx
	}
}
