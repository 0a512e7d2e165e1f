use std::time::Duration;

use pond_domain::{content::MAX_CONTENT_CHARS, tenant::TenantName};
use pond_service::{Error, StoreRequest};

use super::{VectorTable, toward_y};

fn store(content: &str) -> StoreRequest {
	StoreRequest { tenant: "claude".to_string(), content: content.to_string(), tags: Vec::new() }
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn content_length_boundary() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping content_length_boundary; set POND_PG_DSN to run this test.");

		return;
	};
	let at_limit = "a".repeat(MAX_CONTENT_CHARS);
	let over_limit = "a".repeat(MAX_CONTENT_CHARS + 1);
	let table = VectorTable::with(&[
		(at_limit.as_str(), toward_y(0.1)),
		(over_limit.as_str(), toward_y(0.2)),
	]);
	let service = super::build_service(&test_db, table).await;
	let stored = service.store(store(&at_limit)).await.expect("7500 chars must be accepted.");

	assert_eq!(stored.memory.content.chars().count(), MAX_CONTENT_CHARS);

	let err = service.store(store(&over_limit)).await.expect_err("7501 chars must be rejected.");

	assert!(matches!(err, Error::InvalidContent { .. }), "Unexpected error: {err:?}");
	assert_eq!(super::count(&service, "claude").await, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn embedding_failure_writes_nothing() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping embedding_failure_writes_nothing; set POND_PG_DSN to run this test.");

		return;
	};
	let service =
		super::build_service(&test_db, VectorTable::with(&[("known", toward_y(0.3))])).await;

	service.store(store("known")).await.expect("Known store failed.");

	let err = service.store(store("unknown to the provider")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::EmbeddingUnavailable { .. }), "Unexpected error: {err:?}");
	assert_eq!(super::count(&service, "claude").await, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn failed_commit_rolls_back_the_row() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping failed_commit_rolls_back_the_row; set POND_PG_DSN to run this test.");

		return;
	};
	let table = VectorTable::with(&[("explode", toward_y(0.4)), ("fine", toward_y(0.5))]);
	let service = super::build_service(&test_db, table).await;
	let tenant = TenantName::parse("claude").expect("Tenant must parse.");

	service.registry.resolve(&tenant).await.expect("Failed to resolve namespace.");

	// The deferred trigger fires at COMMIT, after the insert and splashback already succeeded.
	sqlx::query(
		"\
CREATE FUNCTION pond_claude.reject_explode() RETURNS trigger LANGUAGE plpgsql AS $$
BEGIN
	IF NEW.content = 'explode' THEN
		RAISE EXCEPTION 'rejected at commit';
	END IF;
	RETURN NULL;
END
$$",
	)
	.execute(&service.db.pool)
	.await
	.expect("Failed to create trigger function.");
	sqlx::query(
		"\
CREATE CONSTRAINT TRIGGER reject_explode
AFTER INSERT ON pond_claude.memories
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW EXECUTE FUNCTION pond_claude.reject_explode()",
	)
	.execute(&service.db.pool)
	.await
	.expect("Failed to create trigger.");

	let err = service.store(store("explode")).await.expect_err("Expected commit failure.");

	assert!(matches!(err, Error::StorageFailed { .. }), "Unexpected error: {err:?}");
	assert_eq!(super::count(&service, "claude").await, 0);

	service.store(store("fine")).await.expect("Unaffected store failed.");

	assert_eq!(super::count(&service, "claude").await, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn cancelled_store_leaves_no_row() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping cancelled_store_leaves_no_row; set POND_PG_DSN to run this test.");

		return;
	};
	let mut table = VectorTable::with(&[("slow", toward_y(0.6))]);

	table.delay = Some(Duration::from_millis(500));

	let service = super::build_service(&test_db, table).await;
	let outcome =
		tokio::time::timeout(Duration::from_millis(100), service.store(store("slow"))).await;

	assert!(outcome.is_err(), "The store must still be waiting on the provider.");
	assert_eq!(super::count(&service, "claude").await, 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn surrounding_whitespace_is_not_stored() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping surrounding_whitespace_is_not_stored; set POND_PG_DSN to run.");

		return;
	};
	let service =
		super::build_service(&test_db, VectorTable::with(&[("padded", toward_y(0.3))])).await;
	let stored = service.store(store("  \n padded \t")).await.expect("Padded store failed.");

	assert_eq!(stored.memory.content, "padded");

	let recent = service
		.recent(pond_service::RecentRequest {
			tenant: "claude".to_string(),
			hours: None,
			limit: None,
		})
		.await
		.expect("Recent failed.");

	assert_eq!(recent.memories[0].content, "padded");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
