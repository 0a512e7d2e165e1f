use pond_service::{RecentRequest, StoreRequest};

use super::{VectorTable, toward_y};

fn store(tenant: &str, content: &str) -> StoreRequest {
	StoreRequest { tenant: tenant.to_string(), content: content.to_string(), tags: Vec::new() }
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn concurrent_first_stores_share_one_namespace() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping concurrent_first_stores_share_one_namespace; set POND_PG_DSN to run.");

		return;
	};
	let table = VectorTable::with(&[("left", toward_y(0.2)), ("right", toward_y(0.9999))]);
	let service = super::build_service(&test_db, table).await;
	let (left, right) = tokio::join!(
		service.store(store("claude", "left")),
		service.store(store("claude", "right"))
	);

	left.expect("Left store failed.");
	right.expect("Right store failed.");

	assert_eq!(super::count(&service, "claude").await, 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn tenants_never_see_each_other() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping tenants_never_see_each_other; set POND_PG_DSN to run this test.");

		return;
	};
	let table = VectorTable::with(&[
		("alpha one", toward_y(0.5)),
		("alpha two", toward_y(0.75)),
		("alpha three", toward_y(0.8)),
		("beta one", toward_y(0.76)),
	]);
	let service = super::build_service(&test_db, table).await;

	for content in ["alpha one", "alpha two", "alpha three"] {
		service.store(store("alpha", content)).await.expect("Alpha store failed.");
	}

	let beta = service.store(store("beta", "beta one")).await.expect("Beta store failed.");

	assert!(beta.splashback.is_empty(), "Splashback must not cross namespaces.");

	let recent =
		|tenant: &str| RecentRequest { tenant: tenant.to_string(), hours: None, limit: None };
	let alpha_recent = service.recent(recent("alpha")).await.expect("Alpha recent failed.");
	let beta_recent = service.recent(recent("beta")).await.expect("Beta recent failed.");

	assert_eq!(alpha_recent.count, 3);
	assert!(alpha_recent.memories.iter().all(|memory| memory.content.starts_with("alpha")));
	assert_eq!(beta_recent.count, 1);
	assert_eq!(beta_recent.memories[0].content, "beta one");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
