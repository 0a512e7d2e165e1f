use pond_domain::tenant::TenantName;
use pond_service::{InitRequest, SearchRequest, StoreRequest};

use super::{VectorTable, toward_y};

fn store(content: &str) -> StoreRequest {
	StoreRequest { tenant: "claude".to_string(), content: content.to_string(), tags: Vec::new() }
}

fn search(query: Option<&str>, entity: Option<&str>) -> SearchRequest {
	SearchRequest {
		tenant: "claude".to_string(),
		query: query.map(str::to_string),
		entity: entity.map(str::to_string),
		limit: Some(2),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn search_modes_and_init() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping search_modes_and_init; set POND_PG_DSN to run this test.");

		return;
	};
	let table = VectorTable::with(&[
		("Sparkle chased the mail carrier.", toward_y(0.9)),
		("Biscuit slept all afternoon.", toward_y(0.2)),
		("Sparkle napped on the porch.", toward_y(0.6)),
		("where is the cat", vec![1.0, 0.0, 0.0]),
	]);
	let service = super::build_service(&test_db, table).await;

	for content in [
		"Sparkle chased the mail carrier.",
		"Biscuit slept all afternoon.",
		"Sparkle napped on the porch.",
	] {
		service.store(store(content)).await.expect("Seed store failed.");
	}

	let semantic =
		service.search(search(Some("where is the cat"), None)).await.expect("Search failed.");
	let contents =
		semantic.memories.iter().map(|hit| hit.memory.content.as_str()).collect::<Vec<_>>();

	assert_eq!(contents, vec!["Sparkle chased the mail carrier.", "Sparkle napped on the porch."]);
	assert_eq!(semantic.count, 2);
	assert!(semantic.memories.iter().all(|hit| hit.similarity.is_some()));

	let by_entity = service.search(search(None, Some("Sparkle"))).await.expect("Search failed.");
	let contents =
		by_entity.memories.iter().map(|hit| hit.memory.content.as_str()).collect::<Vec<_>>();

	assert_eq!(contents, vec!["Sparkle napped on the porch.", "Sparkle chased the mail carrier."]);
	assert!(by_entity.memories.iter().all(|hit| hit.similarity.is_none()));

	let lowercase = service.search(search(None, Some("sparkle"))).await.expect("Search failed.");

	assert_eq!(lowercase.count, 0, "Entity lookup is case-sensitive.");

	let fallback = service.search(search(Some("   "), None)).await.expect("Search failed.");

	assert_eq!(fallback.count, 2);
	assert_eq!(fallback.memories[0].memory.content, "Sparkle napped on the porch.");

	let init = service
		.init(InitRequest { tenant: "claude".to_string() })
		.await
		.expect("Init failed.");

	assert_eq!(init.recent_memories.len(), 3);
	assert!(init.recent_memories.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at));

	let hits = service
		.search_entity(&TenantName::parse("claude").expect("Tenant must parse."), "Biscuit", 10)
		.await
		.expect("Entity search failed.");

	assert_eq!(hits.len(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
