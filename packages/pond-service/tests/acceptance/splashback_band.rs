use pond_domain::extraction::Entity;
use pond_service::StoreRequest;

use super::{VectorTable, toward_y, toward_z};

const FIRST: &str = "Sparkle stole bacon this morning!";
const SECOND: &str = "Sparkle got caught stealing cheese.";
const ECHO: &str = "Sparkle stole bacon again this morning.";

fn store(content: &str, tags: &[&str]) -> StoreRequest {
	StoreRequest {
		tenant: "claude".to_string(),
		content: content.to_string(),
		tags: tags.iter().map(|tag| tag.to_string()).collect(),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn splashback_surfaces_related_memories_only() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping splashback_surfaces_related_memories_only; set POND_PG_DSN to run.");

		return;
	};
	// FIRST sits on the x axis. SECOND is 0.82 from FIRST. ECHO is 0.95 from FIRST and
	// 0.82 * 0.95 = 0.779 from SECOND.
	let table = VectorTable::with(&[
		(FIRST, vec![1.0, 0.0, 0.0]),
		(SECOND, toward_y(0.82)),
		(ECHO, toward_z(0.95)),
	]);
	let service = super::build_service(&test_db, table).await;
	let first = service.store(store(FIRST, &["pets"])).await.expect("First store failed.");

	assert!(first.splashback.is_empty(), "An empty namespace has nothing to splash back.");
	assert_eq!(first.memory.entities, vec![Entity::new("Sparkle", "PROPN")]);
	assert_eq!(first.memory.actions, vec!["steal".to_string()]);
	assert_eq!(first.memory.tags, vec!["bacon", "morning", "pet", "sparkle"]);

	let second = service.store(store(SECOND, &[])).await.expect("Second store failed.");

	assert_eq!(second.splashback.len(), 1);
	assert_eq!(second.splashback[0].memory.content, FIRST);
	assert!((second.splashback[0].similarity - 0.82).abs() < 1e-3);

	let echo = service.store(store(ECHO, &[])).await.expect("Echo store failed.");
	let surfaced =
		echo.splashback.iter().map(|item| item.memory.content.as_str()).collect::<Vec<_>>();

	assert_eq!(surfaced, vec![SECOND], "The 0.95 near-duplicate must stay out of the band.");
	assert!(echo.splashback.iter().all(|item| item.similarity > 0.7 && item.similarity < 0.9));
	assert_eq!(super::count(&service, "claude").await, 3);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set POND_PG_DSN to run."]
async fn splashback_caps_at_three_most_similar() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping splashback_caps_at_three_most_similar; set POND_PG_DSN to run.");

		return;
	};
	let band = [0.71_f32, 0.75, 0.8, 0.85, 0.89];
	let mut entries: Vec<(String, Vec<f32>)> =
		band.iter().map(|s| (format!("memory at {s}"), toward_y(*s))).collect();

	entries.push(("the probe".to_string(), vec![1.0, 0.0, 0.0]));

	let borrowed =
		entries.iter().map(|(text, vector)| (text.as_str(), vector.clone())).collect::<Vec<_>>();
	let service = super::build_service(&test_db, VectorTable::with(&borrowed)).await;

	for s in band {
		service.store(store(&format!("memory at {s}"), &[])).await.expect("Seed store failed.");
	}

	let probe = service.store(store("the probe", &[])).await.expect("Probe store failed.");
	let surfaced =
		probe.splashback.iter().map(|item| item.memory.content.as_str()).collect::<Vec<_>>();

	assert_eq!(surfaced, vec!["memory at 0.89", "memory at 0.85", "memory at 0.8"]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
