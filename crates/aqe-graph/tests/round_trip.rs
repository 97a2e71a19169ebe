//! Persist-and-reload behavior of the graph store
//!
//! A reloaded session must reproduce identical evidence lists and identical
//! recomputed scores: aggregation is deterministic and depends only on the
//! evidence log.

use aqe_graph::GraphStore;
use aqe_model::{EdgeId, EdgeType, Evidence, NodeKind, SessionId};
use aqe_store::MemoryBackend;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

fn evidence(score: u8, tier: u8, minute: i64, prov: &str) -> Evidence {
    let base = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    Evidence::new(
        score,
        tier,
        format!("observation {prov}"),
        base + Duration::minutes(minute),
        prov,
    )
    .unwrap()
}

#[tokio::test]
async fn reload_reproduces_evidence_and_scores() {
    let backend = Arc::new(MemoryBackend::new());
    let session = SessionId::new("session-rt");
    let mut store = GraphStore::new(session.clone(), backend.clone());

    let forecast = store
        .get_or_create_node(NodeKind::Output, "Monthly forecast")
        .await
        .unwrap();
    let upstream = store
        .get_or_create_node(NodeKind::Output, "Pipeline data")
        .await
        .unwrap();
    let crm = store
        .get_or_create_node(NodeKind::Tool, "CRM")
        .await
        .unwrap();
    let analysts = store
        .get_or_create_node(NodeKind::People, "Analysts")
        .await
        .unwrap();
    let review = store
        .get_or_create_node(NodeKind::Process, "Forecast review")
        .await
        .unwrap();

    let mut edge_ids: Vec<EdgeId> = Vec::new();
    for (source, edge_type) in [
        (&crm, EdgeType::SystemCapabilities),
        (&analysts, EdgeType::TeamExecution),
        (&review, EdgeType::ProcessMaturity),
        (&upstream, EdgeType::DependencyQuality),
    ] {
        edge_ids.push(
            store
                .get_or_create_edge(source, &forecast, edge_type)
                .await
                .unwrap(),
        );
    }

    // Mixed tiers and contradictory scores across all four edges
    store
        .add_evidence(&edge_ids[0], evidence(2, 3, 0, "p1"))
        .await
        .unwrap();
    store
        .add_evidence(&edge_ids[0], evidence(4, 1, 1, "p2"))
        .await
        .unwrap();
    store
        .add_evidence(&edge_ids[1], evidence(3, 4, 2, "p3"))
        .await
        .unwrap();
    store
        .add_evidence(&edge_ids[1], evidence(2, 3, 3, "p4"))
        .await
        .unwrap();
    store
        .add_evidence(&edge_ids[2], evidence(5, 2, 4, "p5"))
        .await
        .unwrap();
    store
        .add_evidence(&edge_ids[3], evidence(1, 5, 5, "p6"))
        .await
        .unwrap();

    // Write-through means no flush is required, but it must be harmless.
    store.flush().await.unwrap();

    let reloaded = GraphStore::load(session, backend).await.unwrap();

    assert_eq!(reloaded.node_count(), store.node_count());
    assert_eq!(reloaded.edge_count(), store.edge_count());

    for id in &edge_ids {
        let original = store.edge(id).unwrap();
        let restored = reloaded.edge(id).unwrap();

        // Identical evidence lists, in submission order
        assert_eq!(restored.evidence(), original.evidence());

        // Identical recomputed aggregates
        assert_eq!(restored.current_score(), original.current_score());
        assert_eq!(
            restored.current_confidence(),
            original.current_confidence()
        );
    }

    // Idempotent lookups keep working against the reloaded graph
    let incoming = reloaded.incoming_edges(&forecast).unwrap();
    assert_eq!(incoming.len(), 4);
    assert_eq!(reloaded.nodes_by_kind(NodeKind::Output).len(), 2);
}

#[tokio::test]
async fn reload_recomputes_rather_than_trusting_cached_values() {
    let backend = Arc::new(MemoryBackend::new());
    let session = SessionId::new("session-rt2");
    let mut store = GraphStore::new(session.clone(), backend.clone());

    let out = store
        .get_or_create_node(NodeKind::Output, "Forecast")
        .await
        .unwrap();
    let crm = store
        .get_or_create_node(NodeKind::Tool, "CRM")
        .await
        .unwrap();
    let edge_id = store
        .get_or_create_edge(&crm, &out, EdgeType::SystemCapabilities)
        .await
        .unwrap();
    // tier-4/score-3 + tier-3/score-2: WAR = 2.75, confidence = 36/46
    store
        .add_evidence(&edge_id, evidence(3, 4, 0, "p1"))
        .await
        .unwrap();
    store
        .add_evidence(&edge_id, evidence(2, 3, 1, "p2"))
        .await
        .unwrap();

    let reloaded = GraphStore::load(session, backend).await.unwrap();
    let edge = reloaded.edge(&edge_id).unwrap();

    let confidence = 36.0 / 46.0;
    let expected = confidence * 2.75 + (1.0 - confidence) * aqe_scoring::PRIOR_MEAN;
    assert!((edge.current_confidence() - confidence).abs() < 1e-12);
    assert!((edge.current_score() - expected).abs() < 1e-12);
}
