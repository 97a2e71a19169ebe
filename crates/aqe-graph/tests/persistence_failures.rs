//! Write-through failure behavior across a real backend boundary
//!
//! Every mutation persists before it commits to memory, so a backend outage
//! must leave the in-memory graph exactly matching what the backend holds.

use aqe_graph::{GraphError, GraphStore};
use aqe_model::{EdgeType, NodeKind, SessionId};
use aqe_test_utils::{evidence, init_test_logging, FlakyBackend};
use std::sync::Arc;

#[tokio::test]
async fn evidence_rolls_back_when_the_write_is_rejected() {
    init_test_logging();
    // two node writes, one edge write, one evidence write
    let backend = Arc::new(FlakyBackend::failing_after(4));
    let session = SessionId::generate();
    let mut store = GraphStore::new(session.clone(), backend.clone());

    let output = store
        .get_or_create_node(NodeKind::Output, "billing export")
        .await
        .unwrap();
    let team = store
        .get_or_create_node(NodeKind::People, "billing team")
        .await
        .unwrap();
    let edge = store
        .get_or_create_edge(&team, &output, EdgeType::TeamExecution)
        .await
        .unwrap();
    store.add_evidence(&edge, evidence(4, 2)).await.unwrap();

    let before = store.edge(&edge).unwrap().clone();
    let err = store
        .add_evidence(&edge, evidence(1, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Persistence(_)));
    assert!(err.is_retryable());

    let after = store.edge(&edge).unwrap();
    assert_eq!(after.evidence_count(), before.evidence_count());
    assert_eq!(after.current_score(), before.current_score());

    // a fresh load from the same backend agrees with the rolled-back state
    let reloaded = GraphStore::load(session, backend).await.unwrap();
    let durable = reloaded.edge(&edge).unwrap();
    assert_eq!(durable.evidence_count(), before.evidence_count());
    assert_eq!(durable.current_score(), before.current_score());
}

#[tokio::test]
async fn failed_node_write_creates_no_node() {
    let backend = Arc::new(FlakyBackend::failing_after(0));
    let mut store = GraphStore::new(SessionId::generate(), backend);

    let err = store
        .get_or_create_node(NodeKind::Output, "billing export")
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(store.node_count(), 0);
}

#[tokio::test]
async fn interrupted_merge_never_double_counts_evidence() {
    // Setup spends 7 writes: three nodes, two edges, two evidence appends.
    // The 8th write lets the merge retire the absorbed edge, then the
    // survivor-union write fails.
    let backend = Arc::new(FlakyBackend::failing_after(8));
    let session = SessionId::generate();
    let mut store = GraphStore::new(session.clone(), backend.clone());

    let out = store
        .get_or_create_node(NodeKind::Output, "billing export")
        .await
        .unwrap();
    let crm = store
        .get_or_create_node(NodeKind::Tool, "CRM")
        .await
        .unwrap();
    let sales = store
        .get_or_create_node(NodeKind::Tool, "Sales tool")
        .await
        .unwrap();
    let crm_edge = store
        .get_or_create_edge(&crm, &out, EdgeType::SystemCapabilities)
        .await
        .unwrap();
    let sales_edge = store
        .get_or_create_edge(&sales, &out, EdgeType::SystemCapabilities)
        .await
        .unwrap();
    store.add_evidence(&crm_edge, evidence(4, 2)).await.unwrap();
    store.add_evidence(&sales_edge, evidence(2, 3)).await.unwrap();

    let err = store.merge_nodes(&crm, &sales).await.unwrap_err();
    assert!(err.is_retryable());

    // Memory is unchanged, so a retry recomputes the full plan
    assert!(!store.node(&sales).unwrap().is_merged());
    assert_eq!(store.incoming_edges(&out).unwrap().len(), 2);

    // Durable state lost the absorbed edge from scoring but never counts
    // its evidence twice
    let reloaded = GraphStore::load(session, backend).await.unwrap();
    assert!(reloaded.edge(&sales_edge).unwrap().is_retired());
    let active = reloaded.incoming_edges(&out).unwrap();
    let total: usize = active.iter().map(|e| e.evidence_count()).sum();
    assert_eq!(active.len(), 1);
    assert!(total <= 2);
    assert_eq!(reloaded.edge(&crm_edge).unwrap().evidence_count(), 1);
}

#[tokio::test]
async fn failed_edge_write_creates_no_edge() {
    let backend = Arc::new(FlakyBackend::failing_after(2));
    let mut store = GraphStore::new(SessionId::generate(), backend);

    let output = store
        .get_or_create_node(NodeKind::Output, "billing export")
        .await
        .unwrap();
    let tool = store
        .get_or_create_node(NodeKind::Tool, "invoice generator")
        .await
        .unwrap();

    let err = store
        .get_or_create_edge(&tool, &output, EdgeType::SystemCapabilities)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Persistence(_)));
    assert_eq!(store.edge_count(), 0);
    assert_eq!(store.node_count(), 2);
}
