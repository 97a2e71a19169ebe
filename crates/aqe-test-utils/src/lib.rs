//! Testing utilities for the AQE workspace
//!
//! Shared fixtures: evidence and submission builders, pre-seeded graph
//! stores, and a fault-injecting backend for persistence-failure tests.

#![allow(missing_docs)]

use aqe_graph::GraphStore;
use aqe_model::{
    Edge, EdgeId, EdgeType, Evidence, EvidenceSubmission, Node, NodeId, NodeKind, SessionId,
    SubmissionTarget,
};
use aqe_store::{GraphBackend, MemoryBackend, StoreError};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Route engine tracing to the test harness, honoring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fixed base instant so test timestamps are reproducible
pub fn test_time(offset_secs: i64) -> chrono::DateTime<chrono::Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap() + chrono::Duration::seconds(offset_secs)
}

pub fn evidence(score: u8, tier: u8) -> Evidence {
    evidence_at(score, tier, 0)
}

pub fn evidence_at(score: u8, tier: u8, offset_secs: i64) -> Evidence {
    Evidence::new(
        score,
        tier,
        format!("observed score {score} at tier {tier}"),
        test_time(offset_secs),
        format!("prov-{score}-{tier}-{offset_secs}"),
    )
    .unwrap()
}

pub fn submission(
    source_kind: NodeKind,
    source_name: &str,
    output_id: &NodeId,
    edge_type: EdgeType,
    score: u8,
    tier: u8,
) -> EvidenceSubmission {
    EvidenceSubmission {
        target: SubmissionTarget {
            source_kind,
            source_name: source_name.to_string(),
            output_id: output_id.clone(),
            edge_type,
        },
        score,
        tier,
        statement: format!("{source_name} rated {score} for {output_id}"),
        timestamp: test_time(0),
        provenance_id: format!("prov-{source_name}-{score}-{tier}"),
    }
}

/// Empty store over a fresh in-memory backend
pub fn empty_store() -> GraphStore {
    GraphStore::new(SessionId::generate(), Arc::new(MemoryBackend::new()))
}

/// Store seeded with one output and one evidenced edge from a People source
///
/// Returns the store plus the output, source, and edge ids.
pub async fn seeded_store() -> (GraphStore, NodeId, NodeId, EdgeId) {
    let mut store = empty_store();
    let output = store
        .get_or_create_node(NodeKind::Output, "quarterly report")
        .await
        .unwrap();
    let source = store
        .get_or_create_node(NodeKind::People, "analytics team")
        .await
        .unwrap();
    let edge = store
        .get_or_create_edge(&source, &output, EdgeType::TeamExecution)
        .await
        .unwrap();
    store.add_evidence(&edge, evidence(4, 3)).await.unwrap();
    (store, output, source, edge)
}

/// Backend that starts failing writes after a budget is spent
///
/// Reads always succeed. Successful writes pass through to an inner
/// [`MemoryBackend`], so state observed after a failure reflects exactly the
/// writes that landed before it.
#[derive(Debug)]
pub struct FlakyBackend {
    inner: MemoryBackend,
    writes_left: AtomicUsize,
}

impl FlakyBackend {
    /// Allow `budget` writes, then reject every later one
    pub fn failing_after(budget: usize) -> Self {
        Self {
            inner: MemoryBackend::new(),
            writes_left: AtomicUsize::new(budget),
        }
    }

    fn spend_write(&self) -> Result<(), StoreError> {
        let left = self.writes_left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            n.checked_sub(1)
        });
        match left {
            Ok(_) => Ok(()),
            Err(_) => Err(StoreError::WriteFailed("write budget exhausted".into())),
        }
    }
}

#[async_trait]
impl GraphBackend for FlakyBackend {
    async fn get_node(
        &self,
        session: &SessionId,
        id: &NodeId,
    ) -> Result<Option<Node>, StoreError> {
        self.inner.get_node(session, id).await
    }

    async fn put_node(&self, session: &SessionId, node: &Node) -> Result<(), StoreError> {
        self.spend_write()?;
        self.inner.put_node(session, node).await
    }

    async fn get_edge(
        &self,
        session: &SessionId,
        id: &EdgeId,
    ) -> Result<Option<Edge>, StoreError> {
        self.inner.get_edge(session, id).await
    }

    async fn put_edge(&self, session: &SessionId, edge: &Edge) -> Result<(), StoreError> {
        self.spend_write()?;
        self.inner.put_edge(session, edge).await
    }

    async fn list_nodes(&self, session: &SessionId) -> Result<Vec<Node>, StoreError> {
        self.inner.list_nodes(session).await
    }

    async fn list_edges(&self, session: &SessionId) -> Result<Vec<Edge>, StoreError> {
        self.inner.list_edges(session).await
    }

    async fn list_edges_by_target(
        &self,
        session: &SessionId,
        output: &NodeId,
    ) -> Result<Vec<Edge>, StoreError> {
        self.inner.list_edges_by_target(session, output).await
    }
}
