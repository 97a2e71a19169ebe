//! Session-scoped graph store
//!
//! Sole owner of node/edge/evidence state for one assessment session.
//! Mutations write through to the durable backend before committing to
//! memory, so a crash after a successful call never loses evidence, and a
//! failed write never leaves partial in-memory state.

use crate::error::{ConflictError, GraphError};
use aqe_model::{
    normalize_name, Edge, EdgeId, EdgeKey, EdgeType, Evidence, EvidenceSubmission, Node, NodeId,
    NodeKind, SessionId,
};
use aqe_scoring::{aggregate, EdgeAggregate};
use aqe_store::GraphBackend;
use indexmap::IndexMap;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Session-scoped owner of one assessment graph
///
/// One store instance is owned by exactly one active session; evidence
/// submissions within a session are processed strictly sequentially, so all
/// mutating operations take `&mut self` and no interior locking exists.
/// Multiple sessions coexist in one process by holding separate stores.
#[derive(Debug)]
pub struct GraphStore {
    pub(crate) session: SessionId,
    pub(crate) backend: Arc<dyn GraphBackend>,
    pub(crate) nodes: IndexMap<NodeId, Node>,
    /// (kind, normalized name) -> node, for idempotent creation. Merged
    /// names stay indexed, pointing at the surviving node.
    pub(crate) names: HashMap<(NodeKind, String), NodeId>,
    pub(crate) edges: IndexMap<EdgeId, Edge>,
    /// Natural key -> active (non-retired) edge
    pub(crate) keys: HashMap<EdgeKey, EdgeId>,
}

impl GraphStore {
    /// Create an empty store for a new session
    #[must_use]
    pub fn new(session: SessionId, backend: Arc<dyn GraphBackend>) -> Self {
        Self {
            session,
            backend,
            nodes: IndexMap::new(),
            names: HashMap::new(),
            edges: IndexMap::new(),
            keys: HashMap::new(),
        }
    }

    /// Load a session's graph from the durable backend
    ///
    /// Cached edge scores are advisory: every edge's aggregate is recomputed
    /// from its evidence log, which is deterministic, so a reloaded graph
    /// always scores identically to the one that was persisted.
    ///
    /// # Errors
    /// [`GraphError::Persistence`] if the backend cannot be read.
    pub async fn load(
        session: SessionId,
        backend: Arc<dyn GraphBackend>,
    ) -> Result<Self, GraphError> {
        let mut store = Self::new(session, backend);

        let nodes = store.backend.list_nodes(&store.session).await?;
        for node in nodes {
            store.index_node(node);
        }

        let edges = store.backend.list_edges(&store.session).await?;
        for mut edge in edges {
            let agg = aggregate(edge.evidence());
            edge.set_aggregate(agg.score, agg.confidence);
            store.index_edge(edge);
        }

        tracing::info!(
            session = %store.session,
            nodes = store.nodes.len(),
            edges = store.edges.len(),
            "session graph loaded"
        );
        Ok(store)
    }

    /// Session owning this graph
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Total nodes, including merge tombstones
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total edges, including retired ones
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ---- nodes ----------------------------------------------------------

    /// Get or create a node, idempotent by (kind, normalized name)
    ///
    /// Names absorbed by a merge resolve to the surviving node; they never
    /// mint a fresh duplicate.
    ///
    /// # Errors
    /// Validation error for a blank name; persistence error if the created
    /// node cannot be written (nothing is committed in that case).
    pub async fn get_or_create_node(
        &mut self,
        kind: NodeKind,
        name: &str,
    ) -> Result<NodeId, GraphError> {
        let key = (kind, normalize_name(name));
        if let Some(id) = self.names.get(&key) {
            return Ok(self.resolve_node(id)?.id.clone());
        }

        let node = Node::new(kind, name)?;
        self.backend.put_node(&self.session, &node).await?;

        let id = node.id.clone();
        tracing::debug!(session = %self.session, node = %id, %kind, name, "node created");
        self.index_node(node);
        Ok(id)
    }

    /// Look up a node by id
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] for an unknown id.
    pub fn node(&self, id: &NodeId) -> Result<&Node, GraphError> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))
    }

    /// Resolve an id to its active node, following merge tombstones
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] for an unknown id.
    pub fn resolve_node(&self, id: &NodeId) -> Result<&Node, GraphError> {
        let mut current = self.node(id)?;
        // Merge chains are short; the bound only guards corrupted data.
        for _ in 0..self.nodes.len() {
            match &current.merged_into {
                Some(next) => current = self.node(next)?,
                None => return Ok(current),
            }
        }
        Ok(current)
    }

    /// Active nodes of one kind, in creation order
    #[must_use]
    pub fn nodes_by_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| n.kind == kind && !n.is_merged())
            .collect()
    }

    /// Look up an active node by name, across kinds
    ///
    /// # Errors
    /// [`GraphError::NameNotFound`] when nothing matches;
    /// [`ConflictError::AmbiguousName`] when several active nodes share the
    /// normalized name; disambiguation is the caller's decision, never
    /// automatic.
    pub fn node_by_name(&self, name: &str) -> Result<&Node, GraphError> {
        let wanted = normalize_name(name);
        let matches: Vec<&Node> = self
            .nodes
            .values()
            .filter(|n| !n.is_merged() && n.normalized_name() == wanted)
            .collect();

        match matches.as_slice() {
            [] => Err(GraphError::NameNotFound(name.to_string())),
            [only] => Ok(only),
            many => Err(ConflictError::AmbiguousName {
                name: name.to_string(),
                candidates: many.iter().map(|n| n.id.clone()).collect(),
            }
            .into()),
        }
    }

    /// Set a node's free-text description hint
    ///
    /// # Errors
    /// Not-found for an unknown id; persistence error leaves the node
    /// unchanged in memory.
    pub async fn describe_node(
        &mut self,
        id: &NodeId,
        description: impl Into<String>,
    ) -> Result<(), GraphError> {
        let mut updated = self.node(id)?.clone();
        updated.description = Some(description.into());

        self.backend.put_node(&self.session, &updated).await?;
        self.nodes.insert(updated.id.clone(), updated);
        Ok(())
    }

    // ---- edges ----------------------------------------------------------

    /// Get or create an edge, idempotent by (source, target, edge type)
    ///
    /// The target must be an output and the source's kind must match the
    /// edge type. Dependency edges are checked for cycles at insertion and
    /// rejected, never silently capped.
    ///
    /// # Errors
    /// Not-found for unknown nodes, validation for kind mismatches,
    /// [`GraphError::CyclicDependency`] when the edge would close a cycle,
    /// persistence error if the created edge cannot be written.
    pub async fn get_or_create_edge(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        edge_type: EdgeType,
    ) -> Result<EdgeId, GraphError> {
        let source = self.resolve_node(source)?.id.clone();
        let target_node = self.resolve_node(target)?;
        let target = target_node.id.clone();

        if target_node.kind != NodeKind::Output {
            return Err(GraphError::InvalidEdgeTarget {
                id: target,
                kind: target_node.kind,
            });
        }
        let source_kind = self.node(&source)?.kind;
        let expected = edge_type.expected_source_kind();
        if source_kind != expected {
            return Err(GraphError::SourceKindMismatch {
                id: source,
                found: source_kind,
                edge_type,
                expected,
            });
        }

        let key = EdgeKey::new(source.clone(), target.clone(), edge_type);
        if let Some(id) = self.keys.get(&key) {
            return Ok(id.clone());
        }

        if edge_type == EdgeType::DependencyQuality {
            if source == target {
                return Err(GraphError::CyclicDependency {
                    path: vec![source.clone(), source],
                });
            }
            if let Some(path) = self.dependency_cycle(&source, &target) {
                return Err(GraphError::CyclicDependency { path });
            }
        }

        let mut edge = Edge::new(source, target, edge_type);
        let prior = EdgeAggregate::prior();
        edge.set_aggregate(prior.score, prior.confidence);

        self.backend.put_edge(&self.session, &edge).await?;

        let id = edge.id().clone();
        tracing::debug!(session = %self.session, edge = %id, key = %edge.key(), "edge created");
        self.index_edge(edge);
        Ok(id)
    }

    /// Look up an edge by id (including retired edges)
    ///
    /// # Errors
    /// [`GraphError::EdgeNotFound`] for an unknown id.
    pub fn edge(&self, id: &EdgeId) -> Result<&Edge, GraphError> {
        self.edges
            .get(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))
    }

    /// Append evidence to an edge, recompute its aggregate, and persist
    ///
    /// Write-through: the edge with its new evidence list and cached values
    /// is durably written before this call returns. On a persistence
    /// failure the in-memory edge is left unchanged; no partial success.
    ///
    /// # Errors
    /// Not-found/retired for a bad edge id; persistence error with nothing
    /// committed.
    pub async fn add_evidence(
        &mut self,
        edge_id: &EdgeId,
        evidence: Evidence,
    ) -> Result<EdgeAggregate, GraphError> {
        let edge = self
            .edges
            .get(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.clone()))?;
        if edge.is_retired() {
            return Err(GraphError::EdgeRetired(edge_id.clone()));
        }

        let mut updated = edge.clone();
        updated.append_evidence(evidence);
        let agg = aggregate(updated.evidence());
        updated.set_aggregate(agg.score, agg.confidence);

        if let Err(err) = self.backend.put_edge(&self.session, &updated).await {
            tracing::warn!(
                session = %self.session,
                edge = %edge_id,
                error = %err,
                "evidence write failed; edge unchanged"
            );
            return Err(err.into());
        }

        tracing::info!(
            session = %self.session,
            edge = %edge_id,
            score = agg.score,
            confidence = agg.confidence,
            evidence_count = agg.evidence_count,
            "evidence added"
        );
        self.edges.insert(edge_id.clone(), updated);
        Ok(agg)
    }

    /// Ingest one submission from the external inference collaborator
    ///
    /// Validates the payload, creates the source node and edge on first
    /// reference, and appends the evidence. The output must already exist;
    /// output discovery happens upstream.
    ///
    /// # Errors
    /// Any of the underlying validation, not-found, cycle, or persistence
    /// errors. Validation runs first, so a malformed payload creates no
    /// nodes or edges.
    pub async fn submit(
        &mut self,
        submission: &EvidenceSubmission,
    ) -> Result<(EdgeId, EdgeAggregate), GraphError> {
        let evidence = submission.to_evidence()?;

        let output = self.resolve_node(&submission.target.output_id)?.id.clone();
        let source = self
            .get_or_create_node(submission.target.source_kind, &submission.target.source_name)
            .await?;
        let edge_id = self
            .get_or_create_edge(&source, &output, submission.target.edge_type)
            .await?;
        let agg = self.add_evidence(&edge_id, evidence).await?;
        Ok((edge_id, agg))
    }

    /// Active edges pointing at an output, in creation order
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] for an unknown output id.
    pub fn incoming_edges(&self, output: &NodeId) -> Result<Vec<&Edge>, GraphError> {
        let output = &self.resolve_node(output)?.id;
        Ok(self
            .edges
            .values()
            .filter(|e| !e.is_retired() && e.target() == output)
            .collect())
    }

    /// Active edges leaving a node, in creation order
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] for an unknown node id.
    pub fn outgoing_edges(&self, node: &NodeId) -> Result<Vec<&Edge>, GraphError> {
        let node = &self.resolve_node(node)?.id;
        Ok(self
            .edges
            .values()
            .filter(|e| !e.is_retired() && e.source() == node)
            .collect())
    }

    /// Rewrite the whole graph to the backend
    ///
    /// Every mutation already writes through, so this is a belt-and-braces
    /// operation for session teardown.
    ///
    /// # Errors
    /// [`GraphError::Persistence`] on the first failed write.
    pub async fn flush(&self) -> Result<(), GraphError> {
        for node in self.nodes.values() {
            self.backend.put_node(&self.session, node).await?;
        }
        for edge in self.edges.values() {
            self.backend.put_edge(&self.session, edge).await?;
        }
        tracing::debug!(session = %self.session, "session graph flushed");
        Ok(())
    }

    // ---- internals ------------------------------------------------------

    pub(crate) fn index_node(&mut self, node: Node) {
        let target = node.merged_into.clone().unwrap_or_else(|| node.id.clone());
        self.names
            .insert((node.kind, node.normalized_name()), target);
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn index_edge(&mut self, edge: Edge) {
        if !edge.is_retired() {
            self.keys.insert(edge.key(), edge.id().clone());
        }
        self.edges.insert(edge.id().clone(), edge);
    }

    pub(crate) fn unindex_edge_key(&mut self, edge: &Edge) {
        self.keys.remove(&edge.key());
    }

    /// Would adding `source -> target` close a dependency cycle?
    ///
    /// Checks the subgraph of active dependency edges plus the candidate.
    /// Returns the cycle path (starting and ending at the source) when one
    /// exists.
    pub(crate) fn dependency_cycle(
        &self,
        source: &NodeId,
        target: &NodeId,
    ) -> Option<Vec<NodeId>> {
        let deps: Vec<(&NodeId, &NodeId)> = self
            .edges
            .values()
            .filter(|e| !e.is_retired() && e.edge_type() == EdgeType::DependencyQuality)
            .map(|e| (e.source(), e.target()))
            .collect();

        // petgraph's graph map wants Copy node keys, so intern the string
        // ids as small integers first.
        let mut ids: HashMap<&NodeId, u32> = HashMap::new();
        fn intern<'a>(ids: &mut HashMap<&'a NodeId, u32>, id: &'a NodeId) -> u32 {
            let next = ids.len() as u32;
            *ids.entry(id).or_insert(next)
        }

        let mut graph: DiGraphMap<u32, ()> = DiGraphMap::new();
        for &(from, to) in &deps {
            let f = intern(&mut ids, from);
            let t = intern(&mut ids, to);
            graph.add_edge(f, t, ());
        }
        let s = intern(&mut ids, source);
        let t = intern(&mut ids, target);
        graph.add_edge(s, t, ());

        if !is_cyclic_directed(&graph) {
            return None;
        }

        // A cycle through the new edge means source is reachable from
        // target over existing dependency edges; walk that path for the
        // diagnostic.
        let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        for &(from, to) in &deps {
            adjacency.entry(from).or_default().push(to);
        }

        let mut stack = vec![target];
        let mut came_from: HashMap<&NodeId, &NodeId> = HashMap::new();
        let mut seen: std::collections::HashSet<&NodeId> = std::collections::HashSet::new();
        seen.insert(target);
        while let Some(current) = stack.pop() {
            if current == source {
                // Walk back to the target, then orient the cycle
                // source -> target -> ... -> source.
                let mut chain = vec![source.clone()];
                let mut step = current;
                while step != target {
                    step = came_from[step];
                    chain.push(step.clone());
                }
                chain.push(source.clone());
                chain.reverse();
                return Some(chain);
            }
            for &next in adjacency.get(current).into_iter().flatten() {
                if seen.insert(next) {
                    came_from.insert(next, current);
                    stack.push(next);
                }
            }
        }

        // Cycle detected but not through the candidate: pre-existing state
        // violation; report the trivial path.
        Some(vec![source.clone(), target.clone(), source.clone()])
    }
}
