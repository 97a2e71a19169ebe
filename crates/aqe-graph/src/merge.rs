//! Duplicate flagging and explicit node merging
//!
//! Ambiguous entity identity ("CRM" vs "Sales tool" naming the same real
//! system) is first-class state: a possible-duplicate relation distinct from
//! scoring edges, resolved later by an explicit merge that unions evidence
//! lists. Nothing is ever silently overwritten, and nothing is deleted:
//! merged nodes are tombstoned and absorbed edges retired, so the audit
//! trail survives.

use crate::error::{ConflictError, GraphError};
use crate::store::GraphStore;
use aqe_model::{Edge, EdgeKey, EdgeType, Evidence, NodeId};
use aqe_scoring::aggregate;
use std::collections::HashMap;

/// Planned outcome for one edge touched by a merge
#[derive(Debug)]
enum EdgePlan {
    /// Overwrite an existing edge (evidence union or retirement)
    Update(Edge),
    /// Insert a rerouted replacement edge
    Create(Edge),
}

impl EdgePlan {
    fn edge(&self) -> &Edge {
        match self {
            Self::Update(e) | Self::Create(e) => e,
        }
    }
}

impl GraphStore {
    /// Record that two nodes may name the same real-world entity
    ///
    /// The relation is symmetric and advisory; it never affects scoring.
    /// Resolution is always the caller's explicit [`GraphStore::merge_nodes`]
    /// decision.
    ///
    /// # Errors
    /// Not-found for unknown ids; [`ConflictError::SelfReference`] /
    /// [`ConflictError::KindMismatch`] for invalid pairs; persistence errors
    /// leave memory unchanged.
    pub async fn flag_possible_duplicate(
        &mut self,
        a: &NodeId,
        b: &NodeId,
    ) -> Result<(), GraphError> {
        let node_a = self.resolve_node(a)?.clone();
        let node_b = self.resolve_node(b)?.clone();

        if node_a.id == node_b.id {
            return Err(ConflictError::SelfReference(node_a.id).into());
        }
        if node_a.kind != node_b.kind {
            return Err(ConflictError::KindMismatch {
                a: node_a.id,
                a_kind: node_a.kind,
                b: node_b.id,
                b_kind: node_b.kind,
            }
            .into());
        }

        let mut updated_a = node_a;
        let mut updated_b = node_b;
        if !updated_a.possible_duplicates.contains(&updated_b.id) {
            updated_a.possible_duplicates.push(updated_b.id.clone());
        }
        if !updated_b.possible_duplicates.contains(&updated_a.id) {
            updated_b.possible_duplicates.push(updated_a.id.clone());
        }

        // Two writes; put_node is idempotent by id, so the adapter's retry
        // policy covers a failure between them.
        self.backend.put_node(&self.session, &updated_a).await?;
        self.backend.put_node(&self.session, &updated_b).await?;

        tracing::debug!(
            session = %self.session,
            a = %updated_a.id,
            b = %updated_b.id,
            "possible duplicate flagged"
        );
        self.nodes.insert(updated_a.id.clone(), updated_a);
        self.nodes.insert(updated_b.id.clone(), updated_b);
        Ok(())
    }

    /// Merge `merge` into `keep`, unioning evidence lists per edge key
    ///
    /// Every edge of the merged node is rerouted to the surviving node: when
    /// the surviving node already has an edge with the same key, the
    /// evidence lists are unioned (ordered by timestamp) and re-aggregated;
    /// otherwise a rerouted replacement edge is created. Absorbed edges are
    /// retired and the merged node tombstoned.
    ///
    /// The whole plan is computed before anything is written, so validation
    /// failures (including dependency cycles that the reroute would create)
    /// abort with no state change. A persistence failure mid-write leaves
    /// memory unchanged; durable state may already hold some retirements,
    /// which scoring treats conservatively (absorbed evidence drops out, it
    /// is never counted twice) and a retried merge rewrites idempotently.
    ///
    /// # Errors
    /// Not-found for unknown ids, conflict for invalid pairs,
    /// [`GraphError::CyclicDependency`] when rerouting would close a cycle,
    /// persistence errors leave memory unchanged.
    pub async fn merge_nodes(&mut self, keep: &NodeId, merge: &NodeId) -> Result<(), GraphError> {
        let keep_node = self.resolve_node(keep)?.clone();
        let merge_node = self.resolve_node(merge)?.clone();

        if keep_node.id == merge_node.id {
            return Err(ConflictError::SelfReference(keep_node.id).into());
        }
        if keep_node.kind != merge_node.kind {
            return Err(ConflictError::KindMismatch {
                a: keep_node.id,
                a_kind: keep_node.kind,
                b: merge_node.id,
                b_kind: merge_node.kind,
            }
            .into());
        }

        let plans = self.plan_edge_reroutes(&keep_node.id, &merge_node.id);

        // Reject merges whose rerouted dependency edges would close a cycle.
        if let Some(path) = self.cycle_after_merge(&plans) {
            return Err(GraphError::CyclicDependency { path });
        }

        let mut updated_keep = keep_node;
        updated_keep
            .possible_duplicates
            .retain(|id| id != &merge_node.id);
        let mut tombstone = merge_node;
        tombstone.merged_into = Some(updated_keep.id.clone());

        // Retire absorbed edges before writing their unioned survivors. A
        // crash between the two writes then drops the absorbed evidence from
        // scoring until the merge is retried, rather than counting it on
        // both edges after a reload.
        for plan in plans.iter().filter(|p| p.edge().is_retired()) {
            self.backend.put_edge(&self.session, plan.edge()).await?;
        }
        for plan in plans.iter().filter(|p| !p.edge().is_retired()) {
            self.backend.put_edge(&self.session, plan.edge()).await?;
        }
        self.backend.put_node(&self.session, &tombstone).await?;
        self.backend.put_node(&self.session, &updated_keep).await?;

        tracing::info!(
            session = %self.session,
            keep = %updated_keep.id,
            merged = %tombstone.id,
            rerouted_edges = plans.len(),
            "nodes merged"
        );

        // Commit: retired edges lose their key index entry, survivors and
        // replacements gain one.
        for plan in plans {
            match plan {
                EdgePlan::Update(edge) | EdgePlan::Create(edge) => {
                    if edge.is_retired() {
                        self.unindex_edge_key(&edge);
                    }
                    self.index_edge(edge);
                }
            }
        }
        // The merged name now aliases the survivor, so re-referencing it
        // cannot resurrect the duplicate this merge just resolved.
        self.names.insert(
            (tombstone.kind, tombstone.normalized_name()),
            updated_keep.id.clone(),
        );
        self.nodes.insert(tombstone.id.clone(), tombstone);
        self.nodes.insert(updated_keep.id.clone(), updated_keep);
        Ok(())
    }

    /// Compute the edge updates a merge implies, without mutating anything
    fn plan_edge_reroutes(&self, keep: &NodeId, merge: &NodeId) -> Vec<EdgePlan> {
        let mut plans: Vec<EdgePlan> = Vec::new();

        let touched: Vec<Edge> = self
            .edges
            .values()
            .filter(|e| !e.is_retired() && (e.source() == merge || e.target() == merge))
            .cloned()
            .collect();

        for old in touched {
            let rerouted_source = if old.source() == merge { keep } else { old.source() };
            let rerouted_target = if old.target() == merge { keep } else { old.target() };

            let mut absorbed = old.clone();
            absorbed.retire();

            // A merge->keep edge reroutes to a self-loop; retire it and let
            // its evidence drop out of scoring (it described a relationship
            // that no longer exists).
            if rerouted_source == rerouted_target {
                plans.push(EdgePlan::Update(absorbed));
                continue;
            }

            let key = EdgeKey::new(
                rerouted_source.clone(),
                rerouted_target.clone(),
                old.edge_type(),
            );
            match self.keys.get(&key).and_then(|id| self.edges.get(id)) {
                Some(survivor) => {
                    let mut unioned = survivor.clone();
                    let mut evidence: Vec<Evidence> = unioned
                        .evidence()
                        .iter()
                        .chain(old.evidence().iter())
                        .cloned()
                        .collect();
                    evidence.sort_by_key(|ev| ev.timestamp);
                    unioned.replace_evidence_for_merge(evidence);
                    let agg = aggregate(unioned.evidence());
                    unioned.set_aggregate(agg.score, agg.confidence);

                    plans.push(EdgePlan::Update(unioned));
                    plans.push(EdgePlan::Update(absorbed));
                }
                None => {
                    let mut replacement = Edge::new(
                        rerouted_source.clone(),
                        rerouted_target.clone(),
                        old.edge_type(),
                    );
                    replacement.replace_evidence_for_merge(old.evidence().to_vec());
                    let agg = aggregate(replacement.evidence());
                    replacement.set_aggregate(agg.score, agg.confidence);

                    plans.push(EdgePlan::Create(replacement));
                    plans.push(EdgePlan::Update(absorbed));
                }
            }
        }

        plans
    }

    /// Find a dependency cycle in the post-merge edge set, if any
    fn cycle_after_merge(&self, plans: &[EdgePlan]) -> Option<Vec<NodeId>> {
        let planned: HashMap<&aqe_model::EdgeId, &Edge> =
            plans.iter().map(|p| (p.edge().id(), p.edge())).collect();

        let mut deps: Vec<(NodeId, NodeId)> = Vec::new();
        for edge in self.edges.values() {
            let effective = planned.get(edge.id()).copied().unwrap_or(edge);
            if !effective.is_retired() && effective.edge_type() == EdgeType::DependencyQuality {
                deps.push((effective.source().clone(), effective.target().clone()));
            }
        }
        for plan in plans {
            if let EdgePlan::Create(edge) = plan {
                if !edge.is_retired() && edge.edge_type() == EdgeType::DependencyQuality {
                    deps.push((edge.source().clone(), edge.target().clone()));
                }
            }
        }

        find_cycle(&deps)
    }
}

/// Find any cycle in a small directed edge list
///
/// Graphs here are tens of nodes; a per-start DFS is plenty.
fn find_cycle(deps: &[(NodeId, NodeId)]) -> Option<Vec<NodeId>> {
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for (from, to) in deps {
        adjacency.entry(from).or_default().push(to);
    }

    for start in adjacency.keys().copied() {
        let mut stack: Vec<&NodeId> = vec![start];
        let mut came_from: HashMap<&NodeId, &NodeId> = HashMap::new();
        let mut seen: std::collections::HashSet<&NodeId> = std::collections::HashSet::new();

        while let Some(current) = stack.pop() {
            for &next in adjacency.get(current).into_iter().flatten() {
                if next == start {
                    let mut chain = vec![start.clone()];
                    let mut step = current;
                    while step != start {
                        chain.push(step.clone());
                        step = came_from[step];
                    }
                    chain.push(start.clone());
                    chain.reverse();
                    return Some(chain);
                }
                if seen.insert(next) {
                    came_from.insert(next, current);
                    stack.push(next);
                }
            }
        }
    }
    None
}
