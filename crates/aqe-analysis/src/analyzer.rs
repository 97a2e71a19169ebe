//! Query surface over a session's graph
//!
//! Borrows the session's [`GraphStore`]; all computations happen on demand
//! from the store's current state, nothing is cached here.

use crate::quality::{gap, identify_bottlenecks, quality, Severity};
use crate::report::{
    BottleneckEntry, BottleneckReport, EdgeStatus, OutputRanking, OutputStatus,
};
use aqe_graph::{GraphError, GraphStore};
use aqe_model::{Edge, NodeId};

/// On-demand quality and bottleneck queries for one graph
#[derive(Debug)]
pub struct Analyzer<'a> {
    store: &'a GraphStore,
}

impl<'a> Analyzer<'a> {
    /// Analyze the given session graph
    #[inline]
    #[must_use]
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Quality of one output, `None` if it has no incoming edges
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] for an unknown output id.
    pub fn quality(&self, output: &NodeId) -> Result<Option<f64>, GraphError> {
        let incoming = self.store.incoming_edges(output)?;
        Ok(quality(&incoming))
    }

    /// All incoming edges at the output's minimum score
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] for an unknown output id.
    pub fn bottlenecks(&self, output: &NodeId) -> Result<Vec<&'a Edge>, GraphError> {
        let incoming = self.store.incoming_edges(output)?;
        Ok(identify_bottlenecks(&incoming))
    }

    /// Full per-edge status of one output
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] for an unknown output id.
    pub fn output_status(&self, output: &NodeId) -> Result<OutputStatus, GraphError> {
        let node = self.store.resolve_node(output)?;
        let incoming = self.store.incoming_edges(output)?;

        let per_edge = incoming
            .iter()
            .map(|e| EdgeStatus {
                edge_type: e.edge_type(),
                source: e.source().clone(),
                score: e.current_score(),
                confidence: e.current_confidence(),
                evidence_count: e.evidence_count(),
            })
            .collect();

        Ok(OutputStatus {
            output_id: node.id.clone(),
            name: node.name.clone(),
            quality: quality(&incoming),
            per_edge,
        })
    }

    /// What is limiting an output, relative to a required quality
    ///
    /// For an unassessed output the gap and severity are `None` and the
    /// bottleneck list is empty; it is the caller's call whether "no data"
    /// warrants action.
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] for an unknown output id.
    pub fn bottleneck_report(
        &self,
        output: &NodeId,
        required_quality: f64,
    ) -> Result<BottleneckReport, GraphError> {
        let node = self.store.resolve_node(output)?;
        let incoming = self.store.incoming_edges(output)?;

        let current = quality(&incoming);
        let gap_value = current.map(|c| gap(required_quality, c));

        let bottlenecks = identify_bottlenecks(&incoming)
            .into_iter()
            .map(|e| BottleneckEntry {
                edge_type: e.edge_type(),
                root_cause_category: e.edge_type().root_cause_category().to_string(),
                source: e.source().clone(),
                score: e.current_score(),
            })
            .collect();

        Ok(BottleneckReport {
            output_id: node.id.clone(),
            required_quality,
            quality: current,
            gap: gap_value,
            severity: gap_value.map(Severity::from_gap),
            bottlenecks,
        })
    }

    /// Rank outputs by quality, worst first
    ///
    /// Unassessed outputs sort after all assessed ones: a missing score is
    /// not a bad score.
    ///
    /// # Errors
    /// [`GraphError::NodeNotFound`] if any id is unknown.
    pub fn compare_outputs(&self, outputs: &[NodeId]) -> Result<Vec<OutputRanking>, GraphError> {
        let mut rankings = Vec::with_capacity(outputs.len());
        for id in outputs {
            let node = self.store.resolve_node(id)?;
            let incoming = self.store.incoming_edges(id)?;
            rankings.push(OutputRanking {
                output_id: node.id.clone(),
                name: node.name.clone(),
                quality: quality(&incoming),
            });
        }

        rankings.sort_by(|a, b| match (a.quality, b.quality) {
            (Some(qa), Some(qb)) => qa.total_cmp(&qb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(rankings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::SCORE_EPSILON;
    use aqe_model::{EdgeType, NodeKind};
    use aqe_test_utils::{empty_store, evidence, seeded_store};
    use pretty_assertions::assert_eq;

    // shrunk single-item aggregate toward the prior mean of 2.5
    fn single_item_score(score: f64, weight: f64) -> f64 {
        let conf = weight / (weight + 10.0);
        conf * score + (1.0 - conf) * 2.5
    }

    #[tokio::test]
    async fn output_status_reports_quality_and_per_edge_detail() {
        let (mut store, output, _source, _edge) = seeded_store().await;
        let tool = store
            .get_or_create_node(NodeKind::Tool, "render pipeline")
            .await
            .unwrap();
        let tool_edge = store
            .get_or_create_edge(&tool, &output, EdgeType::SystemCapabilities)
            .await
            .unwrap();
        store.add_evidence(&tool_edge, evidence(2, 5)).await.unwrap();

        let status = Analyzer::new(&store).output_status(&output).unwrap();

        assert_eq!(status.name, "quarterly report");
        assert_eq!(status.per_edge.len(), 2);

        // the tier-5 score of 2 drags below the tier-3 score of 4
        let expected_min = single_item_score(2.0, 81.0);
        let q = status.quality.unwrap();
        assert!((q - expected_min).abs() < 1e-9);

        let weak = status
            .per_edge
            .iter()
            .find(|e| e.edge_type == EdgeType::SystemCapabilities)
            .unwrap();
        assert_eq!(weak.evidence_count, 1);
        assert!(weak.confidence > 0.8);
    }

    #[tokio::test]
    async fn bottleneck_report_names_the_weakest_edge_and_its_category() {
        let (mut store, output, _source, _edge) = seeded_store().await;
        let process = store
            .get_or_create_node(NodeKind::Process, "review process")
            .await
            .unwrap();
        let process_edge = store
            .get_or_create_edge(&process, &output, EdgeType::ProcessMaturity)
            .await
            .unwrap();
        store
            .add_evidence(&process_edge, evidence(1, 4))
            .await
            .unwrap();

        let report = Analyzer::new(&store)
            .bottleneck_report(&output, 4.0)
            .unwrap();

        assert_eq!(report.required_quality, 4.0);
        assert_eq!(report.bottlenecks.len(), 1);
        assert_eq!(report.bottlenecks[0].edge_type, EdgeType::ProcessMaturity);
        assert_eq!(report.bottlenecks[0].root_cause_category, "Process Issue");

        let q = report.quality.unwrap();
        let g = report.gap.unwrap();
        assert!((g - (4.0 - q)).abs() < 1e-9);
        // quality ~1.27, gap ~2.73
        assert_eq!(report.severity, Some(Severity::Significant));
    }

    #[tokio::test]
    async fn unassessed_output_yields_empty_report() {
        let mut store = empty_store();
        let output = store
            .get_or_create_node(NodeKind::Output, "draft proposal")
            .await
            .unwrap();

        let analyzer = Analyzer::new(&store);
        assert_eq!(analyzer.quality(&output).unwrap(), None);

        let report = analyzer.bottleneck_report(&output, 4.0).unwrap();
        assert_eq!(report.quality, None);
        assert_eq!(report.gap, None);
        assert_eq!(report.severity, None);
        assert!(report.bottlenecks.is_empty());
    }

    #[tokio::test]
    async fn near_tied_edges_are_all_reported_as_bottlenecks() {
        let mut store = empty_store();
        let output = store
            .get_or_create_node(NodeKind::Output, "release build")
            .await
            .unwrap();
        for (kind, name, edge_type) in [
            (NodeKind::People, "build team", EdgeType::TeamExecution),
            (NodeKind::Tool, "ci pipeline", EdgeType::SystemCapabilities),
        ] {
            let source = store.get_or_create_node(kind, name).await.unwrap();
            let edge = store
                .get_or_create_edge(&source, &output, edge_type)
                .await
                .unwrap();
            // identical evidence lands identical aggregates, well within tolerance
            store.add_evidence(&edge, evidence(2, 3)).await.unwrap();
        }

        let bottlenecks = Analyzer::new(&store).bottlenecks(&output).unwrap();
        assert_eq!(bottlenecks.len(), 2);
        let spread =
            (bottlenecks[0].current_score() - bottlenecks[1].current_score()).abs();
        assert!(spread <= SCORE_EPSILON);
    }

    #[tokio::test]
    async fn compare_outputs_sorts_worst_first_with_unassessed_last() {
        let mut store = empty_store();
        let strong = store
            .get_or_create_node(NodeKind::Output, "mature service")
            .await
            .unwrap();
        let weak = store
            .get_or_create_node(NodeKind::Output, "new service")
            .await
            .unwrap();
        let unassessed = store
            .get_or_create_node(NodeKind::Output, "planned service")
            .await
            .unwrap();

        let team = store
            .get_or_create_node(NodeKind::People, "platform team")
            .await
            .unwrap();
        for (output, score) in [(&strong, 5), (&weak, 1)] {
            let edge = store
                .get_or_create_edge(&team, output, EdgeType::TeamExecution)
                .await
                .unwrap();
            store.add_evidence(&edge, evidence(score, 4)).await.unwrap();
        }

        let rankings = Analyzer::new(&store)
            .compare_outputs(&[strong.clone(), unassessed.clone(), weak.clone()])
            .unwrap();

        assert_eq!(rankings.len(), 3);
        assert_eq!(rankings[0].output_id, weak);
        assert_eq!(rankings[1].output_id, strong);
        assert_eq!(rankings[2].output_id, unassessed);
        assert_eq!(rankings[2].quality, None);
        assert!(rankings[0].quality.unwrap() < rankings[1].quality.unwrap());
    }

    #[tokio::test]
    async fn status_follows_merge_tombstones_to_the_surviving_output() {
        let (mut store, output, _source, _edge) = seeded_store().await;
        let duplicate = store
            .get_or_create_node(NodeKind::Output, "Q3 report")
            .await
            .unwrap();
        store.merge_nodes(&output, &duplicate).await.unwrap();

        let status = Analyzer::new(&store).output_status(&duplicate).unwrap();
        assert_eq!(status.output_id, output);
        assert_eq!(status.per_edge.len(), 1);
    }
}
