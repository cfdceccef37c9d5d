use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::util::contains_ignore_case;

use super::graph::{Edge, MarketGraph, Node, NodeProfile};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timeframe {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Timeframe {
    fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return false;
        };
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AmountRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AmountRange {
    fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    fn contains(&self, amount: Option<f64>) -> bool {
        let Some(amount) = amount else {
            return false;
        };
        self.min.is_none_or(|min| amount >= min) && self.max.is_none_or(|max| amount <= max)
    }
}

/// Structured filters. Allow-lists are compared case-insensitively; an empty list disables it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSpec {
    pub timeframe: Option<Timeframe>,
    pub deal_size: Option<AmountRange>,
    pub event_types: Vec<String>,
    pub industries: Vec<String>,
    pub regions: Vec<String>,
    pub search_term: Option<String>,
}

impl FilterSpec {
    fn edge_filters_active(&self) -> bool {
        self.timeframe.is_some_and(|timeframe| timeframe.is_active())
            || self.deal_size.is_some_and(|range| range.is_active())
            || !self.event_types.is_empty()
    }

    fn node_filters_active(&self) -> bool {
        !self.industries.is_empty() || !self.regions.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.edge_filters_active() || self.node_filters_active()
    }

    fn edge_passes(&self, edge: &Edge) -> bool {
        if let Some(timeframe) = self.timeframe
            && timeframe.is_active()
            && !timeframe.contains(edge.properties.timestamp)
        {
            return false;
        }

        if let Some(range) = self.deal_size
            && range.is_active()
            && !range.contains(edge.properties.amount)
        {
            return false;
        }

        if !self.event_types.is_empty() {
            let Some(event_type) = edge.event_type() else {
                return false;
            };
            if !list_contains(&self.event_types, event_type) {
                return false;
            }
        }

        true
    }

    fn node_attributes_pass(&self, node: &Node) -> bool {
        if !self.industries.is_empty() {
            let industry = match &node.profile {
                NodeProfile::Industry(_) => Some(node.name.as_str()),
                profile => profile.industry(),
            };
            if !industry.is_some_and(|industry| list_contains(&self.industries, industry)) {
                return false;
            }
        }

        if !self.regions.is_empty()
            && !node
                .profile
                .region()
                .is_some_and(|region| list_contains(&self.regions, region))
        {
            return false;
        }

        true
    }
}

fn list_contains(list: &[String], value: &str) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(value))
}

/// A derived, closed snapshot: every edge has both endpoints in `nodes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subgraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Subgraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub struct GraphQueryService<'g> {
    graph: &'g MarketGraph,
    expansion_hops: usize,
}

impl<'g> GraphQueryService<'g> {
    pub const DEFAULT_EXPANSION_HOPS: usize = 1;

    pub fn new(graph: &'g MarketGraph) -> Self {
        Self {
            graph,
            expansion_hops: Self::DEFAULT_EXPANSION_HOPS,
        }
    }

    pub fn with_expansion_hops(mut self, hops: usize) -> Self {
        self.expansion_hops = hops;
        self
    }

    pub fn search(&self, query: &str, filters: &FilterSpec) -> Subgraph {
        let text = if query.trim().is_empty() {
            filters.search_term.as_deref().unwrap_or_default()
        } else {
            query
        };
        let text = text.trim().to_lowercase();
        let text_active = !text.is_empty();
        let filters_active = filters.is_active();

        if !text_active && !filters_active {
            return Subgraph {
                nodes: self.graph.nodes().to_vec(),
                edges: self.graph.edges().to_vec(),
            };
        }

        let node_count = self.graph.node_count();
        let mut included = vec![false; node_count];
        let mut frontier = VecDeque::new();
        for (index, node) in self.graph.nodes().iter().enumerate() {
            let matched = (text_active && Self::text_matches(node, &text))
                || (filters_active && self.filters_match(index, node, filters));
            if matched {
                included[index] = true;
                frontier.push_back((index, 0usize));
            }
        }

        let direct_matches = frontier.len();
        while let Some((index, depth)) = frontier.pop_front() {
            if depth >= self.expansion_hops {
                continue;
            }
            for (_edge, neighbor, _direction) in self.graph.neighbors(index) {
                if !included[neighbor] {
                    included[neighbor] = true;
                    frontier.push_back((neighbor, depth + 1));
                }
            }
        }

        let nodes = self
            .graph
            .nodes()
            .iter()
            .zip(&included)
            .filter(|(_, keep)| **keep)
            .map(|(node, _)| node.clone())
            .collect::<Vec<_>>();

        let edges = self
            .graph
            .edges()
            .iter()
            .filter(|edge| {
                let source = self.graph.index_of(&edge.source);
                let target = self.graph.index_of(&edge.target);
                matches!((source, target), (Some(source), Some(target)) if included[source] && included[target])
            })
            .cloned()
            .collect::<Vec<_>>();

        tracing::debug!(
            query = %text,
            direct_matches,
            nodes = nodes.len(),
            edges = edges.len(),
            "graph query evaluated"
        );

        Subgraph { nodes, edges }
    }

    fn text_matches(node: &Node, text_lower: &str) -> bool {
        if contains_ignore_case(&node.name, text_lower) {
            return true;
        }

        let sector = match &node.profile {
            NodeProfile::Industry(profile) => profile.sector.as_deref(),
            _ => None,
        };

        [node.profile.industry(), node.profile.region(), sector]
            .into_iter()
            .flatten()
            .any(|value| contains_ignore_case(value, text_lower))
    }

    fn filters_match(&self, index: usize, node: &Node, filters: &FilterSpec) -> bool {
        if filters.node_filters_active() && !filters.node_attributes_pass(node) {
            return false;
        }

        if filters.edge_filters_active() {
            return self
                .graph
                .incident_edges(index)
                .any(|edge| filters.edge_passes(edge));
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::market::graph::{
        CompanyProfile, EdgeKind, EdgeProperties, IndustryProfile, InvestorProfile,
    };
    use crate::util::parse_date;

    fn company(id: &str, name: &str, industry: &str, region: &str) -> Node {
        Node::new(
            id,
            name,
            NodeProfile::Company(CompanyProfile {
                industry: Some(industry.to_owned()),
                region: Some(region.to_owned()),
                ..CompanyProfile::default()
            }),
        )
    }

    fn investor(id: &str, name: &str) -> Node {
        Node::new(id, name, NodeProfile::Investor(InvestorProfile::default()))
    }

    fn industry(id: &str, name: &str) -> Node {
        Node::new(id, name, NodeProfile::Industry(IndustryProfile::default()))
    }

    /// Three companies, one investor, one industry.
    fn scenario() -> MarketGraph {
        MarketGraph::new(
            vec![
                company("c1", "Ledgerly", "Fintech", "Europe"),
                company("c2", "MediSync", "Healthcare IT", "North America"),
                company("c3", "FlowDesk", "Enterprise SaaS", "North America"),
                investor("v1", "Northwind Ventures"),
                industry("i1", "Fintech"),
            ],
            vec![
                Edge::new("v1", "c1", EdgeKind::InvestedIn).with_properties(EdgeProperties {
                    amount: Some(50_000_000.0),
                    timestamp: parse_date("2023-03-14"),
                    ..EdgeProperties::default()
                }),
                Edge::new("c1", "i1", EdgeKind::BelongsTo),
            ],
        )
        .unwrap()
    }

    fn ids(subgraph: &Subgraph) -> HashSet<&str> {
        subgraph.nodes.iter().map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_full_graph() {
        let graph = scenario();
        let result = GraphQueryService::new(&graph).search("", &FilterSpec::default());
        assert_eq!(result.nodes, graph.nodes());
        assert_eq!(result.edges, graph.edges());
    }

    #[test]
    fn no_match_returns_empty_subgraph() {
        let graph = scenario();
        let result = GraphQueryService::new(&graph).search("zzz-nothing", &FilterSpec::default());
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
    }

    #[test]
    fn investor_query_expands_one_hop_by_default() {
        let graph = scenario();
        let result = GraphQueryService::new(&graph).search("northwind", &FilterSpec::default());

        assert_eq!(ids(&result), HashSet::from(["v1", "c1"]));
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].kind, EdgeKind::InvestedIn);
    }

    #[test]
    fn two_hop_expansion_reaches_the_industry() {
        let graph = scenario();
        let result = GraphQueryService::new(&graph)
            .with_expansion_hops(2)
            .search("Northwind Ventures", &FilterSpec::default());

        assert_eq!(ids(&result), HashSet::from(["v1", "c1", "i1"]));
        assert_eq!(result.edges.len(), 2);
    }

    #[test]
    fn text_matches_properties() {
        let graph = scenario();
        let result = GraphQueryService::new(&graph).search("north america", &FilterSpec::default());
        assert_eq!(ids(&result), HashSet::from(["c2", "c3"]));
    }

    #[test]
    fn search_term_is_used_when_query_is_blank() {
        let graph = scenario();
        let filters = FilterSpec {
            search_term: Some("flowdesk".to_owned()),
            ..FilterSpec::default()
        };
        let result = GraphQueryService::new(&graph).search("  ", &filters);
        assert_eq!(ids(&result), HashSet::from(["c3"]));
    }

    #[test]
    fn deal_size_filter_selects_nodes_with_matching_edges() {
        let graph = scenario();
        let filters = FilterSpec {
            deal_size: Some(AmountRange {
                min: Some(10_000_000.0),
                max: None,
            }),
            ..FilterSpec::default()
        };
        let result = GraphQueryService::new(&graph).search("", &filters);
        assert_eq!(ids(&result), HashSet::from(["v1", "c1", "i1"]));
    }

    #[test]
    fn timeframe_excludes_undated_and_out_of_range_edges() {
        let graph = scenario();
        let filters = FilterSpec {
            timeframe: Some(Timeframe {
                start: parse_date("2024-01-01"),
                end: None,
            }),
            ..FilterSpec::default()
        };
        let result = GraphQueryService::new(&graph).search("", &filters);
        assert!(result.is_empty());
    }

    #[test]
    fn event_type_filter_uses_edge_kind_fallback() {
        let graph = scenario();
        let filters = FilterSpec {
            event_types: vec!["Funding".to_owned()],
            ..FilterSpec::default()
        };
        let result = GraphQueryService::new(&graph)
            .with_expansion_hops(0)
            .search("", &filters);
        assert_eq!(ids(&result), HashSet::from(["v1", "c1"]));
    }

    #[test]
    fn industry_and_region_allow_lists_combine() {
        let graph = scenario();
        let filters = FilterSpec {
            industries: vec!["fintech".to_owned(), "Healthcare IT".to_owned()],
            regions: vec!["North America".to_owned()],
            ..FilterSpec::default()
        };
        let result = GraphQueryService::new(&graph)
            .with_expansion_hops(0)
            .search("", &filters);
        assert_eq!(ids(&result), HashSet::from(["c2"]));
    }

    #[test]
    fn search_does_not_mutate_the_store() {
        let graph = scenario();
        let before = graph.clone();
        let _ = GraphQueryService::new(&graph).search("ledgerly", &FilterSpec::default());
        assert_eq!(before.nodes(), graph.nodes());
        assert_eq!(before.edges(), graph.edges());
    }

    fn arbitrary_graph() -> impl Strategy<Value = MarketGraph> {
        (1usize..16).prop_flat_map(|node_count| {
            let names = prop::collection::vec("[a-d]{1,4}", node_count);
            let edges = prop::collection::vec((0..node_count, 0..node_count, 0usize..4), 0..32);
            (names, edges).prop_map(|(names, edges)| {
                let nodes = names
                    .iter()
                    .enumerate()
                    .map(|(index, name)| {
                        if index % 3 == 0 {
                            investor(&format!("n{index}"), name)
                        } else {
                            company(&format!("n{index}"), name, "Fintech", "Europe")
                        }
                    })
                    .collect::<Vec<_>>();
                let edges = edges
                    .into_iter()
                    .map(|(source, target, kind)| {
                        Edge::new(format!("n{source}"), format!("n{target}"), EdgeKind::ALL[kind])
                    })
                    .collect::<Vec<_>>();
                MarketGraph::new(nodes, edges).unwrap()
            })
        })
    }

    proptest! {
        #[test]
        fn results_are_always_closed(graph in arbitrary_graph(), query in "[a-d]{0,2}") {
            let result = GraphQueryService::new(&graph).search(&query, &FilterSpec::default());
            let node_ids = ids(&result);
            for edge in &result.edges {
                prop_assert!(node_ids.contains(edge.source.as_str()));
                prop_assert!(node_ids.contains(edge.target.as_str()));
            }
        }

        #[test]
        fn neighbours_of_direct_matches_are_included(graph in arbitrary_graph(), query in "[a-d]{1,2}") {
            let result = GraphQueryService::new(&graph).search(&query, &FilterSpec::default());
            let node_ids = ids(&result);
            for edge in graph.edges() {
                let source_matches = graph.node(&edge.source).is_some_and(|node| node.name.contains(query.as_str()));
                let target_matches = graph.node(&edge.target).is_some_and(|node| node.name.contains(query.as_str()));
                if source_matches || target_matches {
                    prop_assert!(node_ids.contains(edge.source.as_str()));
                    prop_assert!(node_ids.contains(edge.target.as_str()));
                }
            }
        }
    }
}
