use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Company,
    Investor,
    Acquirer,
    Industry,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Company,
        NodeKind::Investor,
        NodeKind::Acquirer,
        NodeKind::Industry,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Investor => "Investor",
            Self::Acquirer => "Acquirer",
            Self::Industry => "Industry",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "company" => Some(Self::Company),
            "investor" => Some(Self::Investor),
            "acquirer" => Some(Self::Acquirer),
            "industry" => Some(Self::Industry),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    InvestedIn,
    Acquired,
    BelongsTo,
    RelatedTo,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::InvestedIn,
        EdgeKind::Acquired,
        EdgeKind::BelongsTo,
        EdgeKind::RelatedTo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::InvestedIn => "Invested in",
            Self::Acquired => "Acquired",
            Self::BelongsTo => "Belongs to",
            Self::RelatedTo => "Related to",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "invested_in" => Some(Self::InvestedIn),
            "acquired" => Some(Self::Acquired),
            "belongs_to" => Some(Self::BelongsTo),
            "related_to" => Some(Self::RelatedTo),
            _ => None,
        }
    }

    /// Event type used by filters when an edge carries no explicit `eventType`.
    pub fn default_event_type(self) -> Option<&'static str> {
        match self {
            Self::InvestedIn => Some("funding"),
            Self::Acquired => Some("acquisition"),
            Self::BelongsTo | Self::RelatedTo => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompanyProfile {
    pub industry: Option<String>,
    pub region: Option<String>,
    pub funding_stage: Option<String>,
    pub founded: Option<i32>,
    pub employees: Option<u32>,
    pub valuation: Option<f64>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestorProfile {
    pub investor_type: Option<String>,
    pub region: Option<String>,
    pub aum: Option<f64>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AcquirerProfile {
    pub industry: Option<String>,
    pub region: Option<String>,
    pub market_cap: Option<f64>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndustryProfile {
    pub sector: Option<String>,
    pub description: Option<String>,
}

/// Per-kind attributes. The variant always agrees with the node kind.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeProfile {
    Company(CompanyProfile),
    Investor(InvestorProfile),
    Acquirer(AcquirerProfile),
    Industry(IndustryProfile),
}

impl NodeProfile {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Company(_) => NodeKind::Company,
            Self::Investor(_) => NodeKind::Investor,
            Self::Acquirer(_) => NodeKind::Acquirer,
            Self::Industry(_) => NodeKind::Industry,
        }
    }

    pub fn industry(&self) -> Option<&str> {
        match self {
            Self::Company(profile) => profile.industry.as_deref(),
            Self::Acquirer(profile) => profile.industry.as_deref(),
            Self::Investor(_) | Self::Industry(_) => None,
        }
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            Self::Company(profile) => profile.region.as_deref(),
            Self::Investor(profile) => profile.region.as_deref(),
            Self::Acquirer(profile) => profile.region.as_deref(),
            Self::Industry(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Company(profile) => profile.description.as_deref(),
            Self::Investor(profile) => profile.description.as_deref(),
            Self::Acquirer(profile) => profile.description.as_deref(),
            Self::Industry(profile) => profile.description.as_deref(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub profile: NodeProfile,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, profile: NodeProfile) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            profile,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.profile.kind()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeProperties {
    pub amount: Option<f64>,
    pub timestamp: Option<NaiveDate>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub round: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub properties: EdgeProperties,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            properties: EdgeProperties::default(),
        }
    }

    pub fn with_properties(mut self, properties: EdgeProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn event_type(&self) -> Option<&str> {
        self.properties
            .event_type
            .as_deref()
            .or_else(|| self.kind.default_event_type())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("node id {0:?} appears more than once")]
    DuplicateNode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Canonical node and edge arrays. Read-only once built.
#[derive(Clone, Debug, Default)]
pub struct MarketGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<String, usize>,
    incident: Vec<Vec<usize>>,
    dropped_edges: usize,
}

impl MarketGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if index_by_id.insert(node.id.clone(), index).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let edge_total = edges.len();
        let edges = edges
            .into_iter()
            .filter(|edge| {
                let known = index_by_id.contains_key(&edge.source)
                    && index_by_id.contains_key(&edge.target);
                if !known {
                    tracing::warn!(
                        source = %edge.source,
                        target = %edge.target,
                        "dropping edge with a dangling endpoint"
                    );
                }
                known
            })
            .collect::<Vec<_>>();
        let dropped_edges = edge_total - edges.len();

        let mut incident = vec![Vec::new(); nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            let source = index_by_id[&edge.source];
            let target = index_by_id[&edge.target];
            incident[source].push(edge_index);
            if target != source {
                incident[target].push(edge_index);
            }
        }

        Ok(Self {
            nodes,
            edges,
            index_by_id,
            incident,
            dropped_edges,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn incident_edges(&self, index: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.incident
            .get(index)
            .into_iter()
            .flatten()
            .map(|&edge_index| &self.edges[edge_index])
    }

    /// Yields `(edge, neighbour index, direction relative to the node at `index`)`.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (&Edge, usize, Direction)> + '_ {
        let id = self.nodes.get(index).map(|node| node.id.as_str());
        self.incident_edges(index).filter_map(move |edge| {
            let id = id?;
            if edge.source == id {
                Some((edge, self.index_by_id[&edge.target], Direction::Outgoing))
            } else {
                Some((edge, self.index_by_id[&edge.source], Direction::Incoming))
            }
        })
    }

    pub fn industries(&self) -> Vec<String> {
        self.distinct_values(|node| match &node.profile {
            NodeProfile::Industry(_) => Some(node.name.as_str()),
            profile => profile.industry(),
        })
    }

    pub fn regions(&self) -> Vec<String> {
        self.distinct_values(|node| node.profile.region())
    }

    pub fn event_types(&self) -> Vec<String> {
        let mut values = self
            .edges
            .iter()
            .filter_map(|edge| edge.event_type().map(str::to_owned))
            .collect::<Vec<_>>();
        values.sort();
        values.dedup();
        values
    }

    fn distinct_values<'a>(&'a self, value: impl Fn(&'a Node) -> Option<&'a str>) -> Vec<String> {
        let mut values = self
            .nodes
            .iter()
            .filter_map(value)
            .map(str::to_owned)
            .collect::<Vec<_>>();
        values.sort();
        values.dedup();
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(id: &str, industry: &str) -> Node {
        Node::new(
            id,
            id.to_uppercase(),
            NodeProfile::Company(CompanyProfile {
                industry: Some(industry.to_owned()),
                ..CompanyProfile::default()
            }),
        )
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = MarketGraph::new(vec![company("a", "Fintech"), company("a", "Health")], vec![]);
        assert_eq!(
            result.err(),
            Some(GraphError::DuplicateNode("a".to_owned()))
        );
    }

    #[test]
    fn dangling_edges_are_dropped() {
        let graph = MarketGraph::new(
            vec![company("a", "Fintech"), company("b", "Fintech")],
            vec![
                Edge::new("a", "b", EdgeKind::RelatedTo),
                Edge::new("a", "ghost", EdgeKind::RelatedTo),
            ],
        )
        .unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dropped_edges(), 1);
    }

    #[test]
    fn neighbors_report_direction() {
        let graph = MarketGraph::new(
            vec![company("a", "Fintech"), company("b", "Fintech")],
            vec![Edge::new("a", "b", EdgeKind::Acquired)],
        )
        .unwrap();

        let from_a = graph.neighbors(0).collect::<Vec<_>>();
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_a[0].1, 1);
        assert_eq!(from_a[0].2, Direction::Outgoing);

        let from_b = graph.neighbors(1).collect::<Vec<_>>();
        assert_eq!(from_b[0].1, 0);
        assert_eq!(from_b[0].2, Direction::Incoming);
    }

    #[test]
    fn event_type_falls_back_to_edge_kind() {
        let edge = Edge::new("a", "b", EdgeKind::InvestedIn);
        assert_eq!(edge.event_type(), Some("funding"));

        let tagged = Edge::new("a", "b", EdgeKind::RelatedTo).with_properties(EdgeProperties {
            event_type: Some("partnership".to_owned()),
            ..EdgeProperties::default()
        });
        assert_eq!(tagged.event_type(), Some("partnership"));
    }

    #[test]
    fn distinct_industries_include_industry_nodes() {
        let graph = MarketGraph::new(
            vec![
                company("a", "Fintech"),
                company("b", "Fintech"),
                Node::new("i", "Healthcare", NodeProfile::Industry(IndustryProfile::default())),
            ],
            vec![],
        )
        .unwrap();

        assert_eq!(graph.industries(), vec!["Fintech", "Healthcare"]);
    }
}
