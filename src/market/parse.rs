use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::util::parse_date;

use super::graph::{
    AcquirerProfile, CompanyProfile, Edge, EdgeKind, EdgeProperties, IndustryProfile,
    InvestorProfile, MarketGraph, Node, NodeKind, NodeProfile,
};

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default, alias = "links")]
    edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    source: String,
    target: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawEdgeProperties {
    amount: Option<Value>,
    timestamp: Option<String>,
    description: Option<String>,
    event_type: Option<String>,
    round: Option<String>,
}

pub(super) fn parse_dataset(raw: &str) -> Result<MarketGraph> {
    let dataset: RawDataset = serde_json::from_str(raw).context("invalid dataset JSON")?;

    let mut nodes = Vec::with_capacity(dataset.nodes.len());
    for raw_node in dataset.nodes {
        let Some(kind) = NodeKind::parse(&raw_node.kind) else {
            tracing::warn!(id = %raw_node.id, kind = %raw_node.kind, "skipping node of unknown type");
            continue;
        };

        let profile = node_profile(kind, raw_node.properties)
            .with_context(|| format!("invalid properties for node {}", raw_node.id))?;
        let name = raw_node.name.unwrap_or_else(|| raw_node.id.clone());
        nodes.push(Node::new(raw_node.id, name, profile));
    }

    let mut edges = Vec::with_capacity(dataset.edges.len());
    for raw_edge in dataset.edges {
        let Some(kind) = EdgeKind::parse(&raw_edge.kind) else {
            tracing::warn!(
                source = %raw_edge.source,
                target = %raw_edge.target,
                kind = %raw_edge.kind,
                "skipping edge of unknown type"
            );
            continue;
        };

        let properties = edge_properties(raw_edge.properties).with_context(|| {
            format!(
                "invalid properties for edge {} -> {}",
                raw_edge.source, raw_edge.target
            )
        })?;
        edges.push(Edge::new(raw_edge.source, raw_edge.target, kind).with_properties(properties));
    }

    MarketGraph::new(nodes, edges).context("dataset failed validation")
}

fn node_profile(kind: NodeKind, properties: Map<String, Value>) -> Result<NodeProfile> {
    let value = Value::Object(properties);
    let profile = match kind {
        NodeKind::Company => NodeProfile::Company(CompanyProfile::deserialize(value)?),
        NodeKind::Investor => NodeProfile::Investor(InvestorProfile::deserialize(value)?),
        NodeKind::Acquirer => NodeProfile::Acquirer(AcquirerProfile::deserialize(value)?),
        NodeKind::Industry => NodeProfile::Industry(IndustryProfile::deserialize(value)?),
    };
    Ok(profile)
}

fn edge_properties(properties: Map<String, Value>) -> Result<EdgeProperties> {
    let raw = RawEdgeProperties::deserialize(Value::Object(properties))?;

    let timestamp = match raw.timestamp.as_deref() {
        Some(text) => {
            let parsed = parse_date(text);
            if parsed.is_none() {
                tracing::warn!(timestamp = text, "ignoring unparseable edge timestamp");
            }
            parsed
        }
        None => None,
    };

    Ok(EdgeProperties {
        amount: raw.amount.as_ref().and_then(amount_value),
        timestamp,
        description: raw.description,
        event_type: raw.event_type,
        round: raw.round,
    })
}

fn amount_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.replace([',', '_', '$'], "").trim().parse().ok(),
        _ => None,
    }
}
