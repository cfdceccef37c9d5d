use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::util::format_currency;

use super::graph::{Direction, EdgeKind, MarketGraph, NodeKind, NodeProfile};

#[derive(Clone, Debug, PartialEq)]
pub struct Overview {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub facts: Vec<(&'static str, String)>,
    pub description: Option<String>,
    pub total_deal_value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub relationships: Vec<&'static str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Funding,
    Acquisition,
}

impl EventKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Funding => "Funding",
            Self::Acquisition => "Acquisition",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DealEvent {
    pub kind: EventKind,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub counterparty: String,
    pub details: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Inspection {
    pub overview: Overview,
    pub connections: Vec<Connection>,
    pub events: Vec<DealEvent>,
}

pub fn relationship_label(kind: EdgeKind, direction: Direction) -> &'static str {
    match (kind, direction) {
        (EdgeKind::InvestedIn, Direction::Outgoing) => "Invested in",
        (EdgeKind::InvestedIn, Direction::Incoming) => "Received investment from",
        (EdgeKind::Acquired, Direction::Outgoing) => "Acquired",
        (EdgeKind::Acquired, Direction::Incoming) => "Acquired by",
        (EdgeKind::BelongsTo, Direction::Outgoing) => "Belongs to",
        (EdgeKind::BelongsTo, Direction::Incoming) => "Includes",
        (EdgeKind::RelatedTo, _) => "Related to",
    }
}

/// 1-hop view of a node: its profile, de-duplicated neighbours and deal history.
pub fn inspect(graph: &MarketGraph, node_id: &str) -> Option<Inspection> {
    let index = graph.index_of(node_id)?;
    let node = &graph.nodes()[index];

    let mut connections: Vec<Connection> = Vec::new();
    let mut events = Vec::new();
    for (edge, neighbor_index, direction) in graph.neighbors(index) {
        let neighbor = &graph.nodes()[neighbor_index];
        let label = relationship_label(edge.kind, direction);

        match connections.iter_mut().find(|entry| entry.id == neighbor.id) {
            Some(entry) => {
                if !entry.relationships.contains(&label) {
                    entry.relationships.push(label);
                }
            }
            None => connections.push(Connection {
                id: neighbor.id.clone(),
                name: neighbor.name.clone(),
                kind: neighbor.kind(),
                relationships: vec![label],
            }),
        }

        if node.kind() == NodeKind::Industry {
            continue;
        }

        let kind = match edge.kind {
            EdgeKind::InvestedIn => EventKind::Funding,
            EdgeKind::Acquired => EventKind::Acquisition,
            EdgeKind::BelongsTo | EdgeKind::RelatedTo => continue,
        };

        let details = edge
            .properties
            .description
            .clone()
            .or_else(|| edge.properties.round.clone())
            .unwrap_or_else(|| format!("{} {}", label, neighbor.name));

        events.push(DealEvent {
            kind,
            date: edge.properties.timestamp,
            amount: edge.properties.amount,
            counterparty: neighbor.name.clone(),
            details,
        });
    }

    events.sort_by(|a, b| match (a.date, b.date) {
        (Some(a_date), Some(b_date)) => b_date.cmp(&a_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let total_deal_value = events.iter().filter_map(|event| event.amount).sum();

    Some(Inspection {
        overview: Overview {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind(),
            facts: profile_facts(&node.profile),
            description: node.profile.description().map(str::to_owned),
            total_deal_value,
        },
        connections,
        events,
    })
}

fn profile_facts(profile: &NodeProfile) -> Vec<(&'static str, String)> {
    let mut facts = Vec::new();
    let mut push = |label: &'static str, value: Option<String>| {
        if let Some(value) = value {
            facts.push((label, value));
        }
    };

    match profile {
        NodeProfile::Company(company) => {
            push("Industry", company.industry.clone());
            push("Region", company.region.clone());
            push("Funding stage", company.funding_stage.clone());
            push("Founded", company.founded.map(|year| year.to_string()));
            push("Employees", company.employees.map(|count| count.to_string()));
            push("Valuation", company.valuation.map(format_currency));
        }
        NodeProfile::Investor(investor) => {
            push("Investor type", investor.investor_type.clone());
            push("Region", investor.region.clone());
            push("Assets under management", investor.aum.map(format_currency));
        }
        NodeProfile::Acquirer(acquirer) => {
            push("Industry", acquirer.industry.clone());
            push("Region", acquirer.region.clone());
            push("Market cap", acquirer.market_cap.map(format_currency));
        }
        NodeProfile::Industry(industry) => {
            push("Sector", industry.sector.clone());
        }
    }

    facts
}
