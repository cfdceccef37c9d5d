use crate::util::parse_date;

use super::graph::{
    AcquirerProfile, CompanyProfile, Edge, EdgeKind, EdgeProperties, GraphError, IndustryProfile,
    InvestorProfile, MarketGraph, Node, NodeProfile,
};

// (id, name, sector)
const INDUSTRIES: [(&str, &str, &str); 6] = [
    ("ind-fintech", "Fintech", "Financial Services"),
    ("ind-health", "Healthcare IT", "Healthcare"),
    ("ind-saas", "Enterprise SaaS", "Software"),
    ("ind-security", "Cybersecurity", "Software"),
    ("ind-climate", "Climate Tech", "Energy"),
    ("ind-ai", "Generative AI", "Software"),
];

// (id, name, industry id, region, stage, founded, employees, valuation)
const COMPANIES: [(&str, &str, &str, &str, &str, i32, u32, f64); 18] = [
    ("co-ledgerly", "Ledgerly", "ind-fintech", "Europe", "Series C", 2016, 420, 1_800_000_000.0),
    ("co-paystream", "PayStream", "ind-fintech", "North America", "Series B", 2018, 210, 640_000_000.0),
    ("co-coinvault", "CoinVault", "ind-fintech", "Asia Pacific", "Series A", 2020, 75, 150_000_000.0),
    ("co-lendwise", "LendWise", "ind-fintech", "North America", "Series D", 2014, 880, 3_200_000_000.0),
    ("co-medisync", "MediSync", "ind-health", "North America", "Series B", 2017, 260, 520_000_000.0),
    ("co-carepath", "CarePath", "ind-health", "Europe", "Series A", 2019, 90, 95_000_000.0),
    ("co-genomiq", "Genomiq", "ind-health", "North America", "Seed", 2022, 24, 18_000_000.0),
    ("co-flowdesk", "FlowDesk", "ind-saas", "North America", "Series C", 2015, 510, 1_100_000_000.0),
    ("co-stackly", "Stackly", "ind-saas", "Europe", "Series B", 2018, 190, 410_000_000.0),
    ("co-metricly", "Metricly", "ind-saas", "Asia Pacific", "Series A", 2021, 60, 72_000_000.0),
    ("co-shieldops", "ShieldOps", "ind-security", "North America", "Series C", 2016, 350, 1_450_000_000.0),
    ("co-zerotrace", "ZeroTrace", "ind-security", "Europe", "Series A", 2020, 70, 110_000_000.0),
    ("co-keyforge", "KeyForge", "ind-security", "Middle East", "Seed", 2022, 18, 12_000_000.0),
    ("co-gridwise", "GridWise", "ind-climate", "Europe", "Series B", 2017, 230, 390_000_000.0),
    ("co-carbonlens", "CarbonLens", "ind-climate", "North America", "Series A", 2021, 55, 64_000_000.0),
    ("co-neuralnest", "NeuralNest", "ind-ai", "North America", "Series B", 2021, 140, 900_000_000.0),
    ("co-promptly", "Promptly", "ind-ai", "Europe", "Seed", 2023, 15, 30_000_000.0),
    ("co-visionary", "Visionary Labs", "ind-ai", "Asia Pacific", "Series A", 2022, 48, 120_000_000.0),
];

// (id, name, investor type, region, assets under management)
const INVESTORS: [(&str, &str, &str, &str, f64); 7] = [
    ("inv-northwind", "Northwind Ventures", "Venture Capital", "North America", 4_200_000_000.0),
    ("inv-sequel", "Sequel Partners", "Venture Capital", "North America", 12_500_000_000.0),
    ("inv-albion", "Albion Capital", "Growth Equity", "Europe", 6_800_000_000.0),
    ("inv-harbor", "Harbor Point PE", "Private Equity", "North America", 21_000_000_000.0),
    ("inv-lotus", "Lotus Tech Fund", "Venture Capital", "Asia Pacific", 2_300_000_000.0),
    ("inv-greenleaf", "Greenleaf Impact", "Impact Fund", "Europe", 950_000_000.0),
    ("inv-angelcircle", "Angel Circle", "Angel Network", "North America", 85_000_000.0),
];

// (id, name, industry, region, market cap)
const ACQUIRERS: [(&str, &str, &str, &str, f64); 5] = [
    ("acq-globalbank", "GlobalBank Corp", "Fintech", "North America", 310_000_000_000.0),
    ("acq-medcore", "MedCore Holdings", "Healthcare IT", "North America", 88_000_000_000.0),
    ("acq-cloudnine", "CloudNine Systems", "Enterprise SaaS", "North America", 540_000_000_000.0),
    ("acq-sentinel", "Sentinel Group", "Cybersecurity", "Europe", 47_000_000_000.0),
    ("acq-voltaic", "Voltaic Energy", "Climate Tech", "Europe", 65_000_000_000.0),
];

// (investor, company, amount, date, round)
const INVESTMENTS: [(&str, &str, f64, &str, &str); 20] = [
    ("inv-northwind", "co-paystream", 50_000_000.0, "2023-03-14", "Series B"),
    ("inv-northwind", "co-flowdesk", 75_000_000.0, "2022-09-02", "Series C"),
    ("inv-northwind", "co-neuralnest", 120_000_000.0, "2024-02-20", "Series B"),
    ("inv-sequel", "co-lendwise", 250_000_000.0, "2022-05-11", "Series D"),
    ("inv-sequel", "co-shieldops", 110_000_000.0, "2023-07-19", "Series C"),
    ("inv-sequel", "co-neuralnest", 80_000_000.0, "2024-02-20", "Series B"),
    ("inv-albion", "co-ledgerly", 140_000_000.0, "2023-01-30", "Series C"),
    ("inv-albion", "co-stackly", 45_000_000.0, "2022-11-08", "Series B"),
    ("inv-albion", "co-zerotrace", 18_000_000.0, "2023-10-03", "Series A"),
    ("inv-harbor", "co-lendwise", 300_000_000.0, "2024-04-15", "Growth"),
    ("inv-harbor", "co-medisync", 65_000_000.0, "2023-05-22", "Series B"),
    ("inv-lotus", "co-coinvault", 22_000_000.0, "2023-08-17", "Series A"),
    ("inv-lotus", "co-metricly", 12_000_000.0, "2022-12-01", "Series A"),
    ("inv-lotus", "co-visionary", 28_000_000.0, "2024-01-09", "Series A"),
    ("inv-greenleaf", "co-gridwise", 60_000_000.0, "2023-04-27", "Series B"),
    ("inv-greenleaf", "co-carbonlens", 15_000_000.0, "2024-03-05", "Series A"),
    ("inv-greenleaf", "co-carepath", 14_000_000.0, "2022-06-21", "Series A"),
    ("inv-angelcircle", "co-genomiq", 2_500_000.0, "2023-02-12", "Seed"),
    ("inv-angelcircle", "co-keyforge", 1_800_000.0, "2023-09-28", "Seed"),
    ("inv-angelcircle", "co-promptly", 4_000_000.0, "2024-05-06", "Seed"),
];

// (acquirer, company, amount, date)
const ACQUISITIONS: [(&str, &str, f64, &str); 4] = [
    ("acq-globalbank", "co-paystream", 720_000_000.0, "2024-06-18"),
    ("acq-medcore", "co-carepath", 130_000_000.0, "2024-03-11"),
    ("acq-cloudnine", "co-metricly", 95_000_000.0, "2024-07-02"),
    ("acq-sentinel", "co-zerotrace", 160_000_000.0, "2024-08-26"),
];

// (from, to, description)
const RELATIONS: [(&str, &str, &str); 5] = [
    ("co-ledgerly", "co-paystream", "Payments partnership"),
    ("co-shieldops", "co-zerotrace", "Competing endpoint products"),
    ("co-neuralnest", "co-promptly", "Model licensing agreement"),
    ("co-gridwise", "co-carbonlens", "Joint grid-emissions pilot"),
    ("acq-voltaic", "co-gridwise", "Strategic minority stake talks"),
];

/// Built-in demo market used when no dataset file is supplied.
pub fn demo_graph() -> Result<MarketGraph, GraphError> {
    let industry_name = |id: &str| {
        INDUSTRIES
            .iter()
            .find(|(industry_id, _, _)| *industry_id == id)
            .map(|(_, name, _)| (*name).to_owned())
    };

    let mut nodes = Vec::new();
    for (id, name, sector) in INDUSTRIES {
        nodes.push(Node::new(
            id,
            name,
            NodeProfile::Industry(IndustryProfile {
                sector: Some(sector.to_owned()),
                description: None,
            }),
        ));
    }

    for (id, name, industry, region, stage, founded, employees, valuation) in COMPANIES {
        nodes.push(Node::new(
            id,
            name,
            NodeProfile::Company(CompanyProfile {
                industry: industry_name(industry),
                region: Some(region.to_owned()),
                funding_stage: Some(stage.to_owned()),
                founded: Some(founded),
                employees: Some(employees),
                valuation: Some(valuation),
                description: None,
            }),
        ));
    }

    for (id, name, investor_type, region, aum) in INVESTORS {
        nodes.push(Node::new(
            id,
            name,
            NodeProfile::Investor(InvestorProfile {
                investor_type: Some(investor_type.to_owned()),
                region: Some(region.to_owned()),
                aum: Some(aum),
                description: None,
            }),
        ));
    }

    for (id, name, industry, region, market_cap) in ACQUIRERS {
        nodes.push(Node::new(
            id,
            name,
            NodeProfile::Acquirer(AcquirerProfile {
                industry: Some(industry.to_owned()),
                region: Some(region.to_owned()),
                market_cap: Some(market_cap),
                description: None,
            }),
        ));
    }

    let mut edges = Vec::new();
    for (id, _, industry, ..) in COMPANIES {
        edges.push(Edge::new(id, industry, EdgeKind::BelongsTo));
    }

    for (investor, company, amount, date, round) in INVESTMENTS {
        edges.push(
            Edge::new(investor, company, EdgeKind::InvestedIn).with_properties(EdgeProperties {
                amount: Some(amount),
                timestamp: parse_date(date),
                description: Some(format!("{round} round")),
                event_type: Some("funding".to_owned()),
                round: Some(round.to_owned()),
            }),
        );
    }

    for (acquirer, company, amount, date) in ACQUISITIONS {
        edges.push(
            Edge::new(acquirer, company, EdgeKind::Acquired).with_properties(EdgeProperties {
                amount: Some(amount),
                timestamp: parse_date(date),
                description: Some("Full acquisition".to_owned()),
                event_type: Some("acquisition".to_owned()),
                round: None,
            }),
        );
    }

    for (from, to, description) in RELATIONS {
        edges.push(
            Edge::new(from, to, EdgeKind::RelatedTo).with_properties(EdgeProperties {
                description: Some(description.to_owned()),
                ..EdgeProperties::default()
            }),
        );
    }

    MarketGraph::new(nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_graph_is_consistent() {
        let graph = demo_graph().unwrap();
        assert_eq!(
            graph.node_count(),
            INDUSTRIES.len() + COMPANIES.len() + INVESTORS.len() + ACQUIRERS.len()
        );
        assert_eq!(graph.dropped_edges(), 0);
        assert_eq!(
            graph.edge_count(),
            COMPANIES.len() + INVESTMENTS.len() + ACQUISITIONS.len() + RELATIONS.len()
        );
    }

    #[test]
    fn every_demo_edge_is_dated_when_it_is_a_deal() {
        let graph = demo_graph().unwrap();
        for edge in graph.edges() {
            if matches!(edge.kind, EdgeKind::InvestedIn | EdgeKind::Acquired) {
                assert!(edge.properties.timestamp.is_some(), "{edge:?}");
                assert!(edge.properties.amount.is_some(), "{edge:?}");
            }
        }
    }
}
