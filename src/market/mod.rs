mod dataset;
mod graph;
mod inspect;
mod parse;
mod provider;
mod query;

pub use graph::{Edge, EdgeKind, MarketGraph, Node, NodeKind};
pub use inspect::{EventKind, Inspection, inspect};
pub use provider::{DemoProvider, GraphDataProvider, JsonFileProvider};
pub use query::{AmountRange, FilterSpec, GraphQueryService, Subgraph, Timeframe};
