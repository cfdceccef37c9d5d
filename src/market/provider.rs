use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::dataset::demo_graph;
use super::graph::MarketGraph;
use super::parse::parse_dataset;

/// Source of the canonical graph. Implementations run on the background load thread.
pub trait GraphDataProvider: Send + Sync {
    fn describe(&self) -> String;

    fn load(&self) -> Result<MarketGraph>;
}

pub struct DemoProvider;

impl GraphDataProvider for DemoProvider {
    fn describe(&self) -> String {
        "built-in demo market".to_owned()
    }

    fn load(&self) -> Result<MarketGraph> {
        demo_graph().context("built-in demo dataset is inconsistent")
    }
}

pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GraphDataProvider for JsonFileProvider {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<MarketGraph> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read dataset {}", self.path.display()))?;
        parse_dataset(&raw).with_context(|| format!("failed to parse {}", self.path.display()))
    }
}
