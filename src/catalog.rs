//! Reference Catalog
//!
//! The fixed vocabulary of concept nodes the generator may route through,
//! plus the name → short code lookup used during enrichment. Loaded once and
//! shared read-only behind an `Arc`.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::UNKNOWN_CODE;

const DEFAULT_CATALOG_YAML: &str = include_str!("data/catalog.yaml");

static DEFAULT_CATALOG: LazyLock<Arc<Catalog>> = LazyLock::new(|| {
    Arc::new(
        Catalog::from_yaml_str(DEFAULT_CATALOG_YAML).expect("embedded catalog.yaml is valid"),
    )
});

/// Closed set of node categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Content & Media")]
    ContentAndMedia,
    #[serde(rename = "Demand & Growth")]
    DemandAndGrowth,
    #[serde(rename = "Strategy & Insights")]
    StrategyAndInsights,
    #[serde(rename = "Systems & Operations")]
    SystemsAndOperations,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::ContentAndMedia,
        Category::DemandAndGrowth,
        Category::StrategyAndInsights,
        Category::SystemsAndOperations,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::ContentAndMedia => "Content & Media",
            Category::DemandAndGrowth => "Demand & Growth",
            Category::StrategyAndInsights => "Strategy & Insights",
            Category::SystemsAndOperations => "Systems & Operations",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A selectable origin, destination or intermediate stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptNode {
    /// Human-readable function label, e.g. "Demand Generation"
    pub function: String,
    /// Unique node name, e.g. "London, UK"
    pub name: String,
    pub description: String,
    pub category: Category,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    nodes: Vec<ConceptNode>,
    #[serde(default)]
    codes: HashMap<String, String>,
}

/// Ordered concept nodes with their short-code lookup
#[derive(Debug, Clone)]
pub struct Catalog {
    nodes: Vec<ConceptNode>,
    codes: HashMap<String, String>,
}

impl Catalog {
    /// Build a catalog from nodes and a name → code mapping.
    ///
    /// Node names must be unique and every node must have a code. Extra
    /// codes for names that are not nodes are allowed.
    pub fn new(
        nodes: Vec<ConceptNode>,
        codes: HashMap<String, String>,
    ) -> Result<Self, CatalogError> {
        if nodes.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for node in &nodes {
            if !seen.insert(node.name.as_str()) {
                return Err(CatalogError::DuplicateNode(node.name.clone()));
            }
            if !codes.contains_key(&node.name) {
                return Err(CatalogError::MissingCode(node.name.clone()));
            }
        }

        Ok(Self { nodes, codes })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(file.nodes, file.codes)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// The built-in marketing-function catalog
    pub fn default_catalog() -> Arc<Catalog> {
        Arc::clone(&DEFAULT_CATALOG)
    }

    pub fn nodes(&self) -> &[ConceptNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&ConceptNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Find a node by exact name, short code, or case-insensitive name
    pub fn lookup(&self, query: &str) -> Option<&ConceptNode> {
        let query = query.trim();
        self.find(query)
            .or_else(|| {
                self.nodes.iter().find(|n| {
                    self.code_for(&n.name)
                        .is_some_and(|code| code.eq_ignore_ascii_case(query))
                })
            })
            .or_else(|| {
                self.nodes
                    .iter()
                    .find(|n| n.name.eq_ignore_ascii_case(query))
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.codes.get(name).map(String::as_str)
    }

    /// Short code for `name`, or [`UNKNOWN_CODE`] when it is not mapped
    pub fn code_or_unknown(&self, name: &str) -> &str {
        self.code_for(name).unwrap_or(UNKNOWN_CODE)
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &ConceptNode> {
        self.nodes.iter().filter(move |n| n.category == category)
    }

    /// Categories in first-seen catalog order
    pub fn categories(&self) -> Vec<Category> {
        let mut out = Vec::new();
        for node in &self.nodes {
            if !out.contains(&node.category) {
                out.push(node.category);
            }
        }
        out
    }
}
