//! # Region Relationship Graph Module
//!
//! ## Purpose
//! Directed acyclic graph of containment relationships between regions. Each
//! edge links a child region to one parent region and carries a relationship
//! kind, a primary flag, and a coverage weight. Multi-parent children model
//! cities that span several counties.
//!
//! ## Input/Output Specification
//! - **Input**: Validated edges referencing catalog regions
//! - **Output**: Ordered parent lists for upward traversal
//! - **Invariants**: no duplicate (child, parent) pairs, no self-edges, no
//!   cycles, at most one primary edge per (child, parent type)
//!
//! ## Key Features
//! - Write-time cycle rejection via ancestor-reachability check
//! - Parent ordering: primary first, then descending coverage, ties broken
//!   by lexicographic parent id
//! - Advisory coverage-sum check (logged, never enforced)
//! - Copy-on-write snapshot wrapper for the immutable-after-load discipline

use crate::catalog::{Region, RegionCatalog, RegionType};
use crate::errors::{JurisdictionError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Kind of containment relationship between two regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Child lies (partly) within the parent
    #[default]
    PartOf,
}

/// A containment edge from a child region to one of its parents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub child_id: String,
    pub parent_id: String,
    pub kind: RelationshipKind,
    /// Principal jurisdiction among same-type parents
    pub is_primary: bool,
    /// Fraction of the child's area lying within the parent, 0.0..=100.0
    pub coverage: f32,
}

/// A resolved parent of a child region, with the edge attributes attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentLink {
    pub region: Region,
    pub is_primary: bool,
    pub coverage: f32,
}

/// Region catalog plus containment edges, indexed by child id
#[derive(Debug, Clone, Default)]
pub struct RegionGraph {
    catalog: RegionCatalog,
    edges: HashMap<String, Vec<Edge>>,
}

impl RegionGraph {
    pub fn new(catalog: RegionCatalog) -> Self {
        Self {
            catalog,
            edges: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut RegionCatalog {
        &mut self.catalog
    }

    /// Number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Add a containment edge.
    ///
    /// Fails with `UnknownRegion` if either endpoint is absent from the
    /// catalog, `DuplicateEdge` for an existing (child, parent) pair,
    /// `Validation` for out-of-range coverage, self-edges, or a second
    /// primary edge to the same parent type, and `Cycle` if the child is
    /// already a transitive ancestor of the parent. A failed call leaves the
    /// graph unchanged.
    pub fn add_edge(
        &mut self,
        child_id: &str,
        parent_id: &str,
        kind: RelationshipKind,
        is_primary: bool,
        coverage: f32,
    ) -> Result<()> {
        if !self.catalog.contains(child_id) {
            return Err(JurisdictionError::UnknownRegion {
                region_id: child_id.to_string(),
            });
        }
        if !self.catalog.contains(parent_id) {
            return Err(JurisdictionError::UnknownRegion {
                region_id: parent_id.to_string(),
            });
        }
        if child_id == parent_id {
            return Err(JurisdictionError::Validation {
                field: "parent_id".to_string(),
                reason: format!("region '{}' cannot contain itself", child_id),
            });
        }
        if !(0.0..=100.0).contains(&coverage) {
            return Err(JurisdictionError::Validation {
                field: "coverage".to_string(),
                reason: format!("coverage {} outside 0.0..=100.0", coverage),
            });
        }

        let existing = self.edges.get(child_id);
        if existing
            .map(|edges| edges.iter().any(|e| e.parent_id == parent_id))
            .unwrap_or(false)
        {
            return Err(JurisdictionError::DuplicateEdge {
                child_id: child_id.to_string(),
                parent_id: parent_id.to_string(),
            });
        }

        let parent_type = self.catalog.get(parent_id)?.region_type;
        if is_primary {
            let has_primary_of_type = existing
                .map(|edges| {
                    edges.iter().any(|e| {
                        e.is_primary
                            && self
                                .catalog
                                .get(&e.parent_id)
                                .map(|r| r.region_type == parent_type)
                                .unwrap_or(false)
                    })
                })
                .unwrap_or(false);
            if has_primary_of_type {
                return Err(JurisdictionError::Validation {
                    field: "is_primary".to_string(),
                    reason: format!(
                        "region '{}' already has a primary {} parent",
                        child_id, parent_type
                    ),
                });
            }
        }

        // Reachability check: the new edge points child -> parent, so a cycle
        // exists iff the child is reachable upward from the parent.
        if self.is_ancestor(child_id, parent_id) {
            return Err(JurisdictionError::Cycle {
                child_id: child_id.to_string(),
                parent_id: parent_id.to_string(),
            });
        }

        // Advisory: source coverage data may be approximate, so overruns are
        // logged but accepted.
        let type_coverage: f32 = existing
            .map(|edges| {
                edges
                    .iter()
                    .filter(|e| {
                        self.catalog
                            .get(&e.parent_id)
                            .map(|r| r.region_type == parent_type)
                            .unwrap_or(false)
                    })
                    .map(|e| e.coverage)
                    .sum()
            })
            .unwrap_or(0.0);
        if type_coverage + coverage > 100.0 {
            tracing::warn!(
                child_id,
                parent_type = %parent_type,
                total = type_coverage + coverage,
                "coverage sum exceeds 100% for parent type"
            );
        }

        self.edges.entry(child_id.to_string()).or_default().push(Edge {
            child_id: child_id.to_string(),
            parent_id: parent_id.to_string(),
            kind,
            is_primary,
            coverage,
        });
        Ok(())
    }

    /// Ordered parents of a child region, optionally restricted to one
    /// parent type. Primary first, then descending coverage, ties by
    /// lexicographic parent id. Empty for roots; never an error.
    pub fn parents_of(&self, child_id: &str, parent_type: Option<RegionType>) -> Vec<ParentLink> {
        let mut links: Vec<ParentLink> = self
            .edges
            .get(child_id)
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|e| {
                        let region = self.catalog.get(&e.parent_id).ok()?;
                        if let Some(t) = parent_type {
                            if region.region_type != t {
                                return None;
                            }
                        }
                        Some(ParentLink {
                            region: region.clone(),
                            is_primary: e.is_primary,
                            coverage: e.coverage,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        links.sort_by(compare_parent_links);
        links
    }

    /// True when `ancestor_id` is reachable from `region_id` by walking
    /// parent edges (a region is not its own ancestor).
    pub fn is_ancestor(&self, ancestor_id: &str, region_id: &str) -> bool {
        let mut stack: Vec<&str> = vec![region_id];
        let mut seen: HashSet<&str> = HashSet::new();

        while let Some(current) = stack.pop() {
            if let Some(edges) = self.edges.get(current) {
                for edge in edges {
                    if edge.parent_id == ancestor_id {
                        return true;
                    }
                    if seen.insert(edge.parent_id.as_str()) {
                        stack.push(edge.parent_id.as_str());
                    }
                }
            }
        }
        false
    }
}

/// Ordering used everywhere parents are listed: primary first, then
/// descending coverage, ties by lexicographic parent id.
pub(crate) fn compare_parent_links(a: &ParentLink, b: &ParentLink) -> Ordering {
    b.is_primary
        .cmp(&a.is_primary)
        .then(
            b.coverage
                .partial_cmp(&a.coverage)
                .unwrap_or(Ordering::Equal),
        )
        .then_with(|| a.region.id.cmp(&b.region.id))
}

/// Copy-on-write snapshot holder for a loaded graph.
///
/// Readers take a cheap `Arc` clone and traverse a consistent snapshot;
/// updates rebuild the graph wholesale and swap it in, so no reader ever
/// observes a half-inserted edge.
#[derive(Debug, Default)]
pub struct SharedRegionGraph {
    inner: RwLock<Arc<RegionGraph>>,
}

impl SharedRegionGraph {
    pub fn new(graph: RegionGraph) -> Self {
        Self {
            inner: RwLock::new(Arc::new(graph)),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<RegionGraph> {
        self.inner.read().clone()
    }

    /// Replace the graph with a freshly built one
    pub fn swap(&self, graph: RegionGraph) {
        *self.inner.write() = Arc::new(graph);
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::catalog::Region;

    /// Catalog + graph for the Georgia scenario used across the crate's
    /// tests: US > GA > {Fulton, DeKalb, Cobb, Gwinnett} counties, Atlanta
    /// spanning three counties (Fulton primary, 90/9/1), Lawrenceville in
    /// Gwinnett only.
    pub(crate) fn georgia_graph() -> RegionGraph {
        let mut catalog = RegionCatalog::new();
        catalog
            .seed(vec![
                Region::new("US", "United States", RegionType::Country),
                Region::new("GA", "Georgia", RegionType::State),
                Region::new("GA-FULTON", "Fulton County", RegionType::County),
                Region::new("GA-DEKALB", "DeKalb County", RegionType::County),
                Region::new("GA-COBB", "Cobb County", RegionType::County),
                Region::new("GA-GWINNETT", "Gwinnett County", RegionType::County),
                Region::new("GA-ATLANTA", "Atlanta", RegionType::City),
                Region::new("GA-LAWRENCEVILLE", "Lawrenceville", RegionType::City),
            ])
            .unwrap();

        let mut graph = RegionGraph::new(catalog);
        let part_of = RelationshipKind::PartOf;
        graph.add_edge("GA", "US", part_of, true, 100.0).unwrap();
        graph
            .add_edge("GA-FULTON", "GA", part_of, true, 100.0)
            .unwrap();
        graph
            .add_edge("GA-DEKALB", "GA", part_of, true, 100.0)
            .unwrap();
        graph
            .add_edge("GA-COBB", "GA", part_of, true, 100.0)
            .unwrap();
        graph
            .add_edge("GA-GWINNETT", "GA", part_of, true, 100.0)
            .unwrap();
        graph
            .add_edge("GA-ATLANTA", "GA-FULTON", part_of, true, 90.0)
            .unwrap();
        graph
            .add_edge("GA-ATLANTA", "GA-DEKALB", part_of, false, 9.0)
            .unwrap();
        graph
            .add_edge("GA-ATLANTA", "GA-COBB", part_of, false, 1.0)
            .unwrap();
        graph
            .add_edge("GA-LAWRENCEVILLE", "GA-GWINNETT", part_of, true, 100.0)
            .unwrap();
        graph
    }
}
