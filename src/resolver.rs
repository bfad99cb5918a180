//! # Hierarchy Resolver Module
//!
//! ## Purpose
//! Walks the region graph upward from a single region to produce its full
//! jurisdiction chain, root (country) first. Multi-county cities resolve to a
//! branch element holding every county parent, ordered primary-first.
//!
//! ## Input/Output Specification
//! - **Input**: A region id and an include-all-counties flag
//! - **Output**: `HierarchyChain`, a root-to-leaf sequence of chain links
//! - **Guards**: visited-set cycle detection and a defensive depth bound,
//!   both runtime safety nets behind the write-time graph invariants
//!
//! ## Key Features
//! - Branch links are statically distinguishable from single links, so the
//!   multi-county case cannot be silently collapsed
//! - Primary-parent selection falls back to greatest coverage, then
//!   lexicographic id, making resolution deterministic on any graph
//! - Pure and stateless: identical inputs on an unchanged graph produce
//!   identical chains

use crate::catalog::{Region, RegionType};
use crate::errors::{JurisdictionError, Result};
use crate::graph::{ParentLink, RegionGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Defensive traversal bound; the graph is expected to be 4-5 levels deep
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// One level of a resolved hierarchy chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainLink {
    /// A level with a single region
    Single { region: Region },
    /// A level where the child has several same-type parents (multi-county
    /// city); ordered primary-first, then descending coverage
    Branch { parents: Vec<ParentLink> },
}

impl ChainLink {
    /// The region traversal continues from: the single region, or the
    /// primary (first) parent of a branch. `None` only for a branch with no
    /// parents, which resolution never produces but deserialization can
    pub fn principal(&self) -> Option<&Region> {
        match self {
            ChainLink::Single { region } => Some(region),
            ChainLink::Branch { parents } => parents.first().map(|p| &p.region),
        }
    }

    /// Jurisdiction level of this link
    pub fn region_type(&self) -> Option<RegionType> {
        self.principal().map(|r| r.region_type)
    }
}

/// Root-to-leaf resolution of a region's ancestors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyChain {
    pub links: Vec<ChainLink>,
}

impl HierarchyChain {
    /// Topmost region (expected COUNTRY for a fully connected graph)
    pub fn root(&self) -> Option<&Region> {
        self.links.first().and_then(ChainLink::principal)
    }

    /// The region the chain was resolved for
    pub fn leaf(&self) -> Option<&Region> {
        self.links.last().and_then(ChainLink::principal)
    }

    /// Link at a given jurisdiction level, if present
    pub fn at_level(&self, region_type: RegionType) -> Option<&ChainLink> {
        self.links
            .iter()
            .find(|l| l.region_type() == Some(region_type))
    }

    /// All county ids at the county level (one for a single-county chain,
    /// several for a multi-county branch), primary first
    pub fn county_ids(&self) -> Vec<String> {
        match self.at_level(RegionType::County) {
            Some(ChainLink::Single { region }) => vec![region.id.clone()],
            Some(ChainLink::Branch { parents }) => {
                parents.iter().map(|p| p.region.id.clone()).collect()
            }
            None => Vec::new(),
        }
    }

    /// The primary county id, if the chain has a county level
    pub fn primary_county(&self) -> Option<String> {
        self.id_at_level(RegionType::County)
    }

    /// Region id at a level, taking the principal region of a branch
    pub fn id_at_level(&self, region_type: RegionType) -> Option<String> {
        self.at_level(region_type)
            .and_then(ChainLink::principal)
            .map(|r| r.id.clone())
    }
}

/// Pure resolver over a borrowed graph snapshot
pub struct HierarchyResolver<'a> {
    graph: &'a RegionGraph,
    max_depth: usize,
}

impl<'a> HierarchyResolver<'a> {
    pub fn new(graph: &'a RegionGraph) -> Self {
        Self {
            graph,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the defensive depth bound
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve the jurisdiction chain for a region, root first.
    ///
    /// With `include_all_counties = false`, each level selects one parent:
    /// the primary, falling back to greatest coverage, ties broken by
    /// lexicographic id. With `include_all_counties = true`, a multi-parent
    /// level is kept whole as a `Branch` and traversal continues upward from
    /// the primary parent only (secondary parents share the same state and
    /// country ancestry by construction).
    pub fn resolve(&self, region_id: &str, include_all_counties: bool) -> Result<HierarchyChain> {
        let start = self.graph.catalog().get(region_id)?;

        let mut links: Vec<ChainLink> = vec![ChainLink::Single {
            region: start.clone(),
        }];
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start.id.clone());

        let mut current_id = start.id.clone();
        let mut steps = 0usize;
        loop {
            let parents = self.graph.parents_of(&current_id, None);
            if parents.is_empty() {
                // Root reached; chain is leaf-to-root so far
                links.reverse();
                return Ok(HierarchyChain { links });
            }

            // The bound counts parent steps: a chain of exactly max_depth
            // steps resolves, one more raises.
            steps += 1;
            if steps > self.max_depth {
                return Err(JurisdictionError::GraphTooDeep {
                    region_id: region_id.to_string(),
                    max_depth: self.max_depth,
                });
            }

            // parents_of already orders primary-first, coverage desc, id asc;
            // traversal always continues from the head of the list.
            let selected_type = parents[0].region.region_type;
            let next_id = parents[0].region.id.clone();
            if !visited.insert(next_id.clone()) {
                return Err(JurisdictionError::CycleDetected { region_id: next_id });
            }

            // Branching applies only to same-type parents (multi-county
            // cities); a parent of another type never joins the branch.
            let mut same_type: Vec<ParentLink> = parents
                .into_iter()
                .filter(|p| p.region.region_type == selected_type)
                .collect();

            let link = if same_type.len() > 1 && include_all_counties {
                ChainLink::Branch { parents: same_type }
            } else {
                let head = same_type.swap_remove(0);
                ChainLink::Single {
                    region: head.region,
                }
            };
            links.push(link);
            current_id = next_id;
        }
    }
}
