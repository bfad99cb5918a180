//! # Jurisdiction Graph & Filtered-Search Core
//!
//! ## Overview
//! This library implements jurisdiction hierarchy resolution for a legal
//! search system: a directed acyclic region graph (country, state, counties,
//! city, with multi-parent cities) used to expand a single region filter into
//! the full set of jurisdiction identifiers a legal document must match.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `catalog`: region node identity (id, name, type, geo metadata)
//! - `graph`: many-to-many containment edges with primary flags and coverage
//! - `resolver`: upward traversal producing root-to-leaf hierarchy chains
//! - `enrich`: per-document jurisdiction annotation at ingest time
//! - `filter`: disjunctive search-filter construction at query time
//! - `seed`: catalog/graph loading from static JSON seed data
//! - `config`: configuration management and settings
//! - `errors`: centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: region seed data, raw legal documents, query region ids
//! - **Output**: resolved hierarchy chains, jurisdiction annotations, filter
//!   disjunctions for the external vector/metadata search layer
//! - **Performance**: pure in-memory computation, deterministic results
//!
//! ## Usage
//! ```rust,no_run
//! use jurisdiction_search::{seed, FilterBuilder, HierarchyResolver};
//!
//! let graph = seed::load_graph("data/georgia_regions.json").unwrap();
//! let chain = HierarchyResolver::new(&graph)
//!     .resolve("GA-ATLANTA", true)
//!     .unwrap();
//! println!("root: {}", chain.root().unwrap().id);
//!
//! let filter = FilterBuilder::new(&graph).build("GA-ATLANTA", true).unwrap();
//! println!("{} disjuncts", filter.should.len());
//! ```

// Core modules
pub mod catalog;
pub mod config;
pub mod enrich;
pub mod errors;
pub mod filter;
pub mod graph;
pub mod resolver;
pub mod seed;

// Re-exports for convenience
pub use catalog::{Region, RegionCatalog, RegionType};
pub use config::Config;
pub use enrich::{EnrichedDocument, JurisdictionEnricher, LegalDocument};
pub use errors::{JurisdictionError, Result};
pub use filter::{FilterBuilder, MatchCondition, SearchFilter};
pub use graph::{Edge, ParentLink, RegionGraph, RelationshipKind, SharedRegionGraph};
pub use resolver::{ChainLink, HierarchyChain, HierarchyResolver};

/// Stable region identifier (e.g. "GA-ATLANTA")
pub type RegionId = String;
