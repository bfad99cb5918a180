//! # Seed Loader Module
//!
//! ## Purpose
//! Loads the region catalog and relationship graph from a static JSON seed
//! file at process startup. The file layout matches the source data shipped
//! with the original ingestion scripts: a `regions` array and a
//! `relationships` array.
//!
//! ## Input/Output Specification
//! - **Input**: JSON seed file (path or string)
//! - **Output**: A fully validated, ready-to-query `RegionGraph`
//! - **Ordering**: regions are committed before edges so edge validation
//!   always sees the full catalog
//!
//! ## Usage
//! ```rust,no_run
//! use jurisdiction_search::seed::SeedFile;
//!
//! let graph = SeedFile::from_path("data/georgia_regions.json")
//!     .unwrap()
//!     .build_graph()
//!     .unwrap();
//! ```

use crate::catalog::{ExternalCodes, GeoMetadata, Region, RegionCatalog, RegionType};
use crate::errors::{JurisdictionError, Result};
use crate::graph::{RegionGraph, RelationshipKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One region record in a seed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRegion {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub region_type: RegionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fips_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub census_place_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
}

/// One relationship record in a seed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRelationship {
    pub child_id: String,
    pub parent_id: String,
    #[serde(default)]
    pub relationship_type: RelationshipKind,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default = "default_coverage")]
    pub coverage_percentage: f32,
}

fn default_coverage() -> f32 {
    100.0
}

/// Parsed seed file: regions plus the edges between them
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedFile {
    #[serde(default)]
    pub regions: Vec<SeedRegion>,
    #[serde(default)]
    pub relationships: Vec<SeedRelationship>,
}

impl SeedFile {
    /// Parse a seed file from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| JurisdictionError::SeedParsing {
            path: "<string>".to_string(),
            details: e.to_string(),
        })
    }

    /// Parse a seed file from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| JurisdictionError::SeedParsing {
            path: format!("{:?}", path),
            details: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| JurisdictionError::SeedParsing {
            path: format!("{:?}", path),
            details: e.to_string(),
        })
    }

    /// Build a validated graph from the parsed records. Regions are loaded
    /// first, then edges, so every edge check runs against the full catalog.
    pub fn build_graph(&self) -> Result<RegionGraph> {
        let mut catalog = RegionCatalog::new();
        for seed in &self.regions {
            catalog.upsert(seed.to_region())?;
        }

        let mut graph = RegionGraph::new(catalog);
        for rel in &self.relationships {
            graph.add_edge(
                &rel.child_id,
                &rel.parent_id,
                rel.relationship_type,
                rel.is_primary,
                rel.coverage_percentage,
            )?;
        }

        tracing::info!(
            regions = graph.catalog().len(),
            edges = graph.edge_count(),
            "region graph loaded from seed data"
        );
        Ok(graph)
    }
}

impl SeedRegion {
    fn to_region(&self) -> Region {
        let geo = if self.latitude.is_some() || self.longitude.is_some() || self.bounds.is_some() {
            Some(GeoMetadata {
                latitude: self.latitude,
                longitude: self.longitude,
                bounds: self.bounds.clone(),
            })
        } else {
            None
        };

        let codes = if self.state_code.is_some()
            || self.fips_code.is_some()
            || self.census_place_code.is_some()
        {
            Some(ExternalCodes {
                state_code: self.state_code.clone(),
                fips_code: self.fips_code.clone(),
                census_place_code: self.census_place_code.clone(),
            })
        } else {
            None
        };

        Region {
            id: self.id.clone(),
            name: self.name.clone(),
            region_type: self.region_type,
            geo,
            codes,
        }
    }
}

/// Convenience wrapper: parse the seed file at `path` and build the graph
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<RegionGraph> {
    SeedFile::from_path(path)?.build_graph()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::HierarchyResolver;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "regions": [
            {"id": "US", "name": "United States", "type": "COUNTRY"},
            {"id": "GA", "name": "Georgia", "type": "STATE", "state_code": "GA", "fips_code": "13"},
            {"id": "GA-GWINNETT", "name": "Gwinnett County", "type": "COUNTY",
             "latitude": 33.96, "longitude": -84.02},
            {"id": "GA-LAWRENCEVILLE", "name": "Lawrenceville", "type": "CITY"}
        ],
        "relationships": [
            {"child_id": "GA", "parent_id": "US", "is_primary": true},
            {"child_id": "GA-GWINNETT", "parent_id": "GA", "is_primary": true},
            {"child_id": "GA-LAWRENCEVILLE", "parent_id": "GA-GWINNETT",
             "relationship_type": "part_of", "is_primary": true, "coverage_percentage": 100.0}
        ]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let graph = SeedFile::from_json_str(SAMPLE).unwrap().build_graph().unwrap();
        assert_eq!(graph.catalog().len(), 4);
        assert_eq!(graph.edge_count(), 3);

        let georgia = graph.catalog().get("GA").unwrap();
        assert_eq!(
            georgia.codes.as_ref().unwrap().fips_code.as_deref(),
            Some("13")
        );
        let gwinnett = graph.catalog().get("GA-GWINNETT").unwrap();
        assert_eq!(gwinnett.geo.as_ref().unwrap().latitude, Some(33.96));
    }

    #[test]
    fn test_defaults_applied_to_relationships() {
        let seed = SeedFile::from_json_str(SAMPLE).unwrap();
        let first = &seed.relationships[0];
        assert_eq!(first.relationship_type, RelationshipKind::PartOf);
        assert_eq!(first.coverage_percentage, 100.0);
    }

    #[test]
    fn test_built_graph_resolves() {
        let graph = SeedFile::from_json_str(SAMPLE).unwrap().build_graph().unwrap();
        let chain = HierarchyResolver::new(&graph)
            .resolve("GA-LAWRENCEVILLE", true)
            .unwrap();
        assert_eq!(chain.root().unwrap().id, "US");
        assert_eq!(chain.links.len(), 4);
    }

    #[test]
    fn test_edge_to_missing_region_fails() {
        let json = r#"{
            "regions": [{"id": "GA", "name": "Georgia", "type": "STATE"}],
            "relationships": [{"child_id": "GA", "parent_id": "US"}]
        }"#;
        let err = SeedFile::from_json_str(json)
            .unwrap()
            .build_graph()
            .unwrap_err();
        assert!(matches!(err, JurisdictionError::UnknownRegion { .. }));
    }

    #[test]
    fn test_malformed_json_is_seed_parsing_error() {
        let err = SeedFile::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, JurisdictionError::SeedParsing { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let graph = load_graph(file.path()).unwrap();
        assert_eq!(graph.catalog().len(), 4);
    }

    #[test]
    fn test_bundled_georgia_seed_parses() {
        let seed = SeedFile::from_json_str(include_str!("../data/georgia_regions.json")).unwrap();
        let graph = seed.build_graph().unwrap();

        let chain = HierarchyResolver::new(&graph)
            .resolve("GA-ATLANTA", true)
            .unwrap();
        assert_eq!(
            chain.county_ids(),
            vec!["GA-FULTON", "GA-DEKALB", "GA-COBB"]
        );
        assert_eq!(chain.primary_county().as_deref(), Some("GA-FULTON"));
    }
}
