//! # Jurisdiction Enricher Module
//!
//! ## Purpose
//! Detects a legal document's home region from source-specific signals and
//! decorates the document with a flattened set of applicable-region fields,
//! using the hierarchy resolver. Runs once per document at ingest time.
//!
//! ## Input/Output Specification
//! - **Input**: Raw legal document records (statutes, opinions, ordinances)
//! - **Output**: The document plus a jurisdiction annotation with flattened
//!   `applies_to_*` fields and the display hierarchy
//! - **Detection**: ordered rules, first match wins; unresolvable documents
//!   fall back to the configured default region and the fallback is logged
//!
//! ## Key Features
//! - Pure computation over a borrowed graph snapshot; no network I/O
//! - Multi-county cities flatten to an `applies_to_counties` list plus a
//!   `primary_county` field
//! - Config-driven source mappings, so new states or sources need no code

use crate::catalog::RegionType;
use crate::config::DetectionConfig;
use crate::errors::{JurisdictionError, Result};
use crate::graph::RegionGraph;
use crate::resolver::{ChainLink, HierarchyChain, HierarchyResolver};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw legal document as produced by the fetchers (one JSONL record)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalDocument {
    /// Source identifier (e.g. "GA_CODE", "COURTLISTENER", "MUNICODE")
    pub source: String,
    /// Declared jurisdiction name from the source, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    /// Court code for case-law sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    /// Citation; doubles as the stable document id
    #[serde(default)]
    pub cite: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl LegalDocument {
    /// Stable id for the document: the citation, or a generated uuid when
    /// the source provided none
    pub fn document_id(&self) -> String {
        if self.cite.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            self.cite.clone()
        }
    }
}

/// One level of the display hierarchy stored on an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyEntry {
    pub id: String,
    pub name: String,
    pub region_type: RegionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f32>,
}

/// Flattened jurisdiction fields attached to an enriched document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionAnnotation {
    pub region_type: RegionType,
    pub region_id: String,
    pub region_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to_state: Option<String>,
    /// All county ids the document applies to; several for a multi-county city
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to_counties: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to_city: Option<String>,
    /// Primary resolution path, root first, for display
    pub hierarchy: Vec<HierarchyEntry>,
    pub enriched_at: DateTime<Utc>,
}

/// A document decorated with its jurisdiction annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDocument {
    #[serde(flatten)]
    pub document: LegalDocument,
    pub annotation: JurisdictionAnnotation,
}

/// Stateless enricher borrowing a graph snapshot for the duration of a call
pub struct JurisdictionEnricher<'a> {
    graph: &'a RegionGraph,
    detection: &'a DetectionConfig,
    default_region: &'a str,
}

impl<'a> JurisdictionEnricher<'a> {
    pub fn new(
        graph: &'a RegionGraph,
        detection: &'a DetectionConfig,
        default_region: &'a str,
    ) -> Self {
        Self {
            graph,
            detection,
            default_region,
        }
    }

    /// Detect the document's home region id. Rules are ordered and the first
    /// match wins:
    /// 1. statute source mapped to a single-state jurisdiction
    /// 2. case-law source whose court code maps to a state
    /// 3. municipal source whose declared jurisdiction contains a known
    ///    county or city name (counties checked first, each in id order)
    /// 4. the configured default region (logged as a fallback)
    pub fn detect_region(&self, document: &LegalDocument) -> String {
        if let Some(region) = self.detection.statute_sources.get(&document.source) {
            return region.clone();
        }

        if self.detection.case_law_sources.contains(&document.source) {
            if let Some(court) = &document.court {
                let court = court.to_lowercase();
                for (code, state) in &self.detection.court_state_codes {
                    if court.contains(code.as_str()) {
                        return state.clone();
                    }
                }
            }
        }

        if self.detection.municipal_sources.contains(&document.source) {
            if let Some(jurisdiction) = &document.jurisdiction {
                let jurisdiction = jurisdiction.to_lowercase();
                for region_type in [RegionType::County, RegionType::City] {
                    for region in self.graph.catalog().iter_of_type(region_type) {
                        let name = region.name.to_lowercase();
                        // Sources cite counties both ways ("Gwinnett County"
                        // and bare "Gwinnett"), so match the stripped form
                        let keyword = name.strip_suffix(" county").unwrap_or(&name);
                        if jurisdiction.contains(keyword) {
                            return region.id.clone();
                        }
                    }
                }
            }
        }

        tracing::warn!(
            source = %document.source,
            cite = %document.cite,
            fallback = %self.default_region,
            "could not detect document region, using default"
        );
        self.default_region.to_string()
    }

    /// Enrich a document with its jurisdiction annotation
    pub fn enrich(&self, document: LegalDocument) -> Result<EnrichedDocument> {
        let region_id = self.detect_region(&document);
        let chain = HierarchyResolver::new(self.graph).resolve(&region_id, true)?;
        let annotation = flatten_chain(&chain)?;
        Ok(EnrichedDocument {
            document,
            annotation,
        })
    }
}

/// Flatten a resolved chain into the denormalized annotation fields
fn flatten_chain(chain: &HierarchyChain) -> Result<JurisdictionAnnotation> {
    let leaf = chain.leaf().ok_or_else(|| JurisdictionError::Validation {
        field: "hierarchy".to_string(),
        reason: "chain has no resolvable leaf region".to_string(),
    })?;
    let county_ids = chain.county_ids();

    let hierarchy = chain
        .links
        .iter()
        .filter_map(|link| match link {
            ChainLink::Single { region } => Some(HierarchyEntry {
                id: region.id.clone(),
                name: region.name.clone(),
                region_type: region.region_type,
                is_primary: None,
                coverage: None,
            }),
            ChainLink::Branch { parents } => parents.first().map(|primary| HierarchyEntry {
                id: primary.region.id.clone(),
                name: primary.region.name.clone(),
                region_type: primary.region.region_type,
                is_primary: Some(primary.is_primary),
                coverage: Some(primary.coverage),
            }),
        })
        .collect();

    Ok(JurisdictionAnnotation {
        region_type: leaf.region_type,
        region_id: leaf.id.clone(),
        region_name: leaf.name.clone(),
        applies_to_country: chain.id_at_level(RegionType::Country),
        applies_to_state: chain.id_at_level(RegionType::State),
        applies_to_counties: if county_ids.is_empty() {
            None
        } else {
            Some(county_ids)
        },
        primary_county: chain.primary_county(),
        applies_to_city: chain.id_at_level(RegionType::City),
        hierarchy,
        enriched_at: Utc::now(),
    })
}
