//! # Region Catalog Module
//!
//! ## Purpose
//! Owns region node identity for the jurisdiction graph: a read-mostly table
//! of region records (id, display name, type, geo metadata, external codes)
//! with bulk seeding and idempotent upsert semantics.
//!
//! ## Input/Output Specification
//! - **Input**: Region records from the seed loader or host application
//! - **Output**: Region lookups by id, deterministic iteration by type
//! - **Invariants**: ids are globally unique and immutable; a region's type
//!   is assigned at creation and never changes
//!
//! ## Key Features
//! - Idempotent upsert: identical re-insert is a no-op, same-type attribute
//!   refresh is accepted, type conflicts are rejected
//! - Deterministic iteration order (sorted by id) for stable detection and
//!   reproducible test output
//! - Serde support on all records for seed files and API payloads

use crate::errors::{JurisdictionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Jurisdiction level of a region node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionType {
    Country,
    State,
    County,
    City,
    Tribal,
}

impl RegionType {
    /// Denormalized document field this level is matched against.
    /// Tribal jurisdictions have no flattened column and match on the
    /// document's own region id.
    pub fn filter_field(&self) -> &'static str {
        match self {
            RegionType::Country => "applies_to_country",
            RegionType::State => "applies_to_state",
            RegionType::County => "applies_to_counties",
            RegionType::City => "applies_to_city",
            RegionType::Tribal => "region_id",
        }
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegionType::Country => "COUNTRY",
            RegionType::State => "STATE",
            RegionType::County => "COUNTY",
            RegionType::City => "CITY",
            RegionType::Tribal => "TRIBAL",
        };
        write!(f, "{}", name)
    }
}

/// Optional geographic metadata for a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoMetadata {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Bounding box as a free-form string, matching the source data
    pub bounds: Option<String>,
}

/// Optional external identifiers for a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExternalCodes {
    /// Two-letter state code (e.g. "GA")
    pub state_code: Option<String>,
    /// Federal FIPS code
    pub fips_code: Option<String>,
    /// Census place code (cities)
    pub census_place_code: Option<String>,
}

/// A named jurisdiction node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Stable, globally unique id (e.g. "GA-ATLANTA")
    pub id: String,
    /// Display name (e.g. "Atlanta")
    pub name: String,
    /// Jurisdiction level, fixed at creation
    pub region_type: RegionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<ExternalCodes>,
}

impl Region {
    /// Create a region with no geo metadata or external codes
    pub fn new(id: impl Into<String>, name: impl Into<String>, region_type: RegionType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region_type,
            geo: None,
            codes: None,
        }
    }
}

/// Read-mostly table of region nodes keyed by id
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: BTreeMap<String, Region>,
}

impl RegionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a region by id
    pub fn get(&self, region_id: &str) -> Result<&Region> {
        self.regions
            .get(region_id)
            .ok_or_else(|| JurisdictionError::NotFound {
                region_id: region_id.to_string(),
            })
    }

    /// True when the id is present
    pub fn contains(&self, region_id: &str) -> bool {
        self.regions.contains_key(region_id)
    }

    /// Insert or refresh a region.
    ///
    /// Re-inserting an identical record is a no-op. Re-inserting with the
    /// same type refreshes attributes (name, geo, codes). Re-inserting with a
    /// different type is a conflict and leaves the catalog unchanged.
    pub fn upsert(&mut self, region: Region) -> Result<()> {
        if let Some(existing) = self.regions.get(&region.id) {
            if existing.region_type != region.region_type {
                return Err(JurisdictionError::Conflict {
                    region_id: region.id.clone(),
                    existing: existing.region_type.to_string(),
                    requested: region.region_type.to_string(),
                });
            }
            if *existing == region {
                return Ok(());
            }
            tracing::debug!(region_id = %region.id, "refreshing region attributes");
        }
        self.regions.insert(region.id.clone(), region);
        Ok(())
    }

    /// Bulk pre-population from a seed list. Stops at the first conflict,
    /// leaving already-committed entries in place.
    pub fn seed(&mut self, regions: impl IntoIterator<Item = Region>) -> Result<usize> {
        let mut inserted = 0;
        for region in regions {
            self.upsert(region)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Number of regions in the catalog
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate all regions in id order
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Iterate regions of one type in id order
    pub fn iter_of_type(&self, region_type: RegionType) -> impl Iterator<Item = &Region> {
        self.regions
            .values()
            .filter(move |r| r.region_type == region_type)
    }
}
