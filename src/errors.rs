//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the jurisdiction graph core, providing
//! structured error types for catalog, graph, resolver, enrichment, and
//! filter-building failures.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from catalog lookups, graph mutation,
//!   hierarchy traversal, and configuration loading
//! - **Output**: Structured error types with context
//! - **Error Categories**: Catalog, Graph, Traversal, Seed, Configuration
//!
//! ## Key Features
//! - One variant per contract failure in the public API
//! - Write-time (`Cycle`) and read-time (`CycleDetected`) cycle guards kept
//!   distinct so callers can tell a rejected mutation from a corrupted graph
//! - Automatic conversion from common library errors
//! - Category accessor for structured logging

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, JurisdictionError>;

/// Error types for the jurisdiction graph core
#[derive(Debug, Error)]
pub enum JurisdictionError {
    /// A region id referenced by an operation does not exist in the catalog
    #[error("region '{region_id}' not found")]
    NotFound { region_id: String },

    /// An edge endpoint is absent from the catalog
    #[error("edge references unknown region '{region_id}'")]
    UnknownRegion { region_id: String },

    /// An edge between the same (child, parent) pair already exists
    #[error("edge from '{child_id}' to '{parent_id}' already exists")]
    DuplicateEdge { child_id: String, parent_id: String },

    /// Catalog upsert attempted to change the type of an existing region
    #[error("region '{region_id}' already registered as {existing}, cannot re-register as {requested}")]
    Conflict {
        region_id: String,
        existing: String,
        requested: String,
    },

    /// Adding the edge would make the child its own transitive ancestor
    #[error("edge from '{child_id}' to '{parent_id}' would create a cycle")]
    Cycle { child_id: String, parent_id: String },

    /// Traversal revisited a region; the graph violates the acyclic invariant
    #[error("cycle detected during traversal at region '{region_id}'")]
    CycleDetected { region_id: String },

    /// Defensive traversal bound exceeded
    #[error("hierarchy for '{region_id}' exceeds maximum depth of {max_depth}")]
    GraphTooDeep { region_id: String, max_depth: usize },

    /// Validation errors (coverage range, self-edges, duplicate primaries)
    #[error("validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Seed data could not be parsed or applied
    #[error("failed to load seed data from {path}: {details}")]
    SeedParsing { path: String, details: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl JurisdictionError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            JurisdictionError::NotFound { .. } | JurisdictionError::Conflict { .. } => "catalog",
            JurisdictionError::UnknownRegion { .. }
            | JurisdictionError::DuplicateEdge { .. }
            | JurisdictionError::Cycle { .. } => "graph",
            JurisdictionError::CycleDetected { .. } | JurisdictionError::GraphTooDeep { .. } => {
                "traversal"
            }
            JurisdictionError::Config { .. } | JurisdictionError::Toml(_) => "configuration",
            JurisdictionError::SeedParsing { .. } | JurisdictionError::Json(_) => "seed",
            JurisdictionError::Validation { .. } => "validation",
            JurisdictionError::Io(_) => "io",
        }
    }

    /// True when the error indicates bad input rather than a corrupted graph
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            JurisdictionError::CycleDetected { .. } | JurisdictionError::GraphTooDeep { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = JurisdictionError::NotFound {
            region_id: "GA-NOWHERE".to_string(),
        };
        assert_eq!(err.category(), "catalog");

        let err = JurisdictionError::CycleDetected {
            region_id: "GA".to_string(),
        };
        assert_eq!(err.category(), "traversal");
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_seed_parsing_carries_path_context() {
        let err = JurisdictionError::SeedParsing {
            path: "data/georgia_regions.json".to_string(),
            details: "truncated file".to_string(),
        };
        assert!(err.to_string().contains("data/georgia_regions.json"));
        // The path is plain context, not a wrapped error cause
        assert!(std::error::Error::source(&err).is_none());
        assert_eq!(err.category(), "seed");
    }

    #[test]
    fn test_display_includes_ids() {
        let err = JurisdictionError::DuplicateEdge {
            child_id: "GA-ATLANTA".to_string(),
            parent_id: "GA-FULTON".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("GA-ATLANTA"));
        assert!(msg.contains("GA-FULTON"));
    }
}
