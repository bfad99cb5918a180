//! # Filter Builder Module
//!
//! ## Purpose
//! Turns a target region into the disjunctive set of match conditions a
//! search filter must OR together so that documents applicable at any level
//! of the region's jurisdiction chain are retrieved: state law matches county
//! queries, county law matches city queries, and so on.
//!
//! ## Input/Output Specification
//! - **Input**: A region id and an include-parents flag
//! - **Output**: `SearchFilter`, an ordered OR-disjunction of conditions over
//!   the flattened `applies_to_*` document fields
//! - **Determinism**: identical inputs always yield identical condition
//!   ordering, so emitted filters are comparable in tests
//!
//! ## Key Features
//! - Multi-county cities expand to a membership test over the full county set
//! - Exact-region mode emits a single own-id condition and never includes
//!   ancestors
//! - SQL rendering for the external query layer

use crate::catalog::RegionType;
use crate::errors::Result;
use crate::graph::RegionGraph;
use crate::resolver::{ChainLink, HierarchyResolver};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field name a document's own region id is stored under
pub const REGION_ID_FIELD: &str = "region_id";

/// A single match condition over one document field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum MatchCondition {
    /// Field equals the value exactly
    Equals { field: String, value: String },
    /// Field (or field list) contains any of the values
    AnyOf { field: String, values: Vec<String> },
}

impl fmt::Display for MatchCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchCondition::Equals { field, value } => write!(f, "{} = {}", field, value),
            MatchCondition::AnyOf { field, values } => {
                write!(f, "{} IN ({})", field, values.join(", "))
            }
        }
    }
}

/// An OR-disjunction of match conditions: a document matches when any
/// condition holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchFilter {
    pub should: Vec<MatchCondition>,
}

impl SearchFilter {
    /// All region ids referenced by the filter, in emission order
    pub fn referenced_ids(&self) -> Vec<&str> {
        self.should
            .iter()
            .flat_map(|c| match c {
                MatchCondition::Equals { value, .. } => std::slice::from_ref(value),
                MatchCondition::AnyOf { values, .. } => values.as_slice(),
            })
            .map(String::as_str)
            .collect()
    }

    /// Render the disjunction as a parameterized SQL where-clause using `?`
    /// placeholders, for the external query layer
    pub fn to_sql(&self) -> (String, Vec<String>) {
        if self.should.is_empty() {
            return ("1=1".to_string(), Vec::new());
        }

        let mut params = Vec::new();
        let clauses: Vec<String> = self
            .should
            .iter()
            .map(|condition| match condition {
                MatchCondition::Equals { field, value } => {
                    params.push(value.clone());
                    format!("({} = ?)", field)
                }
                MatchCondition::AnyOf { field, values } => {
                    let placeholders = vec!["?"; values.len()].join(", ");
                    params.extend(values.iter().cloned());
                    format!("({} IN ({}))", field, placeholders)
                }
            })
            .collect();

        (clauses.join(" OR "), params)
    }
}

/// Builds jurisdiction search filters over a borrowed graph snapshot
pub struct FilterBuilder<'a> {
    graph: &'a RegionGraph,
    max_depth: usize,
}

impl<'a> FilterBuilder<'a> {
    pub fn new(graph: &'a RegionGraph) -> Self {
        Self {
            graph,
            max_depth: crate::resolver::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the filter for a region.
    ///
    /// With `include_parents = false` the filter is a single condition on the
    /// document's own region id. With `include_parents = true` the region's
    /// chain is resolved with all counties and one condition is emitted per
    /// level, root first, followed by the own-id condition — the "inherits
    /// from parent jurisdictions" search semantics.
    pub fn build(&self, region_id: &str, include_parents: bool) -> Result<SearchFilter> {
        // Unknown ids surface as NotFound even in exact-region mode
        self.graph.catalog().get(region_id)?;

        if !include_parents {
            return Ok(SearchFilter {
                should: vec![MatchCondition::Equals {
                    field: REGION_ID_FIELD.to_string(),
                    value: region_id.to_string(),
                }],
            });
        }

        let chain = HierarchyResolver::new(self.graph)
            .with_max_depth(self.max_depth)
            .resolve(region_id, true)?;

        let mut should = Vec::with_capacity(chain.links.len() + 1);
        for link in &chain.links {
            match link {
                ChainLink::Single { region } => {
                    let condition = match region.region_type {
                        // County levels are always a membership test over the
                        // flattened county list
                        RegionType::County => MatchCondition::AnyOf {
                            field: region.region_type.filter_field().to_string(),
                            values: vec![region.id.clone()],
                        },
                        _ => MatchCondition::Equals {
                            field: region.region_type.filter_field().to_string(),
                            value: region.id.clone(),
                        },
                    };
                    should.push(condition);
                }
                ChainLink::Branch { parents } => {
                    if let Some(head) = parents.first() {
                        should.push(MatchCondition::AnyOf {
                            field: head.region.region_type.filter_field().to_string(),
                            values: parents.iter().map(|p| p.region.id.clone()).collect(),
                        });
                    }
                }
            }
        }

        should.push(MatchCondition::Equals {
            field: REGION_ID_FIELD.to_string(),
            value: region_id.to_string(),
        });

        Ok(SearchFilter { should })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JurisdictionError;
    use crate::graph::fixtures::georgia_graph;

    #[test]
    fn test_exact_region_mode_has_single_condition() {
        let graph = georgia_graph();
        let filter = FilterBuilder::new(&graph).build("GA-ATLANTA", false).unwrap();
        assert_eq!(
            filter.should,
            vec![MatchCondition::Equals {
                field: "region_id".to_string(),
                value: "GA-ATLANTA".to_string(),
            }]
        );
        // Never includes ancestors
        assert!(!filter.referenced_ids().contains(&"GA"));
    }

    #[test]
    fn test_unknown_region_not_found() {
        let graph = georgia_graph();
        let err = FilterBuilder::new(&graph).build("GA-MACON", false).unwrap_err();
        assert!(matches!(err, JurisdictionError::NotFound { .. }));
    }

    #[test]
    fn test_multi_county_city_filter() {
        let graph = georgia_graph();
        let filter = FilterBuilder::new(&graph).build("GA-ATLANTA", true).unwrap();

        assert_eq!(
            filter.should,
            vec![
                MatchCondition::Equals {
                    field: "applies_to_country".to_string(),
                    value: "US".to_string(),
                },
                MatchCondition::Equals {
                    field: "applies_to_state".to_string(),
                    value: "GA".to_string(),
                },
                MatchCondition::AnyOf {
                    field: "applies_to_counties".to_string(),
                    values: vec![
                        "GA-FULTON".to_string(),
                        "GA-DEKALB".to_string(),
                        "GA-COBB".to_string(),
                    ],
                },
                MatchCondition::Equals {
                    field: "applies_to_city".to_string(),
                    value: "GA-ATLANTA".to_string(),
                },
                MatchCondition::Equals {
                    field: "region_id".to_string(),
                    value: "GA-ATLANTA".to_string(),
                },
            ]
        );

        let ids = filter.referenced_ids();
        for expected in ["US", "GA", "GA-FULTON", "GA-DEKALB", "GA-COBB", "GA-ATLANTA"] {
            assert!(ids.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_parent_mode_includes_country_root() {
        let graph = georgia_graph();
        for region in ["GA", "GA-GWINNETT", "GA-LAWRENCEVILLE", "GA-ATLANTA"] {
            let filter = FilterBuilder::new(&graph).build(region, true).unwrap();
            assert!(
                filter.referenced_ids().contains(&"US"),
                "country root missing for {}",
                region
            );
        }
    }

    #[test]
    fn test_single_county_city_filter() {
        let graph = georgia_graph();
        let filter = FilterBuilder::new(&graph)
            .build("GA-LAWRENCEVILLE", true)
            .unwrap();

        assert!(filter.should.contains(&MatchCondition::AnyOf {
            field: "applies_to_counties".to_string(),
            values: vec!["GA-GWINNETT".to_string()],
        }));
        assert_eq!(filter.should.len(), 5);
    }

    #[test]
    fn test_country_filter() {
        let graph = georgia_graph();
        let filter = FilterBuilder::new(&graph).build("US", true).unwrap();
        assert_eq!(
            filter.should,
            vec![
                MatchCondition::Equals {
                    field: "applies_to_country".to_string(),
                    value: "US".to_string(),
                },
                MatchCondition::Equals {
                    field: "region_id".to_string(),
                    value: "US".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_filter_is_deterministic() {
        let graph = georgia_graph();
        let builder = FilterBuilder::new(&graph);
        let a = builder.build("GA-ATLANTA", true).unwrap();
        let b = builder.build("GA-ATLANTA", true).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_sql(), b.to_sql());
    }

    #[test]
    fn test_sql_rendering() {
        let graph = georgia_graph();
        let filter = FilterBuilder::new(&graph).build("GA-ATLANTA", true).unwrap();
        let (clause, params) = filter.to_sql();

        assert_eq!(
            clause,
            "(applies_to_country = ?) OR (applies_to_state = ?) \
             OR (applies_to_counties IN (?, ?, ?)) OR (applies_to_city = ?) \
             OR (region_id = ?)"
        );
        assert_eq!(
            params,
            vec![
                "US",
                "GA",
                "GA-FULTON",
                "GA-DEKALB",
                "GA-COBB",
                "GA-ATLANTA",
                "GA-ATLANTA"
            ]
        );
    }

    #[test]
    fn test_empty_filter_sql() {
        let filter = SearchFilter::default();
        assert_eq!(filter.to_sql(), ("1=1".to_string(), Vec::new()));
    }
}
