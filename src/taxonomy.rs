//! Species name normalization and the species lists that drive per-species reporting.

use crate::{errors::BirdRecordsErr, observation::Observation};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

/// Species names starting with this are never a single species.
pub const UNIDENTIFIED_MARKER: &str = "Unidentified";

/// Seasonal presence of a species in the recording area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisitorStatus {
    /// Arrives in spring, leaves in autumn.
    Summer,
    /// Arrives in autumn, leaves in spring.
    Winter,
}

// The tables as written in a configuration file, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TaxonomyTables {
    ignore: BTreeSet<String>,
    rename: BTreeMap<String, String>,
    summer_visitors: BTreeSet<String>,
    winter_visitors: BTreeSet<String>,
}

/// Lookup tables for one region's taxonomy.
///
/// Matching is exact and case sensitive. Construction checks that every rename target is final,
/// so normalizing an already normalized name never changes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Taxonomy {
    ignore: BTreeSet<String>,
    rename: BTreeMap<String, String>,
    summer_visitors: BTreeSet<String>,
    winter_visitors: BTreeSet<String>,
}

impl Taxonomy {
    /// Build a taxonomy from its tables.
    pub fn new(
        ignore: BTreeSet<String>,
        rename: BTreeMap<String, String>,
        summer_visitors: BTreeSet<String>,
        winter_visitors: BTreeSet<String>,
    ) -> Result<Self, BirdRecordsErr> {
        for (from, to) in rename.iter() {
            if rename.contains_key(to) {
                return Err(BirdRecordsErr::InvalidTaxonomy(format!(
                    "'{}' renames to '{}', which is itself renamed",
                    from, to
                )));
            }
            if ignore.contains(to) {
                return Err(BirdRecordsErr::InvalidTaxonomy(format!(
                    "'{}' renames to '{}', which is ignored",
                    from, to
                )));
            }
            if to.starts_with(UNIDENTIFIED_MARKER) {
                return Err(BirdRecordsErr::InvalidTaxonomy(format!(
                    "'{}' renames to an unidentified taxon '{}'",
                    from, to
                )));
            }
        }

        if let Some(both) = summer_visitors.intersection(&winter_visitors).next() {
            return Err(BirdRecordsErr::InvalidTaxonomy(format!(
                "'{}' is listed as both a summer and a winter visitor",
                both
            )));
        }

        Ok(Taxonomy {
            ignore,
            rename,
            summer_visitors,
            winter_visitors,
        })
    }

    /// Parse a taxonomy from yaml with the keys `ignore`, `rename`, `summer_visitors` and
    /// `winter_visitors`. Missing keys are empty tables.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, BirdRecordsErr> {
        let tables: TaxonomyTables = serde_yaml::from_str(yaml)?;

        Self::new(
            tables.ignore,
            tables.rename,
            tables.summer_visitors,
            tables.winter_visitors,
        )
    }

    /// Load a taxonomy from a yaml file.
    pub fn from_file(path: &dyn AsRef<Path>) -> Result<Self, BirdRecordsErr> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// The taxonomy compiled into the crate.
    pub fn builtin() -> Result<Self, BirdRecordsErr> {
        Self::from_yaml_str(include_str!("taxonomy/default_taxonomy.yaml"))
    }

    /// The canonical name for a species, or `None` if records of it should be dropped.
    pub fn normalize<'a>(&'a self, species: &'a str) -> Option<&'a str> {
        if species.starts_with(UNIDENTIFIED_MARKER) || self.ignore.contains(species) {
            return None;
        }

        Some(
            self.rename
                .get(species)
                .map(String::as_str)
                .unwrap_or(species),
        )
    }

    /// Normalize the species of every observation, dropping the ones that are not wanted.
    ///
    /// Only the species field is read or written.
    pub fn normalize_all(&self, observations: Vec<Observation>) -> Vec<Observation> {
        let before = observations.len();

        let kept: Vec<Observation> = observations
            .into_iter()
            .filter_map(|mut obs| {
                let canonical = self.normalize(&obs.species)?.to_owned();
                obs.species = canonical;
                Some(obs)
            })
            .collect();

        log::debug!(
            "normalized species names, dropped {} of {} records",
            before - kept.len(),
            before
        );

        kept
    }

    /// Seasonal status of a species, if it is a known visitor.
    pub fn visitor_status(&self, species: &str) -> Option<VisitorStatus> {
        if self.summer_visitors.contains(species) {
            Some(VisitorStatus::Summer)
        } else if self.winter_visitors.contains(species) {
            Some(VisitorStatus::Winter)
        } else {
            None
        }
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
