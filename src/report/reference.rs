//! Species reference data shown in report section headings.
//!
//! The reference is a CSV file with one row per species, joined to the records on the scientific
//! name. It carries the BOU category, the BTO two letter code, the Scottish conservation status
//! and, optionally, the BOU order used to sort the sections.

use crate::errors::BirdRecordsErr;
use regex::Regex;
use serde::Deserialize;
use std::{collections::HashMap, io::Read, path::Path};
use strum_macros::IntoStaticStr;

/// Shown in place of a value that is missing or not in the expected form.
pub const NOT_AVAILABLE: &str = "na";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReferenceRow {
    #[serde(rename = "Scientific_name")]
    scientific_name: String,
    #[serde(rename = "BOU_category")]
    bou_category: String,
    #[serde(rename = "BTO_Code")]
    bto_code: String,
    #[serde(rename = "Scotland")]
    scotland: String,
    #[serde(rename = "BOU_order")]
    bou_order: Option<u32>,
}

/// Conservation status on the Scottish list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
#[allow(missing_docs)]
pub enum ConservationStatus {
    #[strum(to_string = "Green")]
    Green,
    #[strum(to_string = "Amber")]
    Amber,
    #[strum(to_string = "Red")]
    Red,
    #[strum(to_string = "na")]
    Unknown,
}

impl ConservationStatus {
    /// Read a status from free text such as `Red listed`. The first of Green, Amber and Red found
    /// wins.
    pub fn from_text(text: &str) -> Self {
        if text.contains("Green") {
            ConservationStatus::Green
        } else if text.contains("Amber") {
            ConservationStatus::Amber
        } else if text.contains("Red") {
            ConservationStatus::Red
        } else {
            ConservationStatus::Unknown
        }
    }

    /// Get a static string representation.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }
}

/// Heading details for one species.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesReference {
    /// BOU category as shown, e.g. `A, C`, or `na`.
    pub bou_category: String,
    /// BTO two letter code, or `na`.
    pub bto_code: String,
    /// Scottish conservation status.
    pub conservation: ConservationStatus,
    /// Position in the BOU list.
    pub bou_order: Option<u32>,
}

impl SpeciesReference {
    /// The heading detail line, `<BOU category> / <BTO code> / <status>`.
    pub fn detail_line(&self) -> String {
        format!(
            "{} / {} / {}",
            self.bou_category,
            self.bto_code,
            self.conservation.as_static_str()
        )
    }
}

/// Species reference data keyed by scientific name.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    species: HashMap<String, SpeciesReference>,
}

impl ReferenceTable {
    /// Load a reference CSV file.
    pub fn from_file(path: &dyn AsRef<Path>) -> Result<Self, BirdRecordsErr> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;

        log::info!(
            "loaded reference data for {} species from {}",
            table.len(),
            path.as_ref().display()
        );

        Ok(table)
    }

    /// Load reference data from any CSV source. Rows without a scientific name are skipped and
    /// the first row for a name wins.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BirdRecordsErr> {
        let bto_code = Regex::new(r"^[A-Z][A-Z.]$")?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut species = HashMap::new();
        for row in reader.deserialize() {
            let row: ReferenceRow = row?;
            if row.scientific_name.is_empty() {
                continue;
            }

            let reference = SpeciesReference {
                bou_category: format_bou_category(&row.bou_category),
                bto_code: if bto_code.is_match(&row.bto_code) {
                    row.bto_code
                } else {
                    NOT_AVAILABLE.to_owned()
                },
                conservation: ConservationStatus::from_text(&row.scotland),
                bou_order: row.bou_order,
            };

            species.entry(row.scientific_name).or_insert(reference);
        }

        Ok(ReferenceTable { species })
    }

    /// Reference data for a scientific name.
    pub fn get(&self, scientific_name: &str) -> Option<&SpeciesReference> {
        self.species.get(scientific_name.trim())
    }

    /// Number of species.
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// True if there are no species.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

/// Lay out a BOU category string for a heading.
///
/// Categories after the first are separated by `, ` and category F is dropped, so `ACE` becomes
/// `A, C, E` and `AF` becomes `A`. An empty category is `na`.
pub fn format_bou_category(raw: &str) -> String {
    let mut chars = raw.trim().chars();

    let mut formatted = match chars.next() {
        Some(first) => first.to_string(),
        None => return NOT_AVAILABLE.to_owned(),
    };

    for c in chars {
        if matches!(c, 'B' | 'C' | 'D' | 'E') {
            formatted.push_str(", ");
        }
        if c != 'F' {
            formatted.push(c);
        }
    }

    formatted
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    const REFERENCE: &str = "\
Scientific_name,BOU_category,BTO_Code,Scotland,BOU_order
Hirundo rustica,A,SL,Amber listed,510
Tyto alba,A,BO,Green,230
Phasianus colchicus,CE,PH,Not assessed,
Columba livia,AC,feral,Red,
Hirundo rustica,B,XX,Red,1
,A,ZZ,Red,2
";

    #[test]
    fn test_format_bou_category() {
        assert_eq!(format_bou_category("A"), "A");
        assert_eq!(format_bou_category("AC"), "A, C");
        assert_eq!(format_bou_category("ACE"), "A, C, E");
        assert_eq!(format_bou_category("AF"), "A");
        assert_eq!(format_bou_category("CE*"), "C, E*");
        assert_eq!(format_bou_category(""), "na");
        assert_eq!(format_bou_category("  "), "na");
    }

    #[test]
    fn test_conservation_status() {
        assert_eq!(ConservationStatus::from_text("Red listed"), ConservationStatus::Red);
        assert_eq!(ConservationStatus::from_text("Amber"), ConservationStatus::Amber);
        assert_eq!(ConservationStatus::from_text(""), ConservationStatus::Unknown);
        assert_eq!(ConservationStatus::Unknown.as_static_str(), "na");
    }

    #[test]
    fn test_reference_table() {
        let table = ReferenceTable::from_reader(REFERENCE.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);

        let swallow = table.get("Hirundo rustica").unwrap();
        assert_eq!(swallow.detail_line(), "A / SL / Amber");
        assert_eq!(swallow.bou_order, Some(510));

        let pheasant = table.get("Phasianus colchicus").unwrap();
        assert_eq!(pheasant.detail_line(), "C, E / PH / na");
        assert_eq!(pheasant.bou_order, None);

        let pigeon = table.get("Columba livia").unwrap();
        assert_eq!(pigeon.bto_code, "na");
        assert_eq!(pigeon.detail_line(), "A, C / na / Red");

        assert!(table.get("Turdus merula").is_none());
    }
}
