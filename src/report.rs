//! Per-species sections for the annual report, grouped by season.
//!
//! With a [`ReferenceTable`] each heading also shows the species' BOU category, BTO code and
//! conservation status, and sections are ordered by the BOU list.

use crate::{
    errors::BirdRecordsErr,
    observation::{Observation, Season},
    table_printer::TablePrinter,
};
use chrono::NaiveDate;
use std::{collections::BTreeMap, path::Path};
use strum::IntoEnumIterator;

mod reference;

pub use self::reference::{
    format_bou_category, ConservationStatus, ReferenceTable, SpeciesReference, NOT_AVAILABLE,
};

/// Input column that may carry the BOU order of a record's species.
pub const BOU_ORDER_COLUMN: &str = "BOU order";

/// Date format used in report sections.
pub const SECTION_DATE_FORMAT: &str = "%d %b";

/// One record as shown in a report section.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionRow {
    /// Count as the reader should see it.
    pub count: String,
    /// Place label.
    pub place: String,
    /// Day of the record.
    pub date: NaiveDate,
    /// Free text.
    pub comment: String,
}

/// The records of one species in one season, sorted by date.
#[derive(Clone, Debug, PartialEq)]
pub struct SeasonBlock {
    /// The season.
    pub season: Season,
    /// Records in date order.
    pub rows: Vec<SectionRow>,
}

/// Everything the report says about one species.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesSection {
    /// Canonical species name.
    pub species: String,
    /// Scientific name from the first record that has one.
    pub scientific_name: Option<String>,
    /// Reference data joined on the scientific name.
    pub reference: Option<SpeciesReference>,
    /// Position in the BOU list, from the reference data or else the records.
    pub bou_order: Option<u32>,
    /// Seasons with at least one record, in report order.
    pub seasons: Vec<SeasonBlock>,
}

/// Build report sections, one per species.
///
/// Sections are sorted by BOU order, then by species name. Species without a BOU order come
/// last.
pub fn species_sections(
    observations: &[Observation],
    reference: Option<&ReferenceTable>,
) -> Vec<SpeciesSection> {
    let mut by_species: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        by_species.entry(obs.species.as_str()).or_default().push(obs);
    }

    let mut sections: Vec<SpeciesSection> = by_species
        .into_iter()
        .map(|(species, rows)| {
            let scientific_name = rows.iter().find_map(|obs| obs.scientific_name.clone());
            let reference = reference
                .zip(scientific_name.as_deref())
                .and_then(|(table, sci)| table.get(sci))
                .cloned();
            let bou_order = reference
                .as_ref()
                .and_then(|r| r.bou_order)
                .or_else(|| {
                    rows.iter()
                        .filter_map(|obs| obs.extra(BOU_ORDER_COLUMN))
                        .find_map(|order| order.trim().parse().ok())
                });

            let seasons = Season::iter()
                .filter_map(|season| {
                    let mut in_season: Vec<&Observation> = rows
                        .iter()
                        .copied()
                        .filter(|obs| obs.season() == season)
                        .collect();
                    if in_season.is_empty() {
                        return None;
                    }
                    in_season.sort_by_key(|obs| obs.date);

                    Some(SeasonBlock {
                        season,
                        rows: in_season.into_iter().map(section_row).collect(),
                    })
                })
                .collect();

            SpeciesSection {
                species: species.to_owned(),
                scientific_name,
                reference,
                bou_order,
                seasons,
            }
        })
        .collect();

    sections.sort_by_key(|section| (section.bou_order.is_none(), section.bou_order));
    sections
}

fn section_row(obs: &Observation) -> SectionRow {
    SectionRow {
        count: obs.count_display().into_owned(),
        place: obs.place.clone(),
        date: obs.date,
        comment: obs.comment.clone(),
    }
}

impl SpeciesSection {
    /// The heading line, the species with its scientific name.
    pub fn heading(&self) -> String {
        match self.scientific_name {
            Some(ref sci) => format!("{} ({})", self.species, sci),
            None => self.species.clone(),
        }
    }

    /// The reference detail line, if there is reference data for the species.
    pub fn details(&self) -> Option<String> {
        self.reference.as_ref().map(SpeciesReference::detail_line)
    }

    /// File name for the section, with spaces replaced and slashes removed, prefixed with the BOU
    /// order when it is known.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .species
            .chars()
            .filter(|&c| c != '/')
            .map(|c| if c == ' ' { '_' } else { c })
            .collect();
        match self.bou_order {
            Some(order) => format!("{}-{}.txt", order, stem),
            None => format!("{}.txt", stem),
        }
    }

    /// Render the section as plain text, one table per season.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut text = self.heading();
        text.push('\n');
        if let Some(details) = self.details() {
            text.push_str(&details);
            text.push('\n');
        }

        for block in &self.seasons {
            let dates: Vec<String> = block
                .rows
                .iter()
                .map(|row| row.date.format(SECTION_DATE_FORMAT).to_string())
                .collect();
            let counts: Vec<&str> = block.rows.iter().map(|row| row.count.as_str()).collect();
            let places: Vec<&str> = block.rows.iter().map(|row| row.place.as_str()).collect();
            let comments: Vec<&str> = block.rows.iter().map(|row| row.comment.as_str()).collect();

            let table = TablePrinter::new()
                .with_title(block.season.as_static_str().to_owned())
                .with_column("Count", &counts)
                .with_column("Place", &places)
                .with_column("Date", &dates)
                .with_column("Comment", &comments)
                .render()?;

            text.push('\n');
            text.push_str(&table);
        }

        Ok(text)
    }
}

/// Write every section to its own text file in `dir`. Returns the number of files written.
pub fn write_sections(
    dir: &dyn AsRef<Path>,
    sections: &[SpeciesSection],
) -> Result<usize, BirdRecordsErr> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    for section in sections {
        let text = section
            .render()
            .map_err(|_| BirdRecordsErr::LogicError("unable to format report section"))?;
        std::fs::write(dir.join(section.file_name()), text)?;
    }

    log::info!("wrote {} report sections to {}", sections.len(), dir.display());

    Ok(sections.len())
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use crate::observation::{Count, CountQualifier};
    use tempdir::TempDir;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn observations() -> Vec<Observation> {
        let mut swallow = Observation::new("Swallow", "Farm", "Ann", date(5, 2))
            .with_count(Count::new(12, CountQualifier::AtLeast));
        swallow.scientific_name = Some("Hirundo rustica".to_owned());

        vec![
            Observation::new("Swallow", "Lane", "Ann", date(9, 14)).with_comment("gathering"),
            Observation::new("Swallow", "Pond", "Ann", date(4, 20)),
            swallow,
            Observation::new("Barn Owl", "Barn", "Bob", date(4, 15)),
        ]
    }

    #[test]
    fn test_sections_grouped_and_sorted() {
        let sections = species_sections(&observations(), None);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].species, "Barn Owl");
        assert_eq!(sections[0].seasons.len(), 1);
        assert_eq!(sections[0].seasons[0].season, Season::WinterSpring);

        let swallow = &sections[1];
        assert_eq!(swallow.heading(), "Swallow (Hirundo rustica)");
        let seasons: Vec<Season> = swallow.seasons.iter().map(|b| b.season).collect();
        assert_eq!(seasons, vec![Season::Summer, Season::AutumnWinter]);

        let summer: Vec<&str> = swallow.seasons[0]
            .rows
            .iter()
            .map(|r| r.place.as_str())
            .collect();
        assert_eq!(summer, vec!["Pond", "Farm"]);
        assert_eq!(swallow.seasons[0].rows[1].count, "12+");
    }

    #[test]
    fn test_render_and_write() {
        let sections = species_sections(&observations(), None);
        let text = sections[1].render().unwrap();

        assert!(text.starts_with("Swallow (Hirundo rustica)\n"));
        assert!(text.contains("Summer"));
        assert!(text.contains("20 Apr"));
        assert!(text.contains("gathering"));

        let mut section = SpeciesSection {
            species: "Goshawk/Sparrowhawk sp".to_owned(),
            scientific_name: None,
            reference: None,
            bou_order: None,
            seasons: vec![],
        };
        assert_eq!(section.file_name(), "GoshawkSparrowhawk_sp.txt");
        section.bou_order = Some(214);
        assert_eq!(section.file_name(), "214-GoshawkSparrowhawk_sp.txt");

        let tmp = TempDir::new("bird-records-test-sections").unwrap();
        assert_eq!(write_sections(&tmp.path(), &sections).unwrap(), 2);
        assert!(tmp.path().join("Barn_Owl.txt").exists());
    }

    #[test]
    fn test_reference_headings_and_order() {
        let reference = ReferenceTable::from_reader(
            "Scientific_name,BOU_category,BTO_Code,Scotland,BOU_order\n\
             Hirundo rustica,A,SL,Amber,510\n"
                .as_bytes(),
        )
        .unwrap();

        let mut owl = Observation::new("Barn Owl", "Barn", "Bob", date(4, 15));
        owl.scientific_name = Some("Tyto alba".to_owned());
        owl.extra = vec![(BOU_ORDER_COLUMN.to_owned(), "230".to_owned())];
        let mut obs = observations();
        obs.push(owl);
        obs.push(Observation::new("Wren", "Wood", "Cat", date(6, 1)));

        let sections = species_sections(&obs, Some(&reference));
        let names: Vec<&str> = sections.iter().map(|s| s.species.as_str()).collect();
        assert_eq!(names, vec!["Barn Owl", "Swallow", "Wren"]);

        // Not in the reference data, but the records carry the BOU order.
        assert_eq!(sections[0].bou_order, Some(230));
        assert_eq!(sections[0].details(), None);
        assert_eq!(sections[0].file_name(), "230-Barn_Owl.txt");

        let swallow = &sections[1];
        assert_eq!(swallow.details().as_deref(), Some("A / SL / Amber"));
        assert_eq!(swallow.file_name(), "510-Swallow.txt");
        assert!(swallow
            .render()
            .unwrap()
            .starts_with("Swallow (Hirundo rustica)\nA / SL / Amber\n"));

        assert_eq!(sections[2].bou_order, None);
        assert_eq!(sections[2].file_name(), "Wren.txt");
    }
}
