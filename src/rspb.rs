//! Convert RSPB reserve exports to the BirdTrack upload layout.
//!
//! An export mixes two kinds of record. ARM survey records count territories or breeding pairs
//! over a whole season and carry no date of their own. Incidental records are single sightings.
//! The two are converted with different rules and kept apart in the output.

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    errors::BirdRecordsErr,
    observation::{parse_date, Count, Observation, DATE_FORMAT},
    table::Table,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::{collections::BTreeSet, io::Read, path::Path, str::FromStr};

mod categories;

pub use self::categories::{Activity, CountType, CountUnit};

/// Columns of a BirdTrack upload file.
pub const UPLOAD_COLUMNS: [&str; 13] = [
    "Species",
    "Count",
    "Place",
    "Latitude",
    "Longitude",
    "Date",
    "Breeding evidence",
    "Comment",
    "Observer",
    "Sensitive",
    "Activity",
    "Age and plumage",
    "Source",
];

const ARM_DATASET_MARKER: &str = "ARM Species Records";

/// One row of an RSPB export. Columns that are missing from the export are empty.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RspbRow {
    #[serde(rename = "Observation ID")]
    pub obs_id: String,
    #[serde(rename = "Dataset")]
    pub dataset: String,
    #[serde(rename = "Common Name")]
    pub common_name: String,
    #[serde(rename = "Observer")]
    pub observer: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "Primary Count")]
    pub primary_count: String,
    #[serde(rename = "Primary Count Type")]
    pub primary_count_type: String,
    #[serde(rename = "Primary Count Unit")]
    pub primary_count_unit: Option<String>,
    #[serde(rename = "Primary Count Comment")]
    pub primary_count_comment: Option<String>,
    #[serde(rename = "Feature")]
    pub feature: Option<String>,
    #[serde(rename = "Feature Types")]
    pub feature_types: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Comments")]
    pub comments: Option<String>,
    #[serde(rename = "Activity")]
    pub activity: Option<String>,
    #[serde(rename = "Sensitivity")]
    pub sensitivity: Option<String>,
    #[serde(rename = "Chicks Min")]
    pub chicks_min: Option<String>,
    #[serde(rename = "Chicks Max")]
    pub chicks_max: Option<String>,
    #[serde(rename = "Chicks Present")]
    pub chicks_present: Option<String>,
    #[serde(rename = "Fledged Min")]
    pub fledged_min: Option<String>,
    #[serde(rename = "Fledged Max")]
    pub fledged_max: Option<String>,
    #[serde(rename = "Fledged Present")]
    pub fledged_present: Option<String>,
    #[serde(rename = "AssCount Count Unit")]
    pub ass_count_unit: Option<String>,
    #[serde(rename = "AssCount Count Value")]
    pub ass_count_value: Option<String>,
    #[serde(rename = "AssCount Breeding Status Code")]
    pub ass_count_breeding_status: Option<String>,
    #[serde(rename = "AssCount Activity Type Code")]
    pub ass_count_activity_type: Option<String>,
}

impl RspbRow {
    /// True for ARM survey records.
    pub fn is_arm(&self) -> bool {
        self.dataset.contains(ARM_DATASET_MARKER)
    }

    fn count_unit(&self) -> Option<CountUnit> {
        self.primary_count_unit.as_deref().map(CountUnit::from)
    }

    fn activity(&self) -> Option<Activity> {
        self.activity.as_deref().map(Activity::from)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ArmSpeciesLists {
    residents: BTreeSet<String>,
    migrants: BTreeSet<String>,
}

/// Species counted in ARM surveys, split by when they are present.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArmSpecies {
    residents: BTreeSet<String>,
    migrants: BTreeSet<String>,
}

impl ArmSpecies {
    /// Parse the lists from yaml with the keys `residents` and `migrants`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, BirdRecordsErr> {
        let ArmSpeciesLists {
            residents,
            migrants,
        } = serde_yaml::from_str(yaml)?;

        Ok(ArmSpecies {
            residents,
            migrants,
        })
    }

    /// Load the lists from a yaml file.
    pub fn from_file(path: &dyn AsRef<Path>) -> Result<Self, BirdRecordsErr> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// The lists compiled into the crate.
    pub fn builtin() -> Result<Self, BirdRecordsErr> {
        Self::from_yaml_str(include_str!("rspb/arm_species.yaml"))
    }

    /// The date given to a survey record of `species`: 15 April for residents and 1 June for
    /// migrants.
    pub fn survey_date(&self, species: &str, year: i32) -> Option<NaiveDate> {
        if self.residents.contains(species) {
            NaiveDate::from_ymd_opt(year, 4, 15)
        } else if self.migrants.contains(species) {
            NaiveDate::from_ymd_opt(year, 6, 1)
        } else {
            None
        }
    }
}

/// Observations converted from one export, ARM and incidental records apart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvertedExport {
    /// ARM survey records.
    pub arm: Vec<Observation>,
    /// Incidental records.
    pub incidental: Vec<Observation>,
}

/// Converts export rows to observations.
#[derive(Debug)]
pub struct RspbConverter {
    arm_species: ArmSpecies,
    year: i32,
    reserve: Regex,
    numbered_feature: Regex,
}

impl RspbConverter {
    /// Create a converter that dates ARM records in `year`.
    pub fn new(arm_species: ArmSpecies, year: i32) -> Result<Self, BirdRecordsErr> {
        Ok(RspbConverter {
            arm_species,
            year,
            reserve: Regex::new(r",?\s*([\w']*\s*\w*\sRSPB)")?,
            numbered_feature: Regex::new(r"^\d+[a-z]?$")?,
        })
    }

    /// Convert every row, reporting and skipping the ones that cannot be converted.
    pub fn convert_export(
        &self,
        rows: &[RspbRow],
        diagnostics: &mut Diagnostics,
    ) -> ConvertedExport {
        let mut converted = ConvertedExport::default();

        for row in rows {
            match self.convert(row) {
                Ok(obs) if row.is_arm() => converted.arm.push(obs),
                Ok(obs) => converted.incidental.push(obs),
                Err(err) => diagnostics.record(Diagnostic::RejectedRow {
                    location: format!("observation {}", row.obs_id),
                    reason: err.to_string(),
                }),
            }
        }

        log::info!(
            "converted {} ARM and {} incidental records",
            converted.arm.len(),
            converted.incidental.len()
        );

        converted
    }

    /// Convert one row. The observation id becomes the source id.
    pub fn convert(&self, row: &RspbRow) -> Result<Observation, BirdRecordsErr> {
        let reject = |reason: String| BirdRecordsErr::InvalidRspbRow {
            obs_id: row.obs_id.clone(),
            reason,
        };

        let species = row.common_name.trim();
        if species.is_empty() {
            return Err(reject("no species".to_owned()));
        }

        let count_text = if row.is_arm() {
            arm_count(&row.primary_count)
        } else {
            CountType::from(row.primary_count_type.as_str())
                .birdtrack_count(&row.primary_count)
                .ok_or_else(|| {
                    reject(format!("unknown count type '{}'", row.primary_count_type))
                })?
        };
        let count = Count::from_str(&count_text)
            .map_err(|_| reject(format!("count '{}' is not a number", row.primary_count)))?;

        let date = if row.is_arm() {
            self.arm_species
                .survey_date(species, self.year)
                .ok_or_else(|| {
                    reject(format!("ARM species {} is not a resident or migrant", species))
                })?
        } else {
            parse_date(&row.start_date).map_err(|_| {
                reject(format!("start date '{}' could not be read", row.start_date))
            })?
        };

        let place = self
            .place(row)
            .ok_or_else(|| reject(format!("no reserve name in dataset '{}'", row.dataset)))?;

        let mut obs = Observation::new(species, place, observer(&row.observer), date)
            .with_comment(comments(row).join("; "))
            .with_source_id(row.obs_id.clone());
        obs.count = Some(count);
        obs.count_text = count_text;

        if let Some(code) = breeding_code(row) {
            obs = obs.with_breeding_code(code);
        }

        let sensitive = match row.sensitivity.as_deref() {
            Some("RESTRICTED") | Some("SENSITIVE") => "Y",
            _ => "",
        };
        let activity = row
            .activity()
            .and_then(|activity| activity.activity_code())
            .map(|code| code.to_string())
            .unwrap_or_default();
        let age_and_plumage = row
            .count_unit()
            .and_then(|unit| unit.sex())
            .map(|sex| format!(r#"[{{"SEX":"{}","COUNT":"{}"}}]"#, sex, obs.count_text))
            .unwrap_or_default();

        obs.extra = vec![
            ("Latitude".to_owned(), row.latitude.clone().unwrap_or_default()),
            ("Longitude".to_owned(), row.longitude.clone().unwrap_or_default()),
            ("Sensitive".to_owned(), sensitive.to_owned()),
            ("Activity".to_owned(), activity),
            ("Age and plumage".to_owned(), age_and_plumage),
            ("Source".to_owned(), "RSPB".to_owned()),
        ];

        Ok(obs)
    }

    // The reserve name from the dataset label, then the feature and location for incidental
    // records or the feature types for ARM records.
    fn place(&self, row: &RspbRow) -> Option<String> {
        let mut place = self
            .reserve
            .captures(&row.dataset)?
            .get(1)?
            .as_str()
            .trim()
            .to_owned();

        if row.is_arm() {
            if let Some(types) = non_empty(&row.feature_types) {
                place.push_str(" - ");
                place.push_str(types);
            }
        } else {
            let feature = non_empty(&row.feature)
                .filter(|f| !self.numbered_feature.is_match(f) && *f != "DO NOT USE");
            if let Some(feature) = feature {
                place.push_str(", ");
                place.push_str(feature);
            }
            if let Some(location) = non_empty(&row.location) {
                place.push_str(", ");
                place.push_str(location);
            }
        }

        Some(place)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|val| !val.is_empty())
}

fn is_positive(field: &Option<String>) -> bool {
    non_empty(field)
        .and_then(|val| val.parse::<f64>().ok())
        .map_or(false, |val| val > 0.0)
}

// Survey counts are lower bounds. `Y` means at least a pair.
fn arm_count(primary_count: &str) -> String {
    match primary_count.trim() {
        "Y" => "2+".to_owned(),
        count => format!("{}+", count),
    }
}

fn observer(name: &str) -> &str {
    let name = name.trim();
    if name == "Visitor" || name == "Unknown" || name.starts_with("RSPB") {
        "RSPB"
    } else {
        name
    }
}

// Fledged young and chicks are the strongest evidence. Otherwise ARM records are coded from the
// count unit and incidental records from the activity.
fn breeding_code(row: &RspbRow) -> Option<u8> {
    if is_positive(&row.fledged_max) {
        Some(12)
    } else if is_positive(&row.chicks_max) {
        Some(16)
    } else if row.is_arm() {
        row.count_unit().and_then(|unit| unit.breeding_code())
    } else {
        row.activity().and_then(|activity| activity.breeding_code())
    }
}

fn comments(row: &RspbRow) -> Vec<String> {
    let mut comments: Vec<String> = vec![];
    let status = non_empty(&row.status).filter(|&status| status != "Unknown");

    if row.is_arm() {
        if row.count_unit() == Some(CountUnit::Pair) {
            let pairs = row.primary_count.trim();
            if pairs == "1" {
                comments.push("1 Pair".to_owned());
            } else {
                comments.push(format!("{} Pairs", pairs));
            }
        } else if let Some(status) = status {
            comments.push(status.to_owned());
        }
    } else {
        comments.extend(non_empty(&row.primary_count_comment).map(str::to_owned));
        comments.extend(status.map(str::to_owned));
    }

    comments.extend(non_empty(&row.comments).map(str::to_owned));
    comments.extend(
        non_empty(&row.activity)
            .filter(|&activity| activity != "Not recorded")
            .map(str::to_owned),
    );

    let labelled = [
        ("Chicks Min", &row.chicks_min),
        ("Chicks Max", &row.chicks_max),
        ("Chicks Present", &row.chicks_present),
        ("Fledged Min", &row.fledged_min),
        ("Fledged Max", &row.fledged_max),
        ("Fledged Present", &row.fledged_present),
    ];
    for (label, field) in labelled.iter() {
        if let Some(val) = non_empty(field) {
            comments.push(format!("{}: {}", label, val));
        }
    }

    if let Some(unit) = non_empty(&row.ass_count_unit) {
        comments.push(format!(
            "AssCount Count: {} = {}",
            unit,
            non_empty(&row.ass_count_value).unwrap_or("")
        ));
    }
    if let Some(code) = non_empty(&row.ass_count_breeding_status) {
        comments.push(format!("AssCount Breeding Status Code: {}", code));
    }
    if let Some(code) = non_empty(&row.ass_count_activity_type).filter(|&c| c != "Not recorded") {
        comments.push(format!("AssCount Activity Type Code: {}", code));
    }

    if let Some(unit) = non_empty(&row.primary_count_unit) {
        if row.count_unit().and_then(|u| u.sex()).is_some() {
            comments.push(format!("Count is of {}", unit));
        }
    }

    comments
}

/// Read the rows of an RSPB export saved as CSV.
pub fn read_export(path: &dyn AsRef<Path>) -> Result<Vec<RspbRow>, BirdRecordsErr> {
    let file = std::fs::File::open(path)?;
    let rows = read_export_from(file)?;

    log::info!("read {} rows from {}", rows.len(), path.as_ref().display());

    Ok(rows)
}

/// Read the rows of an RSPB export from any CSV source.
pub fn read_export_from<R: Read>(reader: R) -> Result<Vec<RspbRow>, BirdRecordsErr> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows: Vec<RspbRow> = vec![];
    for row in reader.deserialize() {
        let row: RspbRow = row?;
        rows.push(row);
    }

    Ok(rows)
}

/// Lay out observations in the BirdTrack upload format.
pub fn upload_table(name: &str, observations: &[Observation]) -> Table {
    let mut table = Table::new(name, &UPLOAD_COLUMNS);

    for obs in observations {
        let extra = |name: &str| obs.extra(name).unwrap_or("").to_owned();

        table.push_row(vec![
            obs.species.clone(),
            obs.count_display().into_owned(),
            obs.place.clone(),
            extra("Latitude"),
            extra("Longitude"),
            obs.date.format(DATE_FORMAT).to_string(),
            obs.breeding_code
                .map(|code| format!("{:02}", code))
                .unwrap_or_default(),
            obs.comment.clone(),
            obs.observer.clone(),
            extra("Sensitive"),
            extra("Activity"),
            extra("Age and plumage"),
            extra("Source"),
        ]);
    }

    table
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
