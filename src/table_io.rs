//! Reading observations from, and writing tables to, CSV files.

use crate::{
    config::{BreedingCodeScheme, ColumnMap, MalformedCountPolicy, RunOptions},
    diagnostics::{Diagnostic, Diagnostics},
    ebird::translate_breeding_code,
    errors::BirdRecordsErr,
    observation::{parse_date, BreedingEvidence, Count, Observation, DATE_FORMAT},
    table::Table,
};
use csv::StringRecord;
use std::{
    io::{Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Columns of a written record set, before any carried through columns.
pub const OBSERVATION_COLUMNS: [&str; 10] = [
    "Species",
    "Scientific name",
    "Count",
    "Place",
    "Date",
    "Observer",
    "1km Grid Ref",
    "Breeding evidence",
    "Season",
    "Comment",
];

// Where each bound field is in a record.
struct HeaderIndex {
    species: usize,
    place: usize,
    observer: usize,
    date: usize,
    count: usize,
    grid_ref: usize,
    breeding_code: usize,
    scientific_name: Option<usize>,
    comment: Option<usize>,
    source_id: Option<usize>,
    extra: Vec<(String, usize)>,
}

impl HeaderIndex {
    fn new(headers: &StringRecord, columns: &ColumnMap) -> Result<Self, BirdRecordsErr> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| BirdRecordsErr::MissingColumn(name.to_owned()))
        };

        let source_id = match columns.source_id.as_deref() {
            Some(name) => Some(required(name)?),
            None => None,
        };

        let mut index = HeaderIndex {
            species: required(columns.species.as_str())?,
            place: required(columns.place.as_str())?,
            observer: required(columns.observer.as_str())?,
            date: required(columns.date.as_str())?,
            count: required(columns.count.as_str())?,
            grid_ref: required(columns.grid_ref.as_str())?,
            breeding_code: required(columns.breeding_code.as_str())?,
            scientific_name: columns.scientific_name.as_deref().and_then(find),
            comment: columns.comment.as_deref().and_then(find),
            source_id,
            extra: vec![],
        };

        let bound = index.bound();
        index.extra = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| !bound.contains(idx) && !name.is_empty())
            .map(|(idx, name)| (name.to_owned(), idx))
            .collect();

        Ok(index)
    }

    fn bound(&self) -> Vec<usize> {
        let mut bound = vec![
            self.species,
            self.place,
            self.observer,
            self.date,
            self.count,
            self.grid_ref,
            self.breeding_code,
        ];
        bound.extend(self.scientific_name);
        bound.extend(self.comment);
        bound.extend(self.source_id);
        bound
    }
}

/// Read the observations in a CSV file.
///
/// Rows with an unreadable date are left out and reported. Malformed counts are reported or
/// abort the read, depending on `options`. Rows without a source id column get one made from the
/// file stem and line number.
pub fn read_observations(
    path: &dyn AsRef<Path>,
    columns: &ColumnMap,
    options: &RunOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Observation>, BirdRecordsErr> {
    let path = path.as_ref();
    let source_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("input");

    let file = std::fs::File::open(path)?;
    let observations = read_observations_from(file, source_name, columns, options, diagnostics)?;

    log::info!(
        "read {} records from {}",
        observations.len(),
        path.display()
    );

    Ok(observations)
}

/// Read observations from any CSV source. `source_name` prefixes locations in diagnostics and
/// made up source ids.
pub fn read_observations_from<R: Read>(
    reader: R,
    source_name: &str,
    columns: &ColumnMap,
    options: &RunOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Observation>, BirdRecordsErr> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let index = HeaderIndex::new(&headers, columns)?;

    let mut observations = vec![];
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|pos| pos.line())
            .unwrap_or(row as u64 + 2);
        let location = format!("{}:{}", source_name, line);

        if let Some(obs) = parse_record(&record, &index, &location, options, diagnostics)? {
            observations.push(obs);
        }
    }

    Ok(observations)
}

fn parse_record(
    record: &StringRecord,
    index: &HeaderIndex,
    location: &str,
    options: &RunOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Option<Observation>, BirdRecordsErr> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");
    let optional = |idx: Option<usize>| {
        idx.map(cell)
            .filter(|val| !val.is_empty())
            .map(str::to_owned)
    };

    let species = cell(index.species);
    if species.is_empty() {
        diagnostics.record(Diagnostic::RejectedRow {
            location: location.to_owned(),
            reason: "no species".to_owned(),
        });
        return Ok(None);
    }

    let date_text = cell(index.date);
    let date = match parse_date(date_text) {
        Ok(date) => date,
        Err(_) => {
            diagnostics.record(Diagnostic::MalformedDate {
                location: location.to_owned(),
                value: date_text.to_owned(),
            });
            return Ok(None);
        }
    };

    let count_text = cell(index.count);
    let count = match Count::from_str(count_text) {
        Ok(count) => Some(count),
        Err(_) => match options.malformed_counts {
            MalformedCountPolicy::Skip => {
                diagnostics.record(Diagnostic::MalformedCount {
                    location: location.to_owned(),
                    value: count_text.to_owned(),
                });
                None
            }
            MalformedCountPolicy::Abort => {
                return Err(BirdRecordsErr::AbortedOnMalformedCount {
                    location: location.to_owned(),
                    value: count_text.to_owned(),
                });
            }
        },
    };

    let (breeding, breeding_code) = decode_breeding_cell(
        cell(index.breeding_code),
        options.breeding_codes,
        location,
        diagnostics,
    );

    let source_id = optional(index.source_id).unwrap_or_else(|| location.to_owned());

    Ok(Some(Observation {
        species: species.to_owned(),
        scientific_name: optional(index.scientific_name),
        place: cell(index.place).to_owned(),
        observer: cell(index.observer).to_owned(),
        date,
        count,
        count_text: count_text.to_owned(),
        grid_square: optional(Some(index.grid_ref)),
        breeding,
        breeding_code,
        source_id: Some(source_id),
        comment: optional(index.comment).unwrap_or_default(),
        extra: index
            .extra
            .iter()
            .map(|(name, idx)| (name.clone(), cell(*idx).to_owned()))
            .collect(),
    }))
}

fn decode_breeding_cell(
    text: &str,
    scheme: BreedingCodeScheme,
    location: &str,
    diagnostics: &mut Diagnostics,
) -> (BreedingEvidence, Option<u8>) {
    if text.is_empty() {
        return (BreedingEvidence::Unknown, None);
    }

    let translated;
    let code_text = match scheme {
        BreedingCodeScheme::BirdTrack => text,
        BreedingCodeScheme::Ebird => {
            translated = translate_breeding_code(text);
            translated.as_str()
        }
    };

    let evidence = if code_text.is_empty() {
        BreedingEvidence::Invalid
    } else {
        BreedingEvidence::from_code_str(code_text)
    };

    if evidence == BreedingEvidence::Invalid {
        diagnostics.record(Diagnostic::UnknownBreedingCode {
            location: location.to_owned(),
            value: text.to_owned(),
        });
    }

    (evidence, BreedingEvidence::code_from_str(code_text))
}

/// Write a table to `<dir>/<name>.csv`, creating `dir` if needed. Returns the path written.
pub fn write_table(dir: &dyn AsRef<Path>, table: &Table) -> Result<PathBuf, BirdRecordsErr> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}.csv", table.name()));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;

    log::debug!("wrote {} rows to {}", table.rows().len(), path.display());

    Ok(path)
}

/// Write a record set as CSV. Carried through columns follow the standard ones, in order of
/// first appearance. Source ids are never written.
pub fn write_observations(
    path: &dyn AsRef<Path>,
    observations: &[Observation],
) -> Result<(), BirdRecordsErr> {
    let file = std::fs::File::create(path)?;
    write_observations_to(file, observations)?;

    log::info!(
        "wrote {} records to {}",
        observations.len(),
        path.as_ref().display()
    );

    Ok(())
}

/// Write a record set as CSV to any destination.
pub fn write_observations_to<W: Write>(
    dest: W,
    observations: &[Observation],
) -> Result<(), BirdRecordsErr> {
    let mut extra_names: Vec<&str> = vec![];
    for (name, _) in observations.iter().flat_map(|obs| obs.extra.iter()) {
        if !extra_names.contains(&name.as_str()) {
            extra_names.push(name);
        }
    }

    let mut writer = csv::Writer::from_writer(dest);

    let mut headers: Vec<&str> = OBSERVATION_COLUMNS.to_vec();
    headers.extend(extra_names.iter());
    writer.write_record(&headers)?;

    for obs in observations {
        let mut row: Vec<String> = vec![
            obs.species.clone(),
            obs.scientific_name.clone().unwrap_or_default(),
            obs.count_display().into_owned(),
            obs.place.clone(),
            obs.date.format(DATE_FORMAT).to_string(),
            obs.observer.clone(),
            obs.grid_square.clone().unwrap_or_default(),
            breeding_cell(obs),
            obs.season().as_static_str().to_owned(),
            obs.comment.clone(),
        ];
        row.extend(
            extra_names
                .iter()
                .map(|name| obs.extra(name).unwrap_or("").to_owned()),
        );
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

// The code when there is one, otherwise the label of a known tier.
fn breeding_cell(obs: &Observation) -> String {
    match (obs.breeding_code, obs.breeding) {
        (Some(code), _) => format!("{:02}", code),
        (None, BreedingEvidence::Unknown) | (None, BreedingEvidence::Invalid) => String::new(),
        (None, evidence) => evidence.as_static_str().to_owned(),
    }
}

/// Copy a CSV file, adding a column computed from another column of the same row.
///
/// If `new_column` already exists its values are replaced in place. The rows are written to a
/// temporary file next to `output` that is renamed over it at the end, so `input` and `output`
/// may be the same file. Returns the number of rows written.
pub fn add_column<F>(
    input: &dyn AsRef<Path>,
    output: &dyn AsRef<Path>,
    source_column: &str,
    new_column: &str,
    mut derive: F,
) -> Result<usize, BirdRecordsErr>
where
    F: FnMut(&str) -> String,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(input)?;
    let mut headers = reader.headers()?.clone();

    let source_idx = headers
        .iter()
        .position(|h| h.trim() == source_column)
        .ok_or_else(|| BirdRecordsErr::MissingColumn(source_column.to_owned()))?;
    let target_idx = headers.iter().position(|h| h.trim() == new_column);
    if target_idx.is_none() {
        headers.push_field(new_column);
    }

    let output = output.as_ref();
    let staging = staging_path(output);
    let mut writer = csv::Writer::from_path(&staging)?;
    writer.write_record(&headers)?;

    let mut rows = 0;
    for record in reader.records() {
        let record = record?;
        let derived = derive(record.get(source_idx).unwrap_or("").trim());

        let mut fields: Vec<&str> = record.iter().collect();
        match target_idx {
            Some(idx) => {
                fields.resize(fields.len().max(idx + 1), "");
                fields[idx] = &derived;
            }
            None => {
                fields.resize(fields.len().max(headers.len() - 1), "");
                fields.push(&derived);
            }
        }

        writer.write_record(&fields)?;
        rows += 1;
    }

    writer.flush()?;
    drop(writer);
    drop(reader);
    std::fs::rename(&staging, output)?;

    log::info!(
        "added {} to {} rows of {}",
        new_column,
        rows,
        input.as_ref().display()
    );

    Ok(rows)
}

// A hidden file in the same directory, so the final rename never crosses file systems.
fn staging_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    output.with_file_name(format!(".{}.partial", name))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use crate::{diagnostics::DiagnosticKind, observation::CountQualifier};
    use chrono::NaiveDate;
    use tempdir::TempDir;

    const EXPORT: &str = "\
Species,Scientific name,Count,Place,Date,Observer,1km Grid Ref,Breeding evidence,Comment,Activity
Robin,Erithacus rubecula,c5,Garden,01/05/2024,Alice,NS5865,02,singing,Feeding
Wren,Troglodytes troglodytes,Present,Wood,2024-05-02 07:30:00,Bob,,,,
Blackbird,Turdus merula,lots,Wood,03/05/2024,Bob,NS5866,Probable breeding,,
Dunnock,Prunella modularis,2,Wood,sometime,Bob,NS5866,,,
Song Thrush,Turdus philomelos,1,Wood,04/05/2024,Bob,NS5866,21,,
";

    fn read(options: &RunOptions, diags: &mut Diagnostics) -> Result<Vec<Observation>, BirdRecordsErr> {
        read_observations_from(
            EXPORT.as_bytes(),
            "export",
            &ColumnMap::default(),
            options,
            diags,
        )
    }

    #[test]
    fn test_read_observations() {
        let mut diags = Diagnostics::new();
        let obs = read(&RunOptions::default(), &mut diags).unwrap();

        assert_eq!(obs.len(), 4);

        let robin = &obs[0];
        assert_eq!(robin.species, "Robin");
        assert_eq!(robin.scientific_name.as_deref(), Some("Erithacus rubecula"));
        assert_eq!(robin.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(robin.count, Some(Count::new(5, CountQualifier::Approximate)));
        assert_eq!(robin.breeding, BreedingEvidence::PossibleBreeder);
        assert_eq!(robin.breeding_code, Some(2));
        assert_eq!(robin.grid_square.as_deref(), Some("NS5865"));
        assert_eq!(robin.comment, "singing");
        assert_eq!(robin.source_id.as_deref(), Some("export:2"));
        assert_eq!(robin.extra("Activity"), Some("Feeding"));

        let wren = &obs[1];
        assert_eq!(wren.resolved_count(), Some(1));
        assert_eq!(wren.grid_square, None);
        assert_eq!(wren.breeding, BreedingEvidence::Unknown);

        let blackbird = &obs[2];
        assert_eq!(blackbird.count, None);
        assert_eq!(blackbird.count_text, "lots");
        assert_eq!(blackbird.breeding, BreedingEvidence::ProbableBreeding);
        assert_eq!(blackbird.breeding_code, None);

        assert_eq!(obs[3].breeding, BreedingEvidence::Invalid);

        assert_eq!(diags.count(DiagnosticKind::MalformedCount), 1);
        assert_eq!(diags.count(DiagnosticKind::MalformedDate), 1);
        assert_eq!(diags.count(DiagnosticKind::UnknownBreedingCode), 1);
    }

    #[test]
    fn test_abort_on_malformed_count() {
        let options = RunOptions {
            malformed_counts: MalformedCountPolicy::Abort,
            ..RunOptions::default()
        };
        let mut diags = Diagnostics::new();

        match read(&options, &mut diags) {
            Err(BirdRecordsErr::AbortedOnMalformedCount { location, value }) => {
                assert_eq!(location, "export:4");
                assert_eq!(value, "lots");
            }
            other => panic!("expected an abort, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_column() {
        let columns = ColumnMap {
            observer: "Recorder".to_owned(),
            ..ColumnMap::default()
        };
        let result = read_observations_from(
            EXPORT.as_bytes(),
            "export",
            &columns,
            &RunOptions::default(),
            &mut Diagnostics::new(),
        );

        assert!(matches!(result, Err(BirdRecordsErr::MissingColumn(name)) if name == "Recorder"));
    }

    #[test]
    fn test_ebird_breeding_codes() {
        let export = "\
Species,Count,Place,Date,Observer,1km Grid Ref,Breeding evidence
Robin,1,Garden,01/05/2024,Alice,,FL
Wren,1,Garden,01/05/2024,Alice,,ZZ
";
        let options = RunOptions {
            breeding_codes: BreedingCodeScheme::Ebird,
            ..RunOptions::default()
        };
        let mut diags = Diagnostics::new();
        let obs =
            read_observations_from(export.as_bytes(), "ebird", &ColumnMap::default(), &options, &mut diags)
                .unwrap();

        assert_eq!(obs[0].breeding_code, Some(12));
        assert_eq!(obs[0].breeding, BreedingEvidence::ConfirmedBreeding);
        assert_eq!(obs[1].breeding, BreedingEvidence::Invalid);
        assert_eq!(diags.count(DiagnosticKind::UnknownBreedingCode), 1);
    }

    #[test]
    fn test_write_observations_drops_source_id() {
        let mut diags = Diagnostics::new();
        let obs = read(&RunOptions::default(), &mut diags).unwrap();

        let mut buf: Vec<u8> = vec![];
        write_observations_to(&mut buf, &obs).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("Species,Scientific name,Count,Place,Date,Observer,1km Grid Ref,Breeding evidence,Season,Comment,Activity")
        );
        assert_eq!(
            lines.next(),
            Some("Robin,Erithacus rubecula,c5,Garden,01/05/2024,Alice,NS5865,02,Summer,singing,Feeding")
        );
        assert!(!text.contains("export:"));
    }

    #[test]
    fn test_write_table() {
        let tmp = TempDir::new("bird-records-test-tables").unwrap();
        let mut table = Table::new("Summary", &["Metric", "Value"]);
        table.push_row(vec!["Records".to_owned(), "3".to_owned()]);

        let path = write_table(&tmp.path().join("out"), &table).unwrap();

        assert!(path.ends_with("out/Summary.csv"));
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written.lines().collect::<Vec<_>>(), vec!["Metric,Value", "Records,3"]);
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_add_column() {
        let tmp = TempDir::new("bird-records-test-add-column").unwrap();
        let input = tmp.path().join("in.csv");
        let output = tmp.path().join("out.csv");
        std::fs::write(&input, "Species,Count\nRobin,c5\nWren,12+\n").unwrap();

        let rows = add_column(&input, &output, "Count", "Numerical count", |count| {
            crate::observation::parse_count(count)
                .map(|n| n.to_string())
                .unwrap_or_default()
        })
        .unwrap();
        assert_eq!(rows, 2);
        assert_eq!(
            read_lines(&output),
            vec!["Species,Count,Numerical count", "Robin,c5,5", "Wren,12+,12"]
        );

        // A second pass replaces the column rather than adding another.
        let again = tmp.path().join("again.csv");
        add_column(&output, &again, "Count", "Numerical count", |_| "0".to_owned()).unwrap();
        assert_eq!(
            read_lines(&again),
            vec!["Species,Count,Numerical count", "Robin,c5,0", "Wren,12+,0"]
        );
    }

    #[test]
    fn test_add_column_in_place() {
        let tmp = TempDir::new("bird-records-test-add-column-in-place").unwrap();
        let path = tmp.path().join("records.csv");

        // Well past the reader's buffer.
        let mut text = "Species,Count\n".to_owned();
        for i in 0..5_000 {
            text.push_str(&format!("Robin,{}\n", i));
        }
        std::fs::write(&path, text).unwrap();

        let rows = add_column(&path, &path, "Count", "Doubled", |count| {
            count
                .parse::<u32>()
                .map(|n| (2 * n).to_string())
                .unwrap_or_default()
        })
        .unwrap();
        assert_eq!(rows, 5_000);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 5_001);
        assert_eq!(lines[0], "Species,Count,Doubled");
        assert_eq!(lines[1], "Robin,0,0");
        assert_eq!(lines[5_000], "Robin,4999,9998");

        let leftovers: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }
}
