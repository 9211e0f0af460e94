//! Command line options that are used across applications.

use crate::{
    config::{ColumnMap, MalformedCountPolicy, RunOptions},
    errors::BirdRecordsErr,
    taxonomy::Taxonomy,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

/// Struct to package up command line arguments.
#[derive(Clone, Debug)]
pub struct CommonCmdLineArgs {
    // Input csv files, at least one.
    inputs: Vec<PathBuf>,
    // Output file or directory, depending on the application.
    output: PathBuf,
    // Header names bound to the logical fields.
    columns: ColumnMap,
    // Replacement for the built in taxonomy.
    taxonomy: Option<PathBuf>,
    // Options applied to the whole run.
    run_options: RunOptions,
    // Number of -v flags.
    verbosity: u8,
}

// Command line flag and the help for each column binding.
const COLUMN_ARGS: [(&str, &str); 10] = [
    ("species-column", "Header of the species column."),
    ("scientific-name-column", "Header of the scientific name column."),
    ("place-column", "Header of the place column."),
    ("observer-column", "Header of the observer column."),
    ("date-column", "Header of the date column."),
    ("count-column", "Header of the count column."),
    ("grid-ref-column", "Header of the 1km grid reference column."),
    ("breeding-column", "Header of the breeding code column."),
    ("comment-column", "Header of the comment column."),
    ("source-id-column", "Header of a column with a unique id for each row."),
];

impl CommonCmdLineArgs {
    const DEFAULT_POLICY: &'static str = "skip";

    /// Create a new set of args for applications that read observation files.
    pub fn new_app(app_name: &'static str, about: &'static str) -> Command {
        let app = Self::basic_app(app_name, about)
            .arg(
                Arg::new("columns")
                    .long("columns")
                    .value_name("FILE")
                    .value_parser(value_parser!(PathBuf))
                    .help("Yaml file binding fields to column headers.")
                    .long_help(concat!(
                        "Yaml file binding fields to column headers. Keys are species, ",
                        "scientific_name, place, observer, date, count, grid_ref, breeding_code, ",
                        "comment and source_id. Fields left out keep their default header."
                    )),
            )
            .arg(
                Arg::new("taxonomy")
                    .short('t')
                    .long("taxonomy")
                    .value_name("FILE")
                    .value_parser(value_parser!(PathBuf))
                    .help("Yaml taxonomy to use in place of the built in one."),
            )
            .arg(
                Arg::new("total-squares")
                    .long("total-squares")
                    .value_name("N")
                    .value_parser(value_parser!(u32))
                    .help("Number of 1km squares in the recording area.")
                    .long_help(concat!(
                        "Number of 1km squares in the recording area. Without it no coverage ",
                        "percentages are calculated."
                    )),
            )
            .arg(
                Arg::new("malformed-counts")
                    .long("malformed-counts")
                    .value_parser(["skip", "abort"])
                    .default_value(Self::DEFAULT_POLICY)
                    .help("Skip rows with unreadable counts when summing, or stop the run."),
            );

        COLUMN_ARGS.iter().fold(app, |app, &(id, help)| {
            app.arg(
                Arg::new(id)
                    .long(id)
                    .value_name("HEADER")
                    .help(help),
            )
        })
    }

    /// Create an app with just the input, output, and verbosity arguments.
    pub fn basic_app(app_name: &'static str, about: &'static str) -> Command {
        Command::new(app_name)
            .about(about)
            .version(env!("CARGO_PKG_VERSION"))
            .arg(
                Arg::new("input")
                    .required(true)
                    .num_args(1..)
                    .value_parser(value_parser!(PathBuf))
                    .help("Input csv files."),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .help("Where to write the results."),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::Count)
                    .help("Log more, repeat for even more. RUST_LOG overrides this."),
            )
    }

    /// Process an `Command` to get the parsed values out of it and the matches object so an
    /// application can continue with further argument parsing.
    pub fn matches(app: Command) -> Result<(Self, ArgMatches), BirdRecordsErr> {
        let matches = app.get_matches();
        let cmd_line_opts = Self::from_matches(&matches)?;

        Ok((cmd_line_opts, matches))
    }

    /// Pull the common arguments out of already parsed matches. Arguments the app does not
    /// define keep their defaults.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, BirdRecordsErr> {
        let inputs: Vec<PathBuf> = matches
            .get_many::<PathBuf>("input")
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        let output = matches
            .get_one::<PathBuf>("output")
            .cloned()
            .ok_or(BirdRecordsErr::LogicError("output is a required argument"))?;

        let verbosity = matches.get_count("verbose");

        let mut columns = match defined_one::<PathBuf>(matches, "columns") {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&yaml)?
            }
            None => ColumnMap::default(),
        };
        for &(id, _) in COLUMN_ARGS.iter() {
            if let Some(header) = defined_one::<String>(matches, id) {
                set_column(&mut columns, id, header.clone());
            }
        }

        let taxonomy = defined_one::<PathBuf>(matches, "taxonomy").cloned();

        let mut run_options = RunOptions::default();
        run_options.total_squares = defined_one::<u32>(matches, "total-squares").copied();
        if let Some(policy) = defined_one::<String>(matches, "malformed-counts") {
            run_options.malformed_counts = MalformedCountPolicy::from_str(policy)?;
        }

        Ok(CommonCmdLineArgs {
            inputs,
            output,
            columns,
            taxonomy,
            run_options,
            verbosity,
        })
    }

    /// Get the input files.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Get the output path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Get the column bindings.
    pub fn column_map(&self) -> &ColumnMap {
        &self.columns
    }

    /// Get the run options.
    pub fn run_options(&self) -> RunOptions {
        self.run_options
    }

    /// Load the taxonomy named on the command line, or the built in one.
    pub fn taxonomy(&self) -> Result<Taxonomy, BirdRecordsErr> {
        match self.taxonomy {
            Some(ref path) => Taxonomy::from_file(path),
            None => Taxonomy::builtin(),
        }
    }

    /// Get the number of times -v was given.
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }
}

// Look up an argument the app may not define at all, `get_one` panics on those.
fn defined_one<'a, T>(matches: &'a ArgMatches, id: &str) -> Option<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    matches.try_get_one::<T>(id).ok().flatten()
}

fn set_column(columns: &mut ColumnMap, id: &str, header: String) {
    match id {
        "species-column" => columns.species = header,
        "scientific-name-column" => columns.scientific_name = Some(header),
        "place-column" => columns.place = header,
        "observer-column" => columns.observer = header,
        "date-column" => columns.date = header,
        "count-column" => columns.count = header,
        "grid-ref-column" => columns.grid_ref = header,
        "breeding-column" => columns.breeding_code = header,
        "comment-column" => columns.comment = Some(header),
        "source-id-column" => columns.source_id = Some(header),
        _ => log::debug!("no column binding for argument {}", id),
    }
}

/// Install the logger. Warnings only by default, info with one -v, and debug with more.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_common_args() {
        let matches = CommonCmdLineArgs::new_app("test", "testing")
            .try_get_matches_from(vec![
                "test",
                "a.csv",
                "b.csv",
                "-o",
                "out",
                "--total-squares",
                "412",
                "--malformed-counts",
                "abort",
                "--species-column",
                "Common name",
                "--source-id-column",
                "Obs ID",
                "-vv",
            ])
            .unwrap();
        let args = CommonCmdLineArgs::from_matches(&matches).unwrap();

        assert_eq!(
            args.inputs(),
            &[PathBuf::from("a.csv"), PathBuf::from("b.csv")][..]
        );
        assert_eq!(args.output(), Path::new("out"));
        assert_eq!(args.run_options().total_squares, Some(412));
        assert_eq!(
            args.run_options().malformed_counts,
            MalformedCountPolicy::Abort
        );
        assert_eq!(args.column_map().species, "Common name");
        assert_eq!(args.column_map().source_id.as_deref(), Some("Obs ID"));
        assert_eq!(args.column_map().place, "Place");
        assert_eq!(args.verbosity(), 2);
    }

    #[test]
    fn test_basic_app_defaults() {
        let matches = CommonCmdLineArgs::basic_app("test", "testing")
            .try_get_matches_from(vec!["test", "a.csv", "--output", "out.csv"])
            .unwrap();
        let args = CommonCmdLineArgs::from_matches(&matches).unwrap();

        assert_eq!(args.column_map(), &ColumnMap::default());
        assert_eq!(args.run_options(), RunOptions::default());
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_bad_policy_rejected() {
        let result = CommonCmdLineArgs::new_app("test", "testing").try_get_matches_from(vec![
            "test",
            "a.csv",
            "-o",
            "out",
            "--malformed-counts",
            "ignore",
        ]);

        assert!(result.is_err());
    }
}
