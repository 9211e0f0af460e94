//! Add a column derived from another column to a bird records csv file.

use anyhow::{Context, Result};
use bird_records::{add_column, init_logging, Derivation};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::{path::PathBuf, str::FromStr};
use strum::IntoEnumIterator;

fn main() {
    if let Err(ref e) = run() {
        println!("error: {}", e);

        for cause in e.chain().skip(1) {
            println!("caused by: {}", cause);
        }

        ::std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let app = Derivation::iter().fold(
        Command::new("birdcol")
            .about("Add a column derived from another column to a bird records csv file.")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .global(true)
                    .action(ArgAction::Count)
                    .help("Log more, repeat for even more. RUST_LOG overrides this."),
            ),
        |app, derivation| app.subcommand(derivation_command(derivation)),
    );

    let matches = app.get_matches();
    init_logging(matches.get_count("verbose"));

    let (name, sub_args) = matches
        .subcommand()
        .context("a derivation subcommand is required")?;

    derive_column(Derivation::from_str(name)?, sub_args)
}

fn derivation_command(derivation: Derivation) -> Command {
    Command::new(derivation.as_static_str())
        .about(derivation.about())
        .arg(
            Arg::new("input")
                .index(1)
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("The csv file to read."),
        )
        .arg(
            Arg::new("output")
                .index(2)
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Where to write the csv file with the new column."),
        )
        .arg(
            Arg::new("column")
                .short('c')
                .long("column")
                .default_value(derivation.source_column())
                .help("The column to derive from."),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .default_value(derivation.new_column())
                .help("The column to write, replaced if it already exists."),
        )
}

fn derive_column(derivation: Derivation, args: &ArgMatches) -> Result<()> {
    let input = args
        .get_one::<PathBuf>("input")
        .context("no input file given")?;
    let output = args
        .get_one::<PathBuf>("output")
        .context("no output file given")?;
    let column = args
        .get_one::<String>("column")
        .context("no source column given")?;
    let name = args
        .get_one::<String>("name")
        .context("no column name given")?;

    let num_rows = add_column(input, output, column, name, |cell| derivation.apply(cell))
        .with_context(|| format!("unable to add {} to {}", name, input.display()))?;

    println!(
        "Wrote {} rows with column '{}' to {}",
        num_rows,
        name,
        output.display()
    );

    Ok(())
}
