//! Convert RSPB reserve exports to BirdTrack upload files.

use anyhow::{Context, Result};
use bird_records::{
    init_logging, reconcile,
    rspb::{read_export, upload_table, ArmSpecies, RspbConverter},
    write_table, CommonCmdLineArgs, Diagnostics, Observation, ReconcilePolicy,
};
use clap::{value_parser, Arg};
use std::path::{Path, PathBuf};

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
    let app = CommonCmdLineArgs::basic_app(
        "rspbfmt",
        "Convert RSPB reserve exports to BirdTrack upload files.",
    )
    .arg(
        Arg::new("year")
            .short('y')
            .long("year")
            .required(true)
            .value_parser(value_parser!(i32))
            .help("Year of the ARM survey, used to date survey records."),
    )
    .arg(
        Arg::new("arm-species")
            .long("arm-species")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Yaml lists of resident and migrant ARM species, in place of the built in ones."),
    )
    .after_help(concat!(
        "ARM survey records and incidental records are written to separate files. For an ",
        "output of reserve.csv these are ARM_reserve.csv and Non_ARM_reserve.csv, next to it.\n\n",
        "Records that share species, place, date and observer have the RSPB observation id ",
        "appended to the place."
    ));

    let (args, matches) = CommonCmdLineArgs::matches(app)?;
    init_logging(args.verbosity());

    let year = *matches
        .get_one::<i32>("year")
        .context("the survey year is required")?;
    let arm_species = match matches.get_one::<PathBuf>("arm-species") {
        Some(path) => ArmSpecies::from_file(path)
            .with_context(|| format!("unable to load ARM species from {}", path.display()))?,
        None => ArmSpecies::builtin()?,
    };
    let converter = RspbConverter::new(arm_species, year)?;

    let mut diagnostics = Diagnostics::new();
    let mut arm = vec![];
    let mut incidental = vec![];
    for input in args.inputs() {
        let rows =
            read_export(input).with_context(|| format!("unable to read {}", input.display()))?;
        let mut converted = converter.convert_export(&rows, &mut diagnostics);
        arm.append(&mut converted.arm);
        incidental.append(&mut converted.incidental);
    }

    let output = args.output();
    let dir = output.parent().unwrap_or_else(|| Path::new("."));
    let stem = output
        .file_stem()
        .and_then(|stem| stem.to_str())
        .context("the output needs a file name")?;

    for (prefix, observations) in vec![("ARM", arm), ("Non_ARM", incidental)] {
        write_upload(
            &format!("{}_{}", prefix, stem),
            dir,
            observations,
            &mut diagnostics,
        )?;
    }

    if !diagnostics.is_empty() {
        diagnostics.summary_printer().print()?;
    }

    Ok(())
}

fn write_upload(
    name: &str,
    dir: &Path,
    observations: Vec<Observation>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let reconciled = reconcile(observations, ReconcilePolicy::Disambiguate, diagnostics);
    let table = upload_table(name, &reconciled.observations);

    let path = write_table(&dir, &table).with_context(|| format!("unable to write {}", name))?;
    println!(
        "Wrote {} records to {}",
        table.rows().len(),
        path.display()
    );

    Ok(())
}
