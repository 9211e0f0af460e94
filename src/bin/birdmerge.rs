//! Merge bird record exports into one record set without duplicates.

use anyhow::{bail, Context, Result};
use bird_records::{
    distinct_keys, init_logging, read_observations, reconcile, write_observations,
    BreedingCodeScheme, CommonCmdLineArgs, Diagnostics, Observation, ReconcilePolicy,
    TablePrinter,
};
use clap::{value_parser, Arg};
use std::{path::PathBuf, str::FromStr};

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
    let app = CommonCmdLineArgs::new_app(
        "birdmerge",
        "Merge bird record exports into one record set without duplicates.",
    )
    .arg(
        Arg::new("policy")
            .short('p')
            .long("policy")
            .value_parser(["disambiguate", "collapse"])
            .default_value("disambiguate")
            .help("How to resolve records that share species, place, date and observer."),
    )
    .arg(
        Arg::new("ebird")
            .long("ebird")
            .value_name("FILE")
            .num_args(1..)
            .value_parser(value_parser!(PathBuf))
            .help("Inputs with eBird letter breeding codes, translated as they are read."),
    )
    .arg(
        Arg::new("ambiguous")
            .long("ambiguous")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Write the records withheld as still ambiguous to FILE."),
    )
    .after_help(concat!(
        "The disambiguate policy keeps every record and appends the source id to the place of ",
        "each duplicate. The collapse policy keeps the record with the largest count and notes ",
        "the others in its comment.\n\n",
        "Records still duplicated after either policy are withheld from the output and listed."
    ));

    let (args, matches) = CommonCmdLineArgs::matches(app)?;
    init_logging(args.verbosity());

    let policy = match matches.get_one::<String>("policy") {
        Some(policy) => ReconcilePolicy::from_str(policy)?,
        None => ReconcilePolicy::Disambiguate,
    };

    let ebird_inputs: Vec<&PathBuf> = matches
        .get_many::<PathBuf>("ebird")
        .into_iter()
        .flatten()
        .collect();
    for path in &ebird_inputs {
        if !args.inputs().contains(*path) {
            bail!("{} is marked as eBird but is not an input", path.display());
        }
    }

    let taxonomy = args.taxonomy().context("unable to load taxonomy")?;
    let mut diagnostics = Diagnostics::new();

    let mut observations = vec![];
    for input in args.inputs() {
        let mut options = args.run_options();
        if ebird_inputs.contains(&input) {
            options.breeding_codes = BreedingCodeScheme::Ebird;
        }

        let mut read = read_observations(input, args.column_map(), &options, &mut diagnostics)
            .with_context(|| format!("unable to read {}", input.display()))?;
        observations.append(&mut read);
    }

    let observations = taxonomy.normalize_all(observations);
    println!(
        "{} records with {} distinct species, place, date and observer combinations",
        observations.len(),
        distinct_keys(&observations)
    );

    let reconciled = reconcile(observations, policy, &mut diagnostics);

    write_observations(&args.output(), &reconciled.observations)
        .with_context(|| format!("unable to write {}", args.output().display()))?;
    println!(
        "Wrote {} records to {}",
        reconciled.observations.len(),
        args.output().display()
    );

    if !reconciled.ambiguous.is_empty() {
        let keys: Vec<String> = reconciled
            .ambiguous
            .iter()
            .map(|group| group.key.to_string())
            .collect();
        let ids: Vec<String> = reconciled
            .ambiguous
            .iter()
            .map(|group| {
                group
                    .source_ids()
                    .iter()
                    .map(|id| id.as_deref().unwrap_or("-"))
                    .collect::<Vec<&str>>()
                    .join(", ")
            })
            .collect();

        TablePrinter::new()
            .with_title("Withheld as ambiguous".to_owned())
            .with_column("Record", &keys)
            .with_column("Source ids", &ids)
            .print()?;

        if let Some(path) = matches.get_one::<PathBuf>("ambiguous") {
            let withheld: Vec<Observation> = reconciled
                .ambiguous
                .into_iter()
                .flat_map(|group| group.members)
                .collect();
            write_observations(path, &withheld)
                .with_context(|| format!("unable to write {}", path.display()))?;
            println!("Wrote {} withheld records to {}", withheld.len(), path.display());
        }
    }

    if !diagnostics.is_empty() {
        diagnostics.summary_printer().print()?;
    }

    Ok(())
}
