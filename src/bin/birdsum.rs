//! Summarize bird records by species.

use anyhow::{Context, Result};
use bird_records::{
    init_logging, read_observations, reconcile, report, summarize, summary, write_table,
    CommonCmdLineArgs, Diagnostics, ReconcilePolicy, TablePrinter,
};
use clap::{value_parser, Arg, ArgAction};
use std::path::PathBuf;

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
    let app = CommonCmdLineArgs::new_app("birdsum", "Summarize bird records by species.")
        .arg(
            Arg::new("keep-duplicates")
                .long("keep-duplicates")
                .action(ArgAction::SetTrue)
                .help("Summarize the records as read, without collapsing duplicates."),
        )
        .arg(
            Arg::new("sections")
                .long("sections")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Also write a plain text report section for each species to DIR."),
        )
        .arg(
            Arg::new("reference")
                .long("reference")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .requires("sections")
                .help("Species reference csv used to head and order the report sections."),
        )
        .after_help(concat!(
            "The output is a directory. Each table is written there as a csv file named after ",
            "the table: Summary, Species, Calendar, Breeding, SummerVisitors and WinterVisitors.\n\n",
            "Records that share species, place, date and observer are collapsed to the one with ",
            "the largest count before summarizing, unless --keep-duplicates is given.\n\n",
            "The reference file for --reference has the columns Scientific_name, BOU_category, ",
            "BTO_Code, Scotland and, optionally, BOU_order. Without a BOU_order the sections are ",
            "ordered by a 'BOU order' column in the input, if there is one."
        ));

    let (args, matches) = CommonCmdLineArgs::matches(app)?;
    init_logging(args.verbosity());

    let taxonomy = args.taxonomy().context("unable to load taxonomy")?;
    let options = args.run_options();
    let mut diagnostics = Diagnostics::new();

    let mut observations = vec![];
    for input in args.inputs() {
        let mut read = read_observations(input, args.column_map(), &options, &mut diagnostics)
            .with_context(|| format!("unable to read {}", input.display()))?;
        observations.append(&mut read);
    }

    let observations = taxonomy.normalize_all(observations);
    let observations = if matches.get_flag("keep-duplicates") {
        observations
    } else {
        reconcile(observations, ReconcilePolicy::Collapse, &mut diagnostics).observations
    };

    let summaries = summarize(&observations, &taxonomy, &options, &mut diagnostics);

    let tables = summary::tables(&summaries);
    for table in &tables {
        let path = write_table(&args.output(), table)
            .with_context(|| format!("unable to write the {} table", table.name()))?;
        println!("Wrote {}", path.display());
    }

    if let Some(overview) = tables.first() {
        TablePrinter::from_table(overview).print()?;
    }

    if let Some(dir) = matches.get_one::<PathBuf>("sections") {
        let reference = match matches.get_one::<PathBuf>("reference") {
            Some(path) => Some(
                report::ReferenceTable::from_file(path).with_context(|| {
                    format!("unable to load reference data from {}", path.display())
                })?,
            ),
            None => None,
        };

        let sections = report::species_sections(&observations, reference.as_ref());
        let num_written = report::write_sections(dir, &sections)
            .with_context(|| format!("unable to write report sections to {}", dir.display()))?;
        println!("Wrote {} report sections to {}", num_written, dir.display());
    }

    if !diagnostics.is_empty() {
        diagnostics.summary_printer().print()?;
    }

    Ok(())
}
