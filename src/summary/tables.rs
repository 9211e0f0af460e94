use super::{Report, SpeciesSummary, TierStats, MONTH_NAMES};
use crate::{observation::DATE_FORMAT, table::Table, taxonomy::VisitorStatus};
use chrono::NaiveDate;

/// Lay out a report as the output tables: Summary, Species, Calendar, Breeding, SummerVisitors
/// and WinterVisitors, in that order.
pub fn tables(report: &Report) -> Vec<Table> {
    vec![
        summary_table(report),
        species_table(&report.species),
        calendar_table(&report.species),
        breeding_table(&report.species),
        visitor_table("SummerVisitors", VisitorStatus::Summer, &report.species),
        visitor_table("WinterVisitors", VisitorStatus::Winter, &report.species),
    ]
}

fn summary_table(report: &Report) -> Table {
    let corpus = &report.corpus;
    let mut table = Table::new("Summary", &["Metric", "Value"]);

    let mut metrics = vec![
        ("Records", corpus.records.to_string()),
        ("Species", corpus.species.to_string()),
        ("Places", corpus.places.to_string()),
        ("Observers", corpus.observers.to_string()),
        ("Days", corpus.days.to_string()),
        ("Total count", corpus.total_count.to_string()),
        ("1km squares", corpus.grid_squares.to_string()),
    ];
    if let Some(percent) = corpus.grid_squares_percent {
        metrics.push(("% coverage", format_percent(Some(percent))));
    }

    for (metric, value) in metrics {
        table.push_row(vec![metric.to_owned(), value]);
    }

    table
}

fn species_table(species: &[SpeciesSummary]) -> Table {
    let mut table = Table::new(
        "Species",
        &[
            "Species",
            "Records",
            "Places",
            "Observers",
            "Days",
            "Total count",
            "1km squares",
            "% 1km Squares",
        ],
    );

    for sp in species {
        table.push_row(vec![
            sp.species.clone(),
            sp.records.to_string(),
            sp.places.to_string(),
            sp.observers.to_string(),
            sp.days.to_string(),
            sp.total_count.to_string(),
            sp.grid_squares.to_string(),
            format_percent(sp.grid_squares_percent),
        ]);
    }

    table
}

fn calendar_table(species: &[SpeciesSummary]) -> Table {
    let mut columns = vec!["Species"];
    columns.extend(MONTH_NAMES.iter());
    let mut table = Table::new("Calendar", &columns);

    for sp in species {
        let mut row = vec![sp.species.clone()];
        row.extend(sp.monthly.as_slice().iter().map(u32::to_string));
        table.push_row(row);
    }

    table
}

fn breeding_table(species: &[SpeciesSummary]) -> Table {
    let mut columns = vec!["Species".to_owned()];
    for tier in &["Possible", "Probable", "Confirmed"] {
        columns.push(format!("{} records", tier));
        columns.push(format!("{} count", tier));
        columns.push(format!("{} 1km squares", tier));
        columns.push(format!("{} % 1km squares", tier));
        columns.push(format!("{} earliest", tier));
        columns.push(format!("{} latest", tier));
    }
    let mut table = Table::new("Breeding", &columns);

    for sp in species {
        let rollup = match sp.breeding.as_ref() {
            Some(rollup) => rollup,
            None => continue,
        };

        let mut row = vec![sp.species.clone()];
        for (_, stats) in rollup.tiers().iter() {
            row.extend(tier_cells(stats));
        }
        table.push_row(row);
    }

    table
}

fn tier_cells(stats: &TierStats) -> Vec<String> {
    vec![
        stats.records.to_string(),
        stats.total_count.to_string(),
        stats.grid_squares.to_string(),
        format_percent(stats.grid_squares_percent),
        format_date(stats.earliest),
        format_date(stats.latest),
    ]
}

fn visitor_table(name: &str, status: VisitorStatus, species: &[SpeciesSummary]) -> Table {
    let mut table = Table::new(name, &["Species", "Earliest", "Latest"]);

    let visitors = species.iter().filter_map(|sp| match sp.visitor {
        Some((sp_status, window)) if sp_status == status => Some((sp, window)),
        _ => None,
    });

    for (sp, window) in visitors {
        table.push_row(vec![
            sp.species.clone(),
            format_date(window.earliest),
            format_date(window.latest),
        ]);
    }

    table
}

/// Two decimal places, or empty when the percentage was omitted.
pub(crate) fn format_percent(percent: Option<f64>) -> String {
    percent
        .map(|percent| format!("{:.2}", percent))
        .unwrap_or_default()
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use crate::{
        config::RunOptions, diagnostics::Diagnostics, observation::Observation,
        summary::summarize, taxonomy::Taxonomy,
    };

    fn report(total_squares: Option<u32>) -> Report {
        let date = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        let obs = vec![
            Observation::new("Robin", "Garden", "Alice", date(3, 1))
                .with_grid_square("NS5865")
                .with_breeding_code(12),
            Observation::new("Redwing", "Field", "Bob", date(1, 10)),
            Observation::new("Redwing", "Field", "Bob", date(11, 20)),
            Observation::new("Swallow", "Farm", "Cat", date(4, 18)).with_grid_square("NS5866"),
        ];
        let taxonomy =
            Taxonomy::from_yaml_str("summer_visitors: [Swallow]\nwinter_visitors: [Redwing]\n")
                .unwrap();

        let options = RunOptions {
            total_squares,
            ..RunOptions::default()
        };

        summarize(&obs, &taxonomy, &options, &mut Diagnostics::new())
    }

    #[test]
    fn test_table_names_and_order() {
        let names: Vec<String> = tables(&report(Some(3)))
            .iter()
            .map(|t| t.name().to_owned())
            .collect();

        assert_eq!(
            names,
            vec![
                "Summary",
                "Species",
                "Calendar",
                "Breeding",
                "SummerVisitors",
                "WinterVisitors"
            ]
        );
    }

    #[test]
    fn test_species_table_percentages() {
        let all = tables(&report(Some(3)));
        let species = &all[1];

        assert_eq!(species.columns()[7], "% 1km Squares");
        assert_eq!(
            species.column("% 1km Squares").unwrap(),
            vec!["0.00", "33.33", "33.33"]
        );

        let summary = &all[0];
        assert_eq!(summary.column("Metric").unwrap().last(), Some(&"% coverage"));
        assert_eq!(summary.column("Value").unwrap().last(), Some(&"66.67"));
    }

    #[test]
    fn test_percentages_omitted_without_denominator() {
        let all = tables(&report(None));

        assert_eq!(all[1].column("% 1km Squares").unwrap(), vec!["", "", ""]);
        assert!(!all[0].column("Metric").unwrap().contains(&"% coverage"));
    }

    #[test]
    fn test_calendar_breeding_and_visitors() {
        let all = tables(&report(Some(3)));

        let calendar = &all[2];
        assert_eq!(calendar.columns().len(), 13);
        assert_eq!(calendar.column("Jan").unwrap(), vec!["1", "0", "0"]);
        assert_eq!(calendar.column("Nov").unwrap(), vec!["1", "0", "0"]);

        let breeding = &all[3];
        assert_eq!(breeding.columns().len(), 19);
        assert_eq!(breeding.column("Species").unwrap(), vec!["Robin"]);
        assert_eq!(breeding.column("Confirmed records").unwrap(), vec!["1"]);
        assert_eq!(breeding.column("Confirmed earliest").unwrap(), vec!["01/03/2024"]);
        assert_eq!(breeding.column("Possible earliest").unwrap(), vec![""]);

        let summer = &all[4];
        assert_eq!(summer.column("Species").unwrap(), vec!["Swallow"]);
        assert_eq!(summer.column("Earliest").unwrap(), vec!["18/04/2024"]);

        let winter = &all[5];
        assert_eq!(winter.column("Earliest").unwrap(), vec!["20/11/2024"]);
        assert_eq!(winter.column("Latest").unwrap(), vec!["10/01/2024"]);
    }
}
