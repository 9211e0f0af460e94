//! Box drawn text tables for the terminal and for plain text report sections.

use crate::table::Table;
use std::fmt::{Display, Write};
use unicode_width::UnicodeWidthStr;

/// Builds a table column by column and renders it with box drawing characters.
#[derive(Default, Debug)]
pub struct TablePrinter {
    title: Option<String>,
    header: Option<String>,
    footer: Option<String>,
    column_names: Vec<String>,
    columns: Vec<Vec<String>>,
    fill: String,
}

impl TablePrinter {
    /// Create an empty printer.
    pub fn new() -> Self {
        TablePrinter::default()
    }

    /// Lay out a [`Table`], using its name as the title.
    pub fn from_table(table: &Table) -> Self {
        let printer = TablePrinter::new().with_title(table.name().to_owned());

        table
            .columns()
            .iter()
            .enumerate()
            .fold(printer, |printer, (idx, name)| {
                let vals: Vec<&str> = table
                    .rows()
                    .iter()
                    .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                    .collect();
                printer.with_column(name, &vals)
            })
    }

    /// Set the title, centered above everything else.
    pub fn with_title<T>(self, title: T) -> Self
    where
        Option<String>: From<T>,
    {
        TablePrinter {
            title: Option::from(title),
            ..self
        }
    }

    /// Set text shown below the title, wrapped to the table width.
    pub fn with_header<T>(self, header: T) -> Self
    where
        Option<String>: From<T>,
    {
        TablePrinter {
            header: Option::from(header),
            ..self
        }
    }

    /// Set text shown below the rows, wrapped to the table width.
    pub fn with_footer<T>(self, footer: T) -> Self
    where
        Option<String>: From<T>,
    {
        TablePrinter {
            footer: Option::from(footer),
            ..self
        }
    }

    /// Set the text used where a column is shorter than the others.
    pub fn with_fill<T: AsRef<str>>(self, fill_string: T) -> Self {
        TablePrinter {
            fill: fill_string.as_ref().to_owned(),
            ..self
        }
    }

    /// Add a column.
    pub fn with_column<T, V>(self, col_name: T, col_vals: &[V]) -> Self
    where
        T: Display,
        V: Display,
    {
        let mut column_names = self.column_names;
        let mut columns = self.columns;

        column_names.push(format!("{}", col_name));

        let col_vals: Vec<String> = col_vals.iter().map(|v| format!("{}", v)).collect();

        columns.push(col_vals);

        TablePrinter {
            column_names,
            columns,
            ..self
        }
    }

    /// Render to a string. A printer without columns renders as an empty string.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        if self.columns.is_empty() {
            return Ok(String::new());
        }

        //
        // Calculate widths
        //
        let mut table_width = self
            .title
            .as_ref()
            .map(|title| UnicodeWidthStr::width(title.as_str()))
            .unwrap_or(0);
        let mut col_widths = vec![0; self.columns.len()];

        for (i, col_name) in self.column_names.iter().enumerate() {
            let mut width = UnicodeWidthStr::width(col_name.as_str());
            if col_widths[i] < width {
                col_widths[i] = width;
            }

            for row in self.columns[i].iter() {
                width = UnicodeWidthStr::width(row.as_str());
                if col_widths[i] < width {
                    col_widths[i] = width;
                }
            }
        }

        let all_cols_width: usize = col_widths.iter().sum::<usize>() + col_widths.len() - 1;
        if all_cols_width > table_width {
            table_width = all_cols_width;
        }
        // Spread any extra width from a long title over the last column.
        if let Some(last) = col_widths.last_mut() {
            *last += table_width - all_cols_width;
        }
        let last_width = col_widths[col_widths.len() - 1];

        //
        // Build the string.
        //
        let mut builder = String::with_capacity(2000);

        //
        // Title
        //
        let mut left_char: char;
        let mut right_char: char;
        if let Some(ref title) = self.title {
            writeln!(&mut builder, "\u{250c}{}\u{2510}", "\u{2500}".repeat(table_width))?;
            writeln!(&mut builder, "\u{2502}{0:^1$}\u{2502}", title, table_width)?;

            left_char = '\u{251c}';
            right_char = '\u{2524}';
        } else {
            left_char = '\u{250c}';
            right_char = '\u{2510}';
        }

        //
        // Header
        //
        if let Some(ref header) = self.header {
            writeln!(
                &mut builder,
                "{}{}{}",
                left_char,
                "\u{2500}".repeat(table_width),
                right_char
            )?;
            for line in wrap(header, table_width) {
                writeln!(&mut builder, "\u{2502}{0:<1$}\u{2502}", line, table_width)?;
            }

            left_char = '\u{251c}';
            right_char = '\u{2524}';
        }

        //
        // Column names
        //
        write!(&mut builder, "{}", left_char)?;
        for &width in &col_widths[..(col_widths.len() - 1)] {
            write!(&mut builder, "{}\u{252C}", "\u{2500}".repeat(width))?;
        }
        writeln!(&mut builder, "{}{}", "\u{2500}".repeat(last_width), right_char)?;

        for (name, &width) in self.column_names.iter().zip(&col_widths) {
            write!(&mut builder, "\u{2502}{0:^1$}", name, width)?;
        }
        writeln!(&mut builder, "\u{2502}")?;

        //
        // Data rows
        //
        write!(&mut builder, "\u{251C}")?;
        for &width in &col_widths[..(col_widths.len() - 1)] {
            write!(&mut builder, "{}\u{253C}", "\u{2500}".repeat(width))?;
        }
        writeln!(&mut builder, "{}\u{2524}", "\u{2500}".repeat(last_width))?;

        let num_rows = self.columns.iter().map(|col| col.len()).max().unwrap_or(0);
        for i in 0..num_rows {
            for (column, &width) in self.columns.iter().zip(&col_widths) {
                let val = column.get(i).unwrap_or(&self.fill);
                // Pad by display width, format padding counts chars.
                let pad = width.saturating_sub(UnicodeWidthStr::width(val.as_str()));
                write!(&mut builder, "\u{2502}{}{}", " ".repeat(pad), val)?;
            }
            writeln!(&mut builder, "\u{2502}")?;
        }

        //
        // Footer
        //
        if self.footer.is_some() {
            left_char = '\u{251c}';
            right_char = '\u{2524}';
        } else {
            left_char = '\u{2514}';
            right_char = '\u{2518}';
        }
        write!(&mut builder, "{}", left_char)?;
        for &width in &col_widths[..(col_widths.len() - 1)] {
            write!(&mut builder, "{}\u{2534}", "\u{2500}".repeat(width))?;
        }
        writeln!(&mut builder, "{}{}", "\u{2500}".repeat(last_width), right_char)?;

        if let Some(ref footer) = self.footer {
            for line in wrap(footer, table_width) {
                writeln!(&mut builder, "\u{2502}{0:<1$}\u{2502}", line, table_width)?;
            }
            writeln!(&mut builder, "\u{2514}{}\u{2518}", "\u{2500}".repeat(table_width))?;
        }

        Ok(builder)
    }

    /// Render and print to standard out.
    pub fn print(&self) -> Result<(), std::fmt::Error> {
        println!("\n{}", self.render()?);
        Ok(())
    }
}

// Split header and footer text into lines no wider than the table.
fn wrap(text: &str, table_width: usize) -> Vec<&str> {
    if table_width == 0 {
        return vec![text.trim()];
    }

    let mut lines: Vec<&str> = vec![];

    let mut remaining = text.trim();
    while remaining.chars().count() > table_width {
        let cut = remaining
            .char_indices()
            .nth(table_width)
            .map(|(idx, _)| idx)
            .unwrap_or_else(|| remaining.len());
        let guess = &remaining[..cut];

        let right_edge = guess
            .find('\n')
            .or_else(|| guess.rfind(char::is_whitespace))
            .filter(|&edge| edge > 0)
            .unwrap_or(cut);
        lines.push(&remaining[..right_edge]);
        remaining = remaining[right_edge..].trim();
    }
    lines.push(remaining);

    lines
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_render_table() {
        let mut table = Table::new("Summary", &["Metric", "Value"]);
        table.push_row(vec!["Records".to_owned(), "12".to_owned()]);
        table.push_row(vec!["Species".to_owned(), "4".to_owned()]);

        let rendered = TablePrinter::from_table(&table).render().unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(
            lines,
            vec![
                "┌─────────────┐",
                "│   Summary   │",
                "├───────┬─────┤",
                "│Metric │Value│",
                "├───────┼─────┤",
                "│Records│   12│",
                "│Species│    4│",
                "└───────┴─────┘",
            ]
        );
    }

    #[test]
    fn test_short_columns_use_fill() {
        let rendered = TablePrinter::new()
            .with_column("A", &["1", "2"])
            .with_column("B", &["x"])
            .with_fill("-")
            .render()
            .unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[3], "│1│x│");
        assert_eq!(lines[4], "│2│-│");
    }

    #[test]
    fn test_footer() {
        let rendered = TablePrinter::new()
            .with_column("Name", &["Robin"])
            .with_footer("done".to_owned())
            .render()
            .unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[4], "├─────┤");
        assert_eq!(lines[5], "│done │");
        assert_eq!(lines[6], "└─────┘");
    }

    #[test]
    fn test_long_title_widens_last_column() {
        let rendered = TablePrinter::new()
            .with_title("A long title".to_owned())
            .with_column("A", &[1])
            .render()
            .unwrap();

        for line in rendered.lines() {
            assert_eq!(UnicodeWidthStr::width(line), 14);
        }
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three", 7), vec!["one", "two", "three"]);
        assert_eq!(wrap("short", 10), vec!["short"]);
        assert_eq!(wrap(" no room ", 0), vec!["no room"]);
    }

    #[test]
    fn test_header_and_empty_column() {
        let rendered = TablePrinter::new()
            .with_header("Two words".to_owned())
            .with_column("Name", &["Robin"])
            .render()
            .unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "┌─────┐");
        assert_eq!(lines[1], "│Two  │");
        assert_eq!(lines[2], "│words│");
        assert_eq!(lines[3], "├─────┤");
        assert_eq!(lines[4], "│Name │");

        // Nothing has any width, the footer still renders.
        let rendered = TablePrinter::new()
            .with_column("", &[""])
            .with_footer("note".to_owned())
            .render()
            .unwrap();
        assert!(rendered.contains("note"));
    }

    #[test]
    fn test_empty_printer() {
        assert_eq!(TablePrinter::new().render().unwrap(), "");
    }
}
