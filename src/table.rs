//! A named table of strings, the unit handed to the writers.

/// A named table with ordered columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table.
    pub fn new<T, C>(name: T, columns: &[C]) -> Self
    where
        T: Into<String>,
        C: AsRef<str>,
    {
        Table {
            name: name.into(),
            columns: columns.iter().map(|c| c.as_ref().to_owned()).collect(),
            rows: vec![],
        }
    }

    /// Add a row. It must have a value for every column.
    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len(), "Row does not match columns.");
        self.rows.push(row);
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// True if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The values in a column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_column_lookup() {
        let mut table = Table::new("Summary", &["Metric", "Value"]);
        assert!(table.is_empty());

        table.push_row(vec!["Records".to_owned(), "12".to_owned()]);
        table.push_row(vec!["Species".to_owned(), "4".to_owned()]);

        assert_eq!(table.name(), "Summary");
        assert_eq!(table.column("Value"), Some(vec!["12", "4"]));
        assert_eq!(table.column("Nope"), None);
    }
}
