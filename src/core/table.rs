use serde::{Deserialize, Serialize};

/// A decoded, delimiter-split table: a header row plus raw string cells.
///
/// Every row has exactly one cell per header. Short rows are padded with
/// empty cells when the table is built, so column indices are always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table, padding or truncating each row to the header width
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Number of data rows (header excluded)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Index of the first header equal to `name`
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Raw cell at (row, column), or `None` when out of range
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Raw cell looked up by header name
    #[must_use]
    pub fn get(&self, row: usize, header: &str) -> Option<&str> {
        self.cell(row, self.column_index(header)?)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// All cells of one column, top to bottom
    pub fn column(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(column).map_or("", String::as_str))
    }
}

/// One classified column: its position and header text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub index: usize,
    pub header: String,
}

/// Which columns of a [`RawTable`] hold species names and per-sample abundances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    pub species: ColumnRef,
    pub samples: Vec<ColumnRef>,
    /// Name of the rule that picked the species column
    pub species_rule: String,
    /// Name of the rule that picked the sample columns
    pub sample_rule: String,
}

impl ColumnRoles {
    #[must_use]
    pub fn sample_headers(&self) -> Vec<&str> {
        self.samples.iter().map(|c| c.header.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        RawTable::new(
            vec!["Species".into(), "s1".into(), "s2".into()],
            vec![
                vec!["Tuna".into(), "10".into(), "0".into()],
                vec!["Cod".into(), "5".into()],
            ],
        )
    }

    #[test]
    fn test_short_rows_are_padded() {
        let t = table();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.cell(1, 2), Some(""));
        assert_eq!(t.cell(2, 0), None);
    }

    #[test]
    fn test_lookup_by_header() {
        let t = table();
        assert_eq!(t.get(0, "s1"), Some("10"));
        assert_eq!(t.get(0, "missing"), None);
        assert_eq!(t.column(0).collect::<Vec<_>>(), vec!["Tuna", "Cod"]);
    }
}
