use std::path::Path;

use crate::core::table::RawTable;
use crate::core::types::{Delimiter, Detection};
use crate::parsing::{detect, ParseError};
use crate::utils::validation::check_row_limit;

/// Read a table file, detecting its encoding and delimiter
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or any error from
/// [`read_table`].
pub fn read_table_file(path: &Path) -> Result<(Detection, RawTable), ParseError> {
    let bytes = std::fs::read(path)?;
    read_table(&bytes)
}

/// Decode raw bytes and split them into a [`RawTable`]
///
/// # Errors
///
/// Returns `ParseError::UnsupportedEncoding` if the bytes cannot be decoded,
/// or any error from [`parse_table`].
pub fn read_table(bytes: &[u8]) -> Result<(Detection, RawTable), ParseError> {
    let (detection, text) = detect::decode(bytes)?;
    let table = parse_table(&text, detection.delimiter)?;
    Ok((detection, table))
}

/// Split decoded text into a header row and data rows.
///
/// Quoted fields may contain the delimiter. Header names are trimmed of
/// surrounding whitespace; cells are kept raw. Blank lines are skipped.
///
/// # Errors
///
/// Returns `ParseError::EmptyTable` if there is no header or no data row,
/// `ParseError::Csv` for malformed quoting, or `ParseError::TooManyRows` if
/// the row limit is exceeded.
pub fn parse_table(text: &str, delimiter: Delimiter) -> Result<RawTable, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(ParseError::EmptyTable);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;

        // Check row limit for DOS protection
        if check_row_limit(rows.len()).is_some() {
            return Err(ParseError::TooManyRows(rows.len() + 1));
        }

        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    if rows.is_empty() {
        return Err(ParseError::EmptyTable);
    }

    tracing::debug!(
        "Parsed table with {} columns and {} data rows",
        headers.len(),
        rows.len()
    );

    Ok(RawTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        let text = "TaxonID,Species,a.fastq,b.fastq\n1,Tuna,10,0\n2,Cod,5,5\n";
        let table = parse_table(text, Delimiter::Comma).unwrap();
        assert_eq!(table.headers, vec!["TaxonID", "Species", "a.fastq", "b.fastq"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(1, "Species"), Some("Cod"));
    }

    #[test]
    fn test_parse_tsv_with_quotes_and_blank_lines() {
        let text = "Species\ts1\n\"Thunnus\tsp.\"\t4\n\nCod\t2\n";
        let table = parse_table(text, Delimiter::Tab).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), Some("Thunnus\tsp."));
    }

    #[test]
    fn test_headers_trimmed_cells_raw() {
        let table = parse_table(" Species , s1 \n Tuna , 3 \n", Delimiter::Comma).unwrap();
        assert_eq!(table.headers, vec!["Species", "s1"]);
        assert_eq!(table.cell(0, 0), Some(" Tuna "));
    }

    #[test]
    fn test_ragged_rows() {
        let table = parse_table("Species,s1,s2\nTuna,1\nCod,1,2,3\n", Delimiter::Comma).unwrap();
        assert_eq!(table.cell(0, 2), Some(""));
        assert_eq!(table.rows().nth(1).map(<[String]>::len), Some(3));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(
            parse_table("Species,s1\n", Delimiter::Comma),
            Err(ParseError::EmptyTable)
        ));
        assert!(matches!(
            parse_table("", Delimiter::Comma),
            Err(ParseError::EmptyTable)
        ));
    }

    #[test]
    fn test_read_table_detects() {
        let (detection, table) = read_table(b"Species\ts1\nTuna\t1\n").unwrap();
        assert_eq!(detection.delimiter, Delimiter::Tab);
        assert_eq!(table.column_count(), 2);
    }
}
