use crate::config::AnalysisConfig;
use crate::core::record::{AbundanceRecord, CellWarning, NormalizedTable};
use crate::core::table::{ColumnRoles, RawTable};
use crate::core::types::Strictness;
use crate::parsing::sample_names::clean_sample_names;
use crate::parsing::ParseError;

/// Maximum number of individual cell warnings kept; the total is still counted
pub const MAX_CELL_WARNINGS: usize = 100;

/// Interpretation of a single abundance cell
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Value(f64),
    Blank,
    Invalid,
}

fn parse_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Blank;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Cell::Value(v),
        _ => Cell::Invalid,
    }
}

/// Reshape a wide species-by-sample table into long-form records.
///
/// One record is emitted per (row, sample column). Rows whose species name is
/// blank after trimming are dropped. Blank cells count as zero. Cells that are
/// not finite non-negative numbers are zeroed and reported in lenient mode,
/// and rejected in strict mode.
///
/// # Errors
///
/// Returns `ParseError::EmptyTable` if no row has a species name, or
/// `ParseError::InvalidCell` for a bad cell under [`Strictness::Strict`].
pub fn normalize(
    table: &RawTable,
    roles: &ColumnRoles,
    config: &AnalysisConfig,
) -> Result<NormalizedTable, ParseError> {
    let headers = roles.sample_headers();
    let samples = if config.clean_sample_names {
        clean_sample_names(&headers)
    } else {
        headers.iter().map(|h| (*h).to_string()).collect()
    };

    let mut records = Vec::with_capacity(table.row_count() * samples.len());
    let mut warnings = Vec::new();
    let mut coerced_cells = 0usize;
    let mut rows_kept = 0usize;
    let mut rows_dropped = 0usize;

    for (i, row) in table.rows().enumerate() {
        // Row numbers in messages are 1-based for user friendliness
        let row_num = i + 1;

        let species = row[roles.species.index].trim();
        if species.is_empty() {
            rows_dropped += 1;
            continue;
        }
        rows_kept += 1;

        for (column, sample) in roles.samples.iter().zip(&samples) {
            let raw = &row[column.index];
            let abundance = match parse_cell(raw) {
                Cell::Value(v) => v,
                Cell::Blank => 0.0,
                Cell::Invalid => match config.strictness {
                    Strictness::Strict => {
                        return Err(ParseError::InvalidCell {
                            row: row_num,
                            column: column.header.clone(),
                            value: raw.clone(),
                        });
                    }
                    Strictness::Lenient => {
                        coerced_cells += 1;
                        if warnings.len() < MAX_CELL_WARNINGS {
                            warnings.push(CellWarning {
                                row: row_num,
                                column: column.header.clone(),
                                value: raw.clone(),
                            });
                        }
                        0.0
                    }
                },
            };

            records.push(AbundanceRecord::new(sample.clone(), species, abundance));
        }
    }

    if rows_kept == 0 {
        return Err(ParseError::EmptyTable);
    }

    if coerced_cells > 0 {
        tracing::warn!("{coerced_cells} abundance cells were not numbers and were counted as 0");
    }
    if rows_dropped > 0 {
        tracing::debug!("Dropped {rows_dropped} rows with no species name");
    }

    Ok(NormalizedTable {
        records,
        samples,
        rows_kept,
        rows_dropped,
        coerced_cells,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::classify::classify;
    use crate::parsing::table::read_table;

    fn run(text: &str, strictness: Strictness) -> Result<NormalizedTable, ParseError> {
        let config = AnalysisConfig::load(None)
            .unwrap()
            .with_strictness(strictness);
        let (_, table) = read_table(text.as_bytes()).unwrap();
        let roles = classify(&table, &config.rules).unwrap();
        normalize(&table, &roles, &config)
    }

    #[test]
    fn test_record_count() {
        let n = run(
            "Species,sample1.fastq,sample2.fastq\nTuna,10,0\nCod,5,5\nSalmon,0,5\n",
            Strictness::Lenient,
        )
        .unwrap();
        assert_eq!(n.records.len(), 6);
        assert_eq!(n.samples, vec!["sample1", "sample2"]);
        assert_eq!(n.records[0], AbundanceRecord::new("sample1", "Tuna", 10.0));
        assert_eq!(n.species(), vec!["Tuna", "Cod", "Salmon"]);
    }

    #[test]
    fn test_blank_species_dropped_and_trimmed() {
        let n = run(
            "Species,s1,s2\n  Tuna ,1,2\n   ,3,4\n,5,6\nCod,7,8\n",
            Strictness::Lenient,
        )
        .unwrap();
        assert_eq!(n.records.len(), 4);
        assert_eq!(n.rows_kept, 2);
        assert_eq!(n.rows_dropped, 2);
        assert_eq!(n.records[0].species, "Tuna");
    }

    #[test]
    fn test_lenient_coercion() {
        // s1 has a bad cell but is chosen by header pattern
        let n = run(
            "Species,s1.fastq\nTuna,abc\nCod,-3\nEel,\nRay,NaN\nCarp,2.5\n",
            Strictness::Lenient,
        )
        .unwrap();
        let values: Vec<f64> = n.records.iter().map(|r| r.abundance).collect();
        assert_eq!(values, vec![0.0, 0.0, 0.0, 0.0, 2.5]);
        // Blank cells are not reported
        assert_eq!(n.coerced_cells, 3);
        assert_eq!(n.warnings.len(), 3);
        assert_eq!(n.warnings[0].row, 1);
        assert_eq!(n.warnings[0].column, "s1.fastq");
        assert_eq!(n.warnings[1].value, "-3");
    }

    #[test]
    fn test_strict_rejects() {
        let err = run("Species,s1.fastq\nTuna,1\nCod,x\n", Strictness::Strict).unwrap_err();
        match err {
            ParseError::InvalidCell { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "s1.fastq");
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_warning_cap() {
        let mut text = String::from("Species,s1.fastq\n");
        for i in 0..(MAX_CELL_WARNINGS + 20) {
            text.push_str(&format!("sp{i},bad\n"));
        }
        let n = run(&text, Strictness::Lenient).unwrap();
        assert_eq!(n.coerced_cells, MAX_CELL_WARNINGS + 20);
        assert_eq!(n.warnings.len(), MAX_CELL_WARNINGS);
    }

    #[test]
    fn test_all_rows_blank_species() {
        let err = run("Species,s1.fastq\n,1\n ,2\n", Strictness::Lenient).unwrap_err();
        assert!(matches!(err, ParseError::EmptyTable));
    }

    #[test]
    fn test_raw_sample_names() {
        let mut config = AnalysisConfig::load(None).unwrap();
        config.clean_sample_names = false;
        let (_, table) = read_table(b"Species,1-1-tamagawa-6000.fastq\nTuna,1\n").unwrap();
        let roles = classify(&table, &config.rules).unwrap();
        let n = normalize(&table, &roles, &config).unwrap();
        assert_eq!(n.samples, vec!["1-1-tamagawa-6000.fastq"]);
    }
}
