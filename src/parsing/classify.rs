//! Column-role detection.
//!
//! Roles are assigned by two ordered rule lists. Each rule either matches or
//! passes, and the first match wins:
//!
//! | Role    | Rule                     | Matches when                                          |
//! |---------|--------------------------|-------------------------------------------------------|
//! | species | `species_alias`          | a header equals an alias, ignoring case               |
//! | species | `positional_fallback`    | opt-in; the second column exists                      |
//! | samples | `sequencing_file_header` | headers contain a sequencing-file extension (`.fastq`) |
//! | samples | `numeric_content`        | every non-empty cell parses as a number               |
//!
//! `numeric_content` skips metadata columns: headers containing an exclusion
//! substring (`Identity`, `Max Score`) or equal to a taxonomy header (`Family`).

use crate::config::ColumnRules;
use crate::core::table::{ColumnRef, ColumnRoles, RawTable};
use crate::parsing::ParseError;

/// Result of evaluating one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome<T> {
    Match(T),
    Pass,
}

/// A rule that locates the species-name column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeciesRule {
    /// First header equal (case-insensitively) to one of the aliases
    Alias(Vec<String>),
    /// A fixed column position, used only when enabled in the rules file
    Position(usize),
}

impl SpeciesRule {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Alias(_) => "species_alias",
            Self::Position(_) => "positional_fallback",
        }
    }

    #[must_use]
    pub fn apply(&self, table: &RawTable) -> RuleOutcome<usize> {
        let found = match self {
            Self::Alias(aliases) => table.headers.iter().position(|header| {
                let header = header.trim().to_lowercase();
                aliases.iter().any(|alias| alias.trim().to_lowercase() == header)
            }),
            Self::Position(index) => (*index < table.column_count()).then_some(*index),
        };
        found.map_or(RuleOutcome::Pass, RuleOutcome::Match)
    }
}

/// A rule that selects sample (abundance) columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleRule {
    /// Headers containing any of the patterns, ignoring case
    HeaderPattern(Vec<String>),
    /// Columns whose non-empty cells are all numeric, minus metadata headers
    NumericContent {
        exclusions: Vec<String>,
        headers: Vec<String>,
    },
}

impl SampleRule {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::HeaderPattern(_) => "sequencing_file_header",
            Self::NumericContent { .. } => "numeric_content",
        }
    }

    /// Evaluate against every column except the species column
    #[must_use]
    pub fn apply(&self, table: &RawTable, species: usize) -> RuleOutcome<Vec<usize>> {
        let candidates = (0..table.column_count()).filter(|&i| i != species);

        let selected: Vec<usize> = match self {
            Self::HeaderPattern(patterns) => candidates
                .filter(|&i| contains_any(&table.headers[i], patterns))
                .collect(),
            Self::NumericContent {
                exclusions,
                headers,
            } => candidates
                .filter(|&i| !table.headers[i].is_empty())
                .filter(|&i| !contains_any(&table.headers[i], exclusions))
                .filter(|&i| !equals_any(&table.headers[i], headers))
                .filter(|&i| is_numeric_column(table, i))
                .collect(),
        };

        if selected.is_empty() {
            RuleOutcome::Pass
        } else {
            RuleOutcome::Match(selected)
        }
    }
}

/// Species rules in evaluation order
#[must_use]
pub fn species_rules(rules: &ColumnRules) -> Vec<SpeciesRule> {
    let mut ordered = vec![SpeciesRule::Alias(rules.species_aliases.clone())];
    if rules.positional_species_fallback {
        ordered.push(SpeciesRule::Position(1));
    }
    ordered
}

/// Sample rules in evaluation order
#[must_use]
pub fn sample_rules(rules: &ColumnRules) -> Vec<SampleRule> {
    vec![
        SampleRule::HeaderPattern(rules.sample_header_patterns.clone()),
        SampleRule::NumericContent {
            exclusions: rules.metadata_exclusions.clone(),
            headers: rules.metadata_headers.clone(),
        },
    ]
}

/// Assign species and sample roles to the columns of a table
///
/// # Errors
///
/// Returns `ParseError::SpeciesColumnNotFound` if no species rule matches, or
/// `ParseError::NoSampleColumnsFound` if no sample rule matches.
pub fn classify(table: &RawTable, rules: &ColumnRules) -> Result<ColumnRoles, ParseError> {
    let (species, species_rule) = species_rules(rules)
        .iter()
        .find_map(|rule| match rule.apply(table) {
            RuleOutcome::Match(index) => Some((index, rule.name())),
            RuleOutcome::Pass => {
                tracing::debug!("Species rule '{}' passed", rule.name());
                None
            }
        })
        .ok_or_else(|| ParseError::SpeciesColumnNotFound {
            aliases: rules.species_aliases.clone(),
        })?;

    let (samples, sample_rule) = sample_rules(rules)
        .iter()
        .find_map(|rule| match rule.apply(table, species) {
            RuleOutcome::Match(indices) => Some((indices, rule.name())),
            RuleOutcome::Pass => {
                tracing::debug!("Sample rule '{}' passed", rule.name());
                None
            }
        })
        .ok_or(ParseError::NoSampleColumnsFound)?;

    tracing::info!(
        "Species column '{}' ({species_rule}), {} sample columns ({sample_rule})",
        table.headers[species],
        samples.len()
    );

    Ok(ColumnRoles {
        species: column_ref(table, species),
        samples: samples.into_iter().map(|i| column_ref(table, i)).collect(),
        species_rule: species_rule.to_string(),
        sample_rule: sample_rule.to_string(),
    })
}

fn column_ref(table: &RawTable, index: usize) -> ColumnRef {
    ColumnRef {
        index,
        header: table.headers[index].clone(),
    }
}

fn contains_any(header: &str, patterns: &[String]) -> bool {
    let header = header.to_lowercase();
    patterns
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| header.contains(&p.to_lowercase()))
}

fn equals_any(header: &str, names: &[String]) -> bool {
    let header = header.trim().to_lowercase();
    names.iter().any(|n| n.trim().to_lowercase() == header)
}

/// True when the column has at least one value and every non-empty cell is a number
fn is_numeric_column(table: &RawTable, column: usize) -> bool {
    let mut seen_value = false;
    for cell in table.column(column) {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        if cell.parse::<f64>().is_err() {
            return false;
        }
        seen_value = true;
    }
    seen_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Delimiter;
    use crate::parsing::table::parse_table;

    fn rules() -> ColumnRules {
        ColumnRules::load_embedded().unwrap()
    }

    fn table(text: &str) -> RawTable {
        parse_table(text, Delimiter::Comma).unwrap()
    }

    #[test]
    fn test_fastq_headers() {
        let t = table("TaxonID,Species,Identity,a.fastq,B.FASTQ.gz\n1,Tuna,99.1,3,4\n");
        let roles = classify(&t, &rules()).unwrap();
        assert_eq!(roles.species.header, "Species");
        assert_eq!(roles.species.index, 1);
        assert_eq!(roles.sample_headers(), vec!["a.fastq", "B.FASTQ.gz"]);
        assert_eq!(roles.species_rule, "species_alias");
        assert_eq!(roles.sample_rule, "sequencing_file_header");
    }

    #[test]
    fn test_japanese_alias() {
        let t = table("種名,s1,s2\nマグロ,1,2\n");
        let roles = classify(&t, &rules()).unwrap();
        assert_eq!(roles.species.header, "種名");
        assert_eq!(roles.sample_headers(), vec!["s1", "s2"]);
        assert_eq!(roles.sample_rule, "numeric_content");
    }

    #[test]
    fn test_alias_case_insensitive() {
        let t = table("id,sPeCiEs,s1\n1,Tuna,3\n");
        let roles = classify(&t, &rules()).unwrap();
        assert_eq!(roles.species.index, 1);
        // The numeric id column is a sample column under the numeric rule
        assert_eq!(roles.sample_headers(), vec!["id", "s1"]);
    }

    #[test]
    fn test_numeric_fallback_excludes_metadata() {
        let t = table(
            "TaxonID,Species,Class,Identity,Max Score,Positive,site1,site2,note\n\
             7,Tuna,Actinopteri,99.5,300,1,10,,x\n\
             8,Cod,Actinopteri,98.0,250,1,2,4,\n",
        );
        let roles = classify(&t, &rules()).unwrap();
        assert_eq!(roles.sample_headers(), vec!["site1", "site2"]);
    }

    #[test]
    fn test_taxonomy_headers_match_whole_name() {
        let t = table(
            "Species,Order,GENUS,border_creek,classroom_pond,family_farm,river\n\
             Carp,3,1,2,5,6,7\n",
        );
        let roles = classify(&t, &rules()).unwrap();
        assert_eq!(
            roles.sample_headers(),
            vec!["border_creek", "classroom_pond", "family_farm", "river"]
        );
    }

    #[test]
    fn test_species_column_never_sample() {
        let t = table("Species,s1\n1,2\n");
        let roles = classify(&t, &rules()).unwrap();
        assert!(roles.samples.iter().all(|c| c.index != roles.species.index));
        assert_eq!(roles.sample_headers(), vec!["s1"]);
    }

    #[test]
    fn test_species_not_found() {
        let t = table("Name,s1\nTuna,1\n");
        let err = classify(&t, &rules()).unwrap_err();
        assert!(matches!(err, ParseError::SpeciesColumnNotFound { .. }));
        assert!(err.to_string().contains("種名"));
    }

    #[test]
    fn test_positional_fallback_opt_in() {
        let mut rules = rules();
        rules.positional_species_fallback = true;
        let t = table("TaxonID,Name,s1\n1,Tuna,1\n");
        let roles = classify(&t, &rules).unwrap();
        assert_eq!(roles.species.header, "Name");
        assert_eq!(roles.species_rule, "positional_fallback");
    }

    #[test]
    fn test_no_sample_columns() {
        let t = table("Species,Family,comment\nTuna,Scombridae,seen\n");
        assert!(matches!(
            classify(&t, &rules()),
            Err(ParseError::NoSampleColumnsFound)
        ));
    }

    #[test]
    fn test_all_empty_column_is_not_numeric() {
        let t = table("Species,s1,s2\nTuna,,3\nCod,,1\n");
        let roles = classify(&t, &rules()).unwrap();
        assert_eq!(roles.sample_headers(), vec!["s2"]);
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = sample_rules(&rules()).iter().map(SampleRule::name).collect();
        assert_eq!(names, vec!["sequencing_file_header", "numeric_content"]);
        assert_eq!(species_rules(&rules()).len(), 1);
    }
}
