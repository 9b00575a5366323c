use serde::{Deserialize, Serialize};

/// Text encodings accepted for uploaded tables, in detection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// UTF-8 preceded by a byte-order mark (stripped before parsing)
    Utf8Bom,
    Utf8,
    /// Shift-JIS, common for tables exported from Japanese Excel installs
    ShiftJis,
}

impl TextEncoding {
    /// Candidates tried by the detector, in order
    pub const CANDIDATES: [TextEncoding; 3] = [Self::Utf8Bom, Self::Utf8, Self::ShiftJis];

    #[must_use]
    #[allow(clippy::trivially_copy_pass_by_ref)] // Idiomatic method signature
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Utf8Bom => "UTF-8 (BOM)",
            Self::Utf8 => "UTF-8",
            Self::ShiftJis => "Shift-JIS",
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Field delimiter of an uploaded table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Candidates in tie-break order: comma wins a tie
    pub const CANDIDATES: [Delimiter; 2] = [Self::Comma, Self::Tab];

    #[must_use]
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
        }
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comma => write!(f, "comma"),
            Self::Tab => write!(f, "tab"),
        }
    }
}

/// Result of sniffing raw upload bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub encoding: TextEncoding,
    pub delimiter: Delimiter,
}

/// How the normalizer treats abundance cells that are not non-negative numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Coerce bad cells to zero and report a warning
    #[default]
    Lenient,
    /// Reject the table on the first bad cell
    Strict,
}

/// How species are ranked when collapsing to top-N plus Other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Ranking {
    /// Each sample keeps its own top-N species
    #[default]
    PerSample,
    /// Species are ranked by their total over all samples, so every bar shares one legend
    Global,
}

impl std::str::FromStr for Ranking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "per-sample" | "sample" => Ok(Self::PerSample),
            "global" => Ok(Self::Global),
            other => Err(format!("unknown ranking '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        assert_eq!(
            TextEncoding::CANDIDATES,
            [
                TextEncoding::Utf8Bom,
                TextEncoding::Utf8,
                TextEncoding::ShiftJis
            ]
        );
        assert_eq!(Delimiter::CANDIDATES[0], Delimiter::Comma);
    }

    #[test]
    fn test_ranking_from_str() {
        assert_eq!("global".parse::<Ranking>(), Ok(Ranking::Global));
        assert_eq!("per_sample".parse::<Ranking>(), Ok(Ranking::PerSample));
        assert_eq!("Per-Sample".parse::<Ranking>(), Ok(Ranking::PerSample));
        assert!("weekly".parse::<Ranking>().is_err());
    }
}
