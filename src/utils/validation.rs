//! Upload limits and input sanitization.

/// Maximum number of data rows accepted from a single table (DOS protection)
pub const MAX_DATA_ROWS: usize = 100_000;

/// Security-related constants for input validation
pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MIN_FILE_CONTENT_SIZE: usize = 1;

/// Extensions accepted for uploaded tables
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".csv", ".tsv", ".txt"];

/// Check if adding another row would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Examples
///
/// ```
/// use mitofish_viz::utils::validation::{check_row_limit, MAX_DATA_ROWS};
///
/// assert!(check_row_limit(10).is_none());
/// assert!(check_row_limit(MAX_DATA_ROWS).is_some());
/// ```
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    if count >= MAX_DATA_ROWS {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {MAX_DATA_ROWS}"
        ))
    } else {
        None
    }
}

/// Security validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid filename: contains path traversal or invalid characters")]
    InvalidFilename,
    #[error("Empty filename provided")]
    EmptyFilename,
    #[error("Unsupported file type: expected .csv, .tsv or .txt")]
    UnsupportedExtension,
    #[error("File is empty")]
    EmptyFile,
    #[error("File content appears to be binary, not a text table")]
    BinaryContent,
}

impl ValidationError {
    /// Machine-readable category for API error bodies
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::FilenameTooLong | Self::InvalidFilename | Self::EmptyFilename => "invalid_filename",
            Self::UnsupportedExtension => "unsupported_file_type",
            Self::EmptyFile => "empty_file",
            Self::BinaryContent => "binary_content",
        }
    }
}

/// Secure filename validation to prevent directory traversal and other attacks
///
/// Validates and sanitizes filenames by:
/// - Checking length limits
/// - Preventing directory traversal (../, ..\\)
/// - Removing potentially dangerous characters
/// - Ensuring filename is not empty after sanitization
///
/// # Errors
///
/// Returns `ValidationError::EmptyFilename` if the filename is empty,
/// `ValidationError::FilenameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidFilename` if it contains invalid characters.
pub fn validate_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    if filename.contains('\0') || filename.chars().any(|c| ('\x01'..='\x1F').contains(&c)) {
        return Err(ValidationError::InvalidFilename);
    }

    // Keep only safe characters; Japanese site names survive as alphanumerics
    let sanitized = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '-' || *c == '_' || *c == ' ')
        .collect::<String>();

    if sanitized.trim().is_empty() {
        return Err(ValidationError::InvalidFilename);
    }

    // Hidden files only when the name is nothing but an allowed extension
    if sanitized.starts_with('.') && !has_known_extension(&sanitized) {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}

/// Check if filename has an allowed table extension
#[must_use]
pub fn has_known_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Heuristic binary check: NUL bytes, or more than 1% control bytes in the
/// first 8 KiB. Bytes >= 0x80 are allowed since Shift-JIS and UTF-8 use them.
#[must_use]
pub fn is_binary_content(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(8192)];
    if sample.contains(&0) {
        return true;
    }
    let control = sample
        .iter()
        .filter(|&&b| b < 9 || (b > 13 && b < 32) || b == 127)
        .count();
    control * 100 > sample.len()
}

/// Validate that uploaded content can plausibly be a text table
///
/// # Errors
///
/// Returns `ValidationError::EmptyFile` if the content is empty or only
/// whitespace, or `ValidationError::BinaryContent` if it looks binary.
pub fn validate_file_content(content: &[u8]) -> Result<(), ValidationError> {
    if content.len() < MIN_FILE_CONTENT_SIZE || content.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::EmptyFile);
    }

    if is_binary_content(content) {
        return Err(ValidationError::BinaryContent);
    }

    Ok(())
}

/// Comprehensive input validation combining filename and content checks
///
/// Returns the sanitized filename when one was supplied.
///
/// # Errors
///
/// Returns a `ValidationError` if the filename is unsafe, its extension is
/// not one of [`ALLOWED_EXTENSIONS`], or content validation fails.
pub fn validate_upload(
    filename: Option<&str>,
    content: &[u8],
) -> Result<Option<String>, ValidationError> {
    let validated_filename = if let Some(name) = filename {
        let sanitized = validate_filename(name)?;
        if !has_known_extension(&sanitized) {
            return Err(ValidationError::UnsupportedExtension);
        }
        Some(sanitized)
    } else {
        None
    };

    validate_file_content(content)?;

    Ok(validated_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_row_limit() {
        assert!(check_row_limit(100).is_none());
        assert!(check_row_limit(MAX_DATA_ROWS - 1).is_none());
        assert!(check_row_limit(MAX_DATA_ROWS).is_some());
        assert!(check_row_limit(MAX_DATA_ROWS + 1).is_some());
    }

    #[test]
    fn test_validate_filename_safe() {
        assert_eq!(validate_filename("fish.csv").unwrap(), "fish.csv");
        assert!(validate_filename("my-file.tsv").is_ok());
        assert!(validate_filename("run 123.txt").is_ok());
        assert_eq!(validate_filename("多摩川.csv").unwrap(), "多摩川.csv");
        assert_eq!(validate_filename("a$b.csv").unwrap(), "ab.csv");
    }

    #[test]
    fn test_validate_filename_dangerous() {
        assert!(validate_filename("../etc/passwd").is_err());
        assert!(validate_filename("..\\windows\\system32").is_err());
        assert!(validate_filename("test/../../secret").is_err());
        assert!(validate_filename("test\0.csv").is_err());
        assert!(validate_filename("test\x01.csv").is_err());
        assert!(validate_filename(&"a".repeat(300)).is_err());
        assert!(matches!(validate_filename("  "), Err(ValidationError::EmptyFilename)));
        assert!(validate_filename("$$$").is_err());
        assert!(validate_filename(".hidden").is_err());
    }

    #[test]
    fn test_known_extensions() {
        assert!(has_known_extension("a.csv"));
        assert!(has_known_extension("A.TSV"));
        assert!(has_known_extension("b.txt"));
        assert!(!has_known_extension("b.xlsx"));
        assert!(!has_known_extension("csv"));
    }

    #[test]
    fn test_binary_detection() {
        assert!(!is_binary_content(b"Species,s1\nTuna,1\n"));
        assert!(!is_binary_content("種名\tサンプル\r\n".as_bytes()));
        assert!(is_binary_content(b"PK\x03\x04\x00\x00"));
        let mut noisy = vec![b'a'; 200];
        noisy[0..5].copy_from_slice(&[1, 2, 3, 4, 5]);
        assert!(is_binary_content(&noisy));
    }

    #[test]
    fn test_validate_upload() {
        let table = b"Species,s1\nTuna,1\n";
        assert_eq!(
            validate_upload(Some("fish.csv"), table).unwrap(),
            Some("fish.csv".to_string())
        );
        assert_eq!(validate_upload(None, table).unwrap(), None);
        assert!(matches!(
            validate_upload(Some("fish.xlsx"), table),
            Err(ValidationError::UnsupportedExtension)
        ));
        assert!(matches!(
            validate_upload(Some("fish.csv"), b""),
            Err(ValidationError::EmptyFile)
        ));
        assert!(matches!(
            validate_upload(Some("fish.csv"), b"\n \n"),
            Err(ValidationError::EmptyFile)
        ));
        assert!(matches!(
            validate_upload(Some("fish.csv"), b"\x00\x01\x02"),
            Err(ValidationError::BinaryContent)
        ));
    }
}
