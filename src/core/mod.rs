//! Core data types for abundance-table analysis.
//!
//! - [`RawTable`]: a decoded table of raw string cells
//! - [`ColumnRoles`]: which columns hold species names and sample abundances
//! - [`AbundanceRecord`]: a long-form (sample, species, abundance) observation
//! - [`NormalizedTable`]: records plus data-quality notes from normalization
//! - [`TextEncoding`], [`Delimiter`], [`Detection`]: upload sniffing results
//! - [`Strictness`], [`Ranking`]: analysis policy switches
//!
//! [`RawTable`]: table::RawTable
//! [`ColumnRoles`]: table::ColumnRoles
//! [`AbundanceRecord`]: record::AbundanceRecord
//! [`NormalizedTable`]: record::NormalizedTable
//! [`TextEncoding`]: types::TextEncoding
//! [`Delimiter`]: types::Delimiter
//! [`Detection`]: types::Detection
//! [`Strictness`]: types::Strictness
//! [`Ranking`]: types::Ranking

pub mod record;
pub mod table;
pub mod types;
