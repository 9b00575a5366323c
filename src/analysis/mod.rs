//! Aggregation and diversity statistics over normalized abundance records.
//!
//! - [`aggregate`]: per-sample totals, proportions and the top-N plus "Other" view
//! - [`diversity`]: species richness, Shannon and Simpson indices
//! - [`matrix`]: species × sample grid for heatmaps, and dataset headline numbers
//! - [`session`]: one parsed upload, re-aggregated as display options change
//!
//! All functions here are pure: the same records always give the same output.
//!
//! ## Example
//!
//! ```rust
//! use mitofish_viz::analysis::{aggregate::summarize, diversity::diversity};
//! use mitofish_viz::core::record::AbundanceRecord;
//!
//! let records = vec![
//!     AbundanceRecord::new("site1", "Tuna", 10.0),
//!     AbundanceRecord::new("site1", "Cod", 5.0),
//! ];
//!
//! let summaries = summarize(&records, 1);
//! assert_eq!(summaries[0].entries.len(), 2); // Tuna + Other
//!
//! let metrics = diversity(&records);
//! assert_eq!(metrics[0].richness, 2);
//! ```

pub mod aggregate;
pub mod diversity;
pub mod matrix;
pub mod session;

pub use aggregate::{EntryKind, SampleSummary, SummaryEntry};
pub use diversity::DiversityMetrics;
pub use matrix::{AbundanceMatrix, DatasetOverview};
pub use session::AnalysisSession;
