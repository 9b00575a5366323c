//! Web server for browser-based species composition charts.
//!
//! This module provides an interactive web interface using Axum. The page
//! uploads a species table and draws stacked bars, a heatmap and diversity
//! charts from the JSON the API returns.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! mitofish-viz serve
//!
//! # Custom port and auto-open browser
//! mitofish-viz serve --port 3000 --open
//!
//! # Bind to all interfaces
//! mitofish-viz serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /` - Upload page with charts
//! - `POST /api/analyze` - Analyze an uploaded table (multipart form)
//! - `POST /api/export?table=<kind>` - Download a derived table as CSV
//! - `GET /api/rules` - Active column rules and defaults

pub mod server;
