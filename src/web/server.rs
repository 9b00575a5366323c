use axum::http::header;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::analysis::AnalysisSession;
use crate::cli::ServeArgs;
use crate::config::{AnalysisConfig, MAX_TOP_N};
use crate::core::types::{Ranking, Strictness};
use crate::export::{self, ExportTable};
use crate::parsing::ParseError;
use crate::utils::validation::{validate_upload, MAX_DATA_ROWS};

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_MULTIPART_FIELDS: usize = 10;
pub const MAX_FILE_FIELD_SIZE: usize = 16 * 1024 * 1024; // 16MB
pub const MAX_TEXT_FIELD_SIZE: usize = 1024; // option fields are short
pub const MAX_BODY_SIZE: usize = 20 * 1024 * 1024; // largest file + multipart overhead

/// Shared application state
pub struct AppState {
    /// Defaults for every request; per-request form fields override them
    pub config: AnalysisConfig,
}

/// Upload and display options extracted from a multipart form.
/// Options left unset keep the server defaults.
#[derive(Debug, Default)]
struct UploadRequest {
    content: Vec<u8>,
    filename: Option<String>,
    top_n: Option<usize>,
    ranking: Option<Ranking>,
    strictness: Option<Strictness>,
    log_scale: bool,
}

impl UploadRequest {
    fn analysis_config(&self, defaults: &AnalysisConfig) -> AnalysisConfig {
        let mut config = defaults.clone();
        if let Some(top_n) = self.top_n {
            config = config.with_top_n(top_n);
        }
        if let Some(ranking) = self.ranking {
            config = config.with_ranking(ranking);
        }
        if let Some(strictness) = self.strictness {
            config = config.with_strictness(strictness);
        }
        config
    }
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

#[derive(Deserialize)]
struct ExportQueryParams {
    table: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None, // Never expose internal details to prevent information disclosure
    }
}

fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

/// Map an ingestion failure to a 400 response.
///
/// Parse errors describe the user's table, so their message is shown as is.
/// I/O failures are server-side and only logged.
fn parse_error_response(error: &ParseError) -> Response {
    let body = match error {
        ParseError::Io(e) => create_safe_error_response(
            error.error_type(),
            "Failed to read the uploaded table.",
            Some(&e.to_string()),
        ),
        _ => {
            tracing::warn!("Rejected upload: {error}");
            create_safe_error_response(error.error_type(), &error.to_string(), None)
        }
    };
    error_response(StatusCode::BAD_REQUEST, body)
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs, config: AnalysisConfig) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, config).await })
}

/// Application routes and state, without the connection-level middleware.
///
/// Requests can be driven through this router directly (for example with
/// `tower::ServiceExt::oneshot`) since nothing here needs peer addresses.
pub fn create_routes(config: AnalysisConfig) -> Router {
    let state = Arc::new(AppState { config });

    Router::new()
        .route("/", get(index_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/export", post(export_handler))
        .route("/api/rules", get(rules_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(config: AnalysisConfig) -> anyhow::Result<Router> {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    let app = create_routes(config).layer(
        ServiceBuilder::new()
            // Security headers for browser protection
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
            // IP-based rate limiting to prevent abuse
            .layer(GovernorLayer {
                config: Arc::new(governor_conf),
            })
            // Request timeout to prevent slow client attacks
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(30),
            ))
            // Limit concurrent requests to prevent DOS
            .layer(ConcurrencyLimitLayer::new(100)),
    );

    Ok(app)
}

async fn run_server(args: ServeArgs, config: AnalysisConfig) -> anyhow::Result<()> {
    let app = create_router(config)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting mitofish-viz web server at http://{addr}");

    if args.open {
        if let Err(e) = open::that(format!("http://{addr}")) {
            tracing::warn!("Could not open browser: {e}");
        }
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Main page handler
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

/// Full analysis of an uploaded table: everything the page needs to draw its charts
async fn analyze_handler(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let start_time = Instant::now();

    let request = match extract_request_data(&mut multipart).await {
        Ok(request) => request,
        Err(error_response) => return error_response,
    };

    let config = request.analysis_config(&state.config);
    let session = match AnalysisSession::from_bytes(&request.content, &config) {
        Ok(session) => session,
        Err(e) => return parse_error_response(&e),
    };

    let summaries = session.summaries(config.top_n, config.ranking);
    let normalized = &session.normalized;

    #[allow(clippy::cast_possible_truncation)] // Processing time won't exceed u64
    let processing_time = start_time.elapsed().as_millis() as u64;

    Json(serde_json::json!({
        "detection": {
            "encoding": session.detection.encoding.display_name(),
            "delimiter": session.detection.delimiter.to_string(),
        },
        "roles": session.roles,
        "samples": normalized.samples,
        "overview": session.overview(),
        "summaries": summaries,
        "matrix": session.matrix(request.log_scale),
        "diversity": session.diversity(),
        "warnings": {
            "coerced_cells": normalized.coerced_cells,
            "rows_dropped": normalized.rows_dropped,
            "cells": normalized.warnings,
        },
        "processing_info": {
            "filename": request.filename,
            "processing_time_ms": processing_time,
            "configuration": {
                "top_n": config.top_n,
                "ranking": config.ranking,
                "strictness": config.strictness,
                "log_scale": request.log_scale,
                "other_label": config.other_label,
            },
        },
    }))
    .into_response()
}

/// CSV download of one derived table
async fn export_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportQueryParams>,
    mut multipart: Multipart,
) -> Response {
    let table = match params.table.as_deref().map(str::parse::<ExportTable>) {
        Some(Ok(table)) => table,
        Some(Err(e)) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                create_safe_error_response("unknown_export_table", &e.to_string(), None),
            );
        }
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                create_safe_error_response(
                    "missing_export_table",
                    "Missing 'table' query parameter.",
                    None,
                ),
            );
        }
    };

    let request = match extract_request_data(&mut multipart).await {
        Ok(request) => request,
        Err(error_response) => return error_response,
    };

    let config = request.analysis_config(&state.config);
    let session = match AnalysisSession::from_bytes(&request.content, &config) {
        Ok(session) => session,
        Err(e) => return parse_error_response(&e),
    };

    let bytes = match export::render(&session, table, config.top_n, config.ranking) {
        Ok(bytes) => bytes,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                create_safe_error_response(
                    "export_failed",
                    "Failed to build the CSV file.",
                    Some(&e.to_string()),
                ),
            );
        }
    };

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let disposition = format!("attachment; filename=\"{}\"", table.file_name(&timestamp));

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

/// Active column rules and analysis defaults
async fn rules_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let config = &state.config;
    Json(serde_json::json!({
        "rules": config.rules,
        "defaults": {
            "top_n": config.top_n,
            "max_top_n": MAX_TOP_N,
            "ranking": config.ranking,
            "strictness": config.strictness,
            "other_label": config.other_label,
        },
        "limits": {
            "max_file_size": MAX_FILE_FIELD_SIZE,
            "max_rows": MAX_DATA_ROWS,
        },
    }))
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

async fn extract_request_data(multipart: &mut Multipart) -> Result<UploadRequest, Response> {
    let mut content: Option<Vec<u8>> = None;
    let mut request = UploadRequest::default();

    let mut fields_received = 0usize;
    let mut had_parse_error = false;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => {
                had_parse_error = true;
                break;
            }
        };

        fields_received += 1;
        if fields_received > MAX_MULTIPART_FIELDS {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                create_safe_error_response("field_limit_exceeded", "Too many form fields", None),
            ));
        }
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let filename = field.file_name().map(std::string::ToString::to_string);
            let Ok(bytes) = field.bytes().await else {
                had_parse_error = true;
                continue;
            };

            if bytes.len() > MAX_FILE_FIELD_SIZE {
                return Err(error_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    create_safe_error_response("file_too_large", "File size exceeds limit", None),
                ));
            }

            match validate_upload(filename.as_deref(), &bytes) {
                Ok(validated_filename) => {
                    request.filename = validated_filename;
                    content = Some(bytes.to_vec());
                }
                Err(e) => {
                    return Err(error_response(
                        StatusCode::BAD_REQUEST,
                        create_safe_error_response(e.error_type(), &e.to_string(), None),
                    ));
                }
            }
            continue;
        }

        let Ok(text) = field.text().await else {
            had_parse_error = true;
            continue;
        };
        if text.len() > MAX_TEXT_FIELD_SIZE {
            return Err(error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                create_safe_error_response("text_too_large", "Text field size exceeds limit", None),
            ));
        }

        // Unparseable option values fall back to the defaults
        match name.as_str() {
            "top_n" => {
                if let Ok(n) = text.trim().parse::<usize>() {
                    request.top_n = Some(n);
                }
            }
            "ranking" => {
                if let Ok(ranking) = text.parse::<Ranking>() {
                    request.ranking = Some(ranking);
                }
            }
            "strict" => {
                if let Some(strict) = parse_flag(&text) {
                    request.strictness = Some(if strict {
                        Strictness::Strict
                    } else {
                        Strictness::Lenient
                    });
                }
            }
            "log_scale" => {
                if let Some(log_scale) = parse_flag(&text) {
                    request.log_scale = log_scale;
                }
            }
            _ => {} // Ignore unknown fields
        }
    }

    let Some(content) = content else {
        let error_msg = if had_parse_error {
            "Failed to parse upload. Please check the file format."
        } else {
            "No file received. Please upload a CSV or TSV species table."
        };
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            create_safe_error_response("missing_input", error_msg, None),
        ));
    };

    request.content = content;
    Ok(request)
}
