//! HTTP Server for the syllabus API.
//!
//! # API Endpoints
//!
//! | Method | Path                    | Description                               |
//! |--------|-------------------------|-------------------------------------------|
//! | GET    | `/health`               | Health check                              |
//! | POST   | `/api/spreadsheet`      | Model output JSON to rows + CSV (JSON)    |
//! | POST   | `/api/spreadsheet.csv`  | Model output JSON to CSV download         |
//! | POST   | `/api/syllabus`         | Syllabus text to rows + CSV via extractor |
//! | GET    | `/api/logs`             | SSE stream for real-time logs             |
//!
//! The spreadsheet endpoints read the body as text so malformed JSON reaches
//! the validator and comes back as a structured parse error. `?tz=Zone`
//! overrides the default timezone for a single call.

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_info_indent, log_success, LOG_BROADCASTER};
use super::types::{error_response, SpreadsheetQuery, SpreadsheetResponse, SyllabusRequest};
use crate::ai::{AiClient, AiError, SyllabusExtractor};
use crate::config::{parse_timezone, ExpandOptions, Settings};
use crate::error::{ModelError, PipelineError, ServerError};
use crate::transform::pipeline::{build_spreadsheet_csv, syllabus_to_spreadsheet, SpreadsheetOutput};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub options: ExpandOptions,
    /// `None` when no API key is configured; `/api/syllabus` then answers 503.
    pub extractor: Option<Arc<dyn SyllabusExtractor>>,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        let extractor = AiClient::from_settings(settings)
            .ok()
            .map(|client| Arc::new(client) as Arc<dyn SyllabusExtractor>);
        Self {
            options: settings.expand,
            extractor,
        }
    }

    /// Options for one call, with an optional `tz` override.
    fn call_options(&self, tz: Option<&str>) -> Result<ExpandOptions, PipelineError> {
        match tz {
            Some(name) => Ok(self.options.with_timezone(parse_timezone("tz", name)?)),
            None => Ok(self.options),
        }
    }
}

type ApiError = (StatusCode, Json<Value>);

/// Build the router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/spreadsheet", post(spreadsheet_json))
        .route("/api/spreadsheet.csv", post(spreadsheet_csv))
        .route("/api/syllabus", post(syllabus))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16, settings: Settings) -> Result<(), ServerError> {
    let state = AppState::from_settings(&settings);
    let extraction = state.extractor.is_some();
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Syllabus server running on http://localhost:{}", port);
    println!("   POST /api/spreadsheet      - Model output to rows + CSV");
    println!("   POST /api/spreadsheet.csv  - Model output to CSV download");
    println!("   POST /api/syllabus         - Syllabus text to rows + CSV");
    println!("   GET  /api/logs             - SSE log stream");
    println!("   GET  /health               - Health check");
    println!();
    println!("🕒 Default timezone: {}", settings.expand.default_timezone);
    println!("📅 Max week: {}", settings.expand.max_week);
    if !extraction {
        println!("⚠️  ANTHROPIC_API_KEY not set, /api/syllabus disabled");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "syllabus",
        "version": env!("CARGO_PKG_VERSION"),
        "defaultTimezone": state.options.default_timezone.name(),
        "maxWeek": state.options.max_week,
        "extraction": state.extractor.is_some(),
        "endpoints": {
            "spreadsheet": "POST /api/spreadsheet",
            "csv": "POST /api/spreadsheet.csv",
            "syllabus": "POST /api/syllabus",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Model output to rows + CSV
async fn spreadsheet_json(
    State(state): State<AppState>,
    Query(query): Query<SpreadsheetQuery>,
    body: String,
) -> Result<Json<SpreadsheetResponse>, ApiError> {
    let out = expand_body(&state, &query, body).map_err(api_error)?;
    Ok(Json(SpreadsheetResponse::from(out)))
}

/// Model output to a CSV download
async fn spreadsheet_csv(
    State(state): State<AppState>,
    Query(query): Query<SpreadsheetQuery>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let out = expand_body(&state, &query, body).map_err(api_error)?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.csv\"", file_stem(&out.course_info.course_code)),
        ),
    ];
    Ok((headers, out.csv))
}

/// Syllabus text through the extractor, then the core
async fn syllabus(
    State(state): State<AppState>,
    Json(request): Json<SyllabusRequest>,
) -> Result<Json<SpreadsheetResponse>, ApiError> {
    let extractor = state
        .extractor
        .clone()
        .ok_or_else(|| api_error(AiError::MissingApiKey.into()))?;
    let options = state
        .call_options(request.timezone.as_deref())
        .map_err(api_error)?;

    println!("\n{}", "=".repeat(70));
    println!("📄 NEW SYLLABUS ({} bytes)", request.syllabus_text.len());
    println!("{}\n", "=".repeat(70));

    let result = syllabus_to_spreadsheet(extractor.as_ref(), &request.syllabus_text, &options)
        .await
        .map_err(api_error)?;

    Ok(Json(SpreadsheetResponse::from(result)))
}

fn expand_body(
    state: &AppState,
    query: &SpreadsheetQuery,
    body: String,
) -> Result<SpreadsheetOutput, PipelineError> {
    let options = state.call_options(query.tz.as_deref())?;
    log_info(format!("📥 Expanding model output ({} bytes)", body.len()));

    let out = build_spreadsheet_csv(body, &options)?;
    log_success(format!(
        "{}: {} rows",
        out.course_info.course_code,
        out.rows.len()
    ));
    log_info_indent(
        format!(
            "{} recurring, {} one-off",
            out.recurring_count(),
            out.one_off_count()
        ),
        1,
    );
    Ok(out)
}

/// Map a pipeline error onto a status and JSON body.
fn api_error(err: PipelineError) -> ApiError {
    let status = match &err {
        PipelineError::Model(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Config(_) => StatusCode::BAD_REQUEST,
        PipelineError::Ai(AiError::MissingApiKey) => StatusCode::SERVICE_UNAVAILABLE,
        PipelineError::Ai(AiError::InputTooShort(_)) => StatusCode::BAD_REQUEST,
        PipelineError::Ai(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Export(_) | PipelineError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let issues = match &err {
        PipelineError::Model(ModelError::Validation(v)) => v.issues.clone(),
        _ => Vec::new(),
    };

    log_error(format!("{} ({})", err, status));
    (status, Json(error_response(&err.to_string(), &issues)))
}

/// Course code reduced to a safe file name.
fn file_stem(course_code: &str) -> String {
    let stem: String = course_code
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "schedule".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AiResult;
    use async_trait::async_trait;

    const MODEL: &str = r#"{
        "recurring": [{
            "title": "Problem Set", "start_week": 1, "end_week": 3,
            "day_of_week": "WED", "due_time_local": "23:59", "exceptions": ["Week 2"]
        }],
        "one_off": [{ "title": "Quiz, Part 2", "date_local": "2025-09-12", "due_time_local": "09:00" }],
        "course_info": { "course_code": "CS 101", "term_start": "2025-09-01", "term_end": "2025-12-05" }
    }"#;

    struct FixedExtractor;

    #[async_trait]
    impl SyllabusExtractor for FixedExtractor {
        async fn extract(&self, _syllabus_text: &str) -> AiResult<String> {
            Ok(MODEL.to_string())
        }
    }

    fn state(extractor: Option<Arc<dyn SyllabusExtractor>>) -> AppState {
        AppState {
            options: ExpandOptions::default(),
            extractor,
        }
    }

    #[tokio::test]
    async fn test_spreadsheet_json() {
        let Json(response) = spreadsheet_json(
            State(state(None)),
            Query(SpreadsheetQuery::default()),
            MODEL.to_string(),
        )
        .await
        .unwrap();

        assert_eq!(response.stats.total, 3);
        assert_eq!(response.rows[0].date_local, "2025-09-03");
        assert!(response.csv.contains("\"Quiz, Part 2\""));
    }

    #[tokio::test]
    async fn test_malformed_body_is_422() {
        let (status, Json(body)) = spreadsheet_json(
            State(state(None)),
            Query(SpreadsheetQuery::default()),
            "{ not json".to_string(),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_validation_issues_in_body() {
        let bad = MODEL.replace("\"WED\"", "\"WEDS\"");
        let (status, Json(body)) = spreadsheet_json(
            State(state(None)),
            Query(SpreadsheetQuery::default()),
            bad,
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["issues"][0]["path"], "/recurring/0/day_of_week");
    }

    #[tokio::test]
    async fn test_unknown_tz_override_is_400() {
        let query = SpreadsheetQuery {
            tz: Some("Nowhere/Special".into()),
        };
        let (status, _) = spreadsheet_json(State(state(None)), Query(query), MODEL.to_string())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_syllabus_without_extractor_is_503() {
        let request = SyllabusRequest {
            syllabus_text: "Problem sets due every Wednesday".into(),
            timezone: None,
        };
        let (status, _) = syllabus(State(state(None)), Json(request)).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_syllabus_with_extractor() {
        let request = SyllabusRequest {
            syllabus_text: "Problem sets due every Wednesday".into(),
            timezone: Some("America/New_York".into()),
        };
        let extractor: Arc<dyn SyllabusExtractor> = Arc::new(FixedExtractor);
        let Json(response) = syllabus(State(state(Some(extractor))), Json(request))
            .await
            .unwrap();

        assert_eq!(response.stats.recurring, 2);
        assert_eq!(response.model_output.as_deref(), Some(MODEL));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("CS 101"), "CS_101");
        assert_eq!(file_stem("  "), "schedule");
        assert_eq!(file_stem("MATH/2A"), "MATH_2A");
    }
}
