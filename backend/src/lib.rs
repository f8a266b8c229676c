//! # Syllabus - course schedule expansion
//!
//! Turns a structured syllabus description (weekly rules plus dated one-off
//! items, relative to a term) into a sorted assignment spreadsheet.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Model JSON  │────▶│  Validator  │────▶│  Expander   │────▶│  Sorted CSV │
//! │ (untrusted) │     │  (schema)   │     │ (week→date) │     │   (8 cols)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! The model JSON normally comes from an LLM reading the syllabus text
//! ([`ai::SyllabusExtractor`]); the core does not depend on that step.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use syllabus::{build_spreadsheet_csv, ExpandOptions};
//!
//! let out = build_spreadsheet_csv(model_json_text, &ExpandOptions::default())?;
//! println!("{}", out.csv);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error hierarchy
//! - [`config`] - Expansion options and host settings
//! - [`models`] - Model output, occurrences, rows
//! - [`parser`] - Text/JSON input handling
//! - [`validation`] - Schema and semantic validation
//! - [`transform`] - Expansion, row building, pipeline
//! - [`export`] - CSV rendering
//! - [`ai`] - LLM-backed syllabus extraction
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Input
pub mod parser;
pub mod validation;

// Expansion
pub mod transform;

// Output
pub mod export;

// Extraction
pub mod ai;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    AiError, ConfigError, ExportError, ModelError, ParseError, PipelineError, ServerError,
    ValidationError, ValidationIssue,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::{ExpandOptions, Settings, DEFAULT_MAX_WEEK, DEFAULT_TIMEZONE};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CourseInfo, DayOfWeek, ModelOutput, Occurrence, OneOffItem, RecurringRule, Row, RowType,
    Term,
};

// =============================================================================
// Re-exports - Parsing & Validation
// =============================================================================

pub use parser::{parse_json, parse_model, parse_model_file, ModelInput};
pub use validation::{
    is_valid_model_output, model_output_schema, validate_model_output, ValidatedModel,
};

// =============================================================================
// Re-exports - Expansion & Pipeline
// =============================================================================

pub use transform::{
    build_rows, build_rows_from_model, build_spreadsheet_csv, expand_rule, sort_rows,
    syllabus_to_spreadsheet, BuiltRows, SpreadsheetOutput, SyllabusSpreadsheet,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{rows_to_csv, CSV_HEADER};

// =============================================================================
// Re-exports - AI Client
// =============================================================================

pub use ai::{AiClient, SyllabusExtractor};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
