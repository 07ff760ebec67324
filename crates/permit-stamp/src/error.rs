use std::path::PathBuf;
use thiserror::Error;

use crate::job::state::TransitionError;

#[derive(Error, Debug)]
pub enum StampError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Polling error: {0}")]
    Poll(#[from] PollError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] TransitionError),

    #[error("Not authorized to perform '{0}'")]
    Unauthorized(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Settings validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid MIME type '{0}' in stampable list")]
    InvalidMime(String),

    #[error("Stamp definition '{id}' is invalid: {reason}")]
    InvalidStamp { id: String, reason: String },
}

/// Rejections raised before anything is sent to the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No attachments selected for stamping")]
    EmptySelection,

    #[error("Required stamp field '{0}' is missing")]
    MissingField(&'static str),

    #[error("{field} must be a whole number, got '{value}'")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} must not be negative, got {value}")]
    NegativeMargin { field: &'static str, value: i64 },

    #[error("Transparency must be within 0..=255, got {0}")]
    TransparencyOutOfRange(i64),

    #[error("Unknown stamp definition '{0}'")]
    UnknownStamp(String),
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Invalid stamp request: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Stamp request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Server rejected stamp request: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum PollError {
    #[error("Job status query failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Server rejected job status query: {0}")]
    Rejected(String),

    #[error("Polling gave up after {attempts} consecutive failures: {last}")]
    Exhausted { attempts: u32, last: String },

    #[error("No stamping job is in progress")]
    NoActiveJob,
}

/// Failures of the command/query transport itself.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Connection unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StampError>;
