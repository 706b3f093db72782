use std::path::PathBuf;

use thiserror::Error;

use crate::call::{AgentId, AgentKind};

/// Errors surfaced by an [`AgentInvoker`](crate::AgentInvoker).
#[derive(Debug, Error)]
pub enum AgentCallError {
    #[error("agent `{agent}` has no recorded calls")]
    UnknownAgent { agent: AgentId },
    #[error("no recorded response left for agent `{agent}`")]
    NoRecording { agent: AgentId },
    #[error("agent transport failed: {0}")]
    Transport(String),
}

/// Why a normalized mapping could not be upgraded to a typed agent result.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("{shape} payload carries none of the fields {expected:?}")]
    MissingKeyFields {
        shape: &'static str,
        expected: &'static [&'static str],
    },
    #[error("{shape} payload has unexpected field types: {source}")]
    Mismatch {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldPathError {
    #[error("field path must not be empty")]
    Empty,
    #[error("field path `{path}` has an empty segment")]
    EmptySegment { path: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("agent id for `{agent}` must not be empty")]
    EmptyAgentId { agent: AgentKind },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IngestErrorCode {
    JsonParse,
    NotAnObject,
}

#[derive(Debug, Error, Clone)]
pub enum LineRecordError {
    #[error("I/O error while reading call log")]
    Io,
    #[error("invalid UTF-8 in call log")]
    InvalidUtf8,
    #[error("line too long (observed_bytes={observed_bytes}, max_line_bytes={max_line_bytes})")]
    LineTooLong {
        observed_bytes: usize,
        max_line_bytes: usize,
    },
    /// `summary` never quotes the line itself.
    #[error("call record rejected ({code:?}): {summary}")]
    Rejected {
        code: IngestErrorCode,
        summary: String,
    },
}

/// One call-log line and what became of it.
#[derive(Debug, Clone)]
pub struct LineRecord<T> {
    pub line_number: usize,
    /// The source line, when echo is on and the budget allowed it.
    pub raw: Option<String>,
    pub outcome: Result<T, LineRecordError>,
}

/// Full account of a rejected line, offending text included.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub source_name: String,
    pub line_number: usize,
    pub code: IngestErrorCode,
    pub details: String,
}

pub trait RejectionObserver: Send {
    fn observe(&mut self, rejection: Rejection);
}

impl<F> RejectionObserver for F
where
    F: FnMut(Rejection) + Send,
{
    fn observe(&mut self, rejection: Rejection) {
        self(rejection)
    }
}
