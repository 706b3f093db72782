#![forbid(unsafe_code)]
//! Boundary layer for the fraud-dispute agent workflow.
//!
//! External agents answer with loosely-typed JSON that is sometimes wrapped
//! in one or two layers of string encoding. This crate provides:
//! - [`normalize`]: a never-failing unwrap of an [`AgentCallResult`] into a flat mapping.
//! - [`first_present_string`] and friends for optional field probing.
//! - [`AgentResult`]: an explicit upgrade of a mapping into one of the five known shapes.
//! - Screen view-models ([`screens`]) driven by pure reducer transitions.
//! - A bounded-memory ingestor for recorded call logs ([`CallLogIngestor`]).

mod call;
mod config;
mod error;
mod fields;
mod ingest;
mod normalize;
mod reader;
pub mod screens;
mod shapes;

pub use call::{
    AgentCallResult, AgentDirectory, AgentId, AgentInvoker, AgentKind, AgentResponse,
    RecordedInvoker, RecordedPrompt,
};
pub use config::{AgentOverrides, DirectoryConfig, IngestOptions, RawEcho, DEFAULT_MAX_LINE_BYTES};
pub use error::{
    AgentCallError, ConfigError, FieldPathError, IngestErrorCode, LineRecord, LineRecordError,
    Rejection, RejectionObserver, ShapeError,
};
pub use fields::{
    bool_at, first_present_string, number_at, string_at, text_mentions, value_at, FieldPath,
};
pub use ingest::CallLogIngestor;
pub use normalize::{normalize, normalize_value, NormalizationSource, NormalizedResult, ResultMap};
pub use shapes::{
    AccountAnalysis, AgentResult, AuthorizedUserAnalysis, CaseManagerReport, CaseSummary,
    ChargebackDetails, CreditDetails, DeviceAnalysis, DisputeHistory, EvidenceCorrelation,
    FraudDatabaseFindings, LocationMatch, MerchantIntelligence, MerchantMetadata, Resolution,
    ResolutionTracking, RiskScoring, SubAgentResult, SubscriptionPattern,
};
