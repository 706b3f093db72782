//! View-models for the intake, dashboard and case-detail screens.
//!
//! Each screen owns a serializable state struct and changes only through
//! `apply(action, now)`, which returns an effect for the caller to perform
//! (usually an agent call whose outcome is fed back as another action).
//! [`driver`] runs that loop against an [`AgentInvoker`](crate::AgentInvoker).

mod case;
mod dashboard;
mod detail;
pub mod driver;
mod intake;

pub use case::{
    Case, CaseEvidence, CaseStatus, ChatMessage, EvidencePreview, RiskLevel, RiskTier, Sender,
    Transaction,
};
pub use dashboard::{
    days_until_due, DashboardAction, DashboardState, DashboardStats, Filter, QueueEntry,
};
pub use detail::{resolution_prompt, DetailAction, DetailState, DetailTab, ResolveAction};
pub use intake::{
    intake_prompt, IntakeAction, IntakeStage, IntakeState, QUICK_REPLIES, SUBMIT_MIN_MESSAGES,
};

use crate::call::AgentKind;

/// An agent call a reducer asks its caller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub agent: AgentKind,
    pub prompt: String,
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    CallAgent(AgentRequest),
    CaseSubmitted(Box<Case>),
}
