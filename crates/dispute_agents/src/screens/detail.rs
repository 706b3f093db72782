use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::case::Case;
use super::{AgentRequest, Effect};
use crate::call::{AgentCallResult, AgentKind};
use crate::shapes::{AgentResult, Resolution};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailTab {
    #[default]
    Summary,
    Evidence,
    Timeline,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveAction {
    Approve,
    Deny,
}

impl ResolveAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveAction::Approve => "approve",
            ResolveAction::Deny => "deny",
        }
    }
}

impl fmt::Display for ResolveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailAction {
    TabSelected(DetailTab),
    NotesChanged(String),
    ResolveRequested(ResolveAction),
    ResolutionReturned(AgentCallResult),
    ResolutionFailed(String),
    ResolutionDismissed,
}

/// Analyst view of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailState {
    pub case: Case,
    pub tab: DetailTab,
    pub notes: String,
    pub loading: bool,
    pub resolution: Option<Resolution>,
    /// Set when the resolution agent answered with a payload of the wrong shape.
    pub unrecognized: Option<String>,
}

pub fn resolution_prompt(case: &Case, action: ResolveAction) -> String {
    format!(
        "Resolve case {} with action: {}. Transaction: {} ${:.2}",
        case.id, action, case.transaction.merchant, case.transaction.amount
    )
}

impl DetailState {
    pub fn new(case: Case) -> Self {
        Self {
            case,
            tab: DetailTab::default(),
            notes: String::new(),
            loading: false,
            resolution: None,
            unrecognized: None,
        }
    }

    pub fn apply(&mut self, action: DetailAction) -> Effect {
        match action {
            DetailAction::TabSelected(tab) => self.tab = tab,
            DetailAction::NotesChanged(notes) => self.notes = notes,
            DetailAction::ResolveRequested(resolve) => {
                if self.loading {
                    return Effect::None;
                }
                self.loading = true;
                return Effect::CallAgent(AgentRequest {
                    agent: AgentKind::Resolution,
                    prompt: resolution_prompt(&self.case, resolve),
                });
            }
            DetailAction::ResolutionReturned(result) => {
                self.loading = false;
                self.on_resolution(&result);
            }
            DetailAction::ResolutionFailed(reason) => {
                warn!(case = %self.case.id, "resolution call failed: {reason}");
                self.loading = false;
            }
            DetailAction::ResolutionDismissed => {
                self.resolution = None;
                self.unrecognized = None;
            }
        }
        Effect::None
    }

    fn on_resolution(&mut self, result: &AgentCallResult) {
        if !result.is_success() {
            debug!(case = %self.case.id, "resolution agent did not report success");
            return;
        }
        match AgentResult::from_normalized(AgentKind::Resolution, &result.normalize()) {
            AgentResult::Resolution(resolution) => {
                self.resolution = Some(resolution);
                self.unrecognized = None;
            }
            AgentResult::Unrecognized { reason, .. } => self.unrecognized = Some(reason),
            other => self.unrecognized = Some(format!("unexpected {:?} payload", other.agent())),
        }
    }
}
