use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    future::Future,
    str::FromStr,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentCallError;
use crate::normalize::{normalize, NormalizedResult};

/// Envelope returned by the agent invocation collaborator.
///
/// `raw_response`, when present, is a JSON string that may itself carry a
/// JSON-encoded `response` string; see [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentCallResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AgentResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl AgentCallResult {
    pub fn succeeded(result: Value) -> Self {
        Self {
            success: true,
            response: Some(AgentResponse {
                status: "success".to_string(),
                result: Some(result),
            }),
            raw_response: None,
        }
    }

    pub fn from_raw(success: bool, raw_response: impl Into<String>) -> Self {
        Self {
            success,
            response: None,
            raw_response: Some(raw_response.into()),
        }
    }

    /// Lenient conversion from any JSON value.
    ///
    /// Fields of the wrong type are dropped instead of failing the whole record.
    pub fn from_value(value: &Value) -> Self {
        let response = value.get("response").and_then(|response| {
            if !response.is_object() {
                return None;
            }
            Some(AgentResponse {
                status: response
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                result: response.get("result").filter(|v| !v.is_null()).cloned(),
            })
        });
        Self {
            success: value
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            response,
            raw_response: value
                .get("raw_response")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// True when the call succeeded and the agent reported `status == "success"`.
    pub fn is_success(&self) -> bool {
        self.success
            && self
                .response
                .as_ref()
                .is_some_and(|response| response.status == "success")
    }

    pub fn normalize(&self) -> NormalizedResult {
        normalize(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    CaseManager,
    MerchantIntelligence,
    EvidenceCorrelator,
    RiskScoring,
    Resolution,
}

impl AgentKind {
    pub const ALL: [AgentKind; 5] = [
        AgentKind::CaseManager,
        AgentKind::MerchantIntelligence,
        AgentKind::EvidenceCorrelator,
        AgentKind::RiskScoring,
        AgentKind::Resolution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::CaseManager => "case_manager",
            AgentKind::MerchantIntelligence => "merchant_intelligence",
            AgentKind::EvidenceCorrelator => "evidence_correlator",
            AgentKind::RiskScoring => "risk_scoring",
            AgentKind::Resolution => "resolution",
        }
    }

    pub fn default_id(&self) -> &'static str {
        match self {
            AgentKind::CaseManager => "697ebdccd36f070193f5dfb2",
            AgentKind::MerchantIntelligence => "697ebd81066158e77fde65a4",
            AgentKind::EvidenceCorrelator => "697ebd97d36f070193f5dfb1",
            AgentKind::RiskScoring => "697ebdaf066158e77fde65ab",
            AgentKind::Resolution => "697ebde7066158e77fde65b5",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        AgentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown agent `{s}`"))
    }
}

/// Opaque endpoint identifier of an external agent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps the five agent roles to the endpoint IDs they are reached under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDirectory {
    ids: BTreeMap<AgentKind, AgentId>,
}

impl Default for AgentDirectory {
    fn default() -> Self {
        Self {
            ids: AgentKind::ALL
                .into_iter()
                .map(|kind| (kind, AgentId::new(kind.default_id())))
                .collect(),
        }
    }
}

impl AgentDirectory {
    pub fn with_override(mut self, kind: AgentKind, id: AgentId) -> Self {
        self.ids.insert(kind, id);
        self
    }

    pub fn id(&self, kind: AgentKind) -> AgentId {
        self.ids
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| AgentId::new(kind.default_id()))
    }

    pub fn kind_of(&self, id: &AgentId) -> Option<AgentKind> {
        self.ids
            .iter()
            .find(|(_, candidate)| *candidate == id)
            .map(|(kind, _)| *kind)
    }
}

/// Transport-agnostic agent call: `call(prompt, agent_id)`.
pub trait AgentInvoker {
    fn call(
        &self,
        prompt: &str,
        agent: &AgentId,
    ) -> impl Future<Output = Result<AgentCallResult, AgentCallError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    pub agent: AgentId,
    pub prompt: String,
}

/// Replays queued results per agent in FIFO order and keeps the prompts it saw.
///
/// Agents that never had anything queued are reported as unknown.
#[derive(Debug, Default)]
pub struct RecordedInvoker {
    queued: Mutex<BTreeMap<AgentId, VecDeque<Result<AgentCallResult, AgentCallError>>>>,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl RecordedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, agent: AgentId, result: AgentCallResult) {
        self.enqueue(agent, Ok(result));
    }

    pub fn push_failure(&self, agent: AgentId, message: impl Into<String>) {
        self.enqueue(agent, Err(AgentCallError::Transport(message.into())));
    }

    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn remaining(&self, agent: &AgentId) -> usize {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(agent)
            .map_or(0, VecDeque::len)
    }

    fn enqueue(&self, agent: AgentId, entry: Result<AgentCallResult, AgentCallError>) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(agent)
            .or_default()
            .push_back(entry);
    }

    fn take(&self, prompt: &str, agent: &AgentId) -> Result<AgentCallResult, AgentCallError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedPrompt {
                agent: agent.clone(),
                prompt: prompt.to_string(),
            });
        let mut queued = self.queued.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(queue) = queued.get_mut(agent) else {
            return Err(AgentCallError::UnknownAgent {
                agent: agent.clone(),
            });
        };
        queue.pop_front().unwrap_or_else(|| {
            Err(AgentCallError::NoRecording {
                agent: agent.clone(),
            })
        })
    }
}

impl AgentInvoker for RecordedInvoker {
    fn call(
        &self,
        prompt: &str,
        agent: &AgentId,
    ) -> impl Future<Output = Result<AgentCallResult, AgentCallError>> + Send {
        std::future::ready(self.take(prompt, agent))
    }
}
