use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::case::{
    Case, CaseEvidence, CaseStatus, ChatMessage, EvidencePreview, RiskLevel, Sender, Transaction,
};
use super::{AgentRequest, Effect};
use crate::call::{AgentCallResult, AgentKind};
use crate::fields::{first_present_string, number_at, string_at, text_mentions, FieldPath};
use crate::normalize::ResultMap;

const GREETING: &str = "Hi! I'm here to help you with your dispute. Can you tell me more about this charge you don't recognize?";
const ANALYZING: &str = "Thank you for that information. I'm analyzing the transaction now...";
const ANALYSIS_COMPLETE: &str = "I've completed the initial analysis. Let me gather more evidence...";
const FOLLOW_UP: &str = "Thank you for providing those details. Let me gather some information about this transaction. Have you made any purchases at this merchant before?";
const APOLOGY: &str = "I understand. Let me help you investigate this charge further.";
const MERCHANT_PENDING: &str = "Analysis in progress...";

pub const QUICK_REPLIES: [&str; 4] = [
    "I don't recognize this charge",
    "My card was stolen",
    "I cancelled this subscription",
    "I never received the item",
];

/// Minimum transcript length (greeting, question, answer) before a dispute can be filed.
pub const SUBMIT_MIN_MESSAGES: usize = 3;

const QUICK_REPLY_MAX_MESSAGES: usize = 3;
const SUBMITTED_RISK_SCORE: u8 = 58;
const DISPUTE_WINDOW_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    Intake,
    Investigation,
    Review,
}

impl IntakeStage {
    pub fn percent(&self) -> u8 {
        match self {
            IntakeStage::Intake => 33,
            IntakeStage::Investigation => 66,
            IntakeStage::Review => 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeAction {
    InputChanged(String),
    SendRequested,
    /// A quick-reply chip: behaves as typing `text` and sending it.
    QuickReply(String),
    AgentReplied(AgentCallResult),
    AgentFailed(String),
    Submit,
}

/// Customer chat intake for a single disputed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeState {
    pub transaction: Transaction,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub loading: bool,
    pub stage: IntakeStage,
    pub evidence: Option<EvidencePreview>,
    next_message_id: u64,
}

pub fn intake_prompt(transaction: &Transaction, customer_text: &str) -> String {
    format!(
        "Transaction: {} ${:.2} on {}. Customer says: {}",
        transaction.merchant, transaction.amount, transaction.date, customer_text
    )
}

impl IntakeState {
    pub fn new(transaction: Transaction, now: OffsetDateTime) -> Self {
        let mut state = Self {
            transaction,
            messages: Vec::new(),
            input: String::new(),
            loading: false,
            stage: IntakeStage::Intake,
            evidence: None,
            next_message_id: 1,
        };
        state.push_message(Sender::Agent, GREETING.to_string(), now);
        state
    }

    pub fn can_send(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    pub fn can_submit(&self) -> bool {
        self.messages.len() >= SUBMIT_MIN_MESSAGES
    }

    pub fn shows_quick_replies(&self) -> bool {
        self.messages.len() <= QUICK_REPLY_MAX_MESSAGES
    }

    pub fn apply(&mut self, action: IntakeAction, now: OffsetDateTime) -> Effect {
        match action {
            IntakeAction::InputChanged(text) => {
                self.input = text;
                Effect::None
            }
            IntakeAction::SendRequested => self.send(now),
            IntakeAction::QuickReply(text) => {
                if self.loading {
                    return Effect::None;
                }
                self.input = text;
                self.send(now)
            }
            IntakeAction::AgentReplied(result) => {
                self.loading = false;
                self.on_reply(&result, now);
                Effect::None
            }
            IntakeAction::AgentFailed(reason) => {
                debug!("intake agent call failed: {reason}");
                self.loading = false;
                self.push_message(Sender::Agent, APOLOGY.to_string(), now);
                Effect::None
            }
            IntakeAction::Submit => self.submit(now),
        }
    }

    fn send(&mut self, now: OffsetDateTime) -> Effect {
        if !self.can_send() {
            return Effect::None;
        }
        let text = std::mem::take(&mut self.input);
        let prompt = intake_prompt(&self.transaction, &text);
        self.push_message(Sender::User, text, now);
        self.loading = true;
        Effect::CallAgent(AgentRequest {
            agent: AgentKind::CaseManager,
            prompt,
        })
    }

    fn on_reply(&mut self, result: &AgentCallResult, now: OffsetDateTime) {
        if !result.is_success() {
            self.push_message(Sender::Agent, FOLLOW_UP.to_string(), now);
            return;
        }

        let normalized = result.normalize();
        let fields = normalized.fields();
        self.push_message(Sender::Agent, reply_message(fields), now);
        self.stage = IntakeStage::Investigation;
        if has_case_summary(fields) {
            self.evidence = Some(evidence_preview(fields));
        }
    }

    fn submit(&mut self, now: OffsetDateTime) -> Effect {
        if !self.can_submit() {
            return Effect::None;
        }
        self.stage = IntakeStage::Review;
        let case = Case {
            id: format!("CASE-{}", now.unix_timestamp_nanos() / 1_000_000),
            transaction: self.transaction.clone(),
            status: CaseStatus::Open,
            risk_score: SUBMITTED_RISK_SCORE,
            risk_level: RiskLevel::Medium,
            created_at: now,
            due_date: (now + Duration::days(DISPUTE_WINDOW_DAYS)).date(),
            analyst: None,
            evidence: CaseEvidence {
                preview: self.evidence.clone(),
                ..CaseEvidence::default()
            },
        };
        Effect::CaseSubmitted(Box::new(case))
    }

    fn push_message(&mut self, sender: Sender, message: String, now: OffsetDateTime) {
        self.messages.push(ChatMessage {
            id: self.next_message_id.to_string(),
            sender,
            message,
            timestamp: now,
        });
        self.next_message_id += 1;
    }
}

/// `case_summary` counts only when truthy: `null`, `false`, `""` and `0` are absent.
fn has_case_summary(fields: &ResultMap) -> bool {
    match fields.get("case_summary") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(_) => true,
    }
}

fn reply_message(fields: &ResultMap) -> String {
    if has_case_summary(fields) {
        let chain = [
            FieldPath::new("case_summary.merchant_analysis"),
            FieldPath::new("case_summary.dispute_reason"),
        ];
        first_present_string(fields, &chain, ANALYSIS_COMPLETE)
    } else {
        let chain = [
            FieldPath::new("summary"),
            FieldPath::new("interviewer_notes"),
        ];
        first_present_string(fields, &chain, ANALYZING)
    }
}

fn evidence_preview(fields: &ResultMap) -> EvidencePreview {
    EvidencePreview {
        gps_match: text_mentions(fields, "case_summary.evidence_findings", "GPS"),
        device_match: text_mentions(fields, "case_summary.evidence_findings", "device"),
        merchant_decoded: string_at(fields, "case_summary.merchant_analysis")
            .filter(|text| !text.is_empty())
            .unwrap_or(MERCHANT_PENDING)
            .to_string(),
        risk_score: number_at(fields, "case_summary.overall_fraud_likelihood_score")
            .unwrap_or(0.0),
    }
}
