//! Typed views over the five agent result shapes.
//!
//! Every field is optional: agents omit fields freely, so a shape is
//! recognized by the presence of at least one of its key fields.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::call::AgentKind;
use crate::error::ShapeError;
use crate::normalize::{NormalizedResult, ResultMap};

trait KnownShape: DeserializeOwned {
    const NAME: &'static str;
    const KEY_FIELDS: &'static [&'static str];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantIntelligence {
    pub decoded_merchant_name: Option<String>,
    pub merchant_category: Option<String>,
    pub is_recurring_charge: Option<bool>,
    pub subscription_pattern: Option<SubscriptionPattern>,
    pub merchant_metadata: Option<MerchantMetadata>,
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionPattern {
    pub detected: Option<bool>,
    pub frequency: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub last_charges: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantMetadata {
    pub location: Option<String>,
    pub business_type: Option<String>,
    pub network_data: Option<String>,
}

impl KnownShape for MerchantIntelligence {
    const NAME: &'static str = "merchant_intelligence";
    const KEY_FIELDS: &'static [&'static str] = &[
        "decoded_merchant_name",
        "merchant_category",
        "merchant_metadata",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceCorrelation {
    pub location_match: Option<LocationMatch>,
    pub device_analysis: Option<DeviceAnalysis>,
    pub authorized_user_analysis: Option<AuthorizedUserAnalysis>,
    pub evidence_strength: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationMatch {
    pub gps_near_merchant: Option<bool>,
    pub distance_miles: Option<f64>,
    pub time_correlation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceAnalysis {
    pub device_fingerprint_match: Option<bool>,
    pub device_name: Option<String>,
    pub previously_used: Option<bool>,
    pub session_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizedUserAnalysis {
    pub possible_family_member: Option<bool>,
    pub identified_user: Option<String>,
    pub evidence: Option<String>,
}

impl KnownShape for EvidenceCorrelation {
    const NAME: &'static str = "evidence_correlation";
    const KEY_FIELDS: &'static [&'static str] = &[
        "location_match",
        "device_analysis",
        "authorized_user_analysis",
        "evidence_strength",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskScoring {
    pub friendly_fraud_score: Option<f64>,
    pub risk_level: Option<String>,
    pub account_analysis: Option<AccountAnalysis>,
    pub dispute_history: Option<DisputeHistory>,
    pub fraud_database_findings: Option<FraudDatabaseFindings>,
    #[serde(deserialize_with = "null_as_empty")]
    pub risk_factors: Vec<String>,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountAnalysis {
    pub account_age_days: Option<u32>,
    pub deposit_pattern: Option<String>,
    pub avg_monthly_deposits: Option<f64>,
    pub account_health: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisputeHistory {
    pub total_disputes: Option<u32>,
    pub disputes_won: Option<u32>,
    pub disputes_lost: Option<u32>,
    pub recent_dispute_count_90d: Option<u32>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudDatabaseFindings {
    pub flags_found: Option<bool>,
    pub severity: Option<String>,
    pub details: Option<String>,
}

impl KnownShape for RiskScoring {
    const NAME: &'static str = "risk_scoring";
    const KEY_FIELDS: &'static [&'static str] = &[
        "friendly_fraud_score",
        "risk_level",
        "risk_factors",
        "fraud_database_findings",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolution {
    pub resolution_type: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub actions_taken: Vec<String>,
    pub chargeback_details: Option<ChargebackDetails>,
    pub credit_details: Option<CreditDetails>,
    pub tracking: Option<ResolutionTracking>,
    pub customer_notification: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargebackDetails {
    pub filed: Option<bool>,
    pub network: Option<String>,
    pub reason_code: Option<String>,
    pub reason_description: Option<String>,
    pub filing_date: Option<String>,
    pub expected_resolution_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditDetails {
    pub processed: Option<bool>,
    pub amount: Option<f64>,
    pub transaction_id: Option<String>,
    pub posted_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionTracking {
    pub case_id: Option<String>,
    pub status: Option<String>,
    pub timeline_days: Option<u32>,
    pub next_action_date: Option<String>,
}

impl Resolution {
    /// Credited amount, only when the credit was actually processed.
    pub fn processed_credit(&self) -> Option<f64> {
        self.credit_details
            .as_ref()
            .filter(|credit| credit.processed == Some(true))
            .and_then(|credit| credit.amount)
    }
}

impl KnownShape for Resolution {
    const NAME: &'static str = "resolution";
    const KEY_FIELDS: &'static [&'static str] = &[
        "resolution_type",
        "actions_taken",
        "chargeback_details",
        "credit_details",
    ];
}

/// Aggregate produced by the case manager, which fans out to the other agents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseManagerReport {
    pub final_output: Option<Value>,
    #[serde(deserialize_with = "null_as_empty")]
    pub sub_agent_results: Vec<SubAgentResult>,
    pub summary: Option<String>,
    pub workflow_completed: Option<bool>,
    pub case_summary: Option<CaseSummary>,
    pub interviewer_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubAgentResult {
    pub agent_name: Option<String>,
    pub status: Option<String>,
    pub output: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseSummary {
    pub merchant_analysis: Option<String>,
    pub dispute_reason: Option<String>,
    pub evidence_findings: Option<Value>,
    pub overall_fraud_likelihood_score: Option<f64>,
}

impl KnownShape for CaseManagerReport {
    const NAME: &'static str = "case_manager";
    const KEY_FIELDS: &'static [&'static str] = &[
        "sub_agent_results",
        "workflow_completed",
        "final_output",
        "case_summary",
        "summary",
        "interviewer_notes",
    ];
}

/// A normalized agent payload tagged with the shape of the agent that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AgentResult {
    MerchantIntelligence(MerchantIntelligence),
    EvidenceCorrelation(EvidenceCorrelation),
    RiskScoring(RiskScoring),
    Resolution(Resolution),
    CaseManager(CaseManagerReport),
    Unrecognized {
        agent: AgentKind,
        reason: String,
        payload: ResultMap,
    },
}

impl AgentResult {
    /// Upgrades a normalized mapping to the shape expected from `agent`.
    pub fn from_normalized(agent: AgentKind, normalized: &NormalizedResult) -> Self {
        Self::from_fields(agent, normalized.fields())
    }

    pub fn from_fields(agent: AgentKind, fields: &ResultMap) -> Self {
        let typed = match agent {
            AgentKind::MerchantIntelligence => decode(fields).map(Self::MerchantIntelligence),
            AgentKind::EvidenceCorrelator => decode(fields).map(Self::EvidenceCorrelation),
            AgentKind::RiskScoring => decode(fields).map(Self::RiskScoring),
            AgentKind::Resolution => decode(fields).map(Self::Resolution),
            AgentKind::CaseManager => decode(fields).map(Self::CaseManager),
        };
        typed.unwrap_or_else(|err| {
            debug!(agent = %agent, "agent payload not recognized: {err}");
            Self::Unrecognized {
                agent,
                reason: err.to_string(),
                payload: fields.clone(),
            }
        })
    }

    pub fn agent(&self) -> AgentKind {
        match self {
            AgentResult::MerchantIntelligence(_) => AgentKind::MerchantIntelligence,
            AgentResult::EvidenceCorrelation(_) => AgentKind::EvidenceCorrelator,
            AgentResult::RiskScoring(_) => AgentKind::RiskScoring,
            AgentResult::Resolution(_) => AgentKind::Resolution,
            AgentResult::CaseManager(_) => AgentKind::CaseManager,
            AgentResult::Unrecognized { agent, .. } => *agent,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, AgentResult::Unrecognized { .. })
    }
}

fn decode<T: KnownShape>(fields: &ResultMap) -> Result<T, ShapeError> {
    let has_key_field = T::KEY_FIELDS
        .iter()
        .any(|key| fields.get(*key).is_some_and(|value| !value.is_null()));
    if !has_key_field {
        return Err(ShapeError::MissingKeyFields {
            shape: T::NAME,
            expected: T::KEY_FIELDS,
        });
    }
    serde_json::from_value(Value::Object(fields.clone())).map_err(|source| ShapeError::Mismatch {
        shape: T::NAME,
        source,
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
