use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::shapes::{EvidenceCorrelation, MerchantIntelligence, RiskScoring};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub merchant: String,
    pub amount: f64,
    pub date: String,
    pub time: String,
    pub status: String,
    pub category: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Pending,
    Resolved,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Severity band of a numeric risk score, used for badge emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Elevated,
    High,
}

impl RiskTier {
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            RiskTier::High
        } else if score >= 40 {
            RiskTier::Elevated
        } else {
            RiskTier::Low
        }
    }
}

/// Intake-time evidence summary built from the case manager's `case_summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidencePreview {
    pub gps_match: bool,
    pub device_match: bool,
    pub merchant_decoded: String,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseEvidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<MerchantIntelligence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<EvidenceCorrelation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskScoring>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<EvidencePreview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub transaction: Transaction,
    pub status: CaseStatus,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Calendar day the dispute is due. Time of day is dropped, so countdowns
    /// are whole-day differences (see `days_until_due`).
    #[serde(with = "iso_date")]
    pub due_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyst: Option<String>,
    #[serde(default)]
    pub evidence: CaseEvidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

mod iso_date {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        Date::parse(&text, format_description!("[year]-[month]-[day]")).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn risk_tiers_follow_badge_thresholds() {
        assert_eq!(RiskTier::from_score(72), RiskTier::High);
        assert_eq!(RiskTier::from_score(70), RiskTier::High);
        assert_eq!(RiskTier::from_score(58), RiskTier::Elevated);
        assert_eq!(RiskTier::from_score(40), RiskTier::Elevated);
        assert_eq!(RiskTier::from_score(35), RiskTier::Low);
    }

    #[test]
    fn case_dates_serialize_as_iso_strings() {
        let case = Case {
            id: "CASE-001".to_string(),
            transaction: Transaction {
                id: "TXN-001".to_string(),
                merchant: "AMZN Mktp US".to_string(),
                amount: 129.99,
                date: "2026-01-30".to_string(),
                time: "09:15".to_string(),
                status: "posted".to_string(),
                category: "Shopping".to_string(),
                location: "Online".to_string(),
            },
            status: CaseStatus::Open,
            risk_score: 72,
            risk_level: RiskLevel::High,
            created_at: datetime!(2026-01-30 10:00 UTC),
            due_date: date!(2026-02-13),
            analyst: Some("Sarah Chen".to_string()),
            evidence: CaseEvidence::default(),
        };
        let value = serde_json::to_value(&case).unwrap();
        assert_eq!(value["due_date"], "2026-02-13");
        assert_eq!(value["created_at"], "2026-01-30T10:00:00Z");
        assert_eq!(value["status"], "open");
        let back: Case = serde_json::from_value(value).unwrap();
        assert_eq!(back, case);
    }
}
