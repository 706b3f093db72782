use serde::{Deserialize, Serialize};
use time::Date;

use super::case::{Case, CaseStatus, RiskLevel, RiskTier};
use super::Effect;

const AVG_RESOLUTION_DAYS: f64 = 3.2;
const FRIENDLY_FRAUD_RATE_PERCENT: f64 = 12.5;
const DUE_SOON_DAYS: i64 = 3;

/// A queue filter: everything, or a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    SelectCase(String),
    StatusFilterChanged(Filter<CaseStatus>),
    RiskFilterChanged(Filter<RiskLevel>),
    SearchChanged(String),
    CaseAdded(Box<Case>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub open_cases: usize,
    pub due_today: usize,
    pub avg_resolution_days: f64,
    pub friendly_fraud_rate_percent: f64,
}

/// One row of the analyst queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEntry {
    pub id: String,
    pub merchant: String,
    pub amount: f64,
    pub risk_score: u8,
    pub tier: RiskTier,
    pub days_left: i64,
    pub due_soon: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub cases: Vec<Case>,
    pub selected: Option<String>,
    pub status_filter: Filter<CaseStatus>,
    pub risk_filter: Filter<RiskLevel>,
    pub search: String,
}

/// Whole days from `today` until `due`; negative once overdue.
///
/// Due dates carry no time of day, so a case due later today reads 0 rather
/// than rounding a partial day up to 1.
pub fn days_until_due(due: Date, today: Date) -> i64 {
    (due - today).whole_days()
}

impl DashboardState {
    /// The first case starts out selected.
    pub fn new(cases: Vec<Case>) -> Self {
        let selected = cases.first().map(|case| case.id.clone());
        Self {
            cases,
            selected,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, action: DashboardAction) -> Effect {
        match action {
            DashboardAction::SelectCase(id) => {
                if self.cases.iter().any(|case| case.id == id) {
                    self.selected = Some(id);
                }
            }
            DashboardAction::StatusFilterChanged(filter) => self.status_filter = filter,
            DashboardAction::RiskFilterChanged(filter) => self.risk_filter = filter,
            DashboardAction::SearchChanged(query) => self.search = query,
            DashboardAction::CaseAdded(case) => {
                if self.selected.is_none() {
                    self.selected = Some(case.id.clone());
                }
                self.cases.insert(0, *case);
            }
        }
        Effect::None
    }

    pub fn visible_cases(&self) -> impl Iterator<Item = &Case> + '_ {
        let query = self.search.to_lowercase();
        self.cases.iter().filter(move |case| {
            self.status_filter.admits(&case.status)
                && self.risk_filter.admits(&case.risk_level)
                && case.transaction.merchant.to_lowercase().contains(&query)
        })
    }

    pub fn queue(&self, today: Date) -> Vec<QueueEntry> {
        self.visible_cases()
            .map(|case| {
                let days_left = days_until_due(case.due_date, today);
                QueueEntry {
                    id: case.id.clone(),
                    merchant: case.transaction.merchant.clone(),
                    amount: case.transaction.amount,
                    risk_score: case.risk_score,
                    tier: RiskTier::from_score(case.risk_score),
                    days_left,
                    due_soon: days_left <= DUE_SOON_DAYS,
                }
            })
            .collect()
    }

    pub fn selected_case(&self) -> Option<&Case> {
        let id = self.selected.as_deref()?;
        self.cases.iter().find(|case| case.id == id)
    }

    pub fn stats(&self, today: Date) -> DashboardStats {
        DashboardStats {
            open_cases: self
                .cases
                .iter()
                .filter(|case| case.status == CaseStatus::Open)
                .count(),
            due_today: self
                .cases
                .iter()
                .filter(|case| case.due_date == today)
                .count(),
            avg_resolution_days: AVG_RESOLUTION_DAYS,
            friendly_fraud_rate_percent: FRIENDLY_FRAUD_RATE_PERCENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::case::{CaseEvidence, Transaction};
    use time::macros::{date, datetime};

    fn case(
        id: &str,
        merchant: &str,
        status: CaseStatus,
        score: u8,
        level: RiskLevel,
        due: Date,
    ) -> Case {
        Case {
            id: id.to_string(),
            transaction: Transaction {
                id: format!("TXN-{id}"),
                merchant: merchant.to_string(),
                amount: 25.0,
                date: "2026-01-20".to_string(),
                time: "10:00".to_string(),
                status: "posted".to_string(),
                category: "Shopping".to_string(),
                location: "Online".to_string(),
            },
            status,
            risk_score: score,
            risk_level: level,
            created_at: datetime!(2026-01-20 10:00 UTC),
            due_date: due,
            analyst: None,
            evidence: CaseEvidence::default(),
        }
    }

    fn state() -> DashboardState {
        DashboardState::new(vec![
            case(
                "CASE-001",
                "AMZN Mktp US",
                CaseStatus::Open,
                72,
                RiskLevel::High,
                date!(2026-02-01),
            ),
            case(
                "CASE-002",
                "NETFLIX.COM",
                CaseStatus::Pending,
                35,
                RiskLevel::Low,
                date!(2026-02-10),
            ),
            case(
                "CASE-003",
                "Uber Trip",
                CaseStatus::Open,
                58,
                RiskLevel::Medium,
                date!(2026-01-30),
            ),
        ])
    }

    fn ids<'a>(cases: impl Iterator<Item = &'a Case>) -> Vec<&'a str> {
        cases.map(|case| case.id.as_str()).collect()
    }

    #[test]
    fn first_case_is_selected_by_default() {
        let mut state = state();
        assert_eq!(state.selected_case().map(|c| c.id.as_str()), Some("CASE-001"));
        state.apply(DashboardAction::SelectCase("CASE-404".to_string()));
        assert_eq!(state.selected.as_deref(), Some("CASE-001"));
        state.apply(DashboardAction::SelectCase("CASE-003".to_string()));
        assert_eq!(state.selected_case().map(|c| c.id.as_str()), Some("CASE-003"));
        assert!(DashboardState::new(Vec::new()).selected_case().is_none());
    }

    #[test]
    fn filters_and_search_combine() {
        let mut state = state();
        assert_eq!(ids(state.visible_cases()).len(), 3);

        state.apply(DashboardAction::StatusFilterChanged(Filter::Only(CaseStatus::Open)));
        assert_eq!(ids(state.visible_cases()), ["CASE-001", "CASE-003"]);

        state.apply(DashboardAction::RiskFilterChanged(Filter::Only(RiskLevel::Medium)));
        assert_eq!(ids(state.visible_cases()), ["CASE-003"]);

        state.apply(DashboardAction::StatusFilterChanged(Filter::All));
        state.apply(DashboardAction::RiskFilterChanged(Filter::All));
        state.apply(DashboardAction::SearchChanged("netflix".to_string()));
        assert_eq!(ids(state.visible_cases()), ["CASE-002"]);
    }

    #[test]
    fn stats_and_queue_use_today() {
        let state = state();
        let today = date!(2026-01-30);
        let stats = state.stats(today);
        assert_eq!(stats.open_cases, 2);
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.avg_resolution_days, 3.2);
        assert_eq!(stats.friendly_fraud_rate_percent, 12.5);

        let queue = state.queue(today);
        assert_eq!(queue[0].days_left, 2);
        assert!(queue[0].due_soon);
        assert_eq!(queue[0].tier, RiskTier::High);
        assert_eq!(queue[1].days_left, 11);
        assert!(!queue[1].due_soon);
        assert_eq!(queue[2].tier, RiskTier::Elevated);
    }

    #[test]
    fn overdue_cases_count_negative_days() {
        assert_eq!(days_until_due(date!(2026-01-28), date!(2026-01-30)), -2);
    }

    #[test]
    fn due_today_counts_zero_days() {
        assert_eq!(days_until_due(date!(2026-01-30), date!(2026-01-30)), 0);
        assert_eq!(days_until_due(date!(2026-01-31), date!(2026-01-30)), 1);
    }

    #[test]
    fn submitted_cases_go_to_the_top() {
        let mut state = state();
        let fresh = case(
            "CASE-004",
            "SQ *COFFEE",
            CaseStatus::Open,
            58,
            RiskLevel::Medium,
            date!(2026-02-13),
        );
        state.apply(DashboardAction::CaseAdded(Box::new(fresh)));
        assert_eq!(state.cases[0].id, "CASE-004");
        assert_eq!(state.selected.as_deref(), Some("CASE-001"));
    }
}
