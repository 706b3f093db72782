//! Runs screen effects against an [`AgentInvoker`].
//!
//! A reducer that asks for an agent call gets the outcome fed back as
//! a follow-up action before the driver returns.

use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{AgentRequest, DetailAction, DetailState, Effect, IntakeAction, IntakeState};
use crate::call::{AgentCallResult, AgentDirectory, AgentInvoker};
use crate::error::AgentCallError;

async fn perform<I: AgentInvoker>(
    invoker: &I,
    directory: &AgentDirectory,
    request: &AgentRequest,
) -> Result<AgentCallResult, AgentCallError> {
    let agent = directory.id(request.agent);
    debug!(agent = %request.agent, id = %agent, "calling agent");
    invoker.call(&request.prompt, &agent).await.map_err(|err| {
        warn!(agent = %request.agent, "agent call failed: {err}");
        err
    })
}

/// Applies `action` to the intake screen and settles any agent call it triggers.
///
/// Returns the last effect that needs the caller, such as a submitted case.
pub async fn drive_intake<I: AgentInvoker>(
    state: &mut IntakeState,
    action: IntakeAction,
    invoker: &I,
    directory: &AgentDirectory,
    now: OffsetDateTime,
) -> Effect {
    match state.apply(action, now) {
        Effect::CallAgent(request) => {
            let follow_up = match perform(invoker, directory, &request).await {
                Ok(result) => IntakeAction::AgentReplied(result),
                Err(err) => IntakeAction::AgentFailed(err.to_string()),
            };
            state.apply(follow_up, now)
        }
        other => other,
    }
}

pub async fn drive_detail<I: AgentInvoker>(
    state: &mut DetailState,
    action: DetailAction,
    invoker: &I,
    directory: &AgentDirectory,
) -> Effect {
    match state.apply(action) {
        Effect::CallAgent(request) => {
            let follow_up = match perform(invoker, directory, &request).await {
                Ok(result) => DetailAction::ResolutionReturned(result),
                Err(err) => DetailAction::ResolutionFailed(err.to_string()),
            };
            state.apply(follow_up)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{AgentKind, RecordedInvoker};
    use crate::screens::{IntakeStage, Transaction};
    use serde_json::json;
    use time::macros::datetime;

    fn transaction() -> Transaction {
        Transaction {
            id: "TXN-001".to_string(),
            merchant: "SQ *COFFEE SHOP".to_string(),
            amount: 4.5,
            date: "2026-01-28".to_string(),
            time: "08:05".to_string(),
            status: "posted".to_string(),
            category: "Food & Drink".to_string(),
            location: "Oakland, CA".to_string(),
        }
    }

    #[tokio::test]
    async fn intake_reply_flows_back_into_state() {
        let now = datetime!(2026-01-30 12:00 UTC);
        let directory = AgentDirectory::default();
        let invoker = RecordedInvoker::new();
        invoker.push(
            directory.id(AgentKind::CaseManager),
            AgentCallResult::succeeded(json!({"summary": "Looks like a local coffee shop."})),
        );

        let mut state = IntakeState::new(transaction(), now);
        let action = IntakeAction::QuickReply("My card was stolen".to_string());
        let effect = drive_intake(&mut state, action, &invoker, &directory, now).await;

        assert_eq!(effect, Effect::None);
        assert!(!state.loading);
        assert_eq!(state.stage, IntakeStage::Investigation);
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[2].message, "Looks like a local coffee shop.");
        assert_eq!(
            invoker.prompts()[0].prompt,
            "Transaction: SQ *COFFEE SHOP $4.50 on 2026-01-28. Customer says: My card was stolen"
        );
    }

    #[tokio::test]
    async fn missing_recording_becomes_apology() {
        let now = datetime!(2026-01-30 12:00 UTC);
        let mut state = IntakeState::new(transaction(), now);
        state.input = "not me".to_string();
        drive_intake(
            &mut state,
            IntakeAction::SendRequested,
            &RecordedInvoker::new(),
            &AgentDirectory::default(),
            now,
        )
        .await;
        assert_eq!(
            state.messages[2].message,
            "I understand. Let me help you investigate this charge further."
        );
    }
}
