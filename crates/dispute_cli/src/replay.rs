use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use dispute_agents::screens::driver::drive_intake;
use dispute_agents::screens::{Effect, IntakeAction, IntakeState, Transaction, QUICK_REPLIES};
use dispute_agents::{AgentDirectory, AgentKind, CallLogIngestor, IngestOptions, RecordedInvoker};
use serde_json::json;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::CliError;
use crate::input::{open, write_json_line};
use crate::Summary;

#[derive(Debug, Parser)]
pub struct Args {
    /// Disputed transaction as a JSON object.
    #[arg(long)]
    pub transaction: String,

    /// Customer message to send (repeatable). Defaults to the first quick reply.
    #[arg(long = "message")]
    pub messages: Vec<String>,

    /// File the dispute once the conversation is replayed.
    #[arg(long)]
    pub submit: bool,

    /// JSONL log of case-manager calls, answered in order.
    pub log: PathBuf,
}

pub fn run(args: Args, directory: AgentDirectory) -> Result<Summary, CliError> {
    let transaction: Transaction =
        serde_json::from_str(&args.transaction).map_err(CliError::Transaction)?;

    let case_manager = directory.id(AgentKind::CaseManager);
    let invoker = RecordedInvoker::new();
    let mut summary = Summary::default();
    let (reader, source_name) = open(Some(args.log.as_path()))?;
    for record in CallLogIngestor::new(reader, IngestOptions::default(), source_name) {
        match record.outcome {
            Ok(call) => {
                summary.calls += 1;
                invoker.push(case_manager.clone(), call);
            }
            Err(_) => summary.failed_lines += 1,
        }
    }
    debug!(calls = summary.calls, "queued recorded case-manager calls");

    let messages = if args.messages.is_empty() {
        vec![QUICK_REPLIES[0].to_string()]
    } else {
        args.messages
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let (state, submitted) = runtime.block_on(async {
        let now = OffsetDateTime::now_utc();
        let mut state = IntakeState::new(transaction, now);
        for message in messages {
            let action = IntakeAction::QuickReply(message);
            drive_intake(&mut state, action, &invoker, &directory, now).await;
        }
        let mut submitted = None;
        if args.submit {
            if let Effect::CaseSubmitted(case) =
                drive_intake(&mut state, IntakeAction::Submit, &invoker, &directory, now).await
            {
                submitted = Some(case);
            }
        }
        (state, submitted)
    });

    let mut out = io::stdout().lock();
    write_json_line(&mut out, &json!({"intake": state, "case": submitted}))?;
    out.flush()?;
    Ok(summary)
}
