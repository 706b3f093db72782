use clap::Parser;
use dispute_agents::{AgentKind, AgentResult};
use serde_json::json;

use crate::error::CliError;
use crate::input::{each_call, LogArgs};
use crate::Summary;

#[derive(Debug, Parser)]
pub struct Args {
    /// Agent whose result shape every call is checked against
    /// (case_manager, merchant_intelligence, evidence_correlator, risk_scoring, resolution).
    #[arg(long)]
    pub agent: AgentKind,

    #[command(flatten)]
    pub log: LogArgs,
}

pub fn run(args: Args) -> Result<Summary, CliError> {
    let agent = args.agent;
    each_call(&args.log, |line, call| {
        let shape = AgentResult::from_normalized(agent, &call.normalize());
        Ok(json!({
            "line": line,
            "recognized": shape.is_recognized(),
            "shape": shape,
        }))
    })
}
