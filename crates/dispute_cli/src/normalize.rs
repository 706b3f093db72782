use clap::Parser;
use serde_json::json;

use crate::error::CliError;
use crate::input::{each_call, LogArgs};
use crate::Summary;

#[derive(Debug, Parser)]
pub struct Args {
    #[command(flatten)]
    pub log: LogArgs,
}

pub fn run(args: Args) -> Result<Summary, CliError> {
    each_call(&args.log, |line, call| {
        let normalized = call.normalize();
        Ok(json!({
            "line": line,
            "resolved": normalized.resolved(),
            "source": normalized.source(),
            "result": normalized.fields(),
        }))
    })
}
