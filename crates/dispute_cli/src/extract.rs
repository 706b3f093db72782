use clap::Parser;
use dispute_agents::{first_present_string, FieldPath};
use serde_json::json;

use crate::error::CliError;
use crate::input::{each_call, LogArgs};
use crate::Summary;

#[derive(Debug, Parser)]
pub struct Args {
    /// Dotted field path, tried in the order given (repeatable).
    #[arg(long = "path", required = true)]
    pub paths: Vec<String>,

    /// Value printed when no path holds a non-empty string.
    #[arg(long, default_value = "")]
    pub default: String,

    #[command(flatten)]
    pub log: LogArgs,
}

pub fn run(args: Args) -> Result<Summary, CliError> {
    let paths = args
        .paths
        .iter()
        .map(|raw| FieldPath::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    each_call(&args.log, |line, call| {
        let normalized = call.normalize();
        let value = first_present_string(normalized.fields(), &paths, &args.default);
        Ok(json!({"line": line, "value": value}))
    })
}
