use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use dispute_agents::{
    AgentCallResult, AgentDirectory, CallLogIngestor, DirectoryConfig, IngestOptions, Rejection,
    DEFAULT_MAX_LINE_BYTES,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::CliError;
use crate::Summary;

pub(crate) fn load_directory(config: Option<&Path>) -> Result<AgentDirectory, CliError> {
    match config {
        Some(path) => Ok(DirectoryConfig::load(path)?.into_directory()?),
        None => Ok(AgentDirectory::default()),
    }
}

/// Opens `path`, or stdin when no path (or `-`) is given.
pub(crate) fn open(path: Option<&Path>) -> Result<(Box<dyn Read>, String), CliError> {
    match path {
        None => Ok((Box::new(io::stdin().lock()), "<stdin>".to_string())),
        Some(path) if path == Path::new("-") => {
            Ok((Box::new(io::stdin().lock()), "<stdin>".to_string()))
        }
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            Ok((Box::new(file), path.display().to_string()))
        }
    }
}

pub(crate) fn write_json_line<W: Write, T: Serialize>(
    out: &mut W,
    value: &T,
) -> Result<(), CliError> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Call-log input shared by the per-call subcommands.
#[derive(Debug, clap::Args)]
pub struct LogArgs {
    /// Copy each source line into its output as `raw`.
    #[arg(long)]
    pub echo_raw: bool,

    /// Stop echoing lines once this many bytes have been echoed.
    #[arg(long, value_name = "BYTES", requires = "echo_raw")]
    pub raw_budget: Option<usize>,

    /// Print the full reason for each rejected line to stderr, line text included.
    #[arg(long)]
    pub error_details: bool,

    /// Longest accepted line; longer lines are reported and skipped.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    /// JSONL call log (stdin when omitted).
    pub file: Option<PathBuf>,
}

impl LogArgs {
    fn ingest_options(&self) -> IngestOptions {
        let mut options = IngestOptions::default().max_line_bytes(self.max_line_bytes);
        if self.echo_raw {
            options = options.echo_lines(self.raw_budget);
        }
        if self.error_details {
            options = options.observe_rejections(|rejection: Rejection| {
                eprintln!(
                    "{}:{}: {}",
                    rejection.source_name, rejection.line_number, rejection.details
                );
            });
        }
        options
    }
}

/// Ingests a call log and prints one JSON line per record.
///
/// Good calls are rendered by `render`; rejected lines print `{line, error}`.
/// Echoed source lines ride along as `raw`.
pub(crate) fn each_call<F>(log: &LogArgs, mut render: F) -> Result<Summary, CliError>
where
    F: FnMut(usize, &AgentCallResult) -> Result<Value, CliError>,
{
    let (reader, source_name) = open(log.file.as_deref())?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut summary = Summary::default();

    for record in CallLogIngestor::new(reader, log.ingest_options(), source_name) {
        let mut rendered = match record.outcome {
            Ok(call) => {
                summary.calls += 1;
                render(record.line_number, &call)?
            }
            Err(err) => {
                summary.failed_lines += 1;
                json!({"line": record.line_number, "error": err.to_string()})
            }
        };
        if let (Some(raw), Some(fields)) = (record.raw, rendered.as_object_mut()) {
            fields.insert("raw".to_string(), Value::String(raw));
        }
        write_json_line(&mut out, &rendered)?;
    }
    out.flush()?;
    Ok(summary)
}
