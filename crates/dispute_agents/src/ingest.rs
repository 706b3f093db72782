use std::io::Read;

use serde_json::Value;
use tracing::warn;

use crate::call::AgentCallResult;
use crate::config::{IngestOptions, RawEcho};
use crate::error::{IngestErrorCode, LineRecord, LineRecordError, Rejection};
use crate::reader::{BoundedLine, BoundedLineReader};

/// Reads a JSONL log of recorded agent calls, one [`AgentCallResult`] per line.
///
/// Blank lines are skipped. Every other line yields a [`LineRecord`]; a bad
/// line never stops iteration.
pub struct CallLogIngestor<R: Read> {
    reader: BoundedLineReader<R>,
    options: IngestOptions,
    source_name: String,
}

impl<R: Read> CallLogIngestor<R> {
    pub fn new(reader: R, options: IngestOptions, source_name: impl Into<String>) -> Self {
        Self {
            reader: BoundedLineReader::new(reader, options.max_line_bytes),
            options,
            source_name: source_name.into(),
        }
    }

    fn failed<T>(line_number: usize, err: LineRecordError) -> LineRecord<T> {
        LineRecord {
            line_number,
            raw: None,
            outcome: Err(err),
        }
    }

    fn echo(&mut self, line: &str) -> Option<String> {
        match &mut self.options.echo {
            RawEcho::Off => None,
            RawEcho::Lines { budget: None } => Some(line.to_string()),
            RawEcho::Lines {
                budget: Some(remaining),
            } => {
                *remaining = remaining.checked_sub(line.len())?;
                Some(line.to_string())
            }
        }
    }

    fn reject<T>(
        &mut self,
        line_number: usize,
        raw: Option<String>,
        code: IngestErrorCode,
        summary: String,
        details: String,
    ) -> LineRecord<T> {
        warn!(line_number, source = %self.source_name, "call log line rejected: {summary}");
        if let Some(observer) = self.options.observer.as_mut() {
            observer.observe(Rejection {
                source_name: self.source_name.clone(),
                line_number,
                code,
                details,
            });
        }
        LineRecord {
            line_number,
            raw,
            outcome: Err(LineRecordError::Rejected { code, summary }),
        }
    }

    fn ingest_line(&mut self, line_number: usize, line: &str) -> LineRecord<AgentCallResult> {
        let raw = self.echo(line);
        match serde_json::from_str::<Value>(line) {
            Err(err) => self.reject(
                line_number,
                raw,
                IngestErrorCode::JsonParse,
                format!(
                    "invalid JSON at line {}, column {}",
                    err.line(),
                    err.column()
                ),
                format!("{err}: {line}"),
            ),
            Ok(value) if !value.is_object() => self.reject(
                line_number,
                raw,
                IngestErrorCode::NotAnObject,
                "call record must be a JSON object".to_string(),
                format!("non-object call record: {line}"),
            ),
            Ok(value) => LineRecord {
                line_number,
                raw,
                outcome: Ok(AgentCallResult::from_value(&value)),
            },
        }
    }
}

impl<R: Read> Iterator for CallLogIngestor<R> {
    type Item = LineRecord<AgentCallResult>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.next()? {
                BoundedLine::IoError { line_number } => {
                    return Some(Self::failed(line_number, LineRecordError::Io));
                }
                BoundedLine::TooLong {
                    line_number,
                    observed_bytes,
                    max_line_bytes,
                } => {
                    return Some(Self::failed(
                        line_number,
                        LineRecordError::LineTooLong {
                            observed_bytes,
                            max_line_bytes,
                        },
                    ));
                }
                BoundedLine::Line { line_number, bytes } => {
                    let Ok(text) = String::from_utf8(bytes) else {
                        return Some(Self::failed(line_number, LineRecordError::InvalidUtf8));
                    };
                    let line = text.strip_suffix('\r').unwrap_or(&text);
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(self.ingest_line(line_number, line));
                }
            }
        }
    }
}
