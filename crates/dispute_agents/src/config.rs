use std::path::Path;

use serde::Deserialize;

use crate::call::{AgentDirectory, AgentId, AgentKind};
use crate::error::{ConfigError, RejectionObserver};

/// Longest call-log line accepted by default, newline excluded.
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Whether records hand their source line back to the caller.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum RawEcho {
    #[default]
    Off,
    /// A line is echoed only while it fits in what is left of `budget`
    /// bytes. `None` echoes every line.
    Lines { budget: Option<usize> },
}

/// How a [`CallLogIngestor`](crate::CallLogIngestor) reads its log.
pub struct IngestOptions {
    pub max_line_bytes: usize,
    pub echo: RawEcho,
    /// Sees the unredacted reason for every rejected line.
    pub observer: Option<Box<dyn RejectionObserver>>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            echo: RawEcho::Off,
            observer: None,
        }
    }
}

impl IngestOptions {
    pub fn max_line_bytes(mut self, bytes: usize) -> Self {
        self.max_line_bytes = bytes;
        self
    }

    pub fn echo_lines(mut self, budget: Option<usize>) -> Self {
        self.echo = RawEcho::Lines { budget };
        self
    }

    pub fn observe_rejections(mut self, observer: impl RejectionObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }
}

/// TOML overrides for agent endpoint IDs.
///
/// ```toml
/// [agents]
/// resolution = "my-resolution-agent"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub agents: AgentOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentOverrides {
    pub case_manager: Option<String>,
    pub merchant_intelligence: Option<String>,
    pub evidence_correlator: Option<String>,
    pub risk_scoring: Option<String>,
    pub resolution: Option<String>,
}

impl AgentOverrides {
    fn get(&self, kind: AgentKind) -> Option<&str> {
        match kind {
            AgentKind::CaseManager => self.case_manager.as_deref(),
            AgentKind::MerchantIntelligence => self.merchant_intelligence.as_deref(),
            AgentKind::EvidenceCorrelator => self.evidence_correlator.as_deref(),
            AgentKind::RiskScoring => self.risk_scoring.as_deref(),
            AgentKind::Resolution => self.resolution.as_deref(),
        }
    }
}

impl DirectoryConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn into_directory(self) -> Result<AgentDirectory, ConfigError> {
        let mut directory = AgentDirectory::default();
        for kind in AgentKind::ALL {
            let Some(id) = self.agents.get(kind) else {
                continue;
            };
            let id = id.trim();
            if id.is_empty() {
                return Err(ConfigError::EmptyAgentId { agent: kind });
            }
            directory = directory.with_override(kind, AgentId::new(id));
        }
        Ok(directory)
    }
}
