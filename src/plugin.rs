//! Host-facing surface: metadata, configuration, field schema, extraction and
//! capability registration.

use crate::batch::BatchProducer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::source::LineSource;
use serde::Serialize;
use tracing::{debug, info};

/// Identity of the plugin as announced to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub contact: &'static str,
    pub version: &'static str,
    pub event_source: &'static str,
}

/// Description of one extractable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldEntry {
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub name: &'static str,
    pub display: &'static str,
    pub desc: &'static str,
}

/// Field id of `shell.command`, the full captured line.
pub const SHELL_COMMAND_FIELD: u64 = 0;

static FIELDS: [FieldEntry; 1] = [FieldEntry {
    field_type: "string",
    name: "shell.command",
    display: "Shell command line",
    desc: "The command line typed by user in the shell",
}];

static INFO: PluginInfo = PluginInfo {
    id: 999,
    name: "bash",
    description: "A Plugin that reads from ~/.bash_history",
    contact: "github.com/falcosecurity/plugin-sdk-go/",
    version: env!("CARGO_PKG_VERSION"),
    event_source: "bash",
};

/// A request to extract one field from a captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    field_id: u64,
    field: String,
}

impl ExtractRequest {
    pub fn new(field_id: u64, field: impl Into<String>) -> Self {
        Self {
            field_id,
            field: field.into(),
        }
    }

    /// Resolves a field name against the declared schema.
    pub fn by_name(field: &str) -> Result<Self> {
        FIELDS
            .iter()
            .position(|entry| entry.name == field)
            .map(|index| Self::new(index as u64, field))
            .ok_or_else(|| Error::UnsupportedField {
                field: field.to_string(),
            })
    }

    pub fn field_id(&self) -> u64 {
        self.field_id
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

/// Receives the capabilities a plugin offers. Implemented by the host.
pub trait Registrar {
    fn register_extractor(&mut self, info: &PluginInfo, fields: &[FieldEntry]);
    fn register_source(&mut self, info: &PluginInfo);
}

/// The shell history event source.
#[derive(Debug, Clone)]
pub struct BashPlugin {
    config: Config,
}

impl BashPlugin {
    /// Initializes the plugin from a configuration blob. An empty blob
    /// selects `$HOME/.bash_history`.
    pub fn init(config_text: &str) -> Result<Self> {
        let config = Config::parse(config_text)?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        info!(path = %config.path.display(), "initialized bash plugin");
        Self { config }
    }

    pub fn info(&self) -> &'static PluginInfo {
        &INFO
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Declares extraction and event-source capabilities to the host.
    pub fn register(&self, registrar: &mut impl Registrar) {
        registrar.register_extractor(self.info(), self.fields());
        registrar.register_source(self.info());
    }

    /// Starts a capture session at the end of the configured history file.
    /// Open parameters are not used by this source.
    pub async fn open(&self, params: &str) -> Result<BatchProducer> {
        if !params.is_empty() {
            debug!(params, "ignoring open parameters");
        }
        let source = LineSource::open(&self.config.path).await?;
        Ok(BatchProducer::new(source))
    }

    pub fn fields(&self) -> &'static [FieldEntry] {
        &FIELDS
    }

    /// The field schema rendered as the JSON array hosts consume.
    pub fn fields_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self.fields())?)
    }

    /// Extracts the requested field from a captured event's raw bytes.
    /// Bytes that are not UTF-8 come back as replacement characters.
    pub fn extract(&self, request: &ExtractRequest, event: &[u8]) -> Result<String> {
        match request.field_id() {
            SHELL_COMMAND_FIELD => Ok(String::from_utf8_lossy(event).into_owned()),
            _ => Err(Error::UnsupportedField {
                field: request.field().to_string(),
            }),
        }
    }
}
