use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("MIDI port '{port}' not found. Available ports: {available:?}")]
    SourceUnavailable { port: String, available: Vec<String> },

    #[error("failed to create MIDI input: {0}")]
    MidiInit(#[from] midir::InitError),

    #[error("failed to connect to MIDI port '{port}': {reason}")]
    MidiConnect { port: String, reason: String },

    #[error("no controller found on any of {patterns:?}. Check connection and try again")]
    TransportUnavailable { patterns: Vec<String> },

    #[error("failed to enumerate serial ports: {0}")]
    SerialEnumerate(#[from] serialport::Error),

    #[error("write to controller failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {reason}")]
    Config { path: PathBuf, reason: String },
}

impl BridgeError {
    pub fn config(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        BridgeError::Config {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
