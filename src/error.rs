//! Error types for classification, configuration and commands

use thiserror::Error;

/// Recoverable classification outcomes. The caller skips the message;
/// none of these indicate a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    /// Topic does not belong to the configured vehicle
    #[error("not an OVMS topic: {0}")]
    NotOvmsTopic(String),

    /// Command/response, client or event traffic
    #[error("not a metric topic: {0}")]
    NotAMetricTopic(String),

    /// Topic contained a blacklisted substring
    #[error("blacklisted by pattern '{0}'")]
    Blacklisted(String),
}

/// Setup-time configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Topic structure template is unusable
    #[error("invalid topic structure '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// Required field absent after file and environment merge
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A setting could not be parsed
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// A blacklist pattern failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Command channel failures
#[derive(Debug, Error)]
pub enum CommandError {
    /// Broker rejected the publish or the client is gone
    #[error("failed to publish command: {0}")]
    Publish(String),

    /// No response within the configured timeout
    #[error("command {command_id} timed out after {seconds}s")]
    Timeout { command_id: String, seconds: u64 },

    /// Pending entry was dropped before a response arrived
    #[error("command {0} cancelled")]
    Cancelled(String),

    /// Service request payload could not be decoded
    #[error("invalid service request: {0}")]
    InvalidRequest(String),

    /// `turn_on`/`turn_off` named an entity that is not a bridged switch
    #[error("no switch entity {0}")]
    UnknownSwitch(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub type CommandResult<T> = Result<T, CommandError>;
