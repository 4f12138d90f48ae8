//! Service calls mapped onto the OVMS command shell.
//!
//! Requests arrive as JSON on the bridge's service topic:
//!
//! ```json
//! {"service": "control_charging", "action": "start", "mode": "range", "limit": 80}
//! {"service": "turn_on", "entity_id": "switch.ovms_car1_xsq_climate_enable"}
//! ```
//!
//! Every service except the switch pair becomes a [`ShellCommand`] directly;
//! switches derive their command from the bridged entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CommandError, CommandResult};

/// Switch keywords and the shell command they drive.
pub const SWITCH_COMMANDS: &[(&str, &str)] = &[
    ("climate", "climate"),
    ("charge", "charge"),
    ("lock", "lock"),
    ("valet", "valet"),
    ("debug", "debug"),
];

/// One line for the module's command shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellCommand {
    pub command: String,
    pub parameters: Option<String>,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>, parameters: impl Into<String>) -> Self {
        let parameters = parameters.into();
        Self {
            command: command.into(),
            parameters: (!parameters.trim().is_empty()).then_some(parameters),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    Auto,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeAction {
    Start,
    Stop,
    Status,
}

impl ChargeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeAction::Start => "start",
            ChargeAction::Stop => "stop",
            ChargeAction::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeMode {
    Standard,
    Storage,
    Range,
    Performance,
}

impl ChargeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeMode::Standard => "standard",
            ChargeMode::Storage => "storage",
            ChargeMode::Range => "range",
            ChargeMode::Performance => "performance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum ServiceCall {
    /// Raw shell command
    SendCommand {
        command: String,
        #[serde(default)]
        parameters: Option<String>,
    },
    /// `config set <feature> <value>`
    SetFeature { feature: String, value: Value },
    ControlClimate {
        #[serde(default)]
        temperature: Option<f64>,
        #[serde(default)]
        hvac_mode: Option<HvacMode>,
        /// Minutes
        #[serde(default)]
        duration: Option<u32>,
    },
    ControlCharging {
        action: ChargeAction,
        #[serde(default)]
        mode: Option<ChargeMode>,
        #[serde(default)]
        limit: Option<u8>,
    },
    TurnOn { entity_id: String },
    TurnOff { entity_id: String },
}

impl ServiceCall {
    pub fn from_json(payload: &[u8]) -> CommandResult<Self> {
        serde_json::from_slice(payload).map_err(|e| CommandError::InvalidRequest(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceCall::SendCommand { .. } => "send_command",
            ServiceCall::SetFeature { .. } => "set_feature",
            ServiceCall::ControlClimate { .. } => "control_climate",
            ServiceCall::ControlCharging { .. } => "control_charging",
            ServiceCall::TurnOn { .. } => "turn_on",
            ServiceCall::TurnOff { .. } => "turn_off",
        }
    }

    /// Target switch and requested state, for `turn_on`/`turn_off`.
    pub fn switch_target(&self) -> Option<(&str, bool)> {
        match self {
            ServiceCall::TurnOn { entity_id } => Some((entity_id, true)),
            ServiceCall::TurnOff { entity_id } => Some((entity_id, false)),
            _ => None,
        }
    }

    /// Shell command for every service that does not target a switch.
    pub fn shell_command(&self) -> Option<ShellCommand> {
        match self {
            ServiceCall::SendCommand {
                command,
                parameters,
            } => Some(ShellCommand::new(command.trim(), parameters.clone().unwrap_or_default())),
            ServiceCall::SetFeature { feature, value } => {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some(ShellCommand::new("config set", format!("{} {}", feature, value)))
            }
            ServiceCall::ControlClimate {
                temperature,
                hvac_mode,
                duration,
            } => {
                let mut parts = Vec::new();
                if *hvac_mode == Some(HvacMode::Off) {
                    parts.push("off".to_string());
                } else {
                    if let Some(mode) = hvac_mode {
                        parts.push(mode.as_str().to_string());
                    }
                    if let Some(t) = temperature {
                        parts.push(format!("temp {}", t));
                    }
                    if let Some(d) = duration {
                        parts.push(format!("duration {}", d));
                    }
                }
                Some(ShellCommand::new("climate", parts.join(" ")))
            }
            ServiceCall::ControlCharging {
                action,
                mode,
                limit,
            } => {
                let mut parts = vec![action.as_str().to_string()];
                // mode and limit only apply when starting
                if *action == ChargeAction::Start {
                    if let Some(mode) = mode {
                        parts.push(format!("mode {}", mode.as_str()));
                    }
                    if let Some(limit) = limit {
                        parts.push(format!("limit {}", limit));
                    }
                }
                Some(ShellCommand::new("charge", parts.join(" ")))
            }
            ServiceCall::TurnOn { .. } | ServiceCall::TurnOff { .. } => None,
        }
    }
}

/// Shell command behind a switch entity.
///
/// An explicit `command/<name>` topic segment wins, then a known keyword in
/// the metric path, then the metric path itself without a `command_` prefix.
pub fn switch_command(topic: &str, metric_path: &str) -> String {
    let mut segments = topic.split('/');
    if segments.any(|s| s == "command") {
        if let Some(name) = segments.next().filter(|s| !s.is_empty()) {
            return name.to_string();
        }
    }

    let lower = metric_path.to_ascii_lowercase();
    if let Some((_, command)) = SWITCH_COMMANDS.iter().find(|(key, _)| lower.contains(key)) {
        return command.to_string();
    }

    lower.replace("command_", "")
}

/// Shell argument for a switch state.
pub fn switch_parameter(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(json: &str) -> ServiceCall {
        ServiceCall::from_json(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_send_command() {
        let c = call(r#"{"service": "send_command", "command": "stat"}"#);
        assert_eq!(c.shell_command(), Some(ShellCommand::new("stat", "")));
        assert_eq!(c.shell_command().unwrap().parameters, None);

        let c = call(r#"{"service": "send_command", "command": " metrics list ", "parameters": "v.b"}"#);
        assert_eq!(c.shell_command(), Some(ShellCommand::new("metrics list", "v.b")));
    }

    #[test]
    fn test_set_feature() {
        let c = call(r#"{"service": "set_feature", "feature": "xnl.autoheat", "value": "yes"}"#);
        assert_eq!(c.shell_command(), Some(ShellCommand::new("config set", "xnl.autoheat yes")));

        let c = call(r#"{"service": "set_feature", "feature": "vehicle.minsoc", "value": 20}"#);
        assert_eq!(
            c.shell_command().unwrap().parameters.as_deref(),
            Some("vehicle.minsoc 20")
        );
    }

    #[test]
    fn test_control_climate() {
        let c = call(r#"{"service": "control_climate", "hvac_mode": "heat", "temperature": 21.5, "duration": 15}"#);
        assert_eq!(c.shell_command(), Some(ShellCommand::new("climate", "heat temp 21.5 duration 15")));

        // off ignores everything else
        let c = call(r#"{"service": "control_climate", "hvac_mode": "off", "temperature": 21}"#);
        assert_eq!(c.shell_command(), Some(ShellCommand::new("climate", "off")));

        let c = call(r#"{"service": "control_climate"}"#);
        assert_eq!(c.shell_command(), Some(ShellCommand::new("climate", "")));
    }

    #[test]
    fn test_control_charging() {
        let c = call(r#"{"service": "control_charging", "action": "start", "mode": "range", "limit": 80}"#);
        assert_eq!(c.shell_command(), Some(ShellCommand::new("charge", "start mode range limit 80")));

        let c = call(r#"{"service": "control_charging", "action": "stop", "mode": "range", "limit": 80}"#);
        assert_eq!(c.shell_command(), Some(ShellCommand::new("charge", "stop")));
        assert_eq!(c.name(), "control_charging");
    }

    #[test]
    fn test_invalid_requests() {
        for bad in [
            r#"{"service": "control_charging", "action": "pause"}"#,
            r#"{"service": "control_climate", "hvac_mode": "dry"}"#,
            r#"{"service": "reboot"}"#,
            r#"{"command": "stat"}"#,
            "not json",
        ] {
            let err = ServiceCall::from_json(bad.as_bytes()).unwrap_err();
            assert!(matches!(err, CommandError::InvalidRequest(_)), "{}", bad);
        }
    }

    #[test]
    fn test_switch_calls() {
        let c = call(r#"{"service": "turn_off", "entity_id": "switch.ovms_car1_xsq_climate_enable"}"#);
        assert_eq!(c.switch_target(), Some(("switch.ovms_car1_xsq_climate_enable", false)));
        assert_eq!(c.shell_command(), None);
        assert_eq!(call(r#"{"service": "send_command", "command": "stat"}"#).switch_target(), None);
    }

    #[test]
    fn test_switch_command_derivation() {
        assert_eq!(
            switch_command("ovms/alice/car1/client/command/homelink", "xsq.climate.enable"),
            "homelink"
        );
        assert_eq!(switch_command("ovms/alice/car1/metric/xsq/climate/enable", "xsq.climate.enable"), "climate");
        assert_eq!(switch_command("ovms/alice/car1/metric/v/e/valet", "v.e.valet"), "valet");
        // trailing "command" with nothing after it is not an explicit command
        assert_eq!(switch_command("ovms/alice/car1/command", "Command_Horn"), "horn");
        assert_eq!(switch_parameter(true), "on");
        assert_eq!(switch_parameter(false), "off");
    }
}
