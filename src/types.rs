use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Baud rates selectable on the modem, indexed by the `serialSpeed` setting.
pub const BAUD_RATES: [u32; 9] = [9600, 300, 1200, 2400, 4800, 19200, 38400, 57600, 115200];

/// Map a `serialSpeed` index to its baud rate.
pub fn baud_rate(index: usize) -> Option<u32> {
    BAUD_RATES.get(index).copied()
}

/// Render a JSON scalar the way it would appear in a form field.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Device telemetry from `api/get/status`.
///
/// The firmware reports every value as a string and adds fields between
/// releases, so the mapping is kept opaque.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Status(pub Map<String, Value>);

impl Status {
    pub fn field(&self, key: &str) -> String {
        self.0.get(key).map(display_value).unwrap_or_default()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, String)> {
        self.0.iter().map(|(k, v)| (k, display_value(v)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Committed device settings from `api/get/settings`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Settings(pub Map<String, Value>);

impl Settings {
    /// Display value of a setting, or `""` when the device did not report it.
    pub fn field(&self, key: &str) -> String {
        self.0.get(key).map(display_value).unwrap_or_default()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, String)> {
        self.0.iter().map(|(k, v)| (k, display_value(v)))
    }
}

/// One-shot device command.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Hangup,
    Reboot,
    Update,
    Factory,
    #[serde(rename = "eepsave")]
    EepromSave,
    #[serde(rename = "eepload")]
    EepromLoad,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Hangup,
        Command::Reboot,
        Command::Update,
        Command::Factory,
        Command::EepromSave,
        Command::EepromLoad,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            Command::Hangup => "api/commands/ath",
            Command::Reboot => "api/commands/reboot",
            Command::Update => "api/commands/update",
            Command::Factory => "api/commands/factory",
            Command::EepromSave => "api/commands/eeprom/save",
            Command::EepromLoad => "api/commands/eeprom/load",
        }
    }

    /// Button id used by the panel markup and the console.
    pub fn id(self) -> &'static str {
        match self {
            Command::Hangup => "hangup",
            Command::Reboot => "reboot",
            Command::Update => "update",
            Command::Factory => "factory",
            Command::EepromSave => "eepsave",
            Command::EepromLoad => "eepload",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// The confirmation this command requires, `None` if it runs immediately.
    pub fn confirmation(self) -> Option<ConfirmationAction> {
        match self {
            Command::Hangup => None,
            Command::Reboot => Some(ConfirmationAction::Reboot),
            Command::Update => Some(ConfirmationAction::Update),
            Command::Factory => Some(ConfirmationAction::Factory),
            Command::EepromSave => Some(ConfirmationAction::EepSave),
            Command::EepromLoad => Some(ConfirmationAction::EepLoad),
        }
    }
}

/// Destructive commands that wait for explicit confirmation.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationAction {
    Reboot,
    Update,
    Factory,
    EepSave,
    EepLoad,
}

impl ConfirmationAction {
    pub fn command(self) -> Command {
        match self {
            ConfirmationAction::Reboot => Command::Reboot,
            ConfirmationAction::Update => Command::Update,
            ConfirmationAction::Factory => Command::Factory,
            ConfirmationAction::EepSave => Command::EepromSave,
            ConfirmationAction::EepLoad => Command::EepromLoad,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            ConfirmationAction::Reboot => "Are you sure you want to reboot the ESP Modem?",
            ConfirmationAction::Update => "Are you sure you want to update your ESP firmware?",
            ConfirmationAction::Factory => {
                "Are you sure you want to reset your ESP to factory defaults? All settings will be lost."
            }
            ConfirmationAction::EepSave => {
                "Are you sure you want to save your current settings to EEPROM?"
            }
            ConfirmationAction::EepLoad => {
                "Are you sure you want to load settings to EEPROM? Your current settings will be lost."
            }
        }
    }
}

/// Pending request for the operator to confirm a destructive command.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub message: String,
    pub action: ConfirmationAction,
}

impl From<ConfirmationAction> for ConfirmationRequest {
    fn from(action: ConfirmationAction) -> Self {
        Self {
            message: action.prompt().to_string(),
            action,
        }
    }
}

/// Notification styling.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Success,
    Danger,
}

impl Severity {
    /// CSS class the web panel used for this severity.
    pub fn class(self) -> &'static str {
        match self {
            Severity::Success => "alert-success",
            Severity::Danger => "alert-danger",
        }
    }
}
