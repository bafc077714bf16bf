//! Line-oriented operator console: input parsing and plain-text rendering of
//! the session and notification views.

use crate::{
    notification::{Notification, Phase},
    session::SessionState,
    settings::SettingsField,
    types::{Command, ConfirmationAction, Severity, baud_rate},
};
use anyhow::{Context, Result, bail};
use std::fmt;

pub const HELP: &str = "\
commands:
  status                      show device status and settings
  hangup | reboot | update | factory | eepsave | eepload
  confirm [action]            confirm the pending command
  cancel                      dismiss the pending confirmation
  settings                    open the settings dialog
  set <field> <value>         edit a dialog field (ssid, password, serialSpeed, tcpServerPort, busyMsg)
  save                        validate and save the dialog
  close                       close the dialog without saving
  help                        show this text
  quit                        exit";

/// One parsed console line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Show,
    Command(Command),
    /// Confirm the pending request; an explicit action must match it
    Confirm(Option<ConfirmationAction>),
    Cancel,
    OpenSettings,
    Set(SettingsField, String),
    Save,
    Close,
    Help,
    Quit,
}

fn parse_action(word: &str) -> Result<ConfirmationAction> {
    Command::from_id(word)
        .and_then(Command::confirmation)
        .with_context(|| format!("'{word}' does not need confirmation"))
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Input>> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line, ""),
    };

    let input = match word {
        "" => return Ok(None),
        "status" | "show" => Input::Show,
        "confirm" | "yes" if rest.trim().is_empty() => Input::Confirm(None),
        "confirm" | "yes" => Input::Confirm(Some(parse_action(rest.trim())?)),
        "cancel" | "no" => Input::Cancel,
        "settings" => Input::OpenSettings,
        "set" => {
            let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if key.is_empty() {
                bail!("usage: set <field> <value>");
            }
            let field = SettingsField::from_key(key)
                .with_context(|| format!("unknown settings field '{key}'"))?;
            // passwords may carry meaningful spaces
            let value = if field == SettingsField::Password {
                value.trim_start().to_string()
            } else {
                value.trim().to_string()
            };
            Input::Set(field, value)
        }
        "save" => Input::Save,
        "close" => Input::Close,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => match Command::from_id(other) {
            Some(command) => Input::Command(command),
            None => bail!("unknown command '{other}', type 'help'"),
        },
    };

    Ok(Some(input))
}

/// Plain-text view of a [`SessionState`]
pub struct StateView<'a>(pub &'a SessionState);

impl fmt::Display for StateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;

        if !state.ready {
            return writeln!(f, "loading...");
        }
        if let Some(error) = &state.error {
            writeln!(f, "error: {error}")?;
        }

        writeln!(f, "status:")?;
        for (key, value) in state.status.entries() {
            writeln!(f, "  {key}: {value}")?;
        }

        writeln!(f, "settings:")?;
        for (key, value) in state.settings.entries() {
            let baud = (key == SettingsField::SerialSpeed.key())
                .then(|| value.trim().parse::<usize>().ok().and_then(baud_rate))
                .flatten();
            match baud {
                Some(rate) => writeln!(f, "  {key}: {value} ({rate} baud)")?,
                None => writeln!(f, "  {key}: {value}")?,
            }
        }

        if let Some(dialog) = &state.settings_dialog {
            writeln!(f, "settings dialog:")?;
            for field in SettingsField::ALL {
                let focus = if dialog.focused == field { '>' } else { ' ' };
                let invalid = if dialog.invalid_field == Some(field) {
                    "  <- invalid"
                } else {
                    ""
                };
                let value = match field {
                    SettingsField::Password => "*".repeat(dialog.draft.get(field).len()),
                    _ => dialog.draft.get(field).to_string(),
                };
                writeln!(f, " {focus} {field}: {value}{invalid}")?;
            }
            if let Some(error) = &state.settings_dialog_error {
                writeln!(f, "  save failed: {error}")?;
            }
        }

        if let Some(pending) = &state.confirmation {
            writeln!(f, "{} [confirm/cancel]", pending.message)?;
        }
        if state.loading {
            writeln!(f, "busy...")?;
        }

        Ok(())
    }
}

pub fn render_state(state: &SessionState) -> String {
    StateView(state).to_string()
}

/// One line per notification still on screen, oldest first
pub fn render_notifications(notifications: &[Notification]) -> String {
    notifications
        .iter()
        .filter(|n| n.phase != Phase::Leaving)
        .map(|n| match n.severity {
            Severity::Success => format!("[ok] {}", n.message),
            Severity::Danger => format!("[!!] {}", n.message),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
