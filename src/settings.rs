//! Settings dialog draft and its client-side validation.
//!
//! The draft holds raw form text. It is promoted to a [`SettingsPayload`] only
//! when every field passes validation, and only the payload is ever sent.

use crate::{
    error::ValidationError,
    types::{BAUD_RATES, Settings},
};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::fmt;

/// Editable fields of the settings dialog, in form order.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SettingsField {
    Ssid,
    Password,
    SerialSpeed,
    TcpServerPort,
    BusyMsg,
}

impl SettingsField {
    pub const ALL: [SettingsField; 5] = [
        SettingsField::Ssid,
        SettingsField::Password,
        SettingsField::SerialSpeed,
        SettingsField::TcpServerPort,
        SettingsField::BusyMsg,
    ];

    /// Field that receives focus when the dialog opens.
    pub const FIRST: SettingsField = SettingsField::Ssid;

    /// JSON key used by the device API.
    pub fn key(self) -> &'static str {
        match self {
            SettingsField::Ssid => "ssid",
            SettingsField::Password => "password",
            SettingsField::SerialSpeed => "serialSpeed",
            SettingsField::TcpServerPort => "tcpServerPort",
            SettingsField::BusyMsg => "busyMsg",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Settings as sent to `api/save/settings`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    #[validate(min_length = 1)]
    pub ssid: String,
    #[validate(min_length = 1)]
    pub password: String,
    #[validate(maximum = 8)]
    pub serial_speed: u8,
    #[validate(minimum = 1)]
    pub tcp_server_port: u16,
    #[validate(min_length = 1)]
    pub busy_msg: String,
}

/// In-dialog copy of the settings, as typed by the operator.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDraft {
    pub ssid: String,
    pub password: String,
    pub serial_speed: String,
    pub tcp_server_port: String,
    pub busy_msg: String,
}

impl SettingsDraft {
    /// Pre-populate from committed settings; absent fields become `""`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            ssid: settings.field(SettingsField::Ssid.key()),
            password: settings.field(SettingsField::Password.key()),
            serial_speed: settings.field(SettingsField::SerialSpeed.key()),
            tcp_server_port: settings.field(SettingsField::TcpServerPort.key()),
            busy_msg: settings.field(SettingsField::BusyMsg.key()),
        }
    }

    pub fn get(&self, field: SettingsField) -> &str {
        match field {
            SettingsField::Ssid => &self.ssid,
            SettingsField::Password => &self.password,
            SettingsField::SerialSpeed => &self.serial_speed,
            SettingsField::TcpServerPort => &self.tcp_server_port,
            SettingsField::BusyMsg => &self.busy_msg,
        }
    }

    pub fn set(&mut self, field: SettingsField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SettingsField::Ssid => self.ssid = value,
            SettingsField::Password => self.password = value,
            SettingsField::SerialSpeed => self.serial_speed = value,
            SettingsField::TcpServerPort => self.tcp_server_port = value,
            SettingsField::BusyMsg => self.busy_msg = value,
        }
    }

    /// Validate the draft and build the payload to send.
    ///
    /// Fields are checked in form order and the first offending one is
    /// reported. The password is taken verbatim; ssid and busy message are
    /// trimmed.
    pub fn validate(&self) -> Result<SettingsPayload, ValidationError> {
        let ssid = self.ssid.trim();
        if ssid.is_empty() {
            return Err(ValidationError::new(SettingsField::Ssid));
        }

        if self.password.is_empty() {
            return Err(ValidationError::new(SettingsField::Password));
        }

        let serial_speed = self
            .serial_speed
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|index| usize::from(*index) < BAUD_RATES.len())
            .ok_or(ValidationError::new(SettingsField::SerialSpeed))?;

        let tcp_server_port = parse_port(&self.tcp_server_port)
            .ok_or(ValidationError::new(SettingsField::TcpServerPort))?;

        let busy_msg = self.busy_msg.trim();
        if busy_msg.is_empty() {
            return Err(ValidationError::new(SettingsField::BusyMsg));
        }

        Ok(SettingsPayload {
            ssid: ssid.to_string(),
            password: self.password.clone(),
            serial_speed,
            tcp_server_port,
            busy_msg: busy_msg.to_string(),
        })
    }
}

/// Parse integral numeric text such as `23`, `23.0` or `2.3e1` into a port.
fn parse_port(text: &str) -> Option<u16> {
    let text = text.trim();
    if let Ok(port) = text.parse::<u16>() {
        return (port >= 1).then_some(port);
    }

    let value = text.parse::<f64>().ok()?;
    (value.fract() == 0.0 && (1.0..=f64::from(u16::MAX)).contains(&value)).then(|| value as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_draft() -> SettingsDraft {
        SettingsDraft {
            ssid: "  home  ".to_string(),
            password: " secret ".to_string(),
            serial_speed: "8".to_string(),
            tcp_server_port: "23".to_string(),
            busy_msg: " BUSY ".to_string(),
        }
    }

    #[test]
    fn valid_draft_builds_trimmed_payload() {
        let payload = valid_draft().validate().unwrap();

        assert_eq!(payload.ssid, "home");
        assert_eq!(payload.password, " secret ");
        assert_eq!(payload.serial_speed, 8);
        assert_eq!(payload.tcp_server_port, 23);
        assert_eq!(payload.busy_msg, "BUSY");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn payload_serializes_with_device_keys() {
        let payload = valid_draft().validate().unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "ssid": "home",
                "password": " secret ",
                "serialSpeed": 8,
                "tcpServerPort": 23,
                "busyMsg": "BUSY",
            })
        );
    }

    #[test]
    fn blank_ssid_is_rejected() {
        let mut draft = valid_draft();
        draft.ssid = "   ".to_string();
        assert_eq!(draft.validate().unwrap_err().field, SettingsField::Ssid);
    }

    #[test]
    fn empty_password_is_rejected() {
        let mut draft = valid_draft();
        draft.password.clear();
        assert_eq!(draft.validate().unwrap_err().field, SettingsField::Password);
    }

    #[test]
    fn out_of_range_ports_are_rejected() {
        for port in ["0", "65536", "23.5", "abc", "", "-1"] {
            let mut draft = valid_draft();
            draft.tcp_server_port = port.to_string();
            assert_eq!(
                draft.validate().unwrap_err().field,
                SettingsField::TcpServerPort,
                "port {port:?}"
            );
        }
    }

    #[test]
    fn integral_decimal_ports_are_accepted() {
        for port in ["23.0", "2.3e1", " 23 "] {
            let mut draft = valid_draft();
            draft.tcp_server_port = port.to_string();
            assert_eq!(draft.validate().unwrap().tcp_server_port, 23, "port {port:?}");
        }
    }

    #[test]
    fn non_integral_or_non_finite_ports_are_rejected() {
        for port in ["23.01", "6.5536e4", "inf", "NaN", "-0"] {
            let mut draft = valid_draft();
            draft.tcp_server_port = port.to_string();
            assert_eq!(
                draft.validate().unwrap_err().field,
                SettingsField::TcpServerPort,
                "port {port:?}"
            );
        }
    }

    #[test]
    fn boundary_ports_are_accepted() {
        for port in ["1", "65535"] {
            let mut draft = valid_draft();
            draft.tcp_server_port = port.to_string();
            assert!(draft.validate().is_ok(), "port {port:?}");
        }
    }

    #[test]
    fn serial_speed_must_index_baud_table() {
        let mut draft = valid_draft();
        draft.serial_speed = "9".to_string();
        assert_eq!(
            draft.validate().unwrap_err().field,
            SettingsField::SerialSpeed
        );
    }

    #[test]
    fn blank_busy_message_is_rejected() {
        let mut draft = valid_draft();
        draft.busy_msg = " ".to_string();
        assert_eq!(draft.validate().unwrap_err().field, SettingsField::BusyMsg);
    }

    #[test]
    fn first_offending_field_wins() {
        let draft = SettingsDraft::default();
        assert_eq!(draft.validate().unwrap_err().field, SettingsField::Ssid);
    }

    #[test]
    fn draft_from_settings_fills_absent_fields_with_empty_strings() {
        let settings: Settings = serde_json::from_value(json!({
            "ssid": "home",
            "serialSpeed": "3",
            "tcpServerPort": "23",
            "echo": "1",
        }))
        .unwrap();

        let draft = SettingsDraft::from_settings(&settings);

        assert_eq!(draft.ssid, "home");
        assert_eq!(draft.password, "");
        assert_eq!(draft.serial_speed, "3");
        assert_eq!(draft.tcp_server_port, "23");
        assert_eq!(draft.busy_msg, "");
    }

    #[test]
    fn field_keys_round_trip() {
        for field in SettingsField::ALL {
            assert_eq!(SettingsField::from_key(field.key()), Some(field));
        }
    }
}
