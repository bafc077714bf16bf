use crate::{
    settings::{SettingsDraft, SettingsField},
    types::{ConfirmationRequest, Settings, Status},
};
use serde::Serialize;

/// Open settings dialog
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDialog {
    pub draft: SettingsDraft,
    /// Field marked invalid by the last validation attempt
    pub invalid_field: Option<SettingsField>,
    pub focused: SettingsField,
}

impl SettingsDialog {
    pub fn new(settings: &Settings) -> Self {
        Self {
            draft: SettingsDraft::from_settings(settings),
            invalid_field: None,
            focused: SettingsField::FIRST,
        }
    }
}

/// Panel view-model - the complete session state
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    // Load state
    pub ready: bool,
    pub error: Option<String>,

    // Device state
    pub status: Status,
    pub settings: Settings,

    // Dialogs
    pub settings_dialog: Option<SettingsDialog>,
    pub settings_dialog_error: Option<String>,
    pub confirmation: Option<ConfirmationRequest>,

    // Command state
    pub loading: bool,
}

impl SessionState {
    pub fn start_loading(&mut self) {
        self.loading = true;
    }

    pub fn stop_loading(&mut self) {
        self.loading = false;
    }

    pub fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }

    pub fn is_settings_dialog_open(&self) -> bool {
        self.settings_dialog.is_some()
    }
}
