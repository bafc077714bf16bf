use super::{Panel, SettingsDialog, reload_into};
use crate::{device_client::DeviceClient, settings::SettingsDraft, types::Severity};
use log::{error, info, warn};
use serde_valid::Validate;

impl<C: DeviceClient> Panel<C> {
    /// Open the dialog pre-populated with the committed settings
    pub(super) fn open_settings_dialog(&mut self) {
        self.state.settings_dialog = Some(SettingsDialog::new(&self.state.settings));
        self.render();
    }

    pub(super) fn on_settings_dialog_cancel(&mut self) {
        if self.state.settings_dialog.take().is_some() {
            self.render();
        }
    }

    pub(super) async fn on_settings_dialog_save(&mut self, draft: SettingsDraft) {
        if self.state.loading {
            warn!("save settings rejected: another command is in flight");
            return;
        }

        let Some(dialog) = self.state.settings_dialog.as_mut() else {
            warn!("save settings ignored: settings dialog is not open");
            return;
        };

        dialog.invalid_field = None;
        dialog.draft = draft;

        let payload = match dialog.draft.validate() {
            Ok(payload) => payload,
            Err(e) => {
                info!("settings rejected: {e}");
                dialog.invalid_field = Some(e.field);
                dialog.focused = e.field;
                self.render();
                return;
            }
        };

        if let Err(e) = payload.validate() {
            error!("settings payload failed validation: {e}");
            self.state.settings_dialog_error = Some(e.to_string());
            self.render();
            return;
        }

        self.state.settings_dialog_error = None;
        let (mut state, client, notifier) = self.begin_loading();

        let result = match client.save_settings(payload).await {
            Ok(()) => reload_into(client, &mut state).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!("settings saved");
                state.settings_dialog = None;
                notifier.notify("Settings updated", Severity::Success);
            }
            Err(e) => {
                error!("save settings failed: {e:#}");
                state.settings_dialog_error = Some(e.to_string());
            }
        }
    }
}
