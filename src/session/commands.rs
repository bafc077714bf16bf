use super::{Panel, reload_into};
use crate::{
    device_client::DeviceClient,
    types::{Command, ConfirmationAction, ConfirmationRequest, Severity},
};
use log::{error, info, warn};

/// Notification texts for a command's success and failure
fn outcome_messages(command: Command) -> (&'static str, &'static str) {
    match command {
        Command::Hangup => ("Hang up successful", "Could not hang up"),
        Command::Reboot => ("Device is rebooting", "Could not restart"),
        Command::Update => ("Device is updating", "Could not update"),
        Command::Factory => (
            "Factory defaults restored",
            "Could not reset to factory defaults",
        ),
        Command::EepromSave => ("Settings are saved", "Could not save settings"),
        Command::EepromLoad => ("Settings are loaded", "Could not load settings"),
    }
}

impl<C: DeviceClient> Panel<C> {
    pub(super) async fn on_command_button(&mut self, command: Command) {
        if self.state.loading {
            warn!("{} rejected: another command is in flight", command.id());
            return;
        }

        match command.confirmation() {
            Some(action) => {
                self.state.confirmation = Some(ConfirmationRequest::from(action));
                self.render();
            }
            None => self.run_command(command).await,
        }
    }

    pub(super) async fn on_confirmation_confirm(&mut self, action: ConfirmationAction) {
        if self.state.loading {
            warn!("confirm {action:?} rejected: another command is in flight");
            return;
        }

        // the pending request is kept when the action does not match
        if self
            .state
            .confirmation
            .take_if(|pending| pending.action == action)
            .is_none()
        {
            warn!("confirm {action:?} ignored: no matching confirmation pending");
            return;
        }
        self.render();

        self.run_command(action.command()).await;
    }

    pub(super) fn on_confirmation_cancel(&mut self) {
        if self.state.confirmation.take().is_some() {
            self.render();
        }
    }

    async fn run_command(&mut self, command: Command) {
        let (success, failure) = outcome_messages(command);
        let (mut state, client, notifier) = self.begin_loading();

        match client.command(command).await {
            Ok(()) => {
                info!("{} succeeded", command.id());
                notifier.notify(success, Severity::Success);

                if command == Command::Hangup {
                    if let Err(e) = reload_into(client, &mut state).await {
                        warn!("refresh after hang up failed: {e:#}");
                    }
                }
            }
            Err(e) => {
                error!("{} failed: {e:#}", command.id());
                notifier.notify(failure, Severity::Danger);
            }
        }
    }
}
