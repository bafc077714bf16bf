//! Session state machine of the panel.
//!
//! [`Panel`] owns the [`SessionState`] and reacts to [`Event`]s by calling the
//! device and updating the state. Every change is published on a watch
//! channel so a renderer can follow along.

mod commands;
mod model;
mod settings_dialog;

pub use model::{SessionState, SettingsDialog};

use crate::{
    device_client::{DeviceClient, load_status_and_settings},
    error::GatewayError,
    notification::Notifier,
    settings::SettingsDraft,
    types::{Command, ConfirmationAction},
};
use log::error;
use serde::{Deserialize, Serialize};
use std::{
    ops::{Deref, DerefMut},
    time::Duration,
};
use tokio::sync::watch;

/// Operator inputs and lifecycle signals of the panel
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Event {
    /// Panel shown for the first time
    Mount,

    // Command buttons
    CommandButton(Command),
    OpenSettings,

    // Confirmation dialog
    ConfirmationConfirm(ConfirmationAction),
    ConfirmationCancel,

    // Settings dialog
    SettingsDialogSave(SettingsDraft),
    SettingsDialogCancel,
}

pub struct Panel<C> {
    client: C,
    state: SessionState,
    notifier: Notifier,
    render_tx: watch::Sender<SessionState>,
    request_timeout: Duration,
}

impl<C: DeviceClient> Panel<C> {
    pub fn new(client: C, notifier: Notifier) -> Self {
        let (render_tx, _) = watch::channel(SessionState::default());
        Self {
            client,
            state: SessionState::default(),
            notifier,
            render_tx,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Timeout the client was configured with, used in user-facing messages
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.render_tx.subscribe()
    }

    /// Main event dispatcher - routes events to dialog/command handlers
    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::Mount => self.mount().await,

            Event::CommandButton(command) => self.on_command_button(command).await,
            Event::ConfirmationConfirm(action) => self.on_confirmation_confirm(action).await,
            Event::ConfirmationCancel => self.on_confirmation_cancel(),

            Event::OpenSettings => self.open_settings_dialog(),
            Event::SettingsDialogSave(draft) => self.on_settings_dialog_save(draft).await,
            Event::SettingsDialogCancel => self.on_settings_dialog_cancel(),
        }
    }

    async fn mount(&mut self) {
        if let Err(e) = self.reload().await {
            error!("initial load failed: {e:#}");
            let message = self.load_error_message(&e);
            self.state.set_error(message);
        }
        self.state.ready = true;
        self.render();
    }

    /// Fetch status and settings into the session state
    async fn reload(&mut self) -> Result<(), GatewayError> {
        reload_into(&self.client, &mut self.state).await
    }

    /// Set `loading` and hand out the pieces a device operation needs.
    ///
    /// `loading` is cleared when the guard drops, also when the handler
    /// future is cancelled mid-request.
    fn begin_loading(&mut self) -> (LoadingGuard<'_>, &C, &Notifier) {
        let Self {
            client,
            state,
            notifier,
            render_tx,
            ..
        } = self;
        (LoadingGuard::start(state, render_tx), &*client, &*notifier)
    }

    fn load_error_message(&self, e: &GatewayError) -> String {
        if e.is_timeout() {
            format!("Request timed out ({:?})", self.request_timeout)
        } else {
            format!("Could not retrieve data: {e}")
        }
    }

    fn render(&self) {
        self.render_tx.send_replace(self.state.clone());
    }
}

async fn reload_into<C: DeviceClient>(
    client: &C,
    state: &mut SessionState,
) -> Result<(), GatewayError> {
    let (status, settings) = load_status_and_settings(client).await?;
    state.status = status;
    state.settings = settings;
    Ok(())
}

/// Session state borrowed for the duration of a device operation
struct LoadingGuard<'a> {
    state: &'a mut SessionState,
    render_tx: &'a watch::Sender<SessionState>,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a mut SessionState, render_tx: &'a watch::Sender<SessionState>) -> Self {
        state.start_loading();
        render_tx.send_replace(state.clone());
        Self { state, render_tx }
    }
}

impl Deref for LoadingGuard<'_> {
    type Target = SessionState;

    fn deref(&self) -> &SessionState {
        self.state
    }
}

impl DerefMut for LoadingGuard<'_> {
    fn deref_mut(&mut self) -> &mut SessionState {
        self.state
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.stop_loading();
        self.render_tx.send_replace(self.state.clone());
    }
}
