use crate::{
    error::GatewayError,
    http_client::Gateway,
    settings::SettingsPayload,
    types::{Command, Settings, Status},
};
use log::debug;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use trait_variant::make;

#[make(Send)]
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait DeviceClient {
    async fn status(&self) -> Result<Status, GatewayError>;
    async fn settings(&self) -> Result<Settings, GatewayError>;
    async fn save_settings(&self, settings: SettingsPayload) -> Result<(), GatewayError>;
    async fn command(&self, command: Command) -> Result<(), GatewayError>;
}

/// [`DeviceClient`] talking to the modem's REST API
#[derive(Clone, Debug)]
pub struct ModemDeviceClient {
    gateway: Gateway,
}

impl ModemDeviceClient {
    const STATUS_ENDPOINT: &str = "api/get/status";
    const SETTINGS_ENDPOINT: &str = "api/get/settings";
    const SAVE_SETTINGS_ENDPOINT: &str = "api/save/settings";

    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }
}

impl DeviceClient for ModemDeviceClient {
    async fn status(&self) -> Result<Status, GatewayError> {
        self.gateway.get_json(Self::STATUS_ENDPOINT).await
    }

    async fn settings(&self) -> Result<Settings, GatewayError> {
        self.gateway.get_json(Self::SETTINGS_ENDPOINT).await
    }

    async fn save_settings(&self, settings: SettingsPayload) -> Result<(), GatewayError> {
        debug!(
            "save settings: ssid={} serialSpeed={} tcpServerPort={}",
            settings.ssid, settings.serial_speed, settings.tcp_server_port
        );
        self.gateway
            .post_json(Self::SAVE_SETTINGS_ENDPOINT, &settings)
            .await?;
        Ok(())
    }

    async fn command(&self, command: Command) -> Result<(), GatewayError> {
        // command endpoints only report a status; the body is ignored
        self.gateway.get(command.endpoint()).await?;
        Ok(())
    }
}

/// Fetch status, then settings. The first failure aborts the sequence.
pub async fn load_status_and_settings<C: DeviceClient>(
    client: &C,
) -> Result<(Status, Settings), GatewayError> {
    let status = client.status().await?;
    let settings = client.settings().await?;
    Ok((status, settings))
}
