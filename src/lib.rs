//! Control panel for the ESP serial-to-network modem.
//!
//! The panel talks to the modem's REST API through a [`http_client::Gateway`],
//! keeps the operator session in a [`session::Panel`] and reports command
//! outcomes as transient [`notification`]s.

pub mod config;
pub mod console;
pub mod device_client;
pub mod error;
pub mod http_client;
pub mod notification;
pub mod session;
pub mod settings;
pub mod types;

pub use device_client::{DeviceClient, ModemDeviceClient, load_status_and_settings};
pub use error::{GatewayError, ValidationError};
pub use session::{Event, Panel, SessionState};
