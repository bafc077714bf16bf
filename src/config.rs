use anyhow::{Context, Result, ensure};
use reqwest::Url;
use std::{env, time::Duration};

/// Panel configuration loaded and validated at startup
#[derive(Clone, Debug)]
pub struct PanelConfig {
    /// Device API root; always ends with `/`
    pub base_url: Url,

    /// Bound on the wait for any single request
    pub request_timeout: Duration,

    /// Top offset of the first notification, if the renderer has one
    pub notification_base_top: Option<f32>,
}

impl PanelConfig {
    pub const DEFAULT_BASE_URL: &str = "http://localhost/";
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

    /// Load the configuration from `MODEM_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = Self::parse_base_url(
            &lookup("MODEM_BASE_URL").unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
        )?;

        let timeout_ms = match lookup("MODEM_REQUEST_TIMEOUT_MS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .context("failed to parse MODEM_REQUEST_TIMEOUT_MS: invalid format")?,
            None => Self::DEFAULT_REQUEST_TIMEOUT_MS,
        };
        ensure!(
            timeout_ms > 0,
            "failed to load MODEM_REQUEST_TIMEOUT_MS: must be greater than zero"
        );

        let notification_base_top = lookup("MODEM_NOTIFICATION_BASE_TOP")
            .map(|value| {
                value
                    .trim()
                    .parse::<f32>()
                    .context("failed to parse MODEM_NOTIFICATION_BASE_TOP: invalid format")
            })
            .transpose()?;

        Ok(Self {
            base_url,
            request_timeout: Duration::from_millis(timeout_ms),
            notification_base_top,
        })
    }

    fn parse_base_url(raw: &str) -> Result<Url> {
        let raw = raw.trim();
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };

        let url = Url::parse(&normalized)
            .with_context(|| format!("failed to parse MODEM_BASE_URL: {raw}"))?;
        ensure!(
            !url.cannot_be_a_base(),
            "failed to load MODEM_BASE_URL: {raw} cannot be used as a base"
        );

        Ok(url)
    }
}
