//! Request gateway: bounded-wait HTTP calls with uniform error classification.

use crate::error::GatewayError;
use log::{debug, info};
use reqwest::{Client, Method, Response, Url, header::HeaderMap};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tokio::time::{Instant, timeout_at};

/// Method, headers and body of a gateway request
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// POST with a JSON body and `Accept: application/json`
    pub fn post_json(body: &impl Serialize) -> Result<Self, GatewayError> {
        let body = serde_json::to_vec(body).map_err(|e| GatewayError::InvalidRequest {
            cause: format!("failed to serialize request body: {e}"),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        Ok(Self {
            method: Method::POST,
            headers,
            body: Some(body),
        })
    }
}

/// HTTP gateway to the modem's REST API
#[derive(Clone, Debug)]
pub struct Gateway {
    client: Client,
    base_url: Url,
    default_timeout: Duration,
}

impl Gateway {
    pub fn new(base_url: Url, default_timeout: Duration) -> Self {
        Self::with_client(Client::new(), base_url, default_timeout)
    }

    pub fn with_client(client: Client, base_url: Url, default_timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Resolve an endpoint path against the base URL.
    ///
    /// # Example
    /// ```
    /// use espmodem_panel::http_client::Gateway;
    /// use std::time::Duration;
    ///
    /// let gateway = Gateway::new(
    ///     "http://192.168.4.1/".parse().unwrap(),
    ///     Duration::from_secs(10),
    /// );
    /// assert_eq!(gateway.build_url("/api/get/status"), "http://192.168.4.1/api/get/status");
    /// ```
    pub fn build_url(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Perform one request, waiting at most `timeout` for the response.
    ///
    /// Produces exactly one outcome. When the deadline passes first, the
    /// in-flight request and its timer are dropped together.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
        timeout: Duration,
    ) -> Result<Response, GatewayError> {
        let url = self.build_url(path);
        info!("{} {url}", options.method);

        let mut builder = self
            .client
            .request(options.method, &url)
            .headers(options.headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let response = match tokio::time::timeout(timeout, builder.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(GatewayError::from(e)),
            Err(_) => {
                debug!("{url} did not answer within {timeout:?}");
                return Err(GatewayError::TimedOut);
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpError {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// GET with the default timeout
    pub async fn get(&self, path: &str) -> Result<Response, GatewayError> {
        self.request(path, RequestOptions::get(), self.default_timeout)
            .await
    }

    /// GET and decode a JSON body. One deadline covers the headers and the
    /// body, so a device that stalls mid-body still times out.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let deadline = Instant::now() + self.default_timeout;
        let response = self
            .request(path, RequestOptions::get(), self.default_timeout)
            .await?;
        decode_json(response, deadline).await
    }

    /// POST a JSON body with the default timeout
    pub async fn post_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<Response, GatewayError> {
        self.request(path, RequestOptions::post_json(body)?, self.default_timeout)
            .await
    }
}

/// Read and decode a successful JSON response body, giving up at `deadline`
pub async fn decode_json<T: DeserializeOwned>(
    response: Response,
    deadline: Instant,
) -> Result<T, GatewayError> {
    let body = match timeout_at(deadline, response.bytes()).await {
        Ok(body) => body.map_err(GatewayError::from)?,
        Err(_) => {
            debug!("response body did not arrive before the deadline");
            return Err(GatewayError::TimedOut);
        }
    };
    serde_json::from_slice(&body).map_err(|e| GatewayError::InvalidResponse {
        cause: e.to_string(),
    })
}
