use espmodem_panel::{
    DeviceClient, GatewayError, ModemDeviceClient,
    http_client::Gateway,
    settings::SettingsPayload,
    types::Command,
};
use reqwest::Url;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Request as seen by the mock device
#[derive(Debug)]
struct ReceivedRequest {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

// Integration tests against a minimal HTTP/1.1 device on a local port
async fn start_mock_device(
    status_line: &'static str,
    response_body: &'static str,
) -> (Url, mpsc::UnboundedReceiver<ReceivedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock device");
    let addr = listener.local_addr().expect("no local address");
    let (request_tx, request_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let request_tx = request_tx.clone();

            tokio::spawn(async move {
                let mut reader = BufReader::new(&mut stream);
                let mut request_line = String::new();
                if reader.read_line(&mut request_line).await.is_err() {
                    return;
                }

                // Read HTTP headers
                let mut headers = Vec::new();
                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.is_err() {
                        return;
                    }
                    let line = line.trim_end().to_string();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap_or(0);
                        }
                    }
                    headers.push(line.to_ascii_lowercase());
                }

                let mut body = vec![0; content_length];
                if reader.read_exact(&mut body).await.is_err() {
                    return;
                }

                let _ = request_tx.send(ReceivedRequest {
                    request_line: request_line.trim_end().to_string(),
                    headers,
                    body: String::from_utf8_lossy(&body).into_owned(),
                });

                let http_response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{response_body}",
                    response_body.len()
                );
                let _ = stream.write_all(http_response.as_bytes()).await;
            });
        }
    });

    let base_url = format!("http://{addr}/").parse().expect("invalid base url");
    (base_url, request_rx)
}

fn device(base_url: Url, timeout: Duration) -> ModemDeviceClient {
    ModemDeviceClient::new(Gateway::new(base_url, timeout))
}

#[tokio::test]
async fn status_is_decoded_from_json() {
    let (base_url, mut requests) = start_mock_device(
        "200 OK",
        r#"{"wifiStatus":"CONNECTED","ipAddress":"192.168.4.1"}"#,
    )
    .await;

    let status = device(base_url, Duration::from_secs(5))
        .status()
        .await
        .expect("status request failed");

    assert_eq!(status.field("wifiStatus"), "CONNECTED");
    assert_eq!(status.field("ipAddress"), "192.168.4.1");
    assert_eq!(status.field("missing"), "");

    let request = requests.recv().await.expect("no request received");
    assert_eq!(request.request_line, "GET /api/get/status HTTP/1.1");
}

#[tokio::test]
async fn non_success_status_is_an_http_error() {
    let (base_url, _requests) = start_mock_device("500 Internal Server Error", "{}").await;

    let result = device(base_url, Duration::from_secs(5)).settings().await;

    assert_eq!(result.unwrap_err(), GatewayError::HttpError { status: 500 });
}

#[tokio::test]
async fn malformed_body_is_an_invalid_response() {
    let (base_url, _requests) = start_mock_device("200 OK", "not json").await;

    let result = device(base_url, Duration::from_secs(5)).status().await;

    assert!(matches!(
        result.unwrap_err(),
        GatewayError::InvalidResponse { .. }
    ));
}

#[tokio::test]
async fn commands_hit_their_endpoints() {
    let (base_url, mut requests) = start_mock_device("200 OK", "").await;
    let device = device(base_url, Duration::from_secs(5));

    device
        .command(Command::Hangup)
        .await
        .expect("hang up failed");
    device
        .command(Command::EepromLoad)
        .await
        .expect("eeprom load failed");

    let first = requests.recv().await.expect("no request received");
    let second = requests.recv().await.expect("no request received");
    assert_eq!(first.request_line, "GET /api/commands/ath HTTP/1.1");
    assert_eq!(second.request_line, "GET /api/commands/eeprom/load HTTP/1.1");
}

#[tokio::test]
async fn save_settings_posts_json() {
    let (base_url, mut requests) = start_mock_device("200 OK", "{}").await;
    let payload = SettingsPayload {
        ssid: "home".to_string(),
        password: "secret".to_string(),
        serial_speed: 8,
        tcp_server_port: 23,
        busy_msg: "BUSY".to_string(),
    };

    device(base_url, Duration::from_secs(5))
        .save_settings(payload)
        .await
        .expect("save settings failed");

    let request = requests.recv().await.expect("no request received");
    assert_eq!(request.request_line, "POST /api/save/settings HTTP/1.1");
    assert!(
        request
            .headers
            .contains(&"content-type: application/json".to_string())
    );
    assert!(
        request
            .headers
            .contains(&"accept: application/json".to_string())
    );
    let body: serde_json::Value = serde_json::from_str(&request.body).expect("body is not json");
    assert_eq!(
        body,
        serde_json::json!({
            "ssid": "home",
            "password": "secret",
            "serialSpeed": 8,
            "tcpServerPort": 23,
            "busyMsg": "BUSY",
        })
    );
}

#[tokio::test]
async fn silent_device_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock device");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        // accept and never answer
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let base_url: Url = format!("http://{addr}/").parse().expect("invalid base url");
    let started = Instant::now();
    let result = device(base_url, Duration::from_millis(100)).status().await;

    assert_eq!(result.unwrap_err(), GatewayError::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn per_request_timeout_overrides_default() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock device");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let gateway = Gateway::new(
        format!("http://{addr}/").parse().expect("invalid base url"),
        Duration::from_secs(60),
    );
    let result = gateway
        .request(
            "api/get/status",
            espmodem_panel::http_client::RequestOptions::get(),
            Duration::from_millis(50),
        )
        .await;

    assert!(result.unwrap_err().is_timeout());
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no local address");
    drop(listener);

    let base_url: Url = format!("http://{addr}/").parse().expect("invalid base url");
    let result = device(base_url, Duration::from_secs(5)).status().await;

    assert!(matches!(
        result.unwrap_err(),
        GatewayError::NetworkError { .. }
    ));
}

#[tokio::test]
async fn stalled_body_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock device");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        // headers promise 100 bytes, only a few are sent
        let mut held = Vec::new();
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut request = [0; 1024];
            let _ = stream.read(&mut request).await;
            let _ = stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"a\":",
                )
                .await;
            held.push(stream);
        }
    });

    let base_url: Url = format!("http://{addr}/").parse().expect("invalid base url");
    let started = Instant::now();
    let result = device(base_url, Duration::from_millis(200)).settings().await;

    assert_eq!(result.unwrap_err(), GatewayError::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(5));
}
