//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crowdsec_gate::config::BouncerConfig;

/// A request received by the mock Local API.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub head: String,
    pub body: String,
}

pub type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

/// Start a mock Local API that bans the given addresses.
///
/// `GET /v1/decisions?ip=X` returns one ban for listed addresses and `null`
/// otherwise; every other request gets `201` with an empty body.
pub async fn start_mock_lapi(addr: SocketAddr, banned: &'static [&'static str]) -> RequestLog {
    let listener = TcpListener::bind(addr).await.unwrap();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let task_log = log.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let log = task_log.clone();
                    tokio::spawn(async move {
                        handle_connection(socket, banned, log).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    log
}

async fn handle_connection(mut socket: TcpStream, banned: &[&str], log: RequestLog) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };

    let (status, body) = if request.method == "GET" && request.target.starts_with("/v1/decisions") {
        let ip = request
            .target
            .split_once("ip=")
            .map(|(_, ip)| ip.split('&').next().unwrap_or_default().replace("%3A", ":"))
            .unwrap_or_default();
        if banned.contains(&ip.as_str()) {
            (
                "200 OK",
                format!(
                    r#"[{{"id":1,"origin":"cscli","type":"ban","scope":"Ip","value":"{}","duration":"3h59m","scenario":"manual 'ban' from 'test'"}}]"#,
                    ip
                ),
            )
        } else {
            ("200 OK", "null".to_string())
        }
    } else {
        ("201 Created", String::new())
    };

    log.lock().unwrap().push(request);

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    Some(RecordedRequest {
        method: request_line.next().unwrap_or_default().to_string(),
        target: request_line.next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[head_end..]).to_string(),
        head,
    })
}

/// Bouncer configuration pointed at a mock Local API.
pub fn bouncer_config(lapi_addr: SocketAddr, bind_addr: SocketAddr) -> BouncerConfig {
    let mut config = BouncerConfig::default();
    config.crowdsec.api_key = "test-key".into();
    config.crowdsec.agent_url = format!("http://{}/", lapi_addr);
    config.listener.bind_address = bind_addr.to_string();
    config.usage_metrics.enabled = false;
    config
}

/// JSON body for a sniff request.
pub fn sniff_body(hostname: &str, remote_addr: &str, headers: &[(&str, &str)]) -> String {
    let header: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::json!([v])))
        .collect();
    serde_json::json!({
        "method": "GET",
        "hostname": hostname,
        "remote_addr": remote_addr,
        "request_uri": "/",
        "header": header,
    })
    .to_string()
}
