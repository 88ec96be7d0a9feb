//! Minimal HTTP/1.1 responder standing in for the device firmware.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub(crate) type Route = fn(&str) -> (u16, &'static str);

pub(crate) fn firmware_routes(path: &str) -> (u16, &'static str) {
    match path {
        "/api/status" => (
            200,
            r#"{"uptime":3661,"wifiConnected":true,"wifiRSSI":-52,"gpsLocked":false,"freeMem":181760,"localIP":"192.168.1.40"}"#,
        ),
        "/api/gps" => (
            200,
            r#"{"locked":true,"satellites":7,"latitude":37.422000,"longitude":-122.084000,"altitude":12.50,"lastUpdate":3}"#,
        ),
        "/api/ntp" => (200, r#"{"requests":12,"currentTime":1700000000,"synchronized":true}"#),
        "/api/health" => (200, "OK"),
        _ => (404, "Not Found"),
    }
}

/// Serves `route` on an ephemeral localhost port until the test ends.
pub(crate) async fn serve(route: Route) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake device");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(respond(stream, route));
        }
    });
    addr
}

async fn respond(mut stream: TcpStream, route: Route) {
    let mut request = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let (code, body) = route(&path);
    let response = format!(
        "HTTP/1.1 {code} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
