// src/test_support.rs
//
// In-process HTTP fixtures for exercising the network edges. Each server
// speaks just enough HTTP/1.1 for a reqwest client: read the request
// (headers plus Content-Length body if present), answer with a canned
// response, close.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Serve `status`/`body` to every connection, forwarding each raw request
/// to the returned channel. Returns the base URL to point a client at.
pub(crate) async fn spawn_canned_server(
    status: u16,
    body: &'static str,
) -> (String, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(request) = handle_connection(socket, status, body).await {
                    let _ = tx.send(request);
                }
            });
        }
    });

    (format!("http://{}", addr), rx)
}

/// Accept connections but never answer. Connections are parked so the
/// client's own timeout is the only way out.
pub(crate) async fn spawn_silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut parked = Vec::new();
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            parked.push(socket);
        }
    });

    format!("http://{}", addr)
}

async fn handle_connection(mut socket: TcpStream, status: u16, body: &str) -> Option<Vec<u8>> {
    let request = read_request(&mut socket).await?;

    let reason = match status {
        200 => "OK",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await.ok()?;
    socket.shutdown().await.ok();

    Some(request)
}

async fn read_request(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        if let Some(header_end) = find_subslice(&buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]);
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);

            if buf.len() - (header_end + 4) >= content_length {
                return Some(buf);
            }
        }

        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return if buf.is_empty() { None } else { Some(buf) };
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
