//! Shared test helper: a minimal single-threaded HTTP stub server.
//!
//! Serves one canned response per request (connection-per-request via
//! `Connection: close`) and records the raw request text so tests can
//! assert on the exact bytes the SDK put on the wire.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

pub struct StubServer {
    pub endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Start a server that answers with `responses` in order, one per
    /// request, then stops listening.
    pub fn start(responses: Vec<String>) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let endpoint = format!("http://{}", listener.local_addr().expect("local addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let handle = std::thread::spawn(move || {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    break;
                };
                let request = read_request(&mut stream);
                recorded.lock().expect("requests lock").push(request);
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        StubServer {
            endpoint,
            requests,
            handle: Some(handle),
        }
    }

    /// Raw request texts received so far, joining the server thread first.
    pub fn finish(mut self) -> Vec<String> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.requests.lock().expect("requests lock").clone()
    }

    /// Requests received without waiting for the server to finish.
    pub fn requests_so_far(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

/// Build a full HTTP/1.1 response with Content-Length and Connection:
/// close.
pub fn http_response(status: u16, reason: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {status} {reason}\r\n");
    for (name, value) in headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str(&format!("Content-Length: {}\r\n", body.len()));
    response.push_str("Connection: close\r\n\r\n");
    response.push_str(body);
    response
}

pub fn ok_response(body: &str) -> String {
    http_response(200, "OK", &[("Content-Type", "application/json")], body)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        if let Some(request) = complete_request(&buf) {
            return request;
        }
        let Ok(n) = stream.read(&mut chunk) else {
            break;
        };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn complete_request(buf: &[u8]) -> Option<String> {
    let head_end = buf
        .windows(4)
        .position(|window| window == b"\r\n\r\n")?;
    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
    let body_start = head_end + 4;
    if buf.len() < body_start + content_length {
        return None;
    }
    let body = String::from_utf8_lossy(&buf[body_start..body_start + content_length]);
    Some(format!("{head}\r\n\r\n{body}"))
}
