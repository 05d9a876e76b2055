//! Minimal scripted HTTP/1.1 server for integration tests.
//!
//! Each path has a list of replies; the n-th request to a path gets the n-th
//! reply (the last one repeats). Unknown paths get 404. Every response closes
//! the connection.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    /// Status line only, empty body.
    Status(u16),
    /// 200 with `Content-Length`.
    Body(Vec<u8>),
    /// 200 without `Content-Length`; the body ends when the connection closes.
    BodyNoLength(Vec<u8>),
    /// 200 with `Content-Length`; sends `split` bytes, waits `pause`, sends the rest.
    Stalled {
        body: Vec<u8>,
        split: usize,
        pause: Duration,
    },
    /// 200 `application/json`.
    Json(String),
}

#[derive(Default)]
struct Routes {
    replies: HashMap<String, Vec<Reply>>,
    hits: HashMap<String, usize>,
    queries: HashMap<String, String>,
}

#[derive(Clone)]
pub struct TileServer {
    base: String,
    routes: Arc<Mutex<Routes>>,
}

impl TileServer {
    /// `http://127.0.0.1:<port><path>`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of requests served for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.routes
            .lock()
            .unwrap()
            .hits
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Raw query string of the latest request to `path`.
    pub fn last_query(&self, path: &str) -> Option<String> {
        self.routes.lock().unwrap().queries.get(path).cloned()
    }
}

/// Starts the server in a background thread; it runs until the process exits.
pub fn start(routes: Vec<(&str, Vec<Reply>)>) -> TileServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let mut table = Routes::default();
    for (path, replies) in routes {
        table.replies.insert(path.to_string(), replies);
    }
    let routes = Arc::new(Mutex::new(table));
    let shared = Arc::clone(&routes);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    TileServer {
        base: format!("http://127.0.0.1:{}", port),
        routes,
    }
}

/// An address nothing listens on.
pub fn closed_port_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}

fn handle(mut stream: TcpStream, routes: &Mutex<Routes>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let target = match read_request_target(&mut stream) {
        Some(t) => t,
        None => return,
    };
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (target.clone(), String::new()),
    };

    let reply = {
        let mut r = routes.lock().unwrap();
        let n = {
            let hits = r.hits.entry(path.clone()).or_insert(0);
            *hits += 1;
            *hits
        };
        r.queries.insert(path.clone(), query);
        r.replies
            .get(&path)
            .and_then(|list| list.get((n - 1).min(list.len().saturating_sub(1))).cloned())
    };

    match reply {
        None => write_status(&mut stream, 404),
        Some(Reply::Status(code)) => write_status(&mut stream, code),
        Some(Reply::Body(body)) => {
            write_head(&mut stream, "application/octet-stream", Some(body.len()));
            let _ = stream.write_all(&body);
        }
        Some(Reply::BodyNoLength(body)) => {
            write_head(&mut stream, "application/octet-stream", None);
            let _ = stream.write_all(&body);
        }
        Some(Reply::Stalled { body, split, pause }) => {
            write_head(&mut stream, "application/octet-stream", Some(body.len()));
            let split = split.min(body.len());
            let _ = stream.write_all(&body[..split]);
            let _ = stream.flush();
            thread::sleep(pause);
            let _ = stream.write_all(&body[split..]);
        }
        Some(Reply::Json(text)) => {
            write_head(&mut stream, "application/json", Some(text.len()));
            let _ = stream.write_all(text.as_bytes());
        }
    }
    let _ = stream.flush();
}

/// Reads the request head and returns the request target (`/path?query`).
fn read_request_target(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let text = String::from_utf8_lossy(&buf);
    let request_line = text.lines().next()?;
    request_line.split_whitespace().nth(1).map(str::to_string)
}

fn write_status(stream: &mut TcpStream, code: u16) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        code,
        reason(code)
    );
    let _ = stream.write_all(response.as_bytes());
}

fn write_head(stream: &mut TcpStream, content_type: &str, len: Option<usize>) {
    let length = len
        .map(|n| format!("Content-Length: {}\r\n", n))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\n{}Connection: close\r\n\r\n",
        content_type, length
    );
    let _ = stream.write_all(response.as_bytes());
}

fn reason(code: u16) -> &'static str {
    match code {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
