#![allow(dead_code)]

use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

/// A loopback HTTP server that answers exactly one request with a canned response.
pub struct StubServer {
    pub url: String,
    handle: JoinHandle<(CapturedRequest, TcpListener)>,
}

/// The request the stub received.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    /// Header lines, names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl StubServer {
    /// Serve one response with `status` (e.g. `"200 OK"`) and a JSON `body`.
    pub fn respond_once(status: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.push((name.trim().to_lowercase(), value.trim().to_string()));
                }
            }

            let length = headers
                .iter()
                .find(|(k, _)| k == "content-length")
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut body = vec![0; length];
            reader.read_exact(&mut body).unwrap();

            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            let captured = CapturedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8_lossy(&body).into_owned(),
            };
            (captured, listener)
        });

        Self { url, handle }
    }

    /// Wait for the request to be served and return what was received.
    pub fn request(self) -> CapturedRequest {
        self.handle.join().unwrap().0
    }

    /// Like [`StubServer::request`], but fails if the client opened a second
    /// connection (a retry) after the first response.
    pub fn single_request(self) -> CapturedRequest {
        let (captured, listener) = self.handle.join().unwrap();
        listener.set_nonblocking(true).unwrap();
        match listener.accept() {
            Err(e) if e.kind() == ErrorKind::WouldBlock => captured,
            Err(e) => panic!("stub listener failed: {e}"),
            Ok((_, peer)) => panic!("unexpected second connection from {peer}"),
        }
    }
}
