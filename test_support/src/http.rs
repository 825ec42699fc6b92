//! Single-shot HTTP fixtures for tests.
//!
//! [`spawn_http_server`] answers exactly one request with a canned status and
//! body, which is enough to exercise status passthrough and malformed bodies.
//! The listener is polled in non-blocking mode and guarded by a deadline so a
//! hung client cannot stall the test suite.

use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    thread,
    time::{Duration, Instant},
};

use crate::wire::{reason_phrase, write_response};

/// Join handle for a spawned HTTP fixture.
///
/// The handle joins the underlying thread when dropped to avoid leaking
/// background work if a test aborts early. Call [`HttpServer::join`] to surface
/// any panic from the server thread explicitly.
#[derive(Debug)]
#[must_use]
pub struct HttpServer {
    handle: Option<thread::JoinHandle<()>>,
    addr: SocketAddr,
}

impl HttpServer {
    /// Join the server thread and propagate any panic.
    pub fn join(mut self) -> thread::Result<()> {
        self.shutdown_listener();
        self.handle.take().map_or(Ok(()), thread::JoinHandle::join)
    }

    fn shutdown_listener(&self) {
        // Connect to unblock the accept loop; the outcome is irrelevant.
        let _ = TcpStream::connect(self.addr);
    }
}

impl Drop for HttpServer {
    fn drop(&mut self) {
        self.shutdown_listener();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn a server that returns `status` and `body` for the first request.
///
/// The server listens on `127.0.0.1`; the returned URL has no trailing path.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or configured.
pub fn spawn_http_server(status: u16, body: impl Into<String>) -> io::Result<(String, HttpServer)> {
    let body = body.into();
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;
    let url = format!("http://{addr}");
    let handle = thread::spawn(move || run_http_server(&listener, status, &body));
    Ok((
        url,
        HttpServer {
            handle: Some(handle),
            addr,
        },
    ))
}

fn run_http_server(listener: &TcpListener, status: u16, body: &str) {
    let accept_deadline = Instant::now() + Duration::from_secs(2);
    let Some(mut stream) = accept_connection(listener, accept_deadline) else {
        return;
    };
    if stream.set_nonblocking(true).is_err() {
        return;
    }
    let read_deadline = Instant::now() + Duration::from_millis(500);
    if read_request(&mut stream, read_deadline) > 0 {
        let _ = stream.set_nonblocking(false);
        let _ = write_response(&mut stream, status, reason_phrase(status), body);
        let _ = stream.flush();
    }
}

fn accept_connection(listener: &TcpListener, deadline: Instant) -> Option<TcpStream> {
    loop {
        match listener.accept() {
            Ok((stream, _)) => return Some(stream),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return None;
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(_) => return None,
        }
    }
}

fn read_request(stream: &mut TcpStream, deadline: Instant) -> usize {
    let mut buf = [0u8; 4096];
    loop {
        if Instant::now() >= deadline {
            return 0;
        }

        match stream.read(&mut buf) {
            Ok(n) => return n,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(5));
            }
            Err(_) => return 0,
        }
    }
}
