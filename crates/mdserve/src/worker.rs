//! Per-connection request handling: read one request, resolve its digest
//! (via the cache or by hashing), and write back the response.
//!
//! Generic over [`ByteStream`] so the read/hash/respond sequence can be
//! exercised against an in-memory [`crate::transport::duplex::DuplexStream`]
//! in tests without opening a real socket.

use crate::cache::LruCache;
use crate::md5;
use crate::parser::{self, ParseError};
use crate::transport::ByteStream;
use std::thread;
use std::time::Duration;

/// One byte past the accepted maximum, so a request that exactly fills it
/// can still be distinguished from one that overflows it.
const MAX_REQUEST_SIZE: usize = 4096;

const SEND_TIMEOUT: &str = "Timeout.\n";
const SEND_LONG_REQUEST: &str = "Request is too long.\n";
const SEND_INVALID_REQUEST: &str = "Request is not valid.\n";

/// Per-connection read/write timeout, set on every accepted stream — long
/// enough for a normal client, short enough that a stalled peer can't pin a
/// worker thread indefinitely.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(1);

/// Reads exactly one request from `stream`, resolves its digest against
/// `cache`, and writes the response — a 32-character digest plus newline on
/// success, or one of the three plain-text error lines otherwise.
///
/// Never returns an error: connection-level I/O failures (a client that
/// disconnects mid-write, for instance) are swallowed, matching a fire-and-
/// forget response write — there is no one left to report the failure to.
pub fn handle_connection(stream: &mut impl ByteStream, cache: &LruCache) {
    let mut buf = vec![0u8; MAX_REQUEST_SIZE + 1];

    let bytes_read = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(err)
            if matches!(
                err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ) =>
        {
            let _ = write_line(stream, SEND_TIMEOUT);
            return;
        }
        Err(_) => return,
    };

    if bytes_read > MAX_REQUEST_SIZE {
        drain(stream);
        let _ = write_line(stream, SEND_LONG_REQUEST);
        return;
    }

    let line = String::from_utf8_lossy(&buf[..bytes_read]);
    let request = match parser::parse(line.trim_end_matches('\0')) {
        Ok(request) => request,
        Err(ParseError::Invalid) => {
            let _ = write_line(stream, SEND_INVALID_REQUEST);
            return;
        }
    };

    let digest = match cache.get(&request.message) {
        Some(digest) => digest,
        None => {
            let digest = md5::hash(request.message.as_bytes());
            if request.delay_ms > 0 {
                thread::sleep(Duration::from_millis(request.delay_ms));
            }
            cache.put(&request.message, digest.clone());
            digest
        }
    };

    let _ = write_line(stream, &format!("{digest}\n"));
}

/// Drains any remaining bytes from an over-long request so the client's
/// write doesn't leave data the connection never reads before replying.
fn drain(stream: &mut impl ByteStream) {
    let mut sink = [0u8; MAX_REQUEST_SIZE];
    loop {
        match stream.read(&mut sink) {
            Ok(0) | Err(_) => break,
            Ok(_) => continue,
        }
    }
}

/// Writes `body` in a single call. Every caller already includes the
/// trailing newline the wire protocol expects.
fn write_line(stream: &mut impl ByteStream, body: &str) -> std::io::Result<()> {
    debug_assert!(body.ends_with('\n'));
    stream.write_all(body.as_bytes())
}
