//! Abstracts the server's core state machine away from `std::net`.
//!
//! [`ByteStream`] and [`StreamAcceptor`] capture exactly the operations the
//! worker and supervisor need from a connection and a listener respectively.
//! Both traits are implemented for the real `std::net` types, and a second,
//! in-memory implementation lives in [`duplex`] so request parsing and
//! worker behavior can be exercised without binding a real socket.
//!
//! Generic call sites are monomorphized over these traits rather than using
//! trait objects, so the hot per-connection path costs nothing beyond a
//! direct call.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

/// A duplex, timeout-capable byte stream — the worker's view of a connection.
pub trait ByteStream: Read + Write + Send {
    /// Sets the timeout for subsequent reads; `None` disables the timeout.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Sets the timeout for subsequent writes; `None` disables the timeout.
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

impl ByteStream for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }
}

/// A listening socket that hands off accepted connections — the
/// supervisor's view of the server's bound port.
pub trait StreamAcceptor {
    /// The connection type this acceptor produces.
    type Stream: ByteStream + 'static;

    /// Blocks until a connection arrives, or returns an error.
    fn accept(&self) -> io::Result<Self::Stream>;

    /// Returns the address this acceptor is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl StreamAcceptor for TcpListener {
    type Stream = TcpStream;

    fn accept(&self) -> io::Result<TcpStream> {
        TcpListener::accept(self).map(|(stream, _addr)| stream)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

/// An in-memory [`ByteStream`] test double, with no sockets involved.
pub mod duplex {
    use super::{io, ByteStream, Read, Write};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct Pipe {
        buf: Mutex<VecDeque<u8>>,
    }

    /// One end of an in-memory duplex pipe, implementing [`ByteStream`].
    ///
    /// Ignores timeout configuration — tests using this type must not rely
    /// on timeout behavior, only on parsing and protocol-level correctness.
    pub struct DuplexStream {
        read_end: Arc<Pipe>,
        write_end: Arc<Pipe>,
    }

    /// Creates a connected pair of [`DuplexStream`]s: bytes written to one
    /// side are readable from the other.
    pub fn pair() -> (DuplexStream, DuplexStream) {
        let a_to_b = Arc::new(Pipe::default());
        let b_to_a = Arc::new(Pipe::default());
        (
            DuplexStream {
                read_end: Arc::clone(&b_to_a),
                write_end: Arc::clone(&a_to_b),
            },
            DuplexStream {
                read_end: a_to_b,
                write_end: b_to_a,
            },
        )
    }

    impl Read for DuplexStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut pipe = self.read_end.buf.lock().expect("duplex pipe poisoned");
            let n = pipe.len().min(buf.len());
            for slot in buf.iter_mut().take(n) {
                *slot = pipe.pop_front().expect("checked len above");
            }
            Ok(n)
        }
    }

    impl Write for DuplexStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut pipe = self.write_end.buf.lock().expect("duplex pipe poisoned");
            pipe.extend(buf.iter().copied());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl ByteStream for DuplexStream {
        fn set_read_timeout(&self, _timeout: Option<Duration>) -> io::Result<()> {
            Ok(())
        }

        fn set_write_timeout(&self, _timeout: Option<Duration>) -> io::Result<()> {
            Ok(())
        }
    }

}
