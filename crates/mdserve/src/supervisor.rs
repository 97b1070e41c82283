//! Owns the server's lifecycle: binds the listening socket, starts the
//! worker pool, runs the accept loop, and tears everything down cleanly on
//! shutdown.
//!
//! The accept loop polls a non-blocking listener rather than blocking
//! indefinitely in `accept()`, since `std::net` has no portable way to give
//! a blocking `accept()` call a timeout the way the original server's
//! `SO_RCVTIMEO`-on-signal-interrupt approach did. Polling at
//! [`ACCEPT_POLL_INTERVAL`] gives the same observable behavior — shutdown
//! and cache-reset signals are noticed within one poll interval — without
//! relying on syscall interruption semantics.

use crate::cache::LruCache;
use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::queue::BlockingQueue;
use crate::transport::{ByteStream, StreamAcceptor};
use crate::worker::{self, CONNECTION_TIMEOUT};
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1};
use std::io;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the accept loop checks the shutdown/reset latch while the
/// listener has no pending connection.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The process-wide signal state: whether the server should shut down, and
/// whether the cache should be cleared on the next accept-loop iteration.
///
/// Mirrors the original server's single `sig_atomic_t` bitmask as two
/// separate flags — one per concern — since Rust's `AtomicBool` already
/// gives each the same async-signal-safety guarantee without needing to
/// pack them into one word.
pub struct ShutdownLatch {
    terminate: Arc<AtomicBool>,
    reset_cache: Arc<AtomicBool>,
}

impl ShutdownLatch {
    /// Registers real OS signal handlers: `SIGTERM`/`SIGINT` request
    /// termination, `SIGUSR1` requests a cache reset.
    pub fn install() -> io::Result<Self> {
        let terminate = Arc::new(AtomicBool::new(false));
        let reset_cache = Arc::new(AtomicBool::new(false));

        signal_hook::flag::register(SIGTERM, Arc::clone(&terminate))?;
        signal_hook::flag::register(SIGINT, Arc::clone(&terminate))?;
        signal_hook::flag::register(SIGUSR1, Arc::clone(&reset_cache))?;

        Ok(Self {
            terminate,
            reset_cache,
        })
    }

    /// Builds a latch with no OS signal registration, plus a [`ManualControl`]
    /// handle to drive it programmatically — for tests that need deterministic
    /// shutdown without sending real signals.
    pub fn manual() -> (Self, ManualControl) {
        let terminate = Arc::new(AtomicBool::new(false));
        let reset_cache = Arc::new(AtomicBool::new(false));
        let latch = Self {
            terminate: Arc::clone(&terminate),
            reset_cache: Arc::clone(&reset_cache),
        };
        (
            latch,
            ManualControl {
                terminate,
                reset_cache,
            },
        )
    }

    fn should_terminate(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    /// Returns `true` at most once per reset request: reading it clears it.
    fn take_reset_request(&self) -> bool {
        self.reset_cache.swap(false, Ordering::AcqRel)
    }
}

/// A handle for driving a [`ShutdownLatch::manual`] latch from outside the
/// accept loop — used by tests.
pub struct ManualControl {
    terminate: Arc<AtomicBool>,
    reset_cache: Arc<AtomicBool>,
}

impl ManualControl {
    pub fn request_terminate(&self) {
        self.terminate.store(true, Ordering::Release);
    }

    pub fn request_cache_reset(&self) {
        self.reset_cache.store(true, Ordering::Release);
    }
}

/// Runs the server to completion: binds the port, starts `config.thread_count`
/// workers, accepts connections until `latch` signals termination, then joins
/// every worker and prints the teardown dump.
///
/// Blocks the calling thread for the server's entire lifetime.
pub fn run(config: ServerConfig, latch: &ShutdownLatch) -> Result<(), StartupError> {
    let listener = TcpListener::bind(("0.0.0.0", config.port)).map_err(StartupError::Bind)?;
    listener.set_nonblocking(true).map_err(StartupError::Bind)?;
    run_with_acceptor(config, latch, listener)
}

/// Same as [`run`] but generic over the acceptor, so tests can drive the
/// loop against a listener bound to an OS-assigned ephemeral port.
pub fn run_with_acceptor<A>(
    config: ServerConfig,
    latch: &ShutdownLatch,
    acceptor: A,
) -> Result<(), StartupError>
where
    A: StreamAcceptor,
    A::Stream: 'static,
{
    let cache = Arc::new(LruCache::new(config.cache_capacity));
    let queue: Arc<BlockingQueue<A::Stream>> = Arc::new(BlockingQueue::new());

    let workers: Vec<JoinHandle<()>> = (0..config.thread_count)
        .map(|id| spawn_worker(id, Arc::clone(&queue), Arc::clone(&cache)))
        .collect();

    while !latch.should_terminate() {
        if latch.take_reset_request() {
            cache.reset();
            println!("Done!");
        }

        match acceptor.accept() {
            Ok(stream) => queue.push(stream),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(err) => {
                tracing::debug!(error = %err, "accept failed, continuing");
            }
        }
    }

    queue.close();
    for worker in workers {
        let _ = worker.join();
    }

    for (request, digest) in cache.dump() {
        println!("Request: '{request}' with hash: '{digest}'");
    }
    println!("Bye!");

    Ok(())
}

fn spawn_worker<S: ByteStream + 'static>(
    id: usize,
    queue: Arc<BlockingQueue<S>>,
    cache: Arc<LruCache>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("mdserve-worker-{id}"))
        .spawn(move || {
            while let Some(mut stream) = queue.pop() {
                let _ = stream.set_read_timeout(Some(CONNECTION_TIMEOUT));
                let _ = stream.set_write_timeout(Some(CONNECTION_TIMEOUT));
                worker::handle_connection(&mut stream, &cache);
            }
        })
        .expect("failed to spawn worker thread")
}

impl ShutdownLatch {
    #[cfg(test)]
    fn is_terminated(&self) -> bool {
        self.should_terminate()
    }
}
