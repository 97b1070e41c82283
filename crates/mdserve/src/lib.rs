//! A concurrent TCP server that computes MD5 digests of client-supplied
//! messages, with a bounded LRU cache and an optional per-request delay.
//!
//! The wire protocol, cache, queue, and worker pool are split across small
//! modules so each can be tested in isolation — `transport` in particular
//! exists so `worker` can be exercised against an in-memory connection
//! instead of a real socket.

pub mod cache;
pub mod config;
pub mod error;
pub mod md5;
pub mod parser;
pub mod queue;
pub mod supervisor;
pub mod transport;
pub mod worker;

pub use cache::LruCache;
pub use config::{ConfigError, ServerConfig};
pub use error::StartupError;
pub use supervisor::{ShutdownLatch, run};
