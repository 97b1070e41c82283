//! A bounded-lifetime, thread-safe FIFO queue used to hand accepted
//! connections from the supervisor's accept loop to the worker pool.
//!
//! The queue itself carries no size limit on its own — backpressure comes from
//! the OS accept backlog — but it does carry a shutdown signal: once the
//! supervisor calls [`BlockingQueue::close`], every thread currently blocked
//! in [`BlockingQueue::pop`] wakes and observes the closed state instead of
//! waiting forever for work that will never arrive.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A `Mutex` + `Condvar` guarded FIFO queue, generic over the item it carries.
pub struct BlockingQueue<T> {
    inner: Mutex<Inner<T>>,
    cvar: Condvar,
}

impl<T> BlockingQueue<T> {
    /// Creates an empty, open queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Pushes `item` to the back of the queue and wakes one blocked popper.
    ///
    /// A push after [`close`](Self::close) is accepted but the item will never
    /// be observed by `pop`, which only drains the queue up front during
    /// teardown; callers stop pushing once shutdown begins.
    pub fn push(&self, item: T) {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        inner.items.push_back(item);
        self.cvar.notify_one();
    }

    /// Pops the item at the front of the queue, blocking the calling thread
    /// until one is available.
    ///
    /// Returns `None` once the queue has been closed and drained — this is
    /// how worker threads learn to exit during shutdown.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            inner = self.cvar.wait(inner).expect("queue mutex poisoned");
        }
    }

    /// Marks the queue closed and wakes every thread blocked in `pop`.
    ///
    /// Threads that are blocked will drain any remaining queued items before
    /// observing the closed state, matching a plain FIFO shutdown: in-flight
    /// work is not discarded, only the indefinite wait is cut short.
    pub fn close(&self) {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        inner.closed = true;
        self.cvar.notify_all();
    }

    /// Returns the number of items currently queued.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("queue mutex poisoned").items.len()
    }

    /// Returns `true` if the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
