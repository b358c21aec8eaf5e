//! Pooled parameter-value buffers for owning transports.
//!
//! [`Router::handle`](crate::router::Router::handle) borrows captured
//! values straight out of the request path, which is the fast path when
//! the response is written before the path goes away. A transport that
//! needs captured values to outlive the request buffer (e.g. when the
//! request bytes are recycled while a handler is still running) checks an
//! owned `Vec<String>` buffer out of a [`ParamPool`] instead and copies
//! the captures into it.
//!
//! Buffers are handed out exclusively: two concurrent requests never share
//! one. Dropping the guard clears the strings (capacity retained) and
//! returns the buffer to the pool.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// A pool of reusable parameter-value buffers, all sized to the router's
/// maximum parameter count.
pub struct ParamPool {
    buffers: Mutex<Vec<Vec<String>>>,
    width: usize,
}

impl ParamPool {
    /// Create a pool whose buffers hold `width` values each. `width`
    /// should be the router's maximum parameter count across all routes.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            width,
        }
    }

    /// Number of values each buffer holds.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Check a buffer out of the pool, allocating a fresh one when the
    /// pool is empty.
    pub fn checkout(&self) -> ParamGuard<'_> {
        let buf = self
            .buffers
            .lock()
            .ok()
            .and_then(|mut pool| pool.pop())
            .unwrap_or_else(|| vec![String::new(); self.width]);
        ParamGuard { pool: self, buf }
    }
}

/// Exclusive access to one pooled buffer; returns it on drop.
pub struct ParamGuard<'a> {
    pool: &'a ParamPool,
    buf: Vec<String>,
}

impl ParamGuard<'_> {
    /// Copy borrowed captures into the owned buffer.
    pub fn fill(&mut self, values: &[&str]) {
        for (slot, value) in self.buf.iter_mut().zip(values) {
            slot.clear();
            slot.push_str(value);
        }
    }
}

impl Deref for ParamGuard<'_> {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.buf
    }
}

impl DerefMut for ParamGuard<'_> {
    fn deref_mut(&mut self) -> &mut [String] {
        &mut self.buf
    }
}

impl Drop for ParamGuard<'_> {
    fn drop(&mut self) {
        for slot in &mut self.buf {
            slot.clear();
        }
        if let Ok(mut pool) = self.pool.buffers.lock() {
            pool.push(std::mem::take(&mut self.buf));
        }
    }
}
