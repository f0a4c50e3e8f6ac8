//! Thread-local frame buffer pool
//!
//! Frames are assembled in a reusable buffer, then copied out as an owned
//! `Vec<u8>`. `Vec::clear()` preserves allocated capacity, so after warmup
//! the encode path allocates only the returned frame.
//!
//! Buffers are handed out as [`PooledBuffer`] guards. Dropping the guard
//! returns the buffer to the pool, so every exit path of an encode
//! (success, `?` early-return, panic unwind) releases it.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Maximum buffers kept per thread
pub const MAX_POOL_SIZE: usize = 8;

thread_local! {
    /// Thread-local pool of reusable frame buffers
    static FRAME_BUFFERS: RefCell<Vec<Vec<u8>>> = RefCell::new(Vec::with_capacity(MAX_POOL_SIZE));
}

/// Frame buffer pool operations
///
/// The pool is implicitly created per-thread on first access.
///
/// # Example
///
/// ```ignore
/// let mut buf = BufferPool::acquire(64, 1024 * 1024);
/// buf.extend_from_slice(b"frame");
/// let frame = buf.to_vec();
/// // buf dropped here: returned to the pool
/// ```
pub struct BufferPool;

impl BufferPool {
    /// Acquire an empty buffer with at least `capacity` bytes reserved.
    ///
    /// Buffers whose capacity exceeds `max_retained` are dropped rather than
    /// pooled when the guard is released.
    pub fn acquire(capacity: usize, max_retained: usize) -> PooledBuffer {
        let mut buf = FRAME_BUFFERS
            .try_with(|pool| pool.borrow_mut().pop())
            .ok()
            .flatten()
            .unwrap_or_default();
        buf.clear();
        buf.reserve(capacity);
        PooledBuffer { buf, max_retained }
    }

    fn release(mut buf: Vec<u8>, max_retained: usize) {
        if buf.capacity() > max_retained {
            return;
        }
        buf.clear();
        // The pool may already be gone during thread teardown.
        let _ = FRAME_BUFFERS.try_with(|pool| {
            let mut pool = pool.borrow_mut();
            if pool.len() < MAX_POOL_SIZE {
                pool.push(buf);
            }
        });
    }

    /// Number of buffers currently pooled on this thread
    pub fn pool_size() -> usize {
        FRAME_BUFFERS
            .try_with(|pool| pool.borrow().len())
            .unwrap_or(0)
    }

    /// Drop all pooled buffers on this thread
    pub fn clear() {
        let _ = FRAME_BUFFERS.try_with(|pool| pool.borrow_mut().clear());
    }

    /// Pre-warm the pool with `count` buffers of `capacity` bytes
    /// (count capped at MAX_POOL_SIZE).
    pub fn warmup(count: usize, capacity: usize) {
        let count = count.min(MAX_POOL_SIZE);
        let _ = FRAME_BUFFERS.try_with(|pool| {
            let mut pool = pool.borrow_mut();
            let current = pool.len();
            for _ in current..count {
                pool.push(Vec::with_capacity(capacity));
            }
        });
    }
}

/// A buffer on loan from [`BufferPool`], returned on drop.
pub struct PooledBuffer {
    buf: Vec<u8>,
    max_retained: usize,
}

impl Deref for PooledBuffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        BufferPool::release(std::mem::take(&mut self.buf), self.max_retained);
    }
}
