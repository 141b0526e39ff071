//! # Scratch buffer pool
//!
//! A fixed set of pre-allocated [`SparseRow`] buffers shared by matrix
//! products. Borrowing blocks while every buffer is out, so the pool also
//! bounds how many products can be extracting columns at the same time.
//!
//! Buffers are handed out inside a [`ScratchBuffer`] guard that clears the
//! row and returns it on drop, including during unwinding.
//!
//! The process-wide pool is installed with [`initialize`] and removed with
//! [`teardown`]. [`global`] falls back to [`ScratchPoolConfig::default`] when
//! nothing has been installed yet.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use log::{debug, info, trace};
use parking_lot::{Condvar, Mutex, RwLock};

use crate::error::{MatrixError, Result};
use crate::sparse::SparseRow;

/// Sizing of a [`ScratchPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchPoolConfig {
    /// Number of buffers in the pool.
    pub buffers: usize,
    /// Initial capacity of each buffer, in elements.
    pub buffer_len: usize,
}

impl Default for ScratchPoolConfig {
    fn default() -> Self {
        Self {
            buffers: 10,
            buffer_len: 100,
        }
    }
}

impl ScratchPoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffers(mut self, buffers: usize) -> Self {
        self.buffers = buffers;
        self
    }

    pub fn with_buffer_len(mut self, buffer_len: usize) -> Self {
        self.buffer_len = buffer_len;
        self
    }
}

pub struct ScratchPool {
    config: ScratchPoolConfig,
    idle: Mutex<Vec<SparseRow>>,
    available: Condvar,
}

impl ScratchPool {
    pub fn new(config: ScratchPoolConfig) -> Result<Self> {
        if config.buffers < 1 {
            return Err(MatrixError::ZeroLength);
        }
        Ok(Self::allocate(config))
    }

    fn allocate(config: ScratchPoolConfig) -> Self {
        let idle = (0..config.buffers)
            .map(|_| SparseRow::with_capacity(config.buffer_len))
            .collect();
        Self {
            config,
            idle: Mutex::new(idle),
            available: Condvar::new(),
        }
    }

    pub fn config(&self) -> ScratchPoolConfig {
        self.config
    }

    /// Total number of buffers owned by the pool, borrowed or not.
    pub fn capacity(&self) -> usize {
        self.config.buffers
    }

    /// Number of buffers currently resting in the pool.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Takes a buffer, waiting until one is returned if the pool is empty.
    pub fn borrow(&self) -> ScratchBuffer<'_> {
        let mut idle = self.idle.lock();
        loop {
            if let Some(row) = idle.pop() {
                return ScratchBuffer { pool: self, row };
            }
            trace!("scratch pool exhausted, waiting for a buffer");
            self.available.wait(&mut idle);
        }
    }

    /// Takes a buffer if one is resting in the pool.
    pub fn try_borrow(&self) -> Option<ScratchBuffer<'_>> {
        self.idle.lock().pop().map(|row| ScratchBuffer { pool: self, row })
    }

    fn release(&self, mut row: SparseRow) {
        row.clear();
        self.idle.lock().push(row);
        self.available.notify_one();
    }
}

/// A buffer on loan from a [`ScratchPool`]; returned, emptied, on drop.
pub struct ScratchBuffer<'a> {
    pool: &'a ScratchPool,
    row: SparseRow,
}

impl Deref for ScratchBuffer<'_> {
    type Target = SparseRow;

    fn deref(&self) -> &SparseRow {
        &self.row
    }
}

impl DerefMut for ScratchBuffer<'_> {
    fn deref_mut(&mut self) -> &mut SparseRow {
        &mut self.row
    }
}

impl Drop for ScratchBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.row));
    }
}

static GLOBAL: RwLock<Option<Arc<ScratchPool>>> = parking_lot::const_rwlock(None);

/// Installs the process-wide pool, replacing any previous one.
///
/// Buffers still on loan from a replaced pool go back to that pool.
pub fn initialize(config: ScratchPoolConfig) -> Result<Arc<ScratchPool>> {
    let pool = Arc::new(ScratchPool::new(config)?);
    debug!(
        "initialising scratch pool: {} buffers of capacity {}",
        config.buffers, config.buffer_len
    );
    *GLOBAL.write() = Some(Arc::clone(&pool));
    Ok(pool)
}

/// Removes the process-wide pool. Returns the removed pool, if any.
pub fn teardown() -> Option<Arc<ScratchPool>> {
    let pool = GLOBAL.write().take();
    if pool.is_some() {
        debug!("scratch pool torn down");
    }
    pool
}

/// The process-wide pool, installing a default one if none is present.
pub fn global() -> Arc<ScratchPool> {
    if let Some(pool) = GLOBAL.read().as_ref() {
        return Arc::clone(pool);
    }
    let mut slot = GLOBAL.write();
    let pool = slot.get_or_insert_with(|| {
        let config = ScratchPoolConfig::default();
        info!(
            "no scratch pool installed, using defaults: {} buffers of capacity {}",
            config.buffers, config.buffer_len
        );
        Arc::new(ScratchPool::allocate(config))
    });
    Arc::clone(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_config_builder() {
        let config = ScratchPoolConfig::new().with_buffers(3).with_buffer_len(16);
        assert_eq!(config.buffers, 3);
        assert_eq!(config.buffer_len, 16);
        assert_eq!(ScratchPoolConfig::default().buffers, 10);
    }

    #[test]
    fn test_zero_buffers_rejected() {
        let res = ScratchPool::new(ScratchPoolConfig::new().with_buffers(0));
        assert_eq!(res.err(), Some(MatrixError::ZeroLength));
    }

    #[test]
    fn test_borrow_returns_cleared_buffer() {
        let config = ScratchPoolConfig::new().with_buffers(1).with_buffer_len(8);
        let pool = ScratchPool::new(config).unwrap();
        {
            let mut buf = pool.borrow();
            assert!(buf.is_empty());
            assert!(buf.capacity() >= 8);
            buf.push(0, 1.0);
            buf.push(3, 2.0);
            assert_eq!(pool.idle(), 0);
            assert!(pool.try_borrow().is_none());
        }
        assert_eq!(pool.idle(), 1);
        let buf = pool.borrow();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_buffer_returned_on_panic() {
        let pool = ScratchPool::new(ScratchPoolConfig::new().with_buffers(2)).unwrap();
        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            let _buf = pool.borrow();
            panic!("fault mid-product");
        }));
        assert!(res.is_err());
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_global_initialize_and_teardown() {
        let installed = initialize(ScratchPoolConfig::new().with_buffers(4)).unwrap();
        assert_eq!(installed.capacity(), 4);
        assert!(initialize(ScratchPoolConfig::new().with_buffers(0)).is_err());

        let removed = teardown();
        assert!(removed.is_some());
        // falls back to a default pool once torn down
        assert!(global().capacity() >= 1);
    }

    #[test]
    fn test_borrow_blocks_until_release() {
        let pool = ScratchPool::new(ScratchPoolConfig::new().with_buffers(1)).unwrap();
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let _buf = pool.borrow();
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(pool.idle(), 1);
    }
}
