// Reusable buffer lists for mesh accumulation.
//
// Every chunk rebuild fills several large vertex/index lists and then
// copies them out to stable `MeshData`. Allocating those working lists
// fresh each rebuild would churn the allocator for no reason, so they are
// borrowed from a shared pool and handed back automatically: `acquire`
// returns a guard that clears the buffer and returns it to the free list
// on drop, capacity intact.
//
// The pool is internally locked, so one pool can serve parallel chunk
// rebuilds. Lock poisoning is deliberately ignored — a free list of plain
// buffers cannot be left in a broken state by a panicking holder.
//
// See also: `mesh.rs` for the accumulator built on these lists.

use crate::types::Color;
use glam::{Vec2, Vec3};
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A free list of `Vec<T>` buffers.
pub struct ListPool<T> {
    free: Mutex<Vec<Vec<T>>>,
}

impl<T> ListPool<T> {
    pub const fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Take a buffer (empty, but possibly with retained capacity). It
    /// returns to the pool when the guard drops.
    pub fn acquire(&self) -> PooledList<'_, T> {
        let buf = self.lock().pop().unwrap_or_default();
        PooledList { buf, pool: self }
    }

    /// Number of buffers currently waiting for reuse.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<T>>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for ListPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped handle to a pooled buffer. Derefs to `Vec<T>`.
pub struct PooledList<'a, T> {
    buf: Vec<T>,
    pool: &'a ListPool<T>,
}

impl<T> Deref for PooledList<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.buf
    }
}

impl<T> DerefMut for PooledList<'_, T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.buf
    }
}

impl<T> Drop for PooledList<'_, T> {
    fn drop(&mut self) {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        self.pool.lock().push(buf);
    }
}

/// One pool per buffer element type used by the mesh accumulator.
pub struct BufferPool {
    pub positions: ListPool<Vec3>,
    pub colors: ListPool<Color>,
    pub uvs: ListPool<Vec2>,
    pub indices: ListPool<u32>,
}

impl BufferPool {
    pub const fn new() -> Self {
        Self {
            positions: ListPool::new(),
            colors: ListPool::new(),
            uvs: ListPool::new(),
            indices: ListPool::new(),
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_return_to_the_pool_on_drop() {
        let pool: ListPool<u32> = ListPool::new();
        assert_eq!(pool.idle(), 0);
        {
            let mut list = pool.acquire();
            list.push(1);
            list.push(2);
            assert_eq!(pool.idle(), 0);
        }
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn reuse_keeps_capacity_but_not_contents() {
        let pool: ListPool<u32> = ListPool::new();
        {
            let mut list = pool.acquire();
            list.extend(0..100);
        }
        let list = pool.acquire();
        assert!(list.is_empty());
        assert!(list.capacity() >= 100);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn concurrent_acquires_get_distinct_buffers() {
        let pool: ListPool<u32> = ListPool::new();
        let mut a = pool.acquire();
        let mut b = pool.acquire();
        a.push(1);
        b.push(2);
        assert_eq!(a[0], 1);
        assert_eq!(b[0], 2);
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn buffer_pool_serves_all_element_types() {
        let pool = BufferPool::new();
        {
            let mut positions = pool.positions.acquire();
            let mut colors = pool.colors.acquire();
            let mut uvs = pool.uvs.acquire();
            let mut indices = pool.indices.acquire();
            positions.push(Vec3::ONE);
            colors.push(Color::WHITE);
            uvs.push(Vec2::ONE);
            indices.push(7);
        }
        assert_eq!(pool.positions.idle(), 1);
        assert_eq!(pool.colors.idle(), 1);
        assert_eq!(pool.uvs.idle(), 1);
        assert_eq!(pool.indices.idle(), 1);
    }
}
