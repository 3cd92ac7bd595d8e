use std::sync::{Condvar, Mutex, PoisonError};

use crossbeam::queue::SegQueue;

/// Shared FIFO of pending work with join semantics.
///
/// Emptiness alone says nothing about in-flight items: a worker may still be
/// processing the last entry it popped. [`WorkQueue::join`] waits on a count
/// of unfinished items instead, which only drops once every popped item has
/// been marked done.
#[derive(Debug)]
pub struct WorkQueue<T> {
    items: SegQueue<T>,
    unfinished: Mutex<usize>,
    all_done: Condvar,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            items: SegQueue::new(),
            unfinished: Mutex::new(0),
            all_done: Condvar::new(),
        }
    }

    pub fn push(&self, item: T) {
        *self.lock() += 1;
        self.items.push(item);
    }

    /// Each pushed item is handed to exactly one caller.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        self.items.pop()
    }

    /// Pops one item along with a guard that marks it done when dropped.
    pub fn take(&self) -> Option<Task<'_, T>> {
        self.pop().map(|item| Task { queue: self, item: Some(item) })
    }

    pub fn task_done(&self) {
        let mut unfinished = self.lock();
        // More calls than pushes are ignored.
        *unfinished = unfinished.saturating_sub(1);
        if *unfinished == 0 {
            self.all_done.notify_all();
        }
    }

    /// Blocks until every pushed item has been marked done.
    pub fn join(&self) {
        let unfinished = self.lock();
        let _unfinished = self
            .all_done
            .wait_while(unfinished, |n| *n > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    #[inline]
    pub fn unfinished(&self) -> usize {
        *self.lock()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // The counter stays consistent even if a holder panicked.
    fn lock(&self) -> std::sync::MutexGuard<'_, usize> {
        self.unfinished.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for WorkQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let queue = Self::new();
        iter.into_iter().for_each(|item| queue.push(item));
        queue
    }
}

/// Item popped from a [`WorkQueue`], marked done on drop (unwinding included).
#[derive(Debug)]
pub struct Task<'q, T> {
    queue: &'q WorkQueue<T>,
    item: Option<T>,
}

impl<T> Task<'_, T> {
    #[inline]
    pub fn item(&self) -> &T {
        // Only emptied by `Drop`.
        self.item.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for Task<'_, T> {
    fn drop(&mut self) {
        self.item.take();
        self.queue.task_done();
    }
}
