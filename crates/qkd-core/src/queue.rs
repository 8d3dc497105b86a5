//! FIFO hand-off between pipeline stages.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Thread-safe FIFO queue of work items.
///
/// Clones share the same queue. The lock is held only for the container
/// operation itself, and `pop` never waits for an item to arrive: callers
/// that want to block do so on their own signal.
///
/// A panic while holding the lock cannot leave the deque half-modified, so
/// a poisoned lock is recovered rather than propagated.
#[derive(Debug)]
pub struct WorkQueue<T> {
    inner: Arc<Mutex<VecDeque<T>>>,
}

impl<T> WorkQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(VecDeque::new())) }
    }

    /// Append an item at the back
    pub fn push(&self, item: T) {
        self.lock().push_back(item);
    }

    /// Take the front item, if any
    pub fn pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Items currently queued
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let queue = WorkQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn clones_share_items() {
        let producer = WorkQueue::new();
        let consumer = producer.clone();

        producer.push("sifted block");
        assert_eq!(consumer.pop(), Some("sifted block"));
        assert!(producer.is_empty());
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        const PRODUCERS: usize = 4;
        const ITEMS: usize = 500;

        let queue = WorkQueue::new();
        std::thread::scope(|scope| {
            for producer in 0..PRODUCERS {
                let queue = queue.clone();
                scope.spawn(move || {
                    for item in 0..ITEMS {
                        queue.push((producer, item));
                    }
                });
            }
        });

        let mut last_seen = [None; PRODUCERS];
        let mut count = 0;
        while let Some((producer, item)) = queue.pop() {
            // Each producer's items stay in the order it pushed them
            assert!(last_seen[producer].is_none_or(|last| last < item));
            last_seen[producer] = Some(item);
            count += 1;
        }
        assert_eq!(count, PRODUCERS * ITEMS);
    }

    #[test]
    fn survives_a_poisoned_lock() {
        let queue = WorkQueue::new();
        queue.push(7);

        let poisoner = queue.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("stage crashed while holding the queue");
        })
        .join();

        assert_eq!(queue.pop(), Some(7));
        queue.push(8);
        assert_eq!(queue.len(), 1);
    }
}
