//! Fixed-capacity byte queue shared between the sampling interrupt and the application.
//!
//! [`ByteQueue`] is a power-of-two ring buffer with free-running 8-bit `head` and
//! `tail` indices. The number of stored bytes is always `tail - head` (wrapping),
//! and a slot is addressed with `index & (N - 1)`, so no division and no
//! allocation ever happens.
//!
//! ## Single producer, single consumer
//!
//! Bytes go in at `tail` and come out at `head`. The producer is the only writer
//! of `tail` and the consumer the only writer of `head`. [`ByteQueue::split`]
//! turns that rule into types: the [`Producer`] half can only enqueue and the
//! [`Consumer`] half can only dequeue, so they can live in an interrupt handler
//! and the main loop without a lock.
//!
//! ## Capacity
//!
//! `N` must be a power of two between 1 and [`MAX_QUEUE_LEN`]. Anything else
//! fails to compile as soon as [`ByteQueue::new`] is instantiated:
//!
//! ```compile_fail
//! let _ = softrx::queue::ByteQueue::<24>::new();
//! ```
//!
//! ```compile_fail
//! let _ = softrx::queue::ByteQueue::<256>::new();
//! ```
//!
//! ```compile_fail
//! let _ = softrx::queue::ByteQueue::<0>::new();
//! ```
//!
//! ```rust
//! let _ = softrx::queue::ByteQueue::<128>::new();
//! ```

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::consts::MAX_QUEUE_LEN;

/// A lock-free ring buffer of `N` bytes.
///
/// The indices are single `AtomicU8`s so every load and store is one
/// instruction even on 8-bit targets, and all `N` slots are usable.
/// `heapless::spsc::Queue` uses `usize` indices and keeps one slot empty,
/// which is why this queue is written by hand on top of `UnsafeCell`.
///
/// # Example
/// ```rust
/// use softrx::queue::ByteQueue;
///
/// let mut queue: ByteQueue<4> = ByteQueue::new();
/// assert!(queue.enqueue(0x41).is_ok());
/// assert!(queue.enqueue(0x42).is_ok());
/// assert_eq!(queue.len(), 2);
/// assert_eq!(queue.dequeue(), Some(0x41));
/// assert_eq!(queue.dequeue(), Some(0x42));
/// assert_eq!(queue.dequeue(), None);
/// ```
#[derive(Debug)]
pub struct ByteQueue<const N: usize> {
    buf: [UnsafeCell<u8>; N],
    /// Next slot to read. Written by the consumer only.
    head: AtomicU8,
    /// Next slot to write. Written by the producer only.
    tail: AtomicU8,
}

// SAFETY: slots are only written by the producer before `tail` is published and only
// read by the consumer after observing that `tail`, so the two sides never touch the
// same slot at the same time. Shared access is only handed out through `Producer`
// and `Consumer`, one of each per exclusive borrow.
unsafe impl<const N: usize> Sync for ByteQueue<N> {}

impl<const N: usize> ByteQueue<N> {
    const MASK: u8 = {
        assert!(
            N.is_power_of_two() && N <= MAX_QUEUE_LEN,
            "queue capacity must be a power of two between 1 and 128"
        );
        (N - 1) as u8
    };

    /// Creates an empty queue.
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            buf: [const { UnsafeCell::new(0) }; N],
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
        }
    }

    /// Total number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes waiting to be dequeued.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        usize::from(tail.wrapping_sub(head))
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if every slot is taken.
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Appends `byte` at the tail.
    ///
    /// # Returns
    /// - `Ok(())` if the byte was stored
    /// - `Err(byte)` if the queue was full; nothing is modified and the byte is handed back
    pub fn enqueue(&mut self, byte: u8) -> Result<(), u8> {
        self.produce(byte)
    }

    /// Removes and returns the oldest byte, or `None` if the queue is empty.
    pub fn dequeue(&mut self) -> Option<u8> {
        self.consume()
    }

    /// Splits the queue into its producer and consumer halves.
    ///
    /// # Example
    /// ```rust
    /// use softrx::queue::ByteQueue;
    ///
    /// let mut queue: ByteQueue<8> = ByteQueue::new();
    /// let (mut tx, mut rx) = queue.split();
    /// assert!(tx.enqueue(7).is_ok());
    /// assert_eq!(rx.dequeue(), Some(7));
    /// ```
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        (Producer { queue: self }, Consumer { queue: self })
    }

    fn produce(&self, byte: u8) -> Result<(), u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if usize::from(tail.wrapping_sub(head)) == N {
            return Err(byte);
        }
        // SAFETY: the slot at `tail` is outside the `head..tail` window the consumer
        // reads from, and only the producer advances `tail`.
        unsafe { *self.buf[usize::from(tail & Self::MASK)].get() = byte };
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    fn consume(&self) -> Option<u8> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        // SAFETY: the slot at `head` was published by the `Release` store of `tail`
        // and the producer will not reuse it until `head` moves past it.
        let byte = unsafe { *self.buf[usize::from(head & Self::MASK)].get() };
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(byte)
    }
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The enqueueing half of a split [`ByteQueue`]. Owns the `tail` index.
#[derive(Debug)]
pub struct Producer<'a, const N: usize> {
    queue: &'a ByteQueue<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Appends `byte`, handing it back if the queue is full.
    pub fn enqueue(&mut self, byte: u8) -> Result<(), u8> {
        self.queue.produce(byte)
    }

    /// Number of bytes waiting in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns `true` if the next [`enqueue`](Producer::enqueue) would fail.
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Total number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }
}

/// The dequeueing half of a split [`ByteQueue`]. Owns the `head` index.
#[derive(Debug)]
pub struct Consumer<'a, const N: usize> {
    queue: &'a ByteQueue<N>,
}

impl<const N: usize> Consumer<'_, N> {
    /// Removes and returns the oldest byte, or `None` if the queue is empty.
    pub fn dequeue(&mut self) -> Option<u8> {
        self.queue.consume()
    }

    /// Number of bytes waiting in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }
}
