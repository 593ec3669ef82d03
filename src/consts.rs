//! Constants used across the receiver implementation.
//!
//! This module defines the frame layout, the values taken by the decoder's
//! bit-state register, and the queue sizing limits.
//!
//! ## Key Concepts
//!
//! - **Frame**: one start bit (space), eight data bits sent LSB first, one stop bit (mark).
//! - **Bit state**: a down-counter that doubles as the state machine register. It is loaded
//!   with [`BIT_STATE_START`] on the falling edge of the start bit and decremented once per
//!   bit boundary until it reaches [`BIT_STATE_IDLE`] on the stop bit.
//! - **Queue sizing**: capacities are powers of two no larger than [`MAX_QUEUE_LEN`] so that
//!   free-running 8-bit indices can tell a full queue from an empty one.

/// Number of data bits in a frame.
pub const DATA_BITS: u8 = 8;

/// Bit state while waiting for the falling edge of a start bit.
pub const BIT_STATE_IDLE: u8 = 0;

/// Bit state while waiting to sample the stop bit.
pub const BIT_STATE_STOP: u8 = 1;

/// Bit state loaded on the falling edge of the start bit.
///
/// The start bit is shifted in as a throw-away ninth data bit, so the counter
/// covers the start bit, the data bits and the stop bit.
pub const BIT_STATE_START: u8 = DATA_BITS + 2;

/// Largest queue capacity representable with 8-bit cyclic indices.
///
/// `tail - head` must be able to hold every value from `0` to the capacity,
/// which stops at 128 for a power of two below 256.
pub const MAX_QUEUE_LEN: usize = 128;

/// Queue capacity used by [`BitSampleReceiver`](crate::receiver::BitSampleReceiver)
/// when none is given.
pub const DEFAULT_QUEUE_LEN: usize = 32;

/// Largest accepted drift, in parts per thousand, between the requested
/// samples-per-bit ratio and the one produced by
/// [`RateConfig::approximate`](crate::rate::RateConfig::approximate).
pub const MAX_RATIO_DRIFT_PERMILLE: u32 = 20;

/// Minimum number of samples per bit period.
pub const MIN_SAMPLES_PER_BIT: u32 = 2;
