//! Bit-timing state machine for software UART reception.
//!
//! This module turns a stream of line levels, sampled at a fixed rate, into
//! bytes. It tracks bit boundaries with an 8-bit phase accumulator instead of
//! a tick counter, so the sample rate does not have to be a whole multiple of
//! the baud rate.
//!
//! ## Timing
//!
//! Each sample adds `baud_units` to the phase. A bit boundary is reached when
//! that addition carries out of 8 bits, after which `sample_units` is taken
//! back off. Over one bit period the phase therefore gains exactly
//! `sample_units`, which is the Bresenham-style rate conversion used by DDAs.
//!
//! On the falling edge of the start bit the phase is loaded with
//! `-(sample_units / 2)`, half a bit period "owed". The first boundary then
//! lands in the middle of the start bit rather than in the middle of the first
//! data bit, and the start bit is shifted in as an extra data bit that falls
//! off the bottom of the byte once all eight data bits are in. Owing a bit and
//! a half would overflow the phase for sample units above 170.

use crate::consts::{BIT_STATE_IDLE, BIT_STATE_START};
use crate::rate::RateConfig;

/// A complete frame, produced when the stop bit is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Frame {
    /// The eight data bits, LSB received first.
    pub byte: u8,
    /// `true` if the stop bit was sampled at the space (low) level.
    pub framing_error: bool,
}

/// The receive state machine, without any buffering.
///
/// Feed it one line level per tick with [`sample`](Decoder::sample); it hands
/// back a [`Frame`] on the tick the stop bit is sampled.
#[derive(Debug, Clone)]
pub struct Decoder {
    /// Shift register for the bits received so far, filled from the top.
    accumulator: u8,

    /// State register, counting down from 10 to 0 over start, data and stop bits.
    ///
    /// - `0`: idle, waiting for the start bit
    /// - `10`: start edge seen, the next boundary samples the start bit
    /// - `2..=9`: data bits
    /// - `1`: the next boundary samples the stop bit
    bit_state: u8,

    /// Fractional position within the current bit period, in baud units.
    ///
    /// Read as a two's complement value it is negative until the next bit
    /// boundary, and the boundary is detected by the unsigned carry out of the
    /// addition that makes it non-negative.
    phase: u8,

    rates: RateConfig,
}

impl Decoder {
    /// Creates an idle decoder for the given rates.
    pub const fn new(rates: RateConfig) -> Self {
        Self {
            accumulator: 0,
            bit_state: BIT_STATE_IDLE,
            phase: 0,
            rates,
        }
    }

    /// Advances the state machine by one sample.
    ///
    /// Must be called exactly once per tick of the configured sample rate.
    ///
    /// # Arguments
    /// - `level`: the line level, `true` for mark (idle, logic 1) and `false`
    ///   for space (start bit, logic 0)
    ///
    /// # Returns
    /// The completed frame on the tick the stop bit is sampled, `None` otherwise.
    pub fn sample(&mut self, level: bool) -> Option<Frame> {
        if self.bit_state == BIT_STATE_IDLE {
            if !level {
                // Leading edge of the start bit
                self.bit_state = BIT_STATE_START;
                self.phase = (self.rates.sample_units() / 2).wrapping_neg();
            }
            return None;
        }

        let baud = self.rates.baud_units();
        self.phase = self.phase.wrapping_add(baud);
        if self.phase >= baud {
            // No carry, still inside the current bit
            return None;
        }
        self.phase = self.phase.wrapping_sub(self.rates.sample_units());

        self.bit_state -= 1;
        if self.bit_state == BIT_STATE_IDLE {
            // This sample is the stop bit
            return Some(Frame {
                byte: self.accumulator,
                framing_error: !level,
            });
        }
        self.accumulator = (self.accumulator >> 1) | (u8::from(level) << 7);
        None
    }

    /// Returns `true` while waiting for a start bit.
    pub const fn is_idle(&self) -> bool {
        self.bit_state == BIT_STATE_IDLE
    }

    /// The rates this decoder was built with.
    pub const fn rates(&self) -> RateConfig {
        self.rates
    }
}
