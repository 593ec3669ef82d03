//! Software receive-only UART.
//!
//! This module provides [`BitSampleReceiver`], which decodes a UART line from
//! periodic samples of a single input pin and buffers the received bytes until
//! the application reads them. It needs no UART peripheral, only a timer
//! interrupt running at a fixed rate that calls [`sample()`](BitSampleReceiver::sample).
//!
//! ## Example
//!
//! ```rust
//! use softrx::receiver::{BitSampleReceiver, RxEvent};
//!
//! // 9600 baud sampled at 38.4 kHz: four samples per bit.
//! let mut rx: BitSampleReceiver = BitSampleReceiver::new(9600, 38_400).unwrap();
//!
//! // 'A' = 0x41, sent LSB first between a start bit and a stop bit.
//! let bits = [false, true, false, false, false, false, false, true, false, true];
//! let mut events = bits
//!     .iter()
//!     .flat_map(|&bit| core::iter::repeat_n(bit, 4))
//!     .map(|level| rx.sample(level))
//!     .filter(|event| *event != RxEvent::Nothing);
//! assert_eq!(events.next(), Some(RxEvent::Received(b'A')));
//! # drop(events);
//!
//! assert_eq!(rx.read(), Some(b'A'));
//! assert_eq!(rx.read(), None);
//! ```
//!
//! ## Interrupt and application context
//!
//! `sample()` is the producer and `read()` the consumer. To run them in
//! different contexts without a lock, [`split`](BitSampleReceiver::split) the
//! receiver into a [`Sampler`] for the interrupt handler and a [`Reader`] for
//! the main loop. Alternatively keep the whole receiver in a
//! `critical_section::Mutex`, see [`crate::timer`].
//!
//! For the bit timing itself, see [`crate::decoder::Decoder`].

use core::convert::Infallible;

use embedded_hal::digital::InputPin;

use crate::consts::DEFAULT_QUEUE_LEN;
use crate::decoder::{Decoder, Frame};
use crate::queue::{ByteQueue, Consumer, Producer};
use crate::rate::{RateConfig, RateError};

/// What a single call to `sample()` produced.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RxEvent {
    /// No frame completed on this sample.
    #[default]
    Nothing,
    /// A byte was received and queued.
    Received(u8),
    /// A byte was queued, but its stop bit was sampled low.
    ///
    /// The line may have lost frame synchronisation or been in a break
    /// condition; the byte is delivered anyway.
    FramingError(u8),
    /// A byte was received while the queue was full and has been dropped.
    ///
    /// The bytes already queued are kept. Takes precedence over
    /// [`FramingError`](RxEvent::FramingError).
    Overrun(u8),
}

/// Running totals kept by the sampling side.
///
/// All counters wrap around.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct RxStats {
    /// Bytes queued, including those with a framing error.
    pub received: u16,
    /// Frames whose stop bit was sampled low.
    pub framing_errors: u16,
    /// Bytes dropped because the queue was full.
    pub overruns: u16,
}

impl RxStats {
    fn record(&mut self, frame: Frame, queued: Result<(), u8>) -> RxEvent {
        if frame.framing_error {
            self.framing_errors = self.framing_errors.wrapping_add(1);
        }
        match queued {
            Err(byte) => {
                self.overruns = self.overruns.wrapping_add(1);
                trace!("softrx: queue full, dropped {}", byte);
                RxEvent::Overrun(byte)
            }
            Ok(()) => {
                self.received = self.received.wrapping_add(1);
                if frame.framing_error {
                    trace!("softrx: framing error on {}", frame.byte);
                    RxEvent::FramingError(frame.byte)
                } else {
                    RxEvent::Received(frame.byte)
                }
            }
        }
    }
}

/// A receive-only UART driven by periodic pin samples.
///
/// `N` is the capacity of the receive queue. It must be a power of two between
/// 1 and 128 and defaults to [`DEFAULT_QUEUE_LEN`].
///
/// ## Timing contract
///
/// [`sample()`](BitSampleReceiver::sample) must be called exactly once per
/// period of the sample rate given at construction, typically from a timer
/// interrupt. Each call is a handful of 8-bit operations with no loops, no
/// allocation and no blocking.
///
/// ## Notes
///
/// - Frames are 8N1: one start bit, eight data bits LSB first, one stop bit.
/// - When the queue is full, newly received bytes are dropped and the oldest
///   ones are kept.
#[derive(Debug)]
pub struct BitSampleReceiver<const N: usize = DEFAULT_QUEUE_LEN> {
    decoder: Decoder,
    queue: ByteQueue<N>,
    stats: RxStats,
}

impl<const N: usize> BitSampleReceiver<N> {
    /// Creates a receiver for the given line and sampling rates.
    ///
    /// # Arguments
    /// - `baud`: line speed in bits per second (e.g. 9600)
    /// - `sample_rate`: how often [`sample()`](BitSampleReceiver::sample) will be called, in Hz
    ///
    /// # Errors
    /// Any [`RateError`] from [`RateConfig::new`].
    pub fn new(baud: u32, sample_rate: u32) -> Result<Self, RateError> {
        let rates = RateConfig::new(baud, sample_rate).inspect_err(|_| {
            warn!(
                "softrx: {} baud cannot be sampled at {} Hz",
                baud, sample_rate
            );
        })?;
        debug!(
            "softrx: {} baud at {} Hz -> {}/{} phase units",
            baud,
            sample_rate,
            rates.baud_units(),
            rates.sample_units()
        );
        Ok(Self::with_rates(rates))
    }

    /// Creates a receiver from already validated rates.
    ///
    /// Usable in `const` context, e.g. to initialise a `static`.
    pub const fn with_rates(rates: RateConfig) -> Self {
        Self {
            decoder: Decoder::new(rates),
            queue: ByteQueue::new(),
            stats: RxStats {
                received: 0,
                framing_errors: 0,
                overruns: 0,
            },
        }
    }

    /// Advances the receiver by one sample of the line.
    ///
    /// # Arguments
    /// - `level`: `true` for mark (idle, logic 1), `false` for space (logic 0)
    ///
    /// # Returns
    /// The [`RxEvent`] for this sample. Ignoring it is fine; the byte is queued
    /// (or counted as an overrun) either way.
    pub fn sample(&mut self, level: bool) -> RxEvent {
        match self.decoder.sample(level) {
            Some(frame) => {
                let queued = self.queue.enqueue(frame.byte);
                self.stats.record(frame, queued)
            }
            None => RxEvent::Nothing,
        }
    }

    /// Reads `pin` and samples its level.
    ///
    /// # Errors
    /// The pin's error. The decoder is not advanced in that case.
    pub fn sample_pin<P: InputPin>(&mut self, pin: &mut P) -> Result<RxEvent, P::Error> {
        let level = pin.is_high()?;
        Ok(self.sample(level))
    }

    /// Removes and returns the oldest received byte, or `None` if there is none.
    pub fn read(&mut self) -> Option<u8> {
        self.queue.dequeue()
    }

    /// Non-blocking read in the `nb` style.
    ///
    /// Returns [`nb::Error::WouldBlock`] while nothing has been received.
    pub fn read_nb(&mut self) -> nb::Result<u8, Infallible> {
        self.read().ok_or(nb::Error::WouldBlock)
    }

    /// Number of received bytes waiting to be read.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no received bytes are waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Capacity of the receive queue.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns `true` while the line is idle between frames.
    pub const fn is_idle(&self) -> bool {
        self.decoder.is_idle()
    }

    /// Counters for received, malformed and dropped bytes.
    pub const fn stats(&self) -> RxStats {
        self.stats
    }

    /// The reduced rates in use.
    pub const fn rates(&self) -> RateConfig {
        self.decoder.rates()
    }

    /// Splits the receiver into its interrupt-side and application-side halves.
    ///
    /// The [`Sampler`] is the only writer of the queue's tail and the
    /// [`Reader`] the only writer of its head, so the two can be used from
    /// different execution contexts without a critical section.
    ///
    /// # Example
    /// ```rust
    /// use softrx::receiver::BitSampleReceiver;
    ///
    /// let mut rx: BitSampleReceiver<8> = BitSampleReceiver::new(1200, 19_200).unwrap();
    /// let (mut sampler, mut reader) = rx.split();
    /// for _ in 0..100 {
    ///     let _ = sampler.sample(true);
    /// }
    /// assert_eq!(reader.read(), None);
    /// ```
    pub fn split(&mut self) -> (Sampler<'_, N>, Reader<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (
            Sampler {
                decoder: &mut self.decoder,
                stats: &mut self.stats,
                producer,
            },
            Reader { consumer },
        )
    }
}

/// The interrupt-side half of a split [`BitSampleReceiver`].
#[derive(Debug)]
pub struct Sampler<'a, const N: usize> {
    decoder: &'a mut Decoder,
    stats: &'a mut RxStats,
    producer: Producer<'a, N>,
}

impl<const N: usize> Sampler<'_, N> {
    /// See [`BitSampleReceiver::sample`].
    pub fn sample(&mut self, level: bool) -> RxEvent {
        match self.decoder.sample(level) {
            Some(frame) => {
                let queued = self.producer.enqueue(frame.byte);
                self.stats.record(frame, queued)
            }
            None => RxEvent::Nothing,
        }
    }

    /// See [`BitSampleReceiver::sample_pin`].
    pub fn sample_pin<P: InputPin>(&mut self, pin: &mut P) -> Result<RxEvent, P::Error> {
        let level = pin.is_high()?;
        Ok(self.sample(level))
    }

    /// Returns `true` while the line is idle between frames.
    pub fn is_idle(&self) -> bool {
        self.decoder.is_idle()
    }

    /// Counters for received, malformed and dropped bytes.
    pub fn stats(&self) -> RxStats {
        *self.stats
    }

    /// Number of received bytes the reader has not taken yet.
    pub fn len(&self) -> usize {
        self.producer.len()
    }

    /// Returns `true` if no received bytes are waiting.
    pub fn is_empty(&self) -> bool {
        self.producer.is_empty()
    }

    /// Returns `true` if the next completed frame would be an overrun.
    ///
    /// Interrupt glue can use this to signal the remote end to pause.
    pub fn is_full(&self) -> bool {
        self.producer.is_full()
    }
}

/// The application-side half of a split [`BitSampleReceiver`].
#[derive(Debug)]
pub struct Reader<'a, const N: usize> {
    consumer: Consumer<'a, N>,
}

impl<const N: usize> Reader<'_, N> {
    /// Removes and returns the oldest received byte, or `None` if there is none.
    pub fn read(&mut self) -> Option<u8> {
        self.consumer.dequeue()
    }

    /// See [`BitSampleReceiver::read_nb`].
    pub fn read_nb(&mut self) -> nb::Result<u8, Infallible> {
        self.read().ok_or(nb::Error::WouldBlock)
    }

    /// Moves as many received bytes as fit into `buf`, oldest first.
    ///
    /// # Returns
    /// The number of bytes written to the front of `buf`.
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        for slot in buf.iter_mut() {
            match self.consumer.dequeue() {
                Some(byte) => *slot = byte,
                None => break,
            }
            n += 1;
        }
        n
    }

    /// Number of received bytes waiting to be read.
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Returns `true` if no received bytes are waiting.
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use std::vec::Vec;

    const SAMPLES_PER_BIT: usize = 4;

    /// Line levels for one 8N1 frame at 4 samples per bit.
    fn frame_levels(byte: u8) -> Vec<bool> {
        let mut bits = Vec::with_capacity(10);
        bits.push(false);
        bits.extend((0..8).map(|i| byte & (1 << i) != 0));
        bits.push(true);
        bits.into_iter()
            .flat_map(|bit| core::iter::repeat_n(bit, SAMPLES_PER_BIT))
            .collect()
    }

    fn feed<const N: usize>(rx: &mut BitSampleReceiver<N>, levels: &[bool]) -> Vec<RxEvent> {
        levels
            .iter()
            .map(|&level| rx.sample(level))
            .filter(|event| *event != RxEvent::Nothing)
            .collect()
    }

    fn receiver<const N: usize>() -> BitSampleReceiver<N> {
        BitSampleReceiver::new(9600, 38_400).unwrap()
    }

    #[test]
    fn test_receiver_initialization() {
        let rx: BitSampleReceiver = receiver();
        assert_eq!(rx.capacity(), 32);
        assert!(rx.is_empty());
        assert!(rx.is_idle());
        assert_eq!(rx.stats(), RxStats::default());
        assert_eq!(rx.rates().samples_per_bit(), 4);
    }

    #[test]
    fn test_invalid_rates_are_rejected() {
        assert_eq!(
            BitSampleReceiver::<32>::new(9600, 0).unwrap_err(),
            RateError::ZeroRate
        );
        assert!(BitSampleReceiver::<32>::new(115_200, 1_000_000).is_err());
    }

    #[test]
    fn test_receives_0x55_then_empty() {
        let mut rx: BitSampleReceiver = receiver();
        let events = feed(&mut rx, &frame_levels(0x55));
        assert_eq!(events, [RxEvent::Received(0x55)]);
        assert_eq!(rx.read(), Some(0x55));
        assert_eq!(rx.read(), None);
    }

    #[test]
    fn test_round_trip_every_byte() {
        for byte in 0..=255u8 {
            let mut rx: BitSampleReceiver = receiver();
            let _ = feed(&mut rx, &frame_levels(byte));
            assert_eq!(rx.read(), Some(byte), "byte {byte:#04x}");
            assert_eq!(rx.read(), None);
        }
    }

    #[test]
    fn test_back_to_back_frames_keep_order() {
        let mut rx: BitSampleReceiver = receiver();
        let message = b"Hello, world!";
        let levels: Vec<bool> = message.iter().flat_map(|&b| frame_levels(b)).collect();
        let _ = feed(&mut rx, &levels);
        let received: Vec<u8> = core::iter::from_fn(|| rx.read()).collect();
        assert_eq!(received, message);
        assert_eq!(rx.stats().received, message.len() as u16);
    }

    #[test]
    fn test_idle_line_produces_nothing() {
        let mut rx: BitSampleReceiver = receiver();
        for _ in 0..100_000 {
            assert_eq!(rx.sample(true), RxEvent::Nothing);
        }
        assert!(rx.is_empty());
        assert_eq!(rx.read(), None);
    }

    #[test]
    fn test_overrun_drops_newest_byte() {
        let mut rx: BitSampleReceiver<4> = receiver();
        let levels: Vec<bool> = [1u8, 2, 3, 4].iter().flat_map(|&b| frame_levels(b)).collect();
        let _ = feed(&mut rx, &levels);
        assert_eq!(rx.len(), 4);

        let events = feed(&mut rx, &frame_levels(5));
        assert_eq!(events, [RxEvent::Overrun(5)]);
        assert_eq!(rx.stats().overruns, 1);
        assert_eq!(rx.stats().received, 4);

        let received: Vec<u8> = core::iter::from_fn(|| rx.read()).collect();
        assert_eq!(received, [1, 2, 3, 4]);
    }

    #[test]
    fn test_framing_error_is_reported_and_byte_kept() {
        let mut rx: BitSampleReceiver = receiver();
        let mut levels = frame_levels(0x3c);
        let stop = levels.len() - SAMPLES_PER_BIT;
        levels[stop..].fill(false);
        // Let the line recover so the held-low stop bit's false start completes.
        levels.extend(core::iter::repeat_n(true, 10 * SAMPLES_PER_BIT));

        let events = feed(&mut rx, &levels);
        assert_eq!(events[0], RxEvent::FramingError(0x3c));
        assert_eq!(rx.stats().framing_errors, 1);
        assert_eq!(rx.read(), Some(0x3c));
    }

    #[test]
    fn test_overrun_takes_precedence_over_framing_error() {
        let mut rx: BitSampleReceiver<1> = receiver();
        let _ = feed(&mut rx, &frame_levels(0x01));
        let mut levels = frame_levels(0x02);
        let stop = levels.len() - SAMPLES_PER_BIT;
        levels[stop..].fill(false);
        let events = feed(&mut rx, &levels);
        assert_eq!(events, [RxEvent::Overrun(0x02)]);
        assert_eq!(rx.stats().framing_errors, 1);
        assert_eq!(rx.stats().overruns, 1);
    }

    #[test]
    fn test_read_nb_would_block_when_empty() {
        let mut rx: BitSampleReceiver = receiver();
        assert_eq!(rx.read_nb(), Err(nb::Error::WouldBlock));
        let _ = feed(&mut rx, &frame_levels(0x7e));
        assert_eq!(rx.read_nb(), Ok(0x7e));
    }

    #[test]
    fn test_sample_pin_reads_level() {
        let mut transactions = Vec::new();
        for level in frame_levels(0x0f) {
            transactions.push(PinTransaction::get(if level {
                PinState::High
            } else {
                PinState::Low
            }));
        }
        let mut pin = PinMock::new(&transactions);

        let mut rx: BitSampleReceiver = receiver();
        let mut events = Vec::new();
        for _ in 0..transactions.len() {
            events.push(rx.sample_pin(&mut pin).unwrap());
        }
        assert!(events.contains(&RxEvent::Received(0x0f)));
        assert_eq!(rx.read(), Some(0x0f));
        pin.done();
    }

    #[test]
    fn test_split_sampler_and_reader() {
        let mut rx: BitSampleReceiver<8> = receiver();
        {
            let (mut sampler, mut reader) = rx.split();
            for &level in &frame_levels(b'o') {
                let _ = sampler.sample(level);
            }
            for &level in &frame_levels(b'k') {
                let _ = sampler.sample(level);
            }
            assert!(sampler.is_idle());
            assert_eq!(sampler.stats().received, 2);
            assert_eq!(reader.len(), 2);

            let mut buf = [0u8; 4];
            assert_eq!(reader.read_into(&mut buf), 2);
            assert_eq!(&buf[..2], b"ok");
            assert!(reader.is_empty());
            assert_eq!(reader.read_nb(), Err(nb::Error::WouldBlock));
        }
        assert_eq!(rx.stats().received, 2);
    }

    #[test]
    fn test_split_across_threads() {
        let mut rx: BitSampleReceiver<4> = receiver();
        let message = b"split across contexts";
        let (mut sampler, mut reader) = rx.split();
        std::thread::scope(|s| {
            let _ = s.spawn(move || {
                for &b in message {
                    while sampler.is_full() {
                        std::hint::spin_loop();
                    }
                    for level in frame_levels(b) {
                        let _ = sampler.sample(level);
                    }
                }
                assert_eq!(sampler.stats().overruns, 0);
            });
            let mut received = Vec::new();
            while received.len() < message.len() {
                if let Some(b) = reader.read() {
                    received.push(b);
                }
            }
            assert_eq!(received, message);
        });
    }
}
