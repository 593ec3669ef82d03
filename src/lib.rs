//! # softrx
//!
//! A portable, no_std Rust software UART receiver for microcontrollers without
//! a spare UART peripheral.
//!
//! The receiver decodes a serial line by sampling a single input pin at a fixed
//! rate, normally from a timer interrupt, using:
//! - an 8-bit fixed-point phase accumulator to find bit boundaries, so the
//!   sample rate does not have to be a whole multiple of the baud rate
//! - a lock-free, power-of-two byte queue between the interrupt and the application
//! - `embedded-hal` traits for pin access
//! - optional interrupt-safe global access with `critical-section`
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` |
//! | `timer-isr` (default) | Global receiver shared through `critical_section::with` |
//! | `delay-loop`          | Blocking sample loop paced by `embedded_hal::delay::DelayNs` |
//! | `defmt-0-3`           | Uses `defmt` logging and derives `defmt::Format` |
//! | `log`                 | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust
//! use softrx::receiver::BitSampleReceiver;
//!
//! let mut rx: BitSampleReceiver = BitSampleReceiver::new(9600, 38_400).unwrap();
//! # let line_is_high = || true;
//! # for _ in 0..1 {
//! // In the 38.4 kHz timer interrupt:
//! let _event = rx.sample(line_is_high());
//! # }
//!
//! // In the main loop:
//! while let Some(byte) = rx.read() {
//!     // ...
//! #   let _ = byte;
//! }
//! ```
//!
//! Or share it with an ISR through the `timer-isr` macros:
//!
//! ```rust,ignore
//! softrx::init_soft_rx!();
//!
//! #[interrupt]
//! fn TIM2() {
//!     let _ = softrx::sample_soft_rx!(rx_pin.is_high().unwrap_or(true));
//! }
//!
//! fn main() {
//!     softrx::setup_soft_rx!(9600, 38_400);
//!     loop {
//!         if let Some(byte) = softrx::read_soft_rx!() { /* ... */ }
//!     }
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - Receive only, 8 data bits, no parity, one stop bit, LSB first
//! - `sample()` must be called at exactly the configured rate; at least two samples per
//!   bit are required and four or more are recommended
//! - Framing errors and queue overruns are reported per sample through
//!   [`RxEvent`](receiver::RxEvent) and counted in [`RxStats`](receiver::RxStats)
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

#[macro_use]
mod fmt;

pub mod consts;
pub mod decoder;
pub mod pin;
pub mod queue;
pub mod rate;
pub mod receiver;
pub mod timer;

pub use rate::{RateConfig, RateError};
pub use receiver::{BitSampleReceiver, RxEvent, RxStats};
