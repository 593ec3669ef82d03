//! Tick-source utilities for the receiver.
//!
//! Something has to call `sample()` at the configured sample rate. This module
//! offers two ways: an interrupt service routine sharing the receiver through
//! `critical_section::with` (`timer-isr` feature), or a blocking loop paced by
//! an `embedded_hal::delay::DelayNs` provider (`delay-loop` feature).
//!
//! Contains:
//! - [`tick_period_ns`]: sample period for a given sample rate
//! - `global_receiver_init`, `global_receiver_setup`, `global_receiver_sample`,
//!   `global_receiver_read` and the `init_soft_rx!()`, `setup_soft_rx!()`,
//!   `sample_soft_rx!()`, `read_soft_rx!()` macros (feature `timer-isr`)
//! - `run_sample_loop`: blocking sampling loop (feature `delay-loop`)
//!
//! Configuring the hardware timer itself is left to the platform HAL. Pick an
//! interrupt rate that [`RateConfig::new`](crate::rate::RateConfig::new)
//! accepts for the baud rate, e.g.:
//!
//! | Baud | Sample rate | Samples per bit |
//! |------|-------------|-----------------|
//! |  300 |      16 kHz |          53 1/3 |
//! |  600 |      16 kHz |          26 2/3 |
//! | 1200 |    19.2 kHz |              16 |
//! | 2400 |      16 kHz |           6 2/3 |
//! | 9600 |    38.4 kHz |               4 |

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// Nanoseconds per second.
pub const NANOSECONDS_PER_SECOND: u32 = 1_000_000_000;

/// Time between two samples, rounded to the nearest nanosecond.
///
/// # Arguments
/// - `sample_rate`: samples per second (e.g. 38400)
///
/// # Returns
/// - The sample period in nanoseconds, or `0` for a zero rate
pub const fn tick_period_ns(sample_rate: u32) -> u32 {
    if sample_rate == 0 {
        return 0;
    }
    (NANOSECONDS_PER_SECOND + sample_rate / 2) / sample_rate
}
