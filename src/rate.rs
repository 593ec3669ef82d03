//! Baud and sample rate configuration.
//!
//! The decoder does all of its timing arithmetic in 8 bits, so the baud rate
//! and the sampling (interrupt) rate have to be brought down to values that
//! fit in a `u8` while keeping their ratio, which is the number of samples per
//! bit. This module does that once, at configuration time, and refuses rates
//! it cannot represent instead of silently truncating them.
//!
//! Every constructor is a `const fn`, so the reduction can happen at compile
//! time with [`rate_config!`](crate::rate_config):
//!
//! ```rust
//! use softrx::rate::RateConfig;
//!
//! const RATES: RateConfig = softrx::rate_config!(9600, 38_400);
//! assert_eq!(RATES.baud_units(), 1);
//! assert_eq!(RATES.sample_units(), 4);
//! ```

use crate::consts::{MAX_RATIO_DRIFT_PERMILLE, MIN_SAMPLES_PER_BIT};

/// Reasons a pair of rates cannot drive the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RateError {
    /// The baud rate or the sample rate is zero.
    #[error("baud rate and sample rate must both be non-zero")]
    ZeroRate,
    /// Fewer than two samples per bit period.
    #[error("{sample_rate} samples/s is fewer than two samples per bit at {baud} baud")]
    TooFewSamples {
        /// Requested baud rate.
        baud: u32,
        /// Requested sample rate.
        sample_rate: u32,
    },
    /// The rates do not reduce to 8-bit units without changing their ratio.
    #[error("{baud} baud at {sample_rate} samples/s does not reduce to 8-bit units")]
    Unrepresentable {
        /// Requested baud rate.
        baud: u32,
        /// Requested sample rate.
        sample_rate: u32,
    },
    /// The approximated samples-per-bit ratio is too far from the requested one.
    #[error("approximated sample/baud ratio drifts by {permille} per mille")]
    RatioDrift {
        /// Drift in parts per thousand.
        permille: u32,
    },
}

/// Baud and sample rates reduced to 8-bit units.
///
/// Only the ratio `sample_units / baud_units` matters to the decoder; it is the
/// number of [`sample`](crate::receiver::BitSampleReceiver::sample) calls per bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct RateConfig {
    baud_units: u8,
    sample_units: u8,
}

impl RateConfig {
    /// Reduces `baud` and `sample_rate` by their greatest common divisor.
    ///
    /// The reduction is exact, so the decoder sees precisely the requested
    /// samples-per-bit ratio.
    ///
    /// # Arguments
    /// - `baud`: line speed in bits per second (e.g. 9600)
    /// - `sample_rate`: rate at which `sample()` will be called, in Hz (e.g. 38400)
    ///
    /// # Errors
    /// - [`RateError::ZeroRate`] if either rate is zero
    /// - [`RateError::TooFewSamples`] if there are fewer than two samples per bit
    /// - [`RateError::Unrepresentable`] if the reduced sample rate exceeds 255
    pub const fn new(baud: u32, sample_rate: u32) -> Result<Self, RateError> {
        if let Err(e) = check_rates(baud, sample_rate) {
            return Err(e);
        }
        let divisor = gcd(baud, sample_rate);
        let baud_units = baud / divisor;
        let sample_units = sample_rate / divisor;
        if sample_units > u8::MAX as u32 {
            return Err(RateError::Unrepresentable { baud, sample_rate });
        }
        Ok(Self {
            baud_units: baud_units as u8,
            sample_units: sample_units as u8,
        })
    }

    /// Reduces the rates the same way as [`new`](RateConfig::new) when possible,
    /// and otherwise trades a little timing accuracy for an 8-bit fit.
    ///
    /// While the sample rate is above 255 both rates are divided by the first of
    /// 8, 2, 3 and 5 that divides both; when none does, both are halved, which
    /// introduces rounding. The result is rejected if the samples-per-bit ratio
    /// ends up more than 2 % away from the requested one, since beyond that the
    /// sampling point walks out of the last data bit.
    ///
    /// # Errors
    /// Same as [`new`](RateConfig::new), except that [`RateError::Unrepresentable`]
    /// is only returned for more than 255 samples per bit, and a fit that rounds
    /// too far fails with [`RateError::RatioDrift`].
    pub const fn approximate(baud: u32, sample_rate: u32) -> Result<Self, RateError> {
        if let Err(e) = check_rates(baud, sample_rate) {
            return Err(e);
        }
        let mut b = baud;
        let mut s = sample_rate;
        while s > u8::MAX as u32 {
            if b % 8 == 0 && s % 8 == 0 {
                b /= 8;
                s /= 8;
            } else if b % 2 == 0 && s % 2 == 0 {
                b /= 2;
                s /= 2;
            } else if b % 3 == 0 && s % 3 == 0 {
                b /= 3;
                s /= 3;
            } else if b % 5 == 0 && s % 5 == 0 {
                b /= 5;
                s /= 5;
            } else {
                b /= 2;
                s /= 2;
            }
        }
        if b == 0 {
            return Err(RateError::Unrepresentable { baud, sample_rate });
        }
        if s < b * MIN_SAMPLES_PER_BIT {
            return Err(RateError::TooFewSamples { baud, sample_rate });
        }

        // |s/b - sample_rate/baud| relative to sample_rate/baud, in per mille.
        let wanted = sample_rate as u64 * b as u64;
        let got = s as u64 * baud as u64;
        let diff = if wanted > got { wanted - got } else { got - wanted };
        let permille = (diff * 1000 / wanted) as u32;
        if permille > MAX_RATIO_DRIFT_PERMILLE {
            return Err(RateError::RatioDrift { permille });
        }
        Self::new(b, s)
    }

    /// Uses already reduced units as they are.
    ///
    /// # Errors
    /// [`RateError::ZeroRate`] or [`RateError::TooFewSamples`].
    pub const fn from_units(baud_units: u8, sample_units: u8) -> Result<Self, RateError> {
        if let Err(e) = check_rates(baud_units as u32, sample_units as u32) {
            return Err(e);
        }
        Ok(Self {
            baud_units,
            sample_units,
        })
    }

    /// Phase added on every sample.
    pub const fn baud_units(&self) -> u8 {
        self.baud_units
    }

    /// Phase consumed by every bit period.
    pub const fn sample_units(&self) -> u8 {
        self.sample_units
    }

    /// Whole number of samples per bit, rounded down.
    pub const fn samples_per_bit(&self) -> u8 {
        self.sample_units / self.baud_units
    }
}

const fn check_rates(baud: u32, sample_rate: u32) -> Result<(), RateError> {
    if baud == 0 || sample_rate == 0 {
        return Err(RateError::ZeroRate);
    }
    if (sample_rate as u64) < (baud as u64) * (MIN_SAMPLES_PER_BIT as u64) {
        return Err(RateError::TooFewSamples { baud, sample_rate });
    }
    Ok(())
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Builds a [`RateConfig`] at compile time, failing the build if the rates
/// cannot be represented exactly.
///
/// # Example
/// ```rust
/// use softrx::rate::RateConfig;
///
/// // 600 baud sampled at 16 kHz: 80/3 samples per bit.
/// const RATES: RateConfig = softrx::rate_config!(600, 16_000);
/// assert_eq!((RATES.baud_units(), RATES.sample_units()), (3, 80));
/// ```
///
/// ```compile_fail
/// // 9600 baud at 1 MHz reduces to 6/625, which does not fit in a byte.
/// const RATES: softrx::rate::RateConfig = softrx::rate_config!(9600, 1_000_000);
/// ```
#[macro_export]
macro_rules! rate_config {
    ( $baud:expr, $sample_rate:expr ) => {
        const {
            match $crate::rate::RateConfig::new($baud, $sample_rate) {
                Ok(rates) => rates,
                Err(_) => panic!("baud rate and sample rate cannot be reduced to 8-bit units"),
            }
        }
    };
}
