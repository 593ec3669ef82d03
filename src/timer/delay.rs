use crate::receiver::Sampler;
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

/// Runs a blocking loop that samples `pin` into `sampler` at a fixed period.
///
/// This is a simple timing loop for use where a timer interrupt is unavailable
/// or undesired. Pair it with the [`Reader`](crate::receiver::Reader) half of
/// the same receiver on another core or thread.
///
/// # Arguments
/// - `sampler`: The sampling half of a split [`BitSampleReceiver`](crate::receiver::BitSampleReceiver)
/// - `pin`: The RX pin, high when the line is idle
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL
/// - `tick_ns`: The delay between samples in nanoseconds, see
///   [`tick_period_ns`](crate::timer::tick_period_ns)
///
/// # Example
/// ```rust,ignore
/// use softrx::receiver::BitSampleReceiver;
/// use softrx::timer::{run_sample_loop, tick_period_ns};
///
/// let mut rx: BitSampleReceiver = BitSampleReceiver::new(1200, 19_200)?;
/// let (mut sampler, reader) = rx.split();
/// run_sample_loop(&mut sampler, &mut rx_pin, &mut delay, tick_period_ns(19_200))?;
/// ```
///
/// # Returns
/// Only on a pin error, which is passed through.
///
/// # Notes
/// - The time spent sampling is not subtracted from `tick_ns`, so the
///   effective sample rate is slightly lower than requested. This is fine at low
///   baud rates but a timer interrupt is preferable for accurate timing.
pub fn run_sample_loop<const N: usize, P, D>(
    sampler: &mut Sampler<'_, N>,
    pin: &mut P,
    delay: &mut D,
    tick_ns: u32,
) -> Result<Infallible, P::Error>
where
    P: InputPin,
    D: DelayNs,
{
    loop {
        let _ = sampler.sample_pin(pin)?;
        delay.delay_ns(tick_ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receiver::{BitSampleReceiver, RxEvent};
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use std::vec::IntoIter;
    use std::vec::Vec;

    /// Replays recorded levels, then fails like a disconnected pin.
    struct ReplayPin(IntoIter<bool>);

    impl ErrorType for ReplayPin {
        type Error = ErrorKind;
    }

    impl InputPin for ReplayPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.0.next().ok_or(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    #[test]
    fn test_sample_loop_decodes_until_pin_error() {
        let byte = 0xc3u8;
        let mut levels = Vec::new();
        for bit in 0..10 {
            let high = match bit {
                0 => false,
                9 => true,
                n => byte & (1 << (n - 1)) != 0,
            };
            levels.extend(core::iter::repeat_n(high, 4));
        }
        let mut pin = ReplayPin(levels.into_iter());
        let mut delay = NoopDelay::new();

        let mut rx: BitSampleReceiver<4> = BitSampleReceiver::new(9600, 38_400).unwrap();
        {
            let (mut sampler, _reader) = rx.split();
            let result = run_sample_loop(&mut sampler, &mut pin, &mut delay, 26_042);
            assert_eq!(result.unwrap_err(), ErrorKind::Other);
            assert_eq!(sampler.stats().received, 1);
        }
        assert_eq!(rx.read(), Some(byte));
        assert_eq!(rx.sample(true), RxEvent::Nothing);
    }
}
