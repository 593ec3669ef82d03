//! `embedded-hal` pin helpers.
//!
//! The receiver treats a high pin as mark (idle) and a low pin as space, which
//! is how a UART line looks at logic level. Lines that arrive through an
//! inverting stage (an optocoupler, a transistor level shifter, or an RS-232
//! signal before its transceiver) idle low instead; wrap those pins in
//! [`Inverted`].

use embedded_hal::digital::{ErrorType, InputPin};

/// An [`InputPin`] reading the opposite level of the pin it wraps.
///
/// # Example
/// ```rust
/// # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
/// use embedded_hal::digital::InputPin;
/// use softrx::pin::Inverted;
///
/// # let pin = Pin::new(&[PinTransaction::get(PinState::Low)]);
/// let mut line = Inverted::new(pin);
/// assert!(line.is_high().unwrap());
/// # line.into_inner().done();
/// ```
#[derive(Debug)]
pub struct Inverted<P> {
    pin: P,
}

impl<P: InputPin> Inverted<P> {
    /// Wraps `pin`.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Returns the wrapped pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin> ErrorType for Inverted<P> {
    type Error = P::Error;
}

impl<P: InputPin> InputPin for Inverted<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receiver::{BitSampleReceiver, RxEvent};
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use std::vec::Vec;

    #[test]
    fn test_inverted_pin_swaps_levels() {
        let mut pin = Inverted::new(PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::Low),
        ]));
        assert!(!pin.is_high().unwrap());
        assert!(!pin.is_low().unwrap());
        pin.into_inner().done();
    }

    #[test]
    fn test_receiver_decodes_inverted_line() {
        // 0xf0 on a line that idles low: start bit high, stop bit low.
        let byte = 0xf0u8;
        let mut raw = Vec::new();
        raw.push(true);
        raw.extend((0..8).map(|i| byte & (1 << i) == 0));
        raw.push(false);
        let transactions: Vec<PinTransaction> = raw
            .iter()
            .flat_map(|&high| core::iter::repeat_n(high, 4))
            .map(|high| PinTransaction::get(if high { PinState::High } else { PinState::Low }))
            .collect();

        let mut pin = Inverted::new(PinMock::new(&transactions));
        let mut rx: BitSampleReceiver = BitSampleReceiver::new(9600, 38_400).unwrap();
        let mut events = Vec::new();
        for _ in 0..transactions.len() {
            events.push(rx.sample_pin(&mut pin).unwrap());
        }
        assert!(events.contains(&RxEvent::Received(byte)));
        assert_eq!(rx.read(), Some(byte));
        pin.into_inner().done();
    }
}
