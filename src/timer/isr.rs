use crate::rate::RateConfig;
use crate::receiver::{BitSampleReceiver, RxEvent};
use core::cell::RefCell;
use critical_section::Mutex;

/// A receiver shared between a timer interrupt and the application.
pub type GlobalReceiver<const N: usize> = Mutex<RefCell<Option<BitSampleReceiver<N>>>>;

/// Used to initialize the global static receiver for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust
/// use softrx::timer::{GlobalReceiver, global_receiver_init};
///
/// static SOFT_RX: GlobalReceiver<32> = global_receiver_init();
/// ```
pub const fn global_receiver_init<const N: usize>() -> GlobalReceiver<N> {
    Mutex::new(RefCell::new(None))
}

/// Installs a fresh receiver in the global slot, discarding any previous one.
///
/// # Arguments
/// * The global static receiver
/// * The validated rates, see [`RateConfig::new`] and [`rate_config!`](crate::rate_config)
///
/// # Example
/// ```rust
/// use softrx::timer::{GlobalReceiver, global_receiver_init, global_receiver_setup};
///
/// static SOFT_RX: GlobalReceiver<32> = global_receiver_init();
///
/// fn main() {
///     global_receiver_setup(&SOFT_RX, softrx::rate_config!(9600, 38_400));
///     // ...then start the 38.4 kHz timer interrupt.
/// }
/// ```
pub fn global_receiver_setup<const N: usize>(
    global_receiver: &'static GlobalReceiver<N>,
    rates: RateConfig,
) {
    critical_section::with(|cs| {
        let _ = global_receiver
            .borrow(cs)
            .replace(Some(BitSampleReceiver::with_rates(rates)));
    });
}

/// Samples the line at each interrupt.
///
/// Does nothing and returns [`RxEvent::Nothing`] until the receiver has been
/// set up.
///
/// # Arguments
/// * The global static receiver
/// * The current line level, `true` for mark
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     let level = rx_pin.is_high().unwrap_or(true);
///     let _ = global_receiver_sample(&SOFT_RX, level);
/// }
/// ```
pub fn global_receiver_sample<const N: usize>(
    global_receiver: &'static GlobalReceiver<N>,
    level: bool,
) -> RxEvent {
    critical_section::with(|cs| {
        global_receiver
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .map_or(RxEvent::Nothing, |rx| rx.sample(level))
    })
}

/// Reads the oldest received byte from the global receiver.
///
/// Returns `None` if nothing has been received or the receiver has not been
/// set up.
pub fn global_receiver_read<const N: usize>(
    global_receiver: &'static GlobalReceiver<N>,
) -> Option<u8> {
    critical_section::with(|cs| {
        global_receiver
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .and_then(|rx| rx.read())
    })
}
