/// Declares a static global `SOFT_RX` receiver protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `SOFT_RX` suitable for use in
/// interrupt-based environments, where both the main thread and an ISR need
/// to access the shared receiver state.
///
/// # Arguments
/// - `$n`: The receive queue capacity (optional, defaults to 32)
///
/// # Example
/// ```rust
/// softrx::init_soft_rx!(64);
/// ```
#[macro_export]
macro_rules! init_soft_rx {
    () => {
        $crate::init_soft_rx!(32);
    };
    ( $n:expr ) => {
        pub static SOFT_RX: $crate::timer::GlobalReceiver<{ $n }> =
            $crate::timer::global_receiver_init();
    };
}

/// Installs a receiver for the given rates in the global `SOFT_RX`.
///
/// The rates are reduced at compile time through [`rate_config!`](crate::rate_config),
/// so they must be constant expressions and unsupported combinations fail the build.
///
/// # Arguments
/// - `$baud`: The line speed in bits per second
/// - `$sample_rate`: The timer interrupt rate in Hz
///
/// # Example
/// ```rust
/// softrx::init_soft_rx!();
///
/// fn main() {
///     softrx::setup_soft_rx!(9600, 38_400);
/// }
/// ```
///
/// # Notes
/// - Requires `init_soft_rx!` to have been used earlier.
#[macro_export]
macro_rules! setup_soft_rx {
    ( $baud:expr, $sample_rate:expr ) => {
        $crate::timer::global_receiver_setup(&SOFT_RX, $crate::rate_config!($baud, $sample_rate))
    };
}

/// Samples the line on the global `SOFT_RX`, evaluating to the [`RxEvent`](crate::receiver::RxEvent).
///
/// This macro is intended to be invoked from the timer ISR at the configured
/// sample rate.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     let _ = sample_soft_rx!(rx_pin.is_high().unwrap_or(true));
/// }
/// ```
///
/// # Notes
/// - Silently does nothing if the receiver hasn't been set up yet.
#[macro_export]
macro_rules! sample_soft_rx {
    ( $level:expr ) => {
        $crate::timer::global_receiver_sample(&SOFT_RX, $level)
    };
}

/// Reads the oldest received byte from the global `SOFT_RX`, evaluating to an `Option<u8>`.
///
/// # Example
/// ```rust
/// softrx::init_soft_rx!(8);
///
/// fn main() {
///     softrx::setup_soft_rx!(1200, 19_200);
///     assert_eq!(softrx::read_soft_rx!(), None);
///     let _ = softrx::sample_soft_rx!(true);
/// }
/// ```
#[macro_export]
macro_rules! read_soft_rx {
    () => {
        $crate::timer::global_receiver_read(&SOFT_RX)
    };
}
