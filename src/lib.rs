pub mod sim;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Tick-gated logging for hot systems: emits the message every 100 ticks
/// when the `perf_stats` feature is on.
///
/// With the feature off the macro expands to nothing, so neither the
/// message nor its arguments are ever evaluated.
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick.0 % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
