use std::time::Duration;

/// Default poll interval of the engine worker
///
/// This is how long the worker waits for a topology notification
/// before checking whether it was asked to stop. It bounds how long
/// `stop` takes on an idle engine.
///
/// ```
/// # use netchar_core::defaults::*;
/// assert_eq!(DEFAULT_POLL_INTERVAL.as_millis(), 50);
/// ```
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default capacity of the observer channels
///
/// An observer that lets this many events pile up without reading them
/// starts missing events: the engine never blocks on a slow observer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1_024;
