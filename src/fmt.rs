// Logging macros shared by every module.  Routed to `defmt` or `log` when the matching feature is
// enabled, otherwise they expand to nothing.
#![allow(unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! trace {
            ($($arg:tt)*) => { ::defmt::trace!($($arg)*) };
        }
        macro_rules! debug {
            ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
        }
        macro_rules! warn {
            ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! trace {
            ($($arg:tt)*) => { ::log::trace!($($arg)*) };
        }
        macro_rules! debug {
            ($($arg:tt)*) => { ::log::debug!($($arg)*) };
        }
        macro_rules! warn {
            ($($arg:tt)*) => { ::log::warn!($($arg)*) };
        }
    } else {
        macro_rules! trace {
            ($($arg:tt)*) => {};
        }
        macro_rules! debug {
            ($($arg:tt)*) => {};
        }
        macro_rules! warn {
            ($($arg:tt)*) => {};
        }
    }
}
