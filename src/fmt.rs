//! Logging backend selection

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        pub(crate) use defmt::{trace, warn};
    } else if #[cfg(feature = "log")] {
        pub(crate) use log::{trace, warn};
    } else {
        // `warn` itself would clash with the builtin attribute
        macro_rules! trace_ {
            ($($arg:tt)*) => {};
        }
        macro_rules! warn_ {
            ($($arg:tt)*) => {};
        }
        pub(crate) use trace_ as trace;
        pub(crate) use warn_ as warn;
    }
}
