//! Bus-idle precondition checked before every transaction

use crate::Error;
use crate::fmt::warn;

/// Reports whether another master currently holds the bus
///
/// The driver checks this once before each transaction and fails with [`Error::BusBusy`]
/// instead of waiting. It never retries.
pub trait BusyFlag {
    /// `true` while a transfer by someone else is in progress
    fn is_busy(&mut self) -> bool;
}

/// Bus without a busy indication, always treated as idle
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBusyFlag;

impl BusyFlag for NoBusyFlag {
    fn is_busy(&mut self) -> bool {
        false
    }
}

impl<F> BusyFlag for F
where
    F: FnMut() -> bool,
{
    fn is_busy(&mut self) -> bool {
        self()
    }
}

pub(crate) fn ensure_idle<B: BusyFlag, E>(busy: &mut B) -> Result<(), Error<E>> {
    if busy.is_busy() {
        warn!("adt7420: bus busy, transaction dropped");
        return Err(Error::BusBusy);
    }
    Ok(())
}
