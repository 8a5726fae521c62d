//! INT and CT output pins
//!
//! INT follows T_HIGH/T_LOW (and T_CRIT), CT follows T_CRIT only. Whether a pin is asserted
//! depends on the polarity bits of the configuration, which is passed in rather than cached so
//! the caller decides when to refresh it.

use crate::types::{Config, Polarity};

/// The two alert lines of one sensor
#[derive(Debug)]
pub struct AlertPins<INT, CT> {
    int: INT,
    ct: CT,
}

impl<INT, CT> AlertPins<INT, CT> {
    /// Wrap the pins wired to INT and CT
    pub fn new(int: INT, ct: CT) -> Self {
        Self { int, ct }
    }

    /// Return the pins
    pub fn release(self) -> (INT, CT) {
        (self.int, self.ct)
    }
}

fn asserted(level_high: bool, polarity: Polarity) -> bool {
    match polarity {
        Polarity::ActiveHigh => level_high,
        Polarity::ActiveLow => !level_high,
    }
}

impl<INT, CT> AlertPins<INT, CT>
where
    INT: embedded_hal::digital::InputPin,
    CT: embedded_hal::digital::InputPin,
{
    /// `true` when INT is at its active level for `config`
    pub fn int_asserted(&mut self, config: Config) -> Result<bool, INT::Error> {
        Ok(asserted(self.int.is_high()?, config.int_polarity()))
    }

    /// `true` when CT is at its active level for `config`
    pub fn ct_asserted(&mut self, config: Config) -> Result<bool, CT::Error> {
        Ok(asserted(self.ct.is_high()?, config.ct_polarity()))
    }
}

#[cfg(feature = "async")]
impl<INT, CT> AlertPins<INT, CT>
where
    INT: embedded_hal_async::digital::Wait,
    CT: embedded_hal_async::digital::Wait,
{
    /// Wait until INT reaches its active level for `config`
    pub async fn wait_for_int(&mut self, config: Config) -> Result<(), INT::Error> {
        match config.int_polarity() {
            Polarity::ActiveHigh => self.int.wait_for_high().await,
            Polarity::ActiveLow => self.int.wait_for_low().await,
        }
    }

    /// Wait until CT reaches its active level for `config`
    pub async fn wait_for_ct(&mut self, config: Config) -> Result<(), CT::Error> {
        match config.ct_polarity() {
            Polarity::ActiveHigh => self.ct.wait_for_high().await,
            Polarity::ActiveLow => self.ct.wait_for_low().await,
        }
    }
}
