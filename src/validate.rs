//! Range checks applied before any setpoint reaches the bus

use crate::hw_def::*;
use crate::types::Settings;

#[cfg(feature = "defmt")]
use defmt::Format;

/// A setting lies outside the operating envelope of the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidSetting;

/// Check a threshold (`hysteresis == false`) or hysteresis value against its range
pub fn is_valid_temperature(value: i16, hysteresis: bool) -> bool {
    if hysteresis {
        (MIN_HYSTERESIS_C..=MAX_HYSTERESIS_C).contains(&value)
    } else {
        (MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&value)
    }
}

/// Check every setpoint of `settings`; stops at the first one out of range.
///
/// The error does not say which field failed.
pub fn validate_settings(settings: &Settings) -> Result<(), InvalidSetting> {
    let thresholds_ok = [
        settings.crit_temperature_c,
        settings.high_temperature_c,
        settings.low_temperature_c,
    ]
    .into_iter()
    .all(|value| is_valid_temperature(value, false));

    if thresholds_ok && is_valid_temperature(settings.hysteresis_c, true) {
        Ok(())
    } else {
        Err(InvalidSetting)
    }
}
