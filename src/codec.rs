//! Conversion between whole-degree Celsius setpoints and the sensor's fixed-point ADC codes
//!
//! Encoding has to be told the resolution through the configuration register value. Decoding
//! is not: the device marks the layout inside the code itself, so the 16-bit layout is
//! recognised by bit 7 and the sign by bit 15. Bit 7 of a code and the resolution bit of the
//! configuration register share the value 0x80 but are unrelated.

use crate::hw_def::{ADC_CODE_16_BIT_MARKER, ADC_CODE_SIGN};
use crate::types::{Config, Resolution};

const SCALE_16_BIT: i32 = 128;
const SCALE_13_BIT: i32 = 16;
const RANGE_16_BIT: i32 = 65536;
const RANGE_13_BIT: i32 = 8192;
const SHIFT_13_BIT: u16 = 3;

/// Convert a temperature in °C to the ADC code for the resolution selected by `config`.
///
/// Negative values wrap into the code field as two's complement. A 13-bit code is returned
/// already shifted into bits 15..3 of the transport word.
pub fn temperature_to_adc_code(config: Config, celsius: i16) -> u16 {
    let celsius = i32::from(celsius);
    match config.resolution() {
        Resolution::Bits16 => {
            let code = celsius * SCALE_16_BIT;
            let code = if code < 0 { code + RANGE_16_BIT } else { code };
            code as u16
        }
        Resolution::Bits13 => {
            let code = celsius * SCALE_13_BIT;
            let code = if code < 0 { code + RANGE_13_BIT } else { code };
            (code as u16) << SHIFT_13_BIT
        }
    }
}

/// Convert an ADC code read from a temperature or setpoint register to °C.
pub fn adc_code_to_temperature(code: u16) -> f32 {
    let negative = code & ADC_CODE_SIGN != 0;
    let wide = code & ADC_CODE_16_BIT_MARKER != 0;
    match (negative, wide) {
        (true, true) => (f32::from(code) - RANGE_16_BIT as f32) / SCALE_16_BIT as f32,
        (true, false) => (f32::from(code >> SHIFT_13_BIT) - RANGE_13_BIT as f32) / SCALE_13_BIT as f32,
        (false, true) => f32::from(code) / SCALE_16_BIT as f32,
        (false, false) => f32::from(code >> SHIFT_13_BIT) / SCALE_13_BIT as f32,
    }
}

/// Convert °C to °F
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert °F to °C
pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}
