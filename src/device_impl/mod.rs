#[cfg(feature = "async")]
mod asynch;
#[cfg(feature = "blocking")]
mod blocking;

use crate::hw_def::{Register, THYST_MASK};

/// Pointer byte followed by the value, MSB first
pub(crate) fn pair_frame(reg: Register, value: u16) -> [u8; 3] {
    let [msb, lsb] = value.to_be_bytes();
    [reg.addr(), msb, lsb]
}

/// T_HYST only implements bits 3..0
pub(crate) fn hysteresis_bits(hysteresis_c: i16) -> u8 {
    (hysteresis_c as u8) & THYST_MASK
}
