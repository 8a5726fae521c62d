//! Register map, bus addresses and bit masks of the ADT7420

#[cfg(feature = "defmt")]
use defmt::Format;

/// Content of the identification register
pub const CHIP_ID: u8 = 0xCB;

/// Command byte that triggers a software reset when written on its own
pub const SOFTWARE_RESET_COMMAND: u8 = 0x2F;

/// Lowest threshold temperature accepted by the driver, in °C
pub const MIN_TEMPERATURE_C: i16 = -40;
/// Highest threshold temperature accepted by the driver, in °C
pub const MAX_TEMPERATURE_C: i16 = 150;
/// Lowest hysteresis accepted by the driver, in °C
pub const MIN_HYSTERESIS_C: i16 = 0;
/// Highest hysteresis accepted by the driver, in °C
pub const MAX_HYSTERESIS_C: i16 = 15;

/// Worst-case conversion time of a one-shot measurement
pub const ONE_SHOT_CONVERSION_MS: u32 = 240;

/// Sign bit of a temperature ADC code
pub const ADC_CODE_SIGN: u16 = 0x8000;
/// Bit of a temperature ADC code that is only ever set by the 16-bit layout
pub const ADC_CODE_16_BIT_MARKER: u16 = 0x0080;

pub(crate) const THYST_MASK: u8 = 0x0F;

/// Register addresses
///
/// Threshold and temperature values span two consecutive registers; the variant names the MSB
/// register and the LSB follows at the next address.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Register {
    /// Temperature value, MSB
    TempMsb = 0x00,
    /// Temperature value, LSB
    TempLsb = 0x01,
    /// Status
    Status = 0x02,
    /// Configuration
    Config = 0x03,
    /// T_HIGH setpoint, MSB
    THighMsb = 0x04,
    /// T_HIGH setpoint, LSB
    THighLsb = 0x05,
    /// T_LOW setpoint, MSB
    TLowMsb = 0x06,
    /// T_LOW setpoint, LSB
    TLowLsb = 0x07,
    /// T_CRIT setpoint, MSB
    TCritMsb = 0x08,
    /// T_CRIT setpoint, LSB
    TCritLsb = 0x09,
    /// T_HYST setpoint
    THyst = 0x0A,
    /// Identification
    Id = 0x0B,
}
impl Register {
    /// Register pointer byte
    pub fn addr(self) -> u8 {
        self as u8
    }
}

/// Bit masks of the configuration register
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ConfigFlag {
    /// Number of faults before CT/INT asserts (bits 0-1)
    FaultQueue = 0b0000_0011,
    /// CT pin is active high when set
    CtActiveHigh = 0b0000_0100,
    /// INT pin is active high when set
    IntActiveHigh = 0b0000_1000,
    /// Comparator mode when set, interrupt mode when clear
    ComparatorMode = 0b0001_0000,
    /// Operation mode (bits 5-6); both bits set means shutdown
    OperationMode = 0b0110_0000,
    /// 16-bit resolution when set, 13-bit when clear
    Resolution16Bit = 0b1000_0000,
}
impl ConfigFlag {
    /// Mask value
    pub fn bits(self) -> u8 {
        self as u8
    }
}

pub(crate) const OPERATION_MODE_SHIFT: u8 = 5;

/// Bit masks of the status register
pub(crate) const STATUS_T_LOW: u8 = 1 << 4;
pub(crate) const STATUS_T_HIGH: u8 = 1 << 5;
pub(crate) const STATUS_T_CRIT: u8 = 1 << 6;
pub(crate) const STATUS_NOT_READY: u8 = 1 << 7;

/// I²C address, selected with the A1 and A0 pins
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum I2cAddr {
    /// A1 low, A0 low
    #[default]
    Addr00,
    /// A1 low, A0 high
    Addr01,
    /// A1 high, A0 low
    Addr10,
    /// A1 high, A0 high
    Addr11,
}
impl I2cAddr {
    /// Address for the given strap levels (`true` = high)
    pub fn from_pins(a1: bool, a0: bool) -> Self {
        match (a1, a0) {
            (false, false) => Self::Addr00,
            (false, true) => Self::Addr01,
            (true, false) => Self::Addr10,
            (true, true) => Self::Addr11,
        }
    }

    /// 7-bit bus address
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Addr00 => 0x48,
            Self::Addr01 => 0x49,
            Self::Addr10 => 0x4A,
            Self::Addr11 => 0x4B,
        }
    }
}

/// The given 7-bit address cannot belong to an ADT7420
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidAddress(pub u8);

impl TryFrom<u8> for I2cAddr {
    type Error = InvalidAddress;

    fn try_from(addr: u8) -> Result<Self, Self::Error> {
        match addr {
            0x48 => Ok(Self::Addr00),
            0x49 => Ok(Self::Addr01),
            0x4A => Ok(Self::Addr10),
            0x4B => Ok(Self::Addr11),
            _ => Err(InvalidAddress(addr)),
        }
    }
}
