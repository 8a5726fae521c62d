use crate::hw_def::*;

use core::fmt;

#[cfg(feature="defmt")]
use defmt::Format;

/// Temperature resolution, selects the ADC code scale
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Resolution {
    /// 0.0625 °C per LSB, code in bits 15..3
    #[default]
    Bits13,
    /// 0.0078 °C per LSB
    Bits16,
}

/// Conversion mode of the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OperationMode {
    /// back-to-back conversions
    #[default]
    Continuous,
    /// single conversion, then shutdown
    OneShot,
    /// one conversion per second
    OneSps,
    /// conversions stopped, register access still possible
    Shutdown,
}
impl OperationMode {
    fn field(self) -> u8 {
        match self {
            Self::Continuous => 0b00,
            Self::OneShot => 0b01,
            Self::OneSps => 0b10,
            Self::Shutdown => 0b11,
        }
    }
}

/// Number of consecutive faults before CT/INT asserts
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FaultQueue {
    /// one fault
    #[default]
    One,
    /// two faults
    Two,
    /// three faults
    Three,
    /// four faults
    Four,
}

/// Active level of an alert output
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Polarity {
    /// asserted low (open drain, needs pull-up)
    #[default]
    ActiveLow,
    /// asserted high
    ActiveHigh,
}

/// INT/CT behavior
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AlertMode {
    /// latched until the status register is read
    #[default]
    Interrupt,
    /// follows the temperature, released once back inside the hysteresis band
    Comparator,
}

/// Contents of the configuration register
///
/// Any 8-bit pattern is representable; the typed accessors only interpret the fields.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config(u8);

impl From<u8> for Config {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}
impl From<Config> for u8 {
    fn from(config: Config) -> u8 {
        config.0
    }
}

impl Config {
    /// Config from a raw register value
    pub const fn from_bits(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw register value
    pub fn bits(self) -> u8 {
        self.0
    }

    fn with_field(self, flag: ConfigFlag, value: u8) -> Self {
        Self((self.0 & !flag.bits()) | (value & flag.bits()))
    }

    fn with_flag(self, flag: ConfigFlag, set: bool) -> Self {
        self.with_field(flag, if set { 0xFF } else { 0x00 })
    }

    fn flag(self, flag: ConfigFlag) -> bool {
        self.0 & flag.bits() != 0
    }

    /// Resolution
    pub fn resolution(self) -> Resolution {
        if self.flag(ConfigFlag::Resolution16Bit) {
            Resolution::Bits16
        } else {
            Resolution::Bits13
        }
    }

    /// Copy with the given resolution
    pub fn with_resolution(self, resolution: Resolution) -> Self {
        self.with_flag(ConfigFlag::Resolution16Bit, resolution == Resolution::Bits16)
    }

    /// Operation mode
    pub fn operation_mode(self) -> OperationMode {
        match (self.0 & ConfigFlag::OperationMode.bits()) >> OPERATION_MODE_SHIFT {
            0b00 => OperationMode::Continuous,
            0b01 => OperationMode::OneShot,
            0b10 => OperationMode::OneSps,
            _ => OperationMode::Shutdown,
        }
    }

    /// Copy with the given operation mode
    pub fn with_operation_mode(self, mode: OperationMode) -> Self {
        self.with_field(ConfigFlag::OperationMode, mode.field() << OPERATION_MODE_SHIFT)
    }

    /// Fault queue depth
    pub fn fault_queue(self) -> FaultQueue {
        match self.0 & ConfigFlag::FaultQueue.bits() {
            0b00 => FaultQueue::One,
            0b01 => FaultQueue::Two,
            0b10 => FaultQueue::Three,
            _ => FaultQueue::Four,
        }
    }

    /// Copy with the given fault queue depth
    pub fn with_fault_queue(self, faults: FaultQueue) -> Self {
        let field = match faults {
            FaultQueue::One => 0b00,
            FaultQueue::Two => 0b01,
            FaultQueue::Three => 0b10,
            FaultQueue::Four => 0b11,
        };
        self.with_field(ConfigFlag::FaultQueue, field)
    }

    /// CT pin polarity
    pub fn ct_polarity(self) -> Polarity {
        if self.flag(ConfigFlag::CtActiveHigh) { Polarity::ActiveHigh } else { Polarity::ActiveLow }
    }

    /// Copy with the given CT pin polarity
    pub fn with_ct_polarity(self, polarity: Polarity) -> Self {
        self.with_flag(ConfigFlag::CtActiveHigh, polarity == Polarity::ActiveHigh)
    }

    /// INT pin polarity
    pub fn int_polarity(self) -> Polarity {
        if self.flag(ConfigFlag::IntActiveHigh) { Polarity::ActiveHigh } else { Polarity::ActiveLow }
    }

    /// Copy with the given INT pin polarity
    pub fn with_int_polarity(self, polarity: Polarity) -> Self {
        self.with_flag(ConfigFlag::IntActiveHigh, polarity == Polarity::ActiveHigh)
    }

    /// Interrupt or comparator behavior
    pub fn alert_mode(self) -> AlertMode {
        if self.flag(ConfigFlag::ComparatorMode) { AlertMode::Comparator } else { AlertMode::Interrupt }
    }

    /// Copy with the given interrupt/comparator behavior
    pub fn with_alert_mode(self, mode: AlertMode) -> Self {
        self.with_flag(ConfigFlag::ComparatorMode, mode == AlertMode::Comparator)
    }
}

/// Operating configuration applied by `init`
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Settings {
    /// configuration register
    pub config: Config,
    /// T_CRIT setpoint in °C
    pub crit_temperature_c: i16,
    /// T_HIGH setpoint in °C
    pub high_temperature_c: i16,
    /// T_LOW setpoint in °C
    pub low_temperature_c: i16,
    /// T_HYST in °C
    pub hysteresis_c: i16,
}
/// Power-on register values of the device
impl Default for Settings {
    fn default() -> Self {
        Self {
            config: Config::default(),
            crit_temperature_c: 147,
            high_temperature_c: 64,
            low_temperature_c: 10,
            hysteresis_c: 5,
        }
    }
}

/// Status bits from the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusBits {
    raw: u8,
    /// temperature fell below T_LOW
    pub t_low: bool,
    /// temperature rose above T_HIGH
    pub t_high: bool,
    /// temperature rose above T_CRIT
    pub t_crit: bool,
    /// a conversion result is available in the temperature registers
    pub ready: bool,
}
impl From<u8> for StatusBits {
    fn from(raw: u8) -> Self {
        Self {
            raw,
            t_low: raw & STATUS_T_LOW != 0,
            t_high: raw & STATUS_T_HIGH != 0,
            t_crit: raw & STATUS_T_CRIT != 0,
            ready: raw & STATUS_NOT_READY == 0,
        }
    }
}
impl StatusBits {
    /// Get the raw status bits
    pub fn raw(&self) -> u8 {
        self.raw
    }
}
impl fmt::Display for StatusBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusBits {{ 0x{:02x}; ", self.raw)?;
        if self.t_low {
            write!(f, "t_low ")?;
        }
        if self.t_high {
            write!(f, "t_high ")?;
        }
        if self.t_crit {
            write!(f, "t_crit ")?;
        }
        if self.ready {
            write!(f, "ready ")?;
        }
        write!(f, "}}")
    }
}
