use super::{hysteresis_bits, pair_frame};
use crate::bus::{ensure_idle, BusyFlag, NoBusyFlag};
use crate::codec::{adc_code_to_temperature, celsius_to_fahrenheit, temperature_to_adc_code};
use crate::fmt::{trace, warn};
use crate::hw_def::*;
use crate::types::*;
use crate::validate::{is_valid_temperature, validate_settings};
use crate::{Adt7420Async, Error};

use embedded_hal_async::{delay::DelayNs, i2c::I2c};

impl<I2C, E> Adt7420Async<I2C, NoBusyFlag>
where
    I2C: I2c<Error = E>,
{
    /// Create a new ADT7420 driver instance on a bus without busy indication
    pub fn new(i2c: I2C, i2c_addr: I2cAddr) -> Self {
        Self::new_with_busy_flag(i2c, NoBusyFlag, i2c_addr)
    }

    /// Create a new driver instance from a raw 7-bit address
    pub fn try_new(i2c: I2C, i2c_addr: u8) -> Result<Self, Error<E>> {
        Ok(Self::new(i2c, I2cAddr::try_from(i2c_addr)?))
    }
}

// Mirrors the blocking driver; see `Adt7420` for the behavior of each operation.
impl<I2C, B, E> Adt7420Async<I2C, B>
where
    I2C: I2c<Error = E>,
    B: BusyFlag,
{
    /// Create a new ADT7420 driver instance that checks `busy` before every transaction
    pub fn new_with_busy_flag(i2c: I2C, busy: B, i2c_addr: I2cAddr) -> Self {
        Self { i2c, busy, i2c_addr }
    }

    /// Destroy the driver and return the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// The address this instance talks to
    pub fn address(&self) -> I2cAddr {
        self.i2c_addr
    }

    async fn transmit(&mut self, bytes: &[u8]) -> Result<(), Error<E>> {
        debug_assert!((1..=3).contains(&bytes.len()));
        ensure_idle(&mut self.busy)?;
        trace!("adt7420::transmit(): {:?}", bytes);
        self.i2c.write(self.i2c_addr.as_u8(), bytes).await.map_err(Error::I2c)
    }

    async fn receive(&mut self, pointer: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        debug_assert!((1..=2).contains(&buf.len()));
        ensure_idle(&mut self.busy)?;
        self.i2c.write_read(self.i2c_addr.as_u8(), &[pointer], buf).await.map_err(Error::I2c)?;
        trace!("adt7420::receive(): pointer={} data={:?}", pointer, buf);
        Ok(())
    }

    /// Write one 8-bit register
    pub async fn write_register(&mut self, reg: Register, data: u8) -> Result<(), Error<E>> {
        self.transmit(&[reg.addr(), data]).await
    }

    /// Read one 8-bit register
    pub async fn read_register(&mut self, reg: Register) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.receive(reg.addr(), &mut buf).await?;
        Ok(buf[0])
    }

    /// Write a 16-bit value to `reg` and the register after it, MSB first, in one transaction
    pub async fn write_register_pair(&mut self, reg: Register, data: u16) -> Result<(), Error<E>> {
        self.transmit(&pair_frame(reg, data)).await
    }

    /// Read `reg` and the register after it as one big-endian value
    pub async fn read_register_pair(&mut self, reg: Register) -> Result<u16, Error<E>> {
        let mut buf = [0u8; 2];
        self.receive(reg.addr(), &mut buf).await?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Validate `settings`, check the chip identification, then write the configuration and
    /// the crit, high, low and hysteresis setpoints in that order, stopping at the first error.
    ///
    /// T_HYST is written as a single register holding whole degrees, not as an encoded pair.
    pub async fn init(&mut self, settings: &Settings) -> Result<(), Error<E>> {
        if let Err(invalid) = validate_settings(settings) {
            warn!("adt7420::init(): rejected settings {:?}", settings);
            return Err(invalid.into());
        }

        let chip_id = self.read_chip_id().await?;
        if chip_id != CHIP_ID {
            warn!("adt7420::init(): chip id 0x{:x}, expected 0x{:x}", chip_id, CHIP_ID);
            return Err(Error::InvalidChipId(chip_id));
        }

        let config = settings.config;
        self.set_config(config).await?;
        self.write_register_pair(Register::TCritMsb, temperature_to_adc_code(config, settings.crit_temperature_c)).await?;
        self.write_register_pair(Register::THighMsb, temperature_to_adc_code(config, settings.high_temperature_c)).await?;
        self.write_register_pair(Register::TLowMsb, temperature_to_adc_code(config, settings.low_temperature_c)).await?;
        self.write_register(Register::THyst, hysteresis_bits(settings.hysteresis_c)).await
    }

    /// Read the identification register
    pub async fn read_chip_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::Id).await
    }

    /// Reset all registers to their power-on values
    pub async fn software_reset(&mut self) -> Result<(), Error<E>> {
        self.transmit(&[SOFTWARE_RESET_COMMAND]).await
    }

    /// Change the operation mode, leaving the other configuration bits untouched
    pub async fn set_operation_mode(&mut self, mode: OperationMode) -> Result<(), Error<E>> {
        let config = self.get_config().await?;
        self.set_config(config.with_operation_mode(mode)).await
    }

    /// Leave shutdown and convert continuously
    pub async fn power_on(&mut self) -> Result<(), Error<E>> {
        self.set_operation_mode(OperationMode::Continuous).await
    }

    /// Enter shutdown
    ///
    /// Sets only the operation mode bits (0x60); the resolution bit keeps its value.
    pub async fn power_down(&mut self) -> Result<(), Error<E>> {
        self.set_operation_mode(OperationMode::Shutdown).await
    }

    /// Read the status register
    pub async fn get_status(&mut self) -> Result<StatusBits, Error<E>> {
        Ok(StatusBits::from(self.read_register(Register::Status).await?))
    }

    /// Read the configuration register
    pub async fn get_config(&mut self) -> Result<Config, Error<E>> {
        Ok(Config::from(self.read_register(Register::Config).await?))
    }

    /// Write the configuration register, any bit pattern is accepted
    pub async fn set_config(&mut self, config: Config) -> Result<(), Error<E>> {
        self.write_register(Register::Config, config.bits()).await
    }

    async fn get_temperature_register(&mut self, reg: Register) -> Result<f32, Error<E>> {
        Ok(adc_code_to_temperature(self.read_register_pair(reg).await?))
    }

    /// Latest conversion result in °C
    pub async fn get_temperature(&mut self) -> Result<f32, Error<E>> {
        self.get_temperature_register(Register::TempMsb).await
    }

    /// Latest conversion result in °F
    pub async fn get_temperature_fahrenheit(&mut self) -> Result<f32, Error<E>> {
        Ok(celsius_to_fahrenheit(self.get_temperature().await?))
    }

    /// T_LOW setpoint in °C
    pub async fn get_low_temperature(&mut self) -> Result<f32, Error<E>> {
        self.get_temperature_register(Register::TLowMsb).await
    }

    /// T_HIGH setpoint in °C
    pub async fn get_high_temperature(&mut self) -> Result<f32, Error<E>> {
        self.get_temperature_register(Register::THighMsb).await
    }

    /// T_CRIT setpoint in °C
    pub async fn get_crit_temperature(&mut self) -> Result<f32, Error<E>> {
        self.get_temperature_register(Register::TCritMsb).await
    }

    /// T_HYST in °C
    pub async fn get_hysteresis(&mut self) -> Result<f32, Error<E>> {
        Ok(f32::from(self.read_register(Register::THyst).await? & THYST_MASK))
    }

    async fn set_temperature_register(&mut self, reg: Register, celsius: i16) -> Result<(), Error<E>> {
        if !is_valid_temperature(celsius, false) {
            warn!("adt7420: setpoint {} out of range", celsius);
            return Err(Error::InvalidSetting);
        }
        let config = self.get_config().await?;
        self.write_register_pair(reg, temperature_to_adc_code(config, celsius)).await
    }

    /// Set T_LOW, encoded for the resolution currently configured on the device
    pub async fn set_low_temperature(&mut self, celsius: i16) -> Result<(), Error<E>> {
        self.set_temperature_register(Register::TLowMsb, celsius).await
    }

    /// Set T_HIGH, encoded for the resolution currently configured on the device
    pub async fn set_high_temperature(&mut self, celsius: i16) -> Result<(), Error<E>> {
        self.set_temperature_register(Register::THighMsb, celsius).await
    }

    /// Set T_CRIT, encoded for the resolution currently configured on the device
    pub async fn set_crit_temperature(&mut self, celsius: i16) -> Result<(), Error<E>> {
        self.set_temperature_register(Register::TCritMsb, celsius).await
    }

    /// Set T_HYST (0 to 15 °C)
    pub async fn set_hysteresis(&mut self, hysteresis_c: i16) -> Result<(), Error<E>> {
        if !is_valid_temperature(hysteresis_c, true) {
            warn!("adt7420: hysteresis {} out of range", hysteresis_c);
            return Err(Error::InvalidSetting);
        }
        self.write_register(Register::THyst, hysteresis_bits(hysteresis_c)).await
    }

    /// Start a one-shot conversion, wait for it and return the result in °C
    pub async fn read_one_shot(&mut self, delay: &mut impl DelayNs) -> Result<f32, Error<E>> {
        self.set_operation_mode(OperationMode::OneShot).await?;
        delay.delay_ms(ONE_SHOT_CONVERSION_MS).await;
        self.get_temperature().await
    }
}
