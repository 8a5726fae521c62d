use super::{hysteresis_bits, pair_frame};
use crate::bus::{ensure_idle, BusyFlag, NoBusyFlag};
use crate::codec::{adc_code_to_temperature, celsius_to_fahrenheit, temperature_to_adc_code};
use crate::fmt::{trace, warn};
use crate::hw_def::*;
use crate::types::*;
use crate::validate::{is_valid_temperature, validate_settings};
use crate::{Adt7420, Error};

use embedded_hal::{delay::DelayNs, i2c::I2c};

impl<I2C, E> Adt7420<I2C, NoBusyFlag>
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

impl<I2C, B, E> Adt7420<I2C, B>
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

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), Error<E>> {
        debug_assert!((1..=3).contains(&bytes.len()));
        ensure_idle(&mut self.busy)?;
        trace!("adt7420::transmit(): {:?}", bytes);
        self.i2c.write(self.i2c_addr.as_u8(), bytes).map_err(Error::I2c)
    }

    fn receive(&mut self, pointer: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        debug_assert!((1..=2).contains(&buf.len()));
        ensure_idle(&mut self.busy)?;
        self.i2c.write_read(self.i2c_addr.as_u8(), &[pointer], buf).map_err(Error::I2c)?;
        trace!("adt7420::receive(): pointer={} data={:?}", pointer, buf);
        Ok(())
    }

    /// Write one 8-bit register
    pub fn write_register(&mut self, reg: Register, data: u8) -> Result<(), Error<E>> {
        self.transmit(&[reg.addr(), data])
    }

    /// Read one 8-bit register
    pub fn read_register(&mut self, reg: Register) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.receive(reg.addr(), &mut buf)?;
        Ok(buf[0])
    }

    /// Write a 16-bit value to `reg` and the register after it, MSB first, in one transaction
    pub fn write_register_pair(&mut self, reg: Register, data: u16) -> Result<(), Error<E>> {
        self.transmit(&pair_frame(reg, data))
    }

    /// Read `reg` and the register after it as one big-endian value
    pub fn read_register_pair(&mut self, reg: Register) -> Result<u16, Error<E>> {
        let mut buf = [0u8; 2];
        self.receive(reg.addr(), &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Validate `settings`, check the chip identification, then write the configuration and
    /// the crit, high, low and hysteresis setpoints in that order.
    ///
    /// Nothing is sent when a setting is out of range. The sequence stops at the first failed
    /// write without undoing the earlier ones, so after an error the register state is unknown
    /// and `init` should be repeated from scratch.
    ///
    /// T_HYST is written as a single register holding whole degrees, not as an encoded pair.
    pub fn init(&mut self, settings: &Settings) -> Result<(), Error<E>> {
        if let Err(invalid) = validate_settings(settings) {
            warn!("adt7420::init(): rejected settings {:?}", settings);
            return Err(invalid.into());
        }

        let chip_id = self.read_chip_id()?;
        if chip_id != CHIP_ID {
            warn!("adt7420::init(): chip id 0x{:x}, expected 0x{:x}", chip_id, CHIP_ID);
            return Err(Error::InvalidChipId(chip_id));
        }

        let config = settings.config;
        self.set_config(config)?;
        self.write_register_pair(Register::TCritMsb, temperature_to_adc_code(config, settings.crit_temperature_c))?;
        self.write_register_pair(Register::THighMsb, temperature_to_adc_code(config, settings.high_temperature_c))?;
        self.write_register_pair(Register::TLowMsb, temperature_to_adc_code(config, settings.low_temperature_c))?;
        self.write_register(Register::THyst, hysteresis_bits(settings.hysteresis_c))
    }

    /// Read the identification register
    pub fn read_chip_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::Id)
    }

    /// Reset all registers to their power-on values
    ///
    /// The device needs about 200 µs before it responds again.
    pub fn software_reset(&mut self) -> Result<(), Error<E>> {
        self.transmit(&[SOFTWARE_RESET_COMMAND])
    }

    /// Change the operation mode, leaving the other configuration bits untouched
    pub fn set_operation_mode(&mut self, mode: OperationMode) -> Result<(), Error<E>> {
        let config = self.get_config()?;
        self.set_config(config.with_operation_mode(mode))
    }

    /// Leave shutdown and convert continuously
    pub fn power_on(&mut self) -> Result<(), Error<E>> {
        self.set_operation_mode(OperationMode::Continuous)
    }

    /// Enter shutdown
    ///
    /// Sets only the operation mode bits (0x60); the resolution bit keeps its value.
    pub fn power_down(&mut self) -> Result<(), Error<E>> {
        self.set_operation_mode(OperationMode::Shutdown)
    }

    /// Read the status register
    pub fn get_status(&mut self) -> Result<StatusBits, Error<E>> {
        Ok(StatusBits::from(self.read_register(Register::Status)?))
    }

    /// Read the configuration register
    pub fn get_config(&mut self) -> Result<Config, Error<E>> {
        Ok(Config::from(self.read_register(Register::Config)?))
    }

    /// Write the configuration register, any bit pattern is accepted
    pub fn set_config(&mut self, config: Config) -> Result<(), Error<E>> {
        self.write_register(Register::Config, config.bits())
    }

    fn get_temperature_register(&mut self, reg: Register) -> Result<f32, Error<E>> {
        Ok(adc_code_to_temperature(self.read_register_pair(reg)?))
    }

    /// Latest conversion result in °C
    pub fn get_temperature(&mut self) -> Result<f32, Error<E>> {
        self.get_temperature_register(Register::TempMsb)
    }

    /// Latest conversion result in °F
    pub fn get_temperature_fahrenheit(&mut self) -> Result<f32, Error<E>> {
        Ok(celsius_to_fahrenheit(self.get_temperature()?))
    }

    /// T_LOW setpoint in °C
    pub fn get_low_temperature(&mut self) -> Result<f32, Error<E>> {
        self.get_temperature_register(Register::TLowMsb)
    }

    /// T_HIGH setpoint in °C
    pub fn get_high_temperature(&mut self) -> Result<f32, Error<E>> {
        self.get_temperature_register(Register::THighMsb)
    }

    /// T_CRIT setpoint in °C
    pub fn get_crit_temperature(&mut self) -> Result<f32, Error<E>> {
        self.get_temperature_register(Register::TCritMsb)
    }

    /// T_HYST in °C
    pub fn get_hysteresis(&mut self) -> Result<f32, Error<E>> {
        Ok(f32::from(self.read_register(Register::THyst)? & THYST_MASK))
    }

    fn set_temperature_register(&mut self, reg: Register, celsius: i16) -> Result<(), Error<E>> {
        if !is_valid_temperature(celsius, false) {
            warn!("adt7420: setpoint {} out of range", celsius);
            return Err(Error::InvalidSetting);
        }
        let config = self.get_config()?;
        self.write_register_pair(reg, temperature_to_adc_code(config, celsius))
    }

    /// Set T_LOW, encoded for the resolution currently configured on the device
    pub fn set_low_temperature(&mut self, celsius: i16) -> Result<(), Error<E>> {
        self.set_temperature_register(Register::TLowMsb, celsius)
    }

    /// Set T_HIGH, encoded for the resolution currently configured on the device
    pub fn set_high_temperature(&mut self, celsius: i16) -> Result<(), Error<E>> {
        self.set_temperature_register(Register::THighMsb, celsius)
    }

    /// Set T_CRIT, encoded for the resolution currently configured on the device
    pub fn set_crit_temperature(&mut self, celsius: i16) -> Result<(), Error<E>> {
        self.set_temperature_register(Register::TCritMsb, celsius)
    }

    /// Set T_HYST (0 to 15 °C)
    pub fn set_hysteresis(&mut self, hysteresis_c: i16) -> Result<(), Error<E>> {
        if !is_valid_temperature(hysteresis_c, true) {
            warn!("adt7420: hysteresis {} out of range", hysteresis_c);
            return Err(Error::InvalidSetting);
        }
        self.write_register(Register::THyst, hysteresis_bits(hysteresis_c))
    }

    /// Start a one-shot conversion, wait for it and return the result in °C
    ///
    /// The device returns to shutdown by itself afterwards.
    pub fn read_one_shot(&mut self, delay: &mut impl DelayNs) -> Result<f32, Error<E>> {
        self.set_operation_mode(OperationMode::OneShot)?;
        delay.delay_ms(ONE_SHOT_CONVERSION_MS);
        self.get_temperature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_impl::test_util::NoopDelay;
    use crate::ErrorKind;
    use embedded_hal::i2c::ErrorKind as I2cErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x4B;

    fn device(expectations: &[I2cTransaction]) -> Adt7420<I2cMock> {
        Adt7420::new(I2cMock::new(expectations), I2cAddr::Addr11)
    }

    fn demo_settings() -> Settings {
        Settings {
            config: Config::default()
                .with_resolution(Resolution::Bits16)
                .with_alert_mode(AlertMode::Comparator),
            crit_temperature_c: 30,
            high_temperature_c: 27,
            low_temperature_c: 18,
            hysteresis_c: 2,
        }
    }

    #[test]
    fn busy_bus_sends_nothing() {
        let mut i2c = I2cMock::new(&[]);
        let mut adt = Adt7420::new_with_busy_flag(i2c.clone(), || true, I2cAddr::Addr11);

        assert_eq!(adt.write_register(Register::Config, 0x80), Err(Error::BusBusy));
        assert_eq!(adt.read_register(Register::Config), Err(Error::BusBusy));
        assert_eq!(adt.write_register_pair(Register::THighMsb, 0x1234), Err(Error::BusBusy));
        assert_eq!(adt.read_register_pair(Register::TempMsb), Err(Error::BusBusy));
        assert_eq!(adt.get_temperature().unwrap_err().kind(), ErrorKind::Bus);
        assert_eq!(adt.set_high_temperature(27), Err(Error::BusBusy));
        i2c.done();
    }

    #[test]
    fn busy_flag_is_checked_per_transaction() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(ADDR, vec![0x03], vec![0x80])]);
        let mut calls = 0;
        let busy = move || {
            calls += 1;
            calls > 1
        };
        let mut adt = Adt7420::new_with_busy_flag(i2c.clone(), busy, I2cAddr::Addr11);

        // the config fetch gets through, the setpoint write does not
        assert_eq!(adt.set_low_temperature(10), Err(Error::BusBusy));
        i2c.done();
    }

    #[test]
    fn register_pair_is_written_msb_first() {
        let mut adt = device(&[I2cTransaction::write(ADDR, vec![0x04, 0x12, 0x34])]);
        adt.write_register_pair(Register::THighMsb, 0x1234).unwrap();
        adt.release().done();
    }

    #[test]
    fn register_pair_is_read_msb_first() {
        let mut adt = device(&[I2cTransaction::write_read(ADDR, vec![0x00], vec![0xAB, 0xCD])]);
        assert_eq!(adt.read_register_pair(Register::TempMsb).unwrap(), 0xABCD);
        adt.release().done();
    }

    #[test]
    fn i2c_errors_pass_through() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x00]).with_error(I2cErrorKind::Other),
        ]);
        assert_eq!(adt.get_config(), Err(Error::I2c(I2cErrorKind::Other)));
        adt.release().done();
    }

    #[test]
    fn init_writes_everything_in_order() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x0B], vec![0xCB]),
            I2cTransaction::write(ADDR, vec![0x03, 0x90]),
            I2cTransaction::write(ADDR, vec![0x08, 0x0F, 0x00]),
            I2cTransaction::write(ADDR, vec![0x04, 0x0D, 0x80]),
            I2cTransaction::write(ADDR, vec![0x06, 0x09, 0x00]),
            I2cTransaction::write(ADDR, vec![0x0A, 0x02]),
        ]);
        adt.init(&demo_settings()).unwrap();
        adt.release().done();
    }

    #[test]
    fn init_13_bit_negative_setpoint() {
        let settings = Settings {
            config: Config::default(),
            low_temperature_c: -40,
            ..demo_settings()
        };
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x0B], vec![0xCB]),
            I2cTransaction::write(ADDR, vec![0x03, 0x00]),
            I2cTransaction::write(ADDR, vec![0x08, 0x0F, 0x00]),
            I2cTransaction::write(ADDR, vec![0x04, 0x0D, 0x80]),
            I2cTransaction::write(ADDR, vec![0x06, 0xEC, 0x00]),
            I2cTransaction::write(ADDR, vec![0x0A, 0x02]),
        ]);
        adt.init(&settings).unwrap();
        adt.release().done();
    }

    #[test]
    fn init_rejects_invalid_settings_without_bus_traffic() {
        let mut adt = device(&[]);
        let settings = Settings { crit_temperature_c: 151, ..demo_settings() };
        assert_eq!(adt.init(&settings), Err(Error::InvalidSetting));
        let settings = Settings { hysteresis_c: 16, ..demo_settings() };
        assert_eq!(adt.init(&settings), Err(Error::InvalidSetting));
        adt.release().done();
    }

    #[test]
    fn init_stops_on_wrong_chip_id() {
        let mut adt = device(&[I2cTransaction::write_read(ADDR, vec![0x0B], vec![0xC3])]);
        let err = adt.init(&demo_settings()).unwrap_err();
        assert_eq!(err, Error::InvalidChipId(0xC3));
        assert_eq!(err.kind(), ErrorKind::Bus);
        adt.release().done();
    }

    #[test]
    fn init_stops_when_chip_id_read_fails() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x0B], vec![0x00]).with_error(I2cErrorKind::Other),
        ]);
        assert_eq!(adt.init(&demo_settings()), Err(Error::I2c(I2cErrorKind::Other)));
        adt.release().done();

        let mut i2c = I2cMock::new(&[]);
        let mut adt = Adt7420::new_with_busy_flag(i2c.clone(), || true, I2cAddr::Addr11);
        assert_eq!(adt.init(&demo_settings()), Err(Error::BusBusy));
        i2c.done();
    }

    #[test]
    fn init_stops_at_first_failed_write() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x0B], vec![0xCB]),
            I2cTransaction::write(ADDR, vec![0x03, 0x90]),
            I2cTransaction::write(ADDR, vec![0x08, 0x0F, 0x00]).with_error(I2cErrorKind::Other),
        ]);
        assert_eq!(adt.init(&demo_settings()), Err(Error::I2c(I2cErrorKind::Other)));
        adt.release().done();
    }

    #[test]
    fn set_then_get_high_temperature() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x80]),
            I2cTransaction::write(ADDR, vec![0x04, 0x0D, 0x80]),
            I2cTransaction::write_read(ADDR, vec![0x04], vec![0x0D, 0x80]),
        ]);
        adt.set_high_temperature(27).unwrap();
        assert_eq!(adt.get_high_temperature().unwrap(), 27.0);
        adt.release().done();
    }

    #[test]
    fn setpoints_follow_configured_resolution() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x00]),
            I2cTransaction::write(ADDR, vec![0x06, 0xFF, 0x80]),
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x80]),
            I2cTransaction::write(ADDR, vec![0x08, 0x4B, 0x00]),
            I2cTransaction::write_read(ADDR, vec![0x06], vec![0xFF, 0x80]),
            I2cTransaction::write_read(ADDR, vec![0x08], vec![0x4B, 0x00]),
        ]);
        adt.set_low_temperature(-1).unwrap();
        adt.set_crit_temperature(150).unwrap();
        assert_eq!(adt.get_low_temperature().unwrap(), -1.0);
        assert_eq!(adt.get_crit_temperature().unwrap(), 150.0);
        adt.release().done();
    }

    #[test]
    fn out_of_range_setpoints_skip_the_bus() {
        let mut adt = device(&[]);
        assert_eq!(adt.set_high_temperature(151), Err(Error::InvalidSetting));
        assert_eq!(adt.set_low_temperature(-41), Err(Error::InvalidSetting));
        assert_eq!(adt.set_crit_temperature(i16::MAX), Err(Error::InvalidSetting));
        assert_eq!(adt.set_hysteresis(16), Err(Error::InvalidSetting));
        assert_eq!(adt.set_hysteresis(-1), Err(Error::InvalidSetting));
        adt.release().done();
    }

    #[test]
    fn failed_config_fetch_aborts_setpoint_write() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x00]).with_error(I2cErrorKind::Other),
        ]);
        assert_eq!(adt.set_crit_temperature(100), Err(Error::I2c(I2cErrorKind::Other)));
        adt.release().done();
    }

    #[test]
    fn hysteresis_is_a_single_register() {
        let mut adt = device(&[
            I2cTransaction::write(ADDR, vec![0x0A, 0x0F]),
            I2cTransaction::write_read(ADDR, vec![0x0A], vec![0x0F]),
        ]);
        adt.set_hysteresis(15).unwrap();
        assert_eq!(adt.get_hysteresis().unwrap(), 15.0);
        adt.release().done();
    }

    #[test]
    fn power_down_then_on() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x80]),
            I2cTransaction::write(ADDR, vec![0x03, 0xE0]),
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0xE0]),
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0xE0]),
            I2cTransaction::write(ADDR, vec![0x03, 0x80]),
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x80]),
        ]);
        adt.power_down().unwrap();
        let config = adt.get_config().unwrap();
        assert_eq!(config.operation_mode(), OperationMode::Shutdown);
        assert_eq!(config.resolution(), Resolution::Bits16);
        adt.power_on().unwrap();
        assert_eq!(adt.get_config().unwrap().operation_mode(), OperationMode::Continuous);
        adt.release().done();
    }

    #[test]
    fn set_config_accepts_any_pattern() {
        let mut adt = device(&[I2cTransaction::write(ADDR, vec![0x03, 0xFF])]);
        adt.set_config(Config::from(0xFF)).unwrap();
        adt.release().done();
    }

    #[test]
    fn temperature_readings() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0x0C, 0x80]),
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0xF3, 0x80]),
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0x32, 0x00]),
        ]);
        assert_eq!(adt.get_temperature().unwrap(), 25.0);
        assert_eq!(adt.get_temperature().unwrap(), -25.0);
        assert_eq!(adt.get_temperature_fahrenheit().unwrap(), 212.0);
        adt.release().done();
    }

    #[test]
    fn status_and_chip_id() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x02], vec![0x20]),
            I2cTransaction::write_read(ADDR, vec![0x0B], vec![0xCB]),
        ]);
        let status = adt.get_status().unwrap();
        assert!(status.t_high && status.ready);
        assert_eq!(adt.read_chip_id().unwrap(), CHIP_ID);
        adt.release().done();
    }

    #[test]
    fn software_reset_is_a_bare_command() {
        let mut adt = device(&[I2cTransaction::write(ADDR, vec![0x2F])]);
        adt.software_reset().unwrap();
        adt.release().done();
    }

    #[test]
    fn one_shot_measurement() {
        let mut adt = device(&[
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x60]),
            I2cTransaction::write(ADDR, vec![0x03, 0x20]),
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0x0D, 0x80]),
        ]);
        assert_eq!(adt.read_one_shot(&mut NoopDelay).unwrap(), 27.0);
        adt.release().done();
    }

    #[test]
    fn raw_address_is_checked() {
        let adt = Adt7420::try_new(I2cMock::new(&[]), 0x4A).unwrap();
        assert_eq!(adt.address(), I2cAddr::Addr10);
        adt.release().done();

        let mut i2c = I2cMock::new(&[]);
        let err = Adt7420::try_new(i2c.clone(), 0x50).map(|_| ()).unwrap_err();
        assert_eq!(err, Error::InvalidAddress);
        i2c.done();
    }
}
