//! BMP280 driver surface: register map, device settings and the Bosch
//! fixed-point compensation of raw readings into hundredths of a degree
//! Celsius and Pascals. No FPU required.

use crate::error::Error;

/// Primary and secondary I2C addresses of the BMP280 (SDO pin selects).
pub const ADDRESS_PRIMARY: u8 = 0x76;
pub const ADDRESS_SECONDARY: u8 = 0x77;

pub const CHIP_ID_BMP280: u8 = 0x58;

mod reg {
    pub const CHIP_ID: u8 = 0xD0;
    pub const RESET: u8 = 0xE0;
    pub const CTRL_MEAS: u8 = 0xF4;
    pub const CONFIG: u8 = 0xF5;
    pub const PRESS_MSB: u8 = 0xF7;
    pub const TEMP_MSB: u8 = 0xFA;
    /// 24 bytes of factory calibration, little-endian words.
    pub const CALIB_START: u8 = 0x88;
}

const CALIB_LEN: usize = 24;

const RESET_VALUE: u8 = 0xB6;
/// Power-on-reset completes within 2 ms.
const RESET_SETTLE_MS: u32 = 2;

/// Synchronous register access the driver expects from the bus layer.
///
/// Implemented by [`BusAdapter`](crate::adapter::BusAdapter); the binding
/// is fixed at construction and never changes for the life of the handle.
pub trait SensorBus {
    fn bus_write(&mut self, device: u8, register: u8, data: &[u8]) -> Result<(), Error>;
    fn bus_read(&mut self, device: u8, register: u8, out: &mut [u8]) -> Result<(), Error>;
    fn delay_ms(&mut self, ms: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerMode {
    Sleep = 0,
    Forced = 1,
    /// Perpetual cycling between measurement and standby periods.
    Normal = 3,
}

/// Temperature/pressure oversampling pairings from the datasheet's
/// recommended use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplingProfile {
    UltraLowPower,
    LowPower,
    StandardResolution,
    HighResolution,
    UltraHighResolution,
}

impl SamplingProfile {
    /// `(osrs_t, osrs_p)` register encodings.
    fn oversampling(self) -> (u8, u8) {
        match self {
            SamplingProfile::UltraLowPower => (1, 1),
            SamplingProfile::LowPower => (1, 2),
            SamplingProfile::StandardResolution => (1, 3),
            SamplingProfile::HighResolution => (2, 4),
            SamplingProfile::UltraHighResolution => (2, 5),
        }
    }
}

/// Inactive time between automatic measurements in Normal mode (t_sb).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StandbyInterval {
    Us500 = 0,
    Us62500 = 1,
    Ms125 = 2,
    Ms250 = 3,
    Ms500 = 4,
    Ms1000 = 5,
    Ms2000 = 6,
    Ms4000 = 7,
}

/// Factory calibration words, read once at init.
#[derive(Debug, Clone, Copy, Default)]
struct Calibration {
    dig_t1: u16,
    dig_t2: i16,
    dig_t3: i16,
    dig_p1: u16,
    dig_p2: i16,
    dig_p3: i16,
    dig_p4: i16,
    dig_p5: i16,
    dig_p6: i16,
    dig_p7: i16,
    dig_p8: i16,
    dig_p9: i16,
}

impl Calibration {
    fn from_registers(raw: &[u8; CALIB_LEN]) -> Self {
        let u = |i: usize| u16::from_le_bytes([raw[i], raw[i + 1]]);
        let s = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]);
        Self {
            dig_t1: u(0),
            dig_t2: s(2),
            dig_t3: s(4),
            dig_p1: u(6),
            dig_p2: s(8),
            dig_p3: s(10),
            dig_p4: s(12),
            dig_p5: s(14),
            dig_p6: s(16),
            dig_p7: s(18),
            dig_p8: s(20),
            dig_p9: s(22),
        }
    }
}

/// Handle to one BMP280 behind a [`SensorBus`]. Created once at startup and
/// kept for the life of the process.
pub struct Bmp280<B: SensorBus> {
    bus: B,
    address: u8,
    chip_id: u8,
    calib: Calibration,
    /// Fine temperature carried from temperature compensation into
    /// pressure compensation, as in the vendor formulas.
    t_fine: i32,
    // Shadow copies of the two settings registers, so each setter writes a
    // full byte without a read-modify-write on the wire.
    ctrl_meas: u8,
    config: u8,
}

impl<B: SensorBus> Bmp280<B> {
    pub fn new(bus: B, address: u8) -> Self {
        Self {
            bus,
            address,
            chip_id: 0,
            calib: Calibration::default(),
            t_fine: 0,
            ctrl_meas: 0,
            config: 0,
        }
    }

    /// Probe the chip-id register and load the factory calibration.
    pub fn init(&mut self) -> Result<(), Error> {
        let mut id = [0u8; 1];
        self.bus.bus_read(self.address, reg::CHIP_ID, &mut id)?;
        if id[0] != CHIP_ID_BMP280 {
            return Err(Error::UnknownChip(id[0]));
        }
        self.chip_id = id[0];

        let mut raw = [0u8; CALIB_LEN];
        self.bus.bus_read(self.address, reg::CALIB_START, &mut raw)?;
        self.calib = Calibration::from_registers(&raw);
        Ok(())
    }

    pub fn chip_id(&self) -> u8 {
        self.chip_id
    }

    /// Soft reset. All settings return to their defaults, so the shadow
    /// registers are dropped too; re-run the configuration afterwards.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.write_register(reg::RESET, RESET_VALUE)?;
        self.bus.delay_ms(RESET_SETTLE_MS);
        self.ctrl_meas = 0;
        self.config = 0;
        Ok(())
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), Error> {
        self.ctrl_meas = (self.ctrl_meas & !0b11) | mode as u8;
        self.write_register(reg::CTRL_MEAS, self.ctrl_meas)
    }

    pub fn set_sampling_profile(&mut self, profile: SamplingProfile) -> Result<(), Error> {
        let (osrs_t, osrs_p) = profile.oversampling();
        self.ctrl_meas = (osrs_t << 5) | (osrs_p << 2) | (self.ctrl_meas & 0b11);
        self.write_register(reg::CTRL_MEAS, self.ctrl_meas)
    }

    pub fn set_standby_interval(&mut self, interval: StandbyInterval) -> Result<(), Error> {
        self.config = (self.config & 0b0001_1111) | ((interval as u8) << 5);
        self.write_register(reg::CONFIG, self.config)
    }

    /// 20-bit raw temperature from 0xFA..0xFC.
    pub fn read_uncompensated_temperature(&mut self) -> Result<i32, Error> {
        self.read_raw20(reg::TEMP_MSB)
    }

    /// 20-bit raw pressure from 0xF7..0xF9.
    pub fn read_uncompensated_pressure(&mut self) -> Result<i32, Error> {
        self.read_raw20(reg::PRESS_MSB)
    }

    /// Raw counts to hundredths of a degree Celsius. Also refreshes the
    /// fine temperature used by [`compensate_pressure`](Self::compensate_pressure),
    /// so call this first in every cycle.
    pub fn compensate_temperature(&mut self, raw: i32) -> i32 {
        let dig_t1 = self.calib.dig_t1 as i32;
        let dig_t2 = self.calib.dig_t2 as i32;
        let dig_t3 = self.calib.dig_t3 as i32;

        let var1 = (((raw >> 3) - (dig_t1 << 1)) * dig_t2) >> 11;
        let var2 = (((((raw >> 4) - dig_t1) * ((raw >> 4) - dig_t1)) >> 12) * dig_t3) >> 14;
        self.t_fine = var1 + var2;
        (self.t_fine * 5 + 128) >> 8
    }

    /// Raw counts to Pascals, 32-bit variant of the vendor formula. Uses
    /// the fine temperature from the most recent temperature compensation.
    pub fn compensate_pressure(&mut self, raw: i32) -> u32 {
        let c = &self.calib;

        let mut var1 = (self.t_fine >> 1) - 64000;
        let mut var2 = (((var1 >> 2) * (var1 >> 2)) >> 11) * c.dig_p6 as i32;
        var2 += (var1 * c.dig_p5 as i32) << 1;
        var2 = (var2 >> 2) + ((c.dig_p4 as i32) << 16);
        var1 = ((((c.dig_p3 as i32) * (((var1 >> 2) * (var1 >> 2)) >> 13)) >> 3)
            + (((c.dig_p2 as i32) * var1) >> 1))
            >> 18;
        var1 = ((32768 + var1) * c.dig_p1 as i32) >> 15;
        if var1 == 0 {
            return 0;
        }

        // u32 arithmetic wraps in the vendor formula; keep that behavior
        // instead of panicking under debug overflow checks.
        let mut p = 1_048_576u32
            .wrapping_sub(raw as u32)
            .wrapping_sub((var2 >> 12) as u32)
            .wrapping_mul(3125);
        if p < 0x8000_0000 {
            p = (p << 1) / var1 as u32;
        } else {
            p = (p / var1 as u32) * 2;
        }

        var1 = ((c.dig_p9 as i32) * ((((p >> 3) * (p >> 3)) >> 13) as i32)) >> 12;
        var2 = ((p >> 2) as i32 * c.dig_p8 as i32) >> 13;
        (p as i32 + ((var1 + var2 + c.dig_p7 as i32) >> 4)) as u32
    }

    fn read_raw20(&mut self, register: u8) -> Result<i32, Error> {
        let mut data = [0u8; 3];
        self.bus.bus_read(self.address, register, &mut data)?;
        Ok(((data[0] as i32) << 12) | ((data[1] as i32) << 4) | ((data[2] as i32) >> 4))
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error> {
        self.bus.bus_write(self.address, register, &[value])
    }
}
