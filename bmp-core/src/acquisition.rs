//! Top-level acquisition sequence: configure the device, then sample
//! continuously. Configuration and sampling are best-effort; a failed
//! transaction is tallied and the next cycle proceeds regardless.

use embedded_hal::delay::DelayNs;

use crate::adapter::BusAdapter;
use crate::bus::TransactionEngine;
use crate::error::{Error, ErrorTally};
use crate::sensor::{Bmp280, PowerMode, SamplingProfile, StandbyInterval, ADDRESS_SECONDARY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Uninitialized,
    Configuring,
    SampleCycle,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionConfig {
    pub device_address: u8,
    pub power_mode: PowerMode,
    pub profile: SamplingProfile,
    pub standby: StandbyInterval,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            device_address: ADDRESS_SECONDARY,
            power_mode: PowerMode::Normal,
            profile: SamplingProfile::StandardResolution,
            standby: StandbyInterval::Us500,
        }
    }
}

/// One compensated sample, in display units: hundredths of a degree
/// Celsius and Pascals (which double as hundredths of a hectopascal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub temperature_centi_c: i32,
    pub pressure_pa: u32,
}

pub struct AcquisitionController<'a, E, D>
where
    E: TransactionEngine,
    D: DelayNs,
{
    sensor: Bmp280<BusAdapter<'a, E, D>>,
    config: AcquisitionConfig,
    phase: Phase,
    tally: ErrorTally,
}

impl<'a, E, D> AcquisitionController<'a, E, D>
where
    E: TransactionEngine,
    D: DelayNs,
{
    pub fn new(adapter: BusAdapter<'a, E, D>, config: AcquisitionConfig) -> Self {
        Self {
            sensor: Bmp280::new(adapter, config.device_address),
            config,
            phase: Phase::Uninitialized,
            tally: ErrorTally::default(),
        }
    }

    /// Probe the chip and apply mode, oversampling profile and standby
    /// interval. Failed steps are tallied but do not halt startup; the
    /// controller always ends up in the sample cycle.
    pub fn configure(&mut self) {
        self.phase = Phase::Configuring;
        if let Err(e) = self.sensor.init() {
            self.tally.record(e);
        }
        if self.sensor.set_power_mode(self.config.power_mode).is_err() {
            self.tally.record(Error::ConfigurationFailure);
        }
        if self.sensor.set_sampling_profile(self.config.profile).is_err() {
            self.tally.record(Error::ConfigurationFailure);
        }
        if self.sensor.set_standby_interval(self.config.standby).is_err() {
            self.tally.record(Error::ConfigurationFailure);
        }
        self.phase = Phase::SampleCycle;
    }

    /// One sample cycle: raw temperature, raw pressure, compensation.
    /// On a bus failure the cycle is abandoned, the tally updated and the
    /// error returned; the caller delays and tries again next cycle.
    pub fn sample(&mut self) -> Result<Reading, Error> {
        let raw_temperature = match self.sensor.read_uncompensated_temperature() {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(e)),
        };
        let temperature_centi_c = self.sensor.compensate_temperature(raw_temperature);

        let raw_pressure = match self.sensor.read_uncompensated_pressure() {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(e)),
        };
        let pressure_pa = self.sensor.compensate_pressure(raw_pressure);

        Ok(Reading {
            temperature_centi_c,
            pressure_pa,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tally(&self) -> &ErrorTally {
        &self.tally
    }

    fn fail(&mut self, error: Error) -> Error {
        self.tally.record(error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusStatus;
    use crate::format::split_centi;
    use crate::signal::CompletionSignal;
    use crate::testing::{Expect, MockEngine, NoopDelay};
    use std::string::ToString;
    use std::vec;
    use std::vec::Vec;

    const DEV: u8 = ADDRESS_SECONDARY;

    /// Calibration words of the datasheet's worked example, in register
    /// order (little-endian pairs starting at 0x88).
    const CALIB: [u8; 24] = [
        0x70, 0x6B, // dig_t1 = 27504
        0x43, 0x67, // dig_t2 = 26435
        0x18, 0xFC, // dig_t3 = -1000
        0x7D, 0x8E, // dig_p1 = 36477
        0x43, 0xD6, // dig_p2 = -10685
        0xD0, 0x0B, // dig_p3 = 3024
        0x27, 0x0B, // dig_p4 = 2855
        0x8C, 0x00, // dig_p5 = 140
        0xF9, 0xFF, // dig_p6 = -7
        0x8C, 0x3C, // dig_p7 = 15500
        0xF8, 0xC6, // dig_p8 = -14600
        0x70, 0x17, // dig_p9 = 6000
    ];

    fn configure_script() -> Vec<Expect> {
        vec![
            Expect::WriteRead {
                device: DEV,
                register: 0xD0,
                response: vec![0x58],
                status: BusStatus::Success,
            },
            Expect::WriteRead {
                device: DEV,
                register: 0x88,
                response: CALIB.to_vec(),
                status: BusStatus::Success,
            },
            // Normal mode, then standard-resolution oversampling on top of
            // it, then the shortest standby interval.
            Expect::Write {
                device: DEV,
                frame: vec![0xF4, 0x03],
                status: BusStatus::Success,
            },
            Expect::Write {
                device: DEV,
                frame: vec![0xF4, 0x2F],
                status: BusStatus::Success,
            },
            Expect::Write {
                device: DEV,
                frame: vec![0xF5, 0x00],
                status: BusStatus::Success,
            },
        ]
    }

    fn sample_script() -> Vec<Expect> {
        vec![
            Expect::WriteRead {
                device: DEV,
                register: 0xFA,
                response: vec![0x7E, 0xED, 0x00], // adc_t = 519888
                status: BusStatus::Success,
            },
            Expect::WriteRead {
                device: DEV,
                register: 0xF7,
                response: vec![0x65, 0x5A, 0xC0], // adc_p = 415148
                status: BusStatus::Success,
            },
        ]
    }

    fn controller<'a>(
        signal: &'a CompletionSignal,
        script: Vec<Expect>,
    ) -> AcquisitionController<'a, MockEngine<'a>, NoopDelay> {
        let adapter = BusAdapter::new(MockEngine::new(signal, script), signal, NoopDelay);
        AcquisitionController::new(adapter, AcquisitionConfig::default())
    }

    #[test]
    fn configure_then_sample_produces_datasheet_reading() {
        let mut script = configure_script();
        script.extend(sample_script());
        let signal = CompletionSignal::new();
        let mut acq = controller(&signal, script);

        assert_eq!(acq.phase(), Phase::Uninitialized);
        acq.configure();
        assert_eq!(acq.phase(), Phase::SampleCycle);
        assert_eq!(acq.tally().total(), 0);

        let reading = acq.sample().unwrap();
        assert_eq!(
            reading,
            Reading {
                temperature_centi_c: 2508,
                pressure_pa: 100_656,
            }
        );
        assert_eq!(split_centi(reading.temperature_centi_c).to_string(), "25.0800");
        assert_eq!(split_centi(reading.pressure_pa as i32).to_string(), "1006.5600");
    }

    #[test]
    fn bus_failure_is_tallied_and_next_cycle_recovers() {
        let mut script = configure_script();
        script.push(Expect::WriteRead {
            device: DEV,
            register: 0xFA,
            response: vec![],
            status: BusStatus::Timeout,
        });
        script.extend(sample_script());
        let signal = CompletionSignal::new();
        let mut acq = controller(&signal, script);
        acq.configure();

        assert_eq!(acq.sample(), Err(Error::BusFailure(BusStatus::Timeout)));
        assert_eq!(acq.tally().bus, 1);
        assert_eq!(
            acq.tally().last,
            Some(Error::BusFailure(BusStatus::Timeout))
        );

        // The loop never halts: the following cycle succeeds untouched by
        // the earlier failure.
        let reading = acq.sample().unwrap();
        assert_eq!(reading.temperature_centi_c, 2508);
        assert_eq!(acq.tally().bus, 1);
    }

    #[test]
    fn unknown_chip_is_reported_but_does_not_halt_startup() {
        let script = vec![
            Expect::WriteRead {
                device: DEV,
                register: 0xD0,
                response: vec![0x60], // a BME280, not the chip we expect
                status: BusStatus::Success,
            },
            Expect::Write {
                device: DEV,
                frame: vec![0xF4, 0x03],
                status: BusStatus::Success,
            },
            Expect::Write {
                device: DEV,
                frame: vec![0xF4, 0x2F],
                status: BusStatus::Success,
            },
            Expect::Write {
                device: DEV,
                frame: vec![0xF5, 0x00],
                status: BusStatus::Success,
            },
        ];
        let signal = CompletionSignal::new();
        let mut acq = controller(&signal, script);
        acq.configure();

        assert_eq!(acq.phase(), Phase::SampleCycle);
        assert_eq!(acq.tally().configuration, 1);
        assert_eq!(acq.tally().last, Some(Error::UnknownChip(0x60)));
    }

    #[test]
    fn failed_setup_steps_accumulate_without_short_circuit() {
        let mut script = configure_script();
        // Replace the two ctrl_meas writes with NACKed completions.
        script[2] = Expect::Write {
            device: DEV,
            frame: vec![0xF4, 0x03],
            status: BusStatus::AddressNack,
        };
        script[3] = Expect::Write {
            device: DEV,
            frame: vec![0xF4, 0x2F],
            status: BusStatus::AddressNack,
        };
        let signal = CompletionSignal::new();
        let mut acq = controller(&signal, script);
        acq.configure();

        assert_eq!(acq.tally().configuration, 2);
        assert_eq!(acq.phase(), Phase::SampleCycle);
    }
}
