//! Bridge between the synchronous register access the sensor driver
//! expects and the interrupt-driven bus controller. This is the only place
//! in the system that blocks.

use embedded_hal::delay::DelayNs;

use crate::bus::{BusDirection, BusTransaction, TransactionEngine};
use crate::error::Error;
use crate::sensor::SensorBus;
use crate::signal::CompletionSignal;

/// Room for a register address plus the largest payload we ever move
/// (the 24-byte calibration block leaves plenty of headroom).
const SCRATCH_LEN: usize = 48;

pub struct BusAdapter<'a, E, D> {
    engine: E,
    /// Shared with the engine's completion path, which is the sole writer.
    signal: &'a CompletionSignal,
    scratch: [u8; SCRATCH_LEN],
    delay: D,
}

impl<'a, E, D> BusAdapter<'a, E, D>
where
    E: TransactionEngine,
    D: DelayNs,
{
    pub fn new(engine: E, signal: &'a CompletionSignal, delay: D) -> Self {
        Self {
            engine,
            signal,
            scratch: [0; SCRATCH_LEN],
            delay,
        }
    }

    pub fn release(self) -> (E, D) {
        (self.engine, self.delay)
    }
}

impl<'a, E, D> SensorBus for BusAdapter<'a, E, D>
where
    E: TransactionEngine,
    D: DelayNs,
{
    /// Send `[register, data...]` as one contiguous write; the device
    /// addresses the register implicitly by the first byte of every write.
    fn bus_write(&mut self, device: u8, register: u8, data: &[u8]) -> Result<(), Error> {
        let frame_len = data.len() + 1;
        if frame_len > SCRATCH_LEN {
            return Err(Error::BufferOverrun);
        }
        self.scratch[0] = register;
        self.scratch[1..frame_len].copy_from_slice(data);

        self.signal.clear();
        self.engine.issue(BusTransaction {
            device_address: device,
            register_address: register,
            direction: BusDirection::Write,
            buffer: &mut self.scratch[..frame_len],
        })?;
        let status = self.signal.wait();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::BusFailure(status))
        }
    }

    /// Register-pointer write followed by the data read as one bus
    /// sequence. `out` is only written on success.
    fn bus_read(&mut self, device: u8, register: u8, out: &mut [u8]) -> Result<(), Error> {
        if out.len() > SCRATCH_LEN {
            return Err(Error::BufferOverrun);
        }
        self.signal.clear();
        self.engine.issue(BusTransaction {
            device_address: device,
            register_address: register,
            direction: BusDirection::WriteRead,
            buffer: &mut self.scratch[..out.len()],
        })?;
        let status = self.signal.wait();
        if !status.is_success() {
            return Err(Error::BusFailure(status));
        }
        out.copy_from_slice(&self.scratch[..out.len()]);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
