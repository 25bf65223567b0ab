use bmp_core::bus::{BusDirection, BusStatus, BusTransaction, TransactionEngine};
use bmp_core::error::Error;
use bmp_core::signal::CompletionSignal;
use esp_hal::i2c::master::{AcknowledgeCheckFailedReason, Error as I2cError, I2c};
use esp_hal::Blocking;

/// Transaction engine over the ESP32-S3 I2C master.
///
/// esp-hal services the controller's interrupt internally, so the transfer
/// is already resolved when `write`/`write_read` return; the completion
/// status lands in the signal before `issue` hands back to the waiting
/// adapter, which then observes it without spinning.
pub struct EspI2cEngine {
    i2c: I2c<'static, Blocking>,
    signal: &'static CompletionSignal,
}

impl EspI2cEngine {
    pub fn new(i2c: I2c<'static, Blocking>, signal: &'static CompletionSignal) -> Self {
        Self { i2c, signal }
    }
}

impl TransactionEngine for EspI2cEngine {
    fn issue(&mut self, txn: BusTransaction<'_>) -> Result<(), Error> {
        let result = match txn.direction {
            BusDirection::Write => self.i2c.write(txn.device_address, &*txn.buffer),
            BusDirection::WriteRead => {
                self.i2c
                    .write_read(txn.device_address, &[txn.register_address], txn.buffer)
            }
        };
        self.signal.set(status_of(result));
        Ok(())
    }
}

fn status_of(result: Result<(), I2cError>) -> BusStatus {
    match result {
        Ok(()) => BusStatus::Success,
        Err(I2cError::AcknowledgeCheckFailed(AcknowledgeCheckFailedReason::Data)) => {
            BusStatus::DataNack
        }
        Err(I2cError::AcknowledgeCheckFailed(_)) => BusStatus::AddressNack,
        Err(I2cError::ArbitrationLost) => BusStatus::ArbitrationLost,
        Err(I2cError::Timeout) => BusStatus::Timeout,
        // Everything else (FIFO, command-list and zero-length errors) only
        // arises from malformed transactions; report it as a timeout
        // rather than hiding the failure.
        Err(_) => BusStatus::Timeout,
    }
}
