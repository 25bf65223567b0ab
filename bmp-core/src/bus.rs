use crate::error::Error;

/// Completion status reported by the bus controller for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusStatus {
    Success,
    AddressNack,
    DataNack,
    ArbitrationLost,
    Timeout,
}

impl BusStatus {
    pub fn is_success(self) -> bool {
        matches!(self, BusStatus::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusDirection {
    /// Send the buffer contents to the device in a single write.
    Write,
    /// Write the register address, then read `buffer.len()` bytes into the
    /// buffer without releasing the bus between the two phases. The BMP280
    /// requires the register pointer write and the data read to be one
    /// uninterrupted sequence.
    WriteRead,
}

/// One bus transaction. Borrows the caller's buffer and never outlives a
/// single adapter call.
///
/// For `Write` the buffer holds the assembled frame to send, register
/// address first. For `WriteRead` the buffer receives the bytes read back.
pub struct BusTransaction<'a> {
    pub device_address: u8,
    pub register_address: u8,
    pub direction: BusDirection,
    pub buffer: &'a mut [u8],
}

/// Driver for the physical bus controller.
///
/// `issue` starts exactly one transaction and returns without waiting for
/// the wire; completion is delivered by storing a [`BusStatus`] into the
/// [`CompletionSignal`](crate::signal::CompletionSignal) shared with the
/// waiting adapter (from interrupt context on hardware). Only one
/// transaction may be outstanding at a time; issuing while one is pending
/// is a caller error the engine does not detect.
pub trait TransactionEngine {
    /// Start the transaction. `Err` means the controller could not accept
    /// it at all; in that case no completion will be signalled.
    fn issue(&mut self, txn: BusTransaction<'_>) -> Result<(), Error>;
}
