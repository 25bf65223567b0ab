use crate::bus::BusStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The bus transaction completed with a non-success status.
    BusFailure(BusStatus),
    /// A device setup step could not be applied.
    ConfigurationFailure,
    /// The chip-id register returned something other than a BMP280.
    UnknownChip(u8),
    /// Payload too large for the adapter's transaction buffer.
    BufferOverrun,
}

/// Running failure counters kept by the acquisition controller.
///
/// Sampling is best-effort and never halts on a failed transaction; this
/// tally is how those failures stay observable instead of vanishing into a
/// write-only accumulator.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorTally {
    pub configuration: u32,
    pub bus: u32,
    pub last: Option<Error>,
}

impl ErrorTally {
    pub fn record(&mut self, error: Error) {
        match error {
            Error::BusFailure(_) => self.bus += 1,
            Error::ConfigurationFailure | Error::UnknownChip(_) | Error::BufferOverrun => {
                self.configuration += 1
            }
        }
        self.last = Some(error);
    }

    pub fn total(&self) -> u32 {
        self.configuration + self.bus
    }
}
