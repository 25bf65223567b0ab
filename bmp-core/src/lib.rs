#![no_std]

//! Hardware-agnostic core of the BMP280 console station: the transaction
//! bridge that turns the interrupt-driven bus controller into synchronous
//! register access, the acquisition control loop on top of it, and the
//! fixed-point display formatting.

#[cfg(test)]
extern crate std;

pub mod acquisition;
pub mod adapter;
pub mod bus;
pub mod error;
pub mod format;
pub mod sensor;
pub mod signal;

#[cfg(test)]
pub(crate) mod testing;

pub use acquisition::{AcquisitionConfig, AcquisitionController, Reading};
pub use adapter::BusAdapter;
pub use bus::{BusStatus, TransactionEngine};
pub use error::{Error, ErrorTally};
pub use signal::CompletionSignal;
