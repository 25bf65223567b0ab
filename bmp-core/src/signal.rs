use core::cell::Cell;
use core::hint;

use critical_section::Mutex;

use crate::bus::BusStatus;

/// Single-slot completion mailbox bridging interrupt and foreground context.
///
/// The completion path (an ISR on hardware) is the sole writer via [`set`];
/// the bus adapter clears the slot before issuing a transaction and then
/// spin-waits on it. There is no scheduler between the ISR and the
/// foreground loop on the target, so [`wait`] busy-polls rather than
/// parking. The value is only meaningful between an issue and the next
/// [`clear`].
///
/// [`set`]: CompletionSignal::set
/// [`clear`]: CompletionSignal::clear
/// [`wait`]: CompletionSignal::wait
pub struct CompletionSignal {
    slot: Mutex<Cell<Option<BusStatus>>>,
}

impl CompletionSignal {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Empty the slot. Called by the adapter before every new transaction.
    pub fn clear(&self) {
        critical_section::with(|cs| self.slot.borrow(cs).set(None));
    }

    /// Store the completion status. Called exactly once per transaction,
    /// from the completion path.
    pub fn set(&self, status: BusStatus) {
        critical_section::with(|cs| self.slot.borrow(cs).set(Some(status)));
    }

    /// Non-blocking check of the slot.
    pub fn poll(&self) -> Option<BusStatus> {
        critical_section::with(|cs| self.slot.borrow(cs).get())
    }

    /// Spin until the completion path has stored a status, then return it.
    ///
    /// Never returns before a `set` that follows the last `clear`. Has no
    /// timeout: the bus controller is required to always eventually signal
    /// completion, success or failure.
    pub fn wait(&self) -> BusStatus {
        loop {
            if let Some(status) = self.poll() {
                return status;
            }
            hint::spin_loop();
        }
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}
