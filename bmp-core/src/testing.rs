//! Scripted bus engine for unit tests, in the expect-transactions style of
//! the embedded-hal mocks: every issued transaction must match the next
//! script entry, and `done` asserts the script ran to completion.

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::bus::{BusDirection, BusStatus, BusTransaction, TransactionEngine};
use crate::error::Error;
use crate::signal::CompletionSignal;

pub enum Expect {
    Write {
        device: u8,
        frame: Vec<u8>,
        status: BusStatus,
    },
    WriteRead {
        device: u8,
        register: u8,
        response: Vec<u8>,
        status: BusStatus,
    },
}

pub struct MockEngine<'a> {
    script: VecDeque<Expect>,
    signal: &'a CompletionSignal,
}

impl<'a> MockEngine<'a> {
    pub fn new(signal: &'a CompletionSignal, script: Vec<Expect>) -> Self {
        Self {
            script: script.into(),
            signal,
        }
    }

    pub fn done(&self) {
        assert!(
            self.script.is_empty(),
            "bus script has {} unconsumed entries",
            self.script.len()
        );
    }
}

impl TransactionEngine for MockEngine<'_> {
    fn issue(&mut self, txn: BusTransaction<'_>) -> Result<(), Error> {
        let expect = self.script.pop_front().expect("unexpected bus transaction");
        match (expect, txn.direction) {
            (
                Expect::Write {
                    device,
                    frame,
                    status,
                },
                BusDirection::Write,
            ) => {
                assert_eq!(txn.device_address, device, "write device address");
                assert_eq!(txn.buffer, frame.as_slice(), "assembled write frame");
                // Completion would arrive from interrupt context on
                // hardware; here it lands before the adapter starts waiting.
                self.signal.set(status);
            }
            (
                Expect::WriteRead {
                    device,
                    register,
                    response,
                    status,
                },
                BusDirection::WriteRead,
            ) => {
                assert_eq!(txn.device_address, device, "read device address");
                assert_eq!(txn.register_address, register, "read register");
                if status.is_success() {
                    assert_eq!(txn.buffer.len(), response.len(), "read length");
                    txn.buffer.copy_from_slice(&response);
                } else {
                    // Garbage in the transfer buffer: the adapter must not
                    // let it reach the caller.
                    txn.buffer.fill(0xAA);
                }
                self.signal.set(status);
            }
            _ => panic!("transaction direction does not match script"),
        }
        Ok(())
    }
}

pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
