//! A simulated status register for hosted targets.
use core::cell::Cell;
use tock_registers::interfaces::{Readable, Writeable};

use super::sreg::{SregAccess, SREG, SREG_I_MASK};

/// An implementation of [`SregAccess`] backed by memory.
///
/// Interrupts raised by [`raise_interrupt`] while `SREG.I` is clear are held
/// pending and get serviced the moment `SREG.I` is set again. Servicing an
/// interrupt leaves `SREG` unchanged, just like a real handler that saves and
/// restores `SREG` and returns with `reti`.
///
/// [`raise_interrupt`]: Self::raise_interrupt
#[derive(Debug)]
pub struct SimulatedSreg {
    sreg: Cell<u8>,
    sp: Cell<u16>,
    pending: Cell<usize>,
    serviced: Cell<usize>,
}

impl Default for SimulatedSreg {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SimulatedSreg {
    /// Construct a `SimulatedSreg` holding the specified `SREG` value.
    pub const fn new(sreg: u8) -> Self {
        Self {
            sreg: Cell::new(sreg),
            // `RAMEND` of ATmega328P
            sp: Cell::new(0x08ff),
            pending: Cell::new(0),
            serviced: Cell::new(0),
        }
    }

    pub fn set_stack_pointer(&self, sp: u16) {
        self.sp.set(sp);
    }

    /// Request an interrupt. It's serviced immediately if `SREG.I` is set.
    pub fn raise_interrupt(&self) {
        log::trace!("raise_interrupt (SREG = {:#04x})", self.sreg.get());
        self.pending.set(self.pending.get() + 1);
        self.service_pending();
    }

    /// Get the number of interrupts requested but not serviced yet.
    pub fn pending_interrupts(&self) -> usize {
        self.pending.get()
    }

    /// Get the number of interrupts serviced so far.
    pub fn serviced_interrupts(&self) -> usize {
        self.serviced.get()
    }

    fn service_pending(&self) {
        while self.is_set(SREG::I) && self.pending.get() > 0 {
            self.pending.set(self.pending.get() - 1);
            self.serviced.set(self.serviced.get() + 1);
            log::trace!("servicing interrupt #{}", self.serviced.get());
        }
    }
}

impl Readable for SimulatedSreg {
    type T = u8;
    type R = SREG::Register;

    fn get(&self) -> u8 {
        self.sreg.get()
    }
}

impl Writeable for SimulatedSreg {
    type T = u8;
    type R = SREG::Register;

    fn set(&self, value: u8) {
        log::trace!("SREG <- {value:#04x}");
        self.sreg.set(value);
        self.service_pending();
    }
}

// Safety: There's no way for an interrupt to be serviced in the middle of
//         `fetch_clear_i`
unsafe impl SregAccess for SimulatedSreg {
    fn set_i(&self) {
        self.set(self.sreg.get() | SREG_I_MASK);
    }

    fn fetch_clear_i(&self) -> u8 {
        let old = self.sreg.get();
        log::trace!("SREG <- {:#04x} (was {old:#04x})", old & !SREG_I_MASK);
        self.sreg.set(old & !SREG_I_MASK);
        old
    }

    fn stack_pointer(&self) -> u16 {
        self.sp.get()
    }
}
