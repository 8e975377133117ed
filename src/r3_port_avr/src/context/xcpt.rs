//! The exception context
use core::{fmt, mem::offset_of};

use super::imp::{
    Regs, PC_SIZE, REG_PC0, REG_R24, REG_R25, REG_SPH, REG_SPL, REG_SREG, XCPTCONTEXT_REGS,
};
use crate::irq::sreg::SREG_I_MASK;

#[cfg(feature = "rampz")]
use super::imp::REG_RAMPZ;

type Layout = super::imp::RegLayout<super::cfg::Configured>;

/// The program counter and status register of an interrupted context, saved
/// while a signal handler runs in its place.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSnapshot {
    /// The program counter, most significant byte first.
    pub pc: [u8; PC_SIZE],
    #[cfg(feature = "rampz")]
    pub rampz: u8,
    pub sreg: u8,
}

impl SignalSnapshot {
    pub const fn new() -> Self {
        Self {
            pc: [0; PC_SIZE],
            #[cfg(feature = "rampz")]
            rampz: 0,
            sreg: 0,
        }
    }

    /// Get the saved program counter.
    pub fn pc(&self) -> u32 {
        self.pc
            .iter()
            .fold(0, |pc, &byte| (pc << 8) | u32::from(byte))
    }
}

impl Default for SignalSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// The saved machine state of an execution context (a task or an interrupt
/// frame).
///
/// The exception entry code writes the interrupted context's registers to
/// [`regs`](Self::regs) in the order defined by the `REG_*` constants.
/// [`XCPTCONTEXT_REGS_OFFSET`] tells where that array is found.
///
/// There's only one [`SignalSnapshot`]. Because of this, only a single signal
/// handler can be active at a time, and a signal delivered while another
/// handler is still running discards the snapshot of the first one.
#[repr(C)]
#[derive(Clone, PartialEq, Eq)]
pub struct XcptContext {
    pub snapshot: SignalSnapshot,
    pub regs: Regs,
}

/// The offset of [`XcptContext::regs`] in bytes.
pub const XCPTCONTEXT_REGS_OFFSET: usize = offset_of!(XcptContext, regs);

impl Default for XcptContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for XcptContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("XcptContext")
            .field("snapshot", &self.snapshot)
            .field("pc", &format_args!("{:#x}", self.user_pc()))
            .field("sreg", &format_args!("{:#04x}", self.regs[REG_SREG]))
            .field("sp", &format_args!("{:#06x}", self.saved_stack_pointer()))
            .finish_non_exhaustive()
    }
}

impl XcptContext {
    pub const fn new() -> Self {
        Self {
            snapshot: SignalSnapshot::new(),
            regs: [0; XCPTCONTEXT_REGS],
        }
    }

    /// Get the program counter of the interrupted context.
    #[inline]
    pub fn user_pc(&self) -> u32 {
        Layout::user_pc(&self.regs)
    }

    /// Set the address from which the context resumes.
    #[inline]
    pub fn set_user_pc(&mut self, pc: u32) {
        Layout::set_user_pc(&mut self.regs, pc);
    }

    /// Get the stack pointer of the interrupted context as of the exception
    /// entry.
    #[inline]
    pub fn saved_stack_pointer(&self) -> u16 {
        u16::from_be_bytes([self.regs[REG_SPH], self.regs[REG_SPL]])
    }

    /// Get the 16-bit return value register pair (`r25:r24`).
    #[inline]
    pub fn return_value(&self) -> u16 {
        u16::from_le_bytes([self.regs[REG_R24], self.regs[REG_R25]])
    }

    /// Set the 16-bit return value register pair (`r25:r24`).
    #[inline]
    pub fn set_return_value(&mut self, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs[REG_R24] = lo;
        self.regs[REG_R25] = hi;
    }

    /// Copy the program counter and the status registers to
    /// [`snapshot`](Self::snapshot), overwriting the previous one.
    pub fn save_snapshot(&mut self) {
        self.snapshot
            .pc
            .copy_from_slice(&self.regs[REG_PC0..REG_PC0 + PC_SIZE]);
        #[cfg(feature = "rampz")]
        {
            self.snapshot.rampz = self.regs[REG_RAMPZ];
        }
        self.snapshot.sreg = self.regs[REG_SREG];
    }

    /// Copy [`snapshot`](Self::snapshot) back to the register save area.
    pub fn restore_snapshot(&mut self) {
        self.regs[REG_PC0..REG_PC0 + PC_SIZE].copy_from_slice(&self.snapshot.pc);
        #[cfg(feature = "rampz")]
        {
            self.regs[REG_RAMPZ] = self.snapshot.rampz;
        }
        self.regs[REG_SREG] = self.snapshot.sreg;
    }

    /// Make the context resume at `handler` with interrupts disabled, saving
    /// the original program counter and status registers to
    /// [`snapshot`](Self::snapshot).
    ///
    /// The original state is brought back by [`restore_snapshot`] once the
    /// handler is done. If a snapshot is already held, it's lost.
    ///
    /// [`restore_snapshot`]: Self::restore_snapshot
    pub fn prepare_signal_delivery(&mut self, handler: u32) {
        log::trace!(
            "prepare_signal_delivery(handler = {handler:#x}) pc = {:#x}",
            self.user_pc()
        );
        self.save_snapshot();
        self.set_user_pc(handler);
        self.regs[REG_SREG] &= !SREG_I_MASK;
    }
}
