//! The interrupt-enable state primitives.
//!
//! These are what the kernel's CPU Lock and critical sections are made of.
//! There's no finer-grained locking on AVR; the whole core is masked at once,
//! so the time between [`save_and_disable`] and [`restore`] directly bounds the
//! system's worst-case interrupt latency.
use core::fmt;

use super::sreg::{SregAccess, SREG};

/// A value of `SREG` captured by [`save_and_disable`] or [`read_status`].
///
/// It's opaque to the critical section code, which is only supposed to hand
/// it back to [`restore`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct IrqState(u8);

impl IrqState {
    /// Construct an `IrqState` from a raw `SREG` value.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get the raw `SREG` value.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Get `SREG.I`.
    #[inline]
    pub fn is_interrupt_enabled(self) -> bool {
        SREG::I.is_set(self.0)
    }
}

impl fmt::Debug for IrqState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("IrqState")
            .field(&format_args!("{:#04x}", self.0))
            .finish()
    }
}

/// Read `SREG`. This has no side effects.
#[inline(always)]
pub fn read_status(sreg: &(impl SregAccess + ?Sized)) -> IrqState {
    IrqState(sreg.get())
}

/// Set `SREG.I`, making all maskable interrupts deliverable.
///
/// # Safety
///
/// This ends any critical section the caller might be in. Only the kernel's
/// CPU Lock implementation should be calling this.
#[inline(always)]
pub unsafe fn enable_interrupts(sreg: &(impl SregAccess + ?Sized)) {
    sreg.set_i();
}

/// Read `SREG` and clear `SREG.I` in one step, returning the original value
/// of `SREG`.
///
/// The returned token must be passed to exactly one call to [`restore`].
#[inline(always)]
pub fn save_and_disable(sreg: &(impl SregAccess + ?Sized)) -> IrqState {
    IrqState(sreg.fetch_clear_i())
}

/// Write back a token returned by [`save_and_disable`] to `SREG` verbatim.
///
/// # Safety
///
/// `state` must be the token returned by the innermost [`save_and_disable`]
/// call that hasn't been paired with a `restore` call yet.
#[inline(always)]
pub unsafe fn restore(sreg: &(impl SregAccess + ?Sized), state: IrqState) {
    sreg.set(state.0);
}

/// Read the current stack pointer.
#[inline(always)]
pub fn stack_pointer(sreg: &(impl SregAccess + ?Sized)) -> u16 {
    sreg.stack_pointer()
}
