//! The status register (`SREG`) and the boundary through which it's accessed.
use tock_registers::interfaces::{Readable, Writeable};

tock_registers::register_bitfields! {u8,
    pub SREG [
        /// Carry Flag
        C OFFSET(0) NUMBITS(1) [],
        /// Zero Flag
        Z OFFSET(1) NUMBITS(1) [],
        /// Negative Flag
        N OFFSET(2) NUMBITS(1) [],
        /// Two's Complement Overflow Flag
        V OFFSET(3) NUMBITS(1) [],
        /// Sign Bit
        S OFFSET(4) NUMBITS(1) [],
        /// Half Carry Flag
        H OFFSET(5) NUMBITS(1) [],
        /// Bit Copy Storage
        T OFFSET(6) NUMBITS(1) [],
        /// Global Interrupt Enable
        I OFFSET(7) NUMBITS(1) []
    ]
}

/// The bit mask of `SREG.I`.
pub const SREG_I_MASK: u8 = 1 << SREG::I.shift;

/// Provides access to `SREG` and the stack pointer.
///
/// This is the only place where the port touches the hardware. Everything in
/// [`crate::irq::imp`] is written in terms of this trait.
///
/// # Safety
///
///  - [`fetch_clear_i`] must read `SREG` and clear `SREG.I` in a way that an
///    interrupt taken in between cannot make the returned value stale.
///  - `get` and `set` must read and write the whole `SREG` without altering
///    any bit other than the ones being written.
///
/// [`fetch_clear_i`]: Self::fetch_clear_i
pub unsafe trait SregAccess:
    Readable<T = u8, R = SREG::Register> + Writeable<T = u8, R = SREG::Register>
{
    /// Set `SREG.I`.
    fn set_i(&self);

    /// Clear `SREG.I`, returning the original value of `SREG`.
    fn fetch_clear_i(&self) -> u8;

    /// Read the stack pointer (`SPH:SPL`).
    fn stack_pointer(&self) -> u16;
}

#[cfg(target_arch = "avr")]
pub use self::hw::*;

#[cfg(target_arch = "avr")]
mod hw {
    use core::arch::asm;
    use tock_registers::interfaces::{Readable, Writeable};

    use super::SregAccess;

    /// Status Register
    pub const SREG: SregAccessor = SregAccessor;

    /// The hardware implementation of [`SregAccess`].
    #[derive(Debug, Clone, Copy)]
    pub struct SregAccessor;

    impl Readable for SregAccessor {
        type T = u8;
        type R = super::SREG::Register;

        /// `in {out_reg}, SREG`
        #[inline(always)]
        fn get(&self) -> u8 {
            let sreg: u8;
            unsafe {
                asm!(
                    "in {sreg}, 0x3f",
                    sreg = out(reg) sreg,
                    options(nomem, nostack, preserves_flags),
                )
            };
            sreg
        }
    }

    impl Writeable for SregAccessor {
        type T = u8;
        type R = super::SREG::Register;

        /// `out SREG, {in_reg}`
        #[inline(always)]
        fn set(&self, value: u8) {
            // Not `nomem`: this must also act as a compiler barrier when it
            // sets `SREG.I`
            unsafe { asm!("out 0x3f, {value}", value = in(reg) value, options(nostack)) };
        }
    }

    // Safety: `in` followed by `cli` is safe against interrupts because every
    //         interrupt handler returns with `SREG` restored
    unsafe impl SregAccess for SregAccessor {
        #[inline(always)]
        fn set_i(&self) {
            unsafe { asm!("sei", options(nostack)) };
        }

        #[inline(always)]
        fn fetch_clear_i(&self) -> u8 {
            let sreg: u8;
            unsafe {
                asm!(
                    "in {sreg}, 0x3f",
                    "cli",
                    sreg = out(reg) sreg,
                    options(nostack),
                )
            };
            sreg
        }

        #[inline(always)]
        fn stack_pointer(&self) -> u16 {
            let spl: u8;
            let sph: u8;
            unsafe {
                asm!(
                    "in {spl}, 0x3d",
                    "in {sph}, 0x3e",
                    spl = out(reg) spl,
                    sph = out(reg) sph,
                    options(nomem, nostack, preserves_flags),
                )
            };
            u16::from_be_bytes([sph, spl])
        }
    }
}
