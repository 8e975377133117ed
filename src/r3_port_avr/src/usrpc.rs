//! Saved program counter extraction
use core::fmt;

use crate::context::{cfg::Configured, imp::RegLayout, imp::Regs, xcpt::XcptContext};

/// A reference to the register save area of the most recently interrupted
/// execution context.
///
/// This is created by the exception entry path, which is the only party that
/// knows where the registers were saved, and is passed down the dispatch path
/// to whoever needs it. The referenced registers are only meaningful until
/// interrupts are enabled again or the next exception is taken.
#[derive(Clone, Copy)]
pub struct CurrentRegs<'a> {
    regs: &'a Regs,
}

impl<'a> CurrentRegs<'a> {
    /// Construct a `CurrentRegs` referring to `regs`.
    #[inline]
    pub const fn new(regs: &'a Regs) -> Self {
        Self { regs }
    }

    /// Get the referenced register save area.
    #[inline]
    pub const fn regs(self) -> &'a Regs {
        self.regs
    }

    /// Equivalent to [`current_user_pc`]`(regs, self)`.
    #[inline]
    pub fn user_pc(self, regs: Option<&Regs>) -> u32 {
        current_user_pc(regs, self)
    }
}

impl<'a> From<&'a XcptContext> for CurrentRegs<'a> {
    #[inline]
    fn from(ctx: &'a XcptContext) -> Self {
        Self::new(&ctx.regs)
    }
}

impl fmt::Debug for CurrentRegs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CurrentRegs")
            .field(&(self.regs as *const Regs))
            .finish()
    }
}

/// Get the program counter saved in `regs`, or in the register save area
/// referred to by `current` if `regs` is `None`.
///
/// The bytes are combined most significant byte first. For a 3-byte program
/// counter, the result is `regs[REG_PC0] << 16 | regs[REG_PC1] << 8 |
/// regs[REG_PC2]`.
#[inline]
pub fn current_user_pc(regs: Option<&Regs>, current: CurrentRegs<'_>) -> u32 {
    RegLayout::<Configured>::user_pc(regs.unwrap_or(current.regs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::imp::{REG_PC0, REG_PC1, XCPTCONTEXT_REGS};
    use quickcheck_macros::quickcheck;

    fn regs_from(bytes: &[u8]) -> Regs {
        let mut regs = [0; XCPTCONTEXT_REGS];
        for (reg, &byte) in regs.iter_mut().zip(bytes.iter().cycle()) {
            *reg = byte;
        }
        regs
    }

    #[cfg(feature = "pc-22bit")]
    #[test]
    fn explicit_buffer() {
        use crate::context::imp::REG_PC2;
        let mut regs = [0; XCPTCONTEXT_REGS];
        let other = [0xff; XCPTCONTEXT_REGS];
        regs[REG_PC0] = 0x01;
        regs[REG_PC1] = 0x02;
        regs[REG_PC2] = 0x03;
        assert_eq!(current_user_pc(Some(&regs), CurrentRegs::new(&other)), 0x010203);
    }

    #[cfg(not(feature = "pc-22bit"))]
    #[test]
    fn explicit_buffer() {
        let mut regs = [0; XCPTCONTEXT_REGS];
        let other = [0xff; XCPTCONTEXT_REGS];
        regs[REG_PC0] = 0x12;
        regs[REG_PC1] = 0x34;
        assert_eq!(current_user_pc(Some(&regs), CurrentRegs::new(&other)), 0x1234);
    }

    #[test]
    fn current_regs_from_context() {
        let mut ctx = XcptContext::new();
        ctx.set_user_pc(0x1abc);
        let current = CurrentRegs::from(&ctx);
        assert_eq!(current.user_pc(None), 0x1abc);
        assert!(core::ptr::eq(current.regs(), &ctx.regs));
    }

    #[quickcheck]
    fn qc_current_matches_explicit(bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        let regs = regs_from(&bytes);
        let current = CurrentRegs::new(&regs);
        assert_eq!(
            current_user_pc(None, current),
            current_user_pc(Some(&regs), current)
        );
        assert_eq!(current.user_pc(None), current_user_pc(Some(&regs), current));
    }
}
