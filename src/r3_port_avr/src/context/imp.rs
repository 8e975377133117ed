//! The layout of the register save area.
use core::{marker::PhantomData, ops::Range};

use super::cfg::{Configured, CoreOptions};

/// The slot of `SPH` (the stack pointer on exception entry, upper byte).
pub const REG_SPH: usize = 0;
/// The slot of `SPL`.
pub const REG_SPL: usize = 1;
/// The slot of `r27`.
pub const REG_R27: usize = 2;
/// The slot of `r26`.
pub const REG_R26: usize = 3;
/// The slot of `r31`.
pub const REG_R31: usize = 4;
/// The slot of `r30`.
pub const REG_R30: usize = 5;
/// The slot of `r29`.
pub const REG_R29: usize = 6;
/// The slot of `r28`.
pub const REG_R28: usize = 7;

// `r23` down to `r0` occupy the slots `8..32`. `r1` is the "zero" register.
seq_macro::seq!(N in 0..=23 {
    #[doc = concat!("The slot of `r", stringify!(N), "`.")]
    pub const REG_R~N: usize = 31 - N;
});

/// The number of slots that precede the optional `RAMPZ` slot. Their indices
/// don't depend on the variant.
pub const NUM_FIXED_LOW_REGS: usize = 32;

#[doc = svgbobdoc::transform!(
/// The register save area layout of the core variant described by `Options`.
///
/// Every index is an associated constant, so the layout costs nothing at run
/// time. Using it with an `Options` whose `PC_SIZE` is neither `2` nor `3`
/// fails to compile.
///
/// <center>
/// ```svgbob
///   0     2     4           8                       31    32      33+k  35+k        37+k
///  .-----+-----+-----------+-------------------------+-----+-------+-----------+-----+-----+-----.
///  | SPH | R27 | R31 … R28 |       R23 … R2          | R0  | RAMPZ | SREG R25  | PC0 | PC1 | PC2 |
///  | SPL | R26 |           |                    R1   |     |  "?"  |      R24  |     |     | "?" |
///  '-----+-----+-----------+-------------------------+-----+-------+-----------+-----+-----+-----'
///                                                           k = 1 if RAMPZ is present, else 0
/// ```
/// </center>
///
/// The program counter always occupies the last slots, most significant byte
/// first.
)]
pub struct RegLayout<Options>(PhantomData<Options>);

impl<Options: CoreOptions> RegLayout<Options> {
    /// The size of the program counter in bytes.
    pub const PC_SIZE: usize = {
        assert!(
            Options::PC_SIZE == 2 || Options::PC_SIZE == 3,
            "`PC_SIZE` must be `2` or `3`"
        );
        Options::PC_SIZE
    };

    /// The amount by which the slots from `SREG` onward are shifted.
    const OFFSET_RAMPZ: usize = Options::HAS_RAMPZ as usize;

    /// The slot of `RAMPZ`, which is used by the `ELPM` instruction.
    pub const REG_RAMPZ: Option<usize> = if Options::HAS_RAMPZ {
        Some(NUM_FIXED_LOW_REGS)
    } else {
        None
    };

    /// The slot of `SREG`.
    pub const REG_SREG: usize = NUM_FIXED_LOW_REGS + Self::OFFSET_RAMPZ;
    /// The slot of `r25`.
    pub const REG_R25: usize = Self::REG_SREG + 1;
    /// The slot of `r24`.
    pub const REG_R24: usize = Self::REG_SREG + 2;

    /// The slot of the most significant byte of the program counter, which is
    /// pushed by the hardware on interrupt entry.
    pub const REG_PC0: usize = Self::REG_SREG + 3;
    /// The slot of the second byte of the program counter.
    pub const REG_PC1: usize = Self::REG_PC0 + 1;
    /// The slot of the least significant byte of a 3-byte program counter.
    pub const REG_PC2: Option<usize> = if Self::PC_SIZE == 3 {
        Some(Self::REG_PC0 + 2)
    } else {
        None
    };

    /// The slots of the program counter.
    pub const PC_RANGE: Range<usize> = Self::REG_PC0..Self::XCPTCONTEXT_REGS;

    /// The size of the register save area.
    pub const XCPTCONTEXT_REGS: usize = Self::REG_PC0 + Self::PC_SIZE;

    /// Assemble the saved program counter from `regs`.
    ///
    /// # Panics
    ///
    /// `regs` must be at least [`Self::XCPTCONTEXT_REGS`] bytes long.
    #[inline]
    pub fn user_pc(regs: &[u8]) -> u32 {
        regs[Self::PC_RANGE]
            .iter()
            .fold(0, |pc, &byte| (pc << 8) | u32::from(byte))
    }

    /// Store `pc` to the program counter slots of `regs`. The bits that don't
    /// fit are discarded.
    ///
    /// # Panics
    ///
    /// `regs` must be at least [`Self::XCPTCONTEXT_REGS`] bytes long.
    #[inline]
    pub fn set_user_pc(regs: &mut [u8], pc: u32) {
        let bytes = pc.to_be_bytes();
        regs[Self::PC_RANGE].copy_from_slice(&bytes[bytes.len() - Self::PC_SIZE..]);
    }
}

type Layout = RegLayout<Configured>;

/// The size of the program counter in bytes.
pub const PC_SIZE: usize = Layout::PC_SIZE;

/// The slot of `RAMPZ`.
#[cfg(feature = "rampz")]
pub const REG_RAMPZ: usize = match Layout::REG_RAMPZ {
    Some(i) => i,
    None => unreachable!(),
};

/// The slot of `SREG`.
pub const REG_SREG: usize = Layout::REG_SREG;
/// The slot of `r25`.
pub const REG_R25: usize = Layout::REG_R25;
/// The slot of `r24`.
pub const REG_R24: usize = Layout::REG_R24;
/// The slot of the most significant byte of the program counter.
pub const REG_PC0: usize = Layout::REG_PC0;
/// The slot of the second byte of the program counter.
pub const REG_PC1: usize = Layout::REG_PC1;

/// The slot of the least significant byte of the program counter.
#[cfg(feature = "pc-22bit")]
pub const REG_PC2: usize = match Layout::REG_PC2 {
    Some(i) => i,
    None => unreachable!(),
};

/// The size of the register save area.
pub const XCPTCONTEXT_REGS: usize = Layout::XCPTCONTEXT_REGS;

/// A register save area of this build's core variant.
pub type Regs = [u8; XCPTCONTEXT_REGS];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::cfg::{Avr5, Avr51, Avr6, Variant};
    use itertools::Itertools;
    use quickcheck_macros::quickcheck;

    macro_rules! gen_test {
        ($mod_name:ident, $Options:ty, has_rampz: $has_rampz:expr, pc_size: $pc_size:expr) => {
            mod $mod_name {
                use super::*;

                type L = RegLayout<$Options>;

                fn all_slots() -> Vec<usize> {
                    let mut slots = vec![
                        REG_SPH, REG_SPL, REG_R27, REG_R26, REG_R31, REG_R30, REG_R29, REG_R28,
                        REG_R23, REG_R22, REG_R21, REG_R20, REG_R19, REG_R18, REG_R17, REG_R16,
                        REG_R15, REG_R14, REG_R13, REG_R12, REG_R11, REG_R10, REG_R9, REG_R8,
                        REG_R7, REG_R6, REG_R5, REG_R4, REG_R3, REG_R2, REG_R1, REG_R0,
                    ];
                    slots.extend(L::REG_RAMPZ);
                    slots.extend([L::REG_SREG, L::REG_R25, L::REG_R24, L::REG_PC0, L::REG_PC1]);
                    slots.extend(L::REG_PC2);
                    slots
                }

                #[test]
                fn slots_are_contiguous() {
                    let slots = all_slots();
                    assert!(slots.iter().all_unique(), "{slots:?}");
                    assert!(
                        slots.iter().copied().sorted().eq(0..L::XCPTCONTEXT_REGS),
                        "{slots:?}"
                    );
                }

                #[test]
                fn pc_occupies_last_slots() {
                    let pc_slots: Vec<usize> = [L::REG_PC0, L::REG_PC1]
                        .into_iter()
                        .chain(L::REG_PC2)
                        .collect();
                    assert_eq!(pc_slots.len(), $pc_size);
                    assert!(pc_slots.iter().copied().eq(L::PC_RANGE));
                    assert_eq!(L::PC_RANGE.end, L::XCPTCONTEXT_REGS);
                }

                #[test]
                fn size() {
                    // 32 low slots, SREG, r25, r24, and RAMPZ if present
                    let fixed = 35 + usize::from($has_rampz);
                    assert_eq!(L::XCPTCONTEXT_REGS, fixed + $pc_size);
                    assert_eq!(L::PC_SIZE, $pc_size);
                    assert_eq!(L::REG_RAMPZ.is_some(), $has_rampz);
                }

                #[quickcheck]
                fn qc_user_pc(bytes: Vec<u8>, pc: u32) {
                    let mut regs = bytes;
                    regs.resize(L::XCPTCONTEXT_REGS, 0xee);

                    let expected = match L::REG_PC2 {
                        Some(pc2) => {
                            (u32::from(regs[L::REG_PC0]) << 16)
                                | (u32::from(regs[L::REG_PC1]) << 8)
                                | u32::from(regs[pc2])
                        }
                        None => (u32::from(regs[L::REG_PC0]) << 8) | u32::from(regs[L::REG_PC1]),
                    };
                    assert_eq!(L::user_pc(&regs), expected);

                    // Only the PC slots are touched
                    let before = regs.clone();
                    L::set_user_pc(&mut regs, pc);
                    assert_eq!(L::user_pc(&regs), pc & ((1u32 << ($pc_size * 8)) - 1));
                    assert_eq!(&regs[..L::REG_PC0], &before[..L::REG_PC0]);
                }
            }
        };
    }

    gen_test!(avr5, Avr5, has_rampz: false, pc_size: 2);
    gen_test!(avr51, Avr51, has_rampz: true, pc_size: 2);
    gen_test!(avr6, Avr6, has_rampz: true, pc_size: 3);
    gen_test!(no_rampz_pc3, Variant<false, 3>, has_rampz: false, pc_size: 3);

    fn assert_rampz_shift<const PC: usize>() {
        type Without<const P: usize> = RegLayout<Variant<false, P>>;
        type With<const P: usize> = RegLayout<Variant<true, P>>;

        assert_eq!(Without::<PC>::REG_RAMPZ, None);
        assert_eq!(With::<PC>::REG_RAMPZ, Some(Without::<PC>::REG_SREG));

        for (without, with) in [
            (Without::<PC>::REG_SREG, With::<PC>::REG_SREG),
            (Without::<PC>::REG_R25, With::<PC>::REG_R25),
            (Without::<PC>::REG_R24, With::<PC>::REG_R24),
            (Without::<PC>::REG_PC0, With::<PC>::REG_PC0),
            (Without::<PC>::REG_PC1, With::<PC>::REG_PC1),
            (
                Without::<PC>::XCPTCONTEXT_REGS,
                With::<PC>::XCPTCONTEXT_REGS,
            ),
        ] {
            assert_eq!(with, without + 1);
        }
        assert_eq!(
            With::<PC>::REG_PC2,
            Without::<PC>::REG_PC2.map(|i| i + 1)
        );

        assert_eq!(Without::<PC>::REG_SREG, NUM_FIXED_LOW_REGS);
    }

    #[test]
    fn rampz_shifts_upper_slots_pc2() {
        assert_rampz_shift::<2>();
    }

    #[test]
    fn rampz_shifts_upper_slots_pc3() {
        assert_rampz_shift::<3>();
    }

    #[test]
    fn user_pc_two_bytes() {
        let mut regs = [0; 37];
        regs[RegLayout::<Avr5>::REG_PC0] = 0x12;
        regs[RegLayout::<Avr5>::REG_PC1] = 0x34;
        assert_eq!(RegLayout::<Avr5>::user_pc(&regs), 0x1234);
    }

    #[test]
    fn user_pc_three_bytes() {
        let mut regs = [0; 39];
        regs[RegLayout::<Avr6>::REG_PC0] = 0x01;
        regs[RegLayout::<Avr6>::REG_PC1] = 0x02;
        regs[RegLayout::<Avr6>::REG_PC2.unwrap()] = 0x03;
        assert_eq!(RegLayout::<Avr6>::user_pc(&regs), 0x010203);
    }

    #[test]
    fn configured_layout() {
        assert_eq!(PC_SIZE, if cfg!(feature = "pc-22bit") { 3 } else { 2 });
        assert_eq!(REG_SREG, 32 + usize::from(cfg!(feature = "rampz")));
        assert_eq!(XCPTCONTEXT_REGS, REG_PC0 + PC_SIZE);
        assert_eq!(core::mem::size_of::<Regs>(), XCPTCONTEXT_REGS);
    }

    #[test]
    fn fixed_slots() {
        assert_eq!(REG_R23, 8);
        assert_eq!(REG_R18, 13);
        assert_eq!(REG_R2, 29);
        assert_eq!(REG_R1, 30);
        assert_eq!(REG_R0, 31);
    }
}
