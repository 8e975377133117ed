/// The properties of a core variant that affect the register save area.
pub trait CoreOptions {
    /// Indicates whether the core has the `RAMPZ` register. Defaults to
    /// `false`.
    const HAS_RAMPZ: bool = false;

    /// The size of the program counter in bytes. Must be `2` or `3`. Defaults
    /// to `2`.
    const PC_SIZE: usize = 2;
}

/// Implements [`CoreOptions`] with the specified values.
#[derive(Debug, Clone, Copy)]
pub struct Variant<const HAS_RAMPZ: bool, const PC_SIZE: usize>;

impl<const HAS_RAMPZ: bool, const PC_SIZE: usize> CoreOptions for Variant<HAS_RAMPZ, PC_SIZE> {
    const HAS_RAMPZ: bool = HAS_RAMPZ;
    const PC_SIZE: usize = PC_SIZE;
}

/// Cores with up to 128 KiB of flash memory and no `RAMPZ` (e.g., ATmega328P)
pub type Avr5 = Variant<false, 2>;

/// Cores with 128 KiB of flash memory and `RAMPZ` (e.g., ATmega1284P)
pub type Avr51 = Variant<true, 2>;

/// Cores with more than 128 KiB of flash memory (e.g., ATmega2560)
pub type Avr6 = Variant<true, 3>;

/// The variant selected for this build by the `rampz` and `pc-22bit`
/// features.
pub type Configured = Variant<
    { cfg!(feature = "rampz") },
    {
        if cfg!(feature = "pc-22bit") {
            3
        } else {
            2
        }
    },
>;
