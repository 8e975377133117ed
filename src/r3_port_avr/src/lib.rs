#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]
#![cfg_attr(
    feature = "doc",
    doc(html_logo_url = "https://r3-os.github.io/r3/logo-small.svg")
)]
#![deny(unsafe_op_in_unsafe_fn)]
#![doc = include_str!("./lib.md")]
#![cfg_attr(not(test), no_std)]

/// The interrupt-enable state primitives built on `SREG`.
pub mod irq {
    pub mod imp;
    pub mod sreg;
    #[cfg(not(target_arch = "avr"))]
    pub mod sim;
}

/// The register save area and the exception context.
pub mod context {
    pub mod cfg;
    pub mod imp;
    pub mod xcpt;
}

pub mod usrpc;

pub use self::context::cfg::*;
pub use self::context::imp::*;
pub use self::context::xcpt::*;
pub use self::irq::imp::*;
pub use self::irq::sreg::{SregAccess, SREG_I_MASK};
pub use self::usrpc::*;

#[cfg(target_arch = "avr")]
pub use self::irq::sreg::SREG;
#[cfg(not(target_arch = "avr"))]
pub use self::irq::sim::SimulatedSreg;
