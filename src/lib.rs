//! A CHIP-8 virtual machine.
//!
//! [`Machine`] holds the architectural state, [`Interpreter`] executes one
//! instruction at a time against it, and [`Runner`] paces the two against
//! wall-clock time for a frontend.

mod config;
mod execute;
mod font;
mod interpreter;
mod machine;
mod nibble;
mod opcode;
mod runner;
mod types;

pub use config::*;
pub use font::*;
pub use interpreter::*;
pub use machine::*;
pub use nibble::u4;
pub use opcode::*;
pub use runner::*;
pub use types::*;
