//! An educational emulator for a small 16-bit computer: a flat
//! byte-addressable [`memory::Memory`] and a [`cpu::Cpu`] with eight
//! registers driving a fetch, decode, execute cycle.
//!
//! ```
//! use vm16::cpu::{Cpu, Opcode, Register};
//! use vm16::memory::Memory;
//!
//! # fn main() -> Result<(), vm16::memory::OutOfBounds> {
//! let mut memory = Memory::default();
//! memory.push_byte(Opcode::MovLiteralToReg.into())?;
//! memory.push16(0x00AB)?;
//! memory.push_byte(Register::R1.into())?;
//!
//! let mut cpu = Cpu::new(memory);
//! cpu.step()?;
//! assert_eq!(cpu.register(Register::R1), 0x00AB);
//! # Ok(())
//! # }
//! ```

pub mod cpu;
pub mod memory;
