use std::fmt;

use num_enum::IntoPrimitive;

use crate::memory::{Byte, Word};

/// Number of registers in the file.
pub const REGISTER_COUNT: usize = 8;

/// Names the registers of the machine.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
pub enum Register {
    /// Instruction pointer: address of the next byte to fetch.
    Ip = 0,
    /// Accumulator: receives the result of every arithmetic and logic
    /// instruction.
    Acc = 1,
    R1 = 2,
    R2 = 3,
    R3 = 4,
    R4 = 5,
    R5 = 6,
    R6 = 7,
}

impl Register {
    /// All registers, in id order.
    pub const ALL: &'static [Self] = &[
        Self::Ip,
        Self::Acc,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
    ];

    /// Decodes a register operand byte.
    ///
    /// Register ids are a 3-bit field; the high bits of the operand byte are
    /// ignored.
    pub fn from_operand(byte: Byte) -> Self {
        match byte & 0b0000_0111 {
            0 => Self::Ip,
            1 => Self::Acc,
            2 => Self::R1,
            3 => Self::R2,
            4 => Self::R3,
            5 => Self::R4,
            6 => Self::R5,
            _ => Self::R6,
        }
    }

    /// Looks a register up by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|reg| reg.name() == name)
    }

    /// The display name of the register.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Acc => "acc",
            Self::R1 => "r1",
            Self::R2 => "r2",
            Self::R3 => "r3",
            Self::R4 => "r4",
            Self::R5 => "r5",
            Self::R6 => "r6",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The register file: one 16-bit word per register, all starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegisterFile {
    words: [Word; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register.
    pub fn get(&self, register: Register) -> Word {
        self.words[register as usize]
    }

    /// Overwrites a register.
    pub fn set(&mut self, register: Register, value: Word) {
        self.words[register as usize] = value;
    }

    /// All register values, indexed by register id.
    pub fn words(&self) -> [Word; REGISTER_COUNT] {
        self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_ids_use_low_three_bits() {
        assert_eq!(Register::from_operand(0x00), Register::Ip);
        assert_eq!(Register::from_operand(0x07), Register::R6);
        // high bits are masked off
        assert_eq!(Register::from_operand(0x0A), Register::R1);
        assert_eq!(Register::from_operand(0xFF), Register::R6);
    }

    #[test]
    fn test_register_names() {
        for &register in Register::ALL {
            assert_eq!(Register::from_name(register.name()), Some(register));
        }
        assert_eq!(Register::from_name("pc"), None);
        assert_eq!(Register::from_name("ACC"), None); // names are lowercase
    }

    #[test]
    fn test_register_file_get_set() {
        let mut registers = RegisterFile::new();
        assert_eq!(registers.get(Register::R3), 0);

        registers.set(Register::R3, 0xBEEF);
        assert_eq!(registers.get(Register::R3), 0xBEEF);
        assert_eq!(registers.words()[Register::R3 as usize], 0xBEEF);
        assert_eq!(registers.get(Register::R4), 0);
    }
}
