use std::fmt;

use log::*;

use crate::memory::{Byte, Memory, OutOfBounds, Word};

pub mod opcode;
pub mod registers;

pub use opcode::Opcode;
pub use registers::{Register, RegisterFile, REGISTER_COUNT};

/// Number of memory bytes a [`Snapshot`] captures, starting at the
/// instruction pointer.
pub const SNAPSHOT_WINDOW: usize = 10;

/// Emulates the processor: a register file wired to the memory it executes
/// from.
///
/// The machine is driven one instruction at a time with [`Cpu::step`]. All
/// state lives in the registers and the owned [`Memory`]; a step either
/// completes or fails with [`OutOfBounds`], in which case everything written
/// so far stays as it is and the machine remains inspectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
    registers: RegisterFile,
    memory: Memory,
}

impl Default for Cpu {
    /// A fresh machine: zeroed registers on a zeroed default-capacity memory.
    fn default() -> Self {
        Cpu::new(Memory::default())
    }
}

impl Cpu {
    /// Creates a processor executing from `memory`, with all registers zero.
    pub fn new(memory: Memory) -> Self {
        Cpu {
            registers: RegisterFile::new(),
            memory,
        }
    }

    /// Reads a register.
    pub fn register(&self, register: Register) -> Word {
        self.registers.get(register)
    }

    /// The memory the processor executes from.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Reads the byte at `ip`, then advances `ip` by one.
    ///
    /// This is the only path that moves the instruction pointer; opcodes and
    /// operands alike are consumed through it. A failed fetch leaves `ip`
    /// where it was.
    fn fetch(&mut self) -> Result<Byte, OutOfBounds> {
        let ip = self.registers.get(Register::Ip);
        let byte = self.memory.load_byte(ip)?;
        self.registers.set(Register::Ip, ip.wrapping_add(1));
        Ok(byte)
    }

    /// Reads the word at `ip` (big endian), then advances `ip` by two.
    fn fetch16(&mut self) -> Result<Word, OutOfBounds> {
        let ip = self.registers.get(Register::Ip);
        let word = self.memory.load16(ip)?;
        self.registers.set(Register::Ip, ip.wrapping_add(2));
        Ok(word)
    }

    /// Fetches and executes one instruction.
    ///
    /// Operands are consumed left to right in encoding order. Any fault
    /// aborts the instruction with no further state change.
    pub fn step(&mut self) -> Result<(), OutOfBounds> {
        let byte = self.fetch()?;
        let opcode = Opcode::from(byte);
        if opcode == Opcode::NoOp && byte != u8::from(Opcode::NoOp) {
            debug!("unknown opcode {:#04X} executes as NO_OP", byte);
        }
        self.decode_execute(opcode)
    }

    fn decode_execute(&mut self, opcode: Opcode) -> Result<(), OutOfBounds> {
        match opcode {
            Opcode::NoOp => {
                debug!("NO_OP");
            }
            Opcode::AddRegToReg => {
                let lhs = Register::from_operand(self.fetch()?);
                let rhs = Register::from_operand(self.fetch()?);
                let sum = self.registers.get(lhs).wrapping_add(self.registers.get(rhs));
                self.registers.set(Register::Acc, sum);
                debug!("ADD_REG_TO_REG {} {}: acc = {:#06X}", lhs, rhs, sum);
            }
            Opcode::AndRegToReg => {
                let lhs = Register::from_operand(self.fetch()?);
                let rhs = Register::from_operand(self.fetch()?);
                let result = self.registers.get(lhs) & self.registers.get(rhs);
                self.registers.set(Register::Acc, result);
                debug!("AND_REG_TO_REG {} {}: acc = {:#06X}", lhs, rhs, result);
            }
            Opcode::OrRegToReg => {
                let lhs = Register::from_operand(self.fetch()?);
                let rhs = Register::from_operand(self.fetch()?);
                let result = self.registers.get(lhs) | self.registers.get(rhs);
                self.registers.set(Register::Acc, result);
                debug!("OR_REG_TO_REG {} {}: acc = {:#06X}", lhs, rhs, result);
            }
            Opcode::MovLiteralToReg => {
                let value = self.fetch16()?;
                let dest = Register::from_operand(self.fetch()?);
                self.registers.set(dest, value);
                debug!("MOV_LITERAL_TO_REG {:#06X} {}", value, dest);
            }
            Opcode::MovRegToReg => {
                let src = Register::from_operand(self.fetch()?);
                let dest = Register::from_operand(self.fetch()?);
                let value = self.registers.get(src);
                self.registers.set(dest, value);
                debug!("MOV_REG_TO_REG {} {}: {:#06X}", src, dest, value);
            }
            Opcode::MovMemToReg => {
                let address = self.fetch16()?;
                let dest = Register::from_operand(self.fetch()?);
                let value = self.memory.load16(address)?;
                self.registers.set(dest, value);
                debug!("MOV_MEM_TO_REG {:#06X} {}: {:#06X}", address, dest, value);
            }
            Opcode::MovRegToMem => {
                let src = Register::from_operand(self.fetch()?);
                let address = self.fetch16()?;
                let value = self.registers.get(src);
                self.memory.store16(address, value)?;
                debug!("MOV_REG_TO_MEM {} {:#06X}: {:#06X}", src, address, value);
            }
        }
        Ok(())
    }

    /// Captures the registers and the memory bytes around the instruction
    /// pointer, without changing any state.
    pub fn snapshot(&self) -> Snapshot {
        let ip = self.registers.get(Register::Ip);
        let mut window = Vec::with_capacity(SNAPSHOT_WINDOW);
        for offset in 0..SNAPSHOT_WINDOW as Word {
            // the window ends early at the last valid address
            match ip
                .checked_add(offset)
                .map(|address| self.memory.load_byte(address))
            {
                Some(Ok(byte)) => window.push(byte),
                _ => break,
            }
        }

        Snapshot {
            registers: self.registers.words(),
            window,
        }
    }
}

/// A read-only view of the machine for display: every register plus a short
/// window of memory starting at the instruction pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Register values, indexed by register id.
    pub registers: [Word; REGISTER_COUNT],
    /// Up to [`SNAPSHOT_WINDOW`] bytes of memory, the first one at `ip`.
    pub window: Vec<Byte>,
}

impl Snapshot {
    /// The captured instruction pointer.
    pub fn ip(&self) -> Word {
        self.registers[Register::Ip as usize]
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elided = self.ip() > 0;
        if elided {
            write!(f, "... ")?;
        }
        for byte in &self.window {
            write!(f, "{:#04X} ", byte)?;
        }
        writeln!(f)?;
        // caret marks the byte at ip
        writeln!(f, "{}^", " ".repeat(if elided { 6 } else { 2 }))?;
        writeln!(f)?;
        for (register, value) in Register::ALL.iter().zip(self.registers.iter()) {
            writeln!(f, "{:<4}: {:#06X} [ {:>5} ]", register.name(), value, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    use super::Opcode::*;
    use super::Register::*;

    #[test]
    fn test_fetch_advances_ip_by_one() -> Result<()> {
        let mut memory = Memory::default();
        memory.store_byte(0, 0xAA)?;
        memory.store_byte(1, 0xBB)?;

        let mut cpu = Cpu::new(memory);
        assert_eq!(cpu.fetch()?, 0xAA);
        assert_eq!(cpu.register(Ip), 1);
        assert_eq!(cpu.fetch()?, 0xBB);
        assert_eq!(cpu.register(Ip), 2);

        Ok(())
    }

    #[test]
    fn test_fetch16_advances_ip_by_two() -> Result<()> {
        let mut memory = Memory::default();
        memory.store16(0, 0x1234)?;

        let mut cpu = Cpu::new(memory);
        assert_eq!(cpu.fetch16()?, 0x1234);
        assert_eq!(cpu.register(Ip), 2);

        Ok(())
    }

    #[test]
    fn test_fetch_past_capacity_leaves_ip_unchanged() {
        let mut cpu = Cpu::new(Memory::new(2));
        cpu.registers.set(Ip, 2);

        assert!(cpu.fetch().is_err());
        assert_eq!(cpu.register(Ip), 2);
        assert!(cpu.fetch16().is_err());
        assert_eq!(cpu.register(Ip), 2);

        // a word fetch with a single byte left faults the same way
        cpu.registers.set(Ip, 1);
        assert!(cpu.fetch16().is_err());
        assert_eq!(cpu.register(Ip), 1);
    }

    #[test]
    fn test_step_no_op() -> Result<()> {
        let mut cpu = Cpu::default();
        cpu.step()?;

        // nothing but the instruction pointer moved
        let mut expected = Cpu::default();
        expected.registers.set(Ip, 1);
        assert_eq!(cpu, expected);

        Ok(())
    }

    #[test]
    fn test_unknown_opcode_steps_like_no_op() -> Result<()> {
        let mut memory = Memory::default();
        memory.store_byte(0, 0xEE)?;

        let mut cpu = Cpu::new(memory.clone());
        cpu.step()?;

        assert_eq!(cpu.register(Ip), 1);
        assert_eq!(cpu.memory(), &memory);
        for &register in Register::ALL {
            if register != Ip {
                assert_eq!(cpu.register(register), 0);
            }
        }

        Ok(())
    }

    #[test]
    fn test_add_truncates_to_16_bits() -> Result<()> {
        let mut memory = Memory::default();
        crate::write_program!(memory : 0x0000 => AddRegToReg, R1, R2)?;

        let mut cpu = Cpu::new(memory);
        cpu.registers.set(R1, 0xFFFF);
        cpu.registers.set(R2, 0x0001);
        cpu.step()?;

        assert_eq!(cpu.register(Acc), 0x0000); // 0x10000 truncated
        assert_eq!(cpu.register(Ip), 3);

        Ok(())
    }

    #[test]
    fn test_literal_loads_then_add() -> Result<()> {
        let mut memory = Memory::default();
        crate::write_program!(memory : 0x0000 =>
            MovLiteralToReg, 0x00, 0xAB, R1,
            MovLiteralToReg, 0x34, 0xFA, R2,
            AddRegToReg, R1, R2,
        )?;
        let mut cpu = Cpu::new(memory);

        cpu.step()?;
        assert_eq!(cpu.register(R1), 0x00AB);
        assert_eq!(cpu.register(Ip), 4);

        cpu.step()?;
        assert_eq!(cpu.register(R2), 0x34FA);
        assert_eq!(cpu.register(Ip), 8);

        cpu.step()?;
        assert_eq!(cpu.register(Acc), 0x35A5);
        assert_eq!(cpu.register(Ip), 11);

        Ok(())
    }

    #[test]
    fn test_bitwise_and_or() -> Result<()> {
        let mut memory = Memory::default();
        crate::write_program!(memory : 0x0000 =>
            MovLiteralToReg, 0x0F, 0xF0, R3,
            MovLiteralToReg, 0x00, 0xFF, R4,
            AndRegToReg, R3, R4,
            OrRegToReg, R3, R4,
        )?;
        let mut cpu = Cpu::new(memory);

        for _ in 0..3 {
            cpu.step()?;
        }
        assert_eq!(cpu.register(Acc), 0x00F0);

        cpu.step()?;
        assert_eq!(cpu.register(Acc), 0x0FFF);

        Ok(())
    }

    #[test]
    fn test_mov_mem_to_reg() -> Result<()> {
        let mut memory = Memory::default();
        memory.store16(0x1023, 0x4566)?;
        crate::write_program!(memory : 0x0000 => MovMemToReg, 0x10, 0x23, R4)?;

        let mut cpu = Cpu::new(memory);
        cpu.step()?;

        assert_eq!(cpu.register(R4), 0x4566);
        assert_eq!(cpu.register(Ip), 4);

        Ok(())
    }

    #[test]
    fn test_reg_to_mem_round_trip() -> Result<()> {
        let mut memory = Memory::default();
        crate::write_program!(memory : 0x0000 =>
            MovLiteralToReg, 0xBE, 0xEF, R1,
            MovRegToMem, R1, 0x20, 0x00,
            MovMemToReg, 0x20, 0x00, R5,
        )?;
        let mut cpu = Cpu::new(memory);

        for _ in 0..3 {
            cpu.step()?;
        }

        assert_eq!(cpu.memory().load16(0x2000)?, 0xBEEF);
        assert_eq!(cpu.register(R5), 0xBEEF);
        assert_eq!(cpu.register(Ip), 12);

        Ok(())
    }

    #[test]
    fn test_mov_reg_to_reg() -> Result<()> {
        let mut memory = Memory::default();
        crate::write_program!(memory : 0x0000 =>
            MovLiteralToReg, 0x12, 0x34, R6,
            MovRegToReg, R6, R3,
        )?;
        let mut cpu = Cpu::new(memory);

        cpu.step()?;
        cpu.step()?;

        assert_eq!(cpu.register(R3), 0x1234);
        assert_eq!(cpu.register(R6), 0x1234); // the source keeps its value
        assert_eq!(cpu.register(Ip), 7);

        Ok(())
    }

    #[test]
    fn test_literal_into_ip_acts_as_jump() -> Result<()> {
        let mut memory = Memory::default();
        crate::write_program!(memory : 0x0000 => MovLiteralToReg, 0x00, 0x10, Ip)?;
        crate::write_program!(memory : 0x0010 => MovLiteralToReg, 0xCA, 0xFE, R1)?;
        let mut cpu = Cpu::new(memory);

        cpu.step()?;
        assert_eq!(cpu.register(Ip), 0x0010); // the write lands after the fetches

        cpu.step()?;
        assert_eq!(cpu.register(R1), 0xCAFE);
        assert_eq!(cpu.register(Ip), 0x0014);

        Ok(())
    }

    #[test]
    fn test_operand_fault_aborts_before_writes() -> Result<()> {
        let mut memory = Memory::new(0x10);
        memory.store_byte(0x000F, MovLiteralToReg.into())?;

        let mut cpu = Cpu::new(memory);
        cpu.registers.set(R1, 0x5555);
        cpu.registers.set(Ip, 0x000F);

        let err = cpu.step().unwrap_err();
        assert_eq!(err.address, 0x10);

        // the opcode fetch advanced ip; the faulting literal fetch did not
        assert_eq!(cpu.register(Ip), 0x0010);
        assert_eq!(cpu.register(R1), 0x5555);
        assert_eq!(cpu.register(Acc), 0x0000);

        Ok(())
    }

    #[test]
    fn test_store_fault_leaves_memory_unmodified() -> Result<()> {
        let mut memory = Memory::new(0x10);
        crate::write_program!(memory : 0x0000 => MovRegToMem, R1, 0x00, 0x10)?;
        let before = memory.clone();

        let mut cpu = Cpu::new(memory);
        cpu.registers.set(R1, 0xABCD);

        assert!(cpu.step().is_err());
        assert_eq!(cpu.register(Ip), 4); // all operands were consumed
        assert_eq!(cpu.memory(), &before);

        Ok(())
    }

    #[test]
    fn test_snapshot_is_read_only() -> Result<()> {
        let mut memory = Memory::default();
        crate::write_program!(memory : 0x0000 => MovLiteralToReg, 0x00, 0xAB, R1)?;

        let cpu = Cpu::new(memory);
        let before = cpu.clone();
        let snapshot = cpu.snapshot();

        assert_eq!(cpu, before);
        assert_eq!(snapshot.ip(), 0);
        assert_eq!(snapshot.window.len(), SNAPSHOT_WINDOW);
        assert_eq!(snapshot.window[0], u8::from(MovLiteralToReg));

        Ok(())
    }

    #[test]
    fn test_snapshot_window_truncates_at_capacity() {
        let mut cpu = Cpu::new(Memory::new(6));
        cpu.registers.set(Ip, 4);

        let snapshot = cpu.snapshot();
        assert_eq!(snapshot.window, vec![0x00, 0x00]);
    }

    #[test]
    fn test_snapshot_display_format() -> Result<()> {
        let mut memory = Memory::default();
        crate::write_program!(memory : 0x0000 =>
            MovLiteralToReg, 0x00, 0xAB, R1,
            MovLiteralToReg, 0x34, 0xFA, R2,
            AddRegToReg, R1, R2,
        )?;
        let mut cpu = Cpu::new(memory);
        for _ in 0..3 {
            cpu.step()?;
        }

        let rendered = cpu.snapshot().to_string();
        assert!(rendered.starts_with("... "));
        assert!(rendered.contains("\n      ^\n"));
        assert!(rendered.contains("ip  : 0x000B [    11 ]"));
        assert!(rendered.contains("acc : 0x35A5 [ 13733 ]"));
        assert!(rendered.contains("r1  : 0x00AB [   171 ]"));

        Ok(())
    }
}
