use color_eyre::eyre::Result;

use log::LevelFilter;
use simple_logger::SimpleLogger;
use vm16::cpu::Cpu;
use vm16::memory::Memory;
use vm16::write_program;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Debug)
        .init()
        .unwrap(); // logging

    let mut memory = Memory::default();

    // move a literal through memory and two registers
    use vm16::cpu::Opcode::*;
    use vm16::cpu::Register::*;
    write_program!(memory : 0x0000 =>
        MovLiteralToReg, 0xBE, 0xEF, R1,
        MovRegToMem, R1, 0x20, 0x00,
        MovMemToReg, 0x20, 0x00, R5,
        MovRegToReg, R5, R6
    )?;

    let mut cpu = Cpu::new(memory);
    for _ in 0..4 {
        cpu.step()?;
    }

    println!(
        "Program done. r5: {:#06X}, r6: {:#06X}, memory[0x2000]: {:#06X}",
        cpu.register(R5),
        cpu.register(R6),
        cpu.memory().load16(0x2000)?,
    );

    Ok(())
}
