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

    use vm16::cpu::Opcode::*;
    use vm16::cpu::Register::*;
    write_program!(memory : 0x0000 =>
        MovLiteralToReg, 0x00, 0xAB, R1,
        MovLiteralToReg, 0x34, 0xFA, R2,
        AddRegToReg, R1, R2
    )?;

    let mut cpu = Cpu::new(memory);
    for _ in 0..3 {
        cpu.step()?;
    }

    let result = cpu.register(Acc);
    println!("Program done. acc: {:#06X} / {}", result, result);

    Ok(())
}
