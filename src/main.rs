use std::io::{self, BufRead, Write};

use color_eyre::eyre::{Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use vm16::cpu::{Cpu, Opcode, Register};
use vm16::memory::Memory;

/// Steps a small demo program one instruction per line of input, dumping the
/// machine state after each step.
fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .init()
        .unwrap(); // logging

    let mut memory = Memory::default();

    // store 0x00AB inside register r1
    memory.push_byte(Opcode::MovLiteralToReg.into())?;
    memory.push16(0x00AB)?;
    memory.push_byte(Register::R1.into())?;

    // store 0x34FA inside register r2
    memory.push_byte(Opcode::MovLiteralToReg.into())?;
    memory.push16(0x34FA)?;
    memory.push_byte(Register::R2.into())?;

    // add r1 and r2, result goes to acc
    memory.push_byte(Opcode::AddRegToReg.into())?;
    memory.push_byte(Register::R1.into())?;
    memory.push_byte(Register::R2.into())?;

    // seed the word the final instruction loads
    memory.store16(0x1023, 0x4566)?;

    // move the word at 0x1023 into r4
    memory.push_byte(Opcode::MovMemToReg.into())?;
    memory.push16(0x1023)?;
    memory.push_byte(Register::R4.into())?;

    let mut computer = Cpu::new(memory);
    redraw(&computer)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        line?;
        computer.step().wrap_err("emulation fault")?;
        redraw(&computer)?;
    }
    println!("Exiting...");

    Ok(())
}

/// Clears the terminal and dumps the machine state.
fn redraw(computer: &Cpu) -> Result<()> {
    print!("\x1B[2J\x1B[1;1H");
    println!("{}", computer.snapshot());
    io::stdout().flush()?;

    Ok(())
}
